// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;

use thiserror::Error;

/// Catch-all result type for infrastructure code.
pub type Fallible<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug)]
pub struct ErrorReport {
    message: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

impl std::error::Error for ErrorReport {}

pub fn fail<T>(message: &str) -> Fallible<T> {
    Err(Box::new(ErrorReport::new(message)))
}

/// The failure taxonomy of the action layer. Every user-triggered mutation
/// reports one of these rather than panicking, and the web layer maps each
/// variant to a localized message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// No valid identity.
    #[error("unauthorized")]
    Unauthorized,
    /// A valid identity that does not own the resource, or lacks the
    /// entitlement for the requested feature.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Malformed or out-of-range input, detected before any mutation.
    #[error("invalid input: {0}")]
    Validation(String),
    /// The referenced deck or card does not exist.
    #[error("not found")]
    NotFound,
    /// The text generation provider has no API key configured.
    #[error("AI provider not configured")]
    ProviderNotConfigured,
    /// The text generation provider rejected the request for quota reasons.
    #[error("AI quota exceeded")]
    QuotaExceeded,
    /// The provider answered, but not with a usable batch of cards.
    #[error("malformed AI output: {0}")]
    MalformedOutput(String),
    /// Any other provider-side failure (timeout, transport, 5xx).
    #[error("AI generation failed: {0}")]
    ProviderFailure(String),
    /// A CSV import that produced no valid rows.
    #[error("import failed: {0}")]
    ImportFormat(String),
    /// Unexpected internal failure. Rendered as a generic message, never
    /// with the underlying detail.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// Dictionary key for the user-visible message.
    pub fn message_key(&self) -> &'static str {
        match self {
            ActionError::Unauthorized => "errors.unauthorized",
            ActionError::Forbidden(_) => "errors.forbidden",
            ActionError::Validation(_) => "errors.invalidInput",
            ActionError::NotFound => "errors.notFound",
            ActionError::ProviderNotConfigured => "errors.aiNotConfigured",
            ActionError::QuotaExceeded => "errors.aiQuotaExceeded",
            ActionError::MalformedOutput(_) => "errors.aiMalformedOutput",
            ActionError::ProviderFailure(_) => "errors.aiFailed",
            ActionError::ImportFormat(_) => "errors.csvParseFailed",
            ActionError::Internal(_) => "errors.generic",
        }
    }
}

impl From<rusqlite::Error> for ActionError {
    fn from(e: rusqlite::Error) -> Self {
        ActionError::Internal(e.to_string())
    }
}

pub type ActionResult<T> = Result<T, ActionError>;
