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

use serde::Deserialize;
use serde_json::json;

use crate::config::AiConfig;
use crate::error::ActionError;
use crate::error::ActionResult;
use crate::types::card::DraftCard;

/// The text generation provider seam. Given a deck's title and
/// description, produce front/back drafts. Implementations may return more
/// cards than asked for, or fewer: the action layer enforces the batch
/// contract.
pub trait CardGenerator {
    /// Whether the provider can be called at all (API key present).
    fn is_configured(&self) -> bool;

    fn generate(
        &self,
        title: &str,
        description: &str,
        count: usize,
    ) -> impl Future<Output = ActionResult<Vec<DraftCard>>> + Send;
}

/// Calls an OpenAI-compatible chat completions endpoint and expects the
/// reply to be a JSON array of `{"front": ..., "back": ...}` objects.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    config: AiConfig,
}

impl OpenAiGenerator {
    pub fn new(config: AiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn api_key(&self) -> Option<String> {
        match std::env::var(&self.config.api_key_env) {
            Ok(key) if !key.is_empty() => Some(key),
            _ => None,
        }
    }
}

impl CardGenerator for OpenAiGenerator {
    fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    async fn generate(
        &self,
        title: &str,
        description: &str,
        count: usize,
    ) -> ActionResult<Vec<DraftCard>> {
        let key = self.api_key().ok_or(ActionError::ProviderNotConfigured)?;
        let prompt = build_prompt(title, description, count);
        let body = json!({
            "model": self.config.model,
            "temperature": 1.1,
            "messages": [{"role": "user", "content": prompt}],
        });
        log::debug!(
            "AI call start: model={} count={count}",
            self.config.model
        );
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ActionError::ProviderFailure(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ActionError::ProviderFailure(e.to_string()))?;
        if status.as_u16() == 429 || looks_like_quota_error(&text) {
            return Err(ActionError::QuotaExceeded);
        }
        if !status.is_success() {
            return Err(ActionError::ProviderFailure(format!(
                "provider returned {status}"
            )));
        }

        let completion: Completion = serde_json::from_str(&text)
            .map_err(|e| ActionError::MalformedOutput(e.to_string()))?;
        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| ActionError::MalformedOutput("no choices".to_string()))?;
        let drafts = parse_drafts(content)?;
        log::debug!("AI call done: received {} drafts", drafts.len());
        Ok(drafts)
    }
}

fn build_prompt(title: &str, description: &str, count: usize) -> String {
    [
        "You are an assistant that creates flashcards.".to_string(),
        format!(
            "Create at least {count} diverse and non-redundant flashcards (not fewer than {count})."
        ),
        format!("Title: {title}"),
        format!("Description: {description}"),
        "Only return a JSON array of objects with keys: front, back. No extra fields.".to_string(),
    ]
    .join("\n")
}

fn looks_like_quota_error(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("insufficient_quota") || lower.contains("\"quota") || lower.contains("billing")
}

#[derive(Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// Parse the model's reply into drafts. Models like wrapping JSON in
/// markdown fences, so those are stripped first.
fn parse_drafts(content: &str) -> ActionResult<Vec<DraftCard>> {
    let content = strip_fences(content);
    let drafts: Vec<DraftCard> = serde_json::from_str(content)
        .map_err(|e| ActionError::MalformedOutput(e.to_string()))?;
    Ok(drafts)
}

fn strip_fences(content: &str) -> &str {
    let content = content.trim();
    let content = content
        .strip_prefix("```json")
        .or_else(|| content.strip_prefix("```"))
        .unwrap_or(content);
    let content = content.strip_suffix("```").unwrap_or(content);
    content.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drafts() {
        let content = r#"[{"front": "cat", "back": "gato"}, {"front": "dog", "back": "perro"}]"#;
        let drafts = parse_drafts(content).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0], DraftCard::new("cat", "gato"));
    }

    #[test]
    fn test_parse_drafts_with_fences() {
        let content = "```json\n[{\"front\": \"cat\", \"back\": \"gato\"}]\n```";
        let drafts = parse_drafts(content).unwrap();
        assert_eq!(drafts.len(), 1);
    }

    #[test]
    fn test_parse_drafts_malformed() {
        let err = parse_drafts("the cards are: cat/gato").err().unwrap();
        assert!(matches!(err, ActionError::MalformedOutput(_)));
    }

    #[test]
    fn test_parse_drafts_wrong_shape() {
        let err = parse_drafts(r#"{"front": "cat", "back": "gato"}"#).err().unwrap();
        assert!(matches!(err, ActionError::MalformedOutput(_)));
    }

    #[test]
    fn test_quota_detection() {
        assert!(looks_like_quota_error(
            r#"{"error": {"type": "insufficient_quota"}}"#
        ));
        assert!(!looks_like_quota_error(r#"{"choices": []}"#));
    }

    #[test]
    fn test_prompt_mentions_count_and_deck() {
        let prompt = build_prompt("Spanish", "Basic vocabulary", 50);
        assert!(prompt.contains("at least 50"));
        assert!(prompt.contains("Title: Spanish"));
        assert!(prompt.contains("Description: Basic vocabulary"));
    }

    #[test]
    fn test_unconfigured_without_key() {
        let mut config = AiConfig::default();
        config.api_key_env = "FLASHDECK_TEST_NO_SUCH_KEY".to_string();
        let generator = OpenAiGenerator::new(config);
        assert!(!generator.is_configured());
    }
}
