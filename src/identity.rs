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

use crate::types::user::UserId;

/// Feature flag gating AI card generation.
pub const AI_FEATURE: &str = "ai_deck";

/// The identity provider seam. Supplies the requester's identity and
/// feature entitlements; the action layer never looks past this trait.
pub trait Identity {
    /// The authenticated user, if any.
    fn current_user(&self) -> Option<UserId>;

    /// Whether the current user is entitled to the named feature.
    fn has_feature(&self, feature: &str) -> bool;
}

/// Configuration-backed identity: one configured user with a fixed set of
/// entitlements. Stands in for an external identity service.
#[derive(Clone)]
pub struct ConfigIdentity {
    user_id: UserId,
    features: Vec<String>,
}

impl ConfigIdentity {
    pub fn new(user_id: UserId, features: Vec<String>) -> Self {
        Self { user_id, features }
    }
}

impl Identity for ConfigIdentity {
    fn current_user(&self) -> Option<UserId> {
        Some(self.user_id.clone())
    }

    fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

#[cfg(test)]
pub struct AnonymousIdentity;

#[cfg(test)]
impl Identity for AnonymousIdentity {
    fn current_user(&self) -> Option<UserId> {
        None
    }

    fn has_feature(&self, _feature: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_identity() {
        let identity =
            ConfigIdentity::new(UserId::new("user_1"), vec![AI_FEATURE.to_string()]);
        assert_eq!(identity.current_user(), Some(UserId::new("user_1")));
        assert!(identity.has_feature(AI_FEATURE));
        assert!(!identity.has_feature("telepathy"));
    }

    #[test]
    fn test_anonymous_identity() {
        assert_eq!(AnonymousIdentity.current_user(), None);
        assert!(!AnonymousIdentity.has_feature(AI_FEATURE));
    }
}
