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

use crate::actions::require_user;
use crate::db::Database;
use crate::error::ActionError;
use crate::error::ActionResult;
use crate::generate::CardGenerator;
use crate::identity::AI_FEATURE;
use crate::identity::Identity;
use crate::types::card::DraftCard;
use crate::types::card::SIDE_MAX;
use crate::types::deck::DeckId;

/// Bounds on the requested card count.
pub const COUNT_MIN: usize = 1;
pub const COUNT_MAX: usize = 200;

/// The provider contract caps the front of a generated card tighter than
/// the stored card limit: a front is a prompt, not an essay.
const FRONT_DRAFT_MAX: usize = 280;

pub struct GenerateCardsInput {
    pub deck_id: DeckId,
    pub count: usize,
}

/// Generate cards for a deck. The provider is asked for at least `count`
/// drafts; anything less is a recoverable failure, anything more is
/// truncated, and the accepted batch is inserted in one transaction. On
/// any failure the deck is left exactly as it was.
pub async fn generate_cards(
    db: &Database,
    identity: &impl Identity,
    generator: &impl CardGenerator,
    input: GenerateCardsInput,
) -> ActionResult<usize> {
    let user_id = require_user(identity)?;
    if input.count < COUNT_MIN || input.count > COUNT_MAX {
        return Err(ActionError::Validation(format!(
            "count must be between {COUNT_MIN} and {COUNT_MAX}"
        )));
    }
    if !identity.has_feature(AI_FEATURE) {
        return Err(ActionError::Forbidden(
            "AI deck feature required".to_string(),
        ));
    }
    let deck = db.get_deck(&user_id, input.deck_id)?;
    let description = match deck.description.as_deref() {
        Some(d) if !d.trim().is_empty() => d,
        _ => {
            return Err(ActionError::Validation(
                "deck title and description are required for AI generation".to_string(),
            ));
        }
    };
    if !generator.is_configured() {
        return Err(ActionError::ProviderNotConfigured);
    }

    log::debug!(
        "Generating {} cards for deck {} ({})",
        input.count,
        deck.id,
        deck.title
    );
    let mut drafts = generator
        .generate(&deck.title, description, input.count)
        .await?;
    if drafts.len() < input.count {
        return Err(ActionError::MalformedOutput(format!(
            "asked for {} cards, provider returned {}",
            input.count,
            drafts.len()
        )));
    }
    drafts.truncate(input.count);
    validate_drafts(&drafts)?;

    let inserted = db.insert_cards(&user_id, input.deck_id, &drafts)?;
    log::debug!("Inserted {inserted} generated cards into deck {}", deck.id);
    Ok(inserted)
}

fn validate_drafts(drafts: &[DraftCard]) -> ActionResult<()> {
    for draft in drafts {
        let front_len = draft.front.chars().count();
        let back_len = draft.back.chars().count();
        if front_len == 0 || back_len == 0 {
            return Err(ActionError::MalformedOutput(
                "provider returned a card with an empty side".to_string(),
            ));
        }
        if front_len > FRONT_DRAFT_MAX || back_len > SIDE_MAX {
            return Err(ActionError::MalformedOutput(
                "provider returned an oversized card".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AnonymousIdentity;
    use crate::identity::ConfigIdentity;
    use crate::types::user::UserId;

    /// A generator with a canned reply.
    struct FakeGenerator {
        configured: bool,
        result: ActionResult<Vec<DraftCard>>,
    }

    impl FakeGenerator {
        fn returning(drafts: Vec<DraftCard>) -> Self {
            Self {
                configured: true,
                result: Ok(drafts),
            }
        }

        fn failing(error: ActionError) -> Self {
            Self {
                configured: true,
                result: Err(error),
            }
        }

        fn unconfigured() -> Self {
            Self {
                configured: false,
                result: Ok(Vec::new()),
            }
        }
    }

    impl CardGenerator for FakeGenerator {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn generate(
            &self,
            _title: &str,
            _description: &str,
            _count: usize,
        ) -> ActionResult<Vec<DraftCard>> {
            self.result.clone()
        }
    }

    fn scratch_db() -> Database {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flashdeck.db");
        std::mem::forget(dir);
        Database::new(path.to_str().unwrap()).unwrap()
    }

    fn alice_with_ai() -> ConfigIdentity {
        ConfigIdentity::new(UserId::new("user_alice"), vec![AI_FEATURE.to_string()])
    }

    fn described_deck(db: &Database) -> DeckId {
        db.create_deck(
            &UserId::new("user_alice"),
            "Spanish",
            Some("Basic vocabulary"),
        )
        .unwrap()
    }

    fn drafts(n: usize) -> Vec<DraftCard> {
        (0..n)
            .map(|i| DraftCard::new(format!("front {i}"), format!("back {i}")))
            .collect()
    }

    #[tokio::test]
    async fn test_generate_success() {
        let db = scratch_db();
        let deck_id = described_deck(&db);
        let generator = FakeGenerator::returning(drafts(3));
        let input = GenerateCardsInput { deck_id, count: 3 };
        let inserted = generate_cards(&db, &alice_with_ai(), &generator, input)
            .await
            .unwrap();
        assert_eq!(inserted, 3);
        assert_eq!(db.list_cards(deck_id).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_surplus_is_truncated() {
        let db = scratch_db();
        let deck_id = described_deck(&db);
        let generator = FakeGenerator::returning(drafts(10));
        let input = GenerateCardsInput { deck_id, count: 4 };
        let inserted = generate_cards(&db, &alice_with_ai(), &generator, input)
            .await
            .unwrap();
        assert_eq!(inserted, 4);
        assert_eq!(db.list_cards(deck_id).unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_shortfall_inserts_nothing() {
        // Asked for 50, provider returns 30: recoverable failure, zero
        // cards inserted.
        let db = scratch_db();
        let deck_id = described_deck(&db);
        let generator = FakeGenerator::returning(drafts(30));
        let input = GenerateCardsInput { deck_id, count: 50 };
        let err = generate_cards(&db, &alice_with_ai(), &generator, input)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ActionError::MalformedOutput(_)));
        assert!(db.list_cards(deck_id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_bounds() {
        let db = scratch_db();
        let deck_id = described_deck(&db);
        let generator = FakeGenerator::returning(drafts(1));
        for count in [0, 201] {
            let input = GenerateCardsInput { deck_id, count };
            let err = generate_cards(&db, &alice_with_ai(), &generator, input)
                .await
                .err()
                .unwrap();
            assert!(matches!(err, ActionError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_feature_not_entitled() {
        let db = scratch_db();
        let deck_id = described_deck(&db);
        let no_ai = ConfigIdentity::new(UserId::new("user_alice"), Vec::new());
        let generator = FakeGenerator::returning(drafts(1));
        let input = GenerateCardsInput { deck_id, count: 1 };
        let err = generate_cards(&db, &no_ai, &generator, input)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ActionError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let db = scratch_db();
        let deck_id = described_deck(&db);
        let generator = FakeGenerator::returning(drafts(1));
        let input = GenerateCardsInput { deck_id, count: 1 };
        let err = generate_cards(&db, &AnonymousIdentity, &generator, input)
            .await
            .err()
            .unwrap();
        assert_eq!(err, ActionError::Unauthorized);
    }

    #[tokio::test]
    async fn test_deck_without_description() {
        let db = scratch_db();
        let deck_id = db
            .create_deck(&UserId::new("user_alice"), "Spanish", None)
            .unwrap();
        let generator = FakeGenerator::returning(drafts(1));
        let input = GenerateCardsInput { deck_id, count: 1 };
        let err = generate_cards(&db, &alice_with_ai(), &generator, input)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ActionError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_provider() {
        let db = scratch_db();
        let deck_id = described_deck(&db);
        let generator = FakeGenerator::unconfigured();
        let input = GenerateCardsInput { deck_id, count: 1 };
        let err = generate_cards(&db, &alice_with_ai(), &generator, input)
            .await
            .err()
            .unwrap();
        assert_eq!(err, ActionError::ProviderNotConfigured);
    }

    #[tokio::test]
    async fn test_provider_quota_failure_propagates() {
        let db = scratch_db();
        let deck_id = described_deck(&db);
        let generator = FakeGenerator::failing(ActionError::QuotaExceeded);
        let input = GenerateCardsInput { deck_id, count: 1 };
        let err = generate_cards(&db, &alice_with_ai(), &generator, input)
            .await
            .err()
            .unwrap();
        assert_eq!(err, ActionError::QuotaExceeded);
        assert!(db.list_cards(deck_id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_draft_rejected() {
        let db = scratch_db();
        let deck_id = described_deck(&db);
        let bad = vec![DraftCard::new("x".repeat(FRONT_DRAFT_MAX + 1), "back")];
        let generator = FakeGenerator::returning(bad);
        let input = GenerateCardsInput { deck_id, count: 1 };
        let err = generate_cards(&db, &alice_with_ai(), &generator, input)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ActionError::MalformedOutput(_)));
        assert!(db.list_cards(deck_id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_deck_forbidden() {
        let db = scratch_db();
        let deck_id = db
            .create_deck(&UserId::new("user_bob"), "Spanish", Some("Vocab"))
            .unwrap();
        let generator = FakeGenerator::returning(drafts(1));
        let input = GenerateCardsInput { deck_id, count: 1 };
        let err = generate_cards(&db, &alice_with_ai(), &generator, input)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ActionError::Forbidden(_)));
    }
}
