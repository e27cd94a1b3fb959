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
use crate::identity::Identity;
use crate::import::parse_import;
use crate::types::card::CardId;
use crate::types::card::SIDE_MAX;
use crate::types::deck::DeckId;

pub struct CreateCardInput {
    pub deck_id: DeckId,
    pub front: String,
    pub back: String,
}

pub struct UpdateCardInput {
    pub id: CardId,
    pub front: String,
    pub back: String,
}

pub struct ImportCardsInput {
    pub deck_id: DeckId,
    /// The raw text of the uploaded CSV file.
    pub content: String,
}

pub fn create_card(
    db: &Database,
    identity: &impl Identity,
    input: CreateCardInput,
) -> ActionResult<CardId> {
    let user_id = require_user(identity)?;
    let front = validate_side("front", &input.front)?;
    let back = validate_side("back", &input.back)?;
    db.create_card(&user_id, input.deck_id, front, back)
}

pub fn update_card(
    db: &Database,
    identity: &impl Identity,
    input: UpdateCardInput,
) -> ActionResult<()> {
    let user_id = require_user(identity)?;
    let front = validate_side("front", &input.front)?;
    let back = validate_side("back", &input.back)?;
    db.update_card(&user_id, input.id, front, back)
}

pub fn delete_card(db: &Database, identity: &impl Identity, id: CardId) -> ActionResult<()> {
    let user_id = require_user(identity)?;
    db.delete_card(&user_id, id)
}

/// Import cards from the CSV format. Invalid rows are dropped during
/// parsing; an import with no valid rows fails without touching the deck,
/// and an import with any is a single all-or-nothing insert.
pub fn import_cards(
    db: &Database,
    identity: &impl Identity,
    input: ImportCardsInput,
) -> ActionResult<usize> {
    let user_id = require_user(identity)?;
    let drafts = parse_import(&input.content);
    if drafts.is_empty() {
        return Err(ActionError::ImportFormat("no valid rows".to_string()));
    }
    let inserted = db.insert_cards(&user_id, input.deck_id, &drafts)?;
    log::debug!("Imported {inserted} cards into deck {}", input.deck_id);
    Ok(inserted)
}

fn validate_side<'a>(name: &str, text: &'a str) -> ActionResult<&'a str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ActionError::Validation(format!("{name} side is required")));
    }
    if text.chars().count() > SIDE_MAX {
        return Err(ActionError::Validation(format!(
            "{name} side must be at most {SIDE_MAX} characters"
        )));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AnonymousIdentity;
    use crate::identity::ConfigIdentity;
    use crate::types::user::UserId;

    fn scratch_db() -> Database {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flashdeck.db");
        std::mem::forget(dir);
        Database::new(path.to_str().unwrap()).unwrap()
    }

    fn alice() -> ConfigIdentity {
        ConfigIdentity::new(UserId::new("user_alice"), Vec::new())
    }

    fn deck_for(db: &Database, user: &str) -> DeckId {
        db.create_deck(&UserId::new(user), "Spanish", None).unwrap()
    }

    #[test]
    fn test_create_and_update_card() {
        let db = scratch_db();
        let deck_id = deck_for(&db, "user_alice");
        let id = create_card(
            &db,
            &alice(),
            CreateCardInput {
                deck_id,
                front: " cat ".to_string(),
                back: "gato".to_string(),
            },
        )
        .unwrap();

        let card = db.get_card(&UserId::new("user_alice"), id).unwrap();
        assert_eq!(card.front, "cat");

        update_card(
            &db,
            &alice(),
            UpdateCardInput {
                id,
                front: "the cat".to_string(),
                back: "el gato".to_string(),
            },
        )
        .unwrap();
        let card = db.get_card(&UserId::new("user_alice"), id).unwrap();
        assert_eq!(card.front, "the cat");
        assert_eq!(card.back, "el gato");
    }

    #[test]
    fn test_card_validation() {
        let db = scratch_db();
        let deck_id = deck_for(&db, "user_alice");
        let err = create_card(
            &db,
            &alice(),
            CreateCardInput {
                deck_id,
                front: "".to_string(),
                back: "gato".to_string(),
            },
        )
        .err()
        .unwrap();
        assert!(matches!(err, ActionError::Validation(_)));

        let err = create_card(
            &db,
            &alice(),
            CreateCardInput {
                deck_id,
                front: "cat".to_string(),
                back: "x".repeat(SIDE_MAX + 1),
            },
        )
        .err()
        .unwrap();
        assert!(matches!(err, ActionError::Validation(_)));
    }

    #[test]
    fn test_mutating_foreign_card_is_forbidden() {
        let db = scratch_db();
        let deck_id = deck_for(&db, "user_bob");
        let id = db
            .create_card(&UserId::new("user_bob"), deck_id, "cat", "gato")
            .unwrap();

        let err = update_card(
            &db,
            &alice(),
            UpdateCardInput {
                id,
                front: "x".to_string(),
                back: "y".to_string(),
            },
        )
        .err()
        .unwrap();
        assert!(matches!(err, ActionError::Forbidden(_)));

        let err = delete_card(&db, &alice(), id).err().unwrap();
        assert!(matches!(err, ActionError::Forbidden(_)));

        // No mutation happened.
        let card = db.get_card(&UserId::new("user_bob"), id).unwrap();
        assert_eq!(card.front, "cat");
    }

    #[test]
    fn test_import_cards() {
        let db = scratch_db();
        let deck_id = deck_for(&db, "user_alice");
        let input = ImportCardsInput {
            deck_id,
            content: "cat,gato\n#comment\ndog,perro\n,empty\n".to_string(),
        };
        let inserted = import_cards(&db, &alice(), input).unwrap();
        assert_eq!(inserted, 2);
        let cards = db.list_cards(deck_id).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].front, "cat");
        assert_eq!(cards[0].back, "gato");
        assert_eq!(cards[1].front, "dog");
        assert_eq!(cards[1].back, "perro");
    }

    #[test]
    fn test_import_with_no_valid_rows_fails() {
        let db = scratch_db();
        let deck_id = deck_for(&db, "user_alice");
        let input = ImportCardsInput {
            deck_id,
            content: "#only\n#comments\n".to_string(),
        };
        let err = import_cards(&db, &alice(), input).err().unwrap();
        assert!(matches!(err, ActionError::ImportFormat(_)));
        assert!(db.list_cards(deck_id).unwrap().is_empty());
    }

    #[test]
    fn test_import_into_foreign_deck_is_forbidden() {
        let db = scratch_db();
        let deck_id = deck_for(&db, "user_bob");
        let input = ImportCardsInput {
            deck_id,
            content: "cat,gato\n".to_string(),
        };
        let err = import_cards(&db, &alice(), input).err().unwrap();
        assert!(matches!(err, ActionError::Forbidden(_)));
        assert!(db.list_cards(deck_id).unwrap().is_empty());
    }

    #[test]
    fn test_actions_require_identity() {
        let db = scratch_db();
        let deck_id = deck_for(&db, "user_alice");
        let err = import_cards(
            &db,
            &AnonymousIdentity,
            ImportCardsInput {
                deck_id,
                content: "cat,gato\n".to_string(),
            },
        )
        .err()
        .unwrap();
        assert_eq!(err, ActionError::Unauthorized);
    }
}
