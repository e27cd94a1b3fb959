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
use crate::types::deck::DESCRIPTION_MAX;
use crate::types::deck::DeckId;
use crate::types::deck::TITLE_MAX;

pub struct CreateDeckInput {
    pub title: String,
    pub description: Option<String>,
}

/// Partial update: absent fields keep their current value.
pub struct UpdateDeckInput {
    pub id: DeckId,
    pub title: Option<String>,
    pub description: Option<String>,
}

pub fn create_deck(
    db: &Database,
    identity: &impl Identity,
    input: CreateDeckInput,
) -> ActionResult<DeckId> {
    let user_id = require_user(identity)?;
    let title = validate_title(&input.title)?;
    let description = validate_description(input.description.as_deref())?;
    db.create_deck(&user_id, title, description)
}

pub fn update_deck(
    db: &Database,
    identity: &impl Identity,
    input: UpdateDeckInput,
) -> ActionResult<()> {
    let user_id = require_user(identity)?;
    let title = match &input.title {
        Some(title) => Some(validate_title(title)?.to_string()),
        None => None,
    };
    let description = match &input.description {
        Some(description) => validate_description(Some(description))?.map(str::to_string),
        None => None,
    };
    // Ownership is checked by the fetch; absent fields fall back to the
    // stored values.
    let deck = db.get_deck(&user_id, input.id)?;
    let title = title.unwrap_or(deck.title);
    let description = match input.description {
        Some(_) => description,
        None => deck.description,
    };
    db.update_deck(&user_id, input.id, &title, description.as_deref())
}

pub fn delete_deck(db: &Database, identity: &impl Identity, id: DeckId) -> ActionResult<()> {
    let user_id = require_user(identity)?;
    db.delete_deck(&user_id, id)
}

fn validate_title(title: &str) -> ActionResult<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ActionError::Validation("title is required".to_string()));
    }
    if title.chars().count() > TITLE_MAX {
        return Err(ActionError::Validation(format!(
            "title must be at most {TITLE_MAX} characters"
        )));
    }
    Ok(title)
}

/// An empty description normalizes to `None`.
fn validate_description(description: Option<&str>) -> ActionResult<Option<&str>> {
    match description {
        None => Ok(None),
        Some(description) => {
            let description = description.trim();
            if description.is_empty() {
                return Ok(None);
            }
            if description.chars().count() > DESCRIPTION_MAX {
                return Err(ActionError::Validation(format!(
                    "description must be at most {DESCRIPTION_MAX} characters"
                )));
            }
            Ok(Some(description))
        }
    }
}
