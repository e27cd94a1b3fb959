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

use axum::Form;
use axum::extract::Path;
use axum::extract::State;
use axum::response::Redirect;
use serde::Deserialize;

use crate::actions;
use crate::actions::ai::GenerateCardsInput;
use crate::actions::card::CreateCardInput;
use crate::actions::card::ImportCardsInput;
use crate::actions::card::UpdateCardInput;
use crate::actions::deck::CreateDeckInput;
use crate::actions::deck::UpdateDeckInput;
use crate::error::ActionError;
use crate::i18n::LOCALE_SETTING;
use crate::i18n::Locale;
use crate::identity::Identity;
use crate::types::card::CardId;
use crate::types::deck::DeckId;
use crate::web::state::ServerState;

fn to_dashboard(result: Result<(), ActionError>) -> Redirect {
    match result {
        Ok(()) => Redirect::to("/"),
        Err(e) => {
            log::error!("action failed: {e}");
            Redirect::to(&format!("/?error={}", e.message_key()))
        }
    }
}

fn to_deck(deck_id: DeckId, result: Result<(), ActionError>) -> Redirect {
    match result {
        Ok(()) => Redirect::to(&format!("/decks/{deck_id}")),
        Err(e) => {
            log::error!("action failed: {e}");
            Redirect::to(&format!("/decks/{deck_id}?error={}", e.message_key()))
        }
    }
}

#[derive(Deserialize)]
pub struct DeckForm {
    title: String,
    description: Option<String>,
}

pub async fn create_deck_handler(
    State(state): State<ServerState>,
    Form(form): Form<DeckForm>,
) -> Redirect {
    let input = CreateDeckInput {
        title: form.title,
        description: form.description,
    };
    let result = actions::deck::create_deck(&state.db, &state.identity, input).map(|_| ());
    to_dashboard(result)
}

pub async fn update_deck_handler(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Form(form): Form<DeckForm>,
) -> Redirect {
    let deck_id = DeckId::new(id);
    let input = UpdateDeckInput {
        id: deck_id,
        title: Some(form.title),
        description: form.description,
    };
    to_deck(
        deck_id,
        actions::deck::update_deck(&state.db, &state.identity, input),
    )
}

pub async fn delete_deck_handler(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Redirect {
    let deck_id = DeckId::new(id);
    match actions::deck::delete_deck(&state.db, &state.identity, deck_id) {
        Ok(()) => Redirect::to("/"),
        Err(e) => {
            log::error!("action failed: {e}");
            Redirect::to(&format!("/decks/{deck_id}?error={}", e.message_key()))
        }
    }
}

#[derive(Deserialize)]
pub struct CardForm {
    front: String,
    back: String,
}

pub async fn create_card_handler(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Form(form): Form<CardForm>,
) -> Redirect {
    let deck_id = DeckId::new(id);
    let input = CreateCardInput {
        deck_id,
        front: form.front,
        back: form.back,
    };
    to_deck(
        deck_id,
        actions::card::create_card(&state.db, &state.identity, input).map(|_| ()),
    )
}

pub async fn update_card_handler(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Form(form): Form<CardForm>,
) -> Redirect {
    let card_id = CardId::new(id);
    // The card's deck is where the user lands afterwards, so look it up
    // before mutating.
    let deck_id = deck_of_card(&state, card_id);
    let input = UpdateCardInput {
        id: card_id,
        front: form.front,
        back: form.back,
    };
    let result = actions::card::update_card(&state.db, &state.identity, input);
    match deck_id {
        Some(deck_id) => to_deck(deck_id, result),
        None => to_dashboard(result.and(Err(ActionError::NotFound))),
    }
}

pub async fn delete_card_handler(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Redirect {
    let card_id = CardId::new(id);
    let deck_id = deck_of_card(&state, card_id);
    let result = actions::card::delete_card(&state.db, &state.identity, card_id);
    match deck_id {
        Some(deck_id) => to_deck(deck_id, result),
        None => to_dashboard(result.and(Err(ActionError::NotFound))),
    }
}

fn deck_of_card(state: &ServerState, card_id: CardId) -> Option<DeckId> {
    let user_id = state.identity.current_user()?;
    state
        .db
        .get_card(&user_id, card_id)
        .ok()
        .map(|card| card.deck_id)
}

#[derive(Deserialize)]
pub struct ImportForm {
    content: String,
}

pub async fn import_handler(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Form(form): Form<ImportForm>,
) -> Redirect {
    let deck_id = DeckId::new(id);
    let input = ImportCardsInput {
        deck_id,
        content: form.content,
    };
    match actions::card::import_cards(&state.db, &state.identity, input) {
        Ok(inserted) => Redirect::to(&format!("/decks/{deck_id}?imported={inserted}")),
        Err(e) => {
            log::error!("import failed: {e}");
            Redirect::to(&format!("/decks/{deck_id}?error={}", e.message_key()))
        }
    }
}

#[derive(Deserialize)]
pub struct GenerateForm {
    count: usize,
}

pub async fn generate_handler(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Form(form): Form<GenerateForm>,
) -> Redirect {
    let deck_id = DeckId::new(id);
    let input = GenerateCardsInput {
        deck_id,
        count: form.count,
    };
    let result = actions::ai::generate_cards(
        &state.db,
        &state.identity,
        &state.generator,
        input,
    )
    .await;
    match result {
        Ok(inserted) => Redirect::to(&format!("/decks/{deck_id}?generated={inserted}")),
        Err(e) => {
            log::error!("generation failed: {e}");
            Redirect::to(&format!("/decks/{deck_id}?error={}", e.message_key()))
        }
    }
}

#[derive(Debug, Deserialize)]
enum StudyAction {
    Flip,
    Next,
    Previous,
    MarkStudied,
    Shuffle,
    Reset,
}

#[derive(Deserialize)]
pub struct StudyForm {
    action: StudyAction,
}

pub async fn study_action_handler(
    State(state): State<ServerState>,
    Form(form): Form<StudyForm>,
) -> Redirect {
    let mut mutable = state.mutable.lock().unwrap();
    let Some(study) = mutable.study.as_mut() else {
        return Redirect::to("/");
    };
    let session = &mut study.session;
    match form.action {
        StudyAction::Flip => session.flip(),
        StudyAction::Next => session.advance(),
        StudyAction::Previous => session.retreat(),
        StudyAction::MarkStudied => session.mark_studied(),
        StudyAction::Shuffle => session.shuffle(&mut rand::thread_rng()),
        StudyAction::Reset => session.reset(),
    }
    Redirect::to("/study")
}

#[derive(Deserialize)]
pub struct LocaleForm {
    locale: String,
}

pub async fn locale_handler(
    State(state): State<ServerState>,
    Form(form): Form<LocaleForm>,
) -> Redirect {
    match Locale::from_code(&form.locale) {
        None => {
            log::error!("unknown locale code: {}", form.locale);
        }
        Some(locale) => {
            state.mutable.lock().unwrap().locale = locale;
            if let Err(e) = state.db.put_setting(LOCALE_SETTING, locale.code()) {
                log::error!("failed to persist locale: {e}");
            }
        }
    }
    Redirect::to("/")
}
