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

use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use serde::Deserialize;

use crate::error::ActionError;
use crate::i18n::Locale;
use crate::i18n::translate;
use crate::identity::Identity;
use crate::study::StudySession;
use crate::types::deck::DeckId;
use crate::types::user::UserId;
use crate::web::state::ActiveStudy;
use crate::web::state::ServerState;
use crate::web::template::page_template;
use crate::web::view;

/// Flash parameters carried through the post-redirect-get cycle.
#[derive(Deserialize)]
pub struct PageQuery {
    error: Option<String>,
    imported: Option<usize>,
    generated: Option<usize>,
}

fn page(locale: Locale, status: StatusCode, body: maud::Markup) -> Response {
    let html = page_template(locale, body);
    (status, Html(html.into_string())).into_response()
}

fn error_page(locale: Locale, error: &ActionError) -> Response {
    let status = match error {
        ActionError::Unauthorized => StatusCode::UNAUTHORIZED,
        ActionError::Forbidden(_) => StatusCode::FORBIDDEN,
        ActionError::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = maud::html! {
        div.root {
            div.error {
                (translate(locale, error.message_key()))
            }
        }
    };
    page(locale, status, body)
}

fn current_user(state: &ServerState) -> Result<UserId, ActionError> {
    state.identity.current_user().ok_or(ActionError::Unauthorized)
}

pub async fn dashboard_handler(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Response {
    let locale = state.mutable.lock().unwrap().locale;
    let user_id = match current_user(&state) {
        Ok(user_id) => user_id,
        Err(e) => return error_page(locale, &e),
    };
    let decks = match state.db.list_decks(&user_id) {
        Ok(decks) => decks,
        Err(e) => return error_page(locale, &e),
    };
    let total_cards = match state.db.count_cards(&user_id) {
        Ok(count) => count,
        Err(e) => return error_page(locale, &e),
    };
    let body = view::dashboard(locale, &decks, total_cards, query.error.as_deref());
    page(locale, StatusCode::OK, body)
}

pub async fn deck_handler(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Response {
    let locale = state.mutable.lock().unwrap().locale;
    let user_id = match current_user(&state) {
        Ok(user_id) => user_id,
        Err(e) => return error_page(locale, &e),
    };
    let deck_id = DeckId::new(id);
    let deck = match state.db.get_deck(&user_id, deck_id) {
        Ok(deck) => deck,
        Err(e) => return error_page(locale, &e),
    };
    let cards = match state.db.list_cards(deck_id) {
        Ok(cards) => cards,
        Err(e) => return error_page(locale, &e),
    };
    let notice = if let Some(n) = query.imported {
        Some(format!("{n} {}", translate(locale, "deck.imported")))
    } else {
        query
            .generated
            .map(|n| format!("{n} {}", translate(locale, "deck.generated")))
    };
    let body = view::deck_page(
        locale,
        &deck,
        &cards,
        query.error.as_deref(),
        notice.as_deref(),
    );
    page(locale, StatusCode::OK, body)
}

/// Open a study session over a deck's cards. Empty decks route to an
/// empty-state page; a session is never constructed for them.
pub async fn study_start_handler(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Response {
    let locale = state.mutable.lock().unwrap().locale;
    let user_id = match current_user(&state) {
        Ok(user_id) => user_id,
        Err(e) => return error_page(locale, &e),
    };
    let deck_id = DeckId::new(id);
    let deck = match state.db.get_deck(&user_id, deck_id) {
        Ok(deck) => deck,
        Err(e) => return error_page(locale, &e),
    };
    let cards = match state.db.list_cards(deck_id) {
        Ok(cards) => cards,
        Err(e) => return error_page(locale, &e),
    };
    if cards.is_empty() {
        let body = view::study_empty(locale, &deck);
        return page(locale, StatusCode::OK, body);
    }
    let session = match StudySession::new(cards) {
        Ok(session) => session,
        Err(e) => {
            log::error!("error: {e}");
            return error_page(locale, &ActionError::Internal(e.to_string()));
        }
    };
    let mut mutable = state.mutable.lock().unwrap();
    mutable.study = Some(ActiveStudy { deck, session });
    Redirect::to("/study").into_response()
}

pub async fn study_handler(State(state): State<ServerState>) -> Response {
    let mutable = state.mutable.lock().unwrap();
    let locale = mutable.locale;
    match &mutable.study {
        None => Redirect::to("/").into_response(),
        Some(study) => {
            let body = view::study_page(locale, study);
            page(locale, StatusCode::OK, body)
        }
    }
}
