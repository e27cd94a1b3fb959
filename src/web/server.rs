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

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::time::sleep;

use crate::config::Config;
use crate::db::Database;
use crate::error::Fallible;
use crate::generate::OpenAiGenerator;
use crate::i18n::LOCALE_SETTING;
use crate::i18n::Locale;
use crate::identity::ConfigIdentity;
use crate::types::user::UserId;
use crate::web::get::dashboard_handler;
use crate::web::get::deck_handler;
use crate::web::get::study_handler;
use crate::web::get::study_start_handler;
use crate::web::post::create_card_handler;
use crate::web::post::create_deck_handler;
use crate::web::post::delete_card_handler;
use crate::web::post::delete_deck_handler;
use crate::web::post::generate_handler;
use crate::web::post::import_handler;
use crate::web::post::locale_handler;
use crate::web::post::study_action_handler;
use crate::web::post::update_card_handler;
use crate::web::post::update_deck_handler;
use crate::web::state::MutableState;
use crate::web::state::ServerState;

pub async fn start_server(config: Config, database_path: &str, open_browser: bool) -> Fallible<()> {
    let db = Database::new(database_path)?;
    let locale = initial_locale(&db)?;

    let identity = ConfigIdentity::new(UserId::new(config.user_id.clone()), config.features.clone());
    let generator = OpenAiGenerator::new(config.ai.clone());

    let state = ServerState {
        db,
        identity,
        generator,
        mutable: Arc::new(Mutex::new(MutableState {
            locale,
            study: None,
        })),
    };
    let app = Router::new();
    let app = app.route("/", get(dashboard_handler));
    let app = app.route("/decks", post(create_deck_handler));
    let app = app.route("/decks/{id}", get(deck_handler));
    let app = app.route("/decks/{id}/update", post(update_deck_handler));
    let app = app.route("/decks/{id}/delete", post(delete_deck_handler));
    let app = app.route("/decks/{id}/cards", post(create_card_handler));
    let app = app.route("/decks/{id}/import", post(import_handler));
    let app = app.route("/decks/{id}/generate", post(generate_handler));
    let app = app.route("/decks/{id}/study", get(study_start_handler));
    let app = app.route("/cards/{id}/update", post(update_card_handler));
    let app = app.route("/cards/{id}/delete", post(delete_card_handler));
    let app = app.route("/study", get(study_handler));
    let app = app.route("/study", post(study_action_handler));
    let app = app.route("/locale", post(locale_handler));
    let app = app.route("/script.js", get(script));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = config.bind;

    if open_browser {
        // Start a separate task to open the browser once the server is up.
        let url = format!("http://{bind}/");
        let addr = bind.clone();
        tokio::spawn(async move {
            loop {
                if let Ok(stream) = TcpStream::connect(&addr).await {
                    drop(stream);
                    break;
                }
                sleep(Duration::from_millis(1)).await;
            }
            let _ = open::that(url);
        });
    }

    // Start the server.
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// The locale persisted in the database wins. On a fresh database, fall
/// back to the `LANG` environment variable.
fn initial_locale(db: &Database) -> Fallible<Locale> {
    if let Some(code) = db.get_setting(LOCALE_SETTING)? {
        if let Some(locale) = Locale::from_code(&code) {
            return Ok(locale);
        }
        log::warn!("ignoring unknown persisted locale: {code}");
    }
    let tag = std::env::var("LANG").unwrap_or_default();
    Ok(Locale::from_language_tag(&tag))
}

async fn script() -> (StatusCode, [(HeaderName, &'static str); 1], &'static str) {
    let content = include_str!("script.js");
    (StatusCode::OK, [(CONTENT_TYPE, "text/javascript")], content)
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}
