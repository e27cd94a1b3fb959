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

use crate::db::Database;
use crate::generate::OpenAiGenerator;
use crate::i18n::Locale;
use crate::identity::ConfigIdentity;
use crate::study::StudySession;
use crate::types::deck::Deck;

#[derive(Clone)]
pub struct ServerState {
    pub db: Database,
    pub identity: ConfigIdentity,
    pub generator: OpenAiGenerator,
    pub mutable: Arc<Mutex<MutableState>>,
}

pub struct MutableState {
    pub locale: Locale,
    /// The active study session, if a study page is open. One logical
    /// session exists per server; starting a study page for another deck
    /// replaces it.
    pub study: Option<ActiveStudy>,
}

/// A study session together with the deck it was opened from.
pub struct ActiveStudy {
    pub deck: Deck,
    pub session: StudySession,
}
