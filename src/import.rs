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

use crate::types::card::DraftCard;
use crate::types::card::SIDE_MAX;

/// Parse the card import format: one card per line, the first
/// comma-separated field is the front, the rest of the line (commas and
/// all) is the back. Lines starting with `#` and blank lines are skipped.
/// Rows with an empty side, or a side over the card length limit, are
/// dropped without comment.
pub fn parse_import(content: &str) -> Vec<DraftCard> {
    let mut drafts = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((front, back)) = line.split_once(',') else {
            continue;
        };
        let front = front.trim();
        let back = back.trim();
        if front.is_empty() || back.is_empty() {
            continue;
        }
        if front.chars().count() > SIDE_MAX || back.chars().count() > SIDE_MAX {
            continue;
        }
        drafts.push(DraftCard::new(front, back));
    }
    drafts
}
