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

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::card::Card;
use crate::types::card::CardId;

/// An ephemeral browsing session over a deck's cards. The session owns a
/// copy of the card list and reorders only that copy: the persisted card
/// order is never affected. Nothing here is written back to storage.
///
/// Precondition: the card list has no duplicate ids. Decks are the only
/// source of sessions and row ids are unique, so this is not checked.
pub struct StudySession {
    /// The cards in their current iteration order.
    cards: Vec<Card>,
    /// Current position. Invariant: `0 <= index < cards.len()`.
    index: usize,
    /// Whether the back of the current card is showing.
    flipped: bool,
    /// Ids of the cards the learner has marked as reviewed.
    studied: HashSet<CardId>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    Active,
    Completed,
}

impl StudySession {
    /// Construct a session over a non-empty card list. The view layer is
    /// responsible for routing empty decks to an empty-state page instead.
    pub fn new(cards: Vec<Card>) -> Fallible<Self> {
        if cards.is_empty() {
            return fail("cannot study an empty card list.");
        }
        Ok(Self {
            cards,
            index: 0,
            flipped: false,
            studied: HashSet::new(),
        })
    }

    pub fn state(&self) -> SessionState {
        if self.studied.len() == self.cards.len() {
            SessionState::Completed
        } else {
            SessionState::Active
        }
    }

    pub fn current(&self) -> &Card {
        &self.cards[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn studied_count(&self) -> usize {
        self.studied.len()
    }

    pub fn is_studied(&self, id: CardId) -> bool {
        self.studied.contains(&id)
    }

    /// Mark the current card studied and move forward. At the last card
    /// this is a no-op: the last card is only marked through `mark_studied`.
    pub fn advance(&mut self) {
        if self.index < self.cards.len() - 1 {
            let id = self.current().id;
            self.studied.insert(id);
            self.index += 1;
            self.flipped = false;
        }
    }

    /// Move backward. Does not touch the studied set: going back neither
    /// un-studies nor re-studies a card.
    pub fn retreat(&mut self) {
        if self.index > 0 {
            self.index -= 1;
            self.flipped = false;
        }
    }

    /// Toggle front/back visibility.
    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    /// Mark the current card studied, then advance.
    pub fn mark_studied(&mut self) {
        let id = self.current().id;
        self.studied.insert(id);
        self.advance();
        self.flipped = false;
    }

    /// Reorder the cards with an unbiased Fisher-Yates permutation, back to
    /// the first position, flip cleared. Progress is kept.
    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        self.cards.shuffle(rng);
        self.index = 0;
        self.flipped = false;
    }

    /// Back to the first card with zero progress. Keeps the current order.
    pub fn reset(&mut self) {
        self.index = 0;
        self.flipped = false;
        self.studied.clear();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::types::deck::DeckId;
    use crate::types::timestamp::Timestamp;

    fn card(id: i64, front: &str, back: &str) -> Card {
        Card {
            id: CardId::new(id),
            deck_id: DeckId::new(1),
            front: front.to_string(),
            back: back.to_string(),
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    fn three_cards() -> Vec<Card> {
        vec![card(1, "A", "a"), card(2, "B", "b"), card(3, "C", "c")]
    }

    #[test]
    fn test_empty_session_rejected() {
        let result = StudySession::new(Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_walkthrough() {
        // 3 cards [A,B,C]: flip, then mark studied three times.
        let mut session = StudySession::new(three_cards()).unwrap();
        session.flip();
        assert!(session.is_flipped());

        session.mark_studied();
        assert_eq!(session.studied_count(), 1);
        assert!(session.is_studied(CardId::new(1)));
        assert_eq!(session.index(), 1);
        assert!(!session.is_flipped());

        session.mark_studied();
        assert_eq!(session.studied_count(), 2);
        assert_eq!(session.index(), 2);

        session.mark_studied();
        assert_eq!(session.studied_count(), 3);
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn test_advance_is_noop_at_last_card() {
        let mut session = StudySession::new(three_cards()).unwrap();
        session.advance();
        session.advance();
        assert_eq!(session.index(), 2);
        session.advance();
        assert_eq!(session.index(), 2);
        // The last card was never marked studied by advancing into the wall.
        assert_eq!(session.studied_count(), 2);
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn test_retreat_keeps_studied_set() {
        let mut session = StudySession::new(three_cards()).unwrap();
        session.advance();
        assert_eq!(session.studied_count(), 1);
        session.retreat();
        assert_eq!(session.index(), 0);
        assert_eq!(session.studied_count(), 1);
        session.retreat();
        assert_eq!(session.index(), 0);
    }

    #[test]
    fn test_index_stays_in_bounds() {
        let mut session = StudySession::new(three_cards()).unwrap();
        let ops = [0, 1, 1, 1, 1, 0, 0, 0, 0, 1, 0, 1, 1, 1, 0];
        for op in ops {
            if op == 0 {
                session.retreat();
            } else {
                session.advance();
            }
            assert!(session.index() < session.len());
        }
    }

    #[test]
    fn test_completion_is_order_independent() {
        // Study the last card first, then walk back to the front.
        let mut session = StudySession::new(three_cards()).unwrap();
        session.advance();
        session.advance();
        session.mark_studied();
        assert_eq!(session.studied_count(), 3);
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn test_marking_same_card_twice_counts_once() {
        let mut session = StudySession::new(three_cards()).unwrap();
        session.advance();
        session.retreat();
        session.advance();
        assert_eq!(session.studied_count(), 1);
    }

    #[test]
    fn test_shuffle_preserves_multiset() {
        let mut session = StudySession::new(three_cards()).unwrap();
        session.advance();
        session.flip();
        let mut rng = StdRng::seed_from_u64(42);
        session.shuffle(&mut rng);
        assert_eq!(session.index(), 0);
        assert!(!session.is_flipped());
        // Same progress, same ids.
        assert_eq!(session.studied_count(), 1);
        let mut ids: Vec<i64> = Vec::new();
        for _ in 0..session.len() {
            ids.push(session.current().id.into_inner());
            session.advance();
        }
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_reset_clears_progress_keeps_order() {
        let mut session = StudySession::new(three_cards()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        session.shuffle(&mut rng);
        let first = session.current().id;
        session.mark_studied();
        session.mark_studied();
        session.reset();
        assert_eq!(session.index(), 0);
        assert_eq!(session.studied_count(), 0);
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.current().id, first);
    }

    #[test]
    fn test_single_card_completes_via_mark_studied() {
        let mut session = StudySession::new(vec![card(1, "A", "a")]).unwrap();
        session.advance();
        assert_eq!(session.state(), SessionState::Active);
        session.mark_studied();
        assert_eq!(session.state(), SessionState::Completed);
    }
}
