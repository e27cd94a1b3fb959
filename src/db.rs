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
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;

use crate::error::ActionError;
use crate::error::ActionResult;
use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::card::CardId;
use crate::types::card::DraftCard;
use crate::types::deck::Deck;
use crate::types::deck::DeckId;
use crate::types::timestamp::Timestamp;
use crate::types::user::UserId;

/// The persistence store. Every mutating operation takes the requesting
/// user and verifies ownership (directly for decks, through the parent deck
/// for cards) before touching anything, inside the same transaction as the
/// mutation itself.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Create a deck owned by the given user.
    pub fn create_deck(
        &self,
        user_id: &UserId,
        title: &str,
        description: Option<&str>,
    ) -> ActionResult<DeckId> {
        let now = Timestamp::now();
        let conn = self.acquire();
        let sql = "insert into decks (title, description, user_id, created_at, updated_at) values (?, ?, ?, ?, ?) returning deck_id;";
        let deck_id: DeckId = conn.query_row(
            sql,
            (title, description, user_id, now, now),
            |row| row.get(0),
        )?;
        log::debug!("Created deck {deck_id} for user {user_id}");
        Ok(deck_id)
    }

    /// List the given user's decks, most recently created first.
    pub fn list_decks(&self, user_id: &UserId) -> ActionResult<Vec<Deck>> {
        let conn = self.acquire();
        let sql = "select deck_id, title, description, user_id, created_at, updated_at from decks where user_id = ? order by created_at desc, deck_id desc;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([user_id])?;
        let mut decks = Vec::new();
        while let Some(row) = rows.next()? {
            decks.push(read_deck(row)?);
        }
        Ok(decks)
    }

    /// Fetch a deck, verifying the requester owns it.
    pub fn get_deck(&self, user_id: &UserId, deck_id: DeckId) -> ActionResult<Deck> {
        let conn = self.acquire();
        get_deck_checked(&conn, user_id, deck_id)
    }

    /// Replace a deck's title and description.
    pub fn update_deck(
        &self,
        user_id: &UserId,
        deck_id: DeckId,
        title: &str,
        description: Option<&str>,
    ) -> ActionResult<()> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        get_deck_checked(&tx, user_id, deck_id)?;
        let sql = "update decks set title = ?, description = ?, updated_at = ? where deck_id = ?;";
        tx.execute(sql, (title, description, Timestamp::now(), deck_id))?;
        tx.commit()?;
        Ok(())
    }

    /// Delete a deck. Its cards go with it (foreign key cascade).
    pub fn delete_deck(&self, user_id: &UserId, deck_id: DeckId) -> ActionResult<()> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        get_deck_checked(&tx, user_id, deck_id)?;
        tx.execute("delete from decks where deck_id = ?;", [deck_id])?;
        tx.commit()?;
        log::debug!("Deleted deck {deck_id}");
        Ok(())
    }

    /// Create a card in a deck the requester owns.
    pub fn create_card(
        &self,
        user_id: &UserId,
        deck_id: DeckId,
        front: &str,
        back: &str,
    ) -> ActionResult<CardId> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        get_deck_checked(&tx, user_id, deck_id)?;
        let card_id = insert_card(&tx, deck_id, front, back)?;
        tx.commit()?;
        Ok(card_id)
    }

    /// Insert a batch of cards into a deck the requester owns, all in one
    /// transaction: either every draft lands or none does.
    pub fn insert_cards(
        &self,
        user_id: &UserId,
        deck_id: DeckId,
        drafts: &[DraftCard],
    ) -> ActionResult<usize> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        get_deck_checked(&tx, user_id, deck_id)?;
        for draft in drafts {
            insert_card(&tx, deck_id, &draft.front, &draft.back)?;
        }
        tx.commit()?;
        log::debug!("Inserted {} cards into deck {deck_id}", drafts.len());
        Ok(drafts.len())
    }

    /// List a deck's cards in storage order. The caller is expected to have
    /// gated access through `get_deck`.
    pub fn list_cards(&self, deck_id: DeckId) -> ActionResult<Vec<Card>> {
        let conn = self.acquire();
        let sql = "select card_id, deck_id, front, back, created_at, updated_at from cards where deck_id = ? order by card_id;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([deck_id])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(read_card(row)?);
        }
        Ok(cards)
    }

    /// Fetch a card, verifying ownership through its parent deck.
    pub fn get_card(&self, user_id: &UserId, card_id: CardId) -> ActionResult<Card> {
        let conn = self.acquire();
        get_card_checked(&conn, user_id, card_id)
    }

    /// Replace a card's front and back text.
    pub fn update_card(
        &self,
        user_id: &UserId,
        card_id: CardId,
        front: &str,
        back: &str,
    ) -> ActionResult<()> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        get_card_checked(&tx, user_id, card_id)?;
        let sql = "update cards set front = ?, back = ?, updated_at = ? where card_id = ?;";
        tx.execute(sql, (front, back, Timestamp::now(), card_id))?;
        tx.commit()?;
        Ok(())
    }

    /// Delete a card.
    pub fn delete_card(&self, user_id: &UserId, card_id: CardId) -> ActionResult<()> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        get_card_checked(&tx, user_id, card_id)?;
        tx.execute("delete from cards where card_id = ?;", [card_id])?;
        tx.commit()?;
        Ok(())
    }

    /// Number of cards in each of the user's decks is cheap enough to count
    /// per deck page; the dashboard wants the total.
    pub fn count_cards(&self, user_id: &UserId) -> ActionResult<usize> {
        let conn = self.acquire();
        let sql = "select count(*) from cards c join decks d on d.deck_id = c.deck_id where d.user_id = ?;";
        let count: i64 = conn.query_row(sql, [user_id], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Read a value from the settings key-value table.
    pub fn get_setting(&self, key: &str) -> Fallible<Option<String>> {
        let conn = self.acquire();
        let sql = "select value from settings where key = ?;";
        let value: Option<String> = conn.query_row(sql, [key], |row| row.get(0)).optional()?;
        Ok(value)
    }

    /// Write a value to the settings key-value table.
    pub fn put_setting(&self, key: &str, value: &str) -> Fallible<()> {
        let conn = self.acquire();
        let sql = "insert into settings (key, value) values (?, ?) on conflict (key) do update set value = excluded.value;";
        conn.execute(sql, (key, value))?;
        Ok(())
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

/// Fetch a deck by id, distinguishing a missing deck from one owned by
/// somebody else.
fn get_deck_checked(
    conn: &Connection,
    user_id: &UserId,
    deck_id: DeckId,
) -> ActionResult<Deck> {
    let sql = "select deck_id, title, description, user_id, created_at, updated_at from decks where deck_id = ?;";
    let deck: Option<Deck> = conn.query_row(sql, [deck_id], read_deck).optional()?;
    match deck {
        None => Err(ActionError::NotFound),
        Some(deck) => {
            if &deck.user_id != user_id {
                Err(ActionError::Forbidden("not the deck owner".to_string()))
            } else {
                Ok(deck)
            }
        }
    }
}

fn get_card_checked(
    conn: &Connection,
    user_id: &UserId,
    card_id: CardId,
) -> ActionResult<Card> {
    let sql = "select c.card_id, c.deck_id, c.front, c.back, c.created_at, c.updated_at, d.user_id from cards c join decks d on d.deck_id = c.deck_id where c.card_id = ?;";
    let result: Option<(Card, UserId)> = conn
        .query_row(sql, [card_id], |row| {
            let card = read_card(row)?;
            let owner: UserId = row.get(6)?;
            Ok((card, owner))
        })
        .optional()?;
    match result {
        None => Err(ActionError::NotFound),
        Some((card, owner)) => {
            if &owner != user_id {
                Err(ActionError::Forbidden("not the deck owner".to_string()))
            } else {
                Ok(card)
            }
        }
    }
}

fn insert_card(tx: &Transaction, deck_id: DeckId, front: &str, back: &str) -> ActionResult<CardId> {
    let now = Timestamp::now();
    let sql = "insert into cards (deck_id, front, back, created_at, updated_at) values (?, ?, ?, ?, ?) returning card_id;";
    let card_id: CardId = tx.query_row(sql, (deck_id, front, back, now, now), |row| row.get(0))?;
    Ok(card_id)
}

fn read_deck(row: &rusqlite::Row) -> Result<Deck, rusqlite::Error> {
    Ok(Deck {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        user_id: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn read_card(row: &rusqlite::Row) -> Result<Card, rusqlite::Error> {
    Ok(Card {
        id: row.get(0)?,
        deck_id: row.get(1)?,
        front: row.get(2)?,
        back: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["decks"], |row| row.get(0))?;
    Ok(count > 0)
}
