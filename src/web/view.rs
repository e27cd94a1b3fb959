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

use maud::Markup;
use maud::html;

use crate::i18n::Locale;
use crate::i18n::translate;
use crate::study::SessionState;
use crate::types::card::Card;
use crate::types::deck::Deck;
use crate::web::state::ActiveStudy;

/// Localized banner for a failed action, rendered above the page content.
fn error_banner(locale: Locale, error: Option<&str>) -> Markup {
    html! {
        @if let Some(key) = error {
            div.error {
                (translate(locale, key))
            }
        }
    }
}

fn notice_banner(notice: Option<&str>) -> Markup {
    html! {
        @if let Some(notice) = notice {
            div.notice {
                (notice)
            }
        }
    }
}

pub fn dashboard(
    locale: Locale,
    decks: &[Deck],
    total_cards: usize,
    error: Option<&str>,
) -> Markup {
    let t = |key| translate(locale, key);
    html! {
        div.root {
            (error_banner(locale, error))
            div.stats {
                span { (decks.len()) " " (t("dashboard.deckCount")) }
                span { (total_cards) " " (t("dashboard.cardCount")) }
            }
            h1 { (t("dashboard.heading")) }
            @if decks.is_empty() {
                p.empty { (t("dashboard.empty")) }
            } @else {
                ul.decks {
                    @for deck in decks {
                        li.deck {
                            a href={ "/decks/" (deck.id) } { (deck.title) }
                            @if let Some(description) = &deck.description {
                                p.description { (description) }
                            }
                            span.updated { (deck.updated_at.local_display()) }
                        }
                    }
                }
            }
            div.create-deck {
                h2 { (t("dashboard.createTitle")) }
                form action="/decks" method="post" {
                    label for="title" { (t("dashboard.titleLabel")) }
                    input id="title" type="text" name="title" maxlength="255" required;
                    label for="description" { (t("dashboard.descriptionLabel")) }
                    textarea id="description" name="description" maxlength="1000" {}
                    input type="submit" value=(t("dashboard.createSubmit"));
                }
            }
        }
    }
}

pub fn deck_page(
    locale: Locale,
    deck: &Deck,
    cards: &[Card],
    error: Option<&str>,
    notice: Option<&str>,
) -> Markup {
    let t = |key| translate(locale, key);
    html! {
        div.root {
            (error_banner(locale, error))
            (notice_banner(notice))
            div.deck-header {
                h1 { (deck.title) }
                @if let Some(description) = &deck.description {
                    p.description { (description) }
                }
                a.study href={ "/decks/" (deck.id) "/study" } { (t("deck.study")) }
            }
            div.deck-edit {
                form action={ "/decks/" (deck.id) "/update" } method="post" {
                    input type="text" name="title" value=(deck.title) maxlength="255" required;
                    textarea name="description" maxlength="1000" {
                        @if let Some(description) = &deck.description { (description) }
                    }
                    input type="submit" value=(t("deck.edit"));
                }
                form action={ "/decks/" (deck.id) "/delete" } method="post" {
                    input.danger type="submit" value=(t("deck.delete"));
                }
            }
            h2 { (t("deck.cardsHeading")) }
            @if cards.is_empty() {
                p.empty { (t("deck.empty")) }
            } @else {
                ul.cards {
                    @for card in cards {
                        li.card-row {
                            form action={ "/cards/" (card.id) "/update" } method="post" {
                                input type="text" name="front" value=(card.front) maxlength="1000" required;
                                input type="text" name="back" value=(card.back) maxlength="1000" required;
                                input type="submit" value=(t("deck.edit"));
                            }
                            form action={ "/cards/" (card.id) "/delete" } method="post" {
                                input.danger type="submit" value=(t("deck.delete"));
                            }
                        }
                    }
                }
            }
            div.add-card {
                h2 { (t("deck.addCard")) }
                form action={ "/decks/" (deck.id) "/cards" } method="post" {
                    label { (t("deck.front")) }
                    input type="text" name="front" maxlength="1000" required;
                    label { (t("deck.back")) }
                    input type="text" name="back" maxlength="1000" required;
                    input type="submit" value=(t("deck.addCard"));
                }
            }
            div.import {
                h2 { (t("deck.importHeading")) }
                p.hint { (t("deck.importHint")) }
                form action={ "/decks/" (deck.id) "/import" } method="post" {
                    textarea name="content" rows="6" {}
                    input type="submit" value=(t("deck.importSubmit"));
                }
            }
            div.generate {
                h2 { (t("deck.aiHeading")) }
                form action={ "/decks/" (deck.id) "/generate" } method="post" {
                    label { (t("deck.aiCountLabel")) }
                    input type="number" name="count" min="1" max="200" value="10";
                    input type="submit" value=(t("deck.aiSubmit"));
                }
            }
        }
    }
}

pub fn study_page(locale: Locale, study: &ActiveStudy) -> Markup {
    match study.session.state() {
        SessionState::Completed => study_complete(locale, study),
        SessionState::Active => study_active(locale, study),
    }
}

fn study_active(locale: Locale, study: &ActiveStudy) -> Markup {
    let t = |key| translate(locale, key);
    let session = &study.session;
    let card = session.current();
    let studied = session.is_studied(card.id);
    html! {
        div.root {
            div.study-header {
                a href={ "/decks/" (study.deck.id) } { (t("study.backToDeck")) }
                h1 { (study.deck.title) }
                div.progress {
                    (session.index() + 1) " " (t("study.cardOf")) " " (session.len())
                    " | " (session.studied_count()) " " (t("study.progress"))
                }
            }
            div.card {
                @if session.is_flipped() {
                    div.badge { (t("study.backBadge")) }
                    div.face.back { p { (card.back) } }
                } @else {
                    div.badge { (t("study.frontBadge")) }
                    div.face.front { p { (card.front) } }
                }
                @if studied {
                    div.studied-marker { "✓" }
                }
            }
            div.controls {
                form action="/study" method="post" {
                    @if session.index() == 0 {
                        button id="previous" type="submit" name="action" value="Previous" disabled {
                            (t("study.previous"))
                        }
                    } @else {
                        button id="previous" type="submit" name="action" value="Previous" {
                            (t("study.previous"))
                        }
                    }
                    @if session.is_flipped() {
                        button id="flip" type="submit" name="action" value="Flip" {
                            (t("study.flipBack"))
                        }
                    } @else {
                        button id="flip" type="submit" name="action" value="Flip" {
                            (t("study.flip"))
                        }
                    }
                    @if session.is_flipped() && !studied {
                        button id="mark-studied" type="submit" name="action" value="MarkStudied" {
                            (t("study.markStudied"))
                        }
                    }
                    @if session.index() == session.len() - 1 {
                        button id="next" type="submit" name="action" value="Next" disabled {
                            (t("study.next"))
                        }
                    } @else {
                        button id="next" type="submit" name="action" value="Next" {
                            (t("study.next"))
                        }
                    }
                    div.spacer {}
                    button id="shuffle" type="submit" name="action" value="Shuffle" {
                        (t("study.shuffle"))
                    }
                    button id="reset" type="submit" name="action" value="Reset" {
                        (t("study.reset"))
                    }
                }
            }
            p.shortcuts { (t("study.shortcuts")) }
        }
    }
}

fn study_complete(locale: Locale, study: &ActiveStudy) -> Markup {
    let t = |key| translate(locale, key);
    html! {
        div.root {
            div.finished {
                h1 { (t("study.completeHeading")) }
                p { (t("study.completeBody")) }
                form action="/study" method="post" {
                    button type="submit" name="action" value="Reset" {
                        (t("study.studyAgain"))
                    }
                }
                a href={ "/decks/" (study.deck.id) } { (t("study.backToDeck")) }
            }
        }
    }
}

pub fn study_empty(locale: Locale, deck: &Deck) -> Markup {
    let t = |key| translate(locale, key);
    html! {
        div.root {
            div.empty-state {
                h1 { (t("study.emptyHeading")) }
                p { (t("study.emptyBody")) }
                a href={ "/decks/" (deck.id) } { (t("study.backToDeck")) }
            }
        }
    }
}
