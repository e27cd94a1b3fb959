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

use maud::DOCTYPE;
use maud::Markup;
use maud::html;

use crate::i18n::Locale;
use crate::i18n::translate;

pub fn page_template(locale: Locale, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(locale.code()) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (translate(locale, "app.title")) }
                link rel="stylesheet" href="/style.css";
            }
            body {
                header.topbar {
                    a href="/" { (translate(locale, "nav.dashboard")) }
                    form.locale action="/locale" method="post" {
                        @for candidate in [Locale::En, Locale::ZhTw] {
                            @if candidate == locale {
                                button type="submit" name="locale" value=(candidate.code()) disabled {
                                    (candidate.code())
                                }
                            } @else {
                                button type="submit" name="locale" value=(candidate.code()) {
                                    (candidate.code())
                                }
                            }
                        }
                    }
                }
                (body)
                script src="/script.js" {};
            }
        }
    }
}
