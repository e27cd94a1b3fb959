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

use std::sync::OnceLock;

use serde_json::Value;

/// Settings key under which the selected locale persists.
pub const LOCALE_SETTING: &str = "app.locale";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Locale {
    En,
    ZhTw,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::ZhTw => "zh-TW",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Locale::En),
            "zh-TW" => Some(Locale::ZhTw),
            _ => None,
        }
    }

    /// Best-effort mapping from a BCP 47 language tag, used when no locale
    /// has been persisted yet. Anything Chinese maps to traditional
    /// Chinese; everything else falls back to English.
    pub fn from_language_tag(tag: &str) -> Self {
        if tag.to_lowercase().starts_with("zh") {
            Locale::ZhTw
        } else {
            Locale::En
        }
    }
}

fn dictionary(locale: Locale) -> &'static Value {
    static EN: OnceLock<Value> = OnceLock::new();
    static ZH_TW: OnceLock<Value> = OnceLock::new();
    match locale {
        Locale::En => EN.get_or_init(|| {
            serde_json::from_str(include_str!("i18n/en.json"))
                .expect("embedded dictionary is valid JSON")
        }),
        Locale::ZhTw => ZH_TW.get_or_init(|| {
            serde_json::from_str(include_str!("i18n/zh-TW.json"))
                .expect("embedded dictionary is valid JSON")
        }),
    }
}

/// Resolve a dot-delimited message key against the locale's dictionary.
/// Unresolved keys come back verbatim, never as an error.
pub fn translate(locale: Locale, key: &str) -> String {
    let mut current = dictionary(locale);
    for part in key.split('.') {
        match current.get(part) {
            Some(next) => current = next,
            None => return key.to_string(),
        }
    }
    match current.as_str() {
        Some(s) => s.to_string(),
        None => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(translate(Locale::En, "study.flip"), "Show Answer");
        assert_ne!(translate(Locale::ZhTw, "study.flip"), "study.flip");
    }

    #[test]
    fn test_unresolved_key_returned_verbatim() {
        assert_eq!(translate(Locale::En, "no.such.key"), "no.such.key");
        assert_eq!(translate(Locale::ZhTw, "no.such.key"), "no.such.key");
    }

    #[test]
    fn test_non_leaf_key_returned_verbatim() {
        assert_eq!(translate(Locale::En, "errors"), "errors");
    }

    #[test]
    fn test_language_tag_fallback() {
        assert_eq!(Locale::from_language_tag("zh-TW"), Locale::ZhTw);
        assert_eq!(Locale::from_language_tag("ZH"), Locale::ZhTw);
        assert_eq!(Locale::from_language_tag("en-US"), Locale::En);
        assert_eq!(Locale::from_language_tag("fr"), Locale::En);
    }

    #[test]
    fn test_code_roundtrip() {
        for locale in [Locale::En, Locale::ZhTw] {
            assert_eq!(Locale::from_code(locale.code()), Some(locale));
        }
        assert_eq!(Locale::from_code("de"), None);
    }

    #[test]
    fn test_error_keys_resolve_in_both_dictionaries() {
        let keys = [
            "errors.unauthorized",
            "errors.forbidden",
            "errors.invalidInput",
            "errors.notFound",
            "errors.aiNotConfigured",
            "errors.aiQuotaExceeded",
            "errors.aiMalformedOutput",
            "errors.aiFailed",
            "errors.csvParseFailed",
            "errors.generic",
        ];
        for locale in [Locale::En, Locale::ZhTw] {
            for key in keys {
                assert_ne!(translate(locale, key), key, "missing {key}");
            }
        }
    }
}
