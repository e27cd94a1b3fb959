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

use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;

/// Application configuration, read from an optional `flashdeck.toml`.
/// Every field has a sensible default so the file can be absent entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address the server binds to.
    pub bind: String,
    /// The configured user's identity.
    pub user_id: String,
    /// Feature entitlements for the configured user.
    pub features: Vec<String>,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AiConfig {
    /// Environment variable holding the provider API key. The key itself
    /// never goes in the config file.
    pub api_key_env: String,
    /// Chat completions endpoint of an OpenAI-compatible provider.
    pub endpoint: String,
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            user_id: "local".to_string(),
            features: Vec::new(),
            ai: AiConfig::default(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    /// Load the config file if it exists, defaults otherwise.
    pub fn load(path: &Path) -> Fallible<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            log::debug!("No config file at {}, using defaults.", path.display());
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind, "0.0.0.0:8000");
        assert_eq!(config.user_id, "local");
        assert!(config.features.is_empty());
        assert_eq!(config.ai.model, "gpt-4o-mini");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load(Path::new("./no-such-config.toml")).unwrap();
        assert_eq!(config.bind, "0.0.0.0:8000");
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "user_id = \"user_abc\"").unwrap();
        writeln!(file, "features = [\"ai_deck\"]").unwrap();
        writeln!(file, "[ai]").unwrap();
        writeln!(file, "model = \"gpt-4o\"").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.user_id, "user_abc");
        assert_eq!(config.features, vec!["ai_deck".to_string()]);
        assert_eq!(config.ai.model, "gpt-4o");
        // Unspecified fields keep their defaults.
        assert_eq!(config.bind, "0.0.0.0:8000");
        assert_eq!(config.ai.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "herp = \"derp\"").unwrap();
        assert!(Config::load(file.path()).is_err());
    }
}
