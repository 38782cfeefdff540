//! `configuration.json` loading.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Seconds to sleep before the first network call.
    #[serde(default)]
    pub delay_start: u64,
    #[serde(rename = "fortniteAPI")]
    pub fortnite_api: FortniteApi,
    pub language: String,
    /// Optional support-a-creator code appended to the tweet caption.
    #[serde(default)]
    pub support_a_creator: Option<String>,
    pub twitter: TwitterConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FortniteApi {
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwitterConfig {
    pub enabled: bool,
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl Config {
    /// Load from `configuration.json` in the working directory, or from the
    /// path in `ATHENA_CONFIG` when set.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(|| {
            std::env::var("ATHENA_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("configuration.json"))
        });

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "delayStart": 5,
        "fortniteAPI": { "apiKey": "k" },
        "language": "en",
        "supportACreator": "creator",
        "twitter": {
            "enabled": true,
            "apiKey": "a", "apiSecret": "b",
            "accessToken": "c", "accessSecret": "d"
        }
    }"#;

    #[test]
    fn parses_sample() {
        let config: Config = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(config.delay_start, 5);
        assert_eq!(config.fortnite_api.api_key, "k");
        assert_eq!(config.support_a_creator.as_deref(), Some("creator"));
        assert!(config.twitter.enabled);
        assert_eq!(config.twitter.access_secret, "d");
    }

    #[test]
    fn optional_fields_default() {
        let json = r#"{
            "fortniteAPI": { "apiKey": "k" },
            "language": "en",
            "twitter": {
                "enabled": false,
                "apiKey": "a", "apiSecret": "b",
                "accessToken": "c", "accessSecret": "d"
            }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.delay_start, 0);
        assert!(config.support_a_creator.is_none());
    }

    #[test]
    fn missing_credentials_fail() {
        let json = r#"{ "language": "en" }"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }
}
