//! Server configuration
//!
//! Defaults merged with an optional TOML file and TAVERND_* environment
//! overrides.

use std::net::SocketAddr;
use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::locale::Language;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP/WebSocket server listens on
    pub bind_addr: SocketAddr,
    /// SQLite database path; None = in-memory (for testing)
    pub db_path: Option<String>,
    /// Language for fresh chat sessions
    pub default_language: Language,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            db_path: None,
            default_language: Language::En,
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the TOML file, then environment
    pub fn load(path: Option<&Path>) -> Result<Config, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("TAVERND_")).extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.db_path, None);
        assert_eq!(config.default_language, Language::En);
    }

    #[test]
    fn test_file_and_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "tavernd.toml",
                r#"
                bind_addr = "0.0.0.0:9090"
                default_language = "ru"
                "#,
            )?;
            jail.set_env("TAVERND_DB_PATH", "/tmp/tavern.db");

            let config = Config::load(Some(Path::new("tavernd.toml"))).unwrap();
            assert_eq!(config.bind_addr, "0.0.0.0:9090".parse().unwrap());
            assert_eq!(config.default_language, Language::Ru);
            assert_eq!(config.db_path.as_deref(), Some("/tmp/tavern.db"));
            Ok(())
        });
    }
}
