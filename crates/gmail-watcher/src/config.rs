use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Vault root; action files land in `<vault>/Inbox`
    pub vault_dir: PathBuf,

    /// Path to the authorized-user Gmail credentials JSON file
    pub credentials_path: PathBuf,

    /// How often to poll for new mail (seconds)
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// Gmail search query selecting candidate messages
    #[serde(default = "default_query")]
    pub query: String,

    /// Maximum candidates to list per poll
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Identities remembered before the oldest is evicted
    #[serde(default = "default_seen_capacity")]
    pub seen_capacity: usize,

    /// Optional command run after each emitted file (path appended)
    #[serde(default)]
    pub notify_command: Vec<String>,
}

fn default_check_interval() -> u64 {
    120 // 2 minutes
}

fn default_query() -> String {
    "is:unread is:important".to_string()
}

fn default_max_results() -> u32 {
    10
}

fn default_seen_capacity() -> usize {
    4096
}

impl Config {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn with_paths(vault_dir: PathBuf, credentials_path: PathBuf) -> Self {
        Config {
            vault_dir,
            credentials_path,
            check_interval_secs: default_check_interval(),
            query: default_query(),
            max_results: default_max_results(),
            seen_capacity: default_seen_capacity(),
            notify_command: Vec::new(),
        }
    }

    pub fn example() -> Self {
        Config::with_paths(
            PathBuf::from("./vault"),
            PathBuf::from("credentials.json"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            vault_dir = "/data/vault"
            credentials_path = "/data/credentials.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.check_interval_secs, 120);
        assert_eq!(config.query, "is:unread is:important");
        assert_eq!(config.max_results, 10);
        assert_eq!(config.seen_capacity, 4096);
        assert!(config.notify_command.is_empty());
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let example = Config::example();
        std::fs::write(&path, toml::to_string(&example).unwrap()).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.vault_dir, example.vault_dir);
        assert_eq!(loaded.query, example.query);
    }
}
