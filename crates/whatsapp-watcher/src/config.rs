use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Vault root; action files land in `<vault>/Inbox`
    pub vault_dir: PathBuf,

    /// Chrome remote-debugging endpoint of the logged-in session
    #[serde(default = "default_devtools_url")]
    pub devtools_url: String,

    /// How often to poll the chat list (seconds)
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// Identities remembered before the oldest is evicted
    #[serde(default = "default_seen_capacity")]
    pub seen_capacity: usize,

    /// Optional command run after each emitted file (path appended)
    #[serde(default)]
    pub notify_command: Vec<String>,
}

fn default_devtools_url() -> String {
    "http://127.0.0.1:9222".to_string()
}

fn default_check_interval() -> u64 {
    30
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

    pub fn with_vault(vault_dir: PathBuf) -> Self {
        Config {
            vault_dir,
            devtools_url: default_devtools_url(),
            check_interval_secs: default_check_interval(),
            seen_capacity: default_seen_capacity(),
            notify_command: Vec::new(),
        }
    }

    pub fn example() -> Self {
        Config::with_vault(PathBuf::from("./vault"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: Config = toml::from_str(r#"vault_dir = "/data/vault""#).unwrap();

        assert_eq!(config.devtools_url, "http://127.0.0.1:9222");
        assert_eq!(config.check_interval_secs, 30);
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
        assert_eq!(loaded.devtools_url, example.devtools_url);
    }
}
