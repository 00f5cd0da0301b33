use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Bot settings loaded from `config/bot.toml`. Every field has a default,
/// so a missing file or a partial one still yields a working config.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_embed_color")]
    pub embed_color: u32,
    #[serde(default = "default_team_a_name")]
    pub team_a_name: String,
    #[serde(default = "default_team_b_name")]
    pub team_b_name: String,
    /// How long after a draw a `/reroll` is still accepted, in seconds.
    #[serde(default = "default_reroll_ttl_secs")]
    pub reroll_ttl_secs: u64,
}

fn default_embed_color() -> u32 {
    0x0099FF
}

fn default_team_a_name() -> String {
    "Team 1".to_string()
}

fn default_team_b_name() -> String {
    "Team 2".to_string()
}

fn default_reroll_ttl_secs() -> u64 {
    120
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            embed_color: default_embed_color(),
            team_a_name: default_team_a_name(),
            team_b_name: default_team_b_name(),
            reroll_ttl_secs: default_reroll_ttl_secs(),
        }
    }
}

impl BotConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads `config/bot.toml`, falling back to defaults if it is missing
    /// or unreadable.
    pub fn load() -> Self {
        match Self::load_from_file("config/bot.toml") {
            Ok(config) => config,
            Err(e) => {
                println!("could not load config/bot.toml ({}), using defaults", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: BotConfig = toml::from_str("").unwrap();
        assert_eq!(config.embed_color, 0x0099FF);
        assert_eq!(config.team_a_name, "Team 1");
        assert_eq!(config.team_b_name, "Team 2");
        assert_eq!(config.reroll_ttl_secs, 120);
    }

    #[test]
    fn test_partial_config_overrides() {
        let config: BotConfig = toml::from_str(
            r#"
            team_a_name = "Red"
            reroll_ttl_secs = 300
            "#,
        )
        .unwrap();
        assert_eq!(config.team_a_name, "Red");
        assert_eq!(config.team_b_name, "Team 2");
        assert_eq!(config.reroll_ttl_secs, 300);
    }

    #[test]
    fn test_load_shipped_config() {
        let result = BotConfig::load_from_file("config/bot.toml");
        assert!(result.is_ok(), "failed to load config: {:?}", result.err());
    }
}
