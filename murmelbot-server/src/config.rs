use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use murmelbot_common::error::Error;
use murmelbot_common::models::rule::RuleOverride;

/// Bot configuration, loaded once at startup from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    /// Per-rule overrides, keyed by rule name.
    #[serde(default)]
    pub rules: HashMap<String, RuleOverride>,
}

#[derive(Debug, Deserialize)]
pub struct BotConfig {
    /// The bot's own account name; its channel doubles as the admin
    /// channel.
    pub username: String,
    /// Sender id that resolves to the Owner permission.
    pub owner_id: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// The one channel where fish-patting counts.
    #[serde(default)]
    pub patsch_channel: String,
    #[serde(default = "default_known_bots")]
    pub known_bots: Vec<String>,
    /// Channels to join at startup, in addition to the bot's own.
    #[serde(default)]
    pub channels: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub swears: Vec<String>,
}

fn default_prefix() -> String {
    "~".to_string()
}

fn default_known_bots() -> Vec<String> {
    vec![
        "nightbot".to_string(),
        "fossabot".to_string(),
        "streamelements".to_string(),
    ]
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("could not read config {}: {e}", path.display()))
        })?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("could not parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.bot.username.trim().is_empty() {
            return Err(Error::Config("bot.username is not set".into()));
        }
        if self.bot.owner_id.trim().is_empty() {
            return Err(Error::Config("bot.owner_id is not set".into()));
        }
        if self.bot.prefix.is_empty() {
            return Err(Error::Config("bot.prefix must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Config, Error> {
        let config: Config =
            toml::from_str(raw).map_err(|e| Error::Config(format!("could not parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let config = parse(
            r#"
            [bot]
            username = "murmelbot"
            owner_id = "100"
            "#,
        )
        .unwrap();
        assert_eq!(config.bot.prefix, "~");
        assert!(config.bot.known_bots.contains(&"nightbot".to_string()));
        assert!(config.filter.swears.is_empty());
        assert!(config.rules.is_empty());
    }

    #[test]
    fn full_config_round_trips() {
        let config = parse(
            r#"
            [bot]
            username = "murmelbot"
            owner_id = "100"
            prefix = "!"
            patsch_channel = "fishpond"
            channels = ["somechannel"]

            [filter]
            swears = ["frick"]

            [rules.circumflex]
            enabled = false

            [rules.ping]
            disabled_channels = ["quietchannel"]
            "#,
        )
        .unwrap();
        assert_eq!(config.bot.prefix, "!");
        assert_eq!(config.bot.channels, vec!["somechannel"]);
        assert_eq!(config.rules["circumflex"].enabled, Some(false));
        assert!(config.rules["ping"].disabled_channels.contains("quietchannel"));
    }

    #[test]
    fn missing_identity_is_rejected() {
        assert!(parse("[bot]\nusername = \"\"\nowner_id = \"100\"").is_err());
        assert!(parse("[bot]\nusername = \"murmelbot\"\nowner_id = \"\"").is_err());
    }
}
