use crate::{automod::LinkCheckConfig, error_handler::ErrorConfig};
use color_eyre::eyre::{Result, WrapErr};
use poise::serenity_prelude::UserId;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[serde_as]
#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub struct Config {
    /// Register commands in this guild only. Unset registers them globally.
    pub guild_id: Option<u64>,
    /// Prefix for guilds that haven't picked their own.
    #[serde(default = "get_default_prefix")]
    pub default_prefix: String,
    /// Users allowed to run owner commands and resolve error reports,
    /// on top of the application owner.
    #[serde(default)]
    pub operator_ids: Vec<u64>,
    /// The help text for the bot. `/help`
    pub help_text: Option<Arc<String>>,
    /// Newline separated list of words automod deletes messages for.
    pub banned_words_path: Option<PathBuf>,
    /// How long automod's warning stays in the channel.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "get_default_warning_lifetime")]
    pub automod_warning_lifetime: Duration,
    #[serde(default = "get_default_database_path")]
    pub database_path: PathBuf,
    /// Profile endpoint for `/lookup`, the username is appended as a path segment.
    #[serde(default = "get_default_username_lookup_url")]
    pub username_lookup_url: String,
    #[serde(default)]
    pub links: LinkCheckConfig,
    #[serde(default)]
    pub errors: ErrorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            guild_id: None,
            default_prefix: get_default_prefix(),
            operator_ids: vec![],
            help_text: None,
            banned_words_path: None,
            automod_warning_lifetime: get_default_warning_lifetime(),
            database_path: get_default_database_path(),
            username_lookup_url: get_default_username_lookup_url(),
            links: LinkCheckConfig::default(),
            errors: ErrorConfig::default(),
        }
    }
}

impl Config {
    /// Fetches the config from the given file.
    pub fn create_from_file(config_path: impl AsRef<Path>) -> Result<Config> {
        let file = std::fs::read_to_string(config_path).wrap_err("Could not read config file")?;

        toml::from_str(&file).wrap_err("Could not parse config file")
    }

    /// Reloads the config file, keeping the current config if the new one is broken.
    pub fn reload(&mut self, config_path: impl AsRef<Path>) {
        match Config::create_from_file(config_path) {
            Ok(config) => *self = config,
            Err(e) => tracing::warn!("Keeping old config: {:?}", e),
        }
    }

    pub fn is_operator(&self, user: UserId) -> bool {
        self.operator_ids.contains(&user.get())
    }
}

fn get_default_prefix() -> String {
    "!".to_owned()
}

const fn get_default_warning_lifetime() -> Duration {
    Duration::from_secs(15)
}

fn get_default_database_path() -> PathBuf {
    PathBuf::from("warden.db")
}

fn get_default_username_lookup_url() -> String {
    "https://api.mojang.com/users/profiles/minecraft".to_owned()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error_handler::IgnoredKind;

    #[test]
    fn should_deserialize_properly() {
        let test_input = r#"
guild_id = 123456789109876
default_prefix = "?"
operator_ids = [1, 2]
help_text = "ask an admin"
banned_words_path = "banned_words.txt"
automod_warning_lifetime = 5

[links]
reputation_url = "https://anti-fish.example/check"

[errors]
log_channel_id = 99
ignored = ["command-not-found"]

[errors.messages]
guild_only = "Servers only!"
"#;

        let config: Config = toml::from_str(test_input).unwrap();

        let mut errors = ErrorConfig {
            log_channel_id: Some(99),
            ignored: vec![IgnoredKind::CommandNotFound],
            ..Default::default()
        };
        errors.messages.guild_only = "Servers only!".to_owned();

        assert_eq!(config, Config {
            guild_id: Some(123456789109876),
            default_prefix: "?".to_owned(),
            operator_ids: vec![1, 2],
            help_text: Some(Arc::new("ask an admin".to_owned())),
            banned_words_path: Some(PathBuf::from("banned_words.txt")),
            automod_warning_lifetime: Duration::from_secs(5),
            links: LinkCheckConfig {
                reputation_url: Some("https://anti-fish.example/check".to_owned()),
                min_trust_rating: 0.5,
            },
            errors,
            ..Default::default()
        });
        assert!(config.is_operator(UserId::new(2)));
        assert!(!config.is_operator(UserId::new(3)));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.errors.ignored, vec![
            IgnoredKind::CommandNotFound,
            IgnoredKind::CheckFailed
        ]);
    }
}
