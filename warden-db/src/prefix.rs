use crate::{ReadWriteTree, WardenDb};
use color_eyre::eyre::{Result, bail};
use poise::serenity_prelude::GuildId;
use sled::Tree;
use warden_traits::ForwardRefToTracing;

/// Longest prefix a guild may configure.
pub const MAX_PREFIX_LEN: usize = 16;

/// Guild id -> command prefix.
pub struct GuildPrefixes(Tree);

impl GuildPrefixes {
    pub fn new(db: &WardenDb) -> Result<Self> {
        Ok(GuildPrefixes(db.open_tree("guild_prefixes")?))
    }

    /// A failed read is logged and treated as "no custom prefix".
    pub fn get(&self, guild_id: GuildId) -> Option<String> {
        let guild_id: u64 = guild_id.into();
        self.0
            .typed_get::<u64, String>(&guild_id)
            .trace_err_ok()
            .flatten()
    }

    pub fn set(&self, guild_id: GuildId, prefix: &str) -> Result<()> {
        if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
            bail!("A prefix can't be empty or contain whitespace");
        }

        if prefix.chars().count() > MAX_PREFIX_LEN {
            bail!("A prefix can be at most {MAX_PREFIX_LEN} characters long");
        }

        let guild_id: u64 = guild_id.into();
        self.0.typed_insert::<u64, String>(&guild_id, &prefix.to_owned())
    }

    /// Returns the prefix that was removed, if any.
    pub fn reset(&self, guild_id: GuildId) -> Result<Option<String>> {
        let guild_id: u64 = guild_id.into();
        self.0.typed_remove::<u64, String>(&guild_id)
    }
}
