use poise::serenity_prelude::{ChannelId, GuildId, UserId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The scope a cooldown or concurrency limit is tracked over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketKind {
    /// One bucket for everyone.
    #[default]
    Default,
    User,
    Guild,
    Channel,
    Member,
    Category,
    Role,
}

impl BucketKind {
    pub const ALL: [BucketKind; 7] = [
        BucketKind::Default,
        BucketKind::User,
        BucketKind::Guild,
        BucketKind::Channel,
        BucketKind::Member,
        BucketKind::Category,
        BucketKind::Role,
    ];

    /// Human phrase for the bucket, empty for the unscoped bucket.
    pub const fn label(self) -> &'static str {
        match self {
            BucketKind::Default => "",
            BucketKind::User => "per user",
            BucketKind::Guild => "per server",
            BucketKind::Channel => "per channel",
            BucketKind::Member => "per member",
            BucketKind::Category => "per category",
            BucketKind::Role => "per role",
        }
    }
}

/// Every way a command invocation can fail that the classifier knows about.
///
/// Built once at the framework boundary (see [`super::adapter`]), after which
/// everything is plain matching.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    CommandNotFound,
    /// A check returned `false` without saying why.
    CheckFailed,
    /// Several checks were tried and all failed.
    CheckAnyFailure(Vec<ErrorKind>),
    /// Every alternative of a union-typed argument failed to convert.
    UnionConversion(Vec<ErrorKind>),
    NotOwner,
    TooManyArguments,
    MissingUserPermissions(Vec<String>),
    MissingBotPermissions(Vec<String>),
    MissingArgument { parameter: String },
    BadEmoji { argument: String },
    Cooldown { retry_after: Duration, bucket: BucketKind },
    MaxConcurrency { max: u32, bucket: BucketKind },
    MemberNotFound { argument: String },
    UserNotFound { argument: String },
    BadArgument { message: String },
    GuildOnly,
    DmOnly,
    NsfwOnly,
    Unclassified { trace: String },
}

/// Error kinds that can be listed in the `ignored` config option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IgnoredKind {
    CommandNotFound,
    CheckFailed,
    NotOwner,
    GuildOnly,
    DmOnly,
    NsfwOnly,
}

impl IgnoredKind {
    pub fn matches(self, kind: &ErrorKind) -> bool {
        matches!(
            (self, kind),
            (IgnoredKind::CommandNotFound, ErrorKind::CommandNotFound)
                | (IgnoredKind::CheckFailed, ErrorKind::CheckFailed)
                | (IgnoredKind::NotOwner, ErrorKind::NotOwner)
                | (IgnoredKind::GuildOnly, ErrorKind::GuildOnly)
                | (IgnoredKind::DmOnly, ErrorKind::DmOnly)
                | (IgnoredKind::NsfwOnly, ErrorKind::NsfwOnly)
        )
    }
}

/// Where and by whom a failed command was invoked.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    /// Qualified name, e.g. `prefix reset`.
    pub command: String,
    /// `<prefix><name> <signature>`, e.g. `!kick <member> [reason]`.
    pub usage: String,
    /// The text the user typed (or the slash command rendering).
    pub raw: String,
    pub author: String,
    pub author_id: UserId,
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub origin: Invocation,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bucket_labels_are_total() {
        for bucket in BucketKind::ALL {
            let label = bucket.label();
            assert_eq!(label.is_empty(), bucket == BucketKind::Default);
        }

        assert_eq!(BucketKind::User.label(), "per user");
        assert_eq!(BucketKind::Guild.label(), "per server");
    }

    #[test]
    fn ignored_kinds_match_only_their_variant() {
        assert!(IgnoredKind::CommandNotFound.matches(&ErrorKind::CommandNotFound));
        assert!(!IgnoredKind::CommandNotFound.matches(&ErrorKind::CheckFailed));
        assert!(!IgnoredKind::CheckFailed.matches(&ErrorKind::CheckAnyFailure(vec![
            ErrorKind::CheckFailed
        ])));
    }

    #[test]
    fn ignored_kinds_deserialize_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            ignored: Vec<IgnoredKind>,
        }

        let wrapper: Wrapper =
            toml::from_str(r#"ignored = ["command-not-found", "nsfw-only"]"#).unwrap();

        assert_eq!(
            wrapper.ignored,
            vec![IgnoredKind::CommandNotFound, IgnoredKind::NsfwOnly]
        );
    }
}
