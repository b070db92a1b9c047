use super::kind::{BucketKind, ErrorKind};
use itertools::Itertools;
use std::time::Duration;
use thiserror::Error;

/// Failures raised by our own commands, checks and limits.
///
/// Returned through `eyre` like everything else; the adapter digs them back
/// out of the report chain.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    #[error("only the bot owner can do that")]
    NotOwner,
    #[error("missing permissions: {}", .0.join(", "))]
    MissingUserPermissions(Vec<String>),
    #[error("bot is missing permissions: {}", .0.join(", "))]
    MissingBotPermissions(Vec<String>),
    #[error("missing argument `{parameter}`")]
    MissingArgument { parameter: String },
    #[error("{0}")]
    BadArgument(String),
    #[error("`{argument}` is not a usable emoji")]
    BadEmoji { argument: String },
    #[error("on cooldown for {:.2}s", .retry_after.as_secs_f64())]
    Cooldown {
        retry_after: Duration,
        bucket: BucketKind,
    },
    #[error("at most {max} concurrent invocations")]
    MaxConcurrency { max: u32, bucket: BucketKind },
    #[error("member `{argument}` not found")]
    MemberNotFound { argument: String },
    #[error("user `{argument}` not found")]
    UserNotFound { argument: String },
    #[error("all checks failed: {}", .0.iter().join("; "))]
    CheckAny(Vec<CommandError>),
    #[error("no conversion matched: {}", .0.iter().join("; "))]
    Union(Vec<CommandError>),
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::NotOwner => ErrorKind::NotOwner,
            CommandError::MissingUserPermissions(permissions) => {
                ErrorKind::MissingUserPermissions(permissions.clone())
            }
            CommandError::MissingBotPermissions(permissions) => {
                ErrorKind::MissingBotPermissions(permissions.clone())
            }
            CommandError::MissingArgument { parameter } => ErrorKind::MissingArgument {
                parameter: parameter.clone(),
            },
            CommandError::BadArgument(message) => ErrorKind::BadArgument {
                message: message.clone(),
            },
            CommandError::BadEmoji { argument } => ErrorKind::BadEmoji {
                argument: argument.clone(),
            },
            &CommandError::Cooldown {
                retry_after,
                bucket,
            } => ErrorKind::Cooldown {
                retry_after,
                bucket,
            },
            &CommandError::MaxConcurrency { max, bucket } => {
                ErrorKind::MaxConcurrency { max, bucket }
            }
            CommandError::MemberNotFound { argument } => ErrorKind::MemberNotFound {
                argument: argument.clone(),
            },
            CommandError::UserNotFound { argument } => ErrorKind::UserNotFound {
                argument: argument.clone(),
            },
            CommandError::CheckAny(errors) => {
                ErrorKind::CheckAnyFailure(errors.iter().map(CommandError::kind).collect())
            }
            CommandError::Union(errors) => {
                ErrorKind::UnionConversion(errors.iter().map(CommandError::kind).collect())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn composites_keep_order() {
        let error = CommandError::CheckAny(vec![
            CommandError::NotOwner,
            CommandError::MissingUserPermissions(vec!["manage_guild".to_owned()]),
        ]);

        assert_eq!(
            error.kind(),
            ErrorKind::CheckAnyFailure(vec![
                ErrorKind::NotOwner,
                ErrorKind::MissingUserPermissions(vec!["manage_guild".to_owned()]),
            ])
        );
        assert_eq!(
            error.to_string(),
            "all checks failed: only the bot owner can do that; missing permissions: manage_guild"
        );
    }
}
