//! Turns failed command invocations into user replies and operator reports.
//!
//! The flow is: [`adapter`] maps a [`poise::FrameworkError`] into a
//! [`ClassifiedError`], [`classify`] decides what to say, and [`dispatch`]
//! delivers it through an [`ErrorSink`]. Errors nobody recognizes are posted to
//! the operator log channel and handed back to the caller.

pub mod adapter;
mod command_error;
mod dispatch;
mod format;
pub mod kind;
pub mod messages;
pub mod report;
pub mod resolve;

pub use command_error::CommandError;
pub use dispatch::{DiscordSink, ErrorSink, dispatch};
pub use kind::{BucketKind, ClassifiedError, ErrorKind, IgnoredKind, Invocation};

use self::{
    format::{missing_argument_diagram, permission_list},
    messages::{ErrorMessages, bucket_suffix, render},
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ErrorConfig {
    /// Channel unexpected errors are reported to. Reports are skipped when unset.
    pub log_channel_id: Option<u64>,
    /// Error kinds that produce no reply and no report.
    #[serde(default = "default_ignored")]
    pub ignored: Vec<IgnoredKind>,
    #[serde(default)]
    pub messages: ErrorMessages,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        ErrorConfig {
            log_channel_id: None,
            ignored: default_ignored(),
            messages: ErrorMessages::default(),
        }
    }
}

fn default_ignored() -> Vec<IgnoredKind> {
    vec![IgnoredKind::CommandNotFound, IgnoredKind::CheckFailed]
}

/// What the pipeline should do about one failed invocation.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Ignore,
    Reply(String),
    /// Report to the operator log channel, then hand the error back.
    Escalate { origin: Invocation, trace: String },
}

/// First match wins. Composite errors are unwrapped and classified again from
/// the top, so the ignore list applies to whatever they contain.
pub fn classify(config: &ErrorConfig, bot_name: &str, error: ClassifiedError) -> Outcome {
    let ClassifiedError { kind, origin } = error;

    if config.ignored.iter().any(|ignored| ignored.matches(&kind)) {
        return Outcome::Ignore;
    }

    let messages: &ErrorMessages = &config.messages;

    let reply = match kind {
        ErrorKind::CheckAnyFailure(errors) => {
            let mut errors = errors.into_iter().peekable();
            let first = errors.peek().cloned();
            let kind = errors
                .find(|kind| *kind != ErrorKind::NotOwner)
                .or(first)
                .unwrap_or(ErrorKind::CheckFailed);

            return classify(config, bot_name, ClassifiedError { kind, origin });
        }
        ErrorKind::UnionConversion(errors) => {
            let kind = errors.into_iter().next().unwrap_or(ErrorKind::BadArgument {
                message: String::new(),
            });

            return classify(config, bot_name, ClassifiedError { kind, origin });
        }
        ErrorKind::NotOwner => render(&messages.not_owner, &[
            ("command", origin.command.as_str()),
            ("bot", bot_name),
        ]),
        ErrorKind::TooManyArguments => messages.too_many_arguments.clone(),
        ErrorKind::MissingUserPermissions(permissions) => {
            render(&messages.missing_user_permissions, &[(
                "permissions",
                permission_list(&permissions).as_str(),
            )])
        }
        ErrorKind::MissingBotPermissions(permissions) => {
            render(&messages.missing_bot_permissions, &[(
                "permissions",
                permission_list(&permissions).as_str(),
            )])
        }
        ErrorKind::MissingArgument { parameter } => missing_argument_diagram(
            &origin.usage,
            &parameter,
            &render(&messages.missing_argument, &[("parameter", parameter.as_str())]),
        ),
        ErrorKind::BadEmoji { argument } => {
            render(&messages.bad_emoji, &[("argument", argument.as_str())])
        }
        ErrorKind::Cooldown {
            retry_after,
            bucket,
        } => render(&messages.cooldown, &[
            ("seconds", format!("{:.2}", retry_after.as_secs_f64()).as_str()),
            ("bucket", bucket_suffix(bucket.label()).as_str()),
        ]),
        ErrorKind::MaxConcurrency { max, bucket } => render(&messages.max_concurrency, &[
            ("max", max.to_string().as_str()),
            ("bucket", bucket_suffix(bucket.label()).as_str()),
        ]),
        ErrorKind::MemberNotFound { argument } => {
            render(&messages.member_not_found, &[("argument", argument.as_str())])
        }
        ErrorKind::UserNotFound { argument } => {
            render(&messages.user_not_found, &[("argument", argument.as_str())])
        }
        ErrorKind::BadArgument { message } if message.trim().is_empty() => {
            messages.bad_argument_fallback.clone()
        }
        ErrorKind::BadArgument { message } => message,
        ErrorKind::GuildOnly => messages.guild_only.clone(),
        ErrorKind::DmOnly => messages.dm_only.clone(),
        ErrorKind::NsfwOnly => messages.nsfw_only.clone(),
        ErrorKind::Unclassified { trace } => return Outcome::Escalate { origin, trace },
        kind @ (ErrorKind::CommandNotFound | ErrorKind::CheckFailed) => {
            return Outcome::Escalate {
                origin,
                trace: format!("{kind:?}"),
            };
        }
    };

    Outcome::Reply(reply)
}
