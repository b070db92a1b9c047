//! The one place that knows about poise's error type.

use super::{
    ClassifiedError, CommandError, DiscordSink, ErrorKind, Invocation, dispatch,
    format::strip_ansi, kind::BucketKind,
};
use crate::data::{PoiseContext, State};
use color_eyre::eyre::{Error, eyre};
use itertools::Itertools;
use poise::{
    FrameworkError,
    serenity_prelude::{self as serenity, ChannelId, Permissions},
};

/// `(name, required)` pairs rendered as `<required> [optional]`.
pub fn signature<'a>(parameters: impl IntoIterator<Item = (&'a str, bool)>) -> String {
    parameters
        .into_iter()
        .map(|(name, required)| {
            if required {
                format!("<{name}>")
            } else {
                format!("[{name}]")
            }
        })
        .join(" ")
}

pub fn usage(prefix: &str, command: &str, signature: &str) -> String {
    format!("{prefix}{command} {signature}").trim_end().to_owned()
}

/// The first required parameter the user didn't get to, given how many
/// arguments they did supply. Falls back to the first required parameter.
pub fn missing_parameter<'a>(parameters: &[(&'a str, bool)], supplied: usize) -> Option<&'a str> {
    parameters
        .iter()
        .skip(supplied)
        .chain(parameters.iter())
        .find(|(_, required)| *required)
        .map(|(name, _)| *name)
}

pub fn permission_names(permissions: Permissions) -> Vec<String> {
    permissions
        .iter_names()
        .map(|(name, _)| name.to_lowercase())
        .collect()
}

fn parameters(ctx: PoiseContext<'_>) -> Vec<(&str, bool)> {
    ctx.command()
        .parameters
        .iter()
        .map(|parameter| (parameter.name.as_str(), parameter.required))
        .collect()
}

pub fn invocation(ctx: PoiseContext<'_>) -> Invocation {
    let command = ctx.command();
    let author = ctx.author();

    Invocation {
        command: command.qualified_name.clone(),
        usage: usage(
            ctx.prefix(),
            &command.qualified_name,
            &signature(parameters(ctx)),
        ),
        raw: ctx.invocation_string(),
        author: author.tag(),
        author_id: author.id,
        guild_id: ctx.guild_id(),
        channel_id: ctx.channel_id(),
    }
}

/// The report's debug rendering (chain, location, backtrace) without the
/// colour codes color-eyre adds for terminals.
pub fn plain_trace(error: &Error) -> String {
    strip_ansi(&format!("{error:?}"))
}

/// Looks through the report chain for one of our own errors.
pub fn kind_of_report(error: &Error) -> ErrorKind {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<CommandError>())
        .map(CommandError::kind)
        .unwrap_or_else(|| ErrorKind::Unclassified {
            trace: plain_trace(error),
        })
}

/// How many arguments a prefix invocation got. Slash commands can't be short
/// on arguments, so they count as none.
fn supplied_arguments(ctx: PoiseContext<'_>) -> usize {
    match ctx {
        poise::Context::Prefix(prefix) => prefix.args.split_whitespace().count(),
        poise::Context::Application(_) => 0,
    }
}

pub fn argument_parse_kind(
    error: &(dyn std::error::Error + Send + Sync + 'static),
    input: Option<&str>,
    parameters: &[(&str, bool)],
    supplied: usize,
) -> ErrorKind {
    let argument = input.unwrap_or_default().to_owned();

    if error.is::<poise::TooManyArguments>() {
        return ErrorKind::TooManyArguments;
    }

    if error.is::<poise::TooFewArguments>() {
        if let Some(parameter) = missing_parameter(parameters, supplied) {
            return ErrorKind::MissingArgument {
                parameter: parameter.to_owned(),
            };
        }
    }

    if error.is::<serenity::MemberParseError>() {
        return ErrorKind::MemberNotFound { argument };
    }

    if error.is::<serenity::UserParseError>() {
        return ErrorKind::UserNotFound { argument };
    }

    if error.is::<serenity::EmojiParseError>() {
        return ErrorKind::BadEmoji { argument };
    }

    ErrorKind::BadArgument {
        message: error.to_string(),
    }
}

/// Splits a framework error into the invocation it came from, what kind of
/// failure it was and the error to hand back if nobody recognizes it.
///
/// Errors unrelated to a command invocation are logged here and dropped.
pub fn adapt(
    error: FrameworkError<'_, State, Error>,
) -> Option<(PoiseContext<'_>, ClassifiedError, Error)> {
    let (ctx, kind, original) = match error {
        FrameworkError::Command { error, ctx, .. } => (ctx, kind_of_report(&error), error),
        FrameworkError::CommandCheckFailed {
            error: Some(error),
            ctx,
            ..
        } => (ctx, kind_of_report(&error), error),
        FrameworkError::CommandCheckFailed { error: None, ctx, .. } => {
            (ctx, ErrorKind::CheckFailed, eyre!("Command check failed"))
        }
        FrameworkError::ArgumentParse {
            error, input, ctx, ..
        } => (
            ctx,
            argument_parse_kind(
                error.as_ref(),
                input.as_deref(),
                &parameters(ctx),
                supplied_arguments(ctx),
            ),
            eyre!("Failed to parse arguments: {error}"),
        ),
        FrameworkError::CooldownHit {
            remaining_cooldown,
            ctx,
            ..
        } => (
            ctx,
            ErrorKind::Cooldown {
                retry_after: remaining_cooldown,
                bucket: BucketKind::Default,
            },
            eyre!("Cooldown hit"),
        ),
        FrameworkError::MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => (
            ctx,
            ErrorKind::MissingBotPermissions(permission_names(missing_permissions)),
            eyre!("Bot is missing {missing_permissions:?}"),
        ),
        FrameworkError::MissingUserPermissions {
            missing_permissions: Some(missing_permissions),
            ctx,
            ..
        } => (
            ctx,
            ErrorKind::MissingUserPermissions(permission_names(missing_permissions)),
            eyre!("User is missing {missing_permissions:?}"),
        ),
        FrameworkError::MissingUserPermissions {
            missing_permissions: None,
            ctx,
            ..
        } => {
            let error = eyre!("Couldn't fetch user permissions");
            (
                ctx,
                ErrorKind::Unclassified {
                    trace: plain_trace(&error),
                },
                error,
            )
        }
        FrameworkError::NotAnOwner { ctx, .. } => {
            (ctx, ErrorKind::NotOwner, eyre!("Not an owner"))
        }
        FrameworkError::GuildOnly { ctx, .. } => {
            (ctx, ErrorKind::GuildOnly, eyre!("Guild only"))
        }
        FrameworkError::DmOnly { ctx, .. } => (ctx, ErrorKind::DmOnly, eyre!("DM only")),
        FrameworkError::NsfwOnly { ctx, .. } => (ctx, ErrorKind::NsfwOnly, eyre!("NSFW only")),
        FrameworkError::SubcommandRequired { ctx, .. } => {
            let subcommands = ctx
                .command()
                .subcommands
                .iter()
                .map(|subcommand| format!("`{}`", subcommand.name))
                .join(", ");

            (
                ctx,
                ErrorKind::BadArgument {
                    message: format!("Pick one of these subcommands: {subcommands}"),
                },
                eyre!("Subcommand required"),
            )
        }
        FrameworkError::CommandPanic { payload, ctx, .. } => {
            let trace = payload.unwrap_or_else(|| "panicked without a payload".to_owned());
            let error = eyre!("Command panicked: {trace}");
            (ctx, ErrorKind::Unclassified { trace }, error)
        }
        FrameworkError::UnknownCommand {
            prefix,
            msg_content,
            ..
        } => {
            tracing::debug!("Unknown command `{msg_content}` (prefix `{prefix}`)");
            return None;
        }
        FrameworkError::Setup { error, .. } => {
            tracing::error!("Failed to set up the bot: {:?}", error);
            return None;
        }
        FrameworkError::EventHandler { error, .. } => {
            tracing::error!("Event handler failed: {:?}", error);
            return None;
        }
        FrameworkError::DynamicPrefix { error, msg, .. } => {
            tracing::error!("Dynamic prefix failed for {}: {:?}", msg.link(), error);
            return None;
        }
        _ => {
            tracing::warn!("Unhandled framework error");
            return None;
        }
    };

    let origin = invocation(ctx);

    Some((ctx, ClassifiedError { kind, origin }, original))
}

/// poise `on_error` hook. Unclassified errors come back out of [`dispatch`]
/// and end here, in the process log.
pub async fn on_error(error: FrameworkError<'_, State, Error>) {
    let Some((ctx, classified, original)) = adapt(error) else {
        return;
    };

    let error_config = ctx.data().config.read().await.errors.clone();
    let bot_name = ctx.serenity_context().cache.current_user().name.clone();
    let sink = DiscordSink::new(ctx, error_config.log_channel_id.map(ChannelId::new));

    if let Err(error) = dispatch(&sink, &error_config, &bot_name, classified, original).await {
        tracing::error!(
            "Unhandled error in `{}`: {:?}",
            ctx.command().qualified_name,
            error
        );
    }
}
