use crate::{
    commands::checks::is_operator_or_manager,
    data::{PoiseContext, State},
    error_handler::CommandError,
};
use color_eyre::eyre::{OptionExt, Result};
use poise::serenity_prelude::{Context, Message};

/// `(prefix, rest)` if `content` starts with `prefix`. In no-prefix mode
/// anything else counts as prefixed by the empty string.
pub fn split_prefix<'a>(
    content: &'a str,
    prefix: &str,
    no_prefix: bool,
) -> Option<(&'a str, &'a str)> {
    if content.starts_with(prefix) {
        Some(content.split_at(prefix.len()))
    } else if no_prefix {
        Some(("", content))
    } else {
        None
    }
}

async fn guild_prefix(data: &State, message: &Message) -> String {
    match message.guild_id.and_then(|guild_id| data.prefixes.get(guild_id)) {
        Some(prefix) => prefix,
        None => data.config.read().await.default_prefix.clone(),
    }
}

/// Per-guild prefix lookup for the framework.
pub async fn strip_guild_prefix<'a>(
    _ctx: &'a Context,
    message: &'a Message,
    data: &'a State,
) -> Result<Option<(&'a str, &'a str)>> {
    let prefix = guild_prefix(data, message).await;

    let no_prefix = data.session.no_prefix() && data.is_operator(message.author.id).await;

    Ok(split_prefix(&message.content, &prefix, no_prefix))
}

/// Show the command prefix for this server
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    subcommands("prefix_set", "prefix_reset")
)]
pub async fn prefix(ctx: PoiseContext<'_>) -> Result<()> {
    let guild_id = ctx.guild_id().ok_or_eyre("No guild ID?")?;

    let prefix = match ctx.data().prefixes.get(guild_id) {
        Some(prefix) => prefix,
        None => ctx.data().config.read().await.default_prefix.clone(),
    };

    ctx.say(format!("The prefix here is `{prefix}`")).await?;

    Ok(())
}

/// Change the command prefix for this server
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    rename = "set",
    check = "is_operator_or_manager"
)]
pub async fn prefix_set(
    ctx: PoiseContext<'_>,
    #[description = "The new prefix, without spaces"] prefix: String,
) -> Result<()> {
    let guild_id = ctx.guild_id().ok_or_eyre("No guild ID?")?;

    if let Err(e) = ctx.data().prefixes.set(guild_id, &prefix) {
        return Err(CommandError::BadArgument(e.to_string()).into());
    }

    tracing::info!("{} set the prefix of {} to {}", ctx.author().tag(), guild_id, prefix);

    ctx.say(format!("The prefix is now `{prefix}`")).await?;

    Ok(())
}

/// Go back to the default command prefix
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    rename = "reset",
    check = "is_operator_or_manager"
)]
pub async fn prefix_reset(ctx: PoiseContext<'_>) -> Result<()> {
    let guild_id = ctx.guild_id().ok_or_eyre("No guild ID?")?;

    ctx.data().prefixes.reset(guild_id)?;
    let default_prefix = ctx.data().config.read().await.default_prefix.clone();

    ctx.say(format!("The prefix is back to `{default_prefix}`"))
        .await?;

    Ok(())
}
