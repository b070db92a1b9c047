use crate::{data::PoiseContext, error_handler::CommandError};
use color_eyre::eyre::{Result, WrapErr};
use poise::serenity_prelude::Member;

/// Kick a member from the server
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "KICK_MEMBERS",
    required_bot_permissions = "KICK_MEMBERS"
)]
pub async fn kick(
    ctx: PoiseContext<'_>,
    #[description = "Who to kick"] member: Member,
    #[description = "Why they're being kicked"]
    #[rest]
    reason: Option<String>,
) -> Result<()> {
    if member.user.id == ctx.author().id {
        return Err(CommandError::BadArgument("You can't kick yourself.".to_owned()).into());
    }

    let bot_id = ctx.serenity_context().cache.current_user().id;
    if member.user.id == bot_id {
        return Err(CommandError::BadArgument("I'm not going to kick myself.".to_owned()).into());
    }

    match reason.as_deref() {
        Some(reason) => member.kick_with_reason(ctx, reason).await,
        None => member.kick(ctx).await,
    }
    .wrap_err("Failed to kick member")?;

    tracing::info!(
        "{} kicked {} ({})",
        ctx.author().tag(),
        member.user.tag(),
        reason.as_deref().unwrap_or("no reason")
    );

    let reply = match reason {
        Some(reason) => format!("Kicked {}: {reason}", member.user.tag()),
        None => format!("Kicked {}", member.user.tag()),
    };
    ctx.say(reply).await?;

    Ok(())
}
