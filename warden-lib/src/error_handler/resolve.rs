use crate::data::State;
use color_eyre::eyre::{Result, WrapErr};
use poise::serenity_prelude::{ChannelId, Context, EditMessage, Reaction, ReactionType, UserId};

pub const WASTEBASKET: &str = "🗑️";
pub const RESOLVED_MARKER: &str = "✅ **Marked as resolved**";

/// Appends the resolved marker. Not deduplicated, every call adds one.
pub fn mark_resolved(content: &str) -> String {
    format!("{content}\n{RESOLVED_MARKER}")
}

fn is_wastebasket(emoji: &ReactionType) -> bool {
    match emoji {
        ReactionType::Unicode(emoji) => {
            emoji.trim_end_matches('\u{fe0f}') == WASTEBASKET.trim_end_matches('\u{fe0f}')
        }
        _ => false,
    }
}

/// Who added a wastebasket in the log channel, if that is what happened.
pub fn resolve_reactor(
    emoji: &ReactionType,
    channel_id: ChannelId,
    log_channel: Option<ChannelId>,
    reactor: Option<UserId>,
) -> Option<UserId> {
    if is_wastebasket(emoji) && log_channel == Some(channel_id) {
        reactor
    } else {
        None
    }
}

/// Marks an operator report as resolved when an operator reacts with the
/// wastebasket. Reports are only ever authored by the bot itself.
pub async fn handle_resolve_reaction(
    ctx: &Context,
    data: &State,
    reaction: &Reaction,
) -> Result<()> {
    let log_channel = data
        .config
        .read()
        .await
        .errors
        .log_channel_id
        .map(ChannelId::new);

    let Some(reactor) = resolve_reactor(
        &reaction.emoji,
        reaction.channel_id,
        log_channel,
        reaction.user_id,
    ) else {
        return Ok(());
    };

    if !data.is_operator(reactor).await {
        return Ok(());
    }

    let mut message = reaction
        .message(ctx)
        .await
        .wrap_err("Failed to fetch reported message")?;

    if message.author.id != ctx.cache.current_user().id {
        return Ok(());
    }

    let content = mark_resolved(&message.content);

    message
        .edit(ctx, EditMessage::new().content(content))
        .await
        .wrap_err("Failed to mark report resolved")?;
    message
        .delete_reactions(ctx)
        .await
        .wrap_err("Failed to clear reactions")?;

    tracing::info!("Error report {} marked resolved", message.link());

    Ok(())
}
