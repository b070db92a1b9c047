use crate::{
    SayThenDelete,
    data::PoiseContext,
    error_handler::{BucketKind, CommandError},
    limits::BucketTarget,
};
use color_eyre::eyre::{Result, WrapErr};
use itertools::Itertools;
use poise::serenity_prelude::GetMessages;
use std::time::Duration;

/// Discord's bulk delete limit.
const MAX_PURGE: u8 = 100;

/// Bulk delete recent messages in this channel
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    required_permissions = "MANAGE_MESSAGES",
    required_bot_permissions = "MANAGE_MESSAGES"
)]
pub async fn purge(
    ctx: PoiseContext<'_>,
    #[description = "How many messages to delete (1-100)"] count: u8,
) -> Result<()> {
    if count == 0 || count > MAX_PURGE {
        return Err(CommandError::BadArgument(format!(
            "I can delete between 1 and {MAX_PURGE} messages at a time."
        ))
        .into());
    }

    let target = BucketTarget::of(ctx).await;
    let _running = ctx
        .data()
        .concurrency
        .acquire("purge", BucketKind::Channel, 1, &target)?;

    let channel = ctx.channel_id();
    let mut request = GetMessages::new().limit(count);

    // Leave the invoking message alone, it's deleted separately below.
    if let poise::Context::Prefix(prefix) = ctx {
        request = request.before(prefix.msg.id);
    }

    let ids = channel
        .messages(ctx, request)
        .await
        .wrap_err("Failed to fetch messages")?
        .iter()
        .map(|message| message.id)
        .collect_vec();
    let deleted = ids.len();

    match ids.as_slice() {
        [] => {}
        [only] => channel
            .delete_message(ctx.http(), *only)
            .await
            .wrap_err("Failed to delete message")?,
        _ => channel
            .delete_messages(ctx.http(), ids)
            .await
            .wrap_err("Failed to bulk delete messages")?,
    }

    if let poise::Context::Prefix(prefix) = ctx {
        prefix.msg.delete(ctx).await.ok();
    }

    tracing::info!("{} purged {} messages in {}", ctx.author().tag(), deleted, channel);

    ctx.say_then_delete(format!("Deleted {deleted} message(s)."), Duration::from_secs(5))
        .await
}
