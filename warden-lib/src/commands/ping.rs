use crate::{data::PoiseContext, error_handler::BucketKind, limits::BucketTarget};
use color_eyre::eyre::Result;
use std::time::Duration;

const PING_COOLDOWN: Duration = Duration::from_secs(5);

#[poise::command(slash_command, prefix_command)]
pub async fn ping(ctx: PoiseContext<'_>) -> Result<()> {
    let target = BucketTarget::of(ctx).await;
    ctx.data()
        .cooldowns
        .check("ping", BucketKind::User, PING_COOLDOWN, &target)?;

    let latency = ctx.ping().await;

    ctx.say(format!("Pong! Gateway latency is {}ms", latency.as_millis()))
        .await?;

    Ok(())
}
