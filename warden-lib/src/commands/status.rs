use crate::{data::PoiseContext, utils::GetRelativeTimestamp};
use color_eyre::eyre::Result;
use poise::{CreateReply, serenity_prelude::CreateEmbed};
use std::time::Duration;

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// How the bot is doing
#[poise::command(slash_command, prefix_command)]
pub async fn status(ctx: PoiseContext<'_>) -> Result<()> {
    let data = ctx.data();

    let uptime = (chrono::Utc::now() - data.started_at)
        .to_std()
        .unwrap_or_default();
    let uptime = humantime::format_duration(Duration::from_secs(uptime.as_secs()));
    let guilds = ctx.serenity_context().cache.guild_count();

    let embed = CreateEmbed::new()
        .title(format!("warden {}", env!("CARGO_PKG_VERSION")))
        .field(
            "Uptime",
            format!("{uptime} (since {})", data.started_at.discord_relative_timestamp()),
            false,
        )
        .field("Servers", guilds.to_string(), true)
        .field("Maintenance", on_off(data.session.maintenance()), true)
        .field("No-prefix", on_off(data.session.no_prefix()), true);

    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}
