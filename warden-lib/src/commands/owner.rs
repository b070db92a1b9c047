use crate::{commands::checks::operator_only, data::PoiseContext};
use color_eyre::eyre::Result;

fn describe(flag: &str, previous: bool, enabled: bool) -> String {
    match (previous, enabled) {
        (false, true) => format!("{flag} is now on."),
        (true, false) => format!("{flag} is now off."),
        (_, true) => format!("{flag} was already on."),
        (_, false) => format!("{flag} was already off."),
    }
}

/// Only operators can use commands while maintenance mode is on
#[poise::command(slash_command, prefix_command, check = "operator_only", ephemeral = true)]
pub async fn maintenance(
    ctx: PoiseContext<'_>,
    #[description = "Turn maintenance mode on or off"] enabled: bool,
) -> Result<()> {
    let previous = ctx.data().session.set_maintenance(enabled);

    ctx.say(describe("Maintenance mode", previous, enabled))
        .await?;

    Ok(())
}

/// Lets operators run prefix commands without typing the prefix
#[poise::command(slash_command, prefix_command, check = "operator_only", ephemeral = true)]
pub async fn noprefix(
    ctx: PoiseContext<'_>,
    #[description = "Turn no-prefix mode on or off"] enabled: bool,
) -> Result<()> {
    let previous = ctx.data().session.set_no_prefix(enabled);

    ctx.say(describe("No-prefix mode", previous, enabled)).await?;

    Ok(())
}
