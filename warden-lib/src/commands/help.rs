use crate::data::PoiseContext;
use color_eyre::eyre::Result;

const FIRST_HELP_TIP: &str =
    "Something broke? Unexpected errors are reported to the bot operators automatically.";

#[poise::command(slash_command, prefix_command)]
pub async fn help(ctx: PoiseContext<'_>) -> Result<()> {
    let help_text = ctx.data().config.read().await.help_text.clone();

    let mut reply = match help_text {
        Some(help_text) => help_text.to_string(),
        None => {
            "Help text could not be found. Please contact the bot owner to set it up.".to_owned()
        }
    };

    if ctx.data().session.take_first_help() {
        reply.push_str("\n\n");
        reply.push_str(FIRST_HELP_TIP);
    }

    ctx.say(reply).await?;

    Ok(())
}
