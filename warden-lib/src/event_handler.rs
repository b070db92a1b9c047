use crate::{
    automod::moderate_message, data::State, error_handler::resolve::handle_resolve_reaction,
};
use color_eyre::eyre::{Error, Result};
use poise::serenity_prelude as serenity;
use warden_traits::ForwardRefToTracing;

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, State, Error>,
    data: &State,
) -> Result<()> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            tracing::info!(
                "{} is connected to {} guilds",
                data_about_bot.user.name,
                data_about_bot.guilds.len()
            );
        }
        serenity::FullEvent::Message { new_message } => {
            moderate_message(ctx, data, new_message)
                .await
                .trace_err_ok();
        }
        serenity::FullEvent::ReactionAdd {
            add_reaction: reaction,
        } => {
            handle_resolve_reaction(ctx, data, reaction)
                .await
                .trace_err_ok();
        }
        serenity::FullEvent::Ratelimit { data } => {
            tracing::warn!("Ratelimited: {:?}", data);
        }
        _ => {}
    };

    Ok(())
}
