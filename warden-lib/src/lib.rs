use color_eyre::eyre::Result;
use data::PoiseContext;
use std::time::Duration;

pub mod automod;
pub mod commands;
pub mod config;
pub mod data;
pub mod error_handler;
pub mod event_handler;
pub mod limits;
pub mod session;
mod utils;

trait SayThenDelete {
    async fn say_then_delete(self, message: impl Into<String>, after: Duration) -> Result<()>;
}

impl SayThenDelete for PoiseContext<'_> {
    async fn say_then_delete(self, message: impl Into<String>, after: Duration) -> Result<()> {
        let message = self.say(message).await?;

        tokio::time::sleep(after).await;
        message.delete(self).await.ok();

        Ok(())
    }
}
