use super::{
    format::{fence_safe, truncate_chars},
    kind::Invocation,
};
use poise::serenity_prelude::{ChannelId, GuildId};

/// Discord's per-message content limit.
pub const MESSAGE_LIMIT: usize = 2000;
/// How much of the invoking message is quoted in a report.
pub const RAW_COMMAND_LIMIT: usize = 1700;
pub const TRACE_FILE_NAME: &str = "traceback.txt";

#[derive(Clone, Debug, PartialEq)]
pub enum Location {
    Dm,
    Guild {
        guild_id: GuildId,
        channel_id: ChannelId,
        /// `None` when the bot's own member couldn't be looked up.
        administrator: Option<bool>,
        top_role: Option<u16>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ErrorReport {
    pub command: String,
    pub author: String,
    pub raw: String,
    pub location: Location,
    pub trace: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RenderedReport {
    Inline(String),
    /// Too long for one message, the trace goes into [`TRACE_FILE_NAME`].
    Attached { header: String, trace: String },
}

impl ErrorReport {
    pub fn new(origin: &Invocation, location: Location, trace: String) -> Self {
        ErrorReport {
            command: origin.command.clone(),
            author: format!("{} ({})", origin.author, origin.author_id),
            raw: origin.raw.clone(),
            location,
            trace,
        }
    }

    fn metadata(&self) -> String {
        let mut lines = vec![
            format!("Invoked by: {}", self.author),
            format!(
                "Command text: {}",
                fence_safe(&truncate_chars(&self.raw, RAW_COMMAND_LIMIT))
            ),
        ];

        match &self.location {
            Location::Dm => lines.push("Executed in DMs".to_owned()),
            Location::Guild {
                guild_id,
                channel_id,
                administrator,
                top_role,
            } => lines.extend([
                format!("Guild: {guild_id}, channel: {channel_id}"),
                format!("Bot is administrator: {}", display_or_unknown(administrator)),
                format!("Bot top role position: {}", display_or_unknown(top_role)),
            ]),
        }

        lines.join("\n")
    }

    pub fn render(&self) -> RenderedReport {
        let metadata = self.metadata();
        let inline = format!(
            "```yaml\n{metadata}\n```\n**Error in `{}`**\n```rs\n{}\n```",
            self.command,
            fence_safe(&self.trace)
        );

        if inline.chars().count() < MESSAGE_LIMIT {
            return RenderedReport::Inline(inline);
        }

        let header = format!(
            "```yaml\n{}\n```\n**Error in `{}`**, trace attached.",
            truncate_chars(&metadata, MESSAGE_LIMIT / 2),
            self.command
        );

        RenderedReport::Attached {
            header,
            trace: format!("Error in {}\n\n{}", self.command, self.trace),
        }
    }
}

fn display_or_unknown<T: std::fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map_or_else(|| "unknown".to_owned(), ToString::to_string)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error_handler::test::kick_invocation;

    fn guild_location() -> Location {
        Location::Guild {
            guild_id: GuildId::new(20),
            channel_id: ChannelId::new(30),
            administrator: Some(false),
            top_role: None,
        }
    }

    #[test]
    fn short_reports_are_inline() {
        let report = ErrorReport::new(&kick_invocation(), guild_location(), "boom".to_owned());

        let RenderedReport::Inline(text) = report.render() else {
            panic!("expected an inline report");
        };

        assert!(text.contains("`kick`"));
        assert!(text.contains("boom"));
        assert!(text.contains("Invoked by: someone (10)"));
        assert!(text.contains("Bot is administrator: false"));
        assert!(text.contains("Bot top role position: unknown"));
        assert!(text.chars().count() < MESSAGE_LIMIT);
    }

    #[test]
    fn dm_reports_say_so() {
        let report = ErrorReport::new(&kick_invocation(), Location::Dm, "boom".to_owned());

        let RenderedReport::Inline(text) = report.render() else {
            panic!("expected an inline report");
        };

        assert!(text.contains("Executed in DMs"));
        assert!(!text.contains("Guild:"));
    }

    #[test]
    fn long_traces_are_attached() {
        let trace = "frame\n".repeat(500);
        let report = ErrorReport::new(&kick_invocation(), guild_location(), trace.clone());

        let RenderedReport::Attached {
            header,
            trace: attached,
        } = report.render()
        else {
            panic!("expected an attached report");
        };

        assert!(header.chars().count() < MESSAGE_LIMIT);
        assert!(header.contains("`kick`"));
        assert!(attached.contains("kick"));
        assert!(attached.ends_with(&trace));
    }

    #[test]
    fn backticks_stay_inside_their_blocks() {
        let mut origin = kick_invocation();
        origin.raw = "!kick ```a``` b".to_owned();

        let report = ErrorReport::new(&origin, Location::Dm, "panicked at ```x```".to_owned());

        let RenderedReport::Inline(text) = report.render() else {
            panic!("expected an inline report");
        };

        // yaml open + close, rs open + close
        assert_eq!(text.matches("```").count(), 4);
        assert!(text.ends_with("\n```"));
    }

    #[test]
    fn raw_command_is_truncated() {
        let mut origin = kick_invocation();
        origin.raw = "x".repeat(RAW_COMMAND_LIMIT + 100);

        let report = ErrorReport::new(&origin, Location::Dm, "boom".to_owned());
        let metadata = report.metadata();

        assert!(metadata.contains(&format!("{}...", "x".repeat(RAW_COMMAND_LIMIT))));
        assert!(!metadata.contains(&"x".repeat(RAW_COMMAND_LIMIT + 1)));
    }
}
