use super::{
    ClassifiedError, ErrorConfig, Outcome, classify,
    report::{ErrorReport, Location, RenderedReport, TRACE_FILE_NAME},
    resolve::WASTEBASKET,
};
use crate::data::PoiseContext;
use color_eyre::eyre::{OptionExt, Result, WrapErr};
use poise::{
    CreateReply,
    serenity_prelude::{
        ChannelId, CreateAttachment, CreateEmbed, CreateMessage, Guild, Member, ReactionType,
    },
};
use warden_traits::ForwardRefToTracing;

/// Where the pipeline's messages go.
pub trait ErrorSink {
    /// The formatted (embed) reply in the invoking channel.
    async fn reply(&self, text: &str) -> Result<()>;
    /// Plain text fallback when [`ErrorSink::reply`] fails.
    async fn reply_plain(&self, text: &str) -> Result<()>;
    async fn location(&self) -> Location;
    /// Posts to the operator log channel and adds the resolve reaction.
    async fn report(&self, report: &ErrorReport) -> Result<()>;
}

/// Classifies and delivers one failed invocation.
///
/// Returns `Err(original)` for unclassified errors, after the report has been
/// posted (or failed to post). Every other failure is swallowed.
pub async fn dispatch<S: ErrorSink, E>(
    sink: &S,
    config: &ErrorConfig,
    bot_name: &str,
    error: ClassifiedError,
    original: E,
) -> Result<(), E> {
    match classify(config, bot_name, error) {
        Outcome::Ignore => Ok(()),
        Outcome::Reply(text) => {
            if sink
                .reply(&text)
                .await
                .warn_err_ok("Failed to send error embed")
                .is_none()
            {
                sink.reply_plain(&text)
                    .await
                    .warn_err_ok("Failed to send error message");
            }

            Ok(())
        }
        Outcome::Escalate { origin, trace } => {
            let report = ErrorReport::new(&origin, sink.location().await, trace);

            sink.report(&report)
                .await
                .warn_err_ok("Failed to report error to the log channel");

            Err(original)
        }
    }
}

pub struct DiscordSink<'a> {
    ctx: PoiseContext<'a>,
    log_channel: Option<ChannelId>,
}

impl<'a> DiscordSink<'a> {
    pub fn new(ctx: PoiseContext<'a>, log_channel: Option<ChannelId>) -> Self {
        Self { ctx, log_channel }
    }

    fn bot_standing(&self, member: &Member) -> (Option<bool>, Option<u16>) {
        match self.ctx.guild() {
            Some(guild) => {
                let (administrator, top_role) = standing(&guild, member);
                (Some(administrator), top_role)
            }
            None => (None, None),
        }
    }
}

/// Whether `member` is an administrator in `guild`, and its top role's position.
fn standing(guild: &Guild, member: &Member) -> (bool, Option<u16>) {
    let administrator = guild.member_permissions(member).administrator();
    let top_role = guild.member_highest_role(member).map(|role| role.position);

    (administrator, top_role)
}

impl ErrorSink for DiscordSink<'_> {
    async fn reply(&self, text: &str) -> Result<()> {
        self.ctx
            .send(
                CreateReply::default()
                    .embed(CreateEmbed::new().description(text).color((255, 0, 0)))
                    .ephemeral(true),
            )
            .await?;

        Ok(())
    }

    async fn reply_plain(&self, text: &str) -> Result<()> {
        self.ctx.say(text).await?;
        Ok(())
    }

    async fn location(&self) -> Location {
        let Some(guild_id) = self.ctx.guild_id() else {
            return Location::Dm;
        };

        let bot_id = self.ctx.serenity_context().cache.current_user().id;
        let (administrator, top_role) = match guild_id
            .member(self.ctx, bot_id)
            .await
            .warn_err_ok("Couldn't fetch own member")
        {
            Some(member) => self.bot_standing(&member),
            None => (None, None),
        };

        Location::Guild {
            guild_id,
            channel_id: self.ctx.channel_id(),
            administrator,
            top_role,
        }
    }

    async fn report(&self, report: &ErrorReport) -> Result<()> {
        let channel = self.log_channel.ok_or_eyre("No log channel configured")?;

        let message = match report.render() {
            RenderedReport::Inline(text) => CreateMessage::new().content(text),
            RenderedReport::Attached { header, trace } => CreateMessage::new()
                .content(header)
                .add_file(CreateAttachment::bytes(trace.into_bytes(), TRACE_FILE_NAME)),
        };

        let message = channel
            .send_message(self.ctx, message)
            .await
            .wrap_err("Failed to post error report")?;

        message
            .react(self.ctx, ReactionType::Unicode(WASTEBASKET.to_owned()))
            .await
            .wrap_err("Failed to add resolve reaction")?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error_handler::{ErrorKind, kind::Invocation, test::kick_invocation};
    use color_eyre::eyre::bail;
    use poise::serenity_prelude::{ChannelId, GuildId, Permissions, Role, RoleId, UserId};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        fail_embed: bool,
        fail_plain: bool,
        fail_report: bool,
        embeds: Mutex<Vec<String>>,
        plain: Mutex<Vec<String>>,
        reports: Mutex<Vec<ErrorReport>>,
    }

    impl ErrorSink for RecordingSink {
        async fn reply(&self, text: &str) -> Result<()> {
            if self.fail_embed {
                bail!("missing embed links");
            }
            self.embeds.lock().unwrap().push(text.to_owned());
            Ok(())
        }

        async fn reply_plain(&self, text: &str) -> Result<()> {
            if self.fail_plain {
                bail!("missing send messages");
            }
            self.plain.lock().unwrap().push(text.to_owned());
            Ok(())
        }

        async fn location(&self) -> Location {
            Location::Guild {
                guild_id: GuildId::new(20),
                channel_id: ChannelId::new(30),
                administrator: Some(true),
                top_role: Some(3),
            }
        }

        async fn report(&self, report: &ErrorReport) -> Result<()> {
            self.reports.lock().unwrap().push(report.clone());
            if self.fail_report {
                bail!("log channel deleted");
            }
            Ok(())
        }
    }

    #[derive(Debug, PartialEq)]
    struct Original(&'static str);

    fn classified(kind: ErrorKind) -> ClassifiedError {
        ClassifiedError {
            kind,
            origin: kick_invocation(),
        }
    }

    async fn run(sink: &RecordingSink, kind: ErrorKind) -> Result<(), Original> {
        dispatch(
            sink,
            &ErrorConfig::default(),
            "warden",
            classified(kind),
            Original("original"),
        )
        .await
    }

    #[tokio::test]
    async fn ignored_errors_send_nothing() {
        let sink = RecordingSink::default();

        assert_eq!(run(&sink, ErrorKind::CommandNotFound).await, Ok(()));

        assert!(sink.embeds.lock().unwrap().is_empty());
        assert!(sink.plain.lock().unwrap().is_empty());
        assert!(sink.reports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn recognized_errors_reply_once() {
        let sink = RecordingSink::default();

        assert_eq!(run(&sink, ErrorKind::GuildOnly).await, Ok(()));

        assert_eq!(sink.embeds.lock().unwrap().len(), 1);
        assert!(sink.plain.lock().unwrap().is_empty());
        assert!(sink.reports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn falls_back_to_plain_text() {
        let sink = RecordingSink {
            fail_embed: true,
            ..Default::default()
        };

        assert_eq!(run(&sink, ErrorKind::DmOnly).await, Ok(()));
        assert_eq!(sink.plain.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn swallows_delivery_failures() {
        let sink = RecordingSink {
            fail_embed: true,
            fail_plain: true,
            ..Default::default()
        };

        assert_eq!(run(&sink, ErrorKind::NsfwOnly).await, Ok(()));
    }

    #[tokio::test]
    async fn unclassified_is_reported_then_reraised() {
        let sink = RecordingSink::default();

        let result = run(&sink, ErrorKind::Unclassified {
            trace: "thread panicked at src/commands/kick.rs".to_owned(),
        })
        .await;

        assert_eq!(result, Err(Original("original")));

        let reports = sink.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);

        let RenderedReport::Inline(text) = reports[0].render() else {
            panic!("expected an inline report");
        };
        assert!(text.contains("kick"));
        assert!(text.contains("thread panicked"));
        assert!(sink.embeds.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reraises_even_if_report_fails() {
        let sink = RecordingSink {
            fail_report: true,
            ..Default::default()
        };

        let result = run(&sink, ErrorKind::Unclassified {
            trace: "boom".to_owned(),
        })
        .await;

        assert_eq!(result, Err(Original("original")));
    }

    #[tokio::test]
    async fn report_carries_origin() {
        let sink = RecordingSink::default();
        let Invocation {
            command, author_id, ..
        } = kick_invocation();

        run(&sink, ErrorKind::Unclassified {
            trace: "boom".to_owned(),
        })
        .await
        .unwrap_err();

        let reports = sink.reports.lock().unwrap();
        assert_eq!(reports[0].command, command);
        assert!(reports[0].author.contains(&author_id.to_string()));
        assert!(!reports[0].trace.is_empty());
    }

    fn role(id: u64, position: u16, permissions: Permissions) -> Role {
        let mut role = Role::default();
        role.id = RoleId::new(id);
        role.position = position;
        role.permissions = permissions;
        role
    }

    #[test]
    fn standing_from_roles() {
        let mut guild = Guild::default();
        guild.id = GuildId::new(20);
        guild.owner_id = UserId::new(99);
        for role in [
            role(20, 0, Permissions::SEND_MESSAGES),
            role(1, 4, Permissions::KICK_MEMBERS),
            role(2, 7, Permissions::ADMINISTRATOR),
        ] {
            guild.roles.insert(role.id, role);
        }

        let mut member = Member::default();
        member.user.id = UserId::new(5);
        member.roles = vec![RoleId::new(1)];

        assert_eq!(standing(&guild, &member), (false, Some(4)));

        member.roles.push(RoleId::new(2));
        assert_eq!(standing(&guild, &member), (true, Some(7)));

        member.roles.clear();
        assert_eq!(standing(&guild, &member), (false, None));
    }
}
