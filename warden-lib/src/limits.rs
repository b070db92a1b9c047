//! Per-bucket cooldowns and concurrency caps for our own commands.

use crate::{
    data::PoiseContext,
    error_handler::{BucketKind, CommandError},
};
use ahash::AHashMap;
use parking_lot::Mutex;
use poise::serenity_prelude::{ChannelId, GuildId, RoleId, UserId};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// The ids an invocation can be bucketed by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BucketTarget {
    pub user: UserId,
    pub guild: Option<GuildId>,
    pub channel: ChannelId,
    pub category: Option<ChannelId>,
    pub top_role: Option<RoleId>,
}

type BucketKey = (&'static str, BucketKind, u64, u64);

impl BucketTarget {
    pub async fn of(ctx: PoiseContext<'_>) -> Self {
        let channel = ctx.channel_id();
        let member = ctx.author_member().await;

        let (category, top_role) = match ctx.guild() {
            Some(guild) => (
                guild.channels.get(&channel).and_then(|channel| channel.parent_id),
                member
                    .as_deref()
                    .and_then(|member| guild.member_highest_role(member))
                    .map(|role| role.id),
            ),
            None => (None, None),
        };

        BucketTarget {
            user: ctx.author().id,
            guild: ctx.guild_id(),
            channel,
            category,
            top_role,
        }
    }

    /// Guild scoped buckets fall back to the user outside of guilds, and to the
    /// channel for uncategorized channels.
    fn key(&self, command: &'static str, bucket: BucketKind) -> BucketKey {
        let user = self.user.get();
        let guild_or_user = self.guild.map_or(user, GuildId::get);

        let (first, second) = match bucket {
            BucketKind::Default => (0, 0),
            BucketKind::User => (user, 0),
            BucketKind::Guild => (guild_or_user, 0),
            BucketKind::Channel => (self.channel.get(), 0),
            BucketKind::Member => (guild_or_user, user),
            BucketKind::Category => (self.category.unwrap_or(self.channel).get(), 0),
            BucketKind::Role => (self.top_role.map_or(guild_or_user, RoleId::get), 0),
        };

        (command, bucket, first, second)
    }
}

/// How often expired cooldowns are swept out of the table.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Default)]
struct CooldownTable {
    ready_at: AHashMap<BucketKey, Instant>,
    last_sweep: Option<Instant>,
}

#[derive(Default)]
pub struct Cooldowns(Mutex<CooldownTable>);

impl Cooldowns {
    pub fn check(
        &self,
        command: &'static str,
        bucket: BucketKind,
        per: Duration,
        target: &BucketTarget,
    ) -> Result<(), CommandError> {
        self.check_at(command, bucket, per, target, Instant::now())
    }

    fn check_at(
        &self,
        command: &'static str,
        bucket: BucketKind,
        per: Duration,
        target: &BucketTarget,
        now: Instant,
    ) -> Result<(), CommandError> {
        let key = target.key(command, bucket);
        let mut table = self.0.lock();

        if table
            .last_sweep
            .is_none_or(|swept| now.duration_since(swept) >= SWEEP_INTERVAL)
        {
            table.ready_at.retain(|_, ready_at| *ready_at > now);
            table.last_sweep = Some(now);
        }

        match table.ready_at.get(&key) {
            Some(&ready_at) if ready_at > now => Err(CommandError::Cooldown {
                retry_after: ready_at - now,
                bucket,
            }),
            _ => {
                table.ready_at.insert(key, now + per);
                Ok(())
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.0.lock().ready_at.len()
    }
}

#[derive(Default, Clone)]
pub struct Concurrency(Arc<Mutex<AHashMap<BucketKey, u32>>>);

/// Frees its slot when dropped.
#[must_use]
pub struct ConcurrencyGuard {
    running: Arc<Mutex<AHashMap<BucketKey, u32>>>,
    key: BucketKey,
}

impl Concurrency {
    pub fn acquire(
        &self,
        command: &'static str,
        bucket: BucketKind,
        max: u32,
        target: &BucketTarget,
    ) -> Result<ConcurrencyGuard, CommandError> {
        let key = target.key(command, bucket);
        let mut running = self.0.lock();
        let count = running.entry(key).or_default();

        if *count >= max {
            return Err(CommandError::MaxConcurrency { max, bucket });
        }

        *count += 1;

        Ok(ConcurrencyGuard {
            running: Arc::clone(&self.0),
            key,
        })
    }
}

impl Drop for ConcurrencyGuard {
    fn drop(&mut self) {
        let mut running = self.running.lock();

        if let Some(count) = running.get_mut(&self.key) {
            *count = count.saturating_sub(1);

            if *count == 0 {
                running.remove(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn target(user: u64, channel: u64) -> BucketTarget {
        BucketTarget {
            user: UserId::new(user),
            guild: Some(GuildId::new(100)),
            channel: ChannelId::new(channel),
            category: None,
            top_role: None,
        }
    }

    #[test]
    fn cooldown_per_user() {
        let cooldowns = Cooldowns::default();
        let per = Duration::from_secs(5);
        let start = Instant::now();

        assert!(cooldowns
            .check_at("ping", BucketKind::User, per, &target(1, 1), start)
            .is_ok());

        let Err(CommandError::Cooldown {
            retry_after,
            bucket,
        }) = cooldowns.check_at(
            "ping",
            BucketKind::User,
            per,
            &target(1, 2),
            start + Duration::from_secs(2),
        )
        else {
            panic!("expected a cooldown");
        };
        assert_eq!(retry_after, Duration::from_secs(3));
        assert_eq!(bucket, BucketKind::User);

        // other users and other commands are unaffected
        assert!(cooldowns
            .check_at("ping", BucketKind::User, per, &target(2, 1), start)
            .is_ok());
        assert!(cooldowns
            .check_at("cat", BucketKind::User, per, &target(1, 1), start)
            .is_ok());

        assert!(cooldowns
            .check_at("ping", BucketKind::User, per, &target(1, 1), start + per)
            .is_ok());
    }

    #[test]
    fn expired_cooldowns_are_dropped() {
        let cooldowns = Cooldowns::default();
        let per = Duration::from_secs(5);
        let start = Instant::now();

        for user in 1..=1000 {
            assert!(cooldowns
                .check_at("ping", BucketKind::User, per, &target(user, 1), start)
                .is_ok());
        }
        assert_eq!(cooldowns.len(), 1000);

        let later = start + Duration::from_secs(60 * 60);
        assert!(cooldowns
            .check_at("ping", BucketKind::User, per, &target(1001, 1), later)
            .is_ok());
        assert_eq!(cooldowns.len(), 1);

        // still on cooldown after the sweep
        assert!(cooldowns
            .check_at("ping", BucketKind::User, per, &target(1001, 1), later)
            .is_err());
    }

    #[test]
    fn concurrency_per_channel() {
        let concurrency = Concurrency::default();

        let guard = concurrency
            .acquire("purge", BucketKind::Channel, 1, &target(1, 10))
            .unwrap();

        assert_eq!(
            concurrency
                .acquire("purge", BucketKind::Channel, 1, &target(2, 10))
                .err(),
            Some(CommandError::MaxConcurrency {
                max: 1,
                bucket: BucketKind::Channel
            })
        );
        assert!(concurrency
            .acquire("purge", BucketKind::Channel, 1, &target(1, 11))
            .is_ok());

        drop(guard);

        assert!(concurrency
            .acquire("purge", BucketKind::Channel, 1, &target(2, 10))
            .is_ok());
    }

    #[test]
    fn dm_buckets_fall_back_to_user() {
        let dm = BucketTarget {
            guild: None,
            ..target(7, 8)
        };

        assert_eq!(dm.key("x", BucketKind::Guild), ("x", BucketKind::Guild, 7, 0));
        assert_eq!(dm.key("x", BucketKind::Member), ("x", BucketKind::Member, 7, 7));
        assert_eq!(dm.key("x", BucketKind::Role), ("x", BucketKind::Role, 7, 0));
        assert_eq!(
            dm.key("x", BucketKind::Category),
            ("x", BucketKind::Category, 8, 0)
        );
    }
}
