use crate::{
    automod::BannedWords,
    config::Config,
    limits::{Concurrency, Cooldowns},
    session::Session,
};
use chrono::{DateTime, Utc};
use color_eyre::eyre::{Error, Result, WrapErr};
use poise::serenity_prelude::UserId;
use std::{
    collections::HashSet,
    path::Path,
    sync::{Arc, OnceLock},
};
use tokio::sync::RwLock;
use warden_db::{WardenDb, prefix::GuildPrefixes};

/// The global state of the bot
pub type State = Arc<AppState>;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    /// Config file watcher that refreshes the config if it changes
    ///
    /// Attached to the AppState to keep the watcher alive
    _watcher: notify::RecommendedWatcher,
    /// The path to the config file.
    pub config_path: Box<Path>,
    /// Reloaded together with the config.
    pub banned_words: Arc<parking_lot::RwLock<BannedWords>>,
    pub session: Session,
    pub prefixes: GuildPrefixes,
    pub cooldowns: Cooldowns,
    pub concurrency: Concurrency,
    pub http: reqwest::Client,
    pub started_at: DateTime<Utc>,
    /// The application's owners, filled in once the framework knows them.
    application_owners: OnceLock<HashSet<UserId>>,
}

impl AppState {
    pub fn new(config: Config, config_path: String) -> Result<State> {
        let db = WardenDb::new(&config.database_path)?;
        let prefixes = GuildPrefixes::new(&db)?;
        let banned_words = Arc::new(parking_lot::RwLock::new(BannedWords::from_config(&config)));
        let config = Arc::new(RwLock::new(config));

        use notify::{
            Event, EventKind, RecursiveMode, Watcher,
            event::{AccessKind, AccessMode},
        };

        let config_clone = Arc::clone(&config);
        let banned_words_clone = Arc::clone(&banned_words);
        let reload_config_path = config_path.clone();
        let config_path: Box<Path> = Path::new(&config_path).into();

        let mut watcher = notify::recommended_watcher(move |res| match res {
            Ok(Event {
                kind: EventKind::Access(AccessKind::Close(AccessMode::Write)),
                ..
            }) => {
                tracing::info!("config changed, reloading...");

                let mut config = config_clone.blocking_write();
                config.reload(&*reload_config_path);
                *banned_words_clone.write() = BannedWords::from_config(&config);
            }
            Err(e) => tracing::error!("watch error: {:?}", e),
            _ => {}
        })
        .wrap_err("Failed to create file watcher")?;

        watcher
            .watch(&config_path, RecursiveMode::NonRecursive)
            .wrap_err("Failed to watch config file")?;

        Ok(Arc::new(AppState {
            config,
            _watcher: watcher,
            config_path,
            banned_words,
            session: Session::new(),
            prefixes,
            cooldowns: Cooldowns::default(),
            concurrency: Concurrency::default(),
            http: reqwest::Client::new(),
            started_at: Utc::now(),
            application_owners: OnceLock::new(),
        }))
    }

    pub fn set_application_owners(&self, owners: impl IntoIterator<Item = UserId>) {
        if self
            .application_owners
            .set(owners.into_iter().collect())
            .is_err()
        {
            tracing::warn!("Application owners were already set");
        }
    }

    /// Application owners and the configured operators, as of the current config.
    pub async fn is_operator(&self, user: UserId) -> bool {
        let is_owner = self
            .application_owners
            .get()
            .is_some_and(|owners| owners.contains(&user));

        is_owner || self.config.read().await.is_operator(user)
    }
}

// User data, which is stored and accessible in all command invocations
pub type PoiseContext<'a> = poise::Context<'a, State, Error>;
