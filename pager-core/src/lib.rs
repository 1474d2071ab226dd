use std::{env, future::Future, sync::Arc, time::Duration};

use anyhow::Context as _;
use tokio::{sync::Mutex, task::JoinSet};
use tokio_util::sync::CancellationToken;
use twilight_http::Client;
use twilight_model::id::{Id, marker::UserMarker};

use pager_utils::pagination::{DEFAULT_TIMEOUT_SECS, SessionRegistry};

/// Runtime settings read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub discord_token: String,
    /// Inactivity timeout applied to every pagination session.
    pub pagination_timeout: Duration,
}

impl Config {
    /// Read settings from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a local `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .context("DISCORD_TOKEN is not set")?;

        let timeout_secs = match lookup("PAGINATION_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("PAGINATION_TIMEOUT_SECS is not a number: {raw:?}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        anyhow::ensure!(timeout_secs > 0, "PAGINATION_TIMEOUT_SECS must be positive");

        Ok(Self {
            discord_token,
            pagination_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Shared application context passed into command handlers.
///
/// Cheap to clone because it only stores reference-counted shared state.
#[derive(Clone)]
pub struct Context {
    pub http: Arc<Client>,
    /// The bot's own user, used to skip its control reactions.
    pub bot_user_id: Id<UserMarker>,
    /// Live pagination sessions, keyed by message.
    pub sessions: SessionRegistry,
    pub config: Arc<Config>,
    /// Cancelled once on shutdown; every session listens to it.
    pub shutdown: CancellationToken,
    running: Arc<Mutex<JoinSet<()>>>,
}

impl Context {
    /// Create a new application context.
    pub fn new(http: Arc<Client>, bot_user_id: Id<UserMarker>, config: Config) -> Self {
        Self {
            http,
            bot_user_id,
            sessions: SessionRegistry::new(),
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
            running: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// Keep `task` running until it completes or [`Context::drain`] gives up on it.
    pub async fn track(&self, task: impl Future<Output = ()> + Send + 'static) {
        let mut running = self.running.lock().await;
        while running.try_join_next().is_some() {}
        running.spawn(task);
    }

    /// Wait up to `grace` for tracked tasks to finish. Returns how many were
    /// still running when the grace period ran out.
    pub async fn drain(&self, grace: Duration) -> usize {
        let mut running = self.running.lock().await;
        let _ = tokio::time::timeout(grace, async {
            while running.join_next().await.is_some() {}
        })
        .await;
        running.len()
    }
}
