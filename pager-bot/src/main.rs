use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt as _};
use twilight_http::Client;
use twilight_model::gateway::event::Event;

use rustls::crypto::ring::default_provider;

use pager_commands::{handle_interaction, handle_message, handle_reaction};
use pager_core::{Config, Context};

/// How long live sessions get to run their cancel behavior on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    // Load the .env file
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    let token = config.discord_token.clone();

    // Create a single shared HTTP Client
    let http = Arc::new(Client::new(token.clone()));
    let bot_user = http.current_user().await?.model().await?;
    let ctx = Context::new(Arc::clone(&http), bot_user.id, config);

    let intents = Intents::GUILDS
        | Intents::GUILD_MESSAGES
        | Intents::GUILD_MESSAGE_REACTIONS
        | Intents::MESSAGE_CONTENT;

    // A shard is one Gateway WebSocket connection to Discord
    let mut shard = Shard::new(ShardId::new(0, 1), token, intents);

    info!(
        timeout_secs = ctx.config.pagination_timeout.as_secs(),
        "Pager is connecting..."
    );

    loop {
        let item = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
            item = shard.next_event(EventTypeFlags::all()) => item,
        };

        let Some(item) = item else {
            warn!("gateway event stream ended");
            break;
        };

        let event = match item {
            Ok(event) => event,
            Err(source) => {
                error!(?source, "gateway event stream error");
                continue;
            }
        };

        match event {
            Event::Ready(_) => {
                info!("Pager has successfully awoken!");
            }
            Event::MessageCreate(msg) => {
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_message(ctx, msg).await {
                        error!(error = %err, "message command failed");
                    }
                });
            }
            // Routed inline so events reach their session queue in gateway order.
            Event::InteractionCreate(interaction) => {
                if let Err(err) = handle_interaction(ctx.clone(), interaction).await {
                    error!(error = %err, "interaction handling failed");
                }
            }
            Event::ReactionAdd(reaction) => {
                if let Err(err) = handle_reaction(ctx.clone(), reaction).await {
                    error!(error = %err, "reaction handling failed");
                }
            }
            _ => {} // Ignore unused events
        }
    }

    ctx.shutdown.cancel();
    let unfinished = ctx.drain(SHUTDOWN_GRACE).await;
    if unfinished > 0 {
        warn!(unfinished, "sessions still running at shutdown");
    }

    Ok(()) // Return Success, shutdown cleanly
}
