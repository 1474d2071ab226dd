pub mod utility;

use std::sync::Arc;

use tracing::{debug, warn};
use twilight_model::gateway::payload::incoming::{InteractionCreate, MessageCreate, ReactionAdd};

use pager_core::Context;
use pager_utils::COMMAND_PREFIX;
use pager_utils::pagination::{
    InteractionReply, PaginationInteraction, SessionRegistry, interaction_event, reaction_event,
    respond_expired, respond_invalid,
};

// Global command meta data
pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::help::META,
    utility::pagetest::META,
    utility::lazytest::META,
    // Add new commands here
];

pub async fn handle_message(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<()> {
    if msg.author.bot {
        return Ok(());
    }

    let content_owned = msg.content.clone();
    let content = content_owned.trim();

    if !content.starts_with(COMMAND_PREFIX) {
        return Ok(());
    }

    let content = content.trim_start_matches(COMMAND_PREFIX).trim();
    let mut command_and_rest = content.splitn(2, char::is_whitespace);
    let cmd = command_and_rest.next().unwrap_or("").to_ascii_lowercase();
    let args: Vec<&str> = command_and_rest
        .next()
        .map(|rest| rest.split_whitespace().collect())
        .unwrap_or_default();

    match cmd.as_str() {
        "help" => utility::help::run(ctx.clone(), msg, args.first().copied()).await?,
        "pagetest" => utility::pagetest::run(ctx.clone(), msg, &args).await?,
        "lazytest" => utility::lazytest::run(ctx.clone(), msg).await?,
        // Add new commands here
        _ => {}
    }

    Ok(())
}

/// Reply owed to an interaction that did not reach a session.
#[derive(Debug, PartialEq, Eq)]
enum Notice {
    Invalid(InteractionReply),
    Expired(InteractionReply),
}

/// Route pagination button presses and jump-modal submits to their session.
///
/// Interactions for a message with no live session are answered with the
/// "expired" notice so the client does not show a failed interaction. The
/// notice is sent from its own task; only the hand-off to the session queue
/// happens in the caller.
pub async fn handle_interaction(
    ctx: Context,
    interaction: Box<InteractionCreate>,
) -> anyhow::Result<()> {
    let Some(notice) = route_interaction(&ctx.sessions, interaction_event(&interaction)).await
    else {
        return Ok(());
    };

    let http = Arc::clone(&ctx.http);
    tokio::spawn(async move {
        let sent = match &notice {
            Notice::Invalid(reply) => respond_invalid(&http, reply).await,
            Notice::Expired(reply) => respond_expired(&http, reply).await,
        };
        if let Err(err) = sent {
            warn!(error = %err, "failed to answer pagination interaction");
        }
    });

    Ok(())
}

async fn route_interaction(
    sessions: &SessionRegistry,
    interaction: PaginationInteraction,
) -> Option<Notice> {
    match interaction {
        PaginationInteraction::NotPagination => None,
        PaginationInteraction::Invalid(reply) => Some(Notice::Invalid(reply)),
        PaginationInteraction::Event(event) => {
            let event = sessions.deliver(event).await.err()?;
            debug!(
                message_id = event.message.message_id.get(),
                "interaction for a message without a live session"
            );
            event.reply.map(Notice::Expired)
        }
    }
}

/// Route a reaction add to the session owning the message, if any.
pub async fn handle_reaction(ctx: Context, reaction: Box<ReactionAdd>) -> anyhow::Result<()> {
    // The bot's own control reactions are not input.
    if reaction.user_id == ctx.bot_user_id {
        return Ok(());
    }

    let Some(event) = reaction_event(&reaction) else {
        return Ok(());
    };

    // Reactions on ordinary messages are not ours to answer.
    let _ = ctx.sessions.deliver(event).await;

    Ok(())
}
