pub mod help;
pub mod lazytest;
pub mod pagetest;

use std::sync::Arc;

use tracing::{debug, error, info};
use twilight_model::gateway::payload::incoming::MessageCreate;

use pager_core::Context;
use pager_utils::pagination::{
    ActionOnStop, PageSource, Session, SessionBuilder, StopBehavior, send_paginated_message,
};

/// Session owned by the command author, using the configured timeout.
///
/// Sessions stopped by shutdown get their controls disabled instead of
/// being left clickable on a bot that no longer listens.
fn author_session(ctx: &Context, msg: &MessageCreate, source: impl Into<PageSource>) -> SessionBuilder {
    Session::builder(source)
        .user(msg.author.id)
        .timeout(ctx.config.pagination_timeout)
        .action_on_cancel(StopBehavior::new(ActionOnStop::DisableControls))
}

/// Send the first page and hand the session to a dispatcher.
async fn start_session(ctx: &Context, msg: &MessageCreate, session: Session) -> anyhow::Result<()> {
    let handle = send_paginated_message(
        Arc::clone(&ctx.http),
        ctx.sessions.clone(),
        ctx.shutdown.clone(),
        msg.channel_id,
        session,
    )
    .await?;

    let Some(handle) = handle else {
        return Ok(());
    };

    let message_id = handle.message().message_id.get();
    info!(message_id, author = msg.author.id.get(), "paginated message sent");

    ctx.track(async move {
        match handle.wait().await {
            Ok(outcome) => debug!(
                message_id,
                reason = outcome.reason.as_label(),
                index = outcome.final_index,
                "paginated message finished"
            ),
            Err(err) => error!(message_id, error = %err, "pagination task failed"),
        }
    })
    .await;

    Ok(())
}
