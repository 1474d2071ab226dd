//! Collaborator traits the dispatcher talks to: rendering and error reporting.

use async_trait::async_trait;
use tracing::error;

use super::{
    action::{ControlMap, InputType, PaginatorAction},
    error::PaginationError,
    event::{InteractionEvent, MessageRef, Rejection},
    page::Page,
};

/// How navigation controls should be drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlState {
    /// Usable, with edge controls disabled where they would do nothing.
    Active,
    /// Shown but unusable.
    Disabled,
    /// Removed from the message.
    Hidden,
}

/// Everything a renderer needs to draw the controls for one page.
#[derive(Clone, Copy, Debug)]
pub struct ControlsView<'a> {
    pub controls: &'a ControlMap,
    pub input_type: InputType,
    pub current_index: usize,
    pub max_page_index: Option<usize>,
    pub state: ControlState,
}

impl ControlsView<'_> {
    /// Whether the control for `action` should be clickable.
    pub fn is_enabled(&self, action: PaginatorAction) -> bool {
        self.state == ControlState::Active
            && action.enabled_at(self.current_index, self.max_page_index)
    }
}

/// Side effects on the rendered message and on incoming interactions.
///
/// Only the dispatcher calls these.
#[async_trait]
pub trait Render: Send + Sync {
    /// Acknowledge an accepted interaction without changing the message yet.
    async fn acknowledge(&self, event: &InteractionEvent) -> anyhow::Result<()>;

    /// Tell the actor their interaction was refused.
    async fn reject(&self, event: &InteractionEvent, rejection: Rejection) -> anyhow::Result<()>;

    /// Ask the actor for a page number.
    async fn prompt_jump(
        &self,
        event: &InteractionEvent,
        max_page_index: Option<usize>,
    ) -> anyhow::Result<()>;

    /// Replace the message body with `page` and redraw the controls.
    async fn update(
        &self,
        message: MessageRef,
        page: &Page,
        controls: &ControlsView<'_>,
    ) -> anyhow::Result<()>;

    /// Redraw only the controls.
    async fn set_controls(
        &self,
        message: MessageRef,
        controls: &ControlsView<'_>,
    ) -> anyhow::Result<()>;

    async fn delete(&self, message: MessageRef) -> anyhow::Result<()>;

    /// Add one reaction per control so reaction input has something to click.
    async fn attach_reactions(
        &self,
        message: MessageRef,
        controls: &ControlMap,
    ) -> anyhow::Result<()>;

    /// Remove the artifact left by an interaction (a user's reaction).
    async fn remove_input(&self, event: &InteractionEvent) -> anyhow::Result<()>;
}

/// Receives failures a session recovered from.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, message: MessageRef, error: &PaginationError);
}

/// Reports recovered failures through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, message: MessageRef, error: &PaginationError) {
        error!(
            channel_id = message.channel_id.get(),
            message_id = message.message_id.get(),
            label = error.as_label(),
            %error,
            "pagination session error"
        );
    }
}
