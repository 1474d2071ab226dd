//! Interaction events delivered to pagination sessions.

use twilight_model::id::{
    Id,
    marker::{ApplicationMarker, ChannelMarker, InteractionMarker, MessageMarker, UserMarker},
};

/// The rendered message a session is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub channel_id: Id<ChannelMarker>,
    pub message_id: Id<MessageMarker>,
}

impl MessageRef {
    pub fn new(channel_id: Id<ChannelMarker>, message_id: Id<MessageMarker>) -> Self {
        Self {
            channel_id,
            message_id,
        }
    }
}

/// What the user did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// A button press carrying the control id (custom-ID suffix).
    Button(String),
    /// A reaction added with this unicode emoji.
    Reaction(String),
    /// A submitted jump-to-page form with a zero-based page index.
    JumpTo(usize),
}

impl Input {
    pub fn is_reaction(&self) -> bool {
        matches!(self, Input::Reaction(_))
    }
}

/// Token needed to answer an interaction. Reactions have none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionReply {
    pub application_id: Id<ApplicationMarker>,
    pub interaction_id: Id<InteractionMarker>,
    pub token: String,
}

/// One user interaction aimed at a paginated message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionEvent {
    pub actor: Id<UserMarker>,
    pub message: MessageRef,
    pub input: Input,
    pub reply: Option<InteractionReply>,
}

/// Why an interaction was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The actor is not allowed to use this session.
    NotAllowed,
    /// A jump request named a page past the last one.
    OutOfRange { max_page_index: usize },
    /// The session ended before the interaction was processed.
    Expired,
}
