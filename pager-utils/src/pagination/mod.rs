//! Interactive pagination sessions.
//!
//! A [`Session`] holds the pages (through a [`PageSource`]) and the policy for
//! one paginated message. A [`Dispatcher`] binds it to the rendered message,
//! receives events through the [`SessionRegistry`] and stops the session on
//! the stop control, inactivity ([`TimeoutSignal`]) or cancellation.

/// Default timeout for pagination sessions.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub mod action;
mod components;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod interaction;
mod page;
pub mod registry;
pub mod render;
pub mod respond;
pub mod session;
pub mod source;
pub mod timeout;
pub mod token;
mod view;

pub use action::{
    ActionOnStop, Control, ControlMap, DeletionOptions, InputType, PaginatorAction, StopBehavior,
    StopReason,
};
pub use components::build_nav_components;
pub use dispatcher::{
    Dispatcher, DispatcherHandle, DispatcherSnapshot, DispatcherState, SessionOutcome,
};
pub use error::PaginationError;
pub use event::{Input, InteractionEvent, InteractionReply, MessageRef, Rejection};
pub use interaction::{PaginationInteraction, interaction_event, reaction_event};
pub use page::{Page, bulleted_description, page_window, parse_one_based_page, total_pages};
pub use registry::SessionRegistry;
pub use render::{ControlState, ControlsView, ErrorReporter, Render, TracingReporter};
pub use respond::{TwilightRenderer, respond_expired, respond_invalid, send_paginated_message};
pub use session::{Session, SessionBuilder, SessionSnapshot, Step};
pub use source::{LazyPageSource, PageSource, StaticPageSource};
pub use timeout::{TimeoutOutcome, TimeoutSignal};
pub use view::{build_description_pages, build_list_pages};
