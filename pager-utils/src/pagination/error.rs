//! Error types produced by pagination sessions.

use thiserror::Error;

/// Boxed error carried by retrieval and render failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building or driving a pagination session.
///
/// Construction variants are fatal: no session exists afterwards.
/// `Retrieval`, `OutOfRange` and `Render` are recovered by the dispatcher,
/// which leaves the session on its current page.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PaginationError {
    /// A static page source was built from an empty page list.
    #[error("a paginator needs at least one page")]
    EmptyPages,

    /// The configured start index lies past the last page.
    #[error("start index {start} is out of range (max page index {max})")]
    StartIndexOutOfRange { start: usize, max: usize },

    /// Neither buttons nor reactions were enabled.
    #[error("at least one input type must be enabled")]
    NoInputType,

    /// The fetch function failed for a page.
    #[error("failed to load page {index}: {source}")]
    Retrieval {
        index: usize,
        #[source]
        source: BoxError,
    },

    /// A jump request targeted a page that does not exist.
    #[error("page index {requested} is out of range (max page index {max})")]
    OutOfRange { requested: usize, max: usize },

    /// The render collaborator failed to update or delete the message.
    #[error("render failed: {0}")]
    Render(#[source] BoxError),

    /// A dispatcher is already bound to the message.
    #[error("message {message_id} already has a live pagination session")]
    AlreadySubscribed { message_id: u64 },
}

impl PaginationError {
    /// Short stable label (snake_case) for log fields.
    pub fn as_label(&self) -> &'static str {
        match self {
            PaginationError::EmptyPages => "empty_pages",
            PaginationError::StartIndexOutOfRange { .. } => "start_index_out_of_range",
            PaginationError::NoInputType => "no_input_type",
            PaginationError::Retrieval { .. } => "retrieval_failed",
            PaginationError::OutOfRange { .. } => "out_of_range",
            PaginationError::Render(_) => "render_failed",
            PaginationError::AlreadySubscribed { .. } => "already_subscribed",
        }
    }

    /// Whether the error prevents a session from being created.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            PaginationError::EmptyPages
                | PaginationError::StartIndexOutOfRange { .. }
                | PaginationError::NoInputType
        )
    }
}
