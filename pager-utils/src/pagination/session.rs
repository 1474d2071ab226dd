//! Navigation state and policy for one paginated message.

use std::{collections::HashSet, time::Duration};

use twilight_model::id::{Id, marker::UserMarker};

use super::{
    DEFAULT_TIMEOUT_SECS,
    action::{
        ActionOnStop, ControlMap, DeletionOptions, InputType, PaginatorAction, StopBehavior,
        StopReason,
    },
    error::PaginationError,
    page::Page,
    source::PageSource,
};

/// Result of planning an action against the current page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Show the page at this index.
    Goto(usize),
    /// Nothing to do (e.g. `Last` on an unbounded source).
    Stay,
    /// End the session.
    Stop,
    /// Ask the user which page to jump to.
    PromptJump,
}

/// Read-only view of a session's navigation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub current_index: usize,
    pub max_page_index: Option<usize>,
}

/// A paginator: the page source, the current index and the interaction policy.
///
/// `0 <= current_index <= max_page_index` holds from construction on.
#[derive(Debug)]
pub struct Session {
    source: PageSource,
    current_index: usize,
    users: HashSet<Id<UserMarker>>,
    controls: ControlMap,
    input_type: InputType,
    deletion: DeletionOptions,
    on_stop: StopBehavior,
    on_timeout: StopBehavior,
    on_cancel: StopBehavior,
    can_reset_timeout: bool,
    timeout: Duration,
}

impl Session {
    pub fn builder(source: impl Into<PageSource>) -> SessionBuilder {
        SessionBuilder::new(source.into())
    }

    /// Look up the action bound to a button id.
    pub fn resolve_action(&self, control_id: &str) -> Option<PaginatorAction> {
        self.controls.by_id(control_id)
    }

    /// Look up the action bound to a reaction emoji.
    pub fn resolve_reaction(&self, emoji: &str) -> Option<PaginatorAction> {
        self.controls.by_emoji(emoji)
    }

    /// Work out where an action leads without changing state.
    pub fn plan(&self, action: PaginatorAction) -> Step {
        let max = self.max_page_index();
        match action {
            PaginatorAction::First => Step::Goto(0),
            PaginatorAction::Previous => Step::Goto(self.current_index.saturating_sub(1)),
            PaginatorAction::Next => {
                let next = self.current_index.saturating_add(1);
                Step::Goto(max.map_or(next, |max| next.min(max)))
            }
            PaginatorAction::Last => max.map_or(Step::Stay, Step::Goto),
            PaginatorAction::Stop => Step::Stop,
            PaginatorAction::Jump => Step::PromptJump,
        }
    }

    /// Validate a jump target. Only the request fails, never the session.
    pub fn plan_jump(&self, index: usize) -> Result<usize, PaginationError> {
        match self.max_page_index() {
            Some(max) if index > max => Err(PaginationError::OutOfRange {
                requested: index,
                max,
            }),
            _ => Ok(index),
        }
    }

    /// Plan an action and move to its target page immediately.
    pub fn apply_action(&mut self, action: PaginatorAction) -> Step {
        let step = self.plan(action);
        if let Step::Goto(index) = step {
            self.current_index = index;
        }
        step
    }

    /// Move to `index` once its page has been shown. Out-of-range indices are ignored.
    pub fn commit(&mut self, index: usize) -> bool {
        if self.plan_jump(index).is_err() {
            return false;
        }
        self.current_index = index;
        true
    }

    /// Fetch the page at `index` without moving.
    pub async fn page_at(&self, index: usize) -> Result<Page, PaginationError> {
        let index = self.plan_jump(index)?;
        self.source.get_page(index).await
    }

    /// Fetch the page at the current index.
    pub async fn current_page(&self) -> Result<Page, PaginationError> {
        self.source.get_page(self.current_index).await
    }

    /// Whether `user` may interact. An empty allow-list admits everyone.
    pub fn is_allowed(&self, user: Id<UserMarker>) -> bool {
        self.users.is_empty() || self.users.contains(&user)
    }

    /// Behavior configured for a terminal condition.
    pub fn stop_behavior(&self, reason: StopReason) -> &StopBehavior {
        match reason {
            StopReason::UserStop => &self.on_stop,
            StopReason::Timeout => &self.on_timeout,
            StopReason::Cancel => &self.on_cancel,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_index: self.current_index,
            max_page_index: self.max_page_index(),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn max_page_index(&self) -> Option<usize> {
        self.source.max_page_index()
    }

    pub fn source(&self) -> &PageSource {
        &self.source
    }

    pub fn users(&self) -> &HashSet<Id<UserMarker>> {
        &self.users
    }

    pub fn controls(&self) -> &ControlMap {
        &self.controls
    }

    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    pub fn deletion(&self) -> DeletionOptions {
        self.deletion
    }

    pub fn can_reset_timeout(&self) -> bool {
        self.can_reset_timeout
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder for [`Session`].
///
/// Defaults: anyone may interact, standard controls, buttons, first page,
/// nothing deleted, controls disabled on timeout, timeout reset on every
/// accepted interaction.
pub struct SessionBuilder {
    source: PageSource,
    start_index: usize,
    users: HashSet<Id<UserMarker>>,
    controls: ControlMap,
    input_type: InputType,
    deletion: DeletionOptions,
    on_stop: StopBehavior,
    on_timeout: StopBehavior,
    on_cancel: StopBehavior,
    can_reset_timeout: bool,
    timeout: Duration,
}

impl SessionBuilder {
    fn new(source: PageSource) -> Self {
        Self {
            source,
            start_index: 0,
            users: HashSet::new(),
            controls: ControlMap::default(),
            input_type: InputType::default(),
            deletion: DeletionOptions::default(),
            on_stop: StopBehavior::new(ActionOnStop::DisableControls),
            on_timeout: StopBehavior::new(ActionOnStop::DisableControls),
            on_cancel: StopBehavior::new(ActionOnStop::None),
            can_reset_timeout: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn start_index(mut self, index: usize) -> Self {
        self.start_index = index;
        self
    }

    /// Restrict interaction to `users`. An empty list admits everyone.
    pub fn users(mut self, users: impl IntoIterator<Item = Id<UserMarker>>) -> Self {
        self.users = users.into_iter().collect();
        self
    }

    pub fn user(mut self, user: Id<UserMarker>) -> Self {
        self.users.insert(user);
        self
    }

    pub fn controls(mut self, controls: ControlMap) -> Self {
        self.controls = controls;
        self
    }

    pub fn input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    pub fn deletion(mut self, deletion: DeletionOptions) -> Self {
        self.deletion = deletion;
        self
    }

    pub fn action_on_stop(mut self, behavior: StopBehavior) -> Self {
        self.on_stop = behavior;
        self
    }

    pub fn action_on_timeout(mut self, behavior: StopBehavior) -> Self {
        self.on_timeout = behavior;
        self
    }

    pub fn action_on_cancel(mut self, behavior: StopBehavior) -> Self {
        self.on_cancel = behavior;
        self
    }

    pub fn can_reset_timeout(mut self, enabled: bool) -> Self {
        self.can_reset_timeout = enabled;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the configuration and build the session.
    pub fn build(self) -> Result<Session, PaginationError> {
        if self.input_type.is_empty() {
            return Err(PaginationError::NoInputType);
        }

        if let Some(max) = self.source.max_page_index()
            && self.start_index > max
        {
            return Err(PaginationError::StartIndexOutOfRange {
                start: self.start_index,
                max,
            });
        }

        Ok(Session {
            source: self.source,
            current_index: self.start_index,
            users: self.users,
            controls: self.controls,
            input_type: self.input_type,
            deletion: self.deletion,
            on_stop: self.on_stop,
            on_timeout: self.on_timeout,
            on_cancel: self.on_cancel,
            can_reset_timeout: self.can_reset_timeout,
            timeout: self.timeout,
        })
    }
}
