//! Per-session event loop binding a [`Session`] to a rendered message.
//!
//! ```text
//! registry ──► mpsc queue ──► Dispatcher::run()
//!
//! loop {
//!   select (biased) {
//!     cancel token       ─► Stopped(Cancel)
//!     timeout signal     ─► Stopped(Timeout) / Stopped(Cancel) if disposed
//!     next event ─► handle()
//!                     ├─ other message / input disabled ─► ignore
//!                     ├─ actor not allowed               ─► reject
//!                     ├─ Stop                            ─► Stopped(UserStop)
//!                     ├─ Jump                            ─► prompt for a page
//!                     └─ navigation ─► fetch (cancellable) ─► render ─► commit ─► reset timeout
//!   }
//! }
//! teardown: dispose timer, unsubscribe, expire queued events, run stop behavior
//! ```
//!
//! Events for one session are handled strictly one at a time and in queue
//! order. A failed fetch or render leaves the index where it was. Only the
//! page fetch is abandoned on cancellation; once a render is issued it is
//! committed before the loop looks at the cancel token again.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc::UnboundedReceiver, watch},
    task::{JoinError, JoinHandle},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{
    action::{ActionOnStop, StopReason},
    error::PaginationError,
    event::{Input, InteractionEvent, MessageRef, Rejection},
    page::Page,
    registry::SessionRegistry,
    render::{ControlState, ControlsView, ErrorReporter, Render, TracingReporter},
    session::{Session, Step},
    timeout::{TimeoutOutcome, TimeoutSignal},
};

/// Lifecycle state of a dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatcherState {
    Active,
    Stopped(StopReason),
}

/// Read-only view published after every processed event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatcherSnapshot {
    pub state: DispatcherState,
    pub current_index: usize,
    pub max_page_index: Option<usize>,
}

/// How a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOutcome {
    pub reason: StopReason,
    pub final_index: usize,
}

/// Upper bound on fetching the current page while tearing down.
const TEARDOWN_FETCH_LIMIT: Duration = Duration::from_secs(2);

enum Flow {
    Continue,
    Stop,
    Cancel,
}

/// Drives one session until it stops.
pub struct Dispatcher {
    session: Session,
    message: MessageRef,
    renderer: Arc<dyn Render>,
    reporter: Arc<dyn ErrorReporter>,
    registry: SessionRegistry,
    shutdown: CancellationToken,
}

impl Dispatcher {
    pub fn new(
        session: Session,
        message: MessageRef,
        renderer: Arc<dyn Render>,
        registry: SessionRegistry,
    ) -> Self {
        Self {
            session,
            message,
            renderer,
            reporter: Arc::new(TracingReporter),
            registry,
            shutdown: CancellationToken::new(),
        }
    }

    /// Where recovered failures are reported. Defaults to [`TracingReporter`].
    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Stop the session with [`StopReason::Cancel`] when `token` is cancelled.
    pub fn shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Subscribe to the message and spawn the event loop.
    ///
    /// Fails when another session already owns the message.
    pub async fn start(self) -> Result<DispatcherHandle, PaginationError> {
        let events = self.registry.subscribe(self.message.message_id).await?;
        Ok(self.spawn(events))
    }

    /// Start a session for a message that was just sent with active controls.
    ///
    /// If the session cannot start, the controls are disabled so the message
    /// does not look interactive.
    pub async fn start_or_disable(self) -> Result<DispatcherHandle, PaginationError> {
        match self.registry.subscribe(self.message.message_id).await {
            Ok(events) => Ok(self.spawn(events)),
            Err(err) => {
                warn!(
                    message_id = self.message.message_id.get(),
                    error = %err,
                    "pagination session could not start; disabling controls"
                );
                let view = self.view(self.session.current_index(), ControlState::Disabled);
                let disabled = self.renderer.set_controls(self.message, &view).await;
                self.check(disabled);
                Err(err)
            }
        }
    }

    fn spawn(self, events: UnboundedReceiver<InteractionEvent>) -> DispatcherHandle {
        let cancel = self.shutdown.child_token();
        let (snapshots, snapshot) = watch::channel(self.snapshot(DispatcherState::Active));
        let message = self.message;

        let task = tokio::spawn(self.run(events, cancel.clone(), snapshots));

        DispatcherHandle {
            message,
            cancel,
            snapshot,
            task,
        }
    }

    async fn run(
        mut self,
        mut events: UnboundedReceiver<InteractionEvent>,
        cancel: CancellationToken,
        snapshots: watch::Sender<DispatcherSnapshot>,
    ) -> SessionOutcome {
        let timeout = TimeoutSignal::start(self.session.timeout(), self.session.can_reset_timeout());
        info!(
            message_id = self.message.message_id.get(),
            index = self.session.current_index(),
            timeout_ms = self.session.timeout().as_millis() as u64,
            "pagination session started"
        );

        if self.session.input_type().reactions {
            let attached = self
                .renderer
                .attach_reactions(self.message, self.session.controls())
                .await;
            self.check(attached);
        }

        let reason = loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break StopReason::Cancel,
                outcome = timeout.wait() => match outcome {
                    TimeoutOutcome::TimedOut => break StopReason::Timeout,
                    TimeoutOutcome::Canceled => break StopReason::Cancel,
                },
                event = events.recv() => {
                    let Some(event) = event else {
                        break StopReason::Cancel;
                    };

                    match self.handle(event, &timeout, &cancel).await {
                        Flow::Cancel => break StopReason::Cancel,
                        Flow::Stop => break StopReason::UserStop,
                        Flow::Continue => {
                            snapshots.send_replace(self.snapshot(DispatcherState::Active));
                        }
                    }
                }
            }
        };

        let outcome = self.teardown(reason, &timeout, &mut events).await;
        snapshots.send_replace(self.snapshot(DispatcherState::Stopped(reason)));
        outcome
    }

    async fn handle(
        &mut self,
        event: InteractionEvent,
        timeout: &TimeoutSignal,
        cancel: &CancellationToken,
    ) -> Flow {
        if event.message != self.message {
            debug!(
                message_id = self.message.message_id.get(),
                target = event.message.message_id.get(),
                "ignoring interaction for another message"
            );
            return Flow::Continue;
        }

        let input_type = self.session.input_type();
        let enabled = match event.input {
            Input::Button(_) | Input::JumpTo(_) => input_type.buttons,
            Input::Reaction(_) => input_type.reactions,
        };
        if !enabled {
            return Flow::Continue;
        }

        if !self.session.is_allowed(event.actor) {
            debug!(
                message_id = self.message.message_id.get(),
                actor = event.actor.get(),
                "rejecting interaction from user outside the session"
            );
            let rejected = self.renderer.reject(&event, Rejection::NotAllowed).await;
            self.check(rejected);
            self.remove_input(&event, self.session.deletion().invalid).await;
            return Flow::Continue;
        }

        let action = match &event.input {
            Input::Button(control_id) => self.session.resolve_action(control_id),
            Input::Reaction(emoji) => self.session.resolve_reaction(emoji),
            Input::JumpTo(index) => return self.jump(&event, *index, timeout, cancel).await,
        };

        let Some(action) = action else {
            let acknowledged = self.renderer.acknowledge(&event).await;
            self.check(acknowledged);
            self.remove_input(&event, self.session.deletion().invalid).await;
            return Flow::Continue;
        };

        let flow = match self.session.plan(action) {
            Step::Stop => {
                let acknowledged = self.renderer.acknowledge(&event).await;
                self.check(acknowledged);
                Flow::Stop
            }
            Step::PromptJump => {
                let prompted = self
                    .renderer
                    .prompt_jump(&event, self.session.max_page_index())
                    .await;
                if self.check(prompted) {
                    reset(timeout, &self.session);
                }
                Flow::Continue
            }
            Step::Stay => {
                let acknowledged = self.renderer.acknowledge(&event).await;
                self.check(acknowledged);
                reset(timeout, &self.session);
                Flow::Continue
            }
            Step::Goto(index) => {
                let acknowledged = self.renderer.acknowledge(&event).await;
                self.check(acknowledged);
                self.navigate(index, timeout, cancel).await
            }
        };

        self.remove_input(&event, self.session.deletion().valid).await;
        flow
    }

    async fn jump(
        &mut self,
        event: &InteractionEvent,
        index: usize,
        timeout: &TimeoutSignal,
        cancel: &CancellationToken,
    ) -> Flow {
        match self.session.plan_jump(index) {
            Ok(index) => {
                let acknowledged = self.renderer.acknowledge(event).await;
                self.check(acknowledged);
                return self.navigate(index, timeout, cancel).await;
            }
            Err(PaginationError::OutOfRange { max, .. }) => {
                let rejected = self
                    .renderer
                    .reject(event, Rejection::OutOfRange { max_page_index: max })
                    .await;
                self.check(rejected);
            }
            Err(err) => self.reporter.report(self.message, &err),
        }
        Flow::Continue
    }

    async fn navigate(
        &mut self,
        index: usize,
        timeout: &TimeoutSignal,
        cancel: &CancellationToken,
    ) -> Flow {
        if index == self.session.current_index() {
            reset(timeout, &self.session);
            return Flow::Continue;
        }

        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => return Flow::Cancel,
            page = self.session.page_at(index) => page,
        };
        let page = match fetched {
            Ok(page) => page,
            Err(err) => {
                warn!(
                    message_id = self.message.message_id.get(),
                    index,
                    "page retrieval failed; staying on current page"
                );
                self.reporter.report(self.message, &err);
                return Flow::Continue;
            }
        };

        let view = self.view(index, ControlState::Active);
        if let Err(err) = self.renderer.update(self.message, &page, &view).await {
            self.reporter
                .report(self.message, &PaginationError::Render(err.into()));
            return Flow::Continue;
        }

        self.session.commit(index);
        reset(timeout, &self.session);
        debug!(
            message_id = self.message.message_id.get(),
            index, "pagination session moved"
        );
        Flow::Continue
    }

    async fn teardown(
        &mut self,
        reason: StopReason,
        timeout: &TimeoutSignal,
        events: &mut UnboundedReceiver<InteractionEvent>,
    ) -> SessionOutcome {
        timeout.try_dispose();
        self.registry.unsubscribe(self.message.message_id).await;

        events.close();
        while let Ok(event) = events.try_recv() {
            let rejected = self.renderer.reject(&event, Rejection::Expired).await;
            self.check(rejected);
        }

        let behavior = self.session.stop_behavior(reason).clone();
        let finished = match behavior.action {
            ActionOnStop::None => Ok(()),
            ActionOnStop::DeleteMessage => self.renderer.delete(self.message).await,
            ActionOnStop::DisableControls => {
                let view = self.view(self.session.current_index(), ControlState::Disabled);
                self.renderer.set_controls(self.message, &view).await
            }
            ActionOnStop::ReplaceWithPage => {
                let view = self.view(self.session.current_index(), ControlState::Hidden);
                let page = match behavior.page {
                    Some(page) => Ok(page),
                    None => self.current_page_within(TEARDOWN_FETCH_LIMIT).await,
                };
                match page {
                    Ok(page) => self.renderer.update(self.message, &page, &view).await,
                    Err(err) => {
                        self.reporter.report(self.message, &err);
                        self.renderer.set_controls(self.message, &view).await
                    }
                }
            }
        };
        self.check(finished);

        info!(
            message_id = self.message.message_id.get(),
            reason = reason.as_label(),
            index = self.session.current_index(),
            "pagination session stopped"
        );

        SessionOutcome {
            reason,
            final_index: self.session.current_index(),
        }
    }

    /// The current page, giving up after `limit` so teardown cannot stall on
    /// a slow source.
    async fn current_page_within(&self, limit: Duration) -> Result<Page, PaginationError> {
        match tokio::time::timeout(limit, self.session.current_page()).await {
            Ok(page) => page,
            Err(elapsed) => Err(PaginationError::Retrieval {
                index: self.session.current_index(),
                source: elapsed.into(),
            }),
        }
    }

    async fn remove_input(&self, event: &InteractionEvent, enabled: bool) {
        if enabled && event.input.is_reaction() {
            let removed = self.renderer.remove_input(event).await;
            self.check(removed);
        }
    }

    /// Report a collaborator failure. Returns whether the call succeeded.
    fn check(&self, result: anyhow::Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                self.reporter
                    .report(self.message, &PaginationError::Render(err.into()));
                false
            }
        }
    }

    fn view(&self, index: usize, state: ControlState) -> ControlsView<'_> {
        ControlsView {
            controls: self.session.controls(),
            input_type: self.session.input_type(),
            current_index: index,
            max_page_index: self.session.max_page_index(),
            state,
        }
    }

    fn snapshot(&self, state: DispatcherState) -> DispatcherSnapshot {
        DispatcherSnapshot {
            state,
            current_index: self.session.current_index(),
            max_page_index: self.session.max_page_index(),
        }
    }
}

fn reset(timeout: &TimeoutSignal, session: &Session) {
    if session.can_reset_timeout() {
        timeout.try_reset();
    }
}

/// Handle to a running dispatcher.
pub struct DispatcherHandle {
    message: MessageRef,
    cancel: CancellationToken,
    snapshot: watch::Receiver<DispatcherSnapshot>,
    task: JoinHandle<SessionOutcome>,
}

impl DispatcherHandle {
    pub fn message(&self) -> MessageRef {
        self.message
    }

    /// Stop the session with [`StopReason::Cancel`]. Safe to call at any time.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Latest published state.
    pub fn snapshot(&self) -> DispatcherSnapshot {
        *self.snapshot.borrow()
    }

    /// Receiver that observes every published state change.
    pub fn subscribe(&self) -> watch::Receiver<DispatcherSnapshot> {
        self.snapshot.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the session to stop.
    pub async fn wait(self) -> Result<SessionOutcome, JoinError> {
        self.task.await
    }
}
