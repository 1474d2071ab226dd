use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use twilight_model::id::Id;

use pager_utils::pagination::{
    ActionOnStop, ControlMap, ControlState, ControlsView, DeletionOptions, Dispatcher, DispatcherHandle,
    DispatcherState, ErrorReporter, Input, InputType, InteractionEvent, LazyPageSource,
    MessageRef, Page, PaginationError, Rejection, Render, Session, SessionRegistry,
    StaticPageSource, StopBehavior, StopReason,
};

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Acknowledge,
    Reject(Rejection),
    PromptJump(Option<usize>),
    Update {
        index: usize,
        page: Page,
        state: ControlState,
    },
    SetControls(ControlState),
    Delete,
    /// Whether the message was already routed to its session.
    AttachReactions { subscribed: bool },
    RemoveInput(String),
}

#[derive(Default)]
struct RecordingRenderer {
    calls: Mutex<Vec<Call>>,
    registry: SessionRegistry,
    fail_updates: AtomicBool,
    fail_reactions: AtomicBool,
    slow_updates: AtomicBool,
}

impl RecordingRenderer {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn updates(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Update {
                    index,
                    state: ControlState::Active,
                    ..
                } => Some(index),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Render for RecordingRenderer {
    async fn acknowledge(&self, _event: &InteractionEvent) -> anyhow::Result<()> {
        self.record(Call::Acknowledge);
        Ok(())
    }

    async fn reject(&self, _event: &InteractionEvent, rejection: Rejection) -> anyhow::Result<()> {
        self.record(Call::Reject(rejection));
        Ok(())
    }

    async fn prompt_jump(
        &self,
        _event: &InteractionEvent,
        max_page_index: Option<usize>,
    ) -> anyhow::Result<()> {
        self.record(Call::PromptJump(max_page_index));
        Ok(())
    }

    async fn update(
        &self,
        _message: MessageRef,
        page: &Page,
        controls: &ControlsView<'_>,
    ) -> anyhow::Result<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            anyhow::bail!("message edit rejected");
        }
        self.record(Call::Update {
            index: controls.current_index,
            page: page.clone(),
            state: controls.state,
        });
        if self.slow_updates.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(10)).await;
        }
        Ok(())
    }

    async fn set_controls(
        &self,
        _message: MessageRef,
        controls: &ControlsView<'_>,
    ) -> anyhow::Result<()> {
        self.record(Call::SetControls(controls.state));
        Ok(())
    }

    async fn delete(&self, _message: MessageRef) -> anyhow::Result<()> {
        self.record(Call::Delete);
        Ok(())
    }

    async fn attach_reactions(
        &self,
        message: MessageRef,
        _controls: &ControlMap,
    ) -> anyhow::Result<()> {
        let subscribed = self.registry.contains(message.message_id).await;
        self.record(Call::AttachReactions { subscribed });
        if self.fail_reactions.load(Ordering::SeqCst) {
            anyhow::bail!("missing add reactions permission");
        }
        Ok(())
    }

    async fn remove_input(&self, event: &InteractionEvent) -> anyhow::Result<()> {
        if let Input::Reaction(emoji) = &event.input {
            self.record(Call::RemoveInput(emoji.clone()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct CollectingReporter {
    labels: Mutex<Vec<&'static str>>,
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, _message: MessageRef, error: &PaginationError) {
        self.labels.lock().unwrap().push(error.as_label());
    }
}

fn message() -> MessageRef {
    MessageRef::new(Id::new(1), Id::new(100))
}

fn pages(count: usize) -> StaticPageSource {
    StaticPageSource::new((0..count).map(|n| Page::text(format!("page {n}"))).collect()).unwrap()
}

fn event(actor: u64, input: Input) -> InteractionEvent {
    InteractionEvent {
        actor: Id::new(actor),
        message: message(),
        input,
        reply: None,
    }
}

fn button(actor: u64, control: &str) -> InteractionEvent {
    event(actor, Input::Button(control.to_owned()))
}

struct Harness {
    registry: SessionRegistry,
    renderer: Arc<RecordingRenderer>,
    reporter: Arc<CollectingReporter>,
}

impl Harness {
    fn new() -> Self {
        let registry = SessionRegistry::new();
        Self {
            renderer: Arc::new(RecordingRenderer {
                registry: registry.clone(),
                ..RecordingRenderer::default()
            }),
            registry,
            reporter: Arc::new(CollectingReporter::default()),
        }
    }

    async fn start(&self, session: Session) -> DispatcherHandle {
        self.start_with_shutdown(session, CancellationToken::new())
            .await
    }

    async fn start_with_shutdown(
        &self,
        session: Session,
        shutdown: CancellationToken,
    ) -> DispatcherHandle {
        Dispatcher::new(
            session,
            message(),
            self.renderer.clone(),
            self.registry.clone(),
        )
        .reporter(self.reporter.clone())
        .shutdown(shutdown)
        .start()
        .await
        .unwrap()
    }

    async fn send(&self, event: InteractionEvent) {
        self.registry.deliver(event).await.unwrap();
    }

    fn errors(&self) -> Vec<&'static str> {
        self.reporter.labels.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn next_walks_to_the_last_page_and_stays_there() {
    let harness = Harness::new();
    let handle = harness
        .start(Session::builder(pages(5)).build().unwrap())
        .await;

    for _ in 0..5 {
        harness.send(button(1, "next")).await;
    }
    harness.send(button(1, "stop")).await;

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.reason, StopReason::UserStop);
    assert_eq!(outcome.final_index, 4);
    assert_eq!(harness.renderer.updates(), vec![1, 2, 3, 4]);
    assert_eq!(
        harness.renderer.calls().last(),
        Some(&Call::SetControls(ControlState::Disabled))
    );
    assert!(harness.registry.is_empty().await);
}

#[tokio::test]
async fn first_last_and_previous_navigate() {
    let harness = Harness::new();
    let handle = harness
        .start(Session::builder(pages(5)).start_index(2).build().unwrap())
        .await;

    harness.send(button(1, "last")).await;
    harness.send(button(1, "prev")).await;
    harness.send(button(1, "first")).await;
    harness.send(button(1, "prev")).await;
    harness.send(button(1, "stop")).await;

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.final_index, 0);
    assert_eq!(harness.renderer.updates(), vec![4, 3, 0]);
}

#[tokio::test(start_paused = true)]
async fn interactions_from_other_users_are_ignored() {
    let harness = Harness::new();
    let started = Instant::now();
    let handle = harness
        .start(
            Session::builder(pages(5))
                .user(Id::new(42))
                .timeout(Duration::from_millis(100))
                .build()
                .unwrap(),
        )
        .await;

    tokio::time::sleep(Duration::from_millis(80)).await;
    harness.send(button(7, "next")).await;

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.reason, StopReason::Timeout);
    assert_eq!(outcome.final_index, 0);
    assert!(started.elapsed() < Duration::from_millis(120), "timeout was not reset");
    assert!(
        harness
            .renderer
            .calls()
            .contains(&Call::Reject(Rejection::NotAllowed))
    );
    assert!(harness.renderer.updates().is_empty());
}

#[tokio::test(start_paused = true)]
async fn accepted_interaction_resets_the_timeout() {
    let harness = Harness::new();
    let started = Instant::now();
    let handle = harness
        .start(
            Session::builder(pages(5))
                .timeout(Duration::from_millis(100))
                .build()
                .unwrap(),
        )
        .await;

    tokio::time::sleep(Duration::from_millis(80)).await;
    harness.send(button(1, "next")).await;

    tokio::time::sleep(Duration::from_millis(70)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.state, DispatcherState::Active);
    assert_eq!(snapshot.current_index, 1);

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.reason, StopReason::Timeout);
    assert!(started.elapsed() >= Duration::from_millis(180));
    assert!(started.elapsed() < Duration::from_millis(260));
}

#[tokio::test(start_paused = true)]
async fn timeout_is_not_reset_when_disabled() {
    let harness = Harness::new();
    let started = Instant::now();
    let handle = harness
        .start(
            Session::builder(pages(5))
                .timeout(Duration::from_millis(100))
                .can_reset_timeout(false)
                .build()
                .unwrap(),
        )
        .await;

    tokio::time::sleep(Duration::from_millis(80)).await;
    harness.send(button(1, "next")).await;

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.reason, StopReason::Timeout);
    assert_eq!(outcome.final_index, 1);
    assert!(started.elapsed() < Duration::from_millis(120));
}

#[tokio::test]
async fn failed_fetch_keeps_the_current_page() {
    let harness = Harness::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let source = {
        let calls = Arc::clone(&calls);
        LazyPageSource::new(move |index| {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    anyhow::bail!("dictionary service unavailable");
                }
                Ok(Page::text(format!("entry {index}")))
            }
        })
        .max_page_index(Some(4))
    };
    let handle = harness
        .start(Session::builder(source).build().unwrap())
        .await;

    harness.send(button(1, "next")).await;
    harness.send(button(1, "next")).await;
    harness.send(button(1, "prev")).await;
    harness.send(button(1, "next")).await;
    harness.send(button(1, "stop")).await;

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.final_index, 1);
    assert_eq!(harness.errors(), vec!["retrieval_failed"]);
    assert_eq!(harness.renderer.updates(), vec![1, 0, 1]);
    // failed index 1, retried index 1, index 0; the revisit of index 1 is cached
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn failed_render_does_not_commit_the_index() {
    let harness = Harness::new();
    harness.renderer.fail_updates.store(true, Ordering::SeqCst);
    let handle = harness
        .start(Session::builder(pages(3)).build().unwrap())
        .await;

    harness.send(button(1, "next")).await;
    harness.send(button(1, "stop")).await;

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.final_index, 0);
    assert_eq!(harness.errors(), vec!["render_failed"]);
}

#[tokio::test]
async fn jump_prompts_then_moves_or_rejects() {
    let harness = Harness::new();
    let handle = harness
        .start(
            Session::builder(pages(5))
                .controls(ControlMap::with_jump())
                .build()
                .unwrap(),
        )
        .await;

    harness.send(button(1, "jump")).await;
    harness.send(event(1, Input::JumpTo(3))).await;
    harness.send(event(1, Input::JumpTo(9))).await;
    harness.send(button(1, "stop")).await;

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.final_index, 3);

    let calls = harness.renderer.calls();
    assert!(calls.contains(&Call::PromptJump(Some(4))));
    assert!(calls.contains(&Call::Reject(Rejection::OutOfRange { max_page_index: 4 })));
    assert_eq!(harness.renderer.updates(), vec![3]);
}

#[tokio::test]
async fn unknown_controls_and_disabled_inputs_are_ignored() {
    let harness = Harness::new();
    let handle = harness
        .start(Session::builder(pages(3)).build().unwrap())
        .await;

    harness.send(button(1, "bogus")).await;
    harness.send(event(1, Input::Reaction("▶️".to_owned()))).await;
    harness.send(button(1, "stop")).await;

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.final_index, 0);
    assert!(harness.renderer.updates().is_empty());
}

#[tokio::test]
async fn reaction_input_is_removed_per_deletion_options() {
    let harness = Harness::new();
    let handle = harness
        .start(
            Session::builder(pages(3))
                .input_type(InputType::REACTIONS)
                .user(Id::new(42))
                .deletion(DeletionOptions {
                    valid: true,
                    invalid: false,
                })
                .build()
                .unwrap(),
        )
        .await;

    harness.send(event(42, Input::Reaction("▶️".to_owned()))).await;
    harness.send(event(7, Input::Reaction("▶️".to_owned()))).await;
    harness.send(event(42, Input::Reaction("🛑".to_owned()))).await;

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.final_index, 1);

    let removed: Vec<Call> = harness
        .renderer
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::RemoveInput(_)))
        .collect();
    assert_eq!(
        removed,
        vec![
            Call::RemoveInput("▶️".to_owned()),
            Call::RemoveInput("🛑".to_owned()),
        ]
    );
}

#[tokio::test]
async fn cancel_runs_the_cancel_behavior_once() {
    let harness = Harness::new();
    let handle = harness
        .start(
            Session::builder(pages(3))
                .action_on_cancel(StopBehavior::new(ActionOnStop::DeleteMessage))
                .build()
                .unwrap(),
        )
        .await;

    handle.cancel();
    handle.cancel();

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.reason, StopReason::Cancel);
    let deletes = harness
        .renderer
        .calls()
        .into_iter()
        .filter(|call| *call == Call::Delete)
        .count();
    assert_eq!(deletes, 1);
    assert!(!harness.registry.contains(message().message_id).await);
}

#[tokio::test(start_paused = true)]
async fn cancel_interrupts_a_slow_fetch() {
    let harness = Harness::new();
    let source = LazyPageSource::new(|index| async move {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Page::text(format!("slow {index}")))
    });
    let handle = harness
        .start(Session::builder(source).build().unwrap())
        .await;

    harness.send(button(1, "next")).await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    let started = Instant::now();
    handle.cancel();
    let outcome = handle.wait().await.unwrap();

    assert_eq!(outcome.reason, StopReason::Cancel);
    assert_eq!(outcome.final_index, 0);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn shutdown_token_stops_every_session() {
    let harness = Harness::new();
    let shutdown = CancellationToken::new();

    let first = harness
        .start_with_shutdown(Session::builder(pages(2)).build().unwrap(), shutdown.clone())
        .await;
    let second = Dispatcher::new(
        Session::builder(pages(2)).build().unwrap(),
        MessageRef::new(Id::new(1), Id::new(200)),
        harness.renderer.clone(),
        harness.registry.clone(),
    )
    .shutdown(shutdown.clone())
    .start()
    .await
    .unwrap();
    assert_eq!(harness.registry.len().await, 2);

    shutdown.cancel();

    assert_eq!(first.wait().await.unwrap().reason, StopReason::Cancel);
    assert_eq!(second.wait().await.unwrap().reason, StopReason::Cancel);
    assert!(harness.registry.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn timeout_replaces_the_message_with_its_page() {
    let harness = Harness::new();
    let handle = harness
        .start(
            Session::builder(pages(3))
                .timeout(Duration::from_millis(50))
                .action_on_timeout(StopBehavior::replace_with(Page::text("timed out")))
                .build()
                .unwrap(),
        )
        .await;

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.reason, StopReason::Timeout);
    assert_eq!(
        harness.renderer.calls(),
        vec![Call::Update {
            index: 0,
            page: Page::text("timed out"),
            state: ControlState::Hidden,
        }]
    );
}

#[tokio::test]
async fn second_dispatcher_for_the_same_message_is_refused() {
    let harness = Harness::new();
    let _first = harness
        .start(Session::builder(pages(2)).build().unwrap())
        .await;

    let second = Dispatcher::new(
        Session::builder(pages(2)).build().unwrap(),
        message(),
        harness.renderer.clone(),
        harness.registry.clone(),
    )
    .start()
    .await;

    assert!(matches!(
        second,
        Err(PaginationError::AlreadySubscribed { message_id: 100 })
    ));
}

#[tokio::test(start_paused = true)]
async fn events_for_another_channel_are_ignored() {
    let harness = Harness::new();
    let started = Instant::now();
    let handle = harness
        .start(
            Session::builder(pages(5))
                .timeout(Duration::from_millis(100))
                .build()
                .unwrap(),
        )
        .await;

    tokio::time::sleep(Duration::from_millis(80)).await;
    let mut elsewhere = button(1, "next");
    elsewhere.message = MessageRef::new(Id::new(2), message().message_id);
    harness.send(elsewhere).await;

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(handle.snapshot().current_index, 0);
    assert_eq!(handle.snapshot().state, DispatcherState::Active);

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.reason, StopReason::Timeout);
    assert!(started.elapsed() < Duration::from_millis(120), "timeout was not reset");
    assert_eq!(
        harness.renderer.calls(),
        vec![Call::SetControls(ControlState::Disabled)]
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_waits_for_an_issued_render_to_commit() {
    let harness = Harness::new();
    harness.renderer.slow_updates.store(true, Ordering::SeqCst);
    let handle = harness
        .start(Session::builder(pages(3)).build().unwrap())
        .await;

    harness.send(button(1, "next")).await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.cancel();

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.reason, StopReason::Cancel);
    assert_eq!(outcome.final_index, 1);
    assert_eq!(harness.renderer.updates(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn teardown_gives_up_on_a_slow_current_page() {
    let harness = Harness::new();
    let source = LazyPageSource::new(|index| async move {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Page::text(format!("slow {index}")))
    })
    .cache_loaded_pages(false);
    let handle = harness
        .start(
            Session::builder(source)
                .action_on_cancel(StopBehavior::new(ActionOnStop::ReplaceWithPage))
                .build()
                .unwrap(),
        )
        .await;

    let started = Instant::now();
    handle.cancel();
    let outcome = handle.wait().await.unwrap();

    assert_eq!(outcome.reason, StopReason::Cancel);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(harness.errors(), vec!["retrieval_failed"]);
    assert_eq!(
        harness.renderer.calls(),
        vec![Call::SetControls(ControlState::Hidden)]
    );
}

#[tokio::test]
async fn reactions_are_attached_after_the_session_is_routable() {
    let harness = Harness::new();
    harness.renderer.fail_reactions.store(true, Ordering::SeqCst);
    let handle = harness
        .start(
            Session::builder(pages(3))
                .input_type(InputType::ALL)
                .build()
                .unwrap(),
        )
        .await;

    harness.send(button(1, "next")).await;
    harness.send(button(1, "stop")).await;

    let outcome = handle.wait().await.unwrap();
    assert_eq!(outcome.final_index, 1);
    assert_eq!(
        harness.renderer.calls().first(),
        Some(&Call::AttachReactions { subscribed: true })
    );
    assert_eq!(harness.errors(), vec!["render_failed"]);
}

#[tokio::test]
async fn failed_start_disables_the_sent_controls() {
    let harness = Harness::new();
    let _first = harness
        .start(Session::builder(pages(2)).build().unwrap())
        .await;

    let second = Dispatcher::new(
        Session::builder(pages(2)).build().unwrap(),
        message(),
        harness.renderer.clone(),
        harness.registry.clone(),
    )
    .start_or_disable()
    .await;

    assert!(matches!(
        second,
        Err(PaginationError::AlreadySubscribed { message_id: 100 })
    ));
    assert_eq!(
        harness.renderer.calls(),
        vec![Call::SetControls(ControlState::Disabled)]
    );
}
