//! One-shot, optionally resettable inactivity timer.
//!
//! A [`TimeoutSignal`] completes exactly once: either the delay elapses
//! ([`TimeoutOutcome::TimedOut`]) or it is disposed first
//! ([`TimeoutOutcome::Canceled`]). Every state change happens under a single
//! lock, so expiry racing with `try_reset`/`try_dispose` from other tasks
//! resolves to one winner and the losers observe `false`.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{
    sync::{Notify, watch},
    time::{Instant, sleep_until},
};

/// How a timeout signal completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeoutOutcome {
    /// The delay elapsed without being disposed.
    TimedOut,
    /// The signal was disposed before the delay elapsed.
    Canceled,
}

#[derive(Clone, Copy, Debug)]
enum TimerState {
    Armed { deadline: Instant },
    Fired,
    Disposed,
}

struct Shared {
    delay: Duration,
    resettable: bool,
    state: Mutex<TimerState>,
    rearmed: Notify,
    outcome: watch::Sender<Option<TimeoutOutcome>>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fire if the current deadline has passed. Returns `true` once terminal.
    fn expire_if_due(&self) -> bool {
        let mut state = self.state();
        match *state {
            TimerState::Armed { deadline } if deadline <= Instant::now() => {
                *state = TimerState::Fired;
                self.outcome.send_replace(Some(TimeoutOutcome::TimedOut));
                true
            }
            TimerState::Armed { .. } => false,
            TimerState::Fired | TimerState::Disposed => true,
        }
    }
}

/// Delayed completion used to detect inactivity on a pagination session.
///
/// Cloning yields another handle to the same timer.
#[derive(Clone)]
pub struct TimeoutSignal {
    shared: Arc<Shared>,
}

impl TimeoutSignal {
    /// Arm a new signal on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn start(delay: Duration, resettable: bool) -> Self {
        let (outcome, _) = watch::channel(None);
        let shared = Arc::new(Shared {
            delay,
            resettable,
            state: Mutex::new(TimerState::Armed {
                deadline: Instant::now() + delay,
            }),
            rearmed: Notify::new(),
            outcome,
        });

        tokio::spawn(run_timer(Arc::clone(&shared)));

        Self { shared }
    }

    /// Wait until the signal completes and report how.
    ///
    /// Returns immediately when the signal is already terminal.
    pub async fn wait(&self) -> TimeoutOutcome {
        let mut outcome = self.shared.outcome.subscribe();
        match outcome.wait_for(Option::is_some).await {
            Ok(value) => (*value).unwrap_or(TimeoutOutcome::Canceled),
            Err(_) => TimeoutOutcome::Canceled,
        }
    }

    /// Re-arm the delay from now.
    ///
    /// Returns `false` when the signal is not resettable or already terminal.
    pub fn try_reset(&self) -> bool {
        if !self.shared.resettable {
            return false;
        }

        let mut state = self.shared.state();
        match *state {
            TimerState::Armed { .. } => {
                *state = TimerState::Armed {
                    deadline: Instant::now() + self.shared.delay,
                };
                self.shared.rearmed.notify_one();
                true
            }
            TimerState::Fired | TimerState::Disposed => false,
        }
    }

    /// Cancel the signal and stop its timer.
    ///
    /// Returns `false` when the signal already fired or was disposed.
    pub fn try_dispose(&self) -> bool {
        let mut state = self.shared.state();
        match *state {
            TimerState::Armed { .. } => {
                *state = TimerState::Disposed;
                self.shared
                    .outcome
                    .send_replace(Some(TimeoutOutcome::Canceled));
                self.shared.rearmed.notify_one();
                true
            }
            TimerState::Fired | TimerState::Disposed => false,
        }
    }

    /// Whether the signal already fired or was disposed.
    pub fn is_terminal(&self) -> bool {
        !matches!(*self.shared.state(), TimerState::Armed { .. })
    }

    /// Outcome, once terminal.
    pub fn outcome(&self) -> Option<TimeoutOutcome> {
        *self.shared.outcome.borrow()
    }

    pub fn delay(&self) -> Duration {
        self.shared.delay
    }

    pub fn is_resettable(&self) -> bool {
        self.shared.resettable
    }
}

async fn run_timer(shared: Arc<Shared>) {
    loop {
        let deadline = match *shared.state() {
            TimerState::Armed { deadline } => deadline,
            TimerState::Fired | TimerState::Disposed => return,
        };

        tokio::select! {
            () = sleep_until(deadline) => {}
            () = shared.rearmed.notified() => {}
        }

        if shared.expire_if_due() {
            return;
        }
    }
}
