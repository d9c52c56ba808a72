//! Session change fan-out and the per-connection gate watcher.
//!
//! The hub broadcasts sign-out events. A [`SessionWatcher`]
//! re-evaluates one visitor's gate on a fixed poll interval and whenever the
//! hub reports a change to that visitor's session. The background task is
//! aborted when the watcher is dropped.
//!
//! The watcher keeps the cookies it was opened with, so it can demote a
//! session or expire a skip countdown but never notices a later sign-in.
//! A sign-in sets a new `bp_session` cookie and the client reopens the
//! stream with it.

use std::time::Duration;

use async_stream::stream;
use futures::Stream;
use time::OffsetDateTime;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;
use uuid::Uuid;

use crate::application::auth::SessionService;
use crate::application::visits::{GateInputs, VisitTracker};
use crate::domain::visit::{GateState, VisitGate};

const HUB_CAPACITY: usize = 256;
const UPDATE_BUFFER: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedOut { token_hash: String },
}

impl SessionEvent {
    pub fn token_hash(&self) -> &str {
        match self {
            SessionEvent::SignedOut { token_hash } => token_hash,
        }
    }
}

#[derive(Clone)]
pub struct SessionHub {
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    pub fn new() -> Self {
        let (sender, _rx) = broadcast::channel(HUB_CAPACITY);
        Self { sender }
    }

    /// Best-effort publish; having no subscribers is not an error.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

pub struct SessionWatcher {
    updates: mpsc::Receiver<GateState>,
    task: JoinHandle<()>,
}

impl SessionWatcher {
    /// Start watching the gate of `landing_page_id` for one visitor.
    ///
    /// The first emitted state is the optimistic one; the initial evaluation
    /// never records a visit because the page load already did.
    pub fn spawn(
        tracker: VisitTracker,
        landing_page_id: Uuid,
        inputs: GateInputs,
        poll: Duration,
    ) -> Self {
        let (tx, updates) = mpsc::channel(UPDATE_BUFFER);
        let mut events = tracker.sessions().hub().subscribe();
        let token_hash = inputs
            .cached
            .as_ref()
            .map(|cached| SessionService::hash_token(&cached.token));

        let task = tokio::spawn(async move {
            let mut gate = VisitGate::new();
            let now = OffsetDateTime::now_utc();

            gate.observe_cached(inputs.cached.as_ref(), now);
            if tx.send(gate.state()).await.is_err() {
                return;
            }
            if let Some(transition) = tracker.check_remote(&mut gate, &inputs, now).await
                && transition.changed
                && tx.send(transition.state).await.is_err()
            {
                return;
            }

            let mut ticker = interval(poll);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    event = events.recv() => match event {
                        Ok(event) => {
                            if token_hash.as_deref() != Some(event.token_hash()) {
                                continue;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            debug!(
                                target = "brandpage::application::session_watch",
                                skipped,
                                "session watcher lagged behind hub"
                            );
                        }
                        Err(broadcast::error::RecvError::Closed) => return,
                    },
                }

                let now = OffsetDateTime::now_utc();
                if let Some(transition) = tracker.check_remote(&mut gate, &inputs, now).await {
                    tracker
                        .apply(landing_page_id, inputs.origin, transition, now)
                        .await;
                    if transition.changed && tx.send(transition.state).await.is_err() {
                        return;
                    }
                }
            }
        });

        Self { updates, task }
    }

    /// Wait for the next state change. `None` once the task has stopped.
    pub async fn next_state(&mut self) -> Option<GateState> {
        self.updates.recv().await
    }

    pub fn into_stream(mut self) -> impl Stream<Item = GateState> {
        stream! {
            while let Some(state) = self.updates.recv().await {
                yield state;
            }
        }
    }
}

impl Drop for SessionWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
