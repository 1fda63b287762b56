//! Broadcast poller.
//!
//! Owns two tokio tasks: the poll loop, which refetches the broadcast list
//! every `poll_interval`, and an optional dwell timer started by
//! [`BroadcastPoller::on_open`]. Both are aborted on close/teardown, and a
//! liveness flag keeps completions that race teardown from touching state.
//!
//! ## State
//!
//! ```text
//! fetch:  Loading -> Ready | Failed -> (next poll) -> Ready | Failed ...
//! panel:  Closed -> OpenPendingSeen -> OpenSeen
//!                         |                |
//!                         +---- Closed <---+
//! ```
//!
//! State is published through a `watch` channel; renderers call
//! [`BroadcastPoller::subscribe`] and redraw on change.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::types::{BroadcastState, PanelState};
use crate::api::BroadcastApi;
use crate::error::ApiError;

/// Timings for the poll loop and the dwell timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerSettings {
    pub poll_interval: Duration,
    pub dwell: Duration,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            dwell: Duration::from_millis(1000),
        }
    }
}

struct Shared<A> {
    api: A,
    settings: PollerSettings,
    state: watch::Sender<BroadcastState>,
    alive: AtomicBool,
}

impl<A: BroadcastApi> Shared<A> {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    async fn fetch(&self) {
        match self.api.fetch_broadcasts().await {
            Ok(broadcasts) => {
                if !self.is_alive() {
                    return;
                }
                let count = broadcasts.len();
                self.state.send_modify(|s| {
                    s.broadcasts = broadcasts;
                    s.loading = false;
                    s.error = false;
                    s.last_fetched_at = Some(Utc::now());
                });
                tracing::debug!(
                    count,
                    unseen = self.state.borrow().unseen_count(),
                    "broadcasts fetched"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch broadcasts");
                if !self.is_alive() {
                    return;
                }
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = true;
                });
            }
        }
    }

    async fn mark_seen(&self) -> Result<usize, ApiError> {
        let ids = self.state.borrow().unseen_ids();
        if ids.is_empty() {
            return Ok(0);
        }

        self.api.mark_seen(&ids).await?;
        tracing::info!(count = ids.len(), "broadcasts marked seen");

        if self.is_alive() {
            let sent: HashSet<&str> = ids.iter().map(String::as_str).collect();
            self.state.send_modify(|s| {
                for item in s.broadcasts.iter_mut() {
                    if sent.contains(item.id.as_str()) {
                        item.has_seen = true;
                    }
                }
            });
        }
        Ok(ids.len())
    }
}

async fn poll_loop<A: BroadcastApi>(shared: Arc<Shared<A>>) {
    loop {
        shared.fetch().await;
        if !shared.is_alive() {
            break;
        }
        tokio::time::sleep(shared.settings.poll_interval).await;
    }
}

async fn dwell_then_mark_seen<A: BroadcastApi + 'static>(shared: Arc<Shared<A>>) {
    tokio::time::sleep(shared.settings.dwell).await;
    if !shared.is_alive() || shared.state.borrow().panel != PanelState::OpenPendingSeen {
        return;
    }

    // The request runs in its own task: closing the panel after the dwell
    // aborts this task but must not drop an acknowledgment already sent.
    let request = Arc::clone(&shared);
    let ack = tokio::spawn(async move {
        if let Err(e) = request.mark_seen().await {
            tracing::warn!(error = %e, "failed to mark broadcasts seen");
        }
    });
    let _ = ack.await;

    if shared.is_alive() {
        shared.state.send_if_modified(|s| {
            if s.panel == PanelState::OpenPendingSeen {
                s.panel = PanelState::OpenSeen;
                true
            } else {
                false
            }
        });
    }
}

/// Polls the broadcast list and acknowledges what the user has looked at.
///
/// Must be created inside a tokio runtime. Dropping the poller cancels both
/// timers.
pub struct BroadcastPoller<A: BroadcastApi + 'static> {
    shared: Arc<Shared<A>>,
    poll_task: Option<JoinHandle<()>>,
    dwell_task: Option<JoinHandle<()>>,
}

impl<A: BroadcastApi + 'static> BroadcastPoller<A> {
    /// Mount: start in `Loading` and issue the first fetch right away.
    pub fn start(api: A, settings: PollerSettings) -> Self {
        let (state, _) = watch::channel(BroadcastState::default());
        let shared = Arc::new(Shared {
            api,
            settings,
            state,
            alive: AtomicBool::new(true),
        });
        tracing::info!(
            poll_interval_secs = settings.poll_interval.as_secs(),
            dwell_ms = settings.dwell.as_millis() as u64,
            "broadcast poller started"
        );

        let mut poller = Self {
            shared,
            poll_task: None,
            dwell_task: None,
        };
        poller.spawn_poll_loop();
        poller
    }

    fn spawn_poll_loop(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        self.poll_task = Some(tokio::spawn(poll_loop(Arc::clone(&self.shared))));
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> PollerSettings {
        self.shared.settings
    }

    /// Current state snapshot.
    pub fn state(&self) -> BroadcastState {
        self.shared.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<BroadcastState> {
        self.shared.state.subscribe()
    }

    /// Badge count.
    pub fn unseen_count(&self) -> usize {
        self.shared.state.borrow().unseen_count()
    }

    pub fn panel(&self) -> PanelState {
        self.shared.state.borrow().panel
    }

    pub fn is_polling(&self) -> bool {
        self.poll_task.as_ref().is_some_and(|t| !t.is_finished())
    }

    // ── Panel hooks ──────────────────────────────────────────────────

    /// Panel opened: unseen items are acknowledged once the dwell elapses
    /// with the panel still open. Reopening restarts the dwell.
    pub fn on_open(&mut self) {
        if !self.shared.is_alive() {
            return;
        }
        if let Some(task) = self.dwell_task.take() {
            task.abort();
        }
        self.shared
            .state
            .send_modify(|s| s.panel = PanelState::OpenPendingSeen);
        self.dwell_task = Some(tokio::spawn(dwell_then_mark_seen(Arc::clone(&self.shared))));
    }

    /// Panel closed: a pending dwell is cancelled and nothing is sent. A
    /// request already in flight still completes and updates the list.
    pub fn on_close(&mut self) {
        if let Some(task) = self.dwell_task.take() {
            task.abort();
        }
        if self.shared.is_alive() {
            self.shared.state.send_if_modified(|s| {
                let changed = s.panel != PanelState::Closed;
                s.panel = PanelState::Closed;
                changed
            });
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Acknowledge every currently unseen broadcast in one batched request.
    ///
    /// Returns how many ids were sent; `Ok(0)` means nothing was unseen and
    /// no request went out.
    ///
    /// On success only the ids that were sent flip to seen. Items that
    /// arrived from a poll while the request was in flight stay unseen
    /// until the next acknowledgment.
    pub async fn mark_seen(&self) -> Result<usize, ApiError> {
        self.shared.mark_seen().await
    }

    /// Fetch now and restart the poll schedule from this point.
    pub fn refresh(&mut self) {
        if self.shared.is_alive() {
            self.spawn_poll_loop();
        }
    }

    /// Reset to the initial loading state, keeping the panel state, and
    /// fetch again.
    pub fn remount(&mut self) {
        if !self.shared.is_alive() {
            return;
        }
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        self.shared.state.send_modify(|s| {
            *s = BroadcastState {
                panel: s.panel,
                ..BroadcastState::default()
            };
        });
        self.spawn_poll_loop();
    }

    /// Unmount: cancel both timers. Also runs on drop.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if !self.shared.alive.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(task) = self.dwell_task.take() {
            task.abort();
        }
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        tracing::info!("broadcast poller stopped");
    }
}

impl<A: BroadcastApi + 'static> Drop for BroadcastPoller<A> {
    fn drop(&mut self) {
        self.teardown();
    }
}
