//! Tests for the broadcast poller, driven by tokio's paused clock.

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;
    use tokio::time::sleep;

    use super::super::poller::*;
    use crate::api::BroadcastApi;
    use crate::broadcasts::{Broadcast, LoadState, PanelState};
    use crate::error::ApiError;

    #[derive(Default)]
    struct FakeState {
        scripted: VecDeque<Result<Vec<Broadcast>, u16>>,
        fallback: Vec<Broadcast>,
        fetch_calls: usize,
        mark_seen_calls: Vec<Vec<String>>,
        mark_seen_status: Option<u16>,
        mark_seen_gate: Option<Arc<Notify>>,
    }

    #[derive(Clone, Default)]
    struct FakeApi {
        inner: Arc<Mutex<FakeState>>,
    }

    impl FakeApi {
        fn serving(list: Vec<Broadcast>) -> Self {
            let api = Self::default();
            api.inner.lock().unwrap().fallback = list;
            api
        }

        fn script(&self, response: Result<Vec<Broadcast>, u16>) {
            self.inner.lock().unwrap().scripted.push_back(response);
        }

        fn fetch_calls(&self) -> usize {
            self.inner.lock().unwrap().fetch_calls
        }

        fn mark_seen_calls(&self) -> Vec<Vec<String>> {
            self.inner.lock().unwrap().mark_seen_calls.clone()
        }
    }

    fn status_error(status: u16) -> ApiError {
        ApiError::Status {
            status,
            url: "http://fake/broadcasts/".to_string(),
            body: String::new(),
        }
    }

    #[async_trait]
    impl BroadcastApi for FakeApi {
        async fn fetch_broadcasts(&self) -> Result<Vec<Broadcast>, ApiError> {
            let mut inner = self.inner.lock().unwrap();
            inner.fetch_calls += 1;
            match inner.scripted.pop_front() {
                Some(Ok(list)) => Ok(list),
                Some(Err(status)) => Err(status_error(status)),
                None => Ok(inner.fallback.clone()),
            }
        }

        async fn mark_seen(&self, ids: &[String]) -> Result<(), ApiError> {
            let gate = {
                let mut inner = self.inner.lock().unwrap();
                inner.mark_seen_calls.push(ids.to_vec());
                inner.mark_seen_gate.clone()
            };
            if let Some(gate) = gate {
                gate.notified().await;
            }
            match self.inner.lock().unwrap().mark_seen_status {
                Some(status) => Err(status_error(status)),
                None => Ok(()),
            }
        }
    }

    fn broadcast(id: &str, has_seen: bool) -> Broadcast {
        Broadcast {
            id: id.to_string(),
            title: format!("Update {id}"),
            message: "details".to_string(),
            link: Some(format!("https://example.com/{id}")),
            has_seen,
            is_active: Some(true),
            date_created: None,
            date_expires: None,
        }
    }

    fn settings() -> PollerSettings {
        PollerSettings::default()
    }

    /// Let spawned tasks run without crossing any timer deadline.
    async fn settle() {
        sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_loading_then_ready() {
        let api = FakeApi::serving(vec![broadcast("1", false)]);
        let poller = BroadcastPoller::start(api.clone(), settings());

        assert_eq!(poller.state().load_state(), LoadState::Loading);
        assert_eq!(poller.panel(), PanelState::Closed);

        settle().await;
        let state = poller.state();
        assert_eq!(state.load_state(), LoadState::Ready);
        assert_eq!(state.broadcasts.len(), 1);
        assert!(state.last_fetched_at.is_some());
        assert_eq!(api.fetch_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_again_after_interval() {
        let api = FakeApi::serving(vec![]);
        let poller = BroadcastPoller::start(api.clone(), settings());
        settle().await;
        assert_eq!(api.fetch_calls(), 1);

        sleep(Duration::from_secs(58)).await;
        assert_eq!(api.fetch_calls(), 1);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(api.fetch_calls(), 2);
        assert!(poller.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_sets_error_and_polling_continues() {
        let api = FakeApi::default();
        api.script(Err(502));
        api.script(Ok(vec![broadcast("4", false)]));
        let poller = BroadcastPoller::start(api.clone(), settings());

        settle().await;
        let state = poller.state();
        assert!(!state.loading);
        assert!(state.error);
        assert_eq!(state.load_state(), LoadState::Failed);

        sleep(Duration::from_secs(60)).await;
        let state = poller.state();
        assert_eq!(api.fetch_calls(), 2);
        assert_eq!(state.load_state(), LoadState::Ready);
        assert_eq!(state.unseen_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_stale_list() {
        let api = FakeApi::default();
        api.script(Ok(vec![broadcast("1", false), broadcast("2", true)]));
        api.script(Err(500));
        let poller = BroadcastPoller::start(api.clone(), settings());

        settle().await;
        sleep(Duration::from_secs(60)).await;

        let state = poller.state();
        assert!(state.error);
        assert_eq!(state.broadcasts.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unseen_count_tracks_list() {
        let api = FakeApi::serving(vec![
            broadcast("1", true),
            broadcast("2", false),
            broadcast("3", false),
        ]);
        let poller = BroadcastPoller::start(api, settings());
        settle().await;
        assert_eq!(poller.unseen_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_seen_is_noop_without_unseen() {
        let api = FakeApi::serving(vec![broadcast("1", true), broadcast("2", true)]);
        let poller = BroadcastPoller::start(api.clone(), settings());
        settle().await;

        assert_eq!(poller.mark_seen().await.unwrap(), 0);
        assert!(api.mark_seen_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_seen_sends_one_batch_and_flips_items() {
        let api = FakeApi::serving(vec![
            broadcast("1", true),
            broadcast("3", false),
            broadcast("7", false),
        ]);
        let poller = BroadcastPoller::start(api.clone(), settings());
        settle().await;

        assert_eq!(poller.mark_seen().await.unwrap(), 2);
        assert_eq!(
            api.mark_seen_calls(),
            vec![vec!["3".to_string(), "7".to_string()]]
        );
        assert!(poller.state().broadcasts.iter().all(|b| b.has_seen));
        assert_eq!(poller.unseen_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_seen_failure_leaves_items_unseen() {
        let api = FakeApi::serving(vec![broadcast("3", false)]);
        api.inner.lock().unwrap().mark_seen_status = Some(500);
        let poller = BroadcastPoller::start(api.clone(), settings());
        settle().await;

        assert!(poller.mark_seen().await.is_err());
        assert_eq!(poller.unseen_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_seen_only_flips_ids_that_were_sent() {
        let api = FakeApi::serving(vec![broadcast("3", false), broadcast("7", false)]);
        let gate = Arc::new(Notify::new());
        api.inner.lock().unwrap().mark_seen_gate = Some(Arc::clone(&gate));
        let poller = BroadcastPoller::start(api.clone(), settings());
        settle().await;

        // A poll lands while the acknowledgment is in flight and brings a new item.
        api.inner.lock().unwrap().fallback = vec![
            broadcast("3", false),
            broadcast("7", false),
            broadcast("9", false),
        ];
        let (sent, ()) = tokio::join!(poller.mark_seen(), async {
            sleep(Duration::from_secs(60)).await;
            gate.notify_one();
        });

        assert_eq!(sent.unwrap(), 2);
        let state = poller.state();
        let unseen: Vec<_> = state.unseen_ids();
        assert_eq!(unseen, vec!["9".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_within_dwell_sends_nothing() {
        let api = FakeApi::serving(vec![broadcast("1", false)]);
        let mut poller = BroadcastPoller::start(api.clone(), settings());
        settle().await;

        poller.on_open();
        assert_eq!(poller.panel(), PanelState::OpenPendingSeen);
        sleep(Duration::from_millis(500)).await;
        poller.on_close();
        assert_eq!(poller.panel(), PanelState::Closed);

        sleep(Duration::from_secs(2)).await;
        assert!(api.mark_seen_calls().is_empty());
        assert_eq!(poller.unseen_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dwell_elapsed_marks_seen() {
        let api = FakeApi::serving(vec![broadcast("1", false), broadcast("2", false)]);
        let mut poller = BroadcastPoller::start(api.clone(), settings());
        settle().await;

        poller.on_open();
        sleep(Duration::from_millis(1100)).await;

        assert_eq!(api.mark_seen_calls().len(), 1);
        assert_eq!(poller.panel(), PanelState::OpenSeen);
        assert_eq!(poller.unseen_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_after_dwell_keeps_inflight_ack() {
        let api = FakeApi::serving(vec![broadcast("1", false), broadcast("2", false)]);
        let gate = Arc::new(Notify::new());
        api.inner.lock().unwrap().mark_seen_gate = Some(Arc::clone(&gate));
        let mut poller = BroadcastPoller::start(api.clone(), settings());
        settle().await;

        poller.on_open();
        sleep(Duration::from_millis(1100)).await;
        assert_eq!(api.mark_seen_calls().len(), 1);

        poller.on_close();
        gate.notify_one();
        settle().await;

        assert_eq!(poller.unseen_count(), 0);
        assert_eq!(poller.panel(), PanelState::Closed);
        assert_eq!(api.mark_seen_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dwell_with_nothing_unseen_sends_nothing() {
        let api = FakeApi::serving(vec![broadcast("1", true)]);
        let mut poller = BroadcastPoller::start(api.clone(), settings());
        settle().await;

        poller.on_open();
        sleep(Duration::from_secs(2)).await;

        assert!(api.mark_seen_calls().is_empty());
        assert_eq!(poller.panel(), PanelState::OpenSeen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopen_restarts_dwell() {
        let api = FakeApi::serving(vec![broadcast("1", false)]);
        let mut poller = BroadcastPoller::start(api.clone(), settings());
        settle().await;

        poller.on_open();
        sleep(Duration::from_millis(800)).await;
        poller.on_open();
        sleep(Duration::from_millis(800)).await;
        assert!(api.mark_seen_calls().is_empty());

        sleep(Duration::from_millis(300)).await;
        assert_eq!(api.mark_seen_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_both_timers() {
        let api = FakeApi::serving(vec![broadcast("1", false)]);
        let mut poller = BroadcastPoller::start(api.clone(), settings());
        settle().await;
        poller.on_open();
        drop(poller);

        sleep(Duration::from_secs(300)).await;
        assert_eq!(api.fetch_calls(), 1);
        assert!(api.mark_seen_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_polling() {
        let api = FakeApi::serving(vec![]);
        let poller = BroadcastPoller::start(api.clone(), settings());
        settle().await;
        poller.shutdown();

        sleep(Duration::from_secs(600)).await;
        assert_eq!(api.fetch_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_fetches_immediately() {
        let api = FakeApi::serving(vec![]);
        let mut poller = BroadcastPoller::start(api.clone(), settings());
        settle().await;
        sleep(Duration::from_secs(30)).await;

        poller.refresh();
        settle().await;
        assert_eq!(api.fetch_calls(), 2);

        // Schedule restarts from the refresh, not the original mount.
        sleep(Duration::from_secs(40)).await;
        assert_eq!(api.fetch_calls(), 2);
        sleep(Duration::from_secs(21)).await;
        assert_eq!(api.fetch_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remount_resets_to_loading() {
        let api = FakeApi::serving(vec![broadcast("1", false)]);
        let mut poller = BroadcastPoller::start(api.clone(), settings());
        settle().await;
        poller.on_open();

        poller.remount();
        let state = poller.state();
        assert!(state.loading);
        assert!(state.broadcasts.is_empty());
        assert_eq!(state.panel, PanelState::OpenPendingSeen);

        settle().await;
        assert_eq!(poller.state().broadcasts.len(), 1);
        assert_eq!(api.fetch_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_fetch_results() {
        let api = FakeApi::serving(vec![broadcast("5", false)]);
        let poller = BroadcastPoller::start(api, settings());
        let mut rx = poller.subscribe();

        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        assert!(!state.loading);
        assert_eq!(state.unseen_ids(), vec!["5".to_string()]);
    }
}
