//! Broadcast records and the poller's observable state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wire::{deserialize_id, null_as_default};

/// An announcement shown in the dashboard notification panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broadcast {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub link: Option<String>,
    /// Flips false -> true only, after the server acknowledges.
    #[serde(default)]
    pub has_seen: bool,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_expires: Option<DateTime<Utc>>,
}

/// Whether the sidebar panel is open and, if so, whether the dwell has
/// elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelState {
    #[default]
    Closed,
    /// Open, dwell timer running.
    OpenPendingSeen,
    /// Open long enough for unseen items to be acknowledged.
    OpenSeen,
}

/// Coarse fetch status derived from the `loading`/`error` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Loading,
    Ready,
    Failed,
}

/// Snapshot of everything the panel renders from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastState {
    pub broadcasts: Vec<Broadcast>,
    pub loading: bool,
    pub error: bool,
    pub panel: PanelState,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl Default for BroadcastState {
    fn default() -> Self {
        Self {
            broadcasts: Vec::new(),
            loading: true,
            error: false,
            panel: PanelState::Closed,
            last_fetched_at: None,
        }
    }
}

impl BroadcastState {
    pub fn unseen_count(&self) -> usize {
        unseen_count(&self.broadcasts)
    }

    pub fn unseen_ids(&self) -> Vec<String> {
        unseen_ids(&self.broadcasts)
    }

    pub fn load_state(&self) -> LoadState {
        if self.loading {
            LoadState::Loading
        } else if self.error {
            LoadState::Failed
        } else {
            LoadState::Ready
        }
    }
}

/// Number of broadcasts the user has not seen yet.
pub fn unseen_count(broadcasts: &[Broadcast]) -> usize {
    broadcasts.iter().filter(|b| !b.has_seen).count()
}

/// Ids of unseen broadcasts, in list order.
pub fn unseen_ids(broadcasts: &[Broadcast]) -> Vec<String> {
    broadcasts
        .iter()
        .filter(|b| !b.has_seen)
        .map(|b| b.id.clone())
        .collect()
}
