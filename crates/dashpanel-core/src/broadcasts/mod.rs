//! Dashboard broadcasts: announcement records, the polling view model and
//! its sidebar rendering.

pub mod panel;
mod poller;
mod types;

#[cfg(test)]
mod poller_tests;

pub use panel::{render, BroadcastsView, PanelBody, SidebarProps};
pub use poller::{BroadcastPoller, PollerSettings};
pub use types::{unseen_count, unseen_ids, Broadcast, BroadcastState, LoadState, PanelState};
