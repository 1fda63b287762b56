//! View model for the broadcasts sidebar entry.

use serde::Serialize;

use super::types::BroadcastState;

/// Sidebar identifier for this panel.
pub const PANEL_ID: &str = "broadcasts";
pub const PANEL_TITLE: &str = "Recent updates";
pub const EMPTY_MESSAGE: &str = "No recent updates.";

/// What the surrounding sidebar tells the entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidebarProps<'a> {
    pub current_panel: Option<&'a str>,
    pub show_panel: bool,
}

impl SidebarProps<'_> {
    pub fn is_current(&self) -> bool {
        self.current_panel == Some(PANEL_ID)
    }
}

/// The sidebar toggle with its activity badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleView {
    pub active: bool,
    pub unseen_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadcastItem {
    pub id: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub unseen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum PanelBody {
    Loading,
    Empty(&'static str),
    Items(Vec<BroadcastItem>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelView {
    pub title: &'static str,
    pub body: PanelBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadcastsView {
    pub toggle: ToggleView,
    /// Present only while the sidebar shows this panel.
    pub panel: Option<PanelView>,
}

/// Derive the render data from a state snapshot.
///
/// A failed fetch renders like any other state: stale items if there are
/// any, the empty message otherwise.
pub fn render(state: &BroadcastState, props: &SidebarProps<'_>) -> BroadcastsView {
    let toggle = ToggleView {
        active: props.is_current(),
        unseen_count: state.unseen_count(),
    };

    let panel = (props.show_panel && props.is_current()).then(|| PanelView {
        title: PANEL_TITLE,
        body: render_body(state),
    });

    BroadcastsView { toggle, panel }
}

fn render_body(state: &BroadcastState) -> PanelBody {
    if state.loading {
        return PanelBody::Loading;
    }
    if state.broadcasts.is_empty() {
        return PanelBody::Empty(EMPTY_MESSAGE);
    }
    PanelBody::Items(
        state
            .broadcasts
            .iter()
            .map(|b| BroadcastItem {
                id: b.id.clone(),
                title: b.title.clone(),
                message: b.message.clone(),
                link: b.link.clone(),
                unseen: !b.has_seen,
            })
            .collect(),
    )
}
