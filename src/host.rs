//! Trait seam to the host browser platform.
//!
//! Covers the small slice of the platform the background service needs: tab
//! creation and metadata, the toolbar action (title/badge/enabled), the side
//! panel, and user-originated events. All indicator calls are best-effort on
//! the caller side; a tab may close between scheduling and applying an update.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::{broadcast, oneshot};

/// Host-assigned tab identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tab metadata, all best-effort (the tab may already be gone).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub url: Option<String>,
    pub title: Option<String>,
    pub window_id: Option<i64>,
    pub incognito: Option<bool>,
    pub status: Option<String>,
    pub index: Option<i64>,
}

/// Toolbar action presentation for one tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorState {
    pub title: &'static str,
    pub badge_text: &'static str,
    pub badge_background_color: &'static str,
    pub badge_text_color: &'static str,
}

/// Keyboard commands the host forwards to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderCommand {
    Inspect,
    Record,
}

/// User-originated host events.
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// Toolbar action icon clicked on a tab.
    ActionClicked { tab: TabId },
    /// Keyboard command issued while a tab is active.
    Command { command: RecorderCommand, tab: TabId },
    /// Context-menu entry selected on a tab.
    ContextMenu { tab: TabId },
    /// The tab navigated; the host clears per-tab action state on navigation,
    /// so the indicator must be re-applied.
    Navigated { tab: TabId },
}

/// The host browser platform.
#[async_trait]
pub trait Host: Send + Sync {
    /// Look up tab metadata.
    async fn tab_info(&self, tab: TabId) -> Result<TabInfo>;

    /// Open a new tab. Relative paths are resolved against the host's own
    /// asset root (used for the helper save page).
    async fn create_tab(&self, url: &str) -> Result<TabId>;

    /// Close a tab.
    async fn close_tab(&self, tab: TabId) -> Result<()>;

    /// Apply toolbar title/badge state to a tab.
    async fn set_indicator(&self, tab: TabId, indicator: &IndicatorState) -> Result<()>;

    /// Enable or disable the toolbar action globally.
    async fn set_action_enabled(&self, enabled: bool) -> Result<()>;

    /// Open the side panel for a tab. Must be invoked before any engine work
    /// so the host still considers it part of the originating user gesture.
    async fn open_side_panel(&self, tab: TabId) -> Result<()>;

    /// Register a one-shot close watch on a tab. The returned receiver fires
    /// when the tab is closed; registration happens within this call so a
    /// close cannot slip between registering and awaiting.
    async fn watch_close(&self, tab: TabId) -> Result<oneshot::Receiver<()>>;

    /// Subscribe to user-originated events.
    fn subscribe(&self) -> broadcast::Receiver<HostEvent>;
}
