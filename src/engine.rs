//! Trait seam to the external recording engine.
//!
//! The engine performs the actual page attachment, DOM capture and code
//! generation; this crate only drives its lifecycle. Implementations forward
//! lifecycle notifications on a broadcast channel so the background service
//! can fan them out to the tracker, indicator and telemetry.

use crate::error::Result;
use crate::host::TabId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Recorder activity state.
///
/// `Detached` is synthetic: it means "the recorder UI is closed for this tab"
/// and is never reported by the engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    None,
    Standby,
    Recording,
    AssertingText,
    AssertingVisibility,
    AssertingValue,
    AssertingSnapshot,
    Inspecting,
    Detached,
}

impl Mode {
    /// Recording plus the assertion-capture sub-modes.
    pub fn is_recording(self) -> bool {
        matches!(
            self,
            Mode::Recording
                | Mode::AssertingText
                | Mode::AssertingVisibility
                | Mode::AssertingValue
                | Mode::AssertingSnapshot
        )
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::None => "none",
            Mode::Standby => "standby",
            Mode::Recording => "recording",
            Mode::AssertingText => "assertingText",
            Mode::AssertingVisibility => "assertingVisibility",
            Mode::AssertingValue => "assertingValue",
            Mode::AssertingSnapshot => "assertingSnapshot",
            Mode::Inspecting => "inspecting",
            Mode::Detached => "detached",
        };
        f.write_str(name)
    }
}

/// How the recorder UI should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderWindow {
    Sidepanel,
    Popup,
}

/// Options for showing the recorder UI.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowOptions {
    pub mode: Mode,
    pub language: String,
    pub window: RecorderWindow,
}

/// Engine lifecycle notifications.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The recorder UI was closed by the user.
    Hidden,
    /// The recorder switched activity state.
    ModeChanged { mode: Mode },
    /// The engine bound itself to a tab.
    TabAttached { tab: TabId },
    /// The engine released a tab.
    TabDetached { tab: TabId },
}

/// A browser cookie as captured by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

fn empty_origins() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

/// Snapshot of cookies and per-origin storage captured by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageState {
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    /// Per-origin localStorage entries, passed through unfiltered on save.
    #[serde(default = "empty_origins")]
    pub origins: serde_json::Value,
}

impl Default for StorageState {
    fn default() -> Self {
        Self {
            cookies: Vec::new(),
            origins: empty_origins(),
        }
    }
}

/// The running automation/recording engine.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Show the recorder UI with the given mode, language and window kind.
    async fn show(&self, options: ShowOptions) -> Result<()>;

    /// Whether the recorder UI is currently hidden.
    async fn is_hidden(&self) -> bool;

    /// Bind the engine to a tab so it can observe and control it.
    async fn attach(&self, tab: TabId) -> Result<()>;

    /// Release a tab.
    async fn detach(&self, tab: TabId) -> Result<()>;

    /// Force the recorder into a specific mode.
    async fn set_mode(&self, mode: Mode) -> Result<()>;

    /// Configure the attribute name the selector engine prefers.
    async fn set_test_id_attribute(&self, name: &str) -> Result<()>;

    /// Evaluate a script in the page context of an attached tab.
    async fn eval(&self, tab: TabId, expression: &str) -> Result<serde_json::Value>;

    /// Dispatch a trusted click on the first element matching `selector`.
    async fn click(&self, tab: TabId, selector: &str) -> Result<()>;

    /// Capture the current storage state (cookies + origins).
    async fn storage_state(&self) -> Result<StorageState>;

    /// Subscribe to lifecycle notifications.
    fn subscribe(&self) -> broadcast::Receiver<EngineEvent>;
}

/// Starts the engine. Called at most once per process by the session manager.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn start(&self) -> Result<Arc<dyn Engine>>;
}
