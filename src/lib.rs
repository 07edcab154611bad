//! Background orchestration service for a browser recording engine.
//!
//! The actual DOM capture, action replay and code generation live in an
//! external automation engine; this crate wires host-platform events (toolbar
//! clicks, keyboard commands, navigation) and recorder-UI messages to that
//! engine's lifecycle: per-tab attach state, the toolbar indicator, settings
//! sync, save-to-disk flows and usage telemetry.
//!
//! The engine and the host platform are trait seams ([`Engine`], [`Host`]);
//! embedders supply implementations and drive the service through
//! [`Background`] and the local HTTP API in [`api`].

pub mod api;
pub mod attach;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod indicator;
pub mod save;
pub mod session;
pub mod state;
pub mod telemetry;

pub use config::{Config, ServiceConfig, Settings, SettingsPatch, SettingsStore};
pub use engine::{
    Cookie, Engine, EngineEvent, EngineFactory, Mode, RecorderWindow, ShowOptions, StorageState,
};
pub use error::{Result, TabscribeError};
pub use host::{Host, HostEvent, IndicatorState, RecorderCommand, TabId, TabInfo};
pub use indicator::indicator_for;
pub use save::{SaveRequest, SAVE_PAGE_PATH};
pub use session::{SessionManager, TabTracker};
pub use state::Background;
pub use telemetry::{Telemetry, TelemetryEvent, TelemetrySink};
