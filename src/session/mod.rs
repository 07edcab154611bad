//! Engine session lifecycle: at-most-once start and event fan-out.

pub mod tracker;

pub use tracker::{ModeTransition, TabTracker};

use crate::engine::{Engine, EngineEvent, EngineFactory, Mode};
use crate::error::Result;
use crate::host::TabId;
use crate::state::Background;
use crate::telemetry::TelemetryEvent;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Memoizes the single engine session.
///
/// The cell holds the pending-or-resolved start, so concurrent callers await
/// the same handle and the expensive start sequence runs at most once.
pub struct SessionManager {
    factory: Arc<dyn EngineFactory>,
    cell: OnceCell<Arc<dyn Engine>>,
}

impl SessionManager {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            cell: OnceCell::new(),
        }
    }

    /// The engine, if a session has already started.
    pub fn started(&self) -> Option<Arc<dyn Engine>> {
        self.cell.get().cloned()
    }
}

impl Background {
    /// Get the shared engine session, starting it on first call.
    ///
    /// Start sequence: read persisted settings, start the engine, apply the
    /// selector attribute and target language, then spawn the task that
    /// forwards engine lifecycle events into the service.
    pub async fn session(&self) -> Result<Arc<dyn Engine>> {
        let engine = self
            .sessions
            .cell
            .get_or_try_init(|| async {
                let settings = self.settings.current();
                let engine = self.sessions.factory.start().await?;

                engine
                    .set_test_id_attribute(&settings.test_id_attribute_name)
                    .await?;
                self.tracker.set_language(settings.target_language);

                if let Some(background) = self.self_ref.upgrade() {
                    let mut events = engine.subscribe();
                    tokio::spawn(async move {
                        while let Ok(event) = events.recv().await {
                            background.handle_engine_event(event).await;
                        }
                        tracing::debug!("Engine event stream closed");
                    });
                }

                tracing::info!("Engine session started");
                Ok::<_, crate::error::TabscribeError>(engine)
            })
            .await?;
        Ok(Arc::clone(engine))
    }

    /// Dispatch a single engine lifecycle event.
    pub async fn handle_engine_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::Hidden => self.on_recorder_hidden().await,
            EngineEvent::ModeChanged { mode } => self.on_mode_changed(mode).await,
            EngineEvent::TabAttached { tab } => self.on_tab_attached(tab).await,
            EngineEvent::TabDetached { tab } => self.on_tab_detached(tab).await,
        }
    }

    /// Recorder UI closed: treat as a full session stop and release all tabs.
    async fn on_recorder_hidden(&self) {
        let Some(engine) = self.sessions.started() else {
            return;
        };
        for tab in self.tracker.attached_tabs() {
            if let Err(e) = engine.detach(tab).await {
                tracing::debug!("Detach of tab {} on hide failed: {}", tab, e);
            }
        }
    }

    async fn on_mode_changed(&self, mode: Mode) {
        let transition = self.tracker.set_mode(mode);

        for tab in self.tracker.attached_tabs() {
            self.update_indicator(tab, Some(mode)).await;
        }

        let dwell_ms = transition.dwell.as_millis() as u64;
        self.capture(TelemetryEvent::ModeChanged {
            from: transition.from,
            to: mode,
            dwell_ms,
        });

        if !transition.from.is_recording() && mode.is_recording() {
            self.capture(TelemetryEvent::RecordingStarted { mode });
        } else if transition.from.is_recording() && !mode.is_recording() {
            self.capture(TelemetryEvent::RecordingStopped {
                duration_ms: dwell_ms,
            });
        }
    }

    async fn on_tab_attached(&self, tab: TabId) {
        self.tracker.mark_attached(tab);
        self.update_indicator(tab, None).await;

        // Tab metadata is best-effort; the tab may already be gone
        let info = self.host.tab_info(tab).await.unwrap_or_default();
        self.capture(TelemetryEvent::TabAttached {
            url: info.url,
            title: info.title,
            window_id: info.window_id,
            incognito: info.incognito,
            status: info.status,
            index: info.index,
        });
    }

    async fn on_tab_detached(&self, tab: TabId) {
        let session = self.tracker.mark_detached(tab);
        self.update_indicator(tab, Some(Mode::Detached)).await;
        self.capture(TelemetryEvent::TabDetached {
            session_ms: session.map(|d| d.as_millis() as u64),
        });
    }
}
