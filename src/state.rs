//! Background service state and event loop.

use crate::config::{SettingsPatch, SettingsStore};
use crate::engine::{EngineFactory, Mode};
use crate::error::Result;
use crate::host::{Host, HostEvent, RecorderCommand};
use crate::session::{SessionManager, TabTracker};
use crate::telemetry::{Telemetry, TelemetryEvent};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;

/// Process-wide service state: settings mirror, tab tracker, telemetry,
/// the memoized engine session, and the host platform handle.
pub struct Background {
    pub settings: Arc<SettingsStore>,
    pub tracker: TabTracker,
    pub telemetry: Telemetry,
    pub sessions: SessionManager,
    pub host: Arc<dyn Host>,
    /// Self handle for tasks spawned from `&self` methods.
    pub(crate) self_ref: Weak<Self>,
}

impl Background {
    pub fn new(
        settings: Arc<SettingsStore>,
        host: Arc<dyn Host>,
        factory: Arc<dyn EngineFactory>,
        telemetry: Telemetry,
    ) -> Arc<Self> {
        let language = settings.current().target_language;
        Arc::new_cyclic(|self_ref| Self {
            settings,
            tracker: TabTracker::new(language),
            telemetry,
            sessions: SessionManager::new(factory),
            host,
            self_ref: self_ref.clone(),
        })
    }

    /// Main loop: dispatch host events and settings changes until the host
    /// event stream closes.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        let mut host_events = self.host.subscribe();
        let mut settings_rx = self.settings.subscribe();
        let mut previous = settings_rx.borrow().clone();

        loop {
            tokio::select! {
                event = host_events.recv() => match event {
                    Ok(event) => self.handle_host_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Host event stream lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                changed = settings_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = settings_rx.borrow_and_update().clone();
                    self.apply_settings_change(&previous, &current).await;
                    previous = current;
                }
            }
        }

        tracing::info!("Background event loop stopped");
        Ok(())
    }

    /// Dispatch a single user-originated host event.
    pub async fn handle_host_event(&self, event: HostEvent) {
        match event {
            HostEvent::ActionClicked { tab } | HostEvent::ContextMenu { tab } => {
                if let Err(e) = self.attach(tab, None).await {
                    tracing::warn!("Attach to tab {} failed: {}", tab, e);
                }
            }
            HostEvent::Command { command, tab } => {
                let mode = match command {
                    RecorderCommand::Inspect => Mode::Inspecting,
                    RecorderCommand::Record => Mode::Recording,
                };
                if let Err(e) = self.attach(tab, Some(mode)).await {
                    tracing::warn!("Attach to tab {} for {} failed: {}", tab, mode, e);
                }
            }
            // Navigation wipes per-tab action state on the host side
            HostEvent::Navigated { tab } => self.update_indicator(tab, None).await,
        }
    }

    /// Propagate a settings change. Only actions initiated after the change
    /// pick it up; an already-open recorder UI is not reconfigured.
    async fn apply_settings_change(
        &self,
        previous: &crate::config::Settings,
        current: &crate::config::Settings,
    ) {
        if previous.test_id_attribute_name != current.test_id_attribute_name {
            if let Some(engine) = self.sessions.started() {
                if let Err(e) = engine
                    .set_test_id_attribute(&current.test_id_attribute_name)
                    .await
                {
                    tracing::warn!("Failed to apply selector attribute: {}", e);
                }
            }
        }
        if previous.target_language != current.target_language {
            self.tracker.set_language(current.target_language.clone());
        }
        // sidepanel is read by the next attach invocation
    }

    /// Update the persisted selector attribute and push it into a running
    /// engine. Exposed for external harnesses alongside `attach`.
    pub async fn set_test_id_attribute(&self, name: &str) -> Result<()> {
        self.settings.update(SettingsPatch {
            test_id_attribute_name: Some(name.to_string()),
            ..Default::default()
        })?;
        if let Some(engine) = self.sessions.started() {
            engine.set_test_id_attribute(name).await?;
        }
        Ok(())
    }

    /// Best-effort telemetry capture; a malformed event is logged and dropped.
    pub(crate) fn capture(&self, event: TelemetryEvent) {
        if let Err(e) = self.telemetry.capture(event) {
            tracing::debug!("Telemetry capture failed: {}", e);
        }
    }
}
