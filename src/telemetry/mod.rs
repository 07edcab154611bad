//! Usage telemetry wrapper.
//!
//! Events are structured, stamped with a per-process instance id, and handed
//! to a sink that delivers them fire-and-forget. Delivery failures are logged
//! and never reach functional code paths; `capture` itself only fails on
//! malformed event serialization, and every call site absorbs that error.

use crate::engine::Mode;
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Structured usage events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "properties", rename_all = "camelCase")]
#[serde(rename_all_fields = "camelCase")]
pub enum TelemetryEvent {
    ModeChanged {
        from: Mode,
        to: Mode,
        dwell_ms: u64,
    },
    RecordingStarted {
        mode: Mode,
    },
    RecordingStopped {
        duration_ms: u64,
    },
    TabAttached {
        url: Option<String>,
        title: Option<String>,
        window_id: Option<i64>,
        incognito: Option<bool>,
        status: Option<String>,
        index: Option<i64>,
    },
    TabDetached {
        session_ms: Option<u64>,
    },
    ScriptSaved {
        language: String,
        lines: usize,
        bytes: usize,
    },
    StorageStateSaved {
        cookies: usize,
    },
}

/// Delivers serialized events. Implementations must not block.
pub trait TelemetrySink: Send + Sync {
    fn send(&self, payload: serde_json::Value);
}

/// Drops everything.
struct NullSink;

impl TelemetrySink for NullSink {
    fn send(&self, _payload: serde_json::Value) {}
}

/// Ships events to an analytics endpoint on a spawned task.
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl TelemetrySink for HttpSink {
    fn send(&self, payload: serde_json::Value) {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        tokio::spawn(async move {
            if let Err(e) = client.post(&endpoint).json(&payload).send().await {
                tracing::debug!("Telemetry delivery failed: {}", e);
            }
        });
    }
}

pub struct Telemetry {
    instance_id: Uuid,
    sink: Arc<dyn TelemetrySink>,
}

impl Telemetry {
    /// Telemetry to the configured endpoint, or disabled when unset.
    pub fn new(endpoint: Option<&str>) -> Self {
        match endpoint {
            Some(endpoint) => Self::with_sink(Arc::new(HttpSink::new(endpoint))),
            None => Self::disabled(),
        }
    }

    pub fn with_sink(sink: Arc<dyn TelemetrySink>) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            sink,
        }
    }

    pub fn disabled() -> Self {
        Self::with_sink(Arc::new(NullSink))
    }

    /// Serialize and forward an event.
    ///
    /// Serialization failure propagates to the caller, which is expected to
    /// absorb it; delivery itself never fails from the caller's perspective.
    pub fn capture(&self, event: TelemetryEvent) -> Result<()> {
        let mut payload = serde_json::to_value(&event)?;
        if let Some(map) = payload.as_object_mut() {
            map.insert(
                "instanceId".to_string(),
                serde_json::json!(self.instance_id),
            );
        }
        self.sink.send(payload);
        Ok(())
    }
}
