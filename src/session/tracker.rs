//! Per-tab attachment and recorder mode tracking.

use crate::engine::Mode;
use crate::host::TabId;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

/// Outcome of a mode change, for indicator and telemetry fan-out.
#[derive(Debug, Clone, Copy)]
pub struct ModeTransition {
    pub from: Mode,
    pub to: Mode,
    /// Time spent in the previous mode.
    pub dwell: Duration,
}

struct TrackerState {
    attached: HashSet<TabId>,
    attached_at: HashMap<TabId, Instant>,
    mode: Mode,
    mode_since: Instant,
    language: String,
}

/// Process-wide recorder state: the attached-tab set, per-tab attach
/// timestamps, the current mode, and the mirrored code-gen language.
///
/// Intentionally not persisted; like the in-tab overlays it mirrors, the
/// state resets on process restart.
pub struct TabTracker {
    state: Mutex<TrackerState>,
}

impl TabTracker {
    pub fn new(language: String) -> Self {
        let now = Instant::now();
        Self {
            state: Mutex::new(TrackerState {
                attached: HashSet::new(),
                attached_at: HashMap::new(),
                mode: Mode::None,
                mode_since: now,
                language,
            }),
        }
    }

    pub fn mark_attached(&self, tab: TabId) {
        let mut state = self.state.lock();
        state.attached.insert(tab);
        state.attached_at.insert(tab, Instant::now());
    }

    /// Remove a tab, returning how long it was attached (for telemetry).
    pub fn mark_detached(&self, tab: TabId) -> Option<Duration> {
        let mut state = self.state.lock();
        state.attached.remove(&tab);
        state.attached_at.remove(&tab).map(|t| t.elapsed())
    }

    pub fn is_attached(&self, tab: TabId) -> bool {
        self.state.lock().attached.contains(&tab)
    }

    pub fn attached_tabs(&self) -> Vec<TabId> {
        self.state.lock().attached.iter().copied().collect()
    }

    pub fn current_mode(&self) -> Mode {
        self.state.lock().mode
    }

    /// Record a mode change and reset the dwell timestamp.
    ///
    /// Transitions to `Detached` never overwrite the stored mode, so
    /// re-attaching resumes the previously active mode.
    pub fn set_mode(&self, mode: Mode) -> ModeTransition {
        let mut state = self.state.lock();
        let from = state.mode;
        let dwell = state.mode_since.elapsed();
        if mode != Mode::Detached {
            state.mode = mode;
        }
        state.mode_since = Instant::now();
        ModeTransition {
            from,
            to: mode,
            dwell,
        }
    }

    pub fn language(&self) -> String {
        self.state.lock().language.clone()
    }

    pub fn set_language(&self, language: String) {
        self.state.lock().language = language;
    }
}
