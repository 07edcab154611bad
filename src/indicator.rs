//! Toolbar indicator: mode → action title/badge mapping.

use crate::engine::Mode;
use crate::host::{IndicatorState, TabId};
use crate::state::Background;

const CLEARED_STOPPED: IndicatorState = IndicatorState {
    title: "Stopped",
    badge_text: "",
    badge_background_color: "",
    badge_text_color: "",
};

const CLEARED_RECORD: IndicatorState = IndicatorState {
    title: "Record",
    badge_text: "",
    badge_background_color: "",
    badge_text_color: "",
};

const RECORDING: IndicatorState = IndicatorState {
    title: "Recording",
    badge_text: "REC",
    badge_background_color: "darkred",
    badge_text_color: "white",
};

const INSPECTING: IndicatorState = IndicatorState {
    title: "Inspecting",
    badge_text: "INS",
    badge_background_color: "dodgerblue",
    badge_text_color: "white",
};

/// Indicator presentation for a mode.
pub fn indicator_for(mode: Mode) -> IndicatorState {
    match mode {
        Mode::None => CLEARED_STOPPED,
        Mode::Standby | Mode::Detached => CLEARED_RECORD,
        mode if mode.is_recording() => RECORDING,
        _ => INSPECTING,
    }
}

impl Background {
    /// Apply the indicator for a tab. When `mode` is omitted it derives from
    /// whether the tab is attached. Host failures are discarded; the tab may
    /// have closed between scheduling and applying the update.
    pub async fn update_indicator(&self, tab: TabId, mode: Option<Mode>) {
        let mode = mode.unwrap_or_else(|| {
            if self.tracker.is_attached(tab) {
                self.tracker.current_mode()
            } else {
                Mode::Detached
            }
        });
        let indicator = indicator_for(mode);
        if let Err(e) = self.host.set_indicator(tab, &indicator).await {
            tracing::debug!("Indicator update for tab {} failed: {}", tab, e);
        }
    }
}
