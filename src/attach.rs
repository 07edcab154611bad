//! Attach flow: bind the engine to a tab on user request.

use crate::config::Settings;
use crate::engine::{Mode, RecorderWindow, ShowOptions};
use crate::error::Result;
use crate::host::TabId;
use crate::state::Background;

const BLANK_PAGE_URL: &str = "about:blank";

impl Background {
    /// Attach the recorder to `tab`, optionally forcing a mode.
    ///
    /// Re-clicking an already-attached tab with no explicit mode is a no-op.
    /// The side panel must be opened before any engine await so the host
    /// still counts it as part of the originating user gesture, and the
    /// toolbar action stays disabled for the whole fallible body to block
    /// re-entrant double-attach.
    pub async fn attach(&self, tab: TabId, mode: Option<Mode>) -> Result<()> {
        if self.tracker.is_attached(tab) && mode.is_none() {
            return Ok(());
        }

        let settings = self.settings.current();
        if settings.sidepanel {
            if let Err(e) = self.host.open_side_panel(tab).await {
                tracing::warn!("Side panel open for tab {} failed: {}", tab, e);
            }
        }

        let _ = self.host.set_action_enabled(false).await;
        let result = self.attach_with_session(tab, mode, &settings).await;
        // Re-enable on every exit path
        let _ = self.host.set_action_enabled(true).await;
        result
    }

    async fn attach_with_session(
        &self,
        tab: TabId,
        mode: Option<Mode>,
        settings: &Settings,
    ) -> Result<()> {
        let engine = self.session().await?;

        let window = if settings.sidepanel {
            RecorderWindow::Sidepanel
        } else {
            RecorderWindow::Popup
        };

        let attempt = async {
            if engine.is_hidden().await {
                engine
                    .show(ShowOptions {
                        mode: mode.unwrap_or(Mode::None),
                        language: self.tracker.language(),
                        window,
                    })
                    .await?;
            }
            engine.attach(tab).await?;
            // Covers the UI already being visible on another tab in another mode
            if let Some(mode) = mode {
                engine.set_mode(mode).await?;
            }
            Ok::<(), crate::error::TabscribeError>(())
        }
        .await;

        if let Err(e) = attempt {
            // Restricted pages reject the attach; recover on a fresh blank tab
            tracing::warn!(
                "Attach to tab {} failed ({}), falling back to a fresh page",
                tab,
                e
            );
            let fresh = self.host.create_tab(BLANK_PAGE_URL).await?;
            engine.attach(fresh).await?;
            if let Some(mode) = mode {
                engine.set_mode(mode).await?;
            }
        }

        Ok(())
    }
}
