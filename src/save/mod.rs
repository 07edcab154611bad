//! Save flow: persist generated code or storage state to disk through a
//! native save-file dialog.
//!
//! The native picker demands an active user gesture, so the flow drives a
//! short-lived helper tab containing a single link: a one-shot click handler
//! is injected into the page, the engine dispatches a trusted click on the
//! link, and the handler opens the picker, writes the content and closes the
//! tab. Recording is paused for the duration and always restored afterwards.

pub mod storage_state;

pub use storage_state::filter_cookies;

use crate::engine::{Engine, Mode, StorageState};
use crate::error::Result;
use crate::state::Background;
use crate::telemetry::TelemetryEvent;
use url::Url;

/// Helper page with a single anchor, resolved by the host against its asset
/// root.
pub const SAVE_PAGE_PATH: &str = "save.html";

const STORAGE_STATE_FILE_NAME: &str = "storageState.json";

/// Transient save payload from the recorder UI, consumed once.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub content: String,
    pub suggested_name: String,
}

/// One-shot click handler injected into the helper page. Dialog errors
/// (including user cancellation) are swallowed; the tab closes either way.
fn save_click_script(request: &SaveRequest) -> Result<String> {
    let content = serde_json::to_string(&request.content)?;
    let name = serde_json::to_string(&request.suggested_name)?;
    Ok(format!(
        r#"
const link = document.querySelector('a');
link.addEventListener('click', async () => {{
  try {{
    const handle = await window.showSaveFilePicker({{ suggestedName: {name} }});
    const writable = await handle.createWritable();
    await writable.write({content});
    await writable.close();
  }} catch (e) {{
  }}
  window.close();
}}, {{ once: true }});
"#
    ))
}

/// Code-gen language guessed from the suggested file extension, for telemetry.
fn language_for(suggested_name: &str) -> &'static str {
    match suggested_name.rsplit('.').next() {
        Some("ts") => "typescript",
        Some("js" | "mjs") => "javascript",
        Some("py") => "python",
        Some("java") => "java",
        Some("cs") => "csharp",
        Some("json") => "json",
        _ => "unknown",
    }
}

impl Background {
    /// Save generated script code, with usage telemetry derived from it.
    pub async fn save_script(&self, code: String, suggested_name: String) -> Result<()> {
        self.capture(TelemetryEvent::ScriptSaved {
            language: language_for(&suggested_name).to_string(),
            lines: code.lines().count(),
            bytes: code.len(),
        });
        self.do_save(SaveRequest {
            content: code,
            suggested_name,
        })
        .await
    }

    /// Save the engine's storage state, with cookies filtered to the URLs
    /// currently open in attached tabs and origins passed through.
    pub async fn save_storage_state(&self) -> Result<()> {
        let engine = self.session().await?;
        let state = engine.storage_state().await?;

        let mut urls = Vec::new();
        for tab in self.tracker.attached_tabs() {
            // Best-effort; a tab may have closed since it was attached
            let Ok(info) = self.host.tab_info(tab).await else {
                continue;
            };
            if let Some(url) = info.url.as_deref().and_then(|u| Url::parse(u).ok()) {
                urls.push(url);
            }
        }

        let cookies = filter_cookies(state.cookies, &urls);
        self.capture(TelemetryEvent::StorageStateSaved {
            cookies: cookies.len(),
        });

        let document = serde_json::to_string_pretty(&StorageState {
            cookies,
            origins: state.origins,
        })?;

        self.do_save(SaveRequest {
            content: document,
            suggested_name: STORAGE_STATE_FILE_NAME.to_string(),
        })
        .await
    }

    /// Drive the helper-tab save flow, pausing recording for the duration.
    pub async fn do_save(&self, request: SaveRequest) -> Result<()> {
        let engine = self.session().await?;

        // Pause recording so the engine does not interfere with the save UI
        let prior = self.tracker.current_mode();
        engine.set_mode(Mode::None).await?;

        let result = self.drive_save_tab(engine.as_ref(), &request).await;

        // Restore the remembered mode whether or not the dialog completed
        if let Err(e) = engine.set_mode(prior).await {
            tracing::warn!("Failed to restore mode {} after save: {}", prior, e);
        }

        result
    }

    async fn drive_save_tab(&self, engine: &dyn Engine, request: &SaveRequest) -> Result<()> {
        let tab = self.host.create_tab(SAVE_PAGE_PATH).await?;
        // Register the close watch before touching the tab so a fast close
        // cannot be missed
        let closed = self.host.watch_close(tab).await?;

        let driven = async {
            engine.attach(tab).await?;
            engine.eval(tab, &save_click_script(request)?).await?;
            // Trusted click through the engine triggers the real native prompt
            engine.click(tab, "a").await?;
            engine.detach(tab).await?;
            Ok::<(), crate::error::TabscribeError>(())
        }
        .await;

        if let Err(e) = driven {
            // Release the engine before closing so a failed eval/click does
            // not leave an attachment to a gone tab
            let _ = engine.detach(tab).await;
            let _ = self.host.close_tab(tab).await;
            return Err(e);
        }

        // Block until the user closes the helper tab (dialog done or cancelled)
        let _ = closed.await;
        Ok(())
    }
}
