//! Mock engine, host and telemetry sink for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tabscribe::{
    Background, Engine, EngineEvent, EngineFactory, Host, HostEvent, IndicatorState, Mode, Result,
    Settings, SettingsStore, ShowOptions, StorageState, TabId, TabInfo, TabscribeError, Telemetry,
    TelemetrySink,
};
use tokio::sync::{broadcast, oneshot};

/// Opt-in log output while debugging a test run.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Wait for a background task or fire-and-forget flow to hit the mocks.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

pub struct MockEngine {
    pub events: broadcast::Sender<EngineEvent>,
    pub shows: Mutex<Vec<ShowOptions>>,
    pub attach_calls: Mutex<Vec<TabId>>,
    pub detach_calls: Mutex<Vec<TabId>>,
    pub mode_calls: Mutex<Vec<Mode>>,
    pub eval_calls: Mutex<Vec<(TabId, String)>>,
    pub click_calls: Mutex<Vec<(TabId, String)>>,
    pub test_id_attributes: Mutex<Vec<String>>,
    pub hidden: AtomicBool,
    /// Tabs for which attach fails (simulates restricted pages).
    pub fail_attach: Mutex<HashSet<TabId>>,
    /// Make eval fail (simulates a helper tab gone mid-sequence).
    pub fail_eval: AtomicBool,
    pub storage: Mutex<StorageState>,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            events,
            shows: Mutex::new(Vec::new()),
            attach_calls: Mutex::new(Vec::new()),
            detach_calls: Mutex::new(Vec::new()),
            mode_calls: Mutex::new(Vec::new()),
            eval_calls: Mutex::new(Vec::new()),
            click_calls: Mutex::new(Vec::new()),
            test_id_attributes: Mutex::new(Vec::new()),
            hidden: AtomicBool::new(true),
            fail_attach: Mutex::new(HashSet::new()),
            fail_eval: AtomicBool::new(false),
            storage: Mutex::new(StorageState::default()),
        })
    }
}

#[async_trait]
impl Engine for MockEngine {
    async fn show(&self, options: ShowOptions) -> Result<()> {
        self.shows.lock().push(options);
        self.hidden.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
    }

    async fn attach(&self, tab: TabId) -> Result<()> {
        if self.fail_attach.lock().contains(&tab) {
            return Err(TabscribeError::Engine(format!("cannot attach to {}", tab)));
        }
        self.attach_calls.lock().push(tab);
        Ok(())
    }

    async fn detach(&self, tab: TabId) -> Result<()> {
        self.detach_calls.lock().push(tab);
        Ok(())
    }

    async fn set_mode(&self, mode: Mode) -> Result<()> {
        self.mode_calls.lock().push(mode);
        Ok(())
    }

    async fn set_test_id_attribute(&self, name: &str) -> Result<()> {
        self.test_id_attributes.lock().push(name.to_string());
        Ok(())
    }

    async fn eval(&self, tab: TabId, expression: &str) -> Result<serde_json::Value> {
        if self.fail_eval.load(Ordering::SeqCst) {
            return Err(TabscribeError::Engine(format!("eval failed in {}", tab)));
        }
        self.eval_calls.lock().push((tab, expression.to_string()));
        Ok(serde_json::Value::Null)
    }

    async fn click(&self, tab: TabId, selector: &str) -> Result<()> {
        self.click_calls.lock().push((tab, selector.to_string()));
        Ok(())
    }

    async fn storage_state(&self) -> Result<StorageState> {
        Ok(self.storage.lock().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}

pub struct MockFactory {
    pub engine: Arc<MockEngine>,
    pub starts: AtomicUsize,
    pub start_delay: Option<Duration>,
}

impl MockFactory {
    pub fn new(engine: Arc<MockEngine>, start_delay: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            engine,
            starts: AtomicUsize::new(0),
            start_delay,
        })
    }
}

#[async_trait]
impl EngineFactory for MockFactory {
    async fn start(&self) -> Result<Arc<dyn Engine>> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.start_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.engine.clone())
    }
}

pub struct MockHost {
    pub events: broadcast::Sender<HostEvent>,
    pub created: Mutex<Vec<String>>,
    next_tab: AtomicI64,
    pub closed: Mutex<Vec<TabId>>,
    pub indicators: Mutex<Vec<(TabId, IndicatorState)>>,
    pub action_enabled: Mutex<Vec<bool>>,
    pub side_panel_opens: Mutex<Vec<TabId>>,
    pub tab_infos: Mutex<HashMap<TabId, TabInfo>>,
}

impl MockHost {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            events,
            created: Mutex::new(Vec::new()),
            next_tab: AtomicI64::new(1000),
            closed: Mutex::new(Vec::new()),
            indicators: Mutex::new(Vec::new()),
            action_enabled: Mutex::new(Vec::new()),
            side_panel_opens: Mutex::new(Vec::new()),
            tab_infos: Mutex::new(HashMap::new()),
        })
    }

    pub fn put_tab_info(&self, tab: TabId, url: &str) {
        self.tab_infos.lock().insert(
            tab,
            TabInfo {
                url: Some(url.to_string()),
                title: Some("Tab".to_string()),
                window_id: Some(1),
                incognito: Some(false),
                status: Some("complete".to_string()),
                index: Some(0),
            },
        );
    }
}

#[async_trait]
impl Host for MockHost {
    async fn tab_info(&self, tab: TabId) -> Result<TabInfo> {
        self.tab_infos
            .lock()
            .get(&tab)
            .cloned()
            .ok_or_else(|| TabscribeError::Host(format!("no such tab {}", tab)))
    }

    async fn create_tab(&self, url: &str) -> Result<TabId> {
        self.created.lock().push(url.to_string());
        Ok(TabId(self.next_tab.fetch_add(1, Ordering::SeqCst)))
    }

    async fn close_tab(&self, tab: TabId) -> Result<()> {
        self.closed.lock().push(tab);
        Ok(())
    }

    async fn set_indicator(&self, tab: TabId, indicator: &IndicatorState) -> Result<()> {
        self.indicators.lock().push((tab, indicator.clone()));
        Ok(())
    }

    async fn set_action_enabled(&self, enabled: bool) -> Result<()> {
        self.action_enabled.lock().push(enabled);
        Ok(())
    }

    async fn open_side_panel(&self, tab: TabId) -> Result<()> {
        self.side_panel_opens.lock().push(tab);
        Ok(())
    }

    async fn watch_close(&self, _tab: TabId) -> Result<oneshot::Receiver<()>> {
        // Helper tabs close themselves immediately in tests
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(());
        Ok(rx)
    }

    fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.events.subscribe()
    }
}

pub struct CollectingSink {
    pub events: Mutex<Vec<serde_json::Value>>,
}

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    /// Events with the given tag, in capture order.
    pub fn of_type(&self, event: &str) -> Vec<serde_json::Value> {
        self.events
            .lock()
            .iter()
            .filter(|e| e["event"] == event)
            .cloned()
            .collect()
    }
}

impl TelemetrySink for CollectingSink {
    fn send(&self, payload: serde_json::Value) {
        self.events.lock().push(payload);
    }
}

pub struct Fixture {
    pub background: Arc<Background>,
    pub engine: Arc<MockEngine>,
    pub host: Arc<MockHost>,
    pub factory: Arc<MockFactory>,
    pub sink: Arc<CollectingSink>,
}

pub fn fixture() -> Fixture {
    fixture_with(Settings::default(), None)
}

pub fn fixture_with(settings: Settings, start_delay: Option<Duration>) -> Fixture {
    let engine = MockEngine::new();
    let host = MockHost::new();
    let factory = MockFactory::new(engine.clone(), start_delay);
    let sink = CollectingSink::new();

    let background = Background::new(
        Arc::new(SettingsStore::in_memory(settings)),
        host.clone(),
        factory.clone(),
        Telemetry::with_sink(sink.clone()),
    );

    Fixture {
        background,
        engine,
        host,
        factory,
        sink,
    }
}
