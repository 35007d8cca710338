//! Process-scoped application state.
//!
//! Everything a handler needs arrives through this struct — no ambient
//! globals. Lifecycle is tied to process start/stop in `main`.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use lintel_core::config::LintelConfig;
use lintel_core::errors::ConfigError;
use lintel_core::events::EventDispatcher;
use lintel_engine::CycleRunner;
use lintel_storage::DatabaseManager;

use crate::telemetry::TracingEventHandler;

/// Shared state cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub config: Arc<LintelConfig>,
    pub runner: Arc<CycleRunner>,
    pub dispatcher: Arc<EventDispatcher>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Build state from config: open the database, wire the event
    /// dispatcher, construct the cycle runner. Fails fast when the
    /// signing secret is absent — the server must not start open.
    pub fn from_config(config: LintelConfig) -> Result<Self, StateError> {
        if config.auth.jwt_secret.as_deref().unwrap_or("").is_empty() {
            return Err(StateError::Config(ConfigError::ValidationFailed {
                field: "auth.jwt_secret".to_string(),
                message: "required (set LINTEL_AUTH_JWT_SECRET)".to_string(),
            }));
        }

        let db = Arc::new(DatabaseManager::open(&config.database.path())?);
        Ok(Self::assemble(config, db))
    }

    /// State over an in-memory database (for tests).
    pub fn in_memory(config: LintelConfig) -> Result<Self, StateError> {
        let db = Arc::new(DatabaseManager::open_in_memory()?);
        Ok(Self::assemble(config, db))
    }

    fn assemble(config: LintelConfig, db: Arc<DatabaseManager>) -> Self {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(Arc::new(TracingEventHandler));
        let dispatcher = Arc::new(dispatcher);

        let runner = Arc::new(CycleRunner::new(
            db.clone(),
            dispatcher.clone(),
            Duration::from_secs(config.evaluator.cycle_timeout_secs()),
        ));

        Self {
            db,
            config: Arc::new(config),
            runner,
            dispatcher,
            metrics: Arc::new(Metrics::default()),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        self.config.auth.jwt_secret.as_deref().unwrap_or("")
    }

    pub fn leeway_secs(&self) -> u64 {
        self.config.auth.leeway_secs()
    }

    /// Where the database lives (for logging at startup).
    pub fn database_path(&self) -> String {
        self.db
            .path()
            .map(Path::to_path_buf)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string())
    }
}

/// Errors building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] lintel_core::errors::StorageError),
}

/// Placeholder process counters surfaced at /validation/metrics.
#[derive(Debug, Default)]
pub struct Metrics {
    requests: AtomicU64,
    cycles_run: AtomicU64,
    issues_found: AtomicU64,
}

impl Metrics {
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cycle(&self, issues: u64) {
        self.cycles_run.fetch_add(1, Ordering::Relaxed);
        self.issues_found.fetch_add(issues, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            cycles_run: self.cycles_run.load(Ordering::Relaxed),
            issues_found: self.issues_found.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub cycles_run: u64,
    pub issues_found: u64,
}
