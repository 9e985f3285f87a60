//! Time-to-live cache in front of a forecast source

use std::sync::Arc;
use std::time::{Duration, Instant};

use shared::error::SnapshotError;
use shared::snapshot::ForecastSnapshot;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::external::{ForecastSource, SourceError};

/// Failure to produce a snapshot
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read forecast source: {0}")]
    Source(#[from] SourceError),

    #[error("Forecast data failed validation: {0}")]
    Snapshot(#[from] SnapshotError),
}

struct CachedSnapshot {
    loaded_at: Instant,
    snapshot: Arc<ForecastSnapshot>,
}

/// Hands out immutable snapshots, reloading the source once the TTL lapses.
///
/// The lock is held across a load, so at most one load runs at a time and
/// callers arriving meanwhile receive its result.
pub struct SnapshotCache {
    source: Arc<dyn ForecastSource>,
    ttl: Duration,
    state: Mutex<Option<CachedSnapshot>>,
}

impl SnapshotCache {
    pub fn new(source: Arc<dyn ForecastSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            state: Mutex::new(None),
        }
    }

    /// The current snapshot, loading it if missing or expired
    pub async fn current(&self) -> Result<Arc<ForecastSnapshot>, LoadError> {
        let mut state = self.state.lock().await;

        if let Some(cached) = state.as_ref() {
            if cached.loaded_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&cached.snapshot));
            }
        }

        let started = Instant::now();
        let batch = self.source.load_snapshot().await?;
        let snapshot = Arc::new(ForecastSnapshot::from_rows(batch.columns, batch.rows)?);

        tracing::info!(
            backend = self.source.name(),
            records = snapshot.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Forecast snapshot loaded"
        );

        *state = Some(CachedSnapshot {
            loaded_at: Instant::now(),
            snapshot: Arc::clone(&snapshot),
        });
        Ok(snapshot)
    }

    /// Drop the cached snapshot so the next call reloads
    pub async fn invalidate(&self) {
        *self.state.lock().await = None;
        tracing::debug!("Forecast snapshot invalidated");
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }
}
