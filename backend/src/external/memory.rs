//! Fixed in-memory rows, for embedding and tests

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use shared::models::RawForecastRow;
use shared::snapshot::MetricSchema;

use super::{ForecastSource, SourceBatch, SourceError};

#[derive(Debug)]
pub struct InMemorySource {
    columns: MetricSchema,
    rows: Vec<RawForecastRow>,
    loads: AtomicUsize,
}

impl InMemorySource {
    /// Rows carrying the full metric schema
    pub fn new(rows: Vec<RawForecastRow>) -> Self {
        Self::with_columns(MetricSchema::all(), rows)
    }

    pub fn with_columns(columns: MetricSchema, rows: Vec<RawForecastRow>) -> Self {
        Self {
            columns,
            rows,
            loads: AtomicUsize::new(0),
        }
    }

    /// How many times the rows have been loaded
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ForecastSource for InMemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load_snapshot(&self) -> Result<SourceBatch, SourceError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(SourceBatch {
            columns: self.columns.clone(),
            rows: self.rows.clone(),
        })
    }
}
