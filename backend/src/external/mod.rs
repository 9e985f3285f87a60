//! Forecast data sources
//!
//! Every backing store delivers the same thing: flat rows plus the set of
//! metric columns it physically carries.

pub mod database;
pub mod files;
pub mod memory;
pub mod object_storage;
pub mod parquet_file;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use shared::models::RawForecastRow;
use shared::snapshot::MetricSchema;
use thiserror::Error;

use crate::config::{Config, DataBackend};

pub use database::PostgresSource;
pub use files::{FileDirectorySource, FileFormat};
pub use memory::InMemorySource;
pub use object_storage::ObjectStoreSource;
pub use remote::RemoteFileSource;

/// Columns every forecast store must provide
pub const REQUIRED_COLUMNS: [&str; 5] = ["grid_id", "latitude", "longitude", "country_id", "month"];

/// Rows loaded from a source in one pass
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub columns: MetricSchema,
    pub rows: Vec<RawForecastRow>,
}

impl SourceBatch {
    pub fn empty() -> Self {
        Self {
            columns: MetricSchema::all(),
            rows: Vec::new(),
        }
    }

    /// Concatenate batches; the schema keeps the metric columns every batch carries
    pub fn concat(batches: impl IntoIterator<Item = SourceBatch>) -> Self {
        let mut columns: Option<MetricSchema> = None;
        let mut rows = Vec::new();

        for batch in batches {
            columns = Some(match columns {
                Some(existing) => existing.intersect(&batch.columns),
                None => batch.columns,
            });
            rows.extend(batch.rows);
        }

        Self {
            columns: columns.unwrap_or_else(MetricSchema::all),
            rows,
        }
    }
}

/// Errors raised while reading a backing store
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed Parquet in {file}: {source}")]
    Parquet {
        file: String,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Forecast table is missing column '{0}'")]
    MissingColumn(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote object {url} returned status {status}")]
    RemoteStatus { url: String, status: u16 },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Loader task failed: {0}")]
    Task(String),
}

/// A store that can produce the full forecast dataset
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    async fn load_snapshot(&self) -> Result<SourceBatch, SourceError>;
}

/// Build the source selected by `data.backend`
pub fn from_config(config: &Config) -> Result<Arc<dyn ForecastSource>, SourceError> {
    let source: Arc<dyn ForecastSource> = match config.data.backend {
        DataBackend::Files => Arc::new(FileDirectorySource::new(&config.data.path)),
        DataBackend::Database => {
            let url = config
                .data
                .database_url
                .as_deref()
                .ok_or(SourceError::NotConfigured("data.database_url"))?;
            Arc::new(PostgresSource::connect_lazy(url, &config.database)?)
        }
        DataBackend::Remote => {
            let url = config
                .data
                .remote_url
                .as_deref()
                .ok_or(SourceError::NotConfigured("data.remote_url"))?;
            Arc::new(RemoteFileSource::new(url)?)
        }
        DataBackend::S3 => Arc::new(ObjectStoreSource::s3(&config.data.s3)?),
    };
    Ok(source)
}
