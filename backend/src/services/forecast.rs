//! Forecast query service
//!
//! Takes one snapshot per call and runs the shared query engine over it.

use std::sync::Arc;

use shared::models::{
    ForecastSummary, GridCellForecast, GridCellsResponse, MonthMetadata, ValidatedQuery,
};
use shared::snapshot::ForecastSnapshot;
use shared::types::CountryCode;
use shared::{filter, metadata, summary};

use crate::error::{AppError, AppResult};
use crate::services::SnapshotCache;

/// Forecast service for querying the cached dataset
#[derive(Clone)]
pub struct ForecastService {
    cache: Arc<SnapshotCache>,
    expose_error_detail: bool,
}

impl ForecastService {
    pub fn new(cache: Arc<SnapshotCache>, expose_error_detail: bool) -> Self {
        Self {
            cache,
            expose_error_detail,
        }
    }

    async fn snapshot(&self) -> AppResult<Arc<ForecastSnapshot>> {
        self.cache.current().await.map_err(|e| {
            tracing::error!(error = %e, backend = self.cache.source_name(), "Forecast snapshot unavailable");
            AppError::DataUnavailable {
                detail: self.expose_error_detail.then(|| e.to_string()),
            }
        })
    }

    /// Records matching the query, projected to the requested metrics
    pub async fn query(&self, query: &ValidatedQuery) -> AppResult<Vec<GridCellForecast>> {
        let snapshot = self.snapshot().await?;
        let records = filter::evaluate(&snapshot, query).map_err(|e| {
            AppError::internal("Failed to evaluate forecast query", e, self.expose_error_detail)
        })?;

        tracing::debug!(matched = records.len(), total = snapshot.len(), "Forecast query evaluated");
        Ok(records)
    }

    /// Summary statistics over the records matching the query
    pub async fn summary(&self, query: &ValidatedQuery) -> AppResult<ForecastSummary> {
        let records = self.query(query).await?;
        Ok(summary::summarize(&records))
    }

    pub async fn available_months(&self) -> AppResult<Vec<MonthMetadata>> {
        let snapshot = self.snapshot().await?;
        Ok(metadata::available_months(snapshot.records()))
    }

    /// Grid cells, optionally for one country; unfiltered listings also
    /// carry every country. Both come from the same snapshot.
    pub async fn grid_cells(&self, country: Option<&CountryCode>) -> AppResult<GridCellsResponse> {
        let snapshot = self.snapshot().await?;
        let data = metadata::grid_cells(snapshot.records(), country);
        let countries = match country {
            Some(_) => None,
            None => Some(metadata::countries(snapshot.records())),
        };
        Ok(GridCellsResponse {
            count: data.len(),
            data,
            countries,
        })
    }

    pub async fn countries(&self) -> AppResult<Vec<CountryCode>> {
        let snapshot = self.snapshot().await?;
        Ok(metadata::countries(snapshot.records()))
    }

    /// Number of records in the current snapshot
    pub async fn record_count(&self) -> AppResult<usize> {
        Ok(self.snapshot().await?.len())
    }
}
