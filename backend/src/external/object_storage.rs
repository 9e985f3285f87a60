//! Object-storage backend: forecast exports in an S3 bucket
//!
//! Either a single configured object key is read, or every `*.parquet` /
//! `*.csv` object under the key prefix. Listing streams every page of the
//! bucket listing, following continuation tokens until the prefix is
//! exhausted.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::ObjectStore;

use super::files::FileFormat;
use super::{ForecastSource, SourceBatch, SourceError};
use crate::config::S3Config;

#[derive(Debug, Clone)]
enum Objects {
    Key(Path),
    Prefix(Option<Path>),
}

pub struct ObjectStoreSource {
    store: Arc<dyn ObjectStore>,
    objects: Objects,
}

impl ObjectStoreSource {
    /// Read `key` when given, otherwise everything under `prefix`
    pub fn new(store: Arc<dyn ObjectStore>, prefix: &str, key: Option<&str>) -> Self {
        let objects = match key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => Objects::Key(Path::from(key)),
            None => {
                let prefix = prefix.trim_matches('/');
                Objects::Prefix((!prefix.is_empty()).then(|| Path::from(prefix)))
            }
        };
        Self { store, objects }
    }

    /// S3 bucket from configuration; credentials not configured are taken from the `AWS_*` environment
    pub fn s3(settings: &S3Config) -> Result<Self, SourceError> {
        let bucket = settings
            .bucket
            .as_deref()
            .ok_or(SourceError::NotConfigured("data.s3.bucket"))?;

        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(&settings.region);

        if let Some(key) = &settings.access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(secret) = &settings.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(endpoint) = settings.endpoint.as_deref().filter(|e| !e.is_empty()) {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder.build()?;
        tracing::info!(
            bucket,
            region = %settings.region,
            prefix = %settings.prefix,
            "Configured S3 forecast store"
        );

        Ok(Self::new(
            Arc::new(store),
            &settings.prefix,
            settings.key.as_deref(),
        ))
    }

    /// Object keys to read, in key order
    pub async fn object_keys(&self) -> Result<Vec<Path>, SourceError> {
        let prefix = match &self.objects {
            Objects::Key(key) => return Ok(vec![key.clone()]),
            Objects::Prefix(prefix) => prefix.as_ref(),
        };

        let mut listing = self.store.list(prefix);
        let mut keys = Vec::new();
        while let Some(meta) = listing.try_next().await? {
            if FileFormat::detect(meta.location.as_ref()).is_some() {
                keys.push(meta.location);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl ForecastSource for ObjectStoreSource {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn load_snapshot(&self) -> Result<SourceBatch, SourceError> {
        let keys = self.object_keys().await?;
        if keys.is_empty() {
            tracing::warn!(objects = ?self.objects, "No forecast objects found, serving no forecasts");
            return Ok(SourceBatch::empty());
        }

        let mut batches = Vec::with_capacity(keys.len());
        for key in keys {
            let name = key.to_string();
            let format = FileFormat::detect(&name).unwrap_or(FileFormat::Parquet);
            let data = self.store.get(&key).await?.bytes().await?;
            let batch = format.decode(&name, data)?;
            tracing::debug!(object = %name, rows = batch.rows.len(), "Read forecast object");
            batches.push(batch);
        }

        Ok(SourceBatch::concat(batches))
    }
}
