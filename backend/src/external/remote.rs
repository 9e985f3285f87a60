//! Remote backend: one forecast export fetched over HTTP(S)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::files::FileFormat;
use super::{ForecastSource, SourceBatch, SourceError};

#[derive(Clone)]
pub struct RemoteFileSource {
    client: Client,
    url: String,
    format: FileFormat,
}

impl RemoteFileSource {
    /// The format follows the URL path extension; anything else is read as CSV
    pub fn new(url: &str) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        let path = url.split(['?', '#']).next().unwrap_or(url);
        Ok(Self {
            client,
            url: url.to_string(),
            format: FileFormat::detect(path).unwrap_or(FileFormat::Csv),
        })
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }
}

#[async_trait]
impl ForecastSource for RemoteFileSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn load_snapshot(&self) -> Result<SourceBatch, SourceError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::RemoteStatus {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        self.format.decode(&self.url, body)
    }
}
