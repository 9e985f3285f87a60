//! Flat-file backend: a directory of Parquet or CSV exports

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use shared::models::RawForecastRow;
use shared::snapshot::MetricSchema;

use super::parquet_file::parse_parquet;
use super::{ForecastSource, SourceBatch, SourceError};

/// Formats a forecast export can be stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Parquet,
    Csv,
}

impl FileFormat {
    /// Format from a file name or object key extension
    pub fn detect(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        if ext.eq_ignore_ascii_case("parquet") {
            Some(FileFormat::Parquet)
        } else if ext.eq_ignore_ascii_case("csv") {
            Some(FileFormat::Csv)
        } else {
            None
        }
    }

    /// Decode one whole file; `name` labels errors
    pub fn decode(self, name: &str, data: Bytes) -> Result<SourceBatch, SourceError> {
        match self {
            FileFormat::Parquet => parse_parquet(data).map_err(|source| SourceError::Parquet {
                file: name.to_string(),
                source,
            }),
            FileFormat::Csv => parse_csv(data.as_ref()).map_err(|source| SourceError::Csv {
                file: name.to_string(),
                source,
            }),
        }
    }
}

/// Reads every `*.parquet` and `*.csv` file in a directory, in file name order
#[derive(Debug, Clone)]
pub struct FileDirectorySource {
    dir: PathBuf,
}

impl FileDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ForecastSource for FileDirectorySource {
    fn name(&self) -> &'static str {
        "files"
    }

    async fn load_snapshot(&self) -> Result<SourceBatch, SourceError> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || load_directory(&dir))
            .await
            .map_err(|e| SourceError::Task(e.to_string()))?
    }
}

/// Load and concatenate all forecast files in `dir`.
///
/// The schema is the set of metric columns present in every file.
pub fn load_directory(dir: &Path) -> Result<SourceBatch, SourceError> {
    if !dir.is_dir() {
        tracing::warn!(path = %dir.display(), "Data directory not found, serving no forecasts");
        return Ok(SourceBatch::empty());
    }

    let mut files: Vec<(PathBuf, FileFormat)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let format = FileFormat::detect(path.file_name()?.to_str()?)?;
            Some((path, format))
        })
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));

    if files.is_empty() {
        tracing::warn!(path = %dir.display(), "No forecast files in data directory");
        return Ok(SourceBatch::empty());
    }

    let mut batches = Vec::with_capacity(files.len());
    for (path, format) in files {
        let data = Bytes::from(std::fs::read(&path)?);
        let batch = format.decode(&path.display().to_string(), data)?;
        tracing::debug!(file = %path.display(), rows = batch.rows.len(), "Read forecast file");
        batches.push(batch);
    }

    Ok(SourceBatch::concat(batches))
}

/// Parse one CSV document with a header row
pub fn parse_csv<R: Read>(reader: R) -> Result<SourceBatch, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = MetricSchema::from_columns(reader.headers()?.iter());
    let rows = reader
        .deserialize::<RawForecastRow>()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SourceBatch { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::MetricName;

    const SAMPLE: &str = "\
grid_id,latitude,longitude,country_id,admin_1_id,month,map,prob_1
101,2.25,32.75,800,,2024-01,12.5,0.4
102,2.75,32.75,800,UG-N,2024-02,,0.1
";

    #[test]
    fn test_parse_csv_rows_and_columns() {
        let batch = parse_csv(SAMPLE.as_bytes()).unwrap();

        let columns: Vec<MetricName> = batch.columns.columns().collect();
        assert_eq!(columns, vec![MetricName::Map, MetricName::Prob1]);

        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.rows[0].grid_id, 101);
        assert_eq!(batch.rows[0].country_id, "800");
        assert_eq!(batch.rows[0].map, Some(12.5));
        assert_eq!(batch.rows[0].admin_1_id, None);
        assert_eq!(batch.rows[1].map, None);
        assert_eq!(batch.rows[1].admin_1_id.as_deref(), Some("UG-N"));
        assert_eq!(batch.rows[1].prob_10, None);
    }

    #[test]
    fn test_parse_csv_keeps_leading_zeros_in_country() {
        let csv = "grid_id,latitude,longitude,country_id,month,map\n7,1.0,1.0,074,2024-03,3.0\n";
        let batch = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(batch.rows[0].country_id, "074");
    }

    #[test]
    fn test_parse_csv_rejects_bad_number() {
        let csv = "grid_id,latitude,longitude,country_id,month\nabc,1.0,1.0,800,2024-01\n";
        assert!(parse_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(FileFormat::detect("forecasts.parquet"), Some(FileFormat::Parquet));
        assert_eq!(FileFormat::detect("api_ready/2024.PARQUET"), Some(FileFormat::Parquet));
        assert_eq!(FileFormat::detect("forecasts_2024.csv"), Some(FileFormat::Csv));
        assert_eq!(FileFormat::detect("notes.txt"), None);
        assert_eq!(FileFormat::detect("parquet"), None);
    }

    #[test]
    fn test_decode_labels_errors_with_file_name() {
        let err = FileFormat::Parquet
            .decode("broken.parquet", Bytes::from_static(b"not parquet"))
            .unwrap_err();
        assert!(err.to_string().contains("broken.parquet"));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let batch = load_directory(Path::new("/nonexistent/forecast/data")).unwrap();
        assert!(batch.rows.is_empty());
    }
}
