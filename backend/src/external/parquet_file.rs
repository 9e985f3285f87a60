//! Decoding Parquet forecast exports through Arrow record batches
//!
//! Column types are normalized with Arrow casts, so exports written with
//! `int32` ids, `float32` coordinates or date-typed months decode the same
//! way as the canonical `int64` / `float64` / `YYYY-MM` layout. Integer
//! country codes are zero-padded to three digits.

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{ArrowPrimitiveType, DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::errors::ParquetError;
use shared::models::{MetricName, RawForecastRow};
use shared::snapshot::MetricSchema;

use super::{SourceBatch, REQUIRED_COLUMNS};

/// Parse one Parquet file held in memory
pub fn parse_parquet(data: Bytes) -> Result<SourceBatch, ParquetError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(data)?;
    let schema = builder.schema().clone();

    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !names.contains(*c)) {
        return Err(ParquetError::General(format!("missing column '{}'", missing)));
    }
    let columns = MetricSchema::from_columns(&names);

    let mut rows = Vec::new();
    for batch in builder.build()? {
        decode_batch(&batch?, &columns, &mut rows)?;
    }

    Ok(SourceBatch { columns, rows })
}

fn decode_batch(
    batch: &RecordBatch,
    columns: &MetricSchema,
    rows: &mut Vec<RawForecastRow>,
) -> Result<(), ParquetError> {
    let grid_ids = primitive_values::<Int64Type>(column(batch, "grid_id")?, &DataType::Int64)?;
    let latitudes = primitive_values::<Float64Type>(column(batch, "latitude")?, &DataType::Float64)?;
    let longitudes = primitive_values::<Float64Type>(column(batch, "longitude")?, &DataType::Float64)?;
    let countries = country_values(column(batch, "country_id")?)?;
    let months = month_values(column(batch, "month")?)?;
    let admin_1 = optional_text(batch, "admin_1_id")?;
    let admin_2 = optional_text(batch, "admin_2_id")?;

    let metrics: Vec<(MetricName, Vec<Option<f64>>)> = columns
        .columns()
        .map(|metric| -> Result<_, ParquetError> {
            let values = primitive_values::<Float64Type>(
                column(batch, metric.as_str())?,
                &DataType::Float64,
            )?;
            Ok((metric, values))
        })
        .collect::<Result<_, _>>()?;

    let offset = rows.len();
    for i in 0..batch.num_rows() {
        let row = offset + i;
        let mut raw = RawForecastRow {
            grid_id: required(grid_ids[i], "grid_id", row)?,
            latitude: required(latitudes[i], "latitude", row)?,
            longitude: required(longitudes[i], "longitude", row)?,
            country_id: required(countries[i].clone(), "country_id", row)?,
            admin_1_id: admin_1.as_ref().and_then(|values| values[i].clone()),
            admin_2_id: admin_2.as_ref().and_then(|values| values[i].clone()),
            month: required(months[i].clone(), "month", row)?,
            ..Default::default()
        };
        for (metric, values) in &metrics {
            raw.set_metric(*metric, values[i]);
        }
        rows.push(raw);
    }

    Ok(())
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef, ParquetError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| ParquetError::General(format!("missing column '{}'", name)))
}

fn required<T>(value: Option<T>, name: &str, row: usize) -> Result<T, ParquetError> {
    value.ok_or_else(|| ParquetError::General(format!("null '{}' in row {}", name, row)))
}

fn primitive_values<T: ArrowPrimitiveType>(
    array: &ArrayRef,
    to: &DataType,
) -> Result<Vec<Option<T::Native>>, ParquetError> {
    let array = cast(array.as_ref(), to)?;
    Ok(array.as_primitive::<T>().iter().collect())
}

fn text_values(array: &ArrayRef) -> Result<Vec<Option<String>>, ParquetError> {
    let array = cast(array.as_ref(), &DataType::Utf8)?;
    Ok(array
        .as_string::<i32>()
        .iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

fn optional_text(batch: &RecordBatch, name: &str) -> Result<Option<Vec<Option<String>>>, ParquetError> {
    batch.column_by_name(name).map(text_values).transpose()
}

fn country_values(array: &ArrayRef) -> Result<Vec<Option<String>>, ParquetError> {
    if !array.data_type().is_integer() {
        return text_values(array);
    }
    let codes = primitive_values::<Int64Type>(array, &DataType::Int64)?;
    Ok(codes
        .into_iter()
        .map(|code| code.map(|c| format!("{:03}", c)))
        .collect())
}

/// Date and timestamp months keep their `YYYY-MM` prefix
fn month_values(array: &ArrayRef) -> Result<Vec<Option<String>>, ParquetError> {
    let temporal = array.data_type().is_temporal();
    let values = text_values(array)?;
    if !temporal {
        return Ok(values);
    }
    Ok(values
        .into_iter()
        .map(|m| m.map(|m| m.chars().take(7).collect()))
        .collect())
}
