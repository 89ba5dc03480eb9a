//! Parquet table reading and ledger writing

use super::cells::{self, RawRow};
use super::{DataError, TableColumns};
use crate::backtest::Ledger;
use crate::intent::{Action, TableError, Timestamp};
use arrow::array::{
    Array, ArrayRef, Decimal128Array, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray, TimestampMicrosecondArray, TimestampMillisecondArray,
    TimestampNanosecondArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, FixedOffset, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rust_decimal::Decimal;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

/// Ledger schema. Decimals are stored as strings to keep exact precision.
pub fn ledger_schema() -> Schema {
    Schema::new(vec![
        Field::new(
            "timestamp",
            DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
            false,
        ),
        Field::new("action", DataType::Utf8, false),
        Field::new("ticker", DataType::Utf8, true),
        Field::new("price", DataType::Utf8, true),
        Field::new("budget", DataType::Utf8, true),
        Field::new("daily_pnl", DataType::Utf8, false),
        Field::new("fund_value", DataType::Utf8, false),
    ])
}

/// Write the ledger to a Parquet file
pub fn write_ledger_parquet(path: &Path, ledger: &Ledger) -> Result<(), DataError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let schema = Arc::new(ledger_schema());
    let file = File::create(path)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    let entries = ledger.entries();
    let timestamps: Vec<i64> = entries
        .iter()
        .map(|e| e.timestamp.timestamp_micros())
        .collect();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    let tickers: Vec<Option<&str>> = entries.iter().map(|e| e.ticker.as_deref()).collect();
    let prices: Vec<Option<String>> = entries
        .iter()
        .map(|e| e.price.map(|p| p.to_string()))
        .collect();
    let budgets: Vec<Option<String>> = entries
        .iter()
        .map(|e| e.running_budget.map(|b| b.to_string()))
        .collect();
    let pnls: Vec<String> = entries.iter().map(|e| e.daily_pnl.to_string()).collect();
    let fund_values: Vec<String> = entries.iter().map(|e| e.fund_value.to_string()).collect();

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(TimestampMicrosecondArray::from(timestamps).with_timezone("UTC")) as ArrayRef,
            Arc::new(StringArray::from(actions)) as ArrayRef,
            Arc::new(StringArray::from(tickers)) as ArrayRef,
            Arc::new(StringArray::from(prices)) as ArrayRef,
            Arc::new(StringArray::from(budgets)) as ArrayRef,
            Arc::new(StringArray::from(pnls)) as ArrayRef,
            Arc::new(StringArray::from(fund_values)) as ArrayRef,
        ],
    )?;

    writer.write(&batch)?;
    writer.close()?;

    tracing::debug!(path = ?path, rows = ledger.len(), "Wrote ledger to Parquet");

    Ok(())
}

pub(super) fn read_rows(path: &Path, columns: &TableColumns) -> Result<Vec<RawRow>, DataError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    // Fail on missing columns even when the file has no rows
    let schema = builder.schema().clone();
    for name in columns.required() {
        if schema.index_of(name).is_err() {
            return Err(TableError::MissingColumn(name.to_string()).into());
        }
    }

    let reader = builder.build()?;
    let mut rows = Vec::new();
    let mut offset = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let column = |name: &str| -> Result<ArrayRef, TableError> {
            batch
                .column_by_name(name)
                .cloned()
                .ok_or_else(|| TableError::MissingColumn(name.to_string()))
        };

        let timestamps = column(&columns.timestamp)?;
        let prices = column(&columns.price)?;
        let tickers = columns.ticker.as_deref().map(column).transpose()?;
        let actions = columns.action.as_deref().map(column).transpose()?;
        let scores = columns.score.as_deref().map(column).transpose()?;

        for i in 0..batch.num_rows() {
            let row = offset + i + 1;

            let timestamp = cells::require(
                timestamp_cell(&timestamps, i, row, &columns.timestamp)?,
                row,
                &columns.timestamp,
            )?;
            let price = cells::require(
                price_cell(&prices, i, row, &columns.price)?,
                row,
                &columns.price,
            )?;
            let ticker = match (&tickers, columns.ticker.as_deref()) {
                (Some(array), Some(name)) => Some(cells::require(
                    string_cell(array, i, name)?.filter(|s| !s.is_empty()),
                    row,
                    name,
                )?),
                _ => None,
            };
            let action = match (&actions, columns.action.as_deref()) {
                (Some(array), Some(name)) => Action::parse(string_cell(array, i, name)?.as_deref()),
                _ => Action::None,
            };
            let score = match (&scores, columns.score.as_deref()) {
                (Some(array), Some(name)) => float_cell(array, i, row, name)?,
                _ => None,
            };

            rows.push(RawRow {
                timestamp,
                ticker,
                price,
                action,
                score,
            });
        }
        offset += batch.num_rows();
    }

    Ok(rows)
}

fn unsupported(column: &str, data_type: &DataType) -> TableError {
    TableError::UnsupportedColumnType {
        column: column.to_string(),
        found: format!("{data_type:?}"),
    }
}

fn downcast<'a, T: 'static>(array: &'a ArrayRef, column: &str) -> Result<&'a T, TableError> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| unsupported(column, array.data_type()))
}

fn string_cell(array: &ArrayRef, i: usize, column: &str) -> Result<Option<String>, TableError> {
    if array.is_null(i) {
        return Ok(None);
    }
    let value = match array.data_type() {
        DataType::Utf8 => downcast::<StringArray>(array, column)?.value(i),
        DataType::LargeUtf8 => downcast::<LargeStringArray>(array, column)?.value(i),
        other => return Err(unsupported(column, other)),
    };
    Ok(Some(value.trim().to_string()))
}

fn timestamp_cell(
    array: &ArrayRef,
    i: usize,
    row: usize,
    column: &str,
) -> Result<Option<Timestamp>, TableError> {
    if array.is_null(i) {
        return Ok(None);
    }
    let (unit, tz) = match array.data_type() {
        DataType::Timestamp(unit, tz) => (*unit, tz.clone()),
        DataType::Utf8 | DataType::LargeUtf8 => {
            return match string_cell(array, i, column)? {
                Some(raw) => cells::timestamp_from_str(&raw, row).map(Some),
                None => Ok(None),
            };
        }
        other => return Err(unsupported(column, other)),
    };

    let utc = match unit {
        TimeUnit::Second => {
            DateTime::from_timestamp(downcast::<TimestampSecondArray>(array, column)?.value(i), 0)
        }
        TimeUnit::Millisecond => DateTime::from_timestamp_millis(
            downcast::<TimestampMillisecondArray>(array, column)?.value(i),
        ),
        TimeUnit::Microsecond => DateTime::from_timestamp_micros(
            downcast::<TimestampMicrosecondArray>(array, column)?.value(i),
        ),
        TimeUnit::Nanosecond => Some(DateTime::from_timestamp_nanos(
            downcast::<TimestampNanosecondArray>(array, column)?.value(i),
        )),
    }
    .ok_or_else(|| TableError::UnparseableTimestamp {
        row,
        value: format!("{unit:?} out of range"),
    })?;

    localize(utc, tz.as_deref(), column).map(Some)
}

/// Attach the column's timezone so the local trading date is preserved.
/// Timezone-less columns are read as UTC.
fn localize(utc: DateTime<Utc>, tz: Option<&str>, column: &str) -> Result<Timestamp, TableError> {
    let Some(tz) = tz else {
        return Ok(utc.fixed_offset());
    };
    if let Ok(offset) = tz.parse::<FixedOffset>() {
        return Ok(utc.with_timezone(&offset));
    }
    tz.parse::<chrono_tz::Tz>()
        .map(|zone| utc.with_timezone(&zone).fixed_offset())
        .map_err(|_| TableError::UnsupportedColumnType {
            column: column.to_string(),
            found: format!("Timestamp with timezone {tz}"),
        })
}

fn price_cell(
    array: &ArrayRef,
    i: usize,
    row: usize,
    column: &str,
) -> Result<Option<Decimal>, TableError> {
    if array.is_null(i) {
        return Ok(None);
    }
    let price = match array.data_type() {
        DataType::Float64 => {
            cells::price_from_f64(downcast::<Float64Array>(array, column)?.value(i), row, column)?
        }
        DataType::Float32 => cells::price_from_f64(
            f64::from(downcast::<Float32Array>(array, column)?.value(i)),
            row,
            column,
        )?,
        DataType::Int64 => cells::positive(
            Decimal::from(downcast::<Int64Array>(array, column)?.value(i)),
            row,
            column,
        )?,
        DataType::Int32 => cells::positive(
            Decimal::from(downcast::<Int32Array>(array, column)?.value(i)),
            row,
            column,
        )?,
        DataType::Decimal128(_, scale) => {
            let raw = downcast::<Decimal128Array>(array, column)?.value(i);
            let scale = u32::try_from(*scale).map_err(|_| unsupported(column, array.data_type()))?;
            let value = Decimal::try_from_i128_with_scale(raw, scale)
                .map_err(|_| unsupported(column, array.data_type()))?;
            cells::positive(value, row, column)?
        }
        DataType::Utf8 | DataType::LargeUtf8 => match string_cell(array, i, column)? {
            Some(raw) if !raw.is_empty() => cells::price_from_str(&raw, row, column)?,
            _ => return Ok(None),
        },
        other => return Err(unsupported(column, other)),
    };
    Ok(Some(price))
}

fn float_cell(
    array: &ArrayRef,
    i: usize,
    row: usize,
    column: &str,
) -> Result<Option<f64>, TableError> {
    if array.is_null(i) {
        return Ok(None);
    }
    match array.data_type() {
        DataType::Float64 => Ok(Some(downcast::<Float64Array>(array, column)?.value(i))),
        DataType::Float32 => Ok(Some(f64::from(
            downcast::<Float32Array>(array, column)?.value(i),
        ))),
        DataType::Utf8 | DataType::LargeUtf8 => {
            let raw = string_cell(array, i, column)?;
            cells::score_from_str(raw.as_deref(), row, column)
        }
        other => Err(unsupported(column, other)),
    }
}
