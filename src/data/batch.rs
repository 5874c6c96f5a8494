//! Conversion between the record model and Arrow record batches.
//!
//! The columnar side is what [`optimize`](crate::optimize::optimize) shrinks;
//! reading accepts any integer, float, string or dictionary encoding of the
//! known columns and ignores everything else.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;

use super::model::{
    Competency, Dataset, ExamDay, Presence, RawValue, Record, RecordSource, StateCode, STATE_COLUMN,
};
use crate::labels::{Coding, Variable};

// ---------------------------------------------------------------------------
// Dataset → RecordBatch
// ---------------------------------------------------------------------------

/// Write every column the dataset provides, in microdata order.
///
/// Scores are `Float64`, numeric codes and presence `Int64`, letter codes and
/// text `Utf8`.
pub fn to_record_batch(dataset: &Dataset) -> Result<RecordBatch> {
    let records = dataset.records();
    let mut fields = vec![Field::new(STATE_COLUMN, DataType::Utf8, false)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(StringArray::from(
        records.iter().map(|r| r.state.as_str()).collect::<Vec<_>>(),
    ))];

    for c in Competency::ALL {
        if !dataset.has_column(c.column()) {
            continue;
        }
        fields.push(Field::new(c.column(), DataType::Float64, true));
        arrays.push(Arc::new(Float64Array::from(
            records.iter().map(|r| r.raw_score(c)).collect::<Vec<_>>(),
        )));
    }

    for v in Variable::ALL {
        if !dataset.has_column(v.column()) {
            continue;
        }
        match v.coding() {
            Coding::Numeric => {
                fields.push(Field::new(v.column(), DataType::Int64, true));
                arrays.push(Arc::new(Int64Array::from(
                    records
                        .iter()
                        .map(|r| match r.attribute(v) {
                            RawValue::Code(code) => Some(*code),
                            _ => None,
                        })
                        .collect::<Vec<_>>(),
                )));
            }
            Coding::Letter | Coding::Textual => {
                fields.push(Field::new(v.column(), DataType::Utf8, true));
                arrays.push(Arc::new(StringArray::from(
                    records
                        .iter()
                        .map(|r| match r.attribute(v) {
                            RawValue::Null => None,
                            other => Some(other.to_string()),
                        })
                        .collect::<Vec<_>>(),
                )));
            }
        }
    }

    for c in Competency::OBJECTIVE {
        let Some(column) = c.presence_column() else { continue };
        if !dataset.has_column(column) {
            continue;
        }
        fields.push(Field::new(column, DataType::Int64, true));
        arrays.push(Arc::new(Int64Array::from(
            records
                .iter()
                .map(|r| r.presence(c.exam_day()).map(Presence::code))
                .collect::<Vec<_>>(),
        )));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).context("building record batch")
}

// ---------------------------------------------------------------------------
// RecordBatch → Dataset
// ---------------------------------------------------------------------------

/// Read a batch into records. `SG_UF_PROVA` is required; every other known
/// column is optional and its absence is reflected in the dataset's columns.
///
/// `Float32` scores are rounded back to one decimal, the precision the
/// microdata is published with.
pub fn from_record_batch(batch: &RecordBatch) -> Result<Dataset> {
    let schema = batch.schema();
    let n_rows = batch.num_rows();

    let state_idx = schema
        .index_of(STATE_COLUMN)
        .map_err(|_| anyhow::anyhow!("record batch missing '{STATE_COLUMN}' column"))?;
    let states = utf8_column(batch.column(state_idx)).context("reading state column")?;

    let mut records = Vec::with_capacity(n_rows);
    for row in 0..n_rows {
        if states.is_null(row) {
            bail!("Row {row}: null {STATE_COLUMN}");
        }
        let state: StateCode = states
            .value(row)
            .parse()
            .with_context(|| format!("Row {row}: invalid {STATE_COLUMN}"))?;
        records.push(Record::new(state));
    }

    let mut columns = vec![STATE_COLUMN.to_string()];

    for c in Competency::ALL {
        let Ok(idx) = schema.index_of(c.column()) else { continue };
        let col = batch.column(idx);
        let narrowed = col.data_type() == &DataType::Float32;
        let values =
            cast(col, &DataType::Float64).with_context(|| format!("reading {}", c.column()))?;
        let values = values.as_primitive::<Float64Type>();
        for (rec, value) in records.iter_mut().zip(values.iter()) {
            if let Some(v) = value {
                rec.scores[c.index()] = Some(if narrowed { round_tenth(v) } else { v });
            }
        }
        columns.push(c.column().to_string());
    }

    for v in Variable::ALL {
        let Ok(idx) = schema.index_of(v.column()) else { continue };
        let col = batch.column(idx);
        match v.coding() {
            Coding::Numeric => {
                let values = cast(col, &DataType::Int64)
                    .with_context(|| format!("reading {}", v.column()))?;
                let values = values.as_primitive::<Int64Type>();
                for (rec, value) in records.iter_mut().zip(values.iter()) {
                    if let Some(code) = value {
                        rec.attributes.insert(v, RawValue::Code(code));
                    }
                }
            }
            Coding::Letter | Coding::Textual => {
                let values = utf8_column(col).with_context(|| format!("reading {}", v.column()))?;
                for (rec, value) in records.iter_mut().zip(values.iter()) {
                    if let Some(text) = value {
                        rec.attributes.insert(v, RawValue::Text(text.to_string()));
                    }
                }
            }
        }
        columns.push(v.column().to_string());
    }

    for day in ExamDay::ALL {
        // Both columns of a day carry the same code; the first non-null wins.
        for column in day.presence_columns() {
            let Ok(idx) = schema.index_of(column) else { continue };
            let values = cast(batch.column(idx), &DataType::Int64)
                .with_context(|| format!("reading {column}"))?;
            let values = values.as_primitive::<Int64Type>();
            for (rec, value) in records.iter_mut().zip(values.iter()) {
                if rec.presence[day.index()].is_none() {
                    rec.presence[day.index()] = value.and_then(Presence::from_code);
                }
            }
            columns.push(column.to_string());
        }
    }

    log::debug!("read {n_rows} records with {} known columns", columns.len());
    Ok(Dataset::new(records, columns))
}

// -- Arrow helpers --

/// Cast any string-like or dictionary-encoded column to `Utf8`.
fn utf8_column(col: &ArrayRef) -> Result<StringArray> {
    let values = cast(col, &DataType::Utf8)
        .with_context(|| format!("casting {:?} to Utf8", col.data_type()))?;
    Ok(values.as_string::<i32>().clone())
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
