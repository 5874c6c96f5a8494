//! Memory-aware column type optimization for the record table.
//!
//! Narrows each column of a `RecordBatch` to the smallest representation
//! that holds its observed values:
//!
//! | column                         | becomes                         |
//! |--------------------------------|---------------------------------|
//! | integer, min ≥ 0               | smallest of u8 / u16 / u32 / u64 |
//! | integer, min < 0               | smallest of i8 / i16 / i32 / i64 |
//! | f64 named like a score         | f32                              |
//! | string, distinct/rows < ratio  | dictionary(i32 → string)         |
//!
//! Row count, column order, names and nulls never change, and optimizing an
//! optimized batch returns it unchanged.

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, GenericStringArray, OffsetSizeTrait, PrimitiveArray};
use arrow::compute::{cast, max, min};
use arrow::datatypes::{
    ArrowNumericType, DataType, Field, FieldRef, Int16Type, Int32Type, Int64Type, Int8Type, Schema,
    UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::config::OptimizerConfig;
use crate::error::PanelError;

/// Return a copy of `batch` with every column narrowed where possible.
pub fn optimize(batch: &RecordBatch, config: &OptimizerConfig) -> Result<RecordBatch, PanelError> {
    let schema = batch.schema();
    let mut fields: Vec<FieldRef> = Vec::with_capacity(batch.num_columns());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        match target_type(field, column, config) {
            Some(target) if &target != column.data_type() => {
                log::debug!("{}: {} -> {}", field.name(), column.data_type(), target);
                columns.push(cast(column, &target)?);
                fields.push(Arc::new(field.as_ref().clone().with_data_type(target)));
            }
            _ => {
                columns.push(Arc::clone(column));
                fields.push(Arc::clone(field));
            }
        }
    }

    let schema = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
    let optimized = RecordBatch::try_new_with_options(schema, columns, &options)?;

    log::debug!(
        "optimized {} rows: {} -> {} bytes",
        batch.num_rows(),
        memory_footprint(batch),
        memory_footprint(&optimized)
    );
    Ok(optimized)
}

/// In-memory size of every column buffer in the batch.
pub fn memory_footprint(batch: &RecordBatch) -> usize {
    batch.get_array_memory_size()
}

fn target_type(field: &Field, column: &ArrayRef, config: &OptimizerConfig) -> Option<DataType> {
    match column.data_type() {
        dt if dt.is_integer() => integer_range(column).map(|(lo, hi)| narrowest_integer(lo, hi)),
        DataType::Float64 if field.name().starts_with(&config.score_prefix) => {
            Some(DataType::Float32)
        }
        DataType::Utf8 => is_categorical(column.as_string::<i32>(), config.categorical_ratio)
            .then(|| dictionary_of(DataType::Utf8)),
        DataType::LargeUtf8 => is_categorical(column.as_string::<i64>(), config.categorical_ratio)
            .then(|| dictionary_of(DataType::LargeUtf8)),
        _ => None,
    }
}

// -- integers --

/// Observed (min, max) over non-null values; `None` for empty or all-null.
fn integer_range(column: &ArrayRef) -> Option<(i128, i128)> {
    match column.data_type() {
        DataType::Int8 => range_of(column.as_primitive::<Int8Type>()),
        DataType::Int16 => range_of(column.as_primitive::<Int16Type>()),
        DataType::Int32 => range_of(column.as_primitive::<Int32Type>()),
        DataType::Int64 => range_of(column.as_primitive::<Int64Type>()),
        DataType::UInt8 => range_of(column.as_primitive::<UInt8Type>()),
        DataType::UInt16 => range_of(column.as_primitive::<UInt16Type>()),
        DataType::UInt32 => range_of(column.as_primitive::<UInt32Type>()),
        DataType::UInt64 => range_of(column.as_primitive::<UInt64Type>()),
        _ => None,
    }
}

fn range_of<T>(array: &PrimitiveArray<T>) -> Option<(i128, i128)>
where
    T: ArrowNumericType,
    T::Native: Into<i128>,
{
    Some((min(array)?.into(), max(array)?.into()))
}

fn narrowest_integer(lo: i128, hi: i128) -> DataType {
    if lo >= 0 {
        if hi <= u8::MAX as i128 {
            DataType::UInt8
        } else if hi <= u16::MAX as i128 {
            DataType::UInt16
        } else if hi <= u32::MAX as i128 {
            DataType::UInt32
        } else {
            DataType::UInt64
        }
    } else if lo >= i8::MIN as i128 && hi <= i8::MAX as i128 {
        DataType::Int8
    } else if lo >= i16::MIN as i128 && hi <= i16::MAX as i128 {
        DataType::Int16
    } else if lo >= i32::MIN as i128 && hi <= i32::MAX as i128 {
        DataType::Int32
    } else {
        DataType::Int64
    }
}

// -- strings --

fn is_categorical<O: OffsetSizeTrait>(array: &GenericStringArray<O>, ratio: f64) -> bool {
    if array.is_empty() {
        return false;
    }
    let distinct: HashSet<&str> = array.iter().flatten().collect();
    (distinct.len() as f64 / array.len() as f64) < ratio
}

fn dictionary_of(values: DataType) -> DataType {
    DataType::Dictionary(Box::new(DataType::Int32), Box::new(values))
}
