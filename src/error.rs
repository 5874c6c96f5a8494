use arrow::error::ArrowError;
use thiserror::Error;

/// Errors raised at the record-source boundary.
///
/// Aggregation functions never return these: they recover locally and hand
/// back an empty table instead.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("unknown state code: {0:?}")]
    UnknownState(String),

    #[error("unknown region or state label: {0:?}")]
    UnknownLabel(String),

    #[error("unknown statistic: {0:?}")]
    UnknownStatistic(String),

    #[error(transparent)]
    Arrow(#[from] ArrowError),
}
