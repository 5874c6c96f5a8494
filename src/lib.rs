//! Statistics and chart-ready aggregation tables over ENEM exam microdata.
//!
//! ```text
//!   RecordBatch ──optimize──▶ RecordBatch ──batch──▶ Dataset
//!                                                      │ FilterSelection
//!                                                      ▼
//!                                                    View ──▶ pipeline / crosstab ──▶ rows
//! ```
//!
//! [`panel::Panel`] bundles a dataset, its region map and the current state
//! selection behind one façade.

pub mod config;
pub mod crosstab;
pub mod data;
pub mod error;
pub mod labels;
pub mod optimize;
pub mod panel;
pub mod pipeline;
pub mod regions;
pub mod sample;
pub mod stats;

pub use data::filter::FilterSelection;
pub use data::model::{
    Competency, Dataset, ExamDay, Presence, RawValue, Record, RecordSource, StateCode, View,
};
pub use error::PanelError;
pub use labels::Variable;
pub use panel::Panel;
pub use regions::RegionMap;
