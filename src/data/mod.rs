//! Data layer: record model, state filtering, and Arrow exchange.
//!
//! Architecture:
//! ```text
//!   record source (RecordBatch)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  batch    │  RecordBatch ⇄ Dataset (microdata column names)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Dataset  │  Vec<Record>, available columns
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterSelection → View (borrowed indices)
//!   └──────────┘
//! ```

pub mod batch;
pub mod filter;
pub mod model;
