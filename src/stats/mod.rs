//! Numeric building blocks: safe scalar statistics, summaries, histograms
//! and mergeable partial aggregates.

mod accumulate;
mod histogram;
mod safe;
mod summary;

pub use accumulate::MeanAccumulator;
pub use histogram::{histogram, Bin};
pub use safe::{compute_named, correlation, valid_score, Statistic};
pub use summary::Summary;
