//! Chart-ready aggregation pipelines.
//!
//! Every pipeline takes a filtered [`View`](crate::data::model::View) and
//! returns plain serializable rows. A missing column or an empty view yields
//! an empty result instead of an error.
//!
//! ```text
//!   View ──┬── means::mean_table          (group, competency, mean)
//!          ├── categories::category_means (category, competency, mean)
//!          ├── absence::absence_table     (state, component, percent)
//!          ├── scatter::scatter_filter    filtered records + removed count
//!          └── distribution               Summary / histogram of one score
//! ```

pub mod absence;
pub mod categories;
pub mod distribution;
pub mod means;
pub mod scatter;

pub use absence::{absence_table, AbsenceRow};
pub use categories::{category_means, CategoryMeanRow, CategoryOptions, CategoryTable};
pub use distribution::{score_histogram, score_statistic, score_summary};
pub use means::{mean_table, Grouping, MeanRow};
pub use scatter::{scatter_filter, ScatterFilter, ScatterPoint, ScatterSubset};
