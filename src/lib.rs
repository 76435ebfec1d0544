//! Analysis pipeline for furnace process optimization exports.
//!
//! Turns loosely-typed spreadsheet/CSV rows (temperature and energy
//! consumption predictions vs. actuals, one row per heat/colada) into
//! analysis-ready data: normalized dates, filtered subsets, derived
//! improvement metrics, and chart-ready aggregates. Rendering is someone
//! else's job; everything this crate returns is plain data.

pub mod data;
pub mod grades;
pub mod metrics;
pub mod session;
pub mod stats;
pub mod time;

pub use data::filter::FilterCriteria;
pub use data::model::{FieldValue, FurnaceDataset, FurnaceProfile, HeatRecord};
pub use grades::GradeSchedule;
pub use metrics::{HeatSummary, Improvement};
pub use session::AnalysisSession;
pub use stats::{IntervalBin, Summary};
