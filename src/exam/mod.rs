//! Input data: exam records, professors, and run configuration.
//!
//! # Key Components
//!
//! - [`Exam`]: one record of the exam table
//! - [`Roster`]: validated exams with dense professor ids and
//!   examiner-pair groups
//! - [`ConstraintsConfig`], [`OptimizationConfig`], [`TimetableConfig`]:
//!   configuration sections
//! - [`DayGeometry`]: day length, horizon and per-day capacities
//! - [`ClockTime`]: `HH:MM` times of day

mod clock;
mod config;
mod types;

pub use clock::ClockTime;
pub use config::{ConstraintsConfig, DayGeometry, OptimizationConfig, TimetableConfig};
pub use types::{Exam, PairGroup, Roster};
