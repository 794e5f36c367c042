//! Examination timetabling with a constraint model and a time-bounded search.
//!
//! Assigns each exam (a student with two examiners) to a day, a room and a
//! start time, subject to hard rules, while minimizing a weighted soft cost:
//!
//! - **CP**: integer, boolean and interval variables, linear and
//!   no-overlap constraints, bounds propagation and solution certification.
//! - **Exam data**: exam records, professor indexing, pair groups and the
//!   `constraints` / `optimization` configuration.
//! - **Builder**: the hard rules (day containment, room and professor
//!   non-overlap, active-day indicators) and the soft cost (active days,
//!   examiner-pair locality) bound to a capped objective variable.
//! - **Search**: infeasibility proofs, depth-first construction and
//!   parallel simulated annealing, reporting every improved incumbent.
//! - **Schedule**: sorted, human-readable schedule rows and an independent
//!   audit of the hard rules.
//!
//! # Architecture
//!
//! Data flows one way: exam records and configuration enter
//! [`pipeline::run_optimization`], which builds a fresh
//! [`builder::ExamModel`], hands it read-only to
//! [`search::SearchRunner`] and extracts a [`schedule::ScheduleTable`] from
//! the best timetable. Loading data and configuration files, generating
//! synthetic rosters and plotting are left to callers.

pub mod builder;
pub mod cp;
pub mod error;
pub mod exam;
pub mod pipeline;
pub mod schedule;
pub mod search;

pub use error::{ConfigError, ConfigErrorKind, Error};
pub use pipeline::{run_optimization, run_optimization_with, Outcome};
