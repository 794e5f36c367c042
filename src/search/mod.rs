//! Time-bounded search over an exam timetabling model.
//!
//! Combines counting proofs of infeasibility, an exhaustive depth-first
//! construction and parallel simulated annealing. Improved incumbents are
//! reported through a [`SolutionObserver`].
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use u_timetable::builder::{ExamModelBuilder, ObjectiveComposer, ObjectiveWeights};
//! use u_timetable::exam::{ConstraintsConfig, Exam, Roster};
//! use u_timetable::search::{LogObserver, SearchConfig, SearchRunner};
//!
//! let roster = Roster::new(vec![
//!     Exam::new(0, "Anna", "Prof. A", "Prof. B"),
//!     Exam::new(1, "Bernd", "Prof. A", "Prof. C"),
//! ])
//! .unwrap();
//! let mut model = ExamModelBuilder::new(&roster, &ConstraintsConfig::new(2, 1, 30))
//!     .build()
//!     .unwrap();
//! ObjectiveComposer::new(ObjectiveWeights::new(1, 0))
//!     .compose(&mut model)
//!     .unwrap();
//!
//! let config = SearchConfig::default().with_time_limit(Duration::from_secs(1));
//! let result = SearchRunner::solve(&model, &config, &mut LogObserver::stderr()).unwrap();
//! assert!(result.is_success());
//! ```

mod bounds;
mod config;
mod construct;
mod incumbent;
mod neighborhood;
mod runner;
mod state;
mod types;

pub use bounds::{capacity_violation, lower_bound};
pub use config::SearchConfig;
pub use runner::SearchRunner;
pub use types::{
    ChannelObserver, LogObserver, NoOpObserver, ProgressEvent, SearchResult, SolutionObserver,
    SolveStatus,
};
