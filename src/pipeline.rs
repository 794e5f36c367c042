//! End-to-end optimization run.

use std::time::Duration;

use crate::builder::{ExamAssignment, ExamModelBuilder, ObjectiveComposer, ObjectiveWeights};
use crate::error::Error;
use crate::exam::{Exam, Roster, TimetableConfig};
use crate::schedule::{ScheduleExtractor, ScheduleTable};
use crate::search::{SearchConfig, SearchRunner, SolutionObserver, SolveStatus};

/// Result of [`run_optimization`].
#[derive(Debug, Clone)]
pub struct Outcome {
    pub status: SolveStatus,

    /// Sorted schedule, present only for `Optimal` and `Feasible`.
    pub schedule: Option<ScheduleTable>,

    /// Raw timetable in roster order, present with `schedule`.
    pub assignment: Option<Vec<ExamAssignment>>,

    pub objective: Option<i64>,
    pub lower_bound: i64,
    pub solutions_found: usize,
    pub elapsed: Duration,

    /// Why no schedule was produced.
    pub diagnostic: Option<String>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// One-line report of the run.
    pub fn summary(&self) -> String {
        match (self.objective, &self.diagnostic) {
            (Some(objective), _) => format!(
                "Search finished. {} solutions found. Final status: {}, cost {} (lower bound {})",
                self.solutions_found, self.status, objective, self.lower_bound
            ),
            (None, Some(reason)) => format!("Final status: {}. {}", self.status, reason),
            (None, None) => format!("Final status: {}", self.status),
        }
    }
}

/// Runs one optimization with the search settings of `config`.
///
/// # Errors
///
/// Configuration faults, invalid exam records and an objective that cannot
/// fit below the cap. An infeasible or timed-out search is an [`Outcome`]
/// with a failure status.
///
/// # Examples
///
/// ```
/// use u_timetable::exam::{ConstraintsConfig, Exam, OptimizationConfig, TimetableConfig};
/// use u_timetable::pipeline::run_optimization;
/// use u_timetable::search::NoOpObserver;
///
/// let exams = vec![
///     Exam::new(0, "Anna", "Prof. A", "Prof. B"),
///     Exam::new(1, "Bernd", "Prof. A", "Prof. C"),
///     Exam::new(2, "Carla", "Prof. B", "Prof. C"),
/// ];
/// let config = TimetableConfig::new(
///     ConstraintsConfig::new(2, 2, 30).with_pause(10),
///     OptimizationConfig::default().with_time_limit_seconds(1.0),
/// );
/// let outcome = run_optimization(&exams, &config, &mut NoOpObserver).unwrap();
/// assert!(outcome.is_success());
/// assert_eq!(outcome.schedule.unwrap().len(), 3);
/// ```
pub fn run_optimization(
    exams: &[Exam],
    config: &TimetableConfig,
    observer: &mut dyn SolutionObserver,
) -> Result<Outcome, Error> {
    let search = SearchConfig::from(&config.optimization);
    run_optimization_with(exams, config, &search, observer)
}

/// Like [`run_optimization`] with explicit search settings (workers, seed).
pub fn run_optimization_with(
    exams: &[Exam],
    config: &TimetableConfig,
    search: &SearchConfig,
    observer: &mut dyn SolutionObserver,
) -> Result<Outcome, Error> {
    let geometry = config.validate()?;
    search.validate()?;

    let roster = Roster::new(exams.to_vec())?;
    let mut model = ExamModelBuilder::new(&roster, &config.constraints).build()?;
    ObjectiveComposer::new(ObjectiveWeights::from(&config.optimization)).compose(&mut model)?;

    let result = SearchRunner::solve(&model, search, observer)?;

    let schedule = match (&result.assignment, result.status.is_success()) {
        (Some(assignment), true) => {
            Some(ScheduleExtractor::new(&roster, &geometry).extract(assignment))
        }
        _ => None,
    };

    Ok(Outcome {
        status: result.status,
        assignment: schedule.as_ref().and(result.assignment),
        schedule,
        objective: result.objective,
        lower_bound: result.lower_bound,
        solutions_found: result.solutions_found,
        elapsed: result.elapsed,
        diagnostic: result.diagnostic,
    })
}
