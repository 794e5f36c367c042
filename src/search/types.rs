//! Search outcomes and progress reporting.

use std::fmt;
use std::io::Write;
use std::sync::mpsc::{SyncSender, TrySendError};
use std::time::Duration;

use crate::builder::ExamAssignment;

/// Terminal status of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The incumbent's cost equals a proven lower bound.
    Optimal,
    /// A feasible timetable was found; optimality is not proven.
    Feasible,
    /// The hard constraints admit no timetable.
    Infeasible,
    /// Time ran out before any feasible timetable was found.
    TimedOutNoSolution,
}

impl SolveStatus {
    pub fn name(self) -> &'static str {
        match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::TimedOutNoSolution => "TIMED_OUT_NO_SOLUTION",
        }
    }

    /// Whether a timetable is available.
    pub fn is_success(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A strictly improving incumbent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// 1-based, strictly increasing.
    pub solution_index: usize,
    /// Time since the search started.
    pub elapsed: Duration,
    /// Objective value, non-increasing across events.
    pub cost: i64,
}

impl ProgressEvent {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Solution #{} found after {:.2}s. New best cost: {}",
            self.solution_index,
            self.elapsed_seconds(),
            self.cost
        )
    }
}

/// Receives every strictly improving incumbent.
///
/// Calls are serialized by the search, in increasing `solution_index`
/// order, even when several workers run.
pub trait SolutionObserver: Send {
    fn on_improved_solution(&mut self, event: &ProgressEvent);
}

impl<F> SolutionObserver for F
where
    F: FnMut(&ProgressEvent) + Send,
{
    fn on_improved_solution(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl SolutionObserver for NoOpObserver {
    fn on_improved_solution(&mut self, _event: &ProgressEvent) {}
}

/// Writes one line per event to a sink.
pub struct LogObserver {
    out: Box<dyn Write + Send>,
}

impl LogObserver {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self { out: Box::new(out) }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl SolutionObserver for LogObserver {
    fn on_improved_solution(&mut self, event: &ProgressEvent) {
        // Progress lines are best effort; a closed sink must not stop the search.
        let _ = writeln!(self.out, "{event}");
    }
}

/// Forwards events over a bounded channel; events are dropped while the
/// channel is full and ignored once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: SyncSender<ProgressEvent>,
    dropped: usize,
}

impl ChannelObserver {
    pub fn new(tx: SyncSender<ProgressEvent>) -> Self {
        Self { tx, dropped: 0 }
    }

    /// Events not delivered because the channel was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl SolutionObserver for ChannelObserver {
    fn on_improved_solution(&mut self, event: &ProgressEvent) {
        match self.tx.try_send(*event) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => self.dropped += 1,
        }
    }
}

/// Result of a search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub status: SolveStatus,

    /// Cost of the best timetable, if any.
    pub objective: Option<i64>,

    /// Best timetable, one entry per exam in roster order.
    pub assignment: Option<Vec<ExamAssignment>>,

    /// Proven lower bound on the objective.
    pub lower_bound: i64,

    /// Number of improving incumbents reported.
    pub solutions_found: usize,

    /// Wall-clock time spent.
    pub elapsed: Duration,

    /// Why no timetable is available (infeasibility proof or timeout).
    pub diagnostic: Option<String>,
}

impl SearchResult {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
