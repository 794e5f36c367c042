//! Shared best-so-far timetable.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::builder::Placement;
use crate::cp::CpAssignment;

use super::types::{ProgressEvent, SolutionObserver};

/// A certified timetable and its cost.
#[derive(Debug, Clone)]
pub(crate) struct Incumbent {
    pub cost: i64,
    pub placements: Vec<Placement>,
    pub assignment: CpAssignment,
}

struct IncumbentState<'o> {
    best: Option<Incumbent>,
    solutions: usize,
    observer: &'o mut dyn SolutionObserver,
}

/// Best timetable shared by all search workers.
///
/// The upper bound is readable without locking so workers can discard
/// candidates cheaply. Installation and the observer call happen under one
/// lock, so events arrive in index order with non-increasing cost.
pub(crate) struct SharedIncumbent<'o> {
    upper_bound: AtomicI64,
    started: Instant,
    state: Mutex<IncumbentState<'o>>,
}

impl<'o> SharedIncumbent<'o> {
    pub fn new(started: Instant, observer: &'o mut dyn SolutionObserver) -> Self {
        Self {
            upper_bound: AtomicI64::new(i64::MAX),
            started,
            state: Mutex::new(IncumbentState {
                best: None,
                solutions: 0,
                observer,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, IncumbentState<'o>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cost of the incumbent, `i64::MAX` before the first one.
    pub fn upper_bound(&self) -> i64 {
        self.upper_bound.load(Ordering::Relaxed)
    }

    /// Installs a candidate if it is strictly better than the incumbent and
    /// reports it to the observer. Returns whether it was installed.
    pub fn try_install(
        &self,
        cost: i64,
        placements: Vec<Placement>,
        assignment: CpAssignment,
    ) -> bool {
        if cost >= self.upper_bound() {
            return false;
        }

        let mut state = self.lock();
        // Another worker may have installed a better one since the check.
        if state.best.as_ref().is_some_and(|b| cost >= b.cost) {
            return false;
        }

        state.best = Some(Incumbent {
            cost,
            placements,
            assignment,
        });
        state.solutions += 1;
        self.upper_bound.store(cost, Ordering::Relaxed);

        let event = ProgressEvent {
            solution_index: state.solutions,
            elapsed: self.started.elapsed(),
            cost,
        };
        state.observer.on_improved_solution(&event);
        true
    }

    pub fn best_placements(&self) -> Option<Vec<Placement>> {
        self.lock().best.as_ref().map(|b| b.placements.clone())
    }

    #[cfg(test)]
    fn solutions(&self) -> usize {
        self.lock().solutions
    }

    /// The incumbent (if any) and the number of installed solutions.
    pub fn into_best(self) -> (Option<Incumbent>, usize) {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        (state.best, state.solutions)
    }
}
