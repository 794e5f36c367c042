//! Search execution.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::builder::ExamModel;
use crate::error::ConfigError;

use super::bounds::{capacity_violation, lower_bound};
use super::config::SearchConfig;
use super::construct::{construct, Construction};
use super::incumbent::SharedIncumbent;
use super::neighborhood::propose;
use super::state::Timetable;
use super::types::{SearchResult, SolutionObserver, SolveStatus};

/// Iterations between two deadline checks.
const CHECK_INTERVAL: u64 = 64;

/// Iterations at each temperature level.
const ITERATIONS_PER_TEMPERATURE: u64 = 200;

/// Geometric cooling factor.
const COOLING_ALPHA: f64 = 0.97;

/// Reheat once the temperature falls below this fraction of the start.
const REHEAT_RATIO: f64 = 1e-3;

/// Executes a time-bounded search over an [`ExamModel`].
///
/// 1. Counting arguments may prove infeasibility up front.
/// 2. A depth-first construction finds a first timetable, or proves that
///    none exists by exhausting the placements.
/// 3. Simulated-annealing workers improve the incumbent until the time
///    limit, or until its cost meets the lower bound.
///
/// Every incumbent is certified against the CP model and reported to the
/// observer before it is installed.
pub struct SearchRunner;

impl SearchRunner {
    /// Runs the search.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a zero time limit or zero workers.
    /// Infeasibility and timeouts are statuses, not errors.
    pub fn solve(
        model: &ExamModel,
        config: &SearchConfig,
        observer: &mut dyn SolutionObserver,
    ) -> Result<SearchResult, ConfigError> {
        config.validate()?;

        let started = Instant::now();
        let deadline = started + config.time_limit;
        let lower = lower_bound(model);

        if let Some(reason) = capacity_violation(model) {
            return Ok(no_solution(SolveStatus::Infeasible, lower, started, reason));
        }

        let incumbent = SharedIncumbent::new(started, observer);
        match construct(model, deadline) {
            Construction::Found {
                placements,
                assignment,
            } => {
                let cost = model.objective_value(&assignment);
                incumbent.try_install(cost, placements, assignment);
            }
            Construction::Exhausted => {
                return Ok(no_solution(
                    SolveStatus::Infeasible,
                    lower,
                    started,
                    "every placement of the exams violates a hard constraint".into(),
                ));
            }
            Construction::TimedOut => {
                return Ok(no_solution(
                    SolveStatus::TimedOutNoSolution,
                    lower,
                    started,
                    format!(
                        "no feasible timetable found within {:.2}s",
                        config.time_limit.as_secs_f64()
                    ),
                ));
            }
        }

        if incumbent.upper_bound() > lower {
            let base_seed = config.seed.unwrap_or_else(rand::random);
            run_workers(model, &incumbent, config.num_workers, base_seed, deadline, lower);
        }

        let (best, solutions_found) = incumbent.into_best();
        let elapsed = started.elapsed();
        Ok(match best {
            Some(best) => SearchResult {
                status: if best.cost <= lower {
                    SolveStatus::Optimal
                } else {
                    SolveStatus::Feasible
                },
                objective: Some(best.cost),
                assignment: Some(model.exam_assignments(&best.assignment)),
                lower_bound: lower,
                solutions_found,
                elapsed,
                diagnostic: None,
            },
            None => no_solution(
                SolveStatus::TimedOutNoSolution,
                lower,
                started,
                "no feasible timetable found".into(),
            ),
        })
    }
}

fn no_solution(status: SolveStatus, lower: i64, started: Instant, reason: String) -> SearchResult {
    SearchResult {
        status,
        objective: None,
        assignment: None,
        lower_bound: lower,
        solutions_found: 0,
        elapsed: started.elapsed(),
        diagnostic: Some(reason),
    }
}

/// Worker `i` draws from `base_seed + i · φ`, so one seed reproduces a
/// single-worker run.
fn worker_seed(base_seed: u64, worker: usize) -> u64 {
    base_seed.wrapping_add((worker as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

#[cfg(feature = "parallel")]
fn run_workers(
    model: &ExamModel,
    incumbent: &SharedIncumbent<'_>,
    workers: usize,
    base_seed: u64,
    deadline: Instant,
    lower: i64,
) {
    if workers <= 1 {
        improve(model, incumbent, worker_seed(base_seed, 0), deadline, lower);
        return;
    }
    rayon::scope(|s| {
        for worker in 0..workers {
            s.spawn(move |_| {
                improve(model, incumbent, worker_seed(base_seed, worker), deadline, lower)
            });
        }
    });
}

#[cfg(not(feature = "parallel"))]
fn run_workers(
    model: &ExamModel,
    incumbent: &SharedIncumbent<'_>,
    _workers: usize,
    base_seed: u64,
    deadline: Instant,
    lower: i64,
) {
    improve(model, incumbent, worker_seed(base_seed, 0), deadline, lower);
}

/// Simulated annealing from the incumbent.
fn improve(
    model: &ExamModel,
    incumbent: &SharedIncumbent<'_>,
    seed: u64,
    deadline: Instant,
    lower: i64,
) {
    let Some(start) = incumbent.best_placements() else {
        return;
    };
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tt = Timetable::from_placements(model, &start);
    let mut current = tt.cost();

    let t0 = initial_temperature(model);
    let mut temperature = t0;
    let mut iteration = 0u64;

    loop {
        if iteration % CHECK_INTERVAL == 0
            && (Instant::now() >= deadline || incumbent.upper_bound() <= lower)
        {
            break;
        }
        iteration += 1;

        let Some(mv) = propose(&tt, &mut rng) else {
            break;
        };
        if let Some((delta, undo)) = tt.apply(mv) {
            // Metropolis acceptance criterion
            let accept = delta <= 0
                || rng.random_range(0.0..1.0) < (-(delta as f64) / temperature).exp();
            if accept {
                current += delta;
                if current < incumbent.upper_bound() {
                    report(model, &tt, current, incumbent);
                }
            } else {
                tt.revert(undo);
            }
        }

        if iteration % ITERATIONS_PER_TEMPERATURE == 0 {
            temperature *= COOLING_ALPHA;
            if temperature < t0 * REHEAT_RATIO {
                if let Some(best) = incumbent.best_placements() {
                    tt = Timetable::from_placements(model, &best);
                    current = tt.cost();
                }
                temperature = t0;
            }
        }
    }
}

/// Certifies the current timetable and offers it as the new incumbent.
fn report(model: &ExamModel, tt: &Timetable<'_>, cost: i64, incumbent: &SharedIncumbent<'_>) {
    let Some(placements) = tt.complete_placements() else {
        return;
    };
    if let Ok(assignment) = model.complete(&placements) {
        debug_assert_eq!(model.objective_value(&assignment), cost);
        incumbent.try_install(model.objective_value(&assignment), placements, assignment);
    }
}

/// Start temperature on the scale of one typical move: an active day, or
/// one exam duration of pair span.
fn initial_temperature(model: &ExamModel) -> f64 {
    let w = model.weights();
    let span_scale = w.pair_locality * model.geometry().exam_minutes;
    w.active_days.max(span_scale).max(1) as f64
}
