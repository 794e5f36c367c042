//! Fixtures shared across integration tests.

#![allow(dead_code)]

use std::time::Duration;

use u_timetable::builder::{ExamAssignment, ObjectiveWeights};
use u_timetable::exam::{ClockTime, ConstraintsConfig, Exam, OptimizationConfig, Roster, TimetableConfig};
use u_timetable::schedule::{find_violations, ScheduleExtractor};
use u_timetable::search::SearchConfig;
use u_timetable::Outcome;

pub fn clock(s: &str) -> ClockTime {
    s.parse().unwrap()
}

pub fn exam(id: u32, prof_1: &str, prof_2: &str) -> Exam {
    Exam::new(id, format!("Student {id}"), prof_1, prof_2)
}

/// Five exams over three professors, each pair examining together.
pub fn scenario_a_exams() -> Vec<Exam> {
    vec![
        exam(0, "Prof. A", "Prof. B"),
        exam(1, "Prof. A", "Prof. C"),
        exam(2, "Prof. B", "Prof. C"),
        exam(3, "Prof. B", "Prof. A"),
        exam(4, "Prof. C", "Prof. A"),
    ]
}

pub fn scenario_a_config() -> TimetableConfig {
    TimetableConfig::new(
        ConstraintsConfig::new(1, 2, 30)
            .with_pause(10)
            .with_day_window(clock("08:00"), clock("12:00")),
        OptimizationConfig::default()
            .with_weight_active_days(10)
            .with_weight_pair_locality(1)
            .with_time_limit_seconds(2.0),
    )
}

/// `n` exams with pairwise distinct examiner pairs spread over many
/// professors.
pub fn spread_exams(n: u32) -> Vec<Exam> {
    (0..n)
        .map(|i| exam(i, &format!("P{}", i % 7), &format!("Q{}", i % 11)))
        .collect()
}

pub fn seeded(limit: Duration) -> SearchConfig {
    SearchConfig::default().with_time_limit(limit).with_seed(7)
}

/// Checks every hard rule on a successful outcome and returns the raw
/// assignments.
pub fn assert_valid(outcome: &Outcome, exams: &[Exam], config: &TimetableConfig) -> Vec<ExamAssignment> {
    assert!(outcome.is_success(), "no timetable: {}", outcome.summary());
    let assignment = outcome.assignment.clone().expect("assignment for a success");
    let schedule = outcome.schedule.as_ref().expect("schedule for a success");
    assert_eq!(assignment.len(), exams.len());
    assert_eq!(schedule.len(), exams.len());

    let roster = Roster::new(exams.to_vec()).unwrap();
    let geometry = config.validate().unwrap();
    let violations = find_violations(&assignment, &roster, &geometry);
    assert!(violations.is_empty(), "violations: {violations:?}");

    let (start, end) = (config.constraints.start_of_day, config.constraints.end_of_day);
    let duration = config.constraints.exam_duration_minutes;
    for row in schedule {
        assert!(row.start_time >= start);
        assert!(row.start_time.minutes() + duration <= end.minutes());
        assert!(row.day >= 1 && row.day <= config.constraints.num_days);
        assert!(row.room >= 1 && row.room <= config.constraints.num_rooms);
    }
    assignment
}

/// Soft cost of an outcome recomputed from its assignment.
pub fn recomputed_cost(outcome: &Outcome, exams: &[Exam], config: &TimetableConfig) -> i64 {
    let roster = Roster::new(exams.to_vec()).unwrap();
    let geometry = config.validate().unwrap();
    let assignment = outcome.assignment.as_ref().expect("assignment");
    ScheduleExtractor::new(&roster, &geometry)
        .recompute_objective(assignment, ObjectiveWeights::from(&config.optimization))
}

/// `max(end) - min(start)` over the given exams.
pub fn span_of(assignment: &[ExamAssignment], exam_ids: &[u32]) -> i64 {
    let members: Vec<&ExamAssignment> = assignment
        .iter()
        .filter(|a| exam_ids.contains(&a.exam_id))
        .collect();
    let min_start = members.iter().map(|a| a.start).min().unwrap();
    let max_end = members.iter().map(|a| a.end).max().unwrap();
    max_end - min_start
}
