//! End-to-end runs of the optimization pipeline.
//!
//! These tests validate that a run:
//! - Produces timetables that respect every hard rule
//! - Proves capacity shortfalls infeasible and emits no table
//! - Keeps recurring examiner pairs together when locality is weighted
//! - Reports incumbents in order, ending at the returned cost
//! - Finds a first timetable for dense rosters within a few seconds

mod common;

use std::time::Duration;

use common::*;
use u_timetable::exam::{ConstraintsConfig, Exam, OptimizationConfig, TimetableConfig};
use u_timetable::search::{ProgressEvent, SolveStatus};
use u_timetable::{run_optimization, run_optimization_with};

#[test]
fn test_scenario_a_small_feasible() {
    let exams = scenario_a_exams();
    let config = scenario_a_config();
    let outcome = run_optimization(&exams, &config, &mut |_: &ProgressEvent| {}).unwrap();

    assert!(matches!(
        outcome.status,
        SolveStatus::Optimal | SolveStatus::Feasible
    ));
    let assignment = assert_valid(&outcome, &exams, &config);
    assert!(assignment.iter().all(|a| a.day == 0));
    assert!(outcome.objective.unwrap() >= outcome.lower_bound);
}

#[test]
fn test_scenario_b_capacity_infeasible() {
    let exams = spread_exams(20);
    let config = TimetableConfig::new(
        ConstraintsConfig::new(1, 1, 30).with_day_window(clock("08:00"), clock("09:00")),
        OptimizationConfig::default().with_time_limit_seconds(5.0),
    );
    let mut events = 0;
    let outcome = run_optimization(&exams, &config, &mut |_: &ProgressEvent| events += 1).unwrap();

    assert_eq!(outcome.status, SolveStatus::Infeasible);
    assert!(outcome.schedule.is_none());
    assert!(outcome.assignment.is_none());
    assert!(outcome.objective.is_none());
    assert!(outcome.diagnostic.is_some());
    assert_eq!(outcome.solutions_found, 0);
    assert_eq!(events, 0);
}

#[test]
fn test_scenario_c_locality_tightens_pair_span() {
    // one pair shares four exams; the others fill the rooms around them
    let mut exams = vec![
        exam(0, "Prof. X", "Prof. Y"),
        exam(1, "Prof. Y", "Prof. X"),
        exam(2, "Prof. X", "Prof. Y"),
        exam(3, "Prof. Y", "Prof. X"),
    ];
    exams.extend((4..8).map(|i| exam(i, &format!("Prof. P{i}"), &format!("Prof. Q{i}"))));
    let pair = [0, 1, 2, 3];

    let run = |locality: u32| {
        let config = TimetableConfig::new(
            ConstraintsConfig::new(1, 2, 30),
            OptimizationConfig::default()
                .with_weight_pair_locality(locality)
                .with_time_limit_seconds(1.0),
        );
        let outcome =
            run_optimization_with(&exams, &config, &seeded(Duration::from_secs(1)), &mut |_: &ProgressEvent| {})
                .unwrap();
        let assignment = assert_valid(&outcome, &exams, &config);
        span_of(&assignment, &pair)
    };

    let without = run(0);
    let with = run(50);
    assert!(with <= without, "span {with} with locality, {without} without");
    // four back-to-back exams
    assert_eq!(with, 4 * 30);
}

#[test]
fn test_progress_is_monotone_and_consistent() {
    let exams = scenario_a_exams();
    let config = scenario_a_config();

    let mut events: Vec<ProgressEvent> = Vec::new();
    let outcome = run_optimization(&exams, &config, &mut |e: &ProgressEvent| events.push(*e)).unwrap();

    assert!(!events.is_empty());
    assert_eq!(outcome.solutions_found, events.len());
    for pair in events.windows(2) {
        assert!(pair[1].solution_index > pair[0].solution_index);
        assert!(pair[1].cost <= pair[0].cost);
        assert!(pair[1].elapsed >= pair[0].elapsed);
    }
    let last = events.last().unwrap().cost;
    assert_eq!(outcome.objective, Some(last));
    assert_eq!(recomputed_cost(&outcome, &exams, &config), last);
}

#[test]
fn test_parallel_workers_stay_valid() {
    let exams = spread_exams(40);
    let config = TimetableConfig::new(
        ConstraintsConfig::new(3, 3, 45)
            .with_pause(15)
            .with_day_window(clock("09:00"), clock("15:30")),
        OptimizationConfig::default()
            .with_weight_active_days(5)
            .with_weight_pair_locality(1),
    );
    let search = seeded(Duration::from_millis(800)).with_num_workers(4);

    let mut events: Vec<ProgressEvent> = Vec::new();
    let outcome = run_optimization_with(&exams, &config, &search, &mut |e: &ProgressEvent| {
        events.push(*e)
    })
    .unwrap();

    assert_valid(&outcome, &exams, &config);
    assert!(events.windows(2).all(|w| w[1].cost < w[0].cost));
    assert_eq!(
        recomputed_cost(&outcome, &exams, &config),
        outcome.objective.unwrap()
    );
}

#[test]
fn test_dense_roster_finds_timetable() {
    // 200 exams over 30 professors use 200 of 240 room slots
    let exams: Vec<Exam> = (0..200u32)
        .map(|i| {
            let p = 7 * i % 30;
            let q = (p + 1 + (i / 3) % 5) % 30;
            exam(i, &format!("Prof. {p}"), &format!("Prof. {q}"))
        })
        .collect();
    let config = TimetableConfig::new(
        ConstraintsConfig::new(5, 4, 30)
            .with_pause(10)
            .with_day_window(clock("08:00"), clock("16:00")),
        OptimizationConfig::default()
            .with_weight_active_days(10)
            .with_weight_pair_locality(1),
    );
    let outcome =
        run_optimization_with(&exams, &config, &seeded(Duration::from_secs(3)), &mut |_: &ProgressEvent| {})
            .unwrap();

    assert!(
        matches!(outcome.status, SolveStatus::Optimal | SolveStatus::Feasible),
        "{}",
        outcome.summary()
    );
    assert_valid(&outcome, &exams, &config);
    assert_eq!(
        recomputed_cost(&outcome, &exams, &config),
        outcome.objective.unwrap()
    );
}

#[test]
fn test_timeout_is_not_infeasible() {
    let exams = spread_exams(300);
    let config = TimetableConfig::new(
        ConstraintsConfig::new(10, 5, 30),
        OptimizationConfig::default(),
    );
    let search = seeded(Duration::from_nanos(1));
    let outcome = run_optimization_with(&exams, &config, &search, &mut |_: &ProgressEvent| {}).unwrap();

    assert_eq!(outcome.status, SolveStatus::TimedOutNoSolution);
    assert!(outcome.schedule.is_none());
    assert!(outcome.diagnostic.is_some());
}

#[test]
fn test_schedule_rows_sorted_with_clock_times() {
    let exams = scenario_a_exams();
    let config = TimetableConfig::new(
        ConstraintsConfig::new(2, 2, 45)
            .with_pause(5)
            .with_day_window(clock("08:30"), clock("11:30")),
        OptimizationConfig::default().with_weight_pair_locality(1),
    );
    let outcome =
        run_optimization_with(&exams, &config, &seeded(Duration::from_millis(500)), &mut |_: &ProgressEvent| {})
            .unwrap();
    assert_valid(&outcome, &exams, &config);

    let rows = outcome.schedule.unwrap();
    let keys: Vec<(u32, u32, String)> = rows
        .iter()
        .map(|r| (r.day, r.room, r.start_time.to_string()))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    for r in &rows {
        let text = r.start_time.to_string();
        assert_eq!(text.len(), 5);
        assert_eq!(&text[2..3], ":");
    }
}
