//! Property tests over random rosters and configurations.

mod common;

use std::time::Duration;

use common::*;
use proptest::prelude::*;
use u_timetable::builder::ExamAssignment;
use u_timetable::exam::{ClockTime, ConstraintsConfig, Exam, OptimizationConfig, Roster, TimetableConfig};
use u_timetable::schedule::ScheduleExtractor;
use u_timetable::search::ProgressEvent;
use u_timetable::run_optimization_with;

const PROFESSORS: [&str; 5] = ["Prof. A", "Prof. B", "Prof. C", "Prof. D", "Prof. E"];

/// Up to eight exams, each with two distinct professors from a small pool so
/// that pairs recur.
fn roster_strategy() -> impl Strategy<Value = Vec<Exam>> {
    prop::collection::vec((0..PROFESSORS.len(), 1..PROFESSORS.len()), 1..=8).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (p, shift))| {
                let q = (p + shift) % PROFESSORS.len();
                exam(i as u32, PROFESSORS[p], PROFESSORS[q])
            })
            .collect()
    })
}

fn config_strategy() -> impl Strategy<Value = TimetableConfig> {
    (1u32..=2, 1u32..=2, prop_oneof![Just(30u32), Just(45)], 0u32..=15, 0u32..=3, 0u32..=2).prop_map(
        |(days, rooms, duration, pause, w_days, w_locality)| {
            TimetableConfig::new(
                ConstraintsConfig::new(days, rooms, duration)
                    .with_pause(pause)
                    .with_day_window(clock("08:00"), clock("12:00")),
                OptimizationConfig::default()
                    .with_weight_active_days(w_days)
                    .with_weight_pair_locality(w_locality),
            )
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_solutions_respect_hard_rules(exams in roster_strategy(), config in config_strategy()) {
        let mut events: Vec<ProgressEvent> = Vec::new();
        let search = seeded(Duration::from_millis(150)).with_num_workers(2);
        let outcome = run_optimization_with(&exams, &config, &search, &mut |e: &ProgressEvent| {
            events.push(*e)
        })
        .unwrap();

        if outcome.is_success() {
            assert_valid(&outcome, &exams, &config);
            let cost = outcome.objective.unwrap();
            prop_assert_eq!(events.last().map(|e| e.cost), Some(cost));
            prop_assert_eq!(recomputed_cost(&outcome, &exams, &config), cost);
            prop_assert!(cost >= outcome.lower_bound);
        } else {
            prop_assert!(events.is_empty());
            prop_assert!(outcome.schedule.is_none());
        }
        let events_strictly_improving = events.windows(2).all(|w| {
            w[1].solution_index == w[0].solution_index + 1 && w[1].cost < w[0].cost
        });
        prop_assert!(events_strictly_improving);
    }

    #[test]
    fn test_extracted_rows_are_sorted(
        starts in prop::collection::vec((0i64..2 * 240 - 30, 0i64..3), 1..20),
    ) {
        let exams: Vec<Exam> = (0..starts.len() as u32)
            .map(|i| exam(i, "Prof. A", "Prof. B"))
            .collect();
        let roster = Roster::new(exams).unwrap();
        let geometry = ConstraintsConfig::new(2, 3, 30)
            .with_day_window(clock("08:00"), clock("12:00"))
            .geometry()
            .unwrap();
        let assignment: Vec<ExamAssignment> = starts
            .iter()
            .enumerate()
            .map(|(exam, &(start, room))| ExamAssignment {
                exam,
                exam_id: exam as u32,
                start,
                end: start + 30,
                day: geometry.day_of(start),
                offset: geometry.offset_of(start),
                room,
            })
            .collect();

        let table = ScheduleExtractor::new(&roster, &geometry).extract(&assignment);
        prop_assert_eq!(table.len(), assignment.len());
        let keys: Vec<(u32, u32, String)> = table
            .iter()
            .map(|r| (r.day, r.room, r.start_time.to_string()))
            .collect();
        prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        for row in &table {
            prop_assert!(row.start_time >= clock("08:00") && row.start_time < clock("12:00"));
        }
    }

    #[test]
    fn test_clock_round_trip(hour in 0u8..24, minute in 0u8..60) {
        let time = ClockTime::new(hour, minute).unwrap();
        let text = time.to_string();
        prop_assert_eq!(text.len(), 5);
        prop_assert_eq!(text.parse::<ClockTime>().unwrap(), time);
    }

    #[test]
    fn test_clock_carries_minutes(hour in 0u8..20, minute in 0u8..60, delta in 0u32..240) {
        let time = ClockTime::new(hour, minute).unwrap().plus_minutes(delta);
        prop_assert!(time.minute() < 60);
        prop_assert_eq!(time.minutes(), u32::from(hour) * 60 + u32::from(minute) + delta);
    }
}
