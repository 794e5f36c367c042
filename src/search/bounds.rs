//! Capacity relaxations: infeasibility proofs and an objective lower bound.

use crate::builder::{ExamModel, CROSS_ROOM_PENALTY};

/// Proves infeasibility by counting, if a counting argument applies.
///
/// Returns a human-readable reason when
/// - a day window is shorter than one exam,
/// - the rooms cannot hold all exams over the horizon, or
/// - some professor has more exams than they can attend in sequence.
pub fn capacity_violation(model: &ExamModel) -> Option<String> {
    let g = model.geometry();
    let roster = model.roster();
    let n = roster.len() as i64;
    if n == 0 {
        return None;
    }

    if g.day_minutes < g.exam_minutes {
        return Some(format!(
            "a {}-minute day cannot hold a {}-minute exam",
            g.day_minutes, g.exam_minutes
        ));
    }

    let room_capacity = g.num_rooms * g.num_days * g.room_slots_per_day();
    if n > room_capacity {
        return Some(format!(
            "{n} exams exceed room capacity of {room_capacity} ({} rooms × {} days × {} slots per day)",
            g.num_rooms,
            g.num_days,
            g.room_slots_per_day()
        ));
    }

    let professor_capacity = g.num_days * g.professor_slots_per_day();
    for p in 0..roster.professor_count() {
        let load = roster.professor_exams(p).len() as i64;
        if load > professor_capacity {
            return Some(format!(
                "{} has {load} exams but can attend at most {professor_capacity}",
                roster.professor_name(p)
            ));
        }
    }
    None
}

/// A lower bound on the objective of any feasible timetable.
///
/// A professor with `k` exams is active on at least `⌈k / slots⌉` days. A
/// group of `k` exams spans at least `k` exam durations plus `k - 1` gaps;
/// each gap is either a room pause (same room) or costs the cross-room
/// penalty, whichever is smaller.
pub fn lower_bound(model: &ExamModel) -> i64 {
    let w = model.weights();
    let g = model.geometry();
    let roster = model.roster();

    let mut bound = 0i64;
    let slots = g.professor_slots_per_day();
    if w.active_days > 0 && slots > 0 {
        let days: i64 = (0..roster.professor_count())
            .map(|p| {
                let load = roster.professor_exams(p).len() as i64;
                (load + slots - 1) / slots
            })
            .sum();
        bound += w.active_days * days;
    }

    if model.has_locality_terms() {
        let gap = g.pause_minutes.min(CROSS_ROOM_PENALTY);
        let locality: i64 = roster
            .pair_groups()
            .iter()
            .map(|group| {
                let k = group.len() as i64;
                k * g.exam_minutes + (k - 1) * gap
            })
            .sum();
        bound += w.pair_locality * locality;
    }
    bound
}
