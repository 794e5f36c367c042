//! Construction of a first feasible timetable.
//!
//! A few rounds of greedy first-fit on the fixed grid of `exam + pause`
//! slots come first. When they leave exams over, a depth-first search
//! places exams one at a time, most constrained first. Each exam first
//! tries its left-justified starts in every room, then every remaining
//! start of the horizon, so an exhausted search is a proof that no
//! timetable exists. After each placement, every unplaced exam sharing a
//! professor must still have a feasible position.

use std::cmp::Reverse;
use std::time::Instant;

use crate::builder::{ExamModel, Placement};
use crate::cp::CpAssignment;

use super::state::Timetable;

/// Nodes between two deadline checks.
const DEADLINE_CHECK_INTERVAL: u64 = 64;

/// Grid first-fit rounds before the depth-first search.
const GRID_ROUNDS: usize = 8;

/// Outcome of the construction phase.
#[derive(Debug)]
pub(crate) enum Construction {
    /// A certified timetable.
    Found {
        placements: Vec<Placement>,
        assignment: CpAssignment,
    },
    /// Every placement was tried; the model is infeasible.
    Exhausted,
    TimedOut,
}

pub(crate) fn construct(model: &ExamModel, deadline: Instant) -> Construction {
    let order = placement_order(model);
    if let Some((placements, assignment)) = grid_first_fit(model, &order, deadline) {
        return Construction::Found {
            placements,
            assignment,
        };
    }

    let mut dfs = Dfs {
        tt: Timetable::new(model),
        order,
        deadline,
        nodes: 0,
        timed_out: false,
        found: None,
    };

    if dfs.search(0) {
        if let Some((placements, assignment)) = dfs.found {
            return Construction::Found {
                placements,
                assignment,
            };
        }
    }
    if dfs.timed_out {
        Construction::TimedOut
    } else {
        Construction::Exhausted
    }
}

/// Greedy first-fit over the slots `day * day_minutes + k * (exam + pause)`,
/// scanning days, then slots, then rooms.
///
/// Grid starts in one room never overlap, so only professor clashes reject
/// a slot. Exams left over in one round move to the front of the order for
/// the next.
fn grid_first_fit(
    model: &ExamModel,
    order: &[usize],
    deadline: Instant,
) -> Option<(Vec<Placement>, CpAssignment)> {
    let g = *model.geometry();
    let stride = g.exam_minutes + g.pause_minutes;
    let slots = g.room_slots_per_day();
    let grid: Vec<Placement> = (0..g.num_days)
        .flat_map(|day| (0..slots).map(move |k| day * g.day_minutes + k * stride))
        .flat_map(|start| (0..g.num_rooms).map(move |room| Placement::new(start, room)))
        .collect();
    if grid.len() < order.len() {
        return None;
    }

    let mut order = order.to_vec();
    for _ in 0..GRID_ROUNDS {
        if Instant::now() >= deadline {
            return None;
        }
        let mut tt = Timetable::new(model);
        let mut missed = Vec::new();
        for &exam in &order {
            match grid.iter().find(|&&p| tt.fits(exam, p)) {
                Some(&p) => tt.place(exam, p),
                None => missed.push(exam),
            }
        }
        if missed.is_empty() {
            let placements = tt.complete_placements()?;
            let assignment = model.complete(&placements).ok()?;
            return Some((placements, assignment));
        }
        order.retain(|x| !missed.contains(x));
        missed.extend(order);
        order = missed;
    }
    None
}

/// Exams with the busiest professors first, then larger pair groups, then
/// input order.
fn placement_order(model: &ExamModel) -> Vec<usize> {
    let roster = model.roster();
    let load = |x: usize| -> usize {
        roster
            .exam_professors(x)
            .iter()
            .map(|&p| roster.professor_exams(p).len())
            .sum()
    };
    let group_size = |x: usize| {
        roster
            .exam_group(x)
            .map_or(0, |grp| roster.pair_groups()[grp].len())
    };

    let mut order: Vec<usize> = (0..roster.len()).collect();
    order.sort_by_key(|&x| (std::cmp::Reverse(load(x)), std::cmp::Reverse(group_size(x)), x));
    order
}

struct Dfs<'m> {
    tt: Timetable<'m>,
    order: Vec<usize>,
    deadline: Instant,
    nodes: u64,
    timed_out: bool,
    found: Option<(Vec<Placement>, CpAssignment)>,
}

impl Dfs<'_> {
    fn search(&mut self, depth: usize) -> bool {
        if depth == self.order.len() {
            return self.certify();
        }

        self.nodes += 1;
        if self.nodes % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= self.deadline {
            self.timed_out = true;
        }
        if self.timed_out {
            return false;
        }

        let exam = self.order[depth];
        let primary = self.primary_values(exam);
        for &p in &primary {
            if self.try_value(depth, exam, p) {
                return true;
            }
            if self.timed_out {
                return false;
            }
        }

        let mut tried = primary;
        tried.sort_unstable();
        let g = *self.tt.model().geometry();
        for room in 0..g.num_rooms {
            for day in 0..g.num_days {
                for offset in 0..=g.last_offset() {
                    let p = Placement::new(day * g.day_minutes + offset, room);
                    if tried.binary_search(&p).is_ok() {
                        continue;
                    }
                    if self.try_value(depth, exam, p) {
                        return true;
                    }
                    if self.timed_out {
                        return false;
                    }
                }
            }
        }
        false
    }

    /// Feasible left-justified placements. Starts that keep the room packed
    /// (day starts and padded ends of its exams) come before professor
    /// ends; ties go to the earliest start, then the fullest room.
    fn primary_values(&self, exam: usize) -> Vec<Placement> {
        let g = self.tt.model().geometry();
        let padded = g.exam_minutes + g.pause_minutes;
        let mut keyed = Vec::new();
        for room in 0..g.num_rooms {
            let members = self.tt.room_exams(room as usize);
            let packs = |start: i64| {
                g.offset_of(start) == 0
                    || members.iter().any(|&y| {
                        self.tt
                            .placement(y)
                            .is_some_and(|q| q.start + padded == start)
                    })
            };
            for start in self.tt.candidate_starts(exam, room as usize) {
                if self.tt.fits(exam, Placement::new(start, room)) {
                    keyed.push((!packs(start), start, Reverse(members.len()), room));
                }
            }
        }
        keyed.sort_unstable();
        keyed
            .into_iter()
            .map(|(_, start, _, room)| Placement::new(start, room))
            .collect()
    }

    fn try_value(&mut self, depth: usize, exam: usize, p: Placement) -> bool {
        if !self.tt.fits(exam, p) {
            return false;
        }
        self.tt.place(exam, p);
        if self.forward_check(exam) && self.search(depth + 1) {
            return true;
        }
        self.tt.unplace(exam);
        false
    }

    /// Every unplaced exam sharing a professor with `exam` still fits
    /// somewhere. Checking left-justified starts suffices: a fitting exam
    /// can slide left until it meets one of them.
    fn forward_check(&self, exam: usize) -> bool {
        let model = self.tt.model();
        let roster = model.roster();
        let rooms = model.geometry().num_rooms as usize;

        roster.exam_professors(exam).iter().all(|&prof| {
            roster.professor_exams(prof).iter().all(|&y| {
                self.tt.placement(y).is_some()
                    || (0..rooms).any(|room| {
                        self.tt
                            .candidate_starts(y, room)
                            .into_iter()
                            .any(|s| self.tt.fits(y, Placement::new(s, room as i64)))
                    })
            })
        })
    }

    fn certify(&mut self) -> bool {
        let Some(placements) = self.tt.complete_placements() else {
            return false;
        };
        match self.tt.model().complete(&placements) {
            Ok(assignment) => {
                self.found = Some((placements, assignment));
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ExamModelBuilder, ObjectiveComposer, ObjectiveWeights};
    use crate::exam::{ClockTime, ConstraintsConfig, Exam, Roster};
    use std::time::Duration;

    fn build(exams: Vec<Exam>, config: ConstraintsConfig) -> ExamModel {
        let roster = Roster::new(exams).unwrap();
        let mut model = ExamModelBuilder::new(&roster, &config).build().unwrap();
        ObjectiveComposer::new(ObjectiveWeights::new(1, 1))
            .compose(&mut model)
            .unwrap();
        model
    }

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(10)
    }

    #[test]
    fn test_finds_certified_timetable() {
        let exams = (0..6)
            .map(|i| Exam::new(i, format!("s{i}"), format!("P{}", i % 2), format!("Q{}", i % 3)))
            .collect();
        let config = ConstraintsConfig::new(1, 2, 30)
            .with_pause(10)
            .with_day_window(
                ClockTime::new(8, 0).unwrap(),
                ClockTime::new(11, 0).unwrap(),
            );
        let model = build(exams, config);

        match construct(&model, deadline()) {
            Construction::Found {
                placements,
                assignment,
            } => {
                assert_eq!(placements.len(), 6);
                assert!(model.cp().check(&assignment).is_ok());
            }
            other => panic!("expected a timetable, got {other:?}"),
        }
    }

    #[test]
    fn test_exhausts_small_infeasible_instance() {
        // three exams sharing a professor, two fit in a 60-minute day
        let exams = (0..3)
            .map(|i| Exam::new(i, format!("s{i}"), "P", format!("Q{i}")))
            .collect();
        let config = ConstraintsConfig::new(1, 3, 30).with_day_window(
            ClockTime::new(8, 0).unwrap(),
            ClockTime::new(9, 0).unwrap(),
        );
        let model = build(exams, config);
        assert!(matches!(
            construct(&model, deadline()),
            Construction::Exhausted
        ));
    }

    #[test]
    fn test_single_node_ignores_expired_deadline() {
        let exams = vec![Exam::new(0, "s", "P", "Q")];
        let model = build(exams, ConstraintsConfig::new(1, 1, 30));
        let past = Instant::now();
        // a single node never reaches the check interval
        assert!(matches!(
            construct(&model, past),
            Construction::Found { .. }
        ));
    }

    #[test]
    fn test_empty_roster() {
        let model = build(Vec::new(), ConstraintsConfig::new(1, 1, 30));
        assert!(matches!(
            construct(&model, deadline()),
            Construction::Found { placements, .. } if placements.is_empty()
        ));
    }

    /// Twelve exams filling every room slot of a 08:00-12:00 day with two
    /// rooms; exams `2k` and `2k + 1` share a professor.
    fn packed_model() -> ExamModel {
        let exams = (0..12)
            .map(|i| Exam::new(i, format!("s{i}"), format!("P{}", i / 2), format!("Q{i}")))
            .collect();
        let config = ConstraintsConfig::new(1, 2, 30)
            .with_pause(10)
            .with_day_window(
                ClockTime::new(8, 0).unwrap(),
                ClockTime::new(12, 0).unwrap(),
            );
        build(exams, config)
    }

    #[test]
    fn test_grid_fills_every_room_slot() {
        let model = packed_model();
        let order = placement_order(&model);
        let (placements, assignment) = grid_first_fit(&model, &order, deadline()).unwrap();

        assert_eq!(placements.len(), 12);
        assert!(placements.iter().all(|p| p.start % 40 == 0));
        let mut cells = placements.clone();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), 12);
        assert!(model.cp().check(&assignment).is_ok());
        assert!(matches!(
            construct(&model, deadline()),
            Construction::Found { .. }
        ));
    }

    #[test]
    fn test_grid_respects_deadline() {
        let model = packed_model();
        let order = placement_order(&model);
        assert!(grid_first_fit(&model, &order, Instant::now()).is_none());
    }

    #[test]
    fn test_primary_values_prefer_packed_rooms() {
        let exams = vec![
            Exam::new(0, "a", "P", "Q"),
            Exam::new(1, "b", "R", "S"),
            Exam::new(2, "c", "P", "T"),
            Exam::new(3, "d", "U", "V"),
        ];
        let config = ConstraintsConfig::new(1, 3, 30).with_pause(10);
        let model = build(exams, config);
        let mut dfs = Dfs {
            tt: Timetable::new(&model),
            order: placement_order(&model),
            deadline: deadline(),
            nodes: 0,
            timed_out: false,
            found: None,
        };
        dfs.tt.place(0, Placement::new(0, 0));
        dfs.tt.place(1, Placement::new(0, 1));
        dfs.tt.place(3, Placement::new(80, 1));

        // P is free from 30, but only in the empty room
        assert_eq!(
            dfs.primary_values(2),
            vec![
                Placement::new(40, 1),
                Placement::new(40, 0),
                Placement::new(120, 1),
                Placement::new(30, 2),
            ]
        );
    }

    #[test]
    fn test_order_prefers_busy_professors() {
        let exams = vec![
            Exam::new(0, "a", "X", "Y"),
            Exam::new(1, "b", "P", "Q"),
            Exam::new(2, "c", "P", "R"),
        ];
        let model = build(exams, ConstraintsConfig::new(1, 1, 30));
        assert_eq!(placement_order(&model), vec![1, 2, 0]);
    }
}
