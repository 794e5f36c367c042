//! Incremental timetable state for construction and local search.
//!
//! Mirrors the hard rules and soft costs of the CP model over plain
//! placements so moves can be checked and priced without propagation.
//! Every incumbent is still certified by the CP model before it is reported.

use crate::builder::{ExamModel, Placement, CROSS_ROOM_PENALTY};

use super::neighborhood::{Move, Undo};

/// A partial or complete placement of the exams of a model.
#[derive(Debug, Clone)]
pub(crate) struct Timetable<'m> {
    model: &'m ExamModel,
    placements: Vec<Option<Placement>>,
    /// Exams currently held in each room.
    room_members: Vec<Vec<usize>>,
}

impl<'m> Timetable<'m> {
    pub fn new(model: &'m ExamModel) -> Self {
        Self {
            model,
            placements: vec![None; model.exam_count()],
            room_members: vec![Vec::new(); model.geometry().num_rooms as usize],
        }
    }

    pub fn from_placements(model: &'m ExamModel, placements: &[Placement]) -> Self {
        let mut tt = Self::new(model);
        for (exam, &p) in placements.iter().enumerate() {
            tt.place(exam, p);
        }
        tt
    }

    pub fn model(&self) -> &'m ExamModel {
        self.model
    }

    pub fn exam_count(&self) -> usize {
        self.placements.len()
    }

    pub fn placement(&self, exam: usize) -> Option<Placement> {
        self.placements[exam]
    }

    /// Exams currently placed in `room`.
    pub fn room_exams(&self, room: usize) -> &[usize] {
        &self.room_members[room]
    }

    /// Placements of every exam; `None` while some exam is unplaced.
    pub fn complete_placements(&self) -> Option<Vec<Placement>> {
        self.placements.iter().copied().collect()
    }

    pub fn place(&mut self, exam: usize, p: Placement) {
        self.unplace(exam);
        self.placements[exam] = Some(p);
        self.room_members[p.room as usize].push(exam);
    }

    pub fn unplace(&mut self, exam: usize) -> Option<Placement> {
        let previous = self.placements[exam].take()?;
        let members = &mut self.room_members[previous.room as usize];
        if let Some(pos) = members.iter().position(|&y| y == exam) {
            members.swap_remove(pos);
        }
        Some(previous)
    }

    /// Whether `exam` can take `p` given every other placed exam.
    pub fn fits(&self, exam: usize, p: Placement) -> bool {
        let g = self.model.geometry();
        if p.room < 0 || p.room >= g.num_rooms || !g.fits_in_day(p.start) {
            return false;
        }

        let padded = g.exam_minutes + g.pause_minutes;
        let room_clear = self.room_members[p.room as usize].iter().all(|&y| {
            y == exam
                || self.placements[y]
                    .map_or(true, |q| p.start >= q.start + padded || q.start >= p.start + padded)
        });
        if !room_clear {
            return false;
        }

        let roster = self.model.roster();
        roster.exam_professors(exam).iter().all(|&prof| {
            roster.professor_exams(prof).iter().all(|&y| {
                y == exam
                    || self.placements[y].map_or(true, |q| {
                        p.start >= q.start + g.exam_minutes || q.start >= p.start + g.exam_minutes
                    })
            })
        })
    }

    /// Left-justified start candidates for `exam` in `room`: day starts,
    /// padded ends of the room's exams and ends of exams sharing a
    /// professor. Sorted, deduplicated, restricted to the day windows; not
    /// checked against overlaps.
    ///
    /// If `exam` fits anywhere in `room`, it fits at one of these.
    pub fn candidate_starts(&self, exam: usize, room: usize) -> Vec<i64> {
        let g = self.model.geometry();
        let roster = self.model.roster();
        let mut starts: Vec<i64> = (0..g.num_days).map(|d| d * g.day_minutes).collect();

        for &y in &self.room_members[room] {
            if y != exam {
                if let Some(q) = self.placements[y] {
                    starts.push(q.start + g.exam_minutes + g.pause_minutes);
                }
            }
        }
        for &prof in &roster.exam_professors(exam) {
            for &y in roster.professor_exams(prof) {
                if y != exam {
                    if let Some(q) = self.placements[y] {
                        starts.push(q.start + g.exam_minutes);
                    }
                }
            }
        }

        starts.retain(|&s| g.fits_in_day(s));
        starts.sort_unstable();
        starts.dedup();
        starts
    }

    /// Distinct days on which `professor` examines (placed exams only).
    pub fn professor_days(&self, professor: usize) -> i64 {
        let g = self.model.geometry();
        let mut days: Vec<i64> = self
            .model
            .roster()
            .professor_exams(professor)
            .iter()
            .filter_map(|&x| self.placements[x])
            .map(|p| g.day_of(p.start))
            .collect();
        days.sort_unstable();
        days.dedup();
        days.len() as i64
    }

    /// Unweighted locality cost of a pair group: span plus room penalties.
    pub fn group_cost(&self, group: usize) -> i64 {
        let g = self.model.geometry();
        let members: Vec<Placement> = self.model.roster().pair_groups()[group]
            .exams
            .iter()
            .filter_map(|&x| self.placements[x])
            .collect();
        let (Some(min_start), Some(max_start)) = (
            members.iter().map(|p| p.start).min(),
            members.iter().map(|p| p.start).max(),
        ) else {
            return 0;
        };

        let mut split = 0i64;
        for (i, a) in members.iter().enumerate() {
            split += members[i + 1..]
                .iter()
                .filter(|b| b.room != a.room)
                .count() as i64;
        }
        max_start + g.exam_minutes - min_start + CROSS_ROOM_PENALTY * split
    }

    /// Weighted objective of the placed exams; equals the CP objective for
    /// a complete timetable.
    pub fn cost(&self) -> i64 {
        let w = self.model.weights();
        let roster = self.model.roster();
        let mut cost = 0;
        if w.active_days > 0 {
            cost += w.active_days
                * (0..roster.professor_count())
                    .map(|p| self.professor_days(p))
                    .sum::<i64>();
        }
        if self.model.has_locality_terms() {
            cost += w.pair_locality
                * (0..roster.pair_groups().len())
                    .map(|grp| self.group_cost(grp))
                    .sum::<i64>();
        }
        cost
    }

    /// Weighted cost of the professors and groups touched by `exams`.
    pub fn local_cost(&self, exams: &[usize]) -> i64 {
        let w = self.model.weights();
        let roster = self.model.roster();
        let mut cost = 0;

        if w.active_days > 0 {
            let mut professors: Vec<usize> = exams
                .iter()
                .flat_map(|&x| roster.exam_professors(x))
                .collect();
            professors.sort_unstable();
            professors.dedup();
            cost += w.active_days * professors.iter().map(|&p| self.professor_days(p)).sum::<i64>();
        }

        if self.model.has_locality_terms() {
            let mut groups: Vec<usize> = exams.iter().filter_map(|&x| roster.exam_group(x)).collect();
            groups.sort_unstable();
            groups.dedup();
            cost += w.pair_locality * groups.iter().map(|&grp| self.group_cost(grp)).sum::<i64>();
        }
        cost
    }

    /// Applies a move if the result is feasible; returns the cost delta and
    /// the undo record. An infeasible move leaves the state unchanged.
    pub fn apply(&mut self, mv: Move) -> Option<(i64, Undo)> {
        let targets: Vec<(usize, Placement)> = match mv {
            Move::Relocate { exam, to } => vec![(exam, to)],
            Move::Swap { first, second } => {
                let a = self.placements[first]?;
                let b = self.placements[second]?;
                if a == b {
                    return None;
                }
                vec![(first, b), (second, a)]
            }
        };
        let exams: Vec<usize> = targets.iter().map(|&(x, _)| x).collect();

        let before = self.local_cost(&exams);
        let previous: Vec<(usize, Placement)> = exams
            .iter()
            .filter_map(|&x| self.unplace(x).map(|p| (x, p)))
            .collect();
        let undo = Undo { previous };

        for &(x, p) in &targets {
            if !self.fits(x, p) {
                self.revert(undo);
                return None;
            }
            self.place(x, p);
        }

        let after = self.local_cost(&exams);
        Some((after - before, undo))
    }

    /// Restores the placements recorded in `undo`.
    pub fn revert(&mut self, undo: Undo) {
        for &(x, _) in &undo.previous {
            self.unplace(x);
        }
        for (x, p) in undo.previous {
            self.place(x, p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ExamModelBuilder, ObjectiveComposer, ObjectiveWeights};
    use crate::exam::{ClockTime, ConstraintsConfig, Exam, Roster};

    fn model(weights: ObjectiveWeights) -> ExamModel {
        let roster = Roster::new(vec![
            Exam::new(0, "Anna", "A", "B"),
            Exam::new(1, "Bernd", "A", "B"),
            Exam::new(2, "Carla", "A", "C"),
            Exam::new(3, "David", "D", "C"),
        ])
        .unwrap();
        let config = ConstraintsConfig::new(2, 2, 30)
            .with_pause(10)
            .with_day_window(
                ClockTime::new(8, 0).unwrap(),
                ClockTime::new(10, 0).unwrap(),
            );
        let mut model = ExamModelBuilder::new(&roster, &config).build().unwrap();
        ObjectiveComposer::new(weights).compose(&mut model).unwrap();
        model
    }

    fn layout() -> Vec<Placement> {
        vec![
            Placement::new(0, 0),
            Placement::new(40, 0),
            Placement::new(120, 1),
            Placement::new(0, 1),
        ]
    }

    #[test]
    fn test_fits() {
        let m = model(ObjectiveWeights::new(1, 1));
        let mut tt = Timetable::new(&m);
        tt.place(0, Placement::new(0, 0));
        // same room inside the pause
        assert!(!tt.fits(1, Placement::new(35, 0)));
        assert!(tt.fits(1, Placement::new(40, 0)));
        // other room but same professors
        assert!(!tt.fits(1, Placement::new(20, 1)));
        assert!(tt.fits(1, Placement::new(30, 1)));
        // unrelated exam in another room at the same time
        assert!(tt.fits(3, Placement::new(0, 1)));
        // crosses the end of day 0
        assert!(!tt.fits(3, Placement::new(100, 1)));
        assert!(!tt.fits(3, Placement::new(0, 2)));
    }

    #[test]
    fn test_candidate_starts() {
        let m = model(ObjectiveWeights::new(1, 0));
        let mut tt = Timetable::new(&m);
        tt.place(0, Placement::new(0, 0));
        tt.place(3, Placement::new(50, 1));
        // day starts 0 and 120, padded end 40 in room 0, professor end 30
        assert_eq!(tt.candidate_starts(1, 0), vec![0, 30, 40, 120]);
        // exam 2 shares C with exam 3 (ends at 80) and A with exam 0
        assert_eq!(tt.candidate_starts(2, 1), vec![0, 30, 80, 90, 120]);
    }

    #[test]
    fn test_cost_matches_model() {
        for weights in [
            ObjectiveWeights::new(3, 0),
            ObjectiveWeights::new(0, 2),
            ObjectiveWeights::new(5, 1),
        ] {
            let m = model(weights);
            let tt = Timetable::from_placements(&m, &layout());
            let assignment = m.complete(&layout()).unwrap();
            assert_eq!(tt.cost(), m.objective_value(&assignment), "{weights:?}");
        }
    }

    #[test]
    fn test_apply_and_revert() {
        let m = model(ObjectiveWeights::new(1, 1));
        let mut tt = Timetable::from_placements(&m, &layout());
        let before = tt.cost();

        // move exam 2 to day 0: A and C drop to one active day each
        let (delta, undo) = tt
            .apply(Move::Relocate {
                exam: 2,
                to: Placement::new(80, 1),
            })
            .unwrap();
        assert_eq!(tt.cost(), before + delta);
        assert!(delta < 0);

        tt.revert(undo);
        assert_eq!(tt.cost(), before);
        assert_eq!(tt.placement(2), Some(Placement::new(120, 1)));
    }

    #[test]
    fn test_infeasible_move_leaves_state() {
        let m = model(ObjectiveWeights::new(1, 1));
        let mut tt = Timetable::from_placements(&m, &layout());
        assert!(tt
            .apply(Move::Relocate {
                exam: 1,
                to: Placement::new(10, 1),
            })
            .is_none());
        assert_eq!(tt.complete_placements().unwrap(), layout());
    }

    #[test]
    fn test_swap() {
        let m = model(ObjectiveWeights::new(1, 1));
        let mut tt = Timetable::from_placements(&m, &layout());
        let before = tt.cost();
        let (delta, _) = tt.apply(Move::Swap { first: 0, second: 1 }).unwrap();
        // exams 0 and 1 form the only group; swapping them changes nothing
        assert_eq!(delta, 0);
        assert_eq!(tt.cost(), before);
        assert_eq!(tt.placement(0), Some(Placement::new(40, 0)));
    }
}
