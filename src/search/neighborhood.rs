//! Local-search moves.

use rand::Rng;

use crate::builder::Placement;

use super::state::Timetable;

/// Probability of proposing a relocation rather than a swap.
const RELOCATE_PROBABILITY: f64 = 0.7;

/// Probability that a relocation ignores anchors and picks any start.
const RANDOM_START_PROBABILITY: f64 = 0.1;

/// A neighbourhood move over complete timetables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Move {
    /// Moves one exam to a new start and room.
    Relocate { exam: usize, to: Placement },
    /// Exchanges the start and room of two exams.
    Swap { first: usize, second: usize },
}

/// Placements overwritten by a move.
#[derive(Debug, Clone)]
pub(crate) struct Undo {
    pub(crate) previous: Vec<(usize, Placement)>,
}

/// Proposes a random move, or `None` for an empty timetable.
///
/// Relocations target anchored starts: left-justified positions and
/// positions right before an exam that shares the room or a professor, so
/// exams slide into gaps next to related exams.
pub(crate) fn propose<R: Rng>(tt: &Timetable<'_>, rng: &mut R) -> Option<Move> {
    let n = tt.exam_count();
    if n == 0 {
        return None;
    }
    let exam = rng.random_range(0..n);

    if n == 1 || rng.random_bool(RELOCATE_PROBABILITY) {
        let to = relocation_target(tt, exam, rng);
        return Some(Move::Relocate { exam, to });
    }

    let mut second = rng.random_range(0..n - 1);
    if second >= exam {
        second += 1;
    }
    Some(Move::Swap {
        first: exam,
        second,
    })
}

fn relocation_target<R: Rng>(tt: &Timetable<'_>, exam: usize, rng: &mut R) -> Placement {
    let model = tt.model();
    let g = model.geometry();
    let room = rng.random_range(0..g.num_rooms);

    if g.last_offset() >= 0 && rng.random_bool(RANDOM_START_PROBABILITY) {
        let day = rng.random_range(0..g.num_days);
        let offset = rng.random_range(0..=g.last_offset());
        return Placement::new(day * g.day_minutes + offset, room);
    }

    let mut starts = tt.candidate_starts(exam, room as usize);

    // right-justified anchors: end just before a related exam
    let roster = model.roster();
    let related = roster
        .exam_professors(exam)
        .into_iter()
        .flat_map(|p| roster.professor_exams(p).iter().copied())
        .filter(|&y| y != exam);
    for y in related {
        if let Some(q) = tt.placement(y) {
            starts.push(q.start - g.exam_minutes);
            if q.room == room {
                starts.push(q.start - g.exam_minutes - g.pause_minutes);
            }
        }
    }

    let current = tt.placement(exam);
    starts.retain(|&s| g.fits_in_day(s) && current != Some(Placement::new(s, room)));
    if starts.is_empty() {
        return current.unwrap_or(Placement::new(0, room));
    }
    Placement::new(starts[rng.random_range(0..starts.len())], room)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ExamModelBuilder, ObjectiveComposer, ObjectiveWeights};
    use crate::exam::{ConstraintsConfig, Exam, Roster};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_propose_targets_valid_windows() {
        let roster = Roster::new(vec![
            Exam::new(0, "a", "P", "Q"),
            Exam::new(1, "b", "P", "Q"),
            Exam::new(2, "c", "R", "Q"),
        ])
        .unwrap();
        let config = ConstraintsConfig::new(2, 2, 45).with_pause(15);
        let mut model = ExamModelBuilder::new(&roster, &config).build().unwrap();
        ObjectiveComposer::new(ObjectiveWeights::new(1, 1))
            .compose(&mut model)
            .unwrap();
        let g = *model.geometry();

        let tt = Timetable::from_placements(
            &model,
            &[
                Placement::new(0, 0),
                Placement::new(60, 0),
                Placement::new(120, 1),
            ],
        );
        let mut rng = StdRng::seed_from_u64(7);
        let mut swaps = 0;
        for _ in 0..500 {
            match propose(&tt, &mut rng).unwrap() {
                Move::Relocate { exam, to } => {
                    assert!(exam < 3);
                    assert!(g.fits_in_day(to.start), "{to:?}");
                    assert!((0..g.num_rooms).contains(&to.room));
                }
                Move::Swap { first, second } => {
                    assert_ne!(first, second);
                    swaps += 1;
                }
            }
        }
        assert!(swaps > 0);
    }

    #[test]
    fn test_empty_timetable() {
        let roster = Roster::new(Vec::new()).unwrap();
        let config = ConstraintsConfig::new(1, 1, 30);
        let model = ExamModelBuilder::new(&roster, &config).build().unwrap();
        let tt = Timetable::new(&model);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(propose(&tt, &mut rng).is_none());
    }
}
