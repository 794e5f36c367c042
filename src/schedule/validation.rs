//! Independent check of a timetable against the hard rules.
//!
//! Works on plain [`ExamAssignment`]s and the exam data, without the CP
//! model, so it can audit timetables from any source.

use std::fmt;

use crate::builder::ExamAssignment;
use crate::exam::{DayGeometry, Roster};

/// A broken hard rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardViolation {
    /// An exam has no assignment.
    Unassigned { exam_id: u32 },
    /// An exam has more than one assignment.
    Duplicate { exam_id: u32 },
    /// `end` differs from `start` plus the exam duration.
    Duration { exam_id: u32, start: i64, end: i64 },
    /// The exam starts outside the horizon or runs past the end of its day.
    OutsideDay { exam_id: u32, start: i64 },
    /// Stored day or offset disagree with the start.
    DayMismatch { exam_id: u32, day: i64, offset: i64 },
    RoomOutOfRange { exam_id: u32, room: i64 },
    /// Two exams in one room closer than duration plus pause.
    RoomConflict { room: i64, first: u32, second: u32 },
    /// A professor examines two overlapping exams.
    ProfessorConflict {
        professor: String,
        first: u32,
        second: u32,
    },
}

impl fmt::Display for HardViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unassigned { exam_id } => write!(f, "exam {exam_id} is not scheduled"),
            Self::Duplicate { exam_id } => write!(f, "exam {exam_id} is scheduled twice"),
            Self::Duration {
                exam_id,
                start,
                end,
            } => write!(f, "exam {exam_id} runs from {start} to {end}"),
            Self::OutsideDay { exam_id, start } => {
                write!(f, "exam {exam_id} at minute {start} does not fit in a day")
            }
            Self::DayMismatch {
                exam_id,
                day,
                offset,
            } => write!(
                f,
                "exam {exam_id} has day {day} and offset {offset} inconsistent with its start"
            ),
            Self::RoomOutOfRange { exam_id, room } => {
                write!(f, "exam {exam_id} uses unknown room {room}")
            }
            Self::RoomConflict {
                room,
                first,
                second,
            } => write!(f, "exams {first} and {second} collide in room {room}"),
            Self::ProfessorConflict {
                professor,
                first,
                second,
            } => write!(f, "{professor} examines {first} and {second} at the same time"),
        }
    }
}

/// Every hard-rule violation of `assignments`, empty for a valid timetable.
pub fn find_violations(
    assignments: &[ExamAssignment],
    roster: &Roster,
    geometry: &DayGeometry,
) -> Vec<HardViolation> {
    let g = geometry;
    let mut violations = Vec::new();
    let id = |exam: usize| roster.exam(exam).exam_id;

    let mut by_exam: Vec<Option<ExamAssignment>> = vec![None; roster.len()];
    for a in assignments {
        if a.exam >= roster.len() {
            continue;
        }
        if by_exam[a.exam].replace(*a).is_some() {
            violations.push(HardViolation::Duplicate { exam_id: id(a.exam) });
        }
    }

    for (exam, slot) in by_exam.iter().enumerate() {
        let Some(a) = slot else {
            violations.push(HardViolation::Unassigned { exam_id: id(exam) });
            continue;
        };
        let exam_id = id(exam);
        if a.end != a.start + g.exam_minutes {
            violations.push(HardViolation::Duration {
                exam_id,
                start: a.start,
                end: a.end,
            });
        }
        if !g.fits_in_day(a.start) {
            violations.push(HardViolation::OutsideDay {
                exam_id,
                start: a.start,
            });
        } else if a.day != g.day_of(a.start) || a.offset != g.offset_of(a.start) {
            violations.push(HardViolation::DayMismatch {
                exam_id,
                day: a.day,
                offset: a.offset,
            });
        }
        if a.room < 0 || a.room >= g.num_rooms {
            violations.push(HardViolation::RoomOutOfRange {
                exam_id,
                room: a.room,
            });
        }
    }

    let placed: Vec<&ExamAssignment> = by_exam.iter().flatten().collect();
    for (i, a) in placed.iter().enumerate() {
        for b in &placed[i + 1..] {
            if a.room == b.room {
                let gap = g.exam_minutes + g.pause_minutes;
                if a.start < b.start + gap && b.start < a.start + gap {
                    violations.push(HardViolation::RoomConflict {
                        room: a.room,
                        first: id(a.exam),
                        second: id(b.exam),
                    });
                }
            }
            if a.start < b.end && b.start < a.end {
                let [a1, a2] = roster.exam_professors(a.exam);
                for p in roster.exam_professors(b.exam) {
                    if p == a1 || p == a2 {
                        violations.push(HardViolation::ProfessorConflict {
                            professor: roster.professor_name(p).to_string(),
                            first: id(a.exam),
                            second: id(b.exam),
                        });
                    }
                }
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exam::{ConstraintsConfig, Exam};

    fn roster() -> Roster {
        Roster::new(vec![
            Exam::new(1, "a", "P", "Q"),
            Exam::new(2, "b", "P", "R"),
            Exam::new(3, "c", "S", "T"),
        ])
        .unwrap()
    }

    fn geometry() -> DayGeometry {
        // 08:00-16:00, 480-minute days
        ConstraintsConfig::new(2, 2, 30)
            .with_pause(10)
            .geometry()
            .unwrap()
    }

    fn at(exam: usize, start: i64, room: i64) -> ExamAssignment {
        let g = geometry();
        ExamAssignment {
            exam,
            exam_id: exam as u32 + 1,
            start,
            end: start + 30,
            day: g.day_of(start),
            offset: g.offset_of(start),
            room,
        }
    }

    #[test]
    fn test_valid_timetable() {
        let assignments = vec![at(0, 0, 0), at(1, 30, 1), at(2, 40, 0)];
        assert!(find_violations(&assignments, &roster(), &geometry()).is_empty());
    }

    #[test]
    fn test_room_pause_is_enforced() {
        let assignments = vec![at(0, 0, 0), at(1, 40, 1), at(2, 35, 0)];
        assert_eq!(
            find_violations(&assignments, &roster(), &geometry()),
            vec![HardViolation::RoomConflict {
                room: 0,
                first: 1,
                second: 3
            }]
        );
    }

    #[test]
    fn test_professor_overlap() {
        let assignments = vec![at(0, 0, 0), at(1, 15, 1), at(2, 480, 0)];
        let violations = find_violations(&assignments, &roster(), &geometry());
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].to_string(),
            "P examines 1 and 2 at the same time"
        );
    }

    #[test]
    fn test_day_boundary_and_missing() {
        // 470 + 30 runs past 16:00
        let assignments = vec![at(0, 470, 0), at(1, 0, 2)];
        let violations = find_violations(&assignments, &roster(), &geometry());
        assert!(violations.contains(&HardViolation::OutsideDay {
            exam_id: 1,
            start: 470
        }));
        assert!(violations.contains(&HardViolation::RoomOutOfRange {
            exam_id: 2,
            room: 2
        }));
        assert!(violations.contains(&HardViolation::Unassigned { exam_id: 3 }));
    }

    #[test]
    fn test_inconsistent_derived_fields() {
        let mut first = at(0, 0, 0);
        first.end = 45;
        let mut second = at(1, 500, 1);
        second.day = 0;
        let violations = find_violations(&[first, second, at(2, 100, 0)], &roster(), &geometry());
        assert!(matches!(violations[0], HardViolation::Duration { exam_id: 1, .. }));
        assert!(matches!(violations[1], HardViolation::DayMismatch { exam_id: 2, .. }));
        assert_eq!(violations.len(), 2);
    }
}
