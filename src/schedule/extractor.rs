//! Human-readable schedule tables.

use std::fmt;
use std::io::{self, Write};

use crate::builder::{ExamAssignment, ObjectiveWeights, CROSS_ROOM_PENALTY};
use crate::exam::{ClockTime, DayGeometry, Roster};

/// One line of the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScheduleRow {
    /// 1-based day.
    pub day: u32,
    /// 1-based room.
    pub room: u32,
    pub start_time: ClockTime,
    pub exam_id: u32,
    pub student: String,
    pub professor_1: String,
    pub professor_2: String,
}

/// Schedule rows sorted by day, room and start time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScheduleTable {
    rows: Vec<ScheduleRow>,
}

impl ScheduleTable {
    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleRow> {
        self.rows.iter()
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> ScheduleTable {
        ScheduleTable {
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Writes the table as CSV with a header line.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "day,room,start_time,exam_id,student,professor_1,professor_2")?;
        for row in &self.rows {
            writeln!(
                out,
                "{},{},{},{},{},{},{}",
                row.day,
                row.room,
                row.start_time,
                row.exam_id,
                csv_field(&row.student),
                csv_field(&row.professor_1),
                csv_field(&row.professor_2),
            )?;
        }
        Ok(())
    }
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

impl<'a> IntoIterator for &'a ScheduleTable {
    type Item = &'a ScheduleRow;
    type IntoIter = std::slice::Iter<'a, ScheduleRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl fmt::Display for ScheduleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = |header: &str, cell: fn(&ScheduleRow) -> usize| {
            self.rows
                .iter()
                .map(cell)
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
        };
        let student = width("Student", |r| r.student.chars().count());
        let prof_1 = width("Professor 1", |r| r.professor_1.chars().count());

        writeln!(
            f,
            "{:>3}  {:>4}  {:5}  {:student$}  {:prof_1$}  Professor 2",
            "Day", "Room", "Start", "Student", "Professor 1"
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "{:>3}  {:>4}  {}  {:student$}  {:prof_1$}  {}",
                r.day, r.room, r.start_time, r.student, r.professor_1, r.professor_2
            )?;
        }
        Ok(())
    }
}

/// Turns solved assignments into a [`ScheduleTable`].
#[derive(Debug, Clone, Copy)]
pub struct ScheduleExtractor<'a> {
    roster: &'a Roster,
    geometry: &'a DayGeometry,
}

impl<'a> ScheduleExtractor<'a> {
    pub fn new(roster: &'a Roster, geometry: &'a DayGeometry) -> Self {
        Self { roster, geometry }
    }

    /// Builds the sorted schedule. Days and rooms are 1-based; start times
    /// are the start of day plus the offset within the day.
    pub fn extract(&self, assignments: &[ExamAssignment]) -> ScheduleTable {
        let mut rows: Vec<ScheduleRow> = assignments
            .iter()
            .map(|a| {
                let exam = self.roster.exam(a.exam);
                ScheduleRow {
                    day: (self.geometry.day_of(a.start) + 1) as u32,
                    room: (a.room + 1) as u32,
                    start_time: self.geometry.clock_at(a.start),
                    exam_id: exam.exam_id,
                    student: exam.student.clone(),
                    professor_1: exam.prof_1.clone(),
                    professor_2: exam.prof_2.clone(),
                }
            })
            .collect();
        rows.sort_by(|a, b| {
            (a.day, a.room, a.start_time).cmp(&(b.day, b.room, b.start_time))
        });
        ScheduleTable { rows }
    }

    /// Recomputes the weighted soft cost of a complete assignment from the
    /// exam data alone.
    pub fn recompute_objective(
        &self,
        assignments: &[ExamAssignment],
        weights: ObjectiveWeights,
    ) -> i64 {
        let g = self.geometry;
        let mut start_of = vec![None; self.roster.len()];
        for a in assignments {
            start_of[a.exam] = Some(*a);
        }

        let mut active_days = 0i64;
        for p in 0..self.roster.professor_count() {
            let mut days: Vec<i64> = self
                .roster
                .professor_exams(p)
                .iter()
                .filter_map(|&x| start_of[x].map(|a| g.day_of(a.start)))
                .collect();
            days.sort_unstable();
            days.dedup();
            active_days += days.len() as i64;
        }

        let mut locality = 0i64;
        if weights.pair_locality > 0 {
            for group in self.roster.pair_groups() {
                let members: Vec<ExamAssignment> =
                    group.exams.iter().filter_map(|&x| start_of[x]).collect();
                let min_start = members.iter().map(|a| a.start).min().unwrap_or(0);
                let max_end = members
                    .iter()
                    .map(|a| a.start + g.exam_minutes)
                    .max()
                    .unwrap_or(0);
                locality += max_end - min_start;
                for (i, a) in members.iter().enumerate() {
                    for b in &members[i + 1..] {
                        if a.room != b.room {
                            locality += CROSS_ROOM_PENALTY;
                        }
                    }
                }
            }
        }

        weights.active_days * active_days + weights.pair_locality * locality
    }
}
