//! Hard-constraint formulation.

use crate::cp::{AffineExpr, Cmp, CpModel, LinearExpr};
use crate::error::ConfigError;
use crate::exam::{ConstraintsConfig, Roster};

use super::exam_model::{ExamModel, ExamVars};

/// Builds the decision variables and hard constraints of an exam timetable.
///
/// Per exam: `start`, `end`, `day`, `room` and a within-day `offset` with
/// `start == day·D + offset` and `offset <= D - e` (D = day length,
/// e = exam duration). Per room: a boolean reified on `room == r` controls
/// an optional interval `[start, end + pause)`; the room's intervals must
/// not overlap. Per professor: the exams' raw intervals must not overlap.
/// Per professor and day: an active-day boolean, true iff one of the
/// professor's exams is on that day.
///
/// # Examples
///
/// ```
/// use u_timetable::builder::ExamModelBuilder;
/// use u_timetable::exam::{ConstraintsConfig, Exam, Roster};
///
/// let roster = Roster::new(vec![
///     Exam::new(0, "Anna", "Prof. A", "Prof. B"),
///     Exam::new(1, "Bernd", "Prof. B", "Prof. C"),
/// ])
/// .unwrap();
/// let config = ConstraintsConfig::new(1, 2, 30);
/// let model = ExamModelBuilder::new(&roster, &config).build().unwrap();
/// assert_eq!(model.exam_count(), 2);
/// // one no-overlap per room and per professor
/// assert_eq!(model.cp().no_overlap_count(), 2 + 3);
/// ```
pub struct ExamModelBuilder<'a> {
    roster: &'a Roster,
    config: &'a ConstraintsConfig,
}

impl<'a> ExamModelBuilder<'a> {
    pub fn new(roster: &'a Roster, config: &'a ConstraintsConfig) -> Self {
        Self { roster, config }
    }

    /// Builds the model.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an invalid day window, zero days or
    /// rooms, or a zero exam duration. Nothing is built in that case.
    pub fn build(&self) -> Result<ExamModel, ConfigError> {
        let g = self.config.geometry()?;
        let roster = self.roster;
        let horizon = g.horizon();
        let num_days = g.num_days as usize;
        let num_rooms = g.num_rooms as usize;

        let mut cp = CpModel::new("exam_timetable");

        let mut exams = Vec::with_capacity(roster.len());
        for exam in roster.exams() {
            let id = exam.exam_id;
            let start = cp.new_int_var(0, horizon, format!("start_{id}"));
            let end = cp.new_int_var(0, horizon, format!("end_{id}"));
            let day = cp.new_int_var(0, g.num_days - 1, format!("day_{id}"));
            let room = cp.new_int_var(0, g.num_rooms - 1, format!("room_{id}"));
            let interval = cp.new_interval(
                format!("interval_{id}"),
                start,
                g.exam_minutes,
                AffineExpr::from(end),
            );

            // start == day * D + offset, offset <= D - e
            let offset = cp.new_int_var(0, g.day_minutes, format!("start_in_day_{id}"));
            cp.add_linear(
                LinearExpr::from(start)
                    .term(day, -g.day_minutes)
                    .term(offset, -1),
                Cmp::Eq,
                0,
            );
            cp.add_linear(LinearExpr::from(offset), Cmp::Le, g.last_offset());

            exams.push(ExamVars {
                start,
                end,
                day,
                offset,
                room,
                interval,
            });
        }

        let mut room_presence = Vec::with_capacity(num_rooms);
        let mut buffered = Vec::with_capacity(num_rooms);
        for r in 0..num_rooms {
            let mut present = Vec::with_capacity(exams.len());
            let mut intervals = Vec::with_capacity(exams.len());
            for (exam, vars) in roster.exams().iter().zip(&exams) {
                let id = exam.exam_id;
                let in_room = cp.new_bool_var(format!("exam_{id}_in_room_{r}"));
                cp.add_reified(in_room, LinearExpr::from(vars.room), Cmp::Eq, r as i64);
                let padded = cp.new_optional_interval(
                    format!("buffered_interval_{id}_room_{r}"),
                    vars.start,
                    g.exam_minutes + g.pause_minutes,
                    AffineExpr::new(vars.end, g.pause_minutes),
                    in_room.literal(),
                );
                present.push(in_room);
                intervals.push(padded);
            }
            cp.add_no_overlap(intervals.clone());
            room_presence.push(present);
            buffered.push(intervals);
        }

        for p in 0..roster.professor_count() {
            let intervals = roster
                .professor_exams(p)
                .iter()
                .map(|&x| exams[x].interval)
                .collect();
            cp.add_no_overlap(intervals);
        }

        let mut on_day = Vec::with_capacity(exams.len());
        for (exam, vars) in roster.exams().iter().zip(&exams) {
            let id = exam.exam_id;
            let indicators: Vec<_> = (0..num_days)
                .map(|d| {
                    let b = cp.new_bool_var(format!("exam_{id}_on_day_{d}"));
                    cp.add_reified(b, LinearExpr::from(vars.day), Cmp::Eq, d as i64);
                    b
                })
                .collect();
            on_day.push(indicators);
        }

        let mut active_days = Vec::with_capacity(roster.professor_count());
        for p in 0..roster.professor_count() {
            let name = roster.professor_name(p);
            let mut per_day = Vec::with_capacity(num_days);
            for d in 0..num_days {
                let active = cp.new_bool_var(format!("active_{name}_day{d}"));
                let indicators: Vec<_> = roster
                    .professor_exams(p)
                    .iter()
                    .map(|&x| on_day[x][d])
                    .collect();
                cp.add_bool_or_enforced(
                    indicators.iter().map(|b| b.literal()).collect(),
                    vec![active.literal()],
                );
                cp.add_linear_enforced(
                    LinearExpr::sum(indicators.iter().map(|b| b.var())),
                    Cmp::Eq,
                    0,
                    vec![active.not()],
                );
                per_day.push(active);
            }
            active_days.push(per_day);
        }

        Ok(ExamModel {
            cp,
            roster: roster.clone(),
            geometry: g,
            exams,
            room_presence,
            buffered,
            on_day,
            active_days,
            objective: None,
        })
    }
}
