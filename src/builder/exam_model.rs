//! The built exam timetabling model.

use crate::cp::{BoolVar, Conflict, CpAssignment, CpModel, IntervalId, VarId};
use crate::exam::{DayGeometry, Roster};

use super::objective::{ComposedObjective, ObjectiveWeights};

/// Decision and derived variables of one exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamVars {
    /// Start minute within the horizon.
    pub start: VarId,
    /// `start + exam_minutes`.
    pub end: VarId,
    pub day: VarId,
    /// Start minute within the day.
    pub offset: VarId,
    pub room: VarId,
    /// Unpadded exam interval, used for professor non-overlap.
    pub interval: IntervalId,
}

/// The two free decisions of an exam; everything else is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Placement {
    pub start: i64,
    pub room: i64,
}

impl Placement {
    pub fn new(start: i64, room: i64) -> Self {
        Self { start, room }
    }
}

/// Solved values of one exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamAssignment {
    /// Position of the exam in the roster.
    pub exam: usize,
    pub exam_id: u32,
    pub start: i64,
    pub end: i64,
    /// Zero-based day.
    pub day: i64,
    /// Minutes after the start of the day.
    pub offset: i64,
    /// Zero-based room.
    pub room: i64,
}

/// A complete exam timetabling model: the CP formulation plus the handles
/// needed to read and write it in domain terms.
///
/// Built by [`ExamModelBuilder`](super::ExamModelBuilder); the objective is
/// attached by [`ObjectiveComposer`](super::ObjectiveComposer).
#[derive(Debug, Clone)]
pub struct ExamModel {
    pub(crate) cp: CpModel,
    pub(crate) roster: Roster,
    pub(crate) geometry: DayGeometry,
    pub(crate) exams: Vec<ExamVars>,
    /// `[room][exam]`: exam is held in room.
    pub(crate) room_presence: Vec<Vec<BoolVar>>,
    /// `[room][exam]`: pause-padded interval, present iff the exam uses the room.
    pub(crate) buffered: Vec<Vec<IntervalId>>,
    /// `[exam][day]`: exam is held on day.
    pub(crate) on_day: Vec<Vec<BoolVar>>,
    /// `[professor][day]`: professor examines on day.
    pub(crate) active_days: Vec<Vec<BoolVar>>,
    pub(crate) objective: Option<ComposedObjective>,
}

impl ExamModel {
    pub fn cp(&self) -> &CpModel {
        &self.cp
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn geometry(&self) -> &DayGeometry {
        &self.geometry
    }

    pub fn exam_vars(&self, exam: usize) -> &ExamVars {
        &self.exams[exam]
    }

    pub fn exam_count(&self) -> usize {
        self.exams.len()
    }

    pub fn room_presence(&self, room: usize, exam: usize) -> BoolVar {
        self.room_presence[room][exam]
    }

    pub fn buffered_interval(&self, room: usize, exam: usize) -> IntervalId {
        self.buffered[room][exam]
    }

    pub fn on_day(&self, exam: usize, day: usize) -> BoolVar {
        self.on_day[exam][day]
    }

    pub fn active_day(&self, professor: usize, day: usize) -> BoolVar {
        self.active_days[professor][day]
    }

    pub fn objective(&self) -> Option<&ComposedObjective> {
        self.objective.as_ref()
    }

    /// Weights of the composed objective (all zero before composition).
    pub fn weights(&self) -> ObjectiveWeights {
        self.objective
            .as_ref()
            .map(|o| o.weights)
            .unwrap_or_default()
    }

    /// Whether pair-locality terms are part of the objective.
    pub fn has_locality_terms(&self) -> bool {
        self.objective
            .as_ref()
            .is_some_and(|o| !o.spans.is_empty() || !o.cross_room.is_empty())
    }

    /// Variable values fixed by a placement of every exam.
    pub fn decisions(&self, placements: &[Placement]) -> Vec<(VarId, i64)> {
        self.exams
            .iter()
            .zip(placements)
            .flat_map(|(vars, p)| [(vars.start, p.start), (vars.room, p.room)])
            .collect()
    }

    /// Derives and verifies the full assignment for a placement of every
    /// exam. `Ok` certifies the placement against every hard constraint.
    pub fn complete(&self, placements: &[Placement]) -> Result<CpAssignment, Conflict> {
        if placements.len() != self.exams.len() {
            return Err(Conflict { constraint: None });
        }
        self.cp.complete(&self.decisions(placements))
    }

    /// Objective value of a certified assignment (0 without an objective).
    pub fn objective_value(&self, assignment: &CpAssignment) -> i64 {
        self.cp.objective_value(assignment).unwrap_or(0)
    }

    /// Per-exam values read from a certified assignment.
    pub fn exam_assignments(&self, assignment: &CpAssignment) -> Vec<ExamAssignment> {
        self.exams
            .iter()
            .enumerate()
            .map(|(exam, vars)| ExamAssignment {
                exam,
                exam_id: self.roster.exam(exam).exam_id,
                start: assignment.value(vars.start),
                end: assignment.value(vars.end),
                day: assignment.value(vars.day),
                offset: assignment.value(vars.offset),
                room: assignment.value(vars.room),
            })
            .collect()
    }
}
