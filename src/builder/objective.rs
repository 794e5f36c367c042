//! Soft-cost composition.
//!
//! `objective = w_active · Σ active-day booleans
//!            + w_locality · (Σ pair spans + 120 · Σ cross-room booleans)`
//!
//! bound to a variable with domain `[0, OBJECTIVE_CAP]`.

use crate::cp::{BoolVar, Cmp, LinearExpr, VarId};
use crate::error::Error;
use crate::exam::OptimizationConfig;

use super::exam_model::ExamModel;

/// Upper bound of the objective variable.
pub const OBJECTIVE_CAP: i64 = 100_000_000;

/// Cost of two exams of one examiner pair held in different rooms.
pub const CROSS_ROOM_PENALTY: i64 = 120;

/// Integer soft-cost weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectiveWeights {
    pub active_days: i64,
    pub pair_locality: i64,
}

impl ObjectiveWeights {
    pub fn new(active_days: u32, pair_locality: u32) -> Self {
        Self {
            active_days: i64::from(active_days),
            pair_locality: i64::from(pair_locality),
        }
    }
}

impl From<&OptimizationConfig> for ObjectiveWeights {
    fn from(config: &OptimizationConfig) -> Self {
        Self::new(config.weight_active_days, config.weight_prof_pair_locality)
    }
}

/// Span variables of one examiner-pair group.
#[derive(Debug, Clone, Copy)]
pub struct PairSpan {
    /// Index into [`Roster::pair_groups`](crate::exam::Roster::pair_groups).
    pub group: usize,
    pub min_start: VarId,
    pub max_end: VarId,
    /// `max_end - min_start`.
    pub span: VarId,
}

/// "Different rooms" indicator of two exams of one group.
#[derive(Debug, Clone, Copy)]
pub struct CrossRoomTerm {
    pub exams: (usize, usize),
    pub differs: BoolVar,
}

/// Handles of the composed objective.
#[derive(Debug, Clone)]
pub struct ComposedObjective {
    /// `total_objective`, the minimized variable.
    pub var: VarId,
    pub weights: ObjectiveWeights,
    pub spans: Vec<PairSpan>,
    pub cross_room: Vec<CrossRoomTerm>,
}

/// Attaches the weighted soft cost to a built model.
///
/// Locality terms are only created when the locality weight is positive.
#[derive(Debug, Clone, Copy)]
pub struct ObjectiveComposer {
    weights: ObjectiveWeights,
}

impl ObjectiveComposer {
    pub fn new(weights: ObjectiveWeights) -> Self {
        Self { weights }
    }

    /// Largest objective value any assignment of `model` can reach.
    ///
    /// Each professor active on `min(load, num_days)` days, every span
    /// covering the horizon and every pair split across rooms.
    pub fn worst_case_cost(&self, model: &ExamModel) -> i64 {
        let g = model.geometry();
        let roster = model.roster();
        let active_days = (0..roster.professor_count())
            .map(|p| (roster.professor_exams(p).len() as i64).min(g.num_days))
            .fold(0i64, i64::saturating_add);
        let active = self.weights.active_days.saturating_mul(active_days);

        let locality = model
            .roster()
            .pair_groups()
            .iter()
            .map(|group| {
                let pairs = group.pair_count() as i64;
                g.horizon()
                    .saturating_add(CROSS_ROOM_PENALTY.saturating_mul(pairs))
            })
            .fold(0i64, i64::saturating_add);

        active.saturating_add(self.weights.pair_locality.saturating_mul(locality))
    }

    /// Adds the soft-cost terms and the minimized `total_objective`.
    ///
    /// # Errors
    ///
    /// [`Error::ObjectiveCapExceeded`] when the worst case does not fit
    /// below [`OBJECTIVE_CAP`]; the model is left unchanged.
    pub fn compose(&self, model: &mut ExamModel) -> Result<(), Error> {
        let worst_case = self.worst_case_cost(model);
        if worst_case > OBJECTIVE_CAP {
            return Err(Error::ObjectiveCapExceeded {
                worst_case,
                cap: OBJECTIVE_CAP,
            });
        }

        let w = self.weights;
        let horizon = model.geometry.horizon();
        let cp = &mut model.cp;
        let mut cost = LinearExpr::new();

        if w.active_days > 0 {
            for active in model.active_days.iter().flatten() {
                cost.add_term(active.var(), w.active_days);
            }
        }

        let mut spans = Vec::new();
        let mut cross_room = Vec::new();
        if w.pair_locality > 0 {
            for (index, group) in model.roster.pair_groups().iter().enumerate() {
                let exams = &group.exams;
                let first = model.roster.exam(exams[0]).exam_id;

                let min_start = cp.new_int_var(0, horizon, format!("min_start_{first}"));
                let max_end = cp.new_int_var(0, horizon, format!("max_end_{first}"));
                cp.add_min_equality(
                    min_start,
                    exams.iter().map(|&x| model.exams[x].start.into()).collect(),
                );
                cp.add_max_equality(
                    max_end,
                    exams.iter().map(|&x| model.exams[x].end.into()).collect(),
                );
                let span = cp.new_int_var(0, horizon, format!("span_{first}"));
                cp.add_linear(
                    LinearExpr::from(span).term(max_end, -1).term(min_start, 1),
                    Cmp::Eq,
                    0,
                );
                cost.add_term(span, w.pair_locality);
                spans.push(PairSpan {
                    group: index,
                    min_start,
                    max_end,
                    span,
                });

                for (i, &a) in exams.iter().enumerate() {
                    for &b in &exams[i + 1..] {
                        let id_a = model.roster.exam(a).exam_id;
                        let id_b = model.roster.exam(b).exam_id;
                        let differs = cp.new_bool_var(format!("rooms_diff_{id_a}_{id_b}"));
                        cp.add_reified(
                            differs,
                            LinearExpr::from(model.exams[a].room).term(model.exams[b].room, -1),
                            Cmp::Ne,
                            0,
                        );
                        cost.add_term(differs.var(), w.pair_locality * CROSS_ROOM_PENALTY);
                        cross_room.push(CrossRoomTerm {
                            exams: (a, b),
                            differs,
                        });
                    }
                }
            }
        }

        let total = cp.new_int_var(0, OBJECTIVE_CAP, "total_objective");
        cp.add_linear(cost.term(total, -1), Cmp::Eq, 0);
        cp.minimize(LinearExpr::from(total));

        model.objective = Some(ComposedObjective {
            var: total,
            weights: w,
            spans,
            cross_room,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ExamModelBuilder, Placement};
    use crate::exam::{ClockTime, ConstraintsConfig, Exam, Roster};

    fn model(weights: ObjectiveWeights) -> ExamModel {
        let roster = Roster::new(vec![
            Exam::new(0, "Anna", "Prof. A", "Prof. B"),
            Exam::new(1, "Bernd", "Prof. B", "Prof. A"),
            Exam::new(2, "Carla", "Prof. A", "Prof. C"),
        ])
        .unwrap();
        let config = ConstraintsConfig::new(2, 2, 30).with_day_window(
            ClockTime::new(8, 0).unwrap(),
            ClockTime::new(10, 0).unwrap(),
        );
        let mut model = ExamModelBuilder::new(&roster, &config).build().unwrap();
        ObjectiveComposer::new(weights).compose(&mut model).unwrap();
        model
    }

    #[test]
    fn test_active_day_cost() {
        let m = model(ObjectiveWeights::new(10, 0));
        assert!(!m.has_locality_terms());
        // all on day 0: A, B, C active once each
        let same_day = [
            Placement::new(0, 0),
            Placement::new(30, 0),
            Placement::new(60, 0),
        ];
        let a = m.complete(&same_day).unwrap();
        assert_eq!(m.objective_value(&a), 30);

        // exam 2 on day 1: A active twice
        let spread = [
            Placement::new(0, 0),
            Placement::new(30, 0),
            Placement::new(120, 0),
        ];
        let a = m.complete(&spread).unwrap();
        assert_eq!(m.objective_value(&a), 40);
    }

    #[test]
    fn test_locality_cost() {
        let m = model(ObjectiveWeights::new(0, 2));
        assert!(m.has_locality_terms());
        let composed = m.objective().unwrap();
        assert_eq!(composed.spans.len(), 1);
        assert_eq!(composed.cross_room.len(), 1);

        // same room, back to back: span 60
        let close = [
            Placement::new(0, 0),
            Placement::new(30, 0),
            Placement::new(60, 1),
        ];
        let a = m.complete(&close).unwrap();
        assert_eq!(m.objective_value(&a), 2 * 60);

        // different rooms, gap of 30: span 90 plus the room penalty
        let apart = [
            Placement::new(0, 0),
            Placement::new(60, 1),
            Placement::new(30, 1),
        ];
        let a = m.complete(&apart).unwrap();
        assert_eq!(m.objective_value(&a), 2 * (90 + CROSS_ROOM_PENALTY));
    }

    #[test]
    fn test_worst_case_cost() {
        let m = model(ObjectiveWeights::new(10, 2));
        // A, B and C reach min(3, 2), min(2, 2) and min(1, 2) days;
        // 2 × (240 + 120 × 1) for the group
        assert_eq!(
            ObjectiveComposer::new(ObjectiveWeights::new(10, 2)).worst_case_cost(&m),
            10 * 5 + 720
        );
    }

    #[test]
    fn test_worst_case_bounded_by_professor_load() {
        // 300 professors with one exam each over 30 days
        let exams = (0..150)
            .map(|i| Exam::new(i, format!("s{i}"), format!("P{i}"), format!("Q{i}")))
            .collect();
        let roster = Roster::new(exams).unwrap();
        let config = ConstraintsConfig::new(30, 2, 30);
        let mut model = ExamModelBuilder::new(&roster, &config).build().unwrap();
        let composer = ObjectiveComposer::new(ObjectiveWeights::new(12_000, 0));
        assert_eq!(composer.worst_case_cost(&model), 300 * 12_000);
        assert!(composer.compose(&mut model).is_ok());
    }

    #[test]
    fn test_cap_exceeded() {
        let roster = Roster::new(vec![
            Exam::new(0, "Anna", "Prof. A", "Prof. B"),
            Exam::new(1, "Bernd", "Prof. A", "Prof. B"),
        ])
        .unwrap();
        let config = ConstraintsConfig::new(5, 1, 30);
        let mut model = ExamModelBuilder::new(&roster, &config).build().unwrap();
        let constraints_before = model.cp().constraint_count();
        let result = ObjectiveComposer::new(ObjectiveWeights::new(0, 1_000_000)).compose(&mut model);
        assert!(matches!(result, Err(Error::ObjectiveCapExceeded { .. })));
        assert_eq!(model.cp().constraint_count(), constraints_before);
        assert!(model.objective().is_none());
    }

    #[test]
    fn test_weights_from_config() {
        let config = OptimizationConfig::default()
            .with_weight_active_days(7)
            .with_weight_pair_locality(3);
        assert_eq!(ObjectiveWeights::from(&config), ObjectiveWeights::new(7, 3));
    }
}
