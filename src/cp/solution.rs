//! Full assignments and their verification against a model.

use std::fmt;

use super::model::{Constraint, CpModel, Objective};
use super::propagate::{propagate, Conflict, Domains};
use super::variables::{IntervalId, IntervalSize, Literal, VarId};

/// A value for every variable of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpAssignment {
    values: Vec<i64>,
}

impl CpAssignment {
    pub(crate) fn new(values: Vec<i64>) -> Self {
        Self { values }
    }

    pub fn value(&self, v: VarId) -> i64 {
        self.values[v.index()]
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn literal(&self, lit: Literal) -> bool {
        lit.holds_for(self.value(lit.var()))
    }

    /// Whether an interval is present (mandatory intervals always are).
    pub fn is_present(&self, model: &CpModel, id: IntervalId) -> bool {
        model
            .interval(id)
            .presence
            .map_or(true, |lit| self.literal(lit))
    }

    pub fn interval_start(&self, model: &CpModel, id: IntervalId) -> i64 {
        self.value(model.interval(id).start)
    }

    pub fn interval_end(&self, model: &CpModel, id: IntervalId) -> i64 {
        let end = model.interval(id).end;
        self.value(end.var) + end.offset
    }
}

/// A constraint that an assignment breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Index of the violated constraint, `None` for domain violations.
    pub constraint: Option<usize>,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constraint {
            Some(index) => write!(f, "constraint #{index}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for Violation {}

impl CpModel {
    /// Checks an assignment against every domain and constraint.
    pub fn check(&self, assignment: &CpAssignment) -> Result<(), Violation> {
        if assignment.values.len() != self.var_count() {
            return Err(Violation {
                constraint: None,
                message: format!(
                    "assignment has {} values for {} variables",
                    assignment.values.len(),
                    self.var_count()
                ),
            });
        }

        for (var, &value) in self.vars().iter().zip(&assignment.values) {
            if value < var.min || value > var.max {
                return Err(Violation {
                    constraint: None,
                    message: format!(
                        "{} = {value} outside [{}, {}]",
                        var.name, var.min, var.max
                    ),
                });
            }
        }

        let enforced = |lits: &[Literal]| lits.iter().all(|&l| assignment.literal(l));

        for (index, constraint) in self.constraints().iter().enumerate() {
            let violation = |message: String| Violation {
                constraint: Some(index),
                message,
            };
            match constraint {
                Constraint::Linear {
                    expr,
                    cmp,
                    rhs,
                    enforcement,
                } => {
                    if !enforced(enforcement) {
                        continue;
                    }
                    let lhs = expr.evaluate(|v| assignment.value(v));
                    if !cmp.holds(lhs, *rhs) {
                        return Err(violation(format!("linear {lhs} {cmp:?} {rhs} fails")));
                    }
                }
                Constraint::BoolOr {
                    literals,
                    enforcement,
                } => {
                    if enforced(enforcement) && !literals.iter().any(|&l| assignment.literal(l)) {
                        return Err(violation("no literal of clause holds".into()));
                    }
                }
                Constraint::MinEquality { target, exprs } => {
                    let min = exprs.iter().map(|e| assignment.value(e.var) + e.offset).min();
                    if min != Some(assignment.value(*target)) {
                        return Err(violation(format!(
                            "{} is not the minimum",
                            self.var(*target).name
                        )));
                    }
                }
                Constraint::MaxEquality { target, exprs } => {
                    let max = exprs.iter().map(|e| assignment.value(e.var) + e.offset).max();
                    if max != Some(assignment.value(*target)) {
                        return Err(violation(format!(
                            "{} is not the maximum",
                            self.var(*target).name
                        )));
                    }
                }
                Constraint::NoOverlap { intervals } => {
                    let mut present: Vec<(i64, i64, IntervalId)> = intervals
                        .iter()
                        .filter(|&&id| assignment.is_present(self, id))
                        .map(|&id| {
                            (
                                assignment.interval_start(self, id),
                                assignment.interval_end(self, id),
                                id,
                            )
                        })
                        .collect();
                    present.sort_unstable();
                    for pair in present.windows(2) {
                        let (_, end, a) = pair[0];
                        let (start, _, b) = pair[1];
                        if start < end {
                            return Err(violation(format!(
                                "{} overlaps {}",
                                self.interval(a).name,
                                self.interval(b).name
                            )));
                        }
                    }
                }
            }
        }

        for interval in self.intervals() {
            if let IntervalSize::Variable(size) = interval.size {
                if assignment.value(size) < 0 {
                    return Err(Violation {
                        constraint: None,
                        message: format!("negative size for interval: {}", interval.name),
                    });
                }
            }
        }
        Ok(())
    }

    /// Objective value of an assignment, if the model has an objective.
    pub fn objective_value(&self, assignment: &CpAssignment) -> Option<i64> {
        self.objective().map(|Objective::Minimize(expr)| {
            expr.evaluate(|v| assignment.value(v))
        })
    }

    /// Extends a partial assignment of decision variables to a full,
    /// verified assignment.
    ///
    /// The given values are fixed, bounds are propagated, and every variable
    /// left open takes its smallest remaining value (re-propagating after
    /// each choice). The result is checked against the whole model, so an
    /// `Ok` is a certificate of feasibility.
    pub fn complete(&self, fixed: &[(VarId, i64)]) -> Result<CpAssignment, Conflict> {
        let mut domains = Domains::new(self);
        for &(var, value) in fixed {
            domains.fix(var, value)?;
        }
        propagate(self, &mut domains)?;

        while let Some(var) = domains.first_unfixed() {
            let value = domains.lb(var);
            domains.fix(var, value)?;
            propagate(self, &mut domains)?;
        }

        let assignment = domains.to_assignment().ok_or(Conflict { constraint: None })?;
        self.check(&assignment).map_err(|v| Conflict {
            constraint: v.constraint,
        })?;
        Ok(assignment)
    }
}
