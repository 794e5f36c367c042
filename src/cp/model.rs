//! CP model definition.

use super::variables::{
    AffineExpr, BoolVar, IntVar, IntervalId, IntervalSize, IntervalVar, Literal, VarId,
};

/// Comparison operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Ne,
    Le,
    Ge,
}

impl Cmp {
    /// The complement of `expr cmp rhs`, expressed as `(cmp', rhs')`.
    ///
    /// Over the integers, `!(x <= r)` is `x >= r + 1`.
    pub fn negate(self, rhs: i64) -> (Cmp, i64) {
        match self {
            Cmp::Eq => (Cmp::Ne, rhs),
            Cmp::Ne => (Cmp::Eq, rhs),
            Cmp::Le => (Cmp::Ge, rhs + 1),
            Cmp::Ge => (Cmp::Le, rhs - 1),
        }
    }

    /// Evaluates `lhs cmp rhs`.
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Cmp::Eq => lhs == rhs,
            Cmp::Ne => lhs != rhs,
            Cmp::Le => lhs <= rhs,
            Cmp::Ge => lhs >= rhs,
        }
    }
}

/// `Σ coefficient · var + constant`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    /// (variable, coefficient) pairs.
    pub terms: Vec<(VarId, i64)>,
    pub constant: i64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the given variables with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1)).collect(),
            constant: 0,
        }
    }

    /// Adds `coefficient · var`.
    pub fn term(mut self, var: VarId, coefficient: i64) -> Self {
        self.add_term(var, coefficient);
        self
    }

    pub fn add_term(&mut self, var: VarId, coefficient: i64) {
        self.terms.push((var, coefficient));
    }

    pub fn with_constant(mut self, constant: i64) -> Self {
        self.constant = constant;
        self
    }

    /// The expression multiplied by -1.
    pub fn negated(&self) -> Self {
        Self {
            terms: self.terms.iter().map(|&(v, c)| (v, -c)).collect(),
            constant: -self.constant,
        }
    }

    /// Evaluates the expression for the given variable values.
    pub fn evaluate(&self, value: impl Fn(VarId) -> i64) -> i64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, &(v, c)| acc + c * value(v))
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        Self {
            terms: vec![(var, 1)],
            constant: 0,
        }
    }
}

/// A constraint in the CP model.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// `expr cmp rhs`, active only while every enforcement literal holds.
    Linear {
        expr: LinearExpr,
        cmp: Cmp,
        rhs: i64,
        enforcement: Vec<Literal>,
    },

    /// At least one literal holds, active only while every enforcement
    /// literal holds.
    BoolOr {
        literals: Vec<Literal>,
        enforcement: Vec<Literal>,
    },

    /// `target = min(exprs)`.
    MinEquality {
        target: VarId,
        exprs: Vec<AffineExpr>,
    },

    /// `target = max(exprs)`.
    MaxEquality {
        target: VarId,
        exprs: Vec<AffineExpr>,
    },

    /// No two present intervals of the set overlap in time.
    NoOverlap { intervals: Vec<IntervalId> },
}

/// Objective function for the CP model.
#[derive(Debug, Clone)]
pub enum Objective {
    /// Minimize a linear expression.
    Minimize(LinearExpr),
}

/// A constraint programming model.
///
/// Contains variables, constraints, and an optional objective function.
/// Construction is sequential: every `new_*`/`add_*` call appends to the
/// model and returns a dense handle.
///
/// # Examples
///
/// ```
/// use u_timetable::cp::{AffineExpr, Cmp, CpModel, LinearExpr};
///
/// let mut model = CpModel::new("example");
/// let a = model.new_int_var(0, 100, "a");
/// let a_end = model.new_int_var(0, 150, "a_end");
/// let b = model.new_int_var(0, 100, "b");
/// let b_end = model.new_int_var(0, 150, "b_end");
/// let ia = model.new_interval("a", a, 50, AffineExpr::from(a_end));
/// let ib = model.new_interval("b", b, 30, AffineExpr::from(b_end));
/// model.add_no_overlap(vec![ia, ib]);
/// model.minimize(LinearExpr::from(a_end).term(b_end, 1));
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    vars: Vec<IntVar>,
    intervals: Vec<IntervalVar>,
    constraints: Vec<Constraint>,
    objective: Option<Objective>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: Vec::new(),
            intervals: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Adds an integer variable with domain `[min, max]`.
    pub fn new_int_var(&mut self, min: i64, max: i64, name: impl Into<String>) -> VarId {
        self.vars.push(IntVar::new(name, min, max));
        VarId(self.vars.len() - 1)
    }

    /// Adds a variable fixed to `value`.
    pub fn new_constant(&mut self, value: i64) -> VarId {
        self.new_int_var(value, value, format!("const_{value}"))
    }

    /// Adds a boolean variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        BoolVar(self.new_int_var(0, 1, name))
    }

    /// Adds a fixed-size interval that is always present.
    pub fn new_interval(
        &mut self,
        name: impl Into<String>,
        start: VarId,
        size: i64,
        end: AffineExpr,
    ) -> IntervalId {
        self.add_interval(name, start, IntervalSize::Fixed(size), end, None)
    }

    /// Adds a fixed-size interval that only exists while `presence` holds.
    pub fn new_optional_interval(
        &mut self,
        name: impl Into<String>,
        start: VarId,
        size: i64,
        end: AffineExpr,
        presence: Literal,
    ) -> IntervalId {
        self.add_interval(name, start, IntervalSize::Fixed(size), end, Some(presence))
    }

    /// Adds an interval and registers `start + size == end`, enforced by the
    /// presence literal when there is one.
    pub fn add_interval(
        &mut self,
        name: impl Into<String>,
        start: VarId,
        size: IntervalSize,
        end: AffineExpr,
        presence: Option<Literal>,
    ) -> IntervalId {
        // start + size - end.var == end.offset
        let mut expr = LinearExpr::from(start).term(end.var, -1);
        let rhs = match size {
            IntervalSize::Fixed(length) => end.offset - length,
            IntervalSize::Variable(var) => {
                expr.add_term(var, 1);
                end.offset
            }
        };
        self.add_linear_enforced(expr, Cmp::Eq, rhs, presence.into_iter().collect());

        self.intervals.push(IntervalVar {
            name: name.into(),
            start,
            size,
            end,
            presence,
        });
        IntervalId(self.intervals.len() - 1)
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Adds `expr cmp rhs`.
    pub fn add_linear(&mut self, expr: LinearExpr, cmp: Cmp, rhs: i64) {
        self.add_linear_enforced(expr, cmp, rhs, Vec::new());
    }

    /// Adds `expr cmp rhs`, only enforced while all `enforcement` literals hold.
    pub fn add_linear_enforced(
        &mut self,
        expr: LinearExpr,
        cmp: Cmp,
        rhs: i64,
        enforcement: Vec<Literal>,
    ) {
        self.constraints.push(Constraint::Linear {
            expr,
            cmp,
            rhs,
            enforcement,
        });
    }

    /// Binds `b` to the truth of `expr cmp rhs` in both directions:
    /// `b ⇒ expr cmp rhs` and `¬b ⇒ ¬(expr cmp rhs)`.
    pub fn add_reified(&mut self, b: BoolVar, expr: LinearExpr, cmp: Cmp, rhs: i64) {
        let (negated_cmp, negated_rhs) = cmp.negate(rhs);
        self.add_linear_enforced(expr.clone(), cmp, rhs, vec![b.literal()]);
        self.add_linear_enforced(expr, negated_cmp, negated_rhs, vec![b.not()]);
    }

    /// Adds a clause: at least one literal holds.
    pub fn add_bool_or(&mut self, literals: Vec<Literal>) {
        self.add_bool_or_enforced(literals, Vec::new());
    }

    /// Adds a clause enforced by a conjunction of literals.
    pub fn add_bool_or_enforced(&mut self, literals: Vec<Literal>, enforcement: Vec<Literal>) {
        self.constraints.push(Constraint::BoolOr {
            literals,
            enforcement,
        });
    }

    /// Adds `target == min(exprs)`.
    pub fn add_min_equality(&mut self, target: VarId, exprs: Vec<AffineExpr>) {
        self.constraints
            .push(Constraint::MinEquality { target, exprs });
    }

    /// Adds `target == max(exprs)`.
    pub fn add_max_equality(&mut self, target: VarId, exprs: Vec<AffineExpr>) {
        self.constraints
            .push(Constraint::MaxEquality { target, exprs });
    }

    /// Convenience: add a no-overlap constraint.
    pub fn add_no_overlap(&mut self, intervals: Vec<IntervalId>) {
        self.constraints.push(Constraint::NoOverlap { intervals });
    }

    /// Sets the objective to minimize `expr`.
    pub fn minimize(&mut self, expr: LinearExpr) {
        self.objective = Some(Objective::Minimize(expr));
    }

    pub fn var(&self, id: VarId) -> &IntVar {
        &self.vars[id.0]
    }

    pub fn vars(&self) -> &[IntVar] {
        &self.vars
    }

    pub fn interval(&self, id: IntervalId) -> &IntervalVar {
        &self.intervals[id.0]
    }

    pub fn intervals(&self) -> &[IntervalVar] {
        &self.intervals
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Returns the number of variables (booleans included).
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Returns the number of interval variables.
    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Counts no-overlap constraints.
    pub fn no_overlap_count(&self) -> usize {
        self.constraints
            .iter()
            .filter(|c| matches!(c, Constraint::NoOverlap { .. }))
            .count()
    }

    /// Validates the model for consistency.
    ///
    /// Checks that all referenced handles exist, that fixed interval sizes are
    /// non-negative and that min/max constraints have operands.
    pub fn validate(&self) -> Result<(), String> {
        let check_var = |v: VarId| -> Result<(), String> {
            if v.0 < self.vars.len() {
                Ok(())
            } else {
                Err(format!("undefined variable: #{}", v.0))
            }
        };
        let check_literals = |lits: &[Literal]| -> Result<(), String> {
            for lit in lits {
                check_var(lit.var())?;
                let var = &self.vars[lit.var().0];
                if var.min < 0 || var.max > 1 {
                    return Err(format!("literal over non-boolean variable: {}", var.name));
                }
            }
            Ok(())
        };

        for interval in &self.intervals {
            check_var(interval.start)?;
            check_var(interval.end.var)?;
            match interval.size {
                IntervalSize::Fixed(length) if length < 0 => {
                    return Err(format!("negative size for interval: {}", interval.name));
                }
                IntervalSize::Fixed(_) => {}
                IntervalSize::Variable(var) => check_var(var)?,
            }
            if let Some(presence) = interval.presence {
                check_literals(&[presence])?;
            }
        }

        for constraint in &self.constraints {
            match constraint {
                Constraint::Linear {
                    expr, enforcement, ..
                } => {
                    for &(v, _) in &expr.terms {
                        check_var(v)?;
                    }
                    check_literals(enforcement)?;
                }
                Constraint::BoolOr {
                    literals,
                    enforcement,
                } => {
                    check_literals(literals)?;
                    check_literals(enforcement)?;
                }
                Constraint::MinEquality { target, exprs }
                | Constraint::MaxEquality { target, exprs } => {
                    check_var(*target)?;
                    if exprs.is_empty() {
                        return Err("min/max equality without operands".into());
                    }
                    for e in exprs {
                        check_var(e.var)?;
                    }
                }
                Constraint::NoOverlap { intervals } => {
                    for id in intervals {
                        if id.0 >= self.intervals.len() {
                            return Err(format!("undefined interval: #{}", id.0));
                        }
                    }
                }
            }
        }

        if let Some(Objective::Minimize(expr)) = &self.objective {
            for &(v, _) in &expr.terms {
                check_var(v)?;
            }
        }
        Ok(())
    }
}
