//! Bounds propagation over a [`CpModel`].
//!
//! Every variable carries an interval domain `[lb, ub]`. Propagators only
//! shrink domains, so a fixpoint always exists; the round cap merely bounds
//! slow convergence on long chains of equalities.

use super::model::{Cmp, Constraint, CpModel, LinearExpr};
use super::solution::CpAssignment;
use super::variables::{AffineExpr, IntervalId, Literal, VarId};

const MAX_ROUNDS: usize = 256;

/// A domain wipe-out: the model admits no assignment extending the current
/// domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    /// Index of the constraint that failed, if known.
    pub constraint: Option<usize>,
}

impl Conflict {
    fn unattributed() -> Self {
        Self { constraint: None }
    }
}

/// Current lower/upper bounds of every model variable.
#[derive(Debug, Clone)]
pub struct Domains {
    lb: Vec<i64>,
    ub: Vec<i64>,
}

impl Domains {
    /// Initial domains as declared in the model.
    pub fn new(model: &CpModel) -> Self {
        Self {
            lb: model.vars().iter().map(|v| v.min).collect(),
            ub: model.vars().iter().map(|v| v.max).collect(),
        }
    }

    pub fn lb(&self, v: VarId) -> i64 {
        self.lb[v.index()]
    }

    pub fn ub(&self, v: VarId) -> i64 {
        self.ub[v.index()]
    }

    pub fn is_fixed(&self, v: VarId) -> bool {
        self.lb[v.index()] == self.ub[v.index()]
    }

    pub fn value(&self, v: VarId) -> Option<i64> {
        self.is_fixed(v).then(|| self.lb[v.index()])
    }

    /// Raises the lower bound. Returns whether the domain changed.
    pub fn set_lb(&mut self, v: VarId, value: i64) -> Result<bool, Conflict> {
        let i = v.index();
        if value <= self.lb[i] {
            return Ok(false);
        }
        if value > self.ub[i] {
            return Err(Conflict::unattributed());
        }
        self.lb[i] = value;
        Ok(true)
    }

    /// Lowers the upper bound. Returns whether the domain changed.
    pub fn set_ub(&mut self, v: VarId, value: i64) -> Result<bool, Conflict> {
        let i = v.index();
        if value >= self.ub[i] {
            return Ok(false);
        }
        if value < self.lb[i] {
            return Err(Conflict::unattributed());
        }
        self.ub[i] = value;
        Ok(true)
    }

    pub fn fix(&mut self, v: VarId, value: i64) -> Result<bool, Conflict> {
        Ok(self.set_lb(v, value)? | self.set_ub(v, value)?)
    }

    /// Truth value of a literal, if its variable is fixed.
    pub fn literal(&self, lit: Literal) -> Option<bool> {
        self.value(lit.var()).map(|v| lit.holds_for(v))
    }

    pub fn set_literal(&mut self, lit: Literal, value: bool) -> Result<bool, Conflict> {
        let var_value = value != lit.is_negated();
        self.fix(lit.var(), i64::from(var_value))
    }

    fn affine_lb(&self, e: AffineExpr) -> i64 {
        self.lb(e.var) + e.offset
    }

    fn affine_ub(&self, e: AffineExpr) -> i64 {
        self.ub(e.var) + e.offset
    }

    /// First variable whose domain still holds more than one value.
    pub fn first_unfixed(&self) -> Option<VarId> {
        (0..self.lb.len())
            .find(|&i| self.lb[i] != self.ub[i])
            .map(VarId)
    }

    /// Whether some variable has an empty domain.
    pub fn has_empty_domain(&self) -> bool {
        self.lb.iter().zip(&self.ub).any(|(lb, ub)| lb > ub)
    }

    /// The assignment, once every variable is fixed.
    pub fn to_assignment(&self) -> Option<CpAssignment> {
        if self.first_unfixed().is_some() || self.has_empty_domain() {
            return None;
        }
        Some(CpAssignment::new(self.lb.clone()))
    }
}

/// Propagates every constraint until no domain changes.
pub fn propagate(model: &CpModel, domains: &mut Domains) -> Result<(), Conflict> {
    if domains.has_empty_domain() {
        return Err(Conflict::unattributed());
    }

    for _ in 0..MAX_ROUNDS {
        let mut changed = false;
        for (index, constraint) in model.constraints().iter().enumerate() {
            changed |= propagate_constraint(model, constraint, domains).map_err(|_| Conflict {
                constraint: Some(index),
            })?;
        }
        if !changed {
            break;
        }
    }
    Ok(())
}

fn propagate_constraint(
    model: &CpModel,
    constraint: &Constraint,
    d: &mut Domains,
) -> Result<bool, Conflict> {
    match constraint {
        Constraint::Linear {
            expr,
            cmp,
            rhs,
            enforcement,
        } => propagate_linear(expr, *cmp, *rhs, enforcement, d),
        Constraint::BoolOr {
            literals,
            enforcement,
        } => propagate_bool_or(literals, enforcement, d),
        Constraint::MinEquality { target, exprs } => propagate_min(*target, exprs, d),
        Constraint::MaxEquality { target, exprs } => propagate_max(*target, exprs, d),
        Constraint::NoOverlap { intervals } => propagate_no_overlap(model, intervals, d),
    }
}

enum Enforcement {
    /// Every enforcement literal holds.
    Active,
    /// Some enforcement literal is false.
    Disabled,
    /// All but this literal hold.
    Pending(Literal),
    Undecided,
}

fn enforcement_status(enforcement: &[Literal], d: &Domains) -> Enforcement {
    let mut open = 0usize;
    let mut pending = None;
    for &lit in enforcement {
        match d.literal(lit) {
            Some(false) => return Enforcement::Disabled,
            Some(true) => {}
            None => {
                open += 1;
                pending = Some(lit);
            }
        }
    }
    match (open, pending) {
        (0, _) => Enforcement::Active,
        (1, Some(lit)) => Enforcement::Pending(lit),
        _ => Enforcement::Undecided,
    }
}

fn propagate_linear(
    expr: &LinearExpr,
    cmp: Cmp,
    rhs: i64,
    enforcement: &[Literal],
    d: &mut Domains,
) -> Result<bool, Conflict> {
    match enforcement_status(enforcement, d) {
        Enforcement::Active => enforce_linear(expr, cmp, rhs, d),
        Enforcement::Pending(lit) if linear_violated(expr, cmp, rhs, d) => {
            d.set_literal(lit, false)
        }
        _ => Ok(false),
    }
}

fn activity_bounds(expr: &LinearExpr, d: &Domains) -> (i128, i128) {
    let mut lo = i128::from(expr.constant);
    let mut hi = lo;
    for &(v, c) in &expr.terms {
        let a = i128::from(c) * i128::from(d.lb(v));
        let b = i128::from(c) * i128::from(d.ub(v));
        lo += a.min(b);
        hi += a.max(b);
    }
    (lo, hi)
}

/// Whether `expr cmp rhs` can no longer hold under the current bounds.
fn linear_violated(expr: &LinearExpr, cmp: Cmp, rhs: i64, d: &Domains) -> bool {
    let (lo, hi) = activity_bounds(expr, d);
    let rhs = i128::from(rhs);
    match cmp {
        Cmp::Le => lo > rhs,
        Cmp::Ge => hi < rhs,
        Cmp::Eq => lo > rhs || hi < rhs,
        Cmp::Ne => lo == hi && lo == rhs,
    }
}

fn enforce_linear(expr: &LinearExpr, cmp: Cmp, rhs: i64, d: &mut Domains) -> Result<bool, Conflict> {
    match cmp {
        Cmp::Le => propagate_le(expr, rhs, 1, d),
        Cmp::Ge => propagate_le(expr, rhs, -1, d),
        Cmp::Eq => Ok(propagate_le(expr, rhs, 1, d)? | propagate_le(expr, rhs, -1, d)?),
        Cmp::Ne => propagate_ne(expr, rhs, d),
    }
}

/// Bounds-propagates `sign · expr <= sign · rhs`.
fn propagate_le(expr: &LinearExpr, rhs: i64, sign: i64, d: &mut Domains) -> Result<bool, Conflict> {
    let sign = i128::from(sign);
    let bound = i128::from(rhs) * sign;

    let min_contribution = |c: i128, lb: i64, ub: i64| {
        if c > 0 {
            c * i128::from(lb)
        } else {
            c * i128::from(ub)
        }
    };

    let mut min_activity = i128::from(expr.constant) * sign;
    for &(v, c) in &expr.terms {
        min_activity += min_contribution(i128::from(c) * sign, d.lb(v), d.ub(v));
    }
    if min_activity > bound {
        return Err(Conflict::unattributed());
    }

    // Tightening ub for c > 0 (lb for c < 0) never moves a term's minimum
    // contribution, so `min_activity` stays exact through the loop.
    let mut changed = false;
    for &(v, c) in &expr.terms {
        let c = i128::from(c) * sign;
        if c == 0 {
            continue;
        }
        let slack = bound - (min_activity - min_contribution(c, d.lb(v), d.ub(v)));
        if c > 0 {
            changed |= d.set_ub(v, clamp_i64(div_floor(slack, c)))?;
        } else {
            changed |= d.set_lb(v, clamp_i64(div_ceil(slack, c)))?;
        }
    }
    Ok(changed)
}

fn propagate_ne(expr: &LinearExpr, rhs: i64, d: &mut Domains) -> Result<bool, Conflict> {
    let mut fixed_sum = i128::from(expr.constant);
    let mut free: Option<(VarId, i128)> = None;
    for &(v, c) in &expr.terms {
        if c == 0 {
            continue;
        }
        match d.value(v) {
            Some(x) => fixed_sum += i128::from(c) * i128::from(x),
            None if free.is_some() => return Ok(false),
            None => free = Some((v, i128::from(c))),
        }
    }

    let rest = i128::from(rhs) - fixed_sum;
    match free {
        None if rest == 0 => Err(Conflict::unattributed()),
        None => Ok(false),
        Some((_, c)) if rest % c != 0 => Ok(false),
        Some((v, c)) => {
            let forbidden = rest / c;
            if forbidden == i128::from(d.lb(v)) {
                d.set_lb(v, d.lb(v) + 1)
            } else if forbidden == i128::from(d.ub(v)) {
                d.set_ub(v, d.ub(v) - 1)
            } else {
                Ok(false)
            }
        }
    }
}

fn propagate_bool_or(
    literals: &[Literal],
    enforcement: &[Literal],
    d: &mut Domains,
) -> Result<bool, Conflict> {
    let mut open = 0usize;
    let mut last_open = None;
    for &lit in literals {
        match d.literal(lit) {
            Some(true) => return Ok(false),
            Some(false) => {}
            None => {
                open += 1;
                last_open = Some(lit);
            }
        }
    }

    match enforcement_status(enforcement, d) {
        Enforcement::Active => match (open, last_open) {
            (0, _) => Err(Conflict::unattributed()),
            (1, Some(lit)) => d.set_literal(lit, true),
            _ => Ok(false),
        },
        Enforcement::Pending(lit) if open == 0 => d.set_literal(lit, false),
        _ => Ok(false),
    }
}

fn propagate_min(target: VarId, exprs: &[AffineExpr], d: &mut Domains) -> Result<bool, Conflict> {
    let (Some(lo), Some(hi)) = (
        exprs.iter().map(|&e| d.affine_lb(e)).min(),
        exprs.iter().map(|&e| d.affine_ub(e)).min(),
    ) else {
        return Ok(false);
    };

    let mut changed = d.set_lb(target, lo)? | d.set_ub(target, hi)?;
    let floor = d.lb(target);
    for &e in exprs {
        changed |= d.set_lb(e.var, floor - e.offset)?;
    }
    Ok(changed)
}

fn propagate_max(target: VarId, exprs: &[AffineExpr], d: &mut Domains) -> Result<bool, Conflict> {
    let (Some(lo), Some(hi)) = (
        exprs.iter().map(|&e| d.affine_lb(e)).max(),
        exprs.iter().map(|&e| d.affine_ub(e)).max(),
    ) else {
        return Ok(false);
    };

    let mut changed = d.set_lb(target, lo)? | d.set_ub(target, hi)?;
    let ceiling = d.ub(target);
    for &e in exprs {
        changed |= d.set_ub(e.var, ceiling - e.offset)?;
    }
    Ok(changed)
}

/// Pairwise detectable precedences: when one order of two present
/// intervals is impossible the other is enforced; when neither order is
/// possible at most one of them may be present.
fn propagate_no_overlap(
    model: &CpModel,
    intervals: &[IntervalId],
    d: &mut Domains,
) -> Result<bool, Conflict> {
    let presence = |d: &Domains, id: IntervalId| match model.interval(id).presence {
        None => Some(true),
        Some(lit) => d.literal(lit),
    };

    let live: Vec<IntervalId> = intervals
        .iter()
        .copied()
        .filter(|&id| presence(d, id) != Some(false))
        .collect();

    let mut changed = false;
    for (i, &a) in live.iter().enumerate() {
        for &b in &live[i + 1..] {
            let ia = model.interval(a);
            let ib = model.interval(b);
            let a_first = d.affine_lb(ia.end) <= d.ub(ib.start);
            let b_first = d.affine_lb(ib.end) <= d.ub(ia.start);
            let (pa, pb) = (presence(d, a), presence(d, b));

            if a_first || b_first {
                if pa == Some(true) && pb == Some(true) {
                    if !a_first {
                        // b precedes a
                        changed |= d.set_lb(ia.start, d.affine_lb(ib.end))?;
                        changed |= d.set_ub(ib.end.var, d.ub(ia.start) - ib.end.offset)?;
                    }
                    if !b_first {
                        changed |= d.set_lb(ib.start, d.affine_lb(ia.end))?;
                        changed |= d.set_ub(ia.end.var, d.ub(ib.start) - ia.end.offset)?;
                    }
                }
                continue;
            }

            match (pa, pb, ia.presence, ib.presence) {
                (Some(true), Some(true), _, _) => return Err(Conflict::unattributed()),
                (Some(true), None, _, Some(lit)) => changed |= d.set_literal(lit, false)?,
                (None, Some(true), Some(lit), _) => changed |= d.set_literal(lit, false)?,
                _ => {}
            }
        }
    }
    Ok(changed)
}

fn div_floor(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn div_ceil(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) == (b < 0)) {
        q + 1
    } else {
        q
    }
}

fn clamp_i64(x: i128) -> i64 {
    x.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}
