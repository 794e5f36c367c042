//! Constraint Programming (CP) framework.
//!
//! A small, domain-agnostic modelling layer: integer and boolean variables,
//! fixed-size (optionally present) intervals, linear constraints with
//! enforcement literals, clauses, min/max equalities and no-overlap sets.
//!
//! # Key Components
//!
//! - **Variables**: [`IntVar`], [`BoolVar`], [`IntervalVar`], [`Literal`]
//! - **Constraints**: [`Constraint`], [`Cmp`], [`LinearExpr`]
//! - **Model**: [`CpModel`]: container for variables, constraints, objective
//! - **Propagation**: [`Domains`], [`propagate`]: bounds reasoning
//! - **Assignments**: [`CpAssignment`], [`CpModel::check`], [`CpModel::complete`]
//!
//! # Design
//!
//! The model is the formal statement of a problem. Search procedures
//! elsewhere in the crate decide a few variables and let
//! [`CpModel::complete`] derive and verify the rest, so every reported
//! solution has been checked against the full constraint set.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod model;
mod propagate;
mod solution;
mod variables;

pub use model::{Cmp, Constraint, CpModel, LinearExpr, Objective};
pub use propagate::{propagate, Conflict, Domains};
pub use solution::{CpAssignment, Violation};
pub use variables::{
    AffineExpr, BoolVar, IntVar, IntervalId, IntervalSize, IntervalVar, Literal, VarId,
};
