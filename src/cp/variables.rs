//! CP variable types.
//!
//! Variables live in a [`CpModel`](super::CpModel) and are addressed by dense
//! handles. Names are kept for diagnostics only.

/// Handle of an integer (or boolean) variable inside a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in the model's variable store.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle of an interval variable inside a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntervalId(pub(crate) usize);

impl IntervalId {
    /// Position of the interval in the model's interval store.
    pub fn index(self) -> usize {
        self.0
    }
}

/// An integer variable with a domain [min, max].
#[derive(Debug, Clone)]
pub struct IntVar {
    /// Variable name (diagnostics only).
    pub name: String,
    /// Minimum value.
    pub min: i64,
    /// Maximum value.
    pub max: i64,
}

impl IntVar {
    /// Creates a new integer variable with the given bounds.
    pub fn new(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    /// Whether this variable is fixed to a single value.
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Domain size (max - min + 1), zero for an empty domain.
    pub fn domain_size(&self) -> i64 {
        (self.max - self.min + 1).max(0)
    }
}

/// A boolean decision: an integer variable restricted to `{0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoolVar(pub(crate) VarId);

impl BoolVar {
    /// The underlying 0/1 integer variable.
    pub fn var(self) -> VarId {
        self.0
    }

    /// Literal that holds when this variable is true.
    pub fn literal(self) -> Literal {
        Literal {
            var: self.0,
            negated: false,
        }
    }

    /// Literal that holds when this variable is false.
    pub fn not(self) -> Literal {
        Literal {
            var: self.0,
            negated: true,
        }
    }
}

impl From<BoolVar> for VarId {
    fn from(b: BoolVar) -> Self {
        b.0
    }
}

impl From<BoolVar> for Literal {
    fn from(b: BoolVar) -> Self {
        b.literal()
    }
}

/// A boolean variable or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    var: VarId,
    negated: bool,
}

impl Literal {
    /// The 0/1 variable this literal refers to.
    pub fn var(self) -> VarId {
        self.var
    }

    /// Whether the literal is the negation of its variable.
    pub fn is_negated(self) -> bool {
        self.negated
    }

    /// The complementary literal.
    pub fn negate(self) -> Literal {
        Literal {
            var: self.var,
            negated: !self.negated,
        }
    }

    /// Truth value of the literal when its variable takes `value`.
    pub fn holds_for(self, value: i64) -> bool {
        (value != 0) != self.negated
    }
}

/// `var + offset`, used for interval ends such as a buffered end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffineExpr {
    pub var: VarId,
    pub offset: i64,
}

impl AffineExpr {
    pub fn new(var: VarId, offset: i64) -> Self {
        Self { var, offset }
    }
}

impl From<VarId> for AffineExpr {
    fn from(var: VarId) -> Self {
        Self { var, offset: 0 }
    }
}

/// Length of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalSize {
    /// Constant length.
    Fixed(i64),
    /// Length given by a decision variable.
    Variable(VarId),
}

/// An interval variable representing an activity with start, size, and end.
///
/// The invariant `start + size = end` is registered as a constraint when the
/// interval is added to a model. Optional intervals only take part in
/// no-overlap reasoning while their presence literal is true.
#[derive(Debug, Clone)]
pub struct IntervalVar {
    /// Variable name.
    pub name: String,
    /// Start time variable.
    pub start: VarId,
    /// Length of the interval.
    pub size: IntervalSize,
    /// End time expression.
    pub end: AffineExpr,
    /// Presence literal (for optional intervals).
    pub presence: Option<Literal>,
}

impl IntervalVar {
    /// Whether this interval is optional.
    pub fn is_optional(&self) -> bool {
        self.presence.is_some()
    }
}
