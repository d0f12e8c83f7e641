#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
use core::ops::{Neg, Not};
use std::fmt;

/// A feature's propositional variable. `0` is reserved as "no variable".
pub type Variable = u32;

/// A variable together with a polarity.
///
/// Packed as `var * 2 + negated`, so ordering is by variable first and puts the
/// positive literal before the negative one. The packed value doubles as a dense
/// index for per-literal tables.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Literal(u32);

impl Literal {
    #[must_use]
    pub const fn new(var: Variable, polarity: bool) -> Self {
        if polarity {
            Self(var << 1)
        } else {
            Self((var << 1) | 1)
        }
    }

    #[must_use]
    pub const fn positive(var: Variable) -> Self {
        Self::new(var, true)
    }

    #[must_use]
    pub const fn negative(var: Variable) -> Self {
        Self::new(var, false)
    }

    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0 >> 1
    }

    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0 & 1 == 0
    }

    #[must_use]
    pub const fn is_negated(self) -> bool {
        !self.polarity()
    }

    #[must_use]
    pub const fn negated(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// Dense index of this literal, `2 * var + negated`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Builds a literal from DIMACS notation (`-3` is variable 3, negated).
    ///
    /// # Panics
    ///
    /// Panics on `0`, which is not a literal in DIMACS.
    #[must_use]
    pub fn from_i32(value: i32) -> Self {
        assert_ne!(value, 0, "0 is not a DIMACS literal");
        Self::new(value.unsigned_abs(), value.is_positive())
    }

    /// DIMACS notation of this literal.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn to_i32(self) -> i32 {
        let var = self.variable() as i32;
        if self.polarity() { var } else { -var }
    }

    /// Value of this literal when its variable is set to `value`.
    #[must_use]
    pub const fn eval(self, value: bool) -> bool {
        value == self.polarity()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_i32())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_i32())
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Self::from_i32(value)
    }
}
