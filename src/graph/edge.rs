#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Edge kinds of the dependency graph, packed into one byte per ordered feature pair.
//!
//! Bit `XY` of the cell `(a, b)` reads "a = X implies b = Y". The `Q` variants are
//! weak: the implication is suspected, not proven. A lower nibble describes what
//! `a = 0` implies and an upper nibble what `a = 1` implies; each nibble is one
//! *input-polarity group*.
//!
//! ```text
//! bit   7    6    5    4    3    2    1    0
//!       11   11Q  10   10Q  01   01Q  00   00Q
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Edge(pub u8);

impl Edge {
    pub const NONE: Self = Self(0x00);
    pub const E00Q: Self = Self(0x01);
    pub const E00: Self = Self(0x02);
    pub const E01Q: Self = Self(0x04);
    pub const E01: Self = Self(0x08);
    pub const E10Q: Self = Self(0x10);
    pub const E10: Self = Self(0x20);
    pub const E11Q: Self = Self(0x40);
    pub const E11: Self = Self(0x80);

    /// `a = 0` implies something unknown about `b`.
    pub const E0Q: Self = Self(0x01 | 0x04);
    /// `a = 1` implies something unknown about `b`.
    pub const E1Q: Self = Self(0x10 | 0x40);

    pub const NEGATIVE: Self = Self(0x0f);
    pub const POSITIVE: Self = Self(0xf0);
    pub const STRONG: Self = Self(0x02 | 0x08 | 0x20 | 0x80);
    pub const WEAK: Self = Self(0x01 | 0x04 | 0x10 | 0x40);

    /// The strong edge "a = `from` implies b = `to`".
    #[must_use]
    pub const fn strong(from: bool, to: bool) -> Self {
        match (from, to) {
            (false, false) => Self::E00,
            (false, true) => Self::E01,
            (true, false) => Self::E10,
            (true, true) => Self::E11,
        }
    }

    /// The weak edge "a = `from` implies something about b".
    #[must_use]
    pub const fn weak(from: bool) -> Self {
        if from { Self::E1Q } else { Self::E0Q }
    }

    /// The bits describing what `a = from` implies.
    #[must_use]
    pub const fn group(from: bool) -> Self {
        if from { Self::POSITIVE } else { Self::NEGATIVE }
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub const fn is_strong(self) -> bool {
        self.intersects(Self::STRONG)
    }

    #[must_use]
    pub const fn is_weak(self) -> bool {
        self.intersects(Self::WEAK)
    }

    /// What this cell says about `b` once `a = from` is known.
    #[must_use]
    pub const fn implication(self, from: bool) -> Implication {
        let group = self.0 & Self::group(from).0;
        let to_false = group & Self::strong(from, false).0 != 0;
        let to_true = group & Self::strong(from, true).0 != 0;
        match (to_false, to_true) {
            (true, true) => Implication::Infeasible,
            (true, false) => Implication::Forced(false),
            (false, true) => Implication::Forced(true),
            (false, false) if group & Self::WEAK.0 != 0 => Implication::Weak,
            (false, false) => Implication::None,
        }
    }

    /// The cell after asserting `edge` on top of `self`.
    ///
    /// Per input-polarity group: a weak assertion is ignored once the group holds a
    /// strong bit and is OR-ed in otherwise; a strong assertion clears the group's
    /// weak bits and adds the strong bit. Strong bits are never removed.
    #[must_use]
    pub const fn merge(self, edge: Self) -> Self {
        let mut cell = self.0;
        let groups = [Self::NEGATIVE.0, Self::POSITIVE.0];
        let mut i = 0;
        while i < groups.len() {
            let group = groups[i];
            i += 1;
            let asserted = edge.0 & group;
            if asserted == 0 {
                continue;
            }
            let strong = asserted & Self::STRONG.0;
            if strong != 0 {
                cell = (cell & !(group & Self::WEAK.0)) | strong;
            } else if cell & group & Self::STRONG.0 == 0 {
                cell |= asserted;
            }
        }
        Self(cell)
    }
}

impl BitOr for Edge {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for Edge {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({self})")
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 8] = ["00Q", "00", "01Q", "01", "10Q", "10", "11Q", "11"];
        if self.is_none() {
            return write!(f, "-");
        }
        let mut first = true;
        for (bit, name) in NAMES.iter().enumerate() {
            if self.0 & (1 << bit) != 0 {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Reading of one input-polarity group of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Implication {
    None,
    Weak,
    Forced(bool),
    /// Both strong bits: the input polarity cannot hold at all.
    Infeasible,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weak_into_empty_and_combined() {
        let cell = Edge::NONE.merge(Edge::E00Q);
        assert_eq!(cell, Edge::E00Q);
        // Opposite weak bit: both are kept, the outcome is unknown.
        assert_eq!(cell.merge(Edge::E01Q), Edge::E0Q);
        assert_eq!(Edge::E0Q.implication(false), Implication::Weak);
    }

    #[test]
    fn test_strong_replaces_weak() {
        let cell = Edge::E0Q.merge(Edge::E01);
        assert_eq!(cell, Edge::E01);
        assert_eq!(cell.implication(false), Implication::Forced(true));
        assert_eq!(cell.implication(true), Implication::None);
    }

    #[test]
    fn test_weak_after_strong_is_ignored() {
        let cell = Edge::E11.merge(Edge::E1Q);
        assert_eq!(cell, Edge::E11);
    }

    #[test]
    fn test_groups_are_independent() {
        let cell = Edge::E10.merge(Edge::E0Q);
        assert_eq!(cell, Edge::E10 | Edge::E0Q);
        assert_eq!(cell.implication(true), Implication::Forced(false));
        assert_eq!(cell.implication(false), Implication::Weak);
    }

    #[test]
    fn test_opposite_strong_is_kept() {
        let cell = Edge::E11.merge(Edge::E10);
        assert_eq!(cell, Edge::E11 | Edge::E10);
        assert_eq!(cell.implication(true), Implication::Infeasible);
    }

    #[test]
    fn test_display() {
        assert_eq!((Edge::E11 | Edge::E0Q).to_string(), "00Q|01Q|11");
        assert_eq!(Edge::NONE.to_string(), "-");
    }
}
