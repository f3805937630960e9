use std::cmp::Ordering;

/// A single endpoint of an STN distance interval: a finite integer number
/// of STN units, or one of the two lattice infinities.
///
/// Arithmetic is implemented explicitly rather than via a sentinel like
/// `i64::MAX` — sentinel arithmetic silently wraps or saturates, which
/// would corrupt constraint tightening at the lattice's edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    NegInf,
    Finite(i64),
    PosInf,
}

impl Bound {
    /// Lattice negation: `-(+∞) = -∞`, `-(-∞) = +∞`, `-(n) = -n`.
    pub fn negate(self) -> Bound {
        match self {
            Bound::NegInf => Bound::PosInf,
            Bound::PosInf => Bound::NegInf,
            Bound::Finite(n) => Bound::Finite(-n),
        }
    }

    pub fn is_finite(self) -> bool {
        matches!(self, Bound::Finite(_))
    }

    pub fn as_finite(self) -> Option<i64> {
        match self {
            Bound::Finite(n) => Some(n),
            _ => None,
        }
    }
}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bound {
    fn cmp(&self, other: &Self) -> Ordering {
        use Bound::*;
        match (*self, *other) {
            (NegInf, NegInf) | (PosInf, PosInf) => Ordering::Equal,
            (NegInf, _) => Ordering::Less,
            (_, NegInf) => Ordering::Greater,
            (PosInf, _) => Ordering::Greater,
            (_, PosInf) => Ordering::Less,
            (Finite(a), Finite(b)) => a.cmp(&b),
        }
    }
}
