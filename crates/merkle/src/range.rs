//! Inclusive leaf index ranges.

use std::cmp::{max, min};
use std::fmt;

use crate::error::{MerkleError, MerkleResult};

/// Inclusive `[start, end]` interval of leaf indices covered by a node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct LeafRange {
    pub(crate) start: u64,
    pub(crate) end: u64,
}

impl LeafRange {
    /// Constructs a new range, checking that `start <= end`.
    pub fn new(start: u64, end: u64) -> MerkleResult<Self> {
        if start > end {
            return Err(MerkleError::MalformedProofNode { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range covering exactly one leaf.
    pub fn single(idx: u64) -> Self {
        Self {
            start: idx,
            end: idx,
        }
    }

    /// Range covering the first `n` leaves.  `n` must be nonzero.
    pub(crate) fn for_len(n: u64) -> Self {
        debug_assert!(n > 0);
        Self {
            start: 0,
            end: n - 1,
        }
    }

    /// First index covered.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last index covered.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of leaves covered, saturating at `u64::MAX` for the full
    /// `[0, u64::MAX]` range.
    pub fn len(&self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    /// Always false, a range covers at least one leaf.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns if this range covers a single leaf.
    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    /// Returns if `idx` falls within the range.
    pub fn contains(&self, idx: u64) -> bool {
        self.start <= idx && idx <= self.end
    }

    /// Split point used by both construction and leaf descent.  The left half
    /// is `[start, mid]`, so odd-sized ranges split left-heavy.
    pub fn midpoint(&self) -> u64 {
        self.start + (self.end - self.start) / 2
    }

    /// Returns the two halves `[start, mid]` and `[mid + 1, end]`, or `None`
    /// for a single-leaf range.
    pub fn split(&self) -> Option<(Self, Self)> {
        if self.is_single() {
            return None;
        }
        let mid = self.midpoint();
        Some((
            Self {
                start: self.start,
                end: mid,
            },
            Self {
                start: mid + 1,
                end: self.end,
            },
        ))
    }

    /// Returns if this range lies entirely before `other`.
    pub fn is_left_of(&self, other: &Self) -> bool {
        self.end < other.start
    }

    /// Returns if the two ranges touch without overlapping.
    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.end.checked_add(1) == Some(other.start)
            || other.end.checked_add(1) == Some(self.start)
    }

    /// Smallest range covering both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            start: min(self.start, other.start),
            end: max(self.end, other.end),
        }
    }

    /// Returns the bounds as a tuple.
    pub fn as_tuple(&self) -> (u64, u64) {
        (self.start, self.end)
    }
}

impl fmt::Display for LeafRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted() {
        assert_eq!(
            LeafRange::new(3, 2),
            Err(MerkleError::MalformedProofNode { start: 3, end: 2 })
        );
        assert!(LeafRange::new(2, 2).is_ok());
    }

    #[test]
    fn split_is_left_heavy() {
        let r = LeafRange::for_len(5);
        let (l, r) = r.split().unwrap();
        assert_eq!(l.as_tuple(), (0, 2));
        assert_eq!(r.as_tuple(), (3, 4));

        let (l, r) = LeafRange::new(3, 4).unwrap().split().unwrap();
        assert_eq!(l, LeafRange::single(3));
        assert_eq!(r, LeafRange::single(4));

        assert!(LeafRange::single(7).split().is_none());
    }

    #[test]
    fn adjacency() {
        let a = LeafRange::new(0, 2).unwrap();
        let b = LeafRange::new(3, 4).unwrap();
        assert!(a.is_adjacent(&b));
        assert!(b.is_adjacent(&a));
        assert!(a.is_left_of(&b));
        assert!(!b.is_left_of(&a));
        assert!(!a.is_adjacent(&LeafRange::new(2, 4).unwrap()));
        assert!(!a.is_adjacent(&LeafRange::single(5)));
        assert_eq!(a.union(&b), LeafRange::for_len(5));
    }

    #[test]
    fn len_at_bounds() {
        assert_eq!(LeafRange::single(u64::MAX).len(), 1);
        assert_eq!(LeafRange::for_len(5).len(), 5);

        let full = LeafRange::new(0, u64::MAX).unwrap();
        assert_eq!(full.len(), u64::MAX);
        assert!(!full.is_empty());
        assert_eq!(LeafRange::new(1, u64::MAX).unwrap().len(), u64::MAX);
    }

    #[test]
    fn adjacency_at_max() {
        let top = LeafRange::single(u64::MAX);
        assert!(!top.is_adjacent(&LeafRange::single(0)));
        assert!(top.is_adjacent(&LeafRange::single(u64::MAX - 1)));
    }
}
