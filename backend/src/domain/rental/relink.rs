//! Back-collection change sets.
//!
//! When an association moves from one set of targets to another, every
//! target that is dropped must forget the source and every new target must
//! learn it. [`Relink`] names both halves so a store can apply them as one
//! step.

use std::collections::BTreeSet;

/// Targets to detach from and attach to when an association changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relink<T: Ord> {
    /// Targets that no longer reference the source.
    pub detach: BTreeSet<T>,
    /// Targets that start referencing the source.
    pub attach: BTreeSet<T>,
}

impl<T: Ord + Copy> Relink<T> {
    /// Change set turning `old` into `new`.
    ///
    /// Targets present on both sides appear in neither half, so they are
    /// never dropped or duplicated.
    ///
    /// # Examples
    /// ```
    /// use std::collections::BTreeSet;
    /// use bikerent::domain::rental::Relink;
    ///
    /// let old: BTreeSet<i64> = [1, 2].into();
    /// let new: BTreeSet<i64> = [2, 3].into();
    /// let relink = Relink::between(&old, &new);
    /// assert_eq!(relink.detach, BTreeSet::from([1]));
    /// assert_eq!(relink.attach, BTreeSet::from([3]));
    /// ```
    #[must_use]
    pub fn between(old: &BTreeSet<T>, new: &BTreeSet<T>) -> Self {
        Self {
            detach: old.difference(new).copied().collect(),
            attach: new.difference(old).copied().collect(),
        }
    }

    /// Change set for a single-valued reference moving from `old` to `new`.
    #[must_use]
    pub fn single(old: T, new: T) -> Self {
        Self::between(&BTreeSet::from([old]), &BTreeSet::from([new]))
    }

    /// Whether applying the change set would do nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.detach.is_empty() && self.attach.is_empty()
    }
}
