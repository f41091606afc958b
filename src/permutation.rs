use crate::error::{BasisFactorizationError, BasisFactorizationResult};

/// Two mutually-inverse orderings of `0..m`. Used both as the row permutation `P`
/// and the column permutation `Q` of the LU factors: `row_ordering[step]` is the
/// original index occupying position `step`, and `col_ordering[original] = step`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    row_ordering: Vec<usize>,
    col_ordering: Vec<usize>,
}

impl Permutation {
    pub fn identity(m: usize) -> Self {
        Self { row_ordering: (0..m).collect(), col_ordering: (0..m).collect() }
    }

    pub fn len(&self) -> usize {
        self.row_ordering.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_ordering.is_empty()
    }

    /// The original index occupying step `step`.
    pub fn row_at(&self, step: usize) -> usize {
        self.row_ordering[step]
    }

    /// The step position that original index `original` currently occupies.
    pub fn find_row(&self, original: usize) -> usize {
        self.col_ordering[original]
    }

    /// Swaps positions `a` and `b` in `row_ordering`, fixing `col_ordering` in lock-step.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.row_ordering.swap(a, b);
        self.col_ordering[self.row_ordering[a]] = a;
        self.col_ordering[self.row_ordering[b]] = b;
    }

    /// Alias used when this permutation plays the role of `Q` (column ordering).
    pub fn swap_cols(&mut self, a: usize, b: usize) {
        self.swap_rows(a, b);
    }

    /// Rotates positions `[from, to]` up by one: the entry at `from` moves to `to`, and
    /// every entry in between shifts down by one position to fill the gap. Used by the
    /// FT update's cyclic permutation step.
    pub fn rotate_up(&mut self, from: usize, to: usize) {
        if from >= to {
            return;
        }
        let moved = self.row_ordering[from];
        self.row_ordering.copy_within(from + 1..=to, from);
        self.row_ordering[to] = moved;
        for step in from..=to {
            self.col_ordering[self.row_ordering[step]] = step;
        }
    }

    pub fn invert_into(&self, out: &mut Permutation) {
        out.row_ordering.clone_from(&self.col_ordering);
        out.col_ordering.clone_from(&self.row_ordering);
    }

    pub fn invert(&mut self) {
        std::mem::swap(&mut self.row_ordering, &mut self.col_ordering);
    }

    pub fn is_identity(&self) -> bool {
        self.row_ordering.iter().enumerate().all(|(i, &r)| i == r)
    }

    /// Fails with `CorruptPermutationMatrix` the first index at which the two
    /// orderings disagree; a corrupt permutation is a fatal factorization error
    /// because the simplex cannot continue from it.
    pub fn check_consistent(&self) -> BasisFactorizationResult<()> {
        for (original, &step) in self.col_ordering.iter().enumerate() {
            if self.row_ordering.get(step) != Some(&original) {
                return Err(BasisFactorizationError::CorruptPermutationMatrix { index: original });
            }
        }
        Ok(())
    }
}
