use crate::sparse_vector::SparseVector;

/// Supplied by the engine (out of scope for this crate): given a column index, returns
/// the current column of the basis matrix `B` in dense or sparse form. The core never
/// retains pointers into oracle-owned storage beyond a callback's return.
pub trait BasisColumnOracle {
    /// Fills `out` (length `m`) with the dense column `j` of the current basis.
    fn get_column_dense(&self, j: usize, out: &mut [f64]);

    /// Fills `out` with the sparse column `j` of the current basis.
    fn get_column_sparse(&self, j: usize, out: &mut SparseVector);

    /// Fills `out` (length `m`) with all `m` columns of the current basis as sparse
    /// vectors at once. Called by `obtain_fresh_basis` for every façade variant,
    /// dense or sparse, since the Gaussian eliminator always works from sparse input.
    fn get_sparse_basis(&self, out: &mut [SparseVector]);
}
