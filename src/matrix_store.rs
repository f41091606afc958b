use crate::eta::EtaColumn;
use crate::sparse_matrix::SparseMatrix;
use crate::sparse_vector::SparseVector;

/// Abstracts over the dense and sparse backing of the LU factors `F`/`V` so the
/// Gaussian eliminator (C4) and the solve/update routines of the façade (C5) are written
/// once and instantiated per representation, rather than duplicated four times. This is
/// the storage half of the "four interchangeable representations" requirement; the other
/// half (eta-file vs. Forrest-Tomlin update scheme) is a separate axis handled in
/// `factorization`.
pub(crate) trait MatrixStore: Clone {
    /// Native column representation used by this store's own eta file (LU-eta variants).
    /// Forrest-Tomlin eta files always use `SparseVector` regardless of this type, since
    /// the spike-elimination row is inherently sparse by construction.
    type EtaCol: EtaColumn;

    fn new(m: usize) -> Self;
    fn m(&self) -> usize;
    fn get(&self, row: usize, col: usize) -> f64;
    fn set(&mut self, row: usize, col: usize, value: f64, zero_tolerance: f64);
    fn clear_col(&mut self, col: usize);
    fn clear_row(&mut self, row: usize);
    /// Non-zero `(col, value)` pairs of `row`. For the dense store this yields every
    /// column (O(m) per call, matching the dense O(m^2) solve contract); for the sparse
    /// store it yields only stored entries.
    fn row_nonzeros(&self, row: usize) -> Vec<(usize, f64)>;
    fn col_nonzeros(&self, col: usize) -> Vec<(usize, f64)>;
    fn to_dense(&self, out: &mut [f64]);
    fn eta_col_from_dense(dense: &[f64], zero_tolerance: f64) -> Self::EtaCol;
}

/// Flat row-major `m x m` dense storage. `row_nonzeros`/`col_nonzeros` materialize every
/// entry (dense has no sparsity to skip), which is what gives this backend its O(m^2)
/// solve cost rather than O(nnz).
#[derive(Debug, Clone)]
pub(crate) struct DenseStore {
    m: usize,
    data: Vec<f64>,
}

impl DenseStore {
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.m + col
    }
}

impl MatrixStore for DenseStore {
    type EtaCol = Vec<f64>;

    fn new(m: usize) -> Self {
        Self { m, data: vec![0.0; m * m] }
    }

    fn m(&self) -> usize {
        self.m
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        self.data[self.index(row, col)]
    }

    fn set(&mut self, row: usize, col: usize, value: f64, zero_tolerance: f64) {
        let idx = self.index(row, col);
        self.data[idx] = if value.abs() < zero_tolerance { 0.0 } else { value };
    }

    fn clear_col(&mut self, col: usize) {
        for row in 0..self.m {
            let idx = self.index(row, col);
            self.data[idx] = 0.0;
        }
    }

    fn clear_row(&mut self, row: usize) {
        let start = self.index(row, 0);
        self.data[start..start + self.m].fill(0.0);
    }

    fn row_nonzeros(&self, row: usize) -> Vec<(usize, f64)> {
        (0..self.m).map(|c| (c, self.get(row, c))).collect()
    }

    fn col_nonzeros(&self, col: usize) -> Vec<(usize, f64)> {
        (0..self.m).map(|r| (r, self.get(r, col))).collect()
    }

    fn to_dense(&self, out: &mut [f64]) {
        out.copy_from_slice(&self.data);
    }

    fn eta_col_from_dense(dense: &[f64], _zero_tolerance: f64) -> Self::EtaCol {
        dense.to_vec()
    }
}

/// Mirrored row/column sparse storage (a single
/// matrix-with-transpose type updated in lock-step).
#[derive(Debug, Clone)]
pub(crate) struct SparseStore {
    matrix: SparseMatrix,
}

impl MatrixStore for SparseStore {
    type EtaCol = SparseVector;

    fn new(m: usize) -> Self {
        Self { matrix: SparseMatrix::new(m) }
    }

    fn m(&self) -> usize {
        self.matrix.m()
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        self.matrix.get(row, col)
    }

    fn set(&mut self, row: usize, col: usize, value: f64, zero_tolerance: f64) {
        self.matrix.set(row, col, value, zero_tolerance);
    }

    fn clear_col(&mut self, col: usize) {
        self.matrix.clear_col(col);
    }

    fn clear_row(&mut self, row: usize) {
        self.matrix.clear_row(row);
    }

    fn row_nonzeros(&self, row: usize) -> Vec<(usize, f64)> {
        self.matrix.row(row).iter().collect()
    }

    fn col_nonzeros(&self, col: usize) -> Vec<(usize, f64)> {
        self.matrix.col(col).iter().collect()
    }

    fn to_dense(&self, out: &mut [f64]) {
        self.matrix.to_dense(out);
    }

    fn eta_col_from_dense(dense: &[f64], zero_tolerance: f64) -> Self::EtaCol {
        SparseVector::from_dense(dense, zero_tolerance)
    }
}
