use crate::matrix_store::MatrixStore;
use crate::permutation::Permutation;

/// The LU-factors structure: `A = F*V` with `F = P*L*P'` (strictly lower,
/// implicit unit diagonal) and `V = P*U*Q` (explicit diagonal kept separately for O(1)
/// access during the triangular solves). `S` is the storage backend (`DenseStore` or
/// `SparseStore`), shared by both the LU-eta and Forrest-Tomlin engines so the solve
/// math below is written exactly once per backend rather than once per façade variant.
#[derive(Clone)]
pub(crate) struct LuFactors<S> {
    f: S,
    v: S,
    p: Permutation,
    q: Permutation,
    /// Frozen copy of `P` taken at the last refactorization, used to read `L` out of `F`
    /// once Forrest-Tomlin updates have started rotating `P`/`Q`.
    p_for_f: Permutation,
    use_p_for_f: bool,
    v_diagonal: Vec<f64>,
}

impl<S: MatrixStore> LuFactors<S> {
    pub fn identity(m: usize) -> Self {
        let mut v = S::new(m);
        for i in 0..m {
            v.set(i, i, 1.0, 0.0);
        }
        Self {
            f: S::new(m),
            v,
            p: Permutation::identity(m),
            q: Permutation::identity(m),
            p_for_f: Permutation::identity(m),
            use_p_for_f: false,
            v_diagonal: vec![1.0; m],
        }
    }

    pub fn m(&self) -> usize {
        self.f.m()
    }

    pub fn f(&self) -> &S {
        &self.f
    }

    pub fn f_mut(&mut self) -> &mut S {
        &mut self.f
    }

    pub fn v(&self) -> &S {
        &self.v
    }

    pub fn v_mut(&mut self) -> &mut S {
        &mut self.v
    }

    pub fn p(&self) -> &Permutation {
        &self.p
    }

    pub fn p_mut(&mut self) -> &mut Permutation {
        &mut self.p
    }

    pub fn q(&self) -> &Permutation {
        &self.q
    }

    pub fn q_mut(&mut self) -> &mut Permutation {
        &mut self.q
    }

    pub fn v_diagonal(&self) -> &[f64] {
        &self.v_diagonal
    }

    pub fn v_diagonal_mut(&mut self) -> &mut Vec<f64> {
        &mut self.v_diagonal
    }

    pub fn use_p_for_f(&self) -> bool {
        self.use_p_for_f
    }

    pub fn activate_p_for_f(&mut self) {
        self.p_for_f = self.p.clone();
        self.use_p_for_f = true;
    }

    pub fn deactivate_p_for_f(&mut self) {
        self.use_p_for_f = false;
    }

    /// The permutation `L` sweeps should be read through: `p_for_f` once an FT update
    /// has frozen it, otherwise the live `p`.
    fn f_permutation(&self) -> &Permutation {
        if self.use_p_for_f { &self.p_for_f } else { &self.p }
    }

    pub fn from_parts(f: S, v: S, p: Permutation, q: Permutation, v_diagonal: Vec<f64>) -> Self {
        let p_for_f = p.clone();
        Self { f, v, p, q, p_for_f, use_p_for_f: false, v_diagonal }
    }

    /// Solves `F*z = y` by forward substitution in elimination-step order.
    pub fn f_forward(&self, y: &[f64]) -> Vec<f64> {
        let m = self.m();
        let p = self.f_permutation();
        let mut z = y.to_vec();
        for step in 0..m {
            let row = p.row_at(step);
            let mut sum = 0.0;
            for (col, val) in self.f.row_nonzeros(row) {
                sum += val * z[col];
            }
            z[row] -= sum;
        }
        z
    }

    /// Solves `x*F = y` by back substitution in reverse elimination-step order.
    pub fn f_backward(&self, y: &[f64]) -> Vec<f64> {
        let m = self.m();
        let p = self.f_permutation();
        let mut x = y.to_vec();
        for step in (0..m).rev() {
            let col = p.row_at(step);
            let mut sum = 0.0;
            for (row, val) in self.f.col_nonzeros(col) {
                if row != col {
                    sum += val * x[row];
                }
            }
            x[col] -= sum;
        }
        x
    }

    /// Solves `V*x = z` (upper-triangular, explicit diagonal), descending step order.
    pub fn v_forward(&self, z: &[f64]) -> Vec<f64> {
        let m = self.m();
        let residual = z;
        let mut solution = vec![0.0; m];
        for step in (0..m).rev() {
            let row = self.p.row_at(step);
            let col = self.q.row_at(step);
            let pivot = self.v_diagonal[row];
            let mut sum = 0.0;
            for (c, val) in self.v.row_nonzeros(row) {
                if c != col {
                    sum += val * solution[c];
                }
            }
            solution[col] = (residual[row] - sum) / pivot;
        }
        solution
    }

    /// Solves `x*V = y`, ascending step order.
    pub fn v_backward(&self, y: &[f64]) -> Vec<f64> {
        let m = self.m();
        let residual = y;
        let mut solution = vec![0.0; m];
        for step in 0..m {
            let row = self.p.row_at(step);
            let col = self.q.row_at(step);
            let pivot = self.v_diagonal[row];
            let mut sum = 0.0;
            for (r2, val) in self.v.col_nonzeros(col) {
                if r2 != row {
                    sum += val * solution[r2];
                }
            }
            solution[row] = (residual[col] - sum) / pivot;
        }
        solution
    }

    /// Solves `B0*x = y` where `B0 = F*V` is the basis as of the last refactorization.
    pub fn solve_b0_forward(&self, y: &[f64]) -> Vec<f64> {
        self.v_forward(&self.f_forward(y))
    }

    /// Solves `x*B0 = y`.
    pub fn solve_b0_backward(&self, y: &[f64]) -> Vec<f64> {
        self.f_backward(&self.v_backward(y))
    }

    /// `B0^{-1}`, written row-major into `out` (length `m*m`). Implemented as `m`
    /// independent forward solves against unit vectors; mathematically equivalent to the
    /// sweep-based construction built from repeated column sweeps, and simpler to keep correct.
    pub fn invert_b0_into(&self, out: &mut [f64]) {
        let m = self.m();
        for j in 0..m {
            let mut unit = vec![0.0; m];
            unit[j] = 1.0;
            let col = self.solve_b0_forward(&unit);
            for i in 0..m {
                out[i * m + j] = col[i];
            }
        }
    }

    pub fn to_dense_basis(&self, out: &mut [f64]) {
        let m = self.m();
        out.fill(0.0);
        for j in 0..m {
            let mut unit = vec![0.0; m];
            unit[j] = 1.0;
            // B0 * e_j = F*(V*e_j); computing B0 directly is just f applied to v's column.
            let v_col: Vec<f64> = (0..m).map(|i| self.v.get(i, j)).collect();
            let b_col = self.f_forward_inverse_apply(&v_col);
            for i in 0..m {
                out[i * m + j] = b_col[i];
            }
        }
    }

    /// Applies `F` (not `F^{-1}`) to a vector: a plain matrix-vector product, so unlike
    /// the solves above it needs no elimination-step ordering.
    fn f_forward_inverse_apply(&self, v_col: &[f64]) -> Vec<f64> {
        let m = self.m();
        let mut out = v_col.to_vec();
        for row in 0..m {
            let mut sum = 0.0;
            for (col, val) in self.f.row_nonzeros(row) {
                sum += val * v_col[col];
            }
            out[row] += sum;
        }
        out
    }
}
