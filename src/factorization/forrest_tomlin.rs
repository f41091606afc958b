use crate::config::BasisFactorizationConfig;
use crate::elimination::eliminate;
use crate::error::{BasisFactorizationError, BasisFactorizationResult};
use crate::eta::{EtaFile, EtaMatrix};
use crate::lu_factors::LuFactors;
use crate::matrix_store::MatrixStore;
use crate::oracle::BasisColumnOracle;
use crate::sparse_vector::SparseVector;
use crate::stats::StatisticsSink;

/// The Forrest-Tomlin variant of C5: a single `LuFactors` mutated in place by each
/// update, plus a small sparse eta file recording the row-spike eliminations needed to
/// keep `V` upper-triangular. Instantiated over `DenseStore` and `SparseStore`
/// to yield the `Ft`/`SparseFt` façade members — the dense member completes what is a
/// dormant stub in the source this subsystem is modeled on, sharing this one engine
/// with the sparse member rather than duplicating the update algorithm.
pub(crate) struct FtFactorization<S: MatrixStore> {
    lu: LuFactors<S>,
    ft_etas: EtaFile<SparseVector>,
    config: BasisFactorizationConfig,
    explicit_basis_available: bool,
}

impl<S: MatrixStore> FtFactorization<S> {
    pub fn new(
        m: usize,
        config: BasisFactorizationConfig,
        oracle: &dyn BasisColumnOracle,
        stats: &mut dyn StatisticsSink,
    ) -> BasisFactorizationResult<Self> {
        let mut me = Self { lu: LuFactors::identity(m), ft_etas: EtaFile::new(), config, explicit_basis_available: false };
        me.obtain_fresh_basis(oracle, stats)?;
        Ok(me)
    }

    pub fn m(&self) -> usize {
        self.lu.m()
    }

    pub fn explicit_basis_available(&self) -> bool {
        self.explicit_basis_available
    }

    pub fn obtain_fresh_basis(
        &mut self,
        oracle: &dyn BasisColumnOracle,
        stats: &mut dyn StatisticsSink,
    ) -> BasisFactorizationResult<()> {
        let m = self.lu.m();
        let mut columns = vec![SparseVector::new(); m];
        oracle.get_sparse_basis(&mut columns);
        let lu = eliminate::<S>(&columns, &self.config).map_err(|e| e.into_malformed_basis())?;
        self.lu = lu;
        self.ft_etas.clear();
        self.explicit_basis_available = true;
        stats.record_refactorization();
        Ok(())
    }

    pub fn make_explicit_basis_available(
        &mut self,
        oracle: &dyn BasisColumnOracle,
        stats: &mut dyn StatisticsSink,
    ) -> BasisFactorizationResult<()> {
        if !self.explicit_basis_available {
            self.obtain_fresh_basis(oracle, stats)?;
        }
        Ok(())
    }

    pub fn forward_transformation(
        &mut self,
        y: &[f64],
        _oracle: &dyn BasisColumnOracle,
        _stats: &mut dyn StatisticsSink,
    ) -> BasisFactorizationResult<Vec<f64>> {
        let mut z = self.lu.f_forward(y);
        self.ft_etas.apply_row_forward(&mut z);
        Ok(self.lu.v_forward(&z))
    }

    pub fn backward_transformation(
        &mut self,
        y: &[f64],
        _oracle: &dyn BasisColumnOracle,
        _stats: &mut dyn StatisticsSink,
    ) -> BasisFactorizationResult<Vec<f64>> {
        let mut z = self.lu.v_backward(y);
        self.ft_etas.apply_row_backward(&mut z);
        Ok(self.lu.f_backward(&z))
    }

    /// The six-step row-spike update. `a` is the explicit new column of `B`;
    /// `_change_column` (`B^-1 * a`) is the input the LU-eta variants need instead.
    pub fn update_to_adjacent_basis(
        &mut self,
        column_index: usize,
        _change_column: &[f64],
        a: &SparseVector,
        oracle: &dyn BasisColumnOracle,
        stats: &mut dyn StatisticsSink,
    ) -> BasisFactorizationResult<()> {
        if self.ft_etas.is_empty() && self.explicit_basis_available {
            self.lu.activate_p_for_f();
        }
        self.explicit_basis_available = false;

        let m = self.lu.m();
        let s = self.lu.q().find_row(column_index);

        // Step 1: V[:, column_index] <- H^-1 * (F^-1 * a).
        let dense_a = a.to_dense_vec(m);
        let mut new_col = self.lu.f_forward(&dense_a);
        self.ft_etas.apply_row_forward(&mut new_col);

        self.lu.v_mut().clear_col(column_index);
        let mut t = s;
        for (row, value) in new_col.iter().enumerate() {
            if value.abs() >= self.config.zero_tolerance {
                self.lu.v_mut().set(row, column_index, *value, self.config.zero_tolerance);
                t = t.max(self.lu.p().find_row(row));
            }
        }

        // Step 2: short-circuit if U is still upper-triangular.
        if t <= s {
            let diag_row = self.lu.p().row_at(s);
            self.lu.v_diagonal_mut()[diag_row] = self.lu.v().get(diag_row, column_index);
            stats.record_ft_update();
            return Ok(());
        }

        // Step 3: cyclic rotation moves the spike row/column to position t.
        let spike_row = self.lu.p().row_at(s);
        self.lu.p_mut().rotate_up(s, t);
        self.lu.q_mut().rotate_up(s, t);

        // Step 4: check whether the spike row is already clean.
        let q = self.lu.q().clone();
        let row_entries: Vec<(usize, f64)> = self.lu.v().row_nonzeros(spike_row);
        let is_clean = row_entries.iter().all(|&(col, val)| val.abs() < self.config.zero_tolerance || q.find_row(col) >= t);
        if is_clean {
            self.lu.v_diagonal_mut()[spike_row] = self.lu.v().get(spike_row, column_index);
            stats.record_ft_update();
            return Ok(());
        }

        // Step 5: eliminate the spike row against the diagonal pivots at steps s..t.
        let mut eta_col = SparseVector::new();
        for step in s..t {
            let col_k = self.lu.q().row_at(step);
            let diag_row_k = self.lu.p().row_at(step);
            let spike_val = self.lu.v().get(spike_row, col_k);
            if spike_val.abs() < self.config.zero_tolerance {
                continue;
            }
            let mu = spike_val / self.lu.v_diagonal()[diag_row_k];
            let pivot_row_entries = self.lu.v().row_nonzeros(diag_row_k);
            for (col, val) in pivot_row_entries {
                let updated = self.lu.v().get(spike_row, col) - mu * val;
                self.lu.v_mut().set(spike_row, col, updated, self.config.zero_tolerance);
            }
            eta_col.set(diag_row_k, mu, self.config.zero_tolerance);
        }

        let new_diag = self.lu.v().get(spike_row, column_index);
        if new_diag.abs() < self.config.sparse_ft_diagonal_element_tolerance {
            return self.obtain_fresh_basis(oracle, stats);
        }

        // Step 6: commit the new FT eta and the updated diagonal.
        self.ft_etas.push(EtaMatrix::new(spike_row, eta_col));
        self.lu.v_diagonal_mut()[spike_row] = new_diag;
        stats.record_ft_update();

        if self.ft_etas.len() > self.config.refactorization_threshold {
            self.obtain_fresh_basis(oracle, stats)?;
        }
        Ok(())
    }

    pub fn invert_basis(&self, out: &mut [f64]) -> BasisFactorizationResult<()> {
        if !self.explicit_basis_available {
            return Err(BasisFactorizationError::CantInvertBasisBecauseBasisIsntAvailable);
        }
        self.lu.invert_b0_into(out);
        Ok(())
    }

    pub fn snapshot(
        &mut self,
        oracle: &dyn BasisColumnOracle,
        stats: &mut dyn StatisticsSink,
    ) -> BasisFactorizationResult<LuFactors<S>> {
        self.make_explicit_basis_available(oracle, stats)?;
        Ok(self.lu.clone())
    }

    pub fn restore(&mut self, snapshot: &LuFactors<S>) {
        self.lu = snapshot.clone();
        self.ft_etas.clear();
        self.explicit_basis_available = true;
    }
}
