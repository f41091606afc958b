use crate::config::BasisFactorizationConfig;
use crate::elimination::eliminate;
use crate::error::{BasisFactorizationError, BasisFactorizationResult};
use crate::eta::EtaFile;
use crate::eta::EtaMatrix;
use crate::lu_factors::LuFactors;
use crate::matrix_store::MatrixStore;
use crate::oracle::BasisColumnOracle;
use crate::sparse_vector::SparseVector;
use crate::stats::StatisticsSink;

/// The LU-eta variant of C5: a fixed `LuFactors` from the last refactorization plus a
/// growing eta file recording every update since. Instantiated over `DenseStore` and
/// `SparseStore` to yield the `Lu`/`SparseLu` façade members.
pub(crate) struct LuEtaFactorization<S: MatrixStore> {
    lu: LuFactors<S>,
    etas: EtaFile<S::EtaCol>,
    config: BasisFactorizationConfig,
    explicit_basis_available: bool,
}

impl<S: MatrixStore> LuEtaFactorization<S> {
    pub fn new(
        m: usize,
        config: BasisFactorizationConfig,
        oracle: &dyn BasisColumnOracle,
        stats: &mut dyn StatisticsSink,
    ) -> BasisFactorizationResult<Self> {
        let mut me = Self { lu: LuFactors::identity(m), etas: EtaFile::new(), config, explicit_basis_available: false };
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
        self.etas.clear();
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
        oracle: &dyn BasisColumnOracle,
        stats: &mut dyn StatisticsSink,
    ) -> BasisFactorizationResult<Vec<f64>> {
        let mut x = self.lu.solve_b0_forward(y);
        if self.etas.forward_solve_in_place(&mut x, self.config.pivot_tolerance).is_err() {
            stats.record_refactor_due_to_instability();
            self.obtain_fresh_basis(oracle, stats)?;
            let mut x = self.lu.solve_b0_forward(y);
            self.etas
                .forward_solve_in_place(&mut x, self.config.pivot_tolerance)
                .map_err(|_| BasisFactorizationError::MalformedBasis { step: 0 })?;
            return Ok(x);
        }
        Ok(x)
    }

    pub fn backward_transformation(
        &mut self,
        y: &[f64],
        oracle: &dyn BasisColumnOracle,
        stats: &mut dyn StatisticsSink,
    ) -> BasisFactorizationResult<Vec<f64>> {
        let mut x = y.to_vec();
        if self.etas.backward_solve_in_place(&mut x, self.config.pivot_tolerance).is_err() {
            stats.record_refactor_due_to_instability();
            self.obtain_fresh_basis(oracle, stats)?;
            return Ok(self.lu.solve_b0_backward(y));
        }
        Ok(self.lu.solve_b0_backward(&x))
    }

    pub fn update_to_adjacent_basis(
        &mut self,
        column_index: usize,
        change_column: &[f64],
        _new_column: &SparseVector,
        oracle: &dyn BasisColumnOracle,
        stats: &mut dyn StatisticsSink,
    ) -> BasisFactorizationResult<()> {
        let eta_col = S::eta_col_from_dense(change_column, self.config.zero_tolerance);
        self.etas.push(EtaMatrix::new(column_index, eta_col));
        self.explicit_basis_available = false;
        stats.record_ft_update();
        if self.etas.len() > self.config.refactorization_threshold {
            self.obtain_fresh_basis(oracle, stats)?;
        }
        Ok(())
    }

    pub fn invert_basis(&self, out: &mut [f64]) -> BasisFactorizationResult<()> {
        if !self.explicit_basis_available {
            return Err(BasisFactorizationError::CantInvertBasisBecauseOfEtas { pending_etas: self.etas.len() });
        }
        self.lu.invert_b0_into(out);
        Ok(())
    }

    /// Refactorizes (if needed) and returns a deep copy of the resulting LU factors, per
    /// the `store` contract.
    pub fn snapshot(
        &mut self,
        oracle: &dyn BasisColumnOracle,
        stats: &mut dyn StatisticsSink,
    ) -> BasisFactorizationResult<LuFactors<S>> {
        self.make_explicit_basis_available(oracle, stats)?;
        Ok(self.lu.clone())
    }

    /// Overwrites this factorization's LU factors and clears its eta file, per the
    /// `restore` contract.
    pub fn restore(&mut self, snapshot: &LuFactors<S>) {
        self.lu = snapshot.clone();
        self.etas.clear();
        self.explicit_basis_available = true;
    }
}
