use crate::config::BasisFactorizationConfig;
use crate::error::{BasisFactorizationError, BasisFactorizationResult};
use crate::lu_factors::LuFactors;
use crate::matrix_store::MatrixStore;
use crate::permutation::Permutation;
use crate::sparse_matrix::SparseMatrix;
use crate::sparse_vector::SparseVector;

/// Produces an initial LU-with-permutations factorization of a sparse basis using
/// Markowitz pivoting. Always operates on an internally sparse active
/// submatrix — the columns supplied by the oracle are sparse regardless of which of
/// the four façade variants is refactorizing — and writes the result into whichever
/// `MatrixStore` the caller asks for (dense or sparse), so this one algorithm serves
/// all four representations.
pub(crate) fn eliminate<S: MatrixStore>(
    columns: &[SparseVector],
    config: &BasisFactorizationConfig,
) -> BasisFactorizationResult<LuFactors<S>> {
    let m = columns.len();
    let mut active = SparseMatrix::new(m);
    for (col_idx, column) in columns.iter().enumerate() {
        for (row, value) in column.iter() {
            active.set(row, col_idx, value, config.zero_tolerance);
        }
    }

    let mut row_active = vec![true; m];
    let mut col_active = vec![true; m];

    let mut p = Permutation::identity(m);
    let mut q = Permutation::identity(m);
    let mut f = S::new(m);
    let mut v = S::new(m);
    let mut v_diagonal = vec![0.0; m];

    for step in 0..m {
        let (pivot_row, pivot_col) = choose_pivot(&active, &row_active, &col_active, config)
            .ok_or(BasisFactorizationError::GaussianEliminationFailed { step })?;

        p.swap_rows(step, p.find_row(pivot_row));
        q.swap_cols(step, q.find_row(pivot_col));

        let pivot_value = active.get(pivot_row, pivot_col);
        v_diagonal[pivot_row] = pivot_value;

        for (col, val) in active.row(pivot_row).iter().collect::<Vec<_>>() {
            if col_active[col] {
                v.set(pivot_row, col, val, config.zero_tolerance);
            }
        }

        let affected_rows: Vec<usize> =
            active.col(pivot_col).iter().map(|(r, _)| r).filter(|&r| r != pivot_row && row_active[r]).collect();

        for row in affected_rows {
            let a_rj = active.get(row, pivot_col);
            if a_rj.abs() < config.zero_tolerance {
                continue;
            }
            let mu = a_rj / pivot_value;
            let pivot_row_entries: Vec<(usize, f64)> =
                active.row(pivot_row).iter().filter(|&(c, _)| col_active[c]).collect();
            for (col, val) in pivot_row_entries {
                let updated = active.get(row, col) - mu * val;
                active.set(row, col, updated, config.zero_tolerance);
            }
            active.set(row, pivot_col, 0.0, f64::INFINITY);
            f.set(row, pivot_row, mu, config.zero_tolerance);
        }

        row_active[pivot_row] = false;
        col_active[pivot_col] = false;
    }

    Ok(LuFactors::from_parts(f, v, p, q, v_diagonal))
}

/// Selects the Markowitz-minimal pivot among entries passing the stability test,
/// relaxing the threshold geometrically toward `pivot_tolerance` if none qualify.
fn choose_pivot(
    active: &SparseMatrix,
    row_active: &[bool],
    col_active: &[bool],
    config: &BasisFactorizationConfig,
) -> Option<(usize, usize)> {
    let m = active.m();

    let max_in_col: Vec<f64> = (0..m)
        .map(|c| {
            if !col_active[c] {
                return 0.0;
            }
            active.col(c).iter().filter(|&(r, _)| row_active[r]).map(|(_, v)| v.abs()).fold(0.0, f64::max)
        })
        .collect();

    let row_count = |r: usize| active.row(r).iter().filter(|&(c, _)| col_active[c]).count();
    let col_count = |c: usize| active.col(c).iter().filter(|&(r, _)| row_active[r]).count();

    let mut threshold = config.pivot_threshold;
    loop {
        let mut best: Option<(usize, usize, usize)> = None;
        for r in 0..m {
            if !row_active[r] {
                continue;
            }
            for (c, value) in active.row(r).iter() {
                if !col_active[c] || value.abs() < config.zero_tolerance {
                    continue;
                }
                let max_col = max_in_col[c];
                if max_col <= 0.0 || value.abs() < threshold * max_col {
                    continue;
                }
                let cost = (row_count(r).saturating_sub(1)) * (col_count(c).saturating_sub(1));
                best = match best {
                    Some((br, bc, bcost)) if (bcost, br, bc) <= (cost, r, c) => Some((br, bc, bcost)),
                    _ => Some((r, c, cost)),
                };
            }
        }
        if let Some((r, c, _)) = best {
            return Some((r, c));
        }
        if threshold <= config.pivot_tolerance {
            return None;
        }
        threshold = (threshold * 0.1).max(config.pivot_tolerance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix_store::{DenseStore, SparseStore};

    fn column(values: &[f64]) -> SparseVector {
        SparseVector::from_dense(values, 1e-9)
    }

    #[test]
    fn identity_basis_factors_to_identity() {
        let cols = vec![column(&[1.0, 0.0]), column(&[0.0, 1.0])];
        let config = BasisFactorizationConfig::default();
        let lu: LuFactors<SparseStore> = eliminate(&cols, &config).unwrap();
        let y = [3.0, 5.0];
        let x = lu.solve_b0_forward(&y);
        assert!((x[0] - 3.0).abs() < 1e-9);
        assert!((x[1] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn markowitz_example_matches_reference_multipliers() {
        // A = [[2,4,5],[3,-1,0],[0,-10,-2]] (columns below).
        let cols = vec![column(&[2.0, 3.0, 0.0]), column(&[4.0, -1.0, -10.0]), column(&[5.0, 0.0, -2.0])];
        let config = BasisFactorizationConfig::default();
        let lu: LuFactors<DenseStore> = eliminate(&cols, &config).unwrap();
        // Reconstruct B0 via the factors and check against the original matrix.
        let mut dense = vec![0.0; 9];
        lu.to_dense_basis(&mut dense);
        let expected = [2.0, 4.0, 5.0, 3.0, -1.0, 0.0, 0.0, -10.0, -2.0];
        for i in 0..9 {
            assert!((dense[i] - expected[i]).abs() < 1e-9, "index {i}: {} vs {}", dense[i], expected[i]);
        }
    }

    #[test]
    fn duplicate_column_fails_elimination() {
        let cols = vec![column(&[1.0, 2.0]), column(&[1.0, 2.0])];
        let config = BasisFactorizationConfig::default();
        let result: BasisFactorizationResult<LuFactors<SparseStore>> = eliminate(&cols, &config);
        assert!(matches!(result, Err(BasisFactorizationError::GaussianEliminationFailed { .. })));
    }

    #[test]
    fn four_by_four_factorization_reconstructs_the_basis() {
        // A = [[1,3,-2,4],[1,5,-1,5],[1,3,-3,6],[-1,-3,3,-8]] (columns below).
        let cols = vec![
            column(&[1.0, 1.0, 1.0, -1.0]),
            column(&[3.0, 5.0, 3.0, -3.0]),
            column(&[-2.0, -1.0, -3.0, 3.0]),
            column(&[4.0, 5.0, 6.0, -8.0]),
        ];
        let config = BasisFactorizationConfig::default();
        let lu: LuFactors<SparseStore> = eliminate(&cols, &config).unwrap();
        let mut dense = vec![0.0; 16];
        lu.to_dense_basis(&mut dense);
        let expected = [1.0, 3.0, -2.0, 4.0, 1.0, 5.0, -1.0, 5.0, 1.0, 3.0, -3.0, 6.0, -1.0, -3.0, 3.0, -8.0];
        for i in 0..16 {
            assert!((dense[i] - expected[i]).abs() < 1e-9, "index {i}: {} vs {}", dense[i], expected[i]);
        }
        // Every diagonal entry of V must be non-zero.
        assert!(lu.v_diagonal().iter().all(|&d| d.abs() > 1e-9));
    }
}
