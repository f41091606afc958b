/// Selects which of the four interchangeable basis representations a factorization uses.
/// Fixed at construction; never changed for the lifetime of a façade instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisFactorizationType {
    /// Dense LU factors with a dense eta file.
    Lu,
    /// Sparse LU factors with a sparse eta file.
    SparseLu,
    /// Dense LU factors maintained via Forrest-Tomlin updates.
    Ft,
    /// Sparse LU factors maintained via Forrest-Tomlin updates.
    SparseFt,
}

/// Construction-time, per-instance configuration. The core never reads process-wide
/// configuration state; every tunable lives here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasisFactorizationConfig {
    /// Eta (or FT eta) file length that triggers `obtain_fresh_basis`.
    pub refactorization_threshold: usize,
    /// Forrest-Tomlin diagonal-element tolerance; a spike elimination that produces a
    /// diagonal below this triggers a refactorization instead of committing the update.
    pub sparse_ft_diagonal_element_tolerance: f64,
    /// Markowitz stability factor: a candidate pivot must be at least
    /// `pivot_threshold * max_in_col` to be accepted before threshold relaxation kicks in.
    pub pivot_threshold: f64,
    /// ε_zero: magnitudes below this are treated as exact zero everywhere in the core.
    pub zero_tolerance: f64,
    /// ε_pivot: the floor threshold relaxation stops at before elimination fails.
    pub pivot_tolerance: f64,
}

impl Default for BasisFactorizationConfig {
    fn default() -> Self {
        Self {
            refactorization_threshold: 20,
            sparse_ft_diagonal_element_tolerance: 1e-9,
            pivot_threshold: 0.1,
            zero_tolerance: 1e-9,
            pivot_tolerance: 1e-9,
        }
    }
}
