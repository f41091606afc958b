use derive_more::{Display, Error};

/// Every failure mode the core can raise. All variants are either a caller/programmer
/// invariant violation or an unrecoverable numerical failure; none are retried internally.
#[derive(Debug, Display, Error, PartialEq, Clone, Copy)]
pub enum BasisFactorizationError {
    /// A scratch buffer or factor array could not be sized as requested.
    #[display("allocation failed while sizing '{context}'")]
    AllocationFailed { context: &'static str },

    /// `invert_basis` was called while an eta/FT eta file is non-empty.
    #[display("cannot invert basis: {pending_etas} pending eta(s) since last refactorization")]
    CantInvertBasisBecauseOfEtas { pending_etas: usize },

    /// `row_ordering`/`col_ordering` of a permutation disagree with each other.
    #[display("permutation matrix is corrupt at index {index}")]
    CorruptPermutationMatrix { index: usize },

    /// Markowitz elimination could not find a pivot even after relaxing the stability
    /// threshold down to epsilon. The caller sees this as `MalformedBasis`.
    #[display("Gaussian elimination failed: no admissible pivot at step {step}")]
    GaussianEliminationFailed { step: usize },

    /// `create()` was called with a type not recognized by the factory.
    #[display("unknown basis factorization type requested")]
    UnknownBasisFactorizationType,

    /// A code path that is intentionally unimplemented (e.g. column merge).
    #[display("feature not yet supported: {feature}")]
    FeatureNotYetSupported { feature: &'static str },

    /// `invert_basis` was called on a Forrest-Tomlin factorization whose basis isn't
    /// explicitly available (the eta file is non-empty).
    #[display("cannot invert basis: explicit basis is not available")]
    CantInvertBasisBecauseBasisIsntAvailable,

    /// Engine-visible translation of `GaussianEliminationFailed`, which the engine reacts
    /// to by selecting a different candidate basis.
    #[display("malformed basis: refactorization failed at step {step}")]
    MalformedBasis { step: usize },
}

impl BasisFactorizationError {
    /// Translates a Gaussian-elimination failure into the error the engine reacts to
    /// by picking a different candidate basis.
    pub fn into_malformed_basis(self) -> Self {
        match self {
            BasisFactorizationError::GaussianEliminationFailed { step } => {
                BasisFactorizationError::MalformedBasis { step }
            }
            other => other,
        }
    }
}

pub type BasisFactorizationResult<T> = Result<T, BasisFactorizationError>;
