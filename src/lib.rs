//! Basis factorization primitives for a simplex-based bound-tightening engine.
//!
//! This crate maintains an invertible representation of the current simplex basis
//! under streaming rank-one updates, answers the two linear solves (`Bx=y`, `xB=y`)
//! that drive every pivot, refactorizes when accumulated updates degrade accuracy,
//! and surfaces failure when the basis cannot be represented. Four interchangeable
//! representations — dense LU + eta-file, sparse LU + eta-file, dense Forrest-Tomlin,
//! sparse Forrest-Tomlin — are exposed behind one contract, [`IBasisFactorization`],
//! selected at construction via [`create`].
//!
//! The crate is single-threaded and synchronous: no operation suspends or blocks,
//! and the core never retains pointers into [`BasisColumnOracle`]-owned storage
//! beyond a callback's return.

mod config;
mod elimination;
mod error;
mod eta;
mod factorization;
mod lu_factors;
mod matrix_store;
mod oracle;
mod permutation;
mod sparse_matrix;
mod sparse_vector;
mod stats;

pub use config::{BasisFactorizationConfig, BasisFactorizationType};
pub use error::{BasisFactorizationError, BasisFactorizationResult};
pub use factorization::{BasisFactorization, BasisFactorizationSnapshot, IBasisFactorization, create};
pub use oracle::BasisColumnOracle;
pub use permutation::Permutation;
pub use sparse_matrix::SparseMatrix;
pub use sparse_vector::SparseVector;
pub use stats::{CountingStatisticsSink, NoOpStatisticsSink, StatisticsSink};
