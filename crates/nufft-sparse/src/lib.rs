#![forbid(unsafe_code)]

//! Sparse interpolation/gridding kernels for the NUFFT operator.
//!
//! The interpolation matrix `P` (one sample per row) and its cached conjugate
//! transpose `P^H` both live here as complex CSR matrices, together with the
//! sequential, batched, and fused normal-operator products the transform
//! pipeline is built from.

pub mod formats;
pub mod ops;

pub use formats::{CsrMatrix, Shape2D, SparseError, SparseResult};
pub use ops::{spmv, spmv_batched, spmv_normal};
