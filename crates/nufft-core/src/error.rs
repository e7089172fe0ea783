use nufft_fft::FftError;
use nufft_sparse::SparseError;
use thiserror::Error;

pub type NufftResult<T> = Result<T, NufftError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NufftError {
    /// Malformed plan arguments; no partial plan state is retained.
    #[error("configuration error: {message}")]
    Configuration { message: String },
    /// Interpolator-builder failure or non-conformant builder output; plan
    /// state is left uninitialized.
    #[error("plan error: {message}")]
    Plan { message: String },
    /// Runtime input shape disagrees with the planned geometry; raised before
    /// any computation begins.
    #[error("shape mismatch in {context}: expected {expected} elements, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Sparse-stage failure surfaced after validation; propagated unchanged.
    #[error("sparse stage failure: {0}")]
    Sparse(#[from] SparseError),
    /// Transform-stage failure surfaced after validation; propagated unchanged.
    #[error("transform stage failure: {0}")]
    Transform(#[from] FftError),
}

impl NufftError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn plan(message: impl Into<String>) -> Self {
        Self::Plan {
            message: message.into(),
        }
    }
}
