//! Plan-time construction and run-time evaluation of the non-uniform FFT
//! operator.
//!
//! The operator maps uniform image-domain data to samples at arbitrary
//! off-grid frequency locations by chaining roll-off scaling, centered
//! zero-padding onto an oversampled grid, an on-grid FFT, and sparse
//! interpolation; the adjoint runs the conjugate chain in reverse. Kernel
//! derivation is delegated to an [`interpolator::InterpolatorBuilder`]
//! implementation supplied at planning time.
//!
//! Module map:
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`error`] | The operator error type and result alias |
//! | [`interpolator`] | Sample coordinates and the builder seam |
//! | [`operator`] | The planned operator and its transforms |
//! | [`plan`] | Immutable per-geometry plan state |
//! | [`trace`] | Structured per-call trace records |
//! | [`traits`] | Capability traits for solver-facing callers |

#![forbid(unsafe_code)]

pub mod error;
pub mod interpolator;
pub mod operator;
pub mod plan;
pub mod trace;
pub mod traits;

pub use nufft_sparse::{CsrMatrix, Shape2D};

pub use error::{NufftError, NufftResult};
pub use interpolator::{
    InterpolatorBuilder, InterpolatorOutput, NearestNeighborInterpolator, SamplePoints,
};
pub use operator::{Nufft32, Nufft64, NufftOperator};
pub use plan::NufftPlan;
pub use trace::{take_operator_traces, OperatorTrace};
pub use traits::{Plannable, SelfAdjointOp, Transformable};
