#![forbid(unsafe_code)]

//! Oversampled-grid transform stage for the NUFFT operator.
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | `plan`       | [`AxisPlans`]: cached per-axis-length rustfft kernels       |
//! | `reorder`    | [`ReorderTables`] + zero-pad embedding scatter/gather       |
//! | `transforms` | batch-agnostic N-d forward/inverse FFT over flat buffers    |
//!
//! All buffers are flat, row-major, with an optional trailing batch axis
//! realized as index interleaving (`flat_index * batch + channel`); the
//! sparse and operator layers share the same layout.

pub mod plan;
pub mod reorder;
pub mod transforms;

pub use plan::AxisPlans;
pub use reorder::{embed_grid, extract_grid, ReorderTables};
pub use transforms::{fftn_inplace, ifftn_inplace, FftError, FftResult, Normalization};
