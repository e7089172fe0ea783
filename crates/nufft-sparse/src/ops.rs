use num_complex::Complex;
use num_traits::Float;
use rayon::prelude::*;

use crate::formats::{CsrMatrix, SparseError, SparseResult};

/// Single-channel sparse matrix-vector product.
pub fn spmv<T: Float>(
    matrix: &CsrMatrix<T>,
    vector: &[Complex<T>],
) -> SparseResult<Vec<Complex<T>>> {
    if vector.len() != matrix.shape().cols {
        return Err(SparseError::IncompatibleShape {
            message: "spmv vector length must match matrix columns".to_string(),
        });
    }
    let zero = Complex::new(T::zero(), T::zero());
    let mut result = vec![zero; matrix.shape().rows];
    for (row, output) in result.iter_mut().enumerate() {
        for idx in matrix.indptr()[row]..matrix.indptr()[row + 1] {
            *output = *output + matrix.data()[idx] * vector[matrix.indices()[idx]];
        }
    }
    Ok(result)
}

/// Batched sparse matrix-vector product over a batch-interleaved buffer.
///
/// Input layout places channel `b` of flat element `j` at `j * batch + b`, so
/// `vector` has `cols * batch` entries and the result has `rows * batch`. Rows
/// are independent and are partitioned across rayon workers; `batch = 1` is
/// the single-channel case.
pub fn spmv_batched<T: Float + Send + Sync>(
    matrix: &CsrMatrix<T>,
    vector: &[Complex<T>],
    batch: usize,
) -> SparseResult<Vec<Complex<T>>> {
    if batch == 0 {
        return Err(SparseError::InvalidArgument {
            message: "batch must be positive".to_string(),
        });
    }
    if vector.len() != matrix.shape().cols * batch {
        return Err(SparseError::IncompatibleShape {
            message: format!(
                "batched spmv expects cols * batch = {} entries, got {}",
                matrix.shape().cols * batch,
                vector.len()
            ),
        });
    }

    let zero = Complex::new(T::zero(), T::zero());
    let mut result = vec![zero; matrix.shape().rows * batch];
    let indptr = matrix.indptr();
    let indices = matrix.indices();
    let data = matrix.data();
    result
        .par_chunks_mut(batch)
        .enumerate()
        .for_each(|(row, channels)| {
            for idx in indptr[row]..indptr[row + 1] {
                let weight = data[idx];
                let base = indices[idx] * batch;
                for (b, slot) in channels.iter_mut().enumerate() {
                    *slot = *slot + weight * vector[base + b];
                }
            }
        });
    Ok(result)
}

/// Fused normal-operator product `P^H (P k)` on oversampled-grid data.
///
/// Algebraically identical to chaining [`spmv_batched`] through the sample
/// domain, but the sample-domain values live only in an internal scratch
/// buffer and are never surfaced.
pub fn spmv_normal<T: Float + Send + Sync>(
    p_h: &CsrMatrix<T>,
    p: &CsrMatrix<T>,
    grid: &[Complex<T>],
    batch: usize,
) -> SparseResult<Vec<Complex<T>>> {
    if p_h.shape().cols != p.shape().rows || p_h.shape().rows != p.shape().cols {
        return Err(SparseError::IncompatibleShape {
            message: "normal product requires P^H shaped as the transpose of P".to_string(),
        });
    }
    let samples = spmv_batched(p, grid, batch)?;
    spmv_batched(p_h, &samples, batch)
}
