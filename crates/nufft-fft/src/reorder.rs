use num_complex::Complex;
use num_traits::{Num, Zero};

use crate::transforms::{FftError, FftResult};

/// Bidirectional flat-index maps between the compact image grid and the
/// oversampled grid.
///
/// Position `nd_order[i]` in a flattened `Nd`-shaped buffer corresponds to
/// position `kd_order[i]` in a flattened `Kd`-shaped buffer under centered
/// zero-padding. Scatter/gather through these tables replaces conditional
/// slicing and is O(total elements) in any dimensionality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderTables {
    nd_order: Vec<usize>,
    kd_order: Vec<usize>,
    nd_total: usize,
    kd_total: usize,
}

impl ReorderTables {
    /// Build the index maps for an `Nd`/`Kd` grid pair.
    ///
    /// Per-axis copy lengths are clamped by `min(Nd[i], Kd[i])`, so the
    /// builder stays total even for trimming configurations the planner
    /// rejects; with `Kd >= Nd` the tables cover every compact-grid element.
    #[must_use]
    pub fn build(nd: &[usize], kd: &[usize]) -> Self {
        let ndims = nd.len().min(kd.len());
        let nd_total: usize = nd.iter().product();
        let kd_total: usize = kd.iter().product();
        if ndims == 0 || nd_total == 0 || kd_total == 0 {
            return Self {
                nd_order: Vec::new(),
                kd_order: Vec::new(),
                nd_total,
                kd_total,
            };
        }

        let copy_len: Vec<usize> = (0..ndims).map(|axis| nd[axis].min(kd[axis])).collect();
        let offset: Vec<usize> = (0..ndims)
            .map(|axis| (kd[axis] - copy_len[axis]) / 2)
            .collect();
        let entries: usize = copy_len.iter().product();

        let mut nd_order = Vec::with_capacity(entries);
        let mut kd_order = Vec::with_capacity(entries);
        let mut index = vec![0usize; ndims];
        for _ in 0..entries {
            let mut nd_flat = 0;
            let mut kd_flat = 0;
            for axis in 0..ndims {
                nd_flat = nd_flat * nd[axis] + index[axis];
                kd_flat = kd_flat * kd[axis] + index[axis] + offset[axis];
            }
            nd_order.push(nd_flat);
            kd_order.push(kd_flat);

            for axis in (0..ndims).rev() {
                index[axis] += 1;
                if index[axis] < copy_len[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }

        Self {
            nd_order,
            kd_order,
            nd_total,
            kd_total,
        }
    }

    /// Number of elements actually copied between the grids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nd_order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nd_order.is_empty()
    }

    #[must_use]
    pub fn nd_order(&self) -> &[usize] {
        &self.nd_order
    }

    #[must_use]
    pub fn kd_order(&self) -> &[usize] {
        &self.kd_order
    }

    #[must_use]
    pub fn nd_total(&self) -> usize {
        self.nd_total
    }

    #[must_use]
    pub fn kd_total(&self) -> usize {
        self.kd_total
    }
}

/// Scatter a compact-grid buffer into a freshly zeroed oversampled-grid
/// buffer (centered zero-padding). Batch channels ride along by index
/// interleaving: flat element `j`, channel `b` lives at `j * batch + b`.
pub fn embed_grid<T: Num + Copy>(
    compact: &[Complex<T>],
    tables: &ReorderTables,
    batch: usize,
) -> FftResult<Vec<Complex<T>>> {
    if batch == 0 {
        return Err(FftError::InvalidShape {
            detail: "batch must be positive",
        });
    }
    let expected = tables.nd_total() * batch;
    if compact.len() != expected {
        return Err(FftError::LengthMismatch {
            expected,
            actual: compact.len(),
        });
    }

    let mut oversampled = vec![Complex::zero(); tables.kd_total() * batch];
    for (&nd_index, &kd_index) in tables.nd_order().iter().zip(tables.kd_order()) {
        for b in 0..batch {
            oversampled[kd_index * batch + b] = compact[nd_index * batch + b];
        }
    }
    Ok(oversampled)
}

/// Gather the mapped positions of an oversampled-grid buffer back into a
/// freshly zeroed compact-grid buffer (cropping away the padding).
pub fn extract_grid<T: Num + Copy>(
    oversampled: &[Complex<T>],
    tables: &ReorderTables,
    batch: usize,
) -> FftResult<Vec<Complex<T>>> {
    if batch == 0 {
        return Err(FftError::InvalidShape {
            detail: "batch must be positive",
        });
    }
    let expected = tables.kd_total() * batch;
    if oversampled.len() != expected {
        return Err(FftError::LengthMismatch {
            expected,
            actual: oversampled.len(),
        });
    }

    let mut compact = vec![Complex::zero(); tables.nd_total() * batch];
    for (&nd_index, &kd_index) in tables.nd_order().iter().zip(tables.kd_order()) {
        for b in 0..batch {
            compact[nd_index * batch + b] = oversampled[kd_index * batch + b];
        }
    }
    Ok(compact)
}
