use std::f64::consts::TAU;

use num_complex::Complex;
use num_traits::{Float, One, ToPrimitive};

use nufft_sparse::{CsrMatrix, Shape2D};

use crate::error::{NufftError, NufftResult};

/// The M off-grid frequency coordinates, stored flat in row-major `M x ndims`
/// order with values normalized to `[-pi, pi)`. Immutable after planning.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePoints<T> {
    coords: Vec<T>,
    ndims: usize,
}

impl<T: Float> SamplePoints<T> {
    pub fn from_flat(coords: Vec<T>, ndims: usize) -> NufftResult<Self> {
        if ndims == 0 {
            return Err(NufftError::configuration(
                "sample coordinates need at least one dimension",
            ));
        }
        if coords.len() % ndims != 0 {
            return Err(NufftError::configuration(format!(
                "flat coordinate length {} is not a multiple of ndims {ndims}",
                coords.len()
            )));
        }
        Ok(Self { coords, ndims })
    }

    /// Number of samples M.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coords.len() / self.ndims
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    #[must_use]
    pub fn ndims(&self) -> usize {
        self.ndims
    }

    /// Coordinate vector of sample `m`.
    #[must_use]
    pub fn point(&self, m: usize) -> &[T] {
        &self.coords[m * self.ndims..(m + 1) * self.ndims]
    }
}

/// Exchange struct produced by an interpolator builder: the sparse
/// interpolation matrix, the roll-off scaling array, and the geometry they
/// were derived for. Consumed by value during planning so the builder's raw
/// intermediates are released as soon as the plan owns what it needs.
#[derive(Debug, Clone)]
pub struct InterpolatorOutput<T> {
    /// Interpolation matrix, `M x prod(Kd)`, one sample per row.
    pub p: CsrMatrix<T>,
    /// Real roll-off correction, `prod(Nd)` entries in row-major order.
    pub sn: Vec<T>,
    pub nd: Vec<usize>,
    pub kd: Vec<usize>,
    pub m: usize,
}

/// The external interpolator-builder collaborator.
///
/// Kernel derivation (min-max or otherwise) lives behind this seam; the
/// operator core only requires shape and dtype conformance of the output and
/// verifies both during planning.
pub trait InterpolatorBuilder<T: Float> {
    fn build(
        &self,
        samples: &SamplePoints<T>,
        nd: &[usize],
        kd: &[usize],
        jd: &[usize],
        ft_axes: &[usize],
    ) -> NufftResult<InterpolatorOutput<T>>;
}

/// Reference builder: unit weight on the nearest oversampled grid point and
/// unit scaling.
///
/// Shape- and dtype-conformant by construction, which makes it the builder of
/// choice for tests, benches, and fuzzing; it derives no kernel coefficients
/// and is not an accuracy-grade interpolator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighborInterpolator;

impl<T: Float> InterpolatorBuilder<T> for NearestNeighborInterpolator {
    fn build(
        &self,
        samples: &SamplePoints<T>,
        nd: &[usize],
        kd: &[usize],
        _jd: &[usize],
        _ft_axes: &[usize],
    ) -> NufftResult<InterpolatorOutput<T>> {
        let m = samples.len();
        let kd_total: usize = kd.iter().product();
        let nd_total: usize = nd.iter().product();
        let tau = T::from(TAU).ok_or_else(|| {
            NufftError::plan("two-pi constant not representable in the sample type")
        })?;

        let mut data = Vec::with_capacity(m);
        let mut indices = Vec::with_capacity(m);
        let mut indptr = Vec::with_capacity(m + 1);
        indptr.push(0);
        for row in 0..m {
            let mut flat = 0usize;
            for (axis, &omega) in samples.point(row).iter().enumerate() {
                let len = kd[axis];
                let len_t = T::from(len).ok_or_else(|| {
                    NufftError::plan("grid length not representable in the sample type")
                })?;
                // omega in [-pi, pi) maps to cell round(omega / 2pi * Kd) mod Kd
                let cell = (omega / tau * len_t)
                    .round()
                    .to_isize()
                    .ok_or_else(|| NufftError::plan("non-finite sample coordinate"))?;
                let wrapped = cell.rem_euclid(len as isize) as usize;
                flat = flat * len + wrapped;
            }
            indices.push(flat);
            data.push(Complex::one());
            indptr.push(row + 1);
        }

        let p = CsrMatrix::from_components(Shape2D::new(m, kd_total), data, indices, indptr)
            .map_err(|err| NufftError::plan(err.to_string()))?;
        Ok(InterpolatorOutput {
            p,
            sn: vec![T::one(); nd_total],
            nd: nd.to_vec(),
            kd: kd.to_vec(),
            m,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::{InterpolatorBuilder, NearestNeighborInterpolator, SamplePoints};
    use crate::error::NufftError;

    #[test]
    fn sample_points_validate_flat_length() {
        let err = SamplePoints::from_flat(vec![0.0f64; 5], 2).expect_err("5 is not 2-divisible");
        assert!(matches!(err, NufftError::Configuration { .. }));

        let points = SamplePoints::from_flat(vec![0.1f64, -0.2, 0.3, 0.4], 2).expect("valid");
        assert_eq!(points.len(), 2);
        assert_eq!(points.ndims(), 2);
        assert_eq!(points.point(1), &[0.3, 0.4]);
    }

    #[test]
    fn nearest_neighbor_output_is_shape_conformant() {
        let samples =
            SamplePoints::from_flat(vec![0.0f64, 0.5, -1.0, PI - 1e-6, -PI, 0.25], 2)
                .expect("valid samples");
        let output = NearestNeighborInterpolator
            .build(&samples, &[4, 4], &[8, 8], &[1, 1], &[0, 1])
            .expect("build");

        assert_eq!(output.m, 3);
        assert_eq!(output.p.shape().rows, 3);
        assert_eq!(output.p.shape().cols, 64);
        assert_eq!(output.p.nnz(), 3);
        assert_eq!(output.sn.len(), 16);
        assert!(output.sn.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn zero_frequency_maps_to_cell_zero() {
        let samples = SamplePoints::from_flat(vec![0.0f64], 1).expect("valid");
        let output = NearestNeighborInterpolator
            .build(&samples, &[4], &[8], &[1], &[0])
            .expect("build");
        assert_eq!(output.p.indices(), &[0]);
    }

    #[test]
    fn negative_frequencies_wrap_into_the_upper_half() {
        // omega = -pi/2 on an 8-point grid: round(-0.25 * 8) = -2 -> cell 6
        let samples = SamplePoints::from_flat(vec![-std::f64::consts::FRAC_PI_2], 1)
            .expect("valid");
        let output = NearestNeighborInterpolator
            .build(&samples, &[4], &[8], &[1], &[0])
            .expect("build");
        assert_eq!(output.p.indices(), &[6]);
    }
}
