//! Capability traits over the operator.
//!
//! Iterative solvers only need the transform surface, not the planning
//! surface; splitting the two lets callers accept `&dyn Transformable<T>`
//! without dragging builder types into their signatures.

use num_complex::Complex;
use num_traits::Float;
use rustfft::FftNum;

use crate::error::NufftResult;
use crate::interpolator::{InterpolatorBuilder, SamplePoints};
use crate::operator::NufftOperator;

/// Construction from a sample set and grid geometry.
pub trait Plannable<T: Float>: Sized {
    fn plan(
        builder: &dyn InterpolatorBuilder<T>,
        samples: &SamplePoints<T>,
        nd: &[usize],
        kd: &[usize],
        jd: &[usize],
        ft_axes: Option<&[usize]>,
        batch: Option<usize>,
    ) -> NufftResult<Self>;
}

/// The forward/adjoint transform pair.
pub trait Transformable<T: Float> {
    /// Image-domain data to non-uniform samples.
    fn forward(&self, image: &[Complex<T>]) -> NufftResult<Vec<Complex<T>>>;
    /// Non-uniform samples to image-domain data; the exact adjoint of
    /// `forward` under the complex inner product.
    fn adjoint(&self, samples: &[Complex<T>]) -> NufftResult<Vec<Complex<T>>>;
}

/// The fused normal operator `A^H A`.
pub trait SelfAdjointOp<T: Float>: Transformable<T> {
    fn selfadjoint(&self, image: &[Complex<T>]) -> NufftResult<Vec<Complex<T>>>;
}

impl<T: FftNum + Float> Plannable<T> for NufftOperator<T> {
    fn plan(
        builder: &dyn InterpolatorBuilder<T>,
        samples: &SamplePoints<T>,
        nd: &[usize],
        kd: &[usize],
        jd: &[usize],
        ft_axes: Option<&[usize]>,
        batch: Option<usize>,
    ) -> NufftResult<Self> {
        NufftOperator::plan(builder, samples, nd, kd, jd, ft_axes, batch)
    }
}

impl<T: FftNum + Float> Transformable<T> for NufftOperator<T> {
    fn forward(&self, image: &[Complex<T>]) -> NufftResult<Vec<Complex<T>>> {
        NufftOperator::forward(self, image)
    }

    fn adjoint(&self, samples: &[Complex<T>]) -> NufftResult<Vec<Complex<T>>> {
        NufftOperator::adjoint(self, samples)
    }
}

impl<T: FftNum + Float> SelfAdjointOp<T> for NufftOperator<T> {
    fn selfadjoint(&self, image: &[Complex<T>]) -> NufftResult<Vec<Complex<T>>> {
        NufftOperator::selfadjoint(self, image)
    }
}
