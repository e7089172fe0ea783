use num_complex::Complex;
use num_traits::{FromPrimitive, One, Zero};
use rustfft::{Fft, FftNum};
use thiserror::Error;

use crate::plan::AxisPlans;

pub type FftResult<T> = Result<T, FftError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FftError {
    #[error("invalid shape: {detail}")]
    InvalidShape { detail: &'static str },
    #[error("axis {axis} out of bounds for {ndims}-dimensional shape")]
    InvalidAxis { axis: usize, ndims: usize },
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("no cached plan for axis length {len}")]
    MissingPlan { len: usize },
}

/// Per-axis scaling convention, matching the NumPy `norm=` options.
///
/// `Backward` leaves the forward transform unscaled and divides the inverse
/// by each transformed-axis length. `Ortho` divides both directions by the
/// square root of each length, which makes the forward/inverse pair
/// mutually adjoint as well as mutually inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    #[default]
    Backward,
    Ortho,
}

impl Normalization {
    fn forward_scale<T: FftNum>(self, axis_len: usize) -> FftResult<Option<T>> {
        match self {
            Self::Backward => Ok(None),
            Self::Ortho => Ok(Some(root_reciprocal(axis_len)?)),
        }
    }

    fn inverse_scale<T: FftNum>(self, axis_len: usize) -> FftResult<Option<T>> {
        match self {
            Self::Backward => {
                let len_t = T::from_usize(axis_len).ok_or(FftError::InvalidShape {
                    detail: "axis length not representable in the sample type",
                })?;
                Ok(Some(T::one() / len_t))
            }
            Self::Ortho => Ok(Some(root_reciprocal(axis_len)?)),
        }
    }
}

fn root_reciprocal<T: FftNum>(axis_len: usize) -> FftResult<T> {
    T::from_f64(1.0 / (axis_len as f64).sqrt()).ok_or(FftError::InvalidShape {
        detail: "axis length not representable in the sample type",
    })
}

/// Forward N-d FFT over a flat row-major buffer, restricted to `ft_axes`.
///
/// `data` holds `prod(shape) * batch` elements with channel `b` of flat
/// element `j` at `j * batch + b`; the trailing batch axis is never
/// transformed.
pub fn fftn_inplace<T: FftNum>(
    data: &mut [Complex<T>],
    shape: &[usize],
    ft_axes: &[usize],
    batch: usize,
    plans: &AxisPlans<T>,
    normalization: Normalization,
) -> FftResult<()> {
    validate_geometry(data.len(), shape, ft_axes, batch)?;
    for &axis in ft_axes {
        let axis_len = shape[axis];
        let fft = plans
            .forward(axis_len)
            .ok_or(FftError::MissingPlan { len: axis_len })?;
        let scale = normalization.forward_scale(axis_len)?;
        apply_axis(data, shape, axis, batch, fft.as_ref(), scale);
    }
    Ok(())
}

/// Inverse N-d FFT over the same layout as [`fftn_inplace`].
pub fn ifftn_inplace<T: FftNum>(
    data: &mut [Complex<T>],
    shape: &[usize],
    ft_axes: &[usize],
    batch: usize,
    plans: &AxisPlans<T>,
    normalization: Normalization,
) -> FftResult<()> {
    validate_geometry(data.len(), shape, ft_axes, batch)?;
    for &axis in ft_axes {
        let axis_len = shape[axis];
        let fft = plans
            .inverse(axis_len)
            .ok_or(FftError::MissingPlan { len: axis_len })?;
        let scale = normalization.inverse_scale(axis_len)?;
        apply_axis(data, shape, axis, batch, fft.as_ref(), scale);
    }
    Ok(())
}

/// Run a cached 1-d kernel along one axis of the flat buffer.
///
/// Lanes are gathered into a contiguous scratch buffer, transformed, and
/// scattered back; the batch axis contributes an extra factor to the stride
/// below the transform axis, which is the whole of batch support.
fn apply_axis<T: FftNum>(
    data: &mut [Complex<T>],
    shape: &[usize],
    axis: usize,
    batch: usize,
    fft: &dyn Fft<T>,
    scale: Option<T>,
) {
    let axis_len = shape[axis];
    let stride = shape[axis + 1..].iter().product::<usize>().max(1) * batch;
    let repeats = shape[..axis].iter().product::<usize>().max(1);
    let block = axis_len * stride;

    let mut lane = vec![Complex::zero(); axis_len];
    let mut scratch = vec![Complex::zero(); fft.get_inplace_scratch_len()];
    for outer in 0..repeats {
        let outer_base = outer * block;
        for offset in 0..stride {
            for (index, slot) in lane.iter_mut().enumerate() {
                *slot = data[outer_base + index * stride + offset];
            }
            fft.process_with_scratch(&mut lane, &mut scratch);
            match scale {
                Some(factor) => {
                    for (index, &value) in lane.iter().enumerate() {
                        data[outer_base + index * stride + offset] = value * factor;
                    }
                }
                None => {
                    for (index, &value) in lane.iter().enumerate() {
                        data[outer_base + index * stride + offset] = value;
                    }
                }
            }
        }
    }
}

fn validate_geometry(
    data_len: usize,
    shape: &[usize],
    ft_axes: &[usize],
    batch: usize,
) -> FftResult<()> {
    if shape.is_empty() {
        return Err(FftError::InvalidShape {
            detail: "shape cannot be empty",
        });
    }
    if shape.contains(&0) {
        return Err(FftError::InvalidShape {
            detail: "shape dimensions must be greater than zero",
        });
    }
    if batch == 0 {
        return Err(FftError::InvalidShape {
            detail: "batch must be positive",
        });
    }
    for &axis in ft_axes {
        if axis >= shape.len() {
            return Err(FftError::InvalidAxis {
                axis,
                ndims: shape.len(),
            });
        }
    }
    let expected = shape.iter().product::<usize>() * batch;
    if data_len != expected {
        return Err(FftError::LengthMismatch {
            expected,
            actual: data_len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use num_complex::Complex;

    use super::{fftn_inplace, ifftn_inplace, FftError, Normalization};
    use crate::plan::AxisPlans;

    type C64 = Complex<f64>;

    fn naive_dft_1d(input: &[C64], inverse: bool) -> Vec<C64> {
        let n = input.len();
        let sign = if inverse { 1.0 } else { -1.0 };
        (0..n)
            .map(|k| {
                let mut acc = Complex::new(0.0, 0.0);
                for (t, value) in input.iter().enumerate() {
                    let angle = sign * 2.0 * PI * (k as f64) * (t as f64) / (n as f64);
                    acc += value * Complex::new(angle.cos(), angle.sin());
                }
                if inverse {
                    acc / n as f64
                } else {
                    acc
                }
            })
            .collect()
    }

    fn assert_close(actual: &[C64], expected: &[C64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (lhs, rhs) in actual.iter().zip(expected) {
            assert!((lhs - rhs).norm() <= tol, "{lhs} !~= {rhs}");
        }
    }

    fn test_signal(len: usize) -> Vec<C64> {
        (0..len)
            .map(|i| Complex::new((i as f64 * 0.7).sin(), (i as f64 * 0.3).cos() - 0.5))
            .collect()
    }

    #[test]
    fn forward_matches_naive_dft_1d() {
        let shape = [11usize];
        let plans = AxisPlans::for_geometry(&shape, &[0]);
        let mut data = test_signal(11);
        let expected = naive_dft_1d(&data, false);
        fftn_inplace(&mut data, &shape, &[0], 1, &plans, Normalization::Backward).expect("fft");
        assert_close(&data, &expected, 1e-9);
    }

    #[test]
    fn inverse_matches_naive_dft_and_roundtrips() {
        let shape = [12usize];
        let plans = AxisPlans::for_geometry(&shape, &[0]);
        let original = test_signal(12);

        let mut spectrum = original.clone();
        fftn_inplace(&mut spectrum, &shape, &[0], 1, &plans, Normalization::Backward).expect("fft");
        assert_close(&spectrum, &naive_dft_1d(&original, false), 1e-9);

        ifftn_inplace(&mut spectrum, &shape, &[0], 1, &plans, Normalization::Backward)
            .expect("ifft");
        assert_close(&spectrum, &original, 1e-9);
    }

    #[test]
    fn two_dimensional_roundtrip_is_identity() {
        let shape = [4usize, 6];
        let plans = AxisPlans::for_geometry(&shape, &[0, 1]);
        let original = test_signal(24);
        let mut data = original.clone();
        fftn_inplace(&mut data, &shape, &[0, 1], 1, &plans, Normalization::Backward).expect("fft2");
        ifftn_inplace(&mut data, &shape, &[0, 1], 1, &plans, Normalization::Backward)
            .expect("ifft2");
        assert_close(&data, &original, 1e-9);
    }

    #[test]
    fn ortho_scaling_roundtrips_and_is_self_dual() {
        let shape = [8usize];
        let plans = AxisPlans::for_geometry(&shape, &[0]);
        let x = test_signal(8);
        let y: Vec<C64> = test_signal(8)
            .iter()
            .map(|v| Complex::new(v.im, -v.re))
            .collect();

        let mut spectrum = x.clone();
        fftn_inplace(&mut spectrum, &shape, &[0], 1, &plans, Normalization::Ortho).expect("fft");
        let scale = 1.0 / 8.0f64.sqrt();
        let expected: Vec<C64> = naive_dft_1d(&x, false).iter().map(|&v| v * scale).collect();
        assert_close(&spectrum, &expected, 1e-9);

        let mut back = spectrum.clone();
        ifftn_inplace(&mut back, &shape, &[0], 1, &plans, Normalization::Ortho).expect("ifft");
        assert_close(&back, &x, 1e-9);

        // orthonormal scaling makes the transform unitary: <F x, y> = <x, F^-1 y>
        let mut fy = y.clone();
        ifftn_inplace(&mut fy, &shape, &[0], 1, &plans, Normalization::Ortho).expect("ifft");
        let lhs: C64 = spectrum.iter().zip(&y).map(|(a, b)| a.conj() * b).sum();
        let rhs: C64 = x.iter().zip(&fy).map(|(a, b)| a.conj() * b).sum();
        assert!((lhs - rhs).norm() <= 1e-9, "{lhs} !~= {rhs}");
    }

    #[test]
    fn axis_subset_leaves_other_axes_untouched() {
        // Transform only axis 1; every row must equal that row's 1-d DFT.
        let shape = [3usize, 5];
        let plans = AxisPlans::for_geometry(&shape, &[1]);
        let original = test_signal(15);
        let mut data = original.clone();
        fftn_inplace(&mut data, &shape, &[1], 1, &plans, Normalization::Backward)
            .expect("fft along axis 1");

        for row in 0..3 {
            let lane: Vec<C64> = original[row * 5..(row + 1) * 5].to_vec();
            let expected = naive_dft_1d(&lane, false);
            assert_close(&data[row * 5..(row + 1) * 5], &expected, 1e-9);
        }
    }

    #[test]
    fn batched_transform_matches_per_channel_evaluation() {
        let shape = [4usize, 4];
        let batch = 3;
        let plans = AxisPlans::for_geometry(&shape, &[0, 1]);
        let interleaved: Vec<C64> = (0..16 * batch)
            .map(|i| Complex::new((i as f64 * 0.11).sin(), (i as f64 * 0.05).cos()))
            .collect();

        let mut combined = interleaved.clone();
        fftn_inplace(&mut combined, &shape, &[0, 1], batch, &plans, Normalization::Backward)
            .expect("batched fft");

        for b in 0..batch {
            let mut channel: Vec<C64> = (0..16).map(|j| interleaved[j * batch + b]).collect();
            fftn_inplace(&mut channel, &shape, &[0, 1], 1, &plans, Normalization::Backward)
                .expect("single fft");
            for (j, expected) in channel.iter().enumerate() {
                let actual = combined[j * batch + b];
                assert!((actual - expected).norm() <= 1e-9);
            }
        }
    }

    #[test]
    fn rejects_bad_geometry() {
        let plans = AxisPlans::<f64>::for_geometry(&[4], &[0]);
        let mut data = vec![Complex::new(0.0, 0.0); 4];

        assert_eq!(
            fftn_inplace(&mut data, &[], &[0], 1, &plans, Normalization::Backward),
            Err(FftError::InvalidShape {
                detail: "shape cannot be empty",
            })
        );
        assert_eq!(
            fftn_inplace(&mut data, &[4], &[1], 1, &plans, Normalization::Backward),
            Err(FftError::InvalidAxis { axis: 1, ndims: 1 })
        );
        assert_eq!(
            fftn_inplace(&mut data, &[4], &[0], 2, &plans, Normalization::Backward),
            Err(FftError::LengthMismatch {
                expected: 8,
                actual: 4,
            })
        );
        assert_eq!(
            fftn_inplace(&mut data, &[4], &[0], 0, &plans, Normalization::Backward),
            Err(FftError::InvalidShape {
                detail: "batch must be positive",
            })
        );
    }

    #[test]
    fn missing_plan_is_reported_not_recomputed() {
        let plans = AxisPlans::<f64>::for_geometry(&[8], &[0]);
        let mut data = vec![Complex::new(0.0, 0.0); 4];
        assert_eq!(
            fftn_inplace(&mut data, &[4], &[0], 1, &plans, Normalization::Backward),
            Err(FftError::MissingPlan { len: 4 })
        );
    }
}
