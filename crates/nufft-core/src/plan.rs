use num_complex::Complex;
use num_traits::{Float, Zero};
use rustfft::FftNum;

use nufft_fft::{AxisPlans, ReorderTables};
use nufft_sparse::CsrMatrix;

use crate::error::{NufftError, NufftResult};
use crate::interpolator::{InterpolatorBuilder, InterpolatorOutput, SamplePoints};

/// Immutable plan state of the operator: geometry, the interpolation matrix
/// with its cached conjugate transpose, the roll-off scaling array, the
/// reorder tables, and the cached FFT kernels.
///
/// Read-only after construction; any number of concurrent transform calls may
/// share it without locking. Re-planning replaces the whole value.
#[derive(Debug)]
pub struct NufftPlan<T: FftNum + Float> {
    nd: Vec<usize>,
    kd: Vec<usize>,
    ndims: usize,
    ft_axes: Vec<usize>,
    batch: usize,
    m: usize,
    p: CsrMatrix<T>,
    p_h: CsrMatrix<T>,
    sn: Vec<Complex<T>>,
    reorder: ReorderTables,
    axis_plans: AxisPlans<T>,
}

impl<T: FftNum + Float> NufftPlan<T> {
    /// Plan the operator for the given geometry.
    ///
    /// Validates the arguments, delegates kernel construction to the
    /// interpolator builder, verifies the builder output's shape and
    /// finiteness, then derives the conjugate-transpose matrix, the reorder
    /// tables, and the per-axis FFT kernels. The builder output is consumed
    /// by value so its intermediates are released once the plan owns them.
    pub fn new(
        builder: &dyn InterpolatorBuilder<T>,
        samples: &SamplePoints<T>,
        nd: &[usize],
        kd: &[usize],
        jd: &[usize],
        ft_axes: Option<&[usize]>,
        batch: Option<usize>,
    ) -> NufftResult<Self> {
        validate_geometry(samples, nd, kd, jd, ft_axes, batch)?;
        let ndims = nd.len();
        let ft_axes: Vec<usize> = ft_axes.map_or_else(|| (0..ndims).collect(), <[usize]>::to_vec);
        let batch = batch.unwrap_or(1);

        let output = builder.build(samples, nd, kd, jd, &ft_axes)?;
        validate_builder_output(&output, samples)?;
        let InterpolatorOutput { p, sn, nd, kd, m } = output;

        let p_h = p.conjugate_transpose();
        let reorder = ReorderTables::build(&nd, &kd);
        let axis_plans = AxisPlans::for_geometry(&kd, &ft_axes);
        let sn = sn
            .into_iter()
            .map(|value| Complex::new(value, T::zero()))
            .collect();

        Ok(Self {
            ndims: nd.len(),
            nd,
            kd,
            ft_axes,
            batch,
            m,
            p,
            p_h,
            sn,
            reorder,
            axis_plans,
        })
    }

    #[must_use]
    pub fn nd(&self) -> &[usize] {
        &self.nd
    }

    #[must_use]
    pub fn kd(&self) -> &[usize] {
        &self.kd
    }

    #[must_use]
    pub fn ndims(&self) -> usize {
        self.ndims
    }

    #[must_use]
    pub fn ft_axes(&self) -> &[usize] {
        &self.ft_axes
    }

    #[must_use]
    pub fn batch(&self) -> usize {
        self.batch
    }

    /// Number of non-uniform samples M.
    #[must_use]
    pub fn samples(&self) -> usize {
        self.m
    }

    /// Elements of the compact image grid (per channel).
    #[must_use]
    pub fn nd_total(&self) -> usize {
        self.nd.iter().product()
    }

    /// Elements of the oversampled grid (per channel).
    #[must_use]
    pub fn kd_total(&self) -> usize {
        self.kd.iter().product()
    }

    pub(crate) fn p(&self) -> &CsrMatrix<T> {
        &self.p
    }

    pub(crate) fn p_h(&self) -> &CsrMatrix<T> {
        &self.p_h
    }

    pub(crate) fn sn(&self) -> &[Complex<T>] {
        &self.sn
    }

    pub(crate) fn reorder(&self) -> &ReorderTables {
        &self.reorder
    }

    pub(crate) fn axis_plans(&self) -> &AxisPlans<T> {
        &self.axis_plans
    }
}

fn validate_geometry<T: Float>(
    samples: &SamplePoints<T>,
    nd: &[usize],
    kd: &[usize],
    jd: &[usize],
    ft_axes: Option<&[usize]>,
    batch: Option<usize>,
) -> NufftResult<()> {
    if nd.is_empty() {
        return Err(NufftError::configuration("Nd must have at least one axis"));
    }
    if nd.len() != kd.len() || nd.len() != jd.len() {
        return Err(NufftError::configuration(format!(
            "dimension counts of Nd/Kd/Jd must match (got {}/{}/{})",
            nd.len(),
            kd.len(),
            jd.len()
        )));
    }
    if nd.contains(&0) || kd.contains(&0) || jd.contains(&0) {
        return Err(NufftError::configuration(
            "Nd, Kd and Jd entries must be positive",
        ));
    }
    for (axis, (&n, &k)) in nd.iter().zip(kd).enumerate() {
        if k < n {
            return Err(NufftError::configuration(format!(
                "Kd[{axis}] = {k} must be at least Nd[{axis}] = {n}"
            )));
        }
    }
    if samples.ndims() != nd.len() {
        return Err(NufftError::configuration(format!(
            "sample coordinate columns ({}) must match len(Nd) ({})",
            samples.ndims(),
            nd.len()
        )));
    }
    if batch == Some(0) {
        return Err(NufftError::configuration("batch must be positive"));
    }
    if let Some(axes) = ft_axes {
        for &axis in axes {
            if axis >= nd.len() {
                return Err(NufftError::configuration(format!(
                    "ft_axes entry {axis} out of bounds for {} axes",
                    nd.len()
                )));
            }
        }
    }
    Ok(())
}

fn validate_builder_output<T: Float>(
    output: &InterpolatorOutput<T>,
    samples: &SamplePoints<T>,
) -> NufftResult<()> {
    let kd_total: usize = output.kd.iter().product();
    let nd_total: usize = output.nd.iter().product();
    if output.m != samples.len() || output.p.shape().rows != output.m {
        return Err(NufftError::plan(format!(
            "interpolation matrix has {} rows for {} samples",
            output.p.shape().rows,
            samples.len()
        )));
    }
    if output.p.shape().cols != kd_total {
        return Err(NufftError::plan(format!(
            "interpolation matrix has {} columns, oversampled grid has {kd_total}",
            output.p.shape().cols
        )));
    }
    if output.sn.len() != nd_total {
        return Err(NufftError::plan(format!(
            "scaling array has {} entries, image grid has {nd_total}",
            output.sn.len()
        )));
    }
    output
        .p
        .check_finite()
        .map_err(|err| NufftError::plan(err.to_string()))?;
    if output.sn.iter().any(|value| !value.is_finite()) {
        return Err(NufftError::plan("scaling array contains non-finite entries"));
    }
    Ok(())
}
