use std::sync::OnceLock;
use std::time::Instant;

use num_complex::Complex;
use num_traits::{Float, One, Zero};
use rustfft::FftNum;

use nufft_fft::{embed_grid, extract_grid, fftn_inplace, ifftn_inplace, Normalization};
use nufft_sparse::{spmv, spmv_batched, spmv_normal};

use crate::error::{NufftError, NufftResult};
use crate::interpolator::{InterpolatorBuilder, SamplePoints};
use crate::plan::NufftPlan;
use crate::trace::{next_operation_id, record_trace, OperatorTrace};

/// The planned non-uniform FFT operator.
///
/// Forward evaluation runs scaling, centered zero-padding, the on-grid FFT,
/// and sparse interpolation; the adjoint runs the conjugate chain in reverse.
/// All plan state is immutable after [`NufftOperator::plan`], so `&self`
/// transforms may run concurrently. The Toeplitz weight vector is derived
/// lazily on first use and cached until the operator is re-planned.
pub struct NufftOperator<T: FftNum + Float> {
    plan: NufftPlan<T>,
    toeplitz_weights: OnceLock<Vec<Complex<T>>>,
}

/// Single-precision operator.
pub type Nufft32 = NufftOperator<f32>;
/// Double-precision operator.
pub type Nufft64 = NufftOperator<f64>;

impl<T: FftNum + Float> NufftOperator<T> {
    /// Plan the operator for a sample set and an `Nd`/`Kd`/`Jd` geometry.
    ///
    /// `ft_axes` defaults to all axes and `batch` to one channel. Kernel
    /// construction is delegated to `builder`; its output is shape- and
    /// finiteness-checked before any derived state is built. On error no
    /// partial plan state is retained.
    pub fn plan(
        builder: &dyn InterpolatorBuilder<T>,
        samples: &SamplePoints<T>,
        nd: &[usize],
        kd: &[usize],
        jd: &[usize],
        ft_axes: Option<&[usize]>,
        batch: Option<usize>,
    ) -> NufftResult<Self> {
        let started = Instant::now();
        let plan = NufftPlan::new(builder, samples, nd, kd, jd, ft_axes, batch)?;
        let operator = Self {
            plan,
            toeplitz_weights: OnceLock::new(),
        };
        operator.trace("plan", started);
        Ok(operator)
    }

    /// Replace the plan with one for a new geometry.
    ///
    /// The existing plan stays in effect if the new one fails to build.
    /// Success invalidates the cached Toeplitz weights.
    pub fn replan(
        &mut self,
        builder: &dyn InterpolatorBuilder<T>,
        samples: &SamplePoints<T>,
        nd: &[usize],
        kd: &[usize],
        jd: &[usize],
        ft_axes: Option<&[usize]>,
        batch: Option<usize>,
    ) -> NufftResult<()> {
        let started = Instant::now();
        let plan = NufftPlan::new(builder, samples, nd, kd, jd, ft_axes, batch)?;
        self.plan = plan;
        self.toeplitz_weights = OnceLock::new();
        self.trace("replan", started);
        Ok(())
    }

    /// Forward transform: image-domain data to non-uniform samples.
    ///
    /// `image` holds `prod(Nd) * batch` channel-interleaved elements; the
    /// result holds `M * batch`. Input shape is checked before any
    /// computation begins.
    pub fn forward(&self, image: &[Complex<T>]) -> NufftResult<Vec<Complex<T>>> {
        self.check_image_len(image.len(), "forward image")?;
        let started = Instant::now();
        let result = self.forward_channels(image, self.plan.batch())?;
        self.trace("forward", started);
        Ok(result)
    }

    /// Adjoint transform: non-uniform samples to image-domain data.
    ///
    /// `samples` holds `M * batch` channel-interleaved elements; the result
    /// holds `prod(Nd) * batch`. The exact conjugate transpose of
    /// [`NufftOperator::forward`] under the complex inner product (the FFT
    /// stage runs orthonormally scaled in both directions), not an inverse.
    pub fn adjoint(&self, samples: &[Complex<T>]) -> NufftResult<Vec<Complex<T>>> {
        self.check_sample_len(samples.len(), "adjoint samples")?;
        let started = Instant::now();
        let result = self.adjoint_channels(samples, self.plan.batch())?;
        self.trace("adjoint", started);
        Ok(result)
    }

    /// Exact normal operator `A^H A`: image-domain in, image-domain out.
    ///
    /// The interpolation stage is fused through the sample domain, so sample
    /// values are never materialized for the caller.
    pub fn selfadjoint(&self, image: &[Complex<T>]) -> NufftResult<Vec<Complex<T>>> {
        self.check_image_len(image.len(), "selfadjoint image")?;
        let started = Instant::now();
        let batch = self.plan.batch();
        let scaled = self.apply_scaling(image, batch);
        let grid = self.embed_and_transform(&scaled, batch)?;
        let grid = spmv_normal(self.plan.p_h(), self.plan.p(), &grid, batch)?;
        let image = self.inverse_and_extract(grid, batch)?;
        let result = self.apply_scaling(&image, batch);
        self.trace("selfadjoint", started);
        Ok(result)
    }

    /// Toeplitz approximation of the normal operator.
    ///
    /// Replaces the two interpolation passes with a pointwise multiply by the
    /// cached weight vector `W = |embed_fft(adjoint(1_M))|` on the oversampled
    /// grid. Cheaper per call than [`NufftOperator::selfadjoint`] and only
    /// approximately equal to it; the weights are computed on first use.
    pub fn selfadjoint_toeplitz(&self, image: &[Complex<T>]) -> NufftResult<Vec<Complex<T>>> {
        self.check_image_len(image.len(), "selfadjoint image")?;
        let started = Instant::now();
        let batch = self.plan.batch();
        let weights = self.toeplitz_weights()?;
        let scaled = self.apply_scaling(image, batch);
        let mut grid = self.embed_and_transform(&scaled, batch)?;
        for (chunk, &weight) in grid.chunks_mut(batch).zip(weights) {
            for slot in chunk.iter_mut() {
                *slot = *slot * weight;
            }
        }
        let image = self.inverse_and_extract(grid, batch)?;
        let result = self.apply_scaling(&image, batch);
        self.trace("selfadjoint_toeplitz", started);
        Ok(result)
    }

    #[must_use]
    pub fn nd(&self) -> &[usize] {
        self.plan.nd()
    }

    #[must_use]
    pub fn kd(&self) -> &[usize] {
        self.plan.kd()
    }

    #[must_use]
    pub fn ft_axes(&self) -> &[usize] {
        self.plan.ft_axes()
    }

    #[must_use]
    pub fn batch(&self) -> usize {
        self.plan.batch()
    }

    /// Number of non-uniform samples M.
    #[must_use]
    pub fn samples(&self) -> usize {
        self.plan.samples()
    }

    /// Elements of one image-domain channel.
    #[must_use]
    pub fn nd_total(&self) -> usize {
        self.plan.nd_total()
    }

    /// Elements of one oversampled-grid channel.
    #[must_use]
    pub fn kd_total(&self) -> usize {
        self.plan.kd_total()
    }

    /// Whether the Toeplitz weight cache has been populated.
    #[must_use]
    pub fn toeplitz_ready(&self) -> bool {
        self.toeplitz_weights.get().is_some()
    }

    fn toeplitz_weights(&self) -> NufftResult<&[Complex<T>]> {
        if let Some(weights) = self.toeplitz_weights.get() {
            return Ok(weights);
        }
        let computed = self.compute_toeplitz_weights()?;
        Ok(self.toeplitz_weights.get_or_init(|| computed))
    }

    /// Weight derivation runs single-channel regardless of the planned batch:
    /// `W0 = embed_fft(adjoint(1_M))`, `W = sqrt(W0 * conj(W0))`.
    fn compute_toeplitz_weights(&self) -> NufftResult<Vec<Complex<T>>> {
        let ones = vec![Complex::one(); self.plan.samples()];
        let grid = spmv(self.plan.p_h(), &ones)?;
        let image = self.inverse_and_extract(grid, 1)?;
        // adjoint tail scaling, then forward head scaling
        let image = self.apply_scaling(&image, 1);
        let scaled = self.apply_scaling(&image, 1);
        let w0 = self.embed_and_transform(&scaled, 1)?;
        Ok(w0
            .iter()
            .map(|value| Complex::new(value.norm(), T::zero()))
            .collect())
    }

    fn forward_channels(&self, image: &[Complex<T>], batch: usize) -> NufftResult<Vec<Complex<T>>> {
        let scaled = self.apply_scaling(image, batch);
        let grid = self.embed_and_transform(&scaled, batch)?;
        Ok(spmv_batched(self.plan.p(), &grid, batch)?)
    }

    // The scaling array is real, so the adjoint reuses the forward multiply.
    fn adjoint_channels(
        &self,
        samples: &[Complex<T>],
        batch: usize,
    ) -> NufftResult<Vec<Complex<T>>> {
        let grid = spmv_batched(self.plan.p_h(), samples, batch)?;
        let image = self.inverse_and_extract(grid, batch)?;
        Ok(self.apply_scaling(&image, batch))
    }

    fn apply_scaling(&self, data: &[Complex<T>], batch: usize) -> Vec<Complex<T>> {
        let mut scaled = data.to_vec();
        for (chunk, &weight) in scaled.chunks_mut(batch).zip(self.plan.sn()) {
            for slot in chunk.iter_mut() {
                *slot = *slot * weight;
            }
        }
        scaled
    }

    fn embed_and_transform(
        &self,
        scaled: &[Complex<T>],
        batch: usize,
    ) -> NufftResult<Vec<Complex<T>>> {
        let mut grid = embed_grid(scaled, self.plan.reorder(), batch)?;
        fftn_inplace(
            &mut grid,
            self.plan.kd(),
            self.plan.ft_axes(),
            batch,
            self.plan.axis_plans(),
            Normalization::Ortho,
        )?;
        Ok(grid)
    }

    fn inverse_and_extract(
        &self,
        mut grid: Vec<Complex<T>>,
        batch: usize,
    ) -> NufftResult<Vec<Complex<T>>> {
        ifftn_inplace(
            &mut grid,
            self.plan.kd(),
            self.plan.ft_axes(),
            batch,
            self.plan.axis_plans(),
            Normalization::Ortho,
        )?;
        Ok(extract_grid(&grid, self.plan.reorder(), batch)?)
    }

    fn check_image_len(&self, actual: usize, context: &'static str) -> NufftResult<()> {
        let expected = self.plan.nd_total() * self.plan.batch();
        if actual != expected {
            return Err(NufftError::ShapeMismatch {
                context,
                expected,
                actual,
            });
        }
        Ok(())
    }

    fn check_sample_len(&self, actual: usize, context: &'static str) -> NufftResult<()> {
        let expected = self.plan.samples() * self.plan.batch();
        if actual != expected {
            return Err(NufftError::ShapeMismatch {
                context,
                expected,
                actual,
            });
        }
        Ok(())
    }

    fn trace(&self, operation: &'static str, started: Instant) {
        record_trace(OperatorTrace {
            operation_id: next_operation_id(),
            operation,
            image_elements: self.plan.nd_total() * self.plan.batch(),
            sample_elements: self.plan.samples() * self.plan.batch(),
            batch: self.plan.batch(),
            timing_ns: started.elapsed().as_nanos(),
        });
    }
}

impl<T: FftNum + Float> std::fmt::Debug for NufftOperator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NufftOperator")
            .field("nd", &self.plan.nd())
            .field("kd", &self.plan.kd())
            .field("samples", &self.plan.samples())
            .field("batch", &self.plan.batch())
            .field("toeplitz_ready", &self.toeplitz_ready())
            .finish()
    }
}
