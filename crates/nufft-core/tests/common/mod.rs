//! Shared fixtures for the operator test suites.

#![allow(dead_code)]

use std::f64::consts::TAU;

use num_complex::Complex;

use nufft_core::{
    CsrMatrix, InterpolatorBuilder, InterpolatorOutput, Nufft64, NufftOperator, NufftResult,
    SamplePoints, Shape2D,
};

pub type C64 = Complex<f64>;

/// Minimal splitmix-style generator so fixtures are reproducible without a
/// dev-dependency on an RNG crate.
pub struct Lcg(u64);

impl Lcg {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self(seed | 1)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Both parts uniform in `[-0.5, 0.5)`.
    pub fn next_complex(&mut self) -> C64 {
        Complex::new(self.next_f64() - 0.5, self.next_f64() - 0.5)
    }
}

/// Deterministic builder with `prod(Jd)` pseudo-random entries per row and a
/// varying positive scaling array. Shape-conformant like a production kernel
/// but with no accuracy claim, which is exactly what the pipeline-algebra
/// tests need.
pub struct SeededInterpolator {
    pub seed: u64,
}

impl InterpolatorBuilder<f64> for SeededInterpolator {
    fn build(
        &self,
        samples: &SamplePoints<f64>,
        nd: &[usize],
        kd: &[usize],
        jd: &[usize],
        _ft_axes: &[usize],
    ) -> NufftResult<InterpolatorOutput<f64>> {
        let m = samples.len();
        let kd_total: usize = kd.iter().product();
        let nd_total: usize = nd.iter().product();
        let per_row: usize = jd.iter().product();

        let mut rng = Lcg::new(self.seed);
        let mut data = Vec::with_capacity(m * per_row);
        let mut indices = Vec::with_capacity(m * per_row);
        let mut indptr = Vec::with_capacity(m + 1);
        indptr.push(0);
        for _ in 0..m {
            for _ in 0..per_row {
                indices.push((rng.next_u64() as usize) % kd_total);
                data.push(rng.next_complex());
            }
            indptr.push(data.len());
        }
        let p = CsrMatrix::from_components(Shape2D::new(m, kd_total), data, indices, indptr)?;
        let sn = (0..nd_total).map(|_| 0.5 + rng.next_f64()).collect();
        Ok(InterpolatorOutput {
            p,
            sn,
            nd: nd.to_vec(),
            kd: kd.to_vec(),
            m,
        })
    }
}

pub fn random_samples(rng: &mut Lcg, m: usize, ndims: usize) -> SamplePoints<f64> {
    let coords = (0..m * ndims)
        .map(|_| (rng.next_f64() - 0.5) * TAU)
        .collect();
    SamplePoints::from_flat(coords, ndims).expect("generated coordinates are well-formed")
}

pub fn random_image(rng: &mut Lcg, len: usize) -> Vec<C64> {
    (0..len).map(|_| rng.next_complex()).collect()
}

pub fn build_operator(
    seed: u64,
    m: usize,
    nd: &[usize],
    kd: &[usize],
    jd: &[usize],
    batch: Option<usize>,
) -> Nufft64 {
    let mut rng = Lcg::new(seed ^ 0x9e37_79b9_7f4a_7c15);
    let samples = random_samples(&mut rng, m, nd.len());
    NufftOperator::plan(
        &SeededInterpolator { seed },
        &samples,
        nd,
        kd,
        jd,
        None,
        batch,
    )
    .expect("fixture geometry always plans")
}

/// `sum(conj(a[i]) * b[i])`.
pub fn inner(a: &[C64], b: &[C64]) -> C64 {
    a.iter()
        .zip(b)
        .fold(Complex::new(0.0, 0.0), |acc, (x, y)| acc + x.conj() * y)
}

pub fn l2_norm(a: &[C64]) -> f64 {
    a.iter().map(|v| v.norm_sqr()).sum::<f64>().sqrt()
}

/// Relative to the larger operand norm; zero when both are zero.
pub fn rel_error(actual: &[C64], expected: &[C64]) -> f64 {
    assert_eq!(actual.len(), expected.len());
    let diff: f64 = actual
        .iter()
        .zip(expected)
        .map(|(x, y)| (x - y).norm_sqr())
        .sum::<f64>()
        .sqrt();
    let scale = l2_norm(actual).max(l2_norm(expected));
    if scale == 0.0 {
        diff
    } else {
        diff / scale
    }
}
