#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nufft_core::{NearestNeighborInterpolator, NufftOperator, SamplePoints};
use num_complex::Complex;

#[derive(Debug, Arbitrary)]
struct RoundtripInput {
    ndims: u8,
    nd: Vec<u8>,
    coords: Vec<f32>,
    image: Vec<(f32, f32)>,
    batch: u8,
}

fuzz_target!(|input: RoundtripInput| {
    let ndims = usize::from(input.ndims % 3) + 1;
    // valid-by-construction geometry so the transforms themselves run
    let nd: Vec<usize> = (0..ndims)
        .map(|axis| usize::from(input.nd.get(axis).copied().unwrap_or(2) % 7) + 1)
        .collect();
    let kd: Vec<usize> = nd.iter().map(|&n| n * 2).collect();
    let jd = vec![2usize; ndims];
    let batch = usize::from(input.batch % 4) + 1;

    let mut coords: Vec<f32> = input
        .coords
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .take(32 * ndims)
        .collect();
    coords.truncate(coords.len() / ndims * ndims);
    let Ok(samples) = SamplePoints::from_flat(coords, ndims) else {
        return;
    };

    let Ok(operator) = NufftOperator::<f32>::plan(
        &NearestNeighborInterpolator,
        &samples,
        &nd,
        &kd,
        &jd,
        None,
        Some(batch),
    ) else {
        return;
    };

    let len = operator.nd_total() * batch;
    let mut image: Vec<Complex<f32>> = input
        .image
        .iter()
        .map(|&(re, im)| Complex::new(re, im))
        .take(len)
        .collect();
    image.resize(len, Complex::new(0.0, 0.0));

    if let Ok(observed) = operator.forward(&image) {
        let _ = operator.adjoint(&observed);
        let _ = operator.selfadjoint(&image);
    }
});
