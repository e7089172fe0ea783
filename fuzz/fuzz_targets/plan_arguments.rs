#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nufft_core::{NearestNeighborInterpolator, NufftOperator, SamplePoints};

#[derive(Debug, Arbitrary)]
struct PlanInput {
    ndims: u8,
    nd: Vec<u8>,
    kd: Vec<u8>,
    jd: Vec<u8>,
    coords: Vec<f32>,
    batch: Option<u8>,
    ft_axes: Option<Vec<u8>>,
}

fn clamp_dims(raw: &[u8], ndims: usize, cap: usize) -> Vec<usize> {
    (0..ndims)
        .map(|axis| usize::from(raw.get(axis).copied().unwrap_or(1)) % cap)
        .collect()
}

fuzz_target!(|input: PlanInput| {
    // keep grids small so planner failures, not allocation, dominate
    let ndims = usize::from(input.ndims % 4);
    let nd = clamp_dims(&input.nd, ndims, 9);
    let kd = clamp_dims(&input.kd, ndims, 17);
    let jd = clamp_dims(&input.jd, ndims, 5);

    let coords: Vec<f32> = input.coords.iter().copied().take(64).collect();
    let Ok(samples) = SamplePoints::from_flat(coords, ndims.max(1)) else {
        return;
    };

    let batch = input.batch.map(|b| usize::from(b % 5));
    let ft_axes: Option<Vec<usize>> = input
        .ft_axes
        .map(|axes| axes.iter().map(|&a| usize::from(a % 6)).collect());

    let _ = NufftOperator::<f32>::plan(
        &NearestNeighborInterpolator,
        &samples,
        &nd,
        &kd,
        &jd,
        ft_axes.as_deref(),
        batch,
    );
});
