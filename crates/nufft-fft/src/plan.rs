use std::fmt;
use std::sync::Arc;

use rustfft::{Fft, FftDirection, FftNum, FftPlanner};

/// Cached FFT kernels, one forward/inverse pair per distinct transform-axis
/// length of the oversampled grid.
///
/// Built once at plan time and shared read-only by any number of concurrent
/// transform calls; scratch buffers are sized and owned by each caller, so no
/// interior locking is needed.
#[derive(Clone)]
pub struct AxisPlans<T: FftNum> {
    entries: Vec<AxisPlanEntry<T>>,
}

#[derive(Clone)]
struct AxisPlanEntry<T: FftNum> {
    len: usize,
    forward: Arc<dyn Fft<T>>,
    inverse: Arc<dyn Fft<T>>,
}

impl<T: FftNum> AxisPlans<T> {
    /// Plan kernels for every distinct length among `shape[axis]` for the
    /// configured transform axes. Out-of-range axes are skipped here; the
    /// transform layer rejects them with a proper error.
    #[must_use]
    pub fn for_geometry(shape: &[usize], ft_axes: &[usize]) -> Self {
        let mut planner = FftPlanner::new();
        let mut entries: Vec<AxisPlanEntry<T>> = Vec::new();
        for &axis in ft_axes {
            let Some(&len) = shape.get(axis) else {
                continue;
            };
            if len == 0 || entries.iter().any(|entry| entry.len == len) {
                continue;
            }
            entries.push(AxisPlanEntry {
                len,
                forward: planner.plan_fft(len, FftDirection::Forward),
                inverse: planner.plan_fft(len, FftDirection::Inverse),
            });
        }
        Self { entries }
    }

    #[must_use]
    pub fn forward(&self, len: usize) -> Option<&Arc<dyn Fft<T>>> {
        self.entries
            .iter()
            .find(|entry| entry.len == len)
            .map(|entry| &entry.forward)
    }

    #[must_use]
    pub fn inverse(&self, len: usize) -> Option<&Arc<dyn Fft<T>>> {
        self.entries
            .iter()
            .find(|entry| entry.len == len)
            .map(|entry| &entry.inverse)
    }

    #[must_use]
    pub fn planned_lengths(&self) -> Vec<usize> {
        self.entries.iter().map(|entry| entry.len).collect()
    }
}

impl<T: FftNum> fmt::Debug for AxisPlans<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxisPlans")
            .field("planned_lengths", &self.planned_lengths())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::AxisPlans;

    #[test]
    fn deduplicates_repeated_axis_lengths() {
        let plans = AxisPlans::<f64>::for_geometry(&[32, 32, 16], &[0, 1, 2]);
        assert_eq!(plans.planned_lengths(), vec![32, 16]);
        assert!(plans.forward(32).is_some());
        assert!(plans.inverse(16).is_some());
        assert!(plans.forward(8).is_none());
    }

    #[test]
    fn skips_out_of_range_axes_and_zero_lengths() {
        let plans = AxisPlans::<f32>::for_geometry(&[8, 0], &[0, 1, 5]);
        assert_eq!(plans.planned_lengths(), vec![8]);
    }

    #[test]
    fn plans_only_configured_axes() {
        let plans = AxisPlans::<f64>::for_geometry(&[64, 48], &[1]);
        assert_eq!(plans.planned_lengths(), vec![48]);
        assert!(plans.forward(64).is_none());
    }
}
