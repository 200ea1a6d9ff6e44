/// Nearest-rank percentile of an unordered sample set.
///
/// `rank` is a fraction in `(0, 1]`. Returns `0` for an empty set. Sorts a copy of `samples`;
/// use [`SortedSamples`] when several ranks are needed from the same set.
pub fn percentile(samples: &[u64], rank: f64) -> u64 {
    SortedSamples::new(samples.to_vec()).percentile(rank)
}

/// Latency samples in milliseconds, sorted once and queried many times.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortedSamples {
    samples: Vec<u64>,
}

impl SortedSamples {
    pub fn new(mut samples: Vec<u64>) -> Self {
        samples.sort_unstable();
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Value at `ceil(rank * len) - 1`, clamped to the sample range. No interpolation.
    pub fn percentile(&self, rank: f64) -> u64 {
        if self.samples.is_empty() {
            return 0;
        }
        let last = self.samples.len() - 1;
        let index = (rank * self.samples.len() as f64).ceil() - 1.;
        // NOTE: `as` saturates, so negative and NaN positions land on 0.
        let index = (index as usize).min(last);
        self.samples[index]
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.;
        }
        let sum: u128 = self.samples.iter().map(|&s| s as u128).sum();
        sum as f64 / self.samples.len() as f64
    }

    pub fn max(&self) -> u64 {
        self.samples.last().copied().unwrap_or(0)
    }
}
