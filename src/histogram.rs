//! Equal-width binning of per-vertex measurements.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BINS: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// A histogram of values. Every bin is half-open except the last, which also holds the maximum.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<Bin>,
}

impl Histogram {
    /// Bins `values` into `bins` equal-width bins spanning their range. NaNs are skipped.
    ///
    /// When every value is the same there's no range to split, so a single bin of width 1 is
    /// centred on the value instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use blackout::histogram::Histogram;
    ///
    /// let histogram = Histogram::new([0.0, 0.1, 0.5, 1.0], 2);
    ///
    /// assert_eq!(histogram.counts(), vec![2, 2]);
    /// assert_eq!(histogram.bins[1].start, 0.5);
    /// ```
    pub fn new(values: impl IntoIterator<Item = f64>, bins: usize) -> Self {
        let values: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        if values.is_empty() {
            return Self::default();
        }

        let bins = bins.max(1);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if min == max {
            return Self {
                bins: vec![Bin {
                    start: min - 0.5,
                    end: min + 0.5,
                    count: values.len(),
                }],
            };
        }

        let width = (max - min) / bins as f64;
        let mut histogram: Vec<Bin> = (0..bins)
            .map(|i| Bin {
                start: min + i as f64 * width,
                end: if i + 1 == bins {
                    max
                } else {
                    min + (i + 1) as f64 * width
                },
                count: 0,
            })
            .collect();

        for value in values {
            let i = (((value - min) / width).floor() as usize).min(bins - 1);
            histogram[i].count += 1;
        }

        Self { bins: histogram }
    }

    pub fn counts(&self) -> Vec<usize> {
        self.bins.iter().map(|bin| bin.count).collect()
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}
