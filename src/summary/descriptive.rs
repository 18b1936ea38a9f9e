use crate::error::StatsError;
use serde::{Deserialize, Serialize};

/// Streaming descriptive statistics over a retained sample.
///
/// Count, min, max, mean and the centered sum of squares are maintained
/// in O(1) per added value (Welford's update); order statistics sort a
/// copy of the retained sample on demand. `mean`, `min` and `max`
/// report `NaN` while the sample is empty.
///
/// Instances are single-writer: share one across threads only behind an
/// external lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptiveStatistics {
    values: Vec<f64>,
    min: f64,
    max: f64,
    min_idx: usize,
    max_idx: usize,
    mean: f64,
    /// Centered sum of squares (Welford's M2), not a raw sum of
    /// squares: `sum_sq - n*mean^2` cancels catastrophically for
    /// large-magnitude, low-variance data.
    m2: f64,
}

impl DescriptiveStatistics {
    pub fn new() -> Self {
        DescriptiveStatistics {
            values: Vec::new(),
            min: f64::NAN,
            max: f64::NAN,
            min_idx: 0,
            max_idx: 0,
            mean: f64::NAN,
            m2: 0.0,
        }
    }

    pub fn from_values(values: &[f64]) -> Self {
        let mut stats = Self::new();
        stats.add_values(values);
        stats
    }

    /// Appends one observation and updates every running aggregate.
    pub fn add_value(&mut self, d: f64) {
        let idx = self.values.len();
        let count = idx + 1;
        if count == 1 {
            self.min = d;
            self.max = d;
            self.min_idx = 0;
            self.max_idx = 0;
            self.mean = d;
            self.m2 = 0.0;
        } else {
            if d < self.min {
                self.min = d;
                self.min_idx = idx;
            }
            if d > self.max {
                self.max = d;
                self.max_idx = idx;
            }
            let old_mean = self.mean;
            self.mean += (d - old_mean) / count as f64;
            self.m2 += (d - old_mean) * (d - self.mean);
        }
        self.values.push(d);
    }

    pub fn add_values(&mut self, values: &[f64]) {
        for &d in values {
            self.add_value(d);
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Insertion index of the smallest observation.
    #[inline]
    pub fn min_index(&self) -> usize {
        self.min_idx
    }

    /// Insertion index of the largest observation.
    #[inline]
    pub fn max_index(&self) -> usize {
        self.max_idx
    }

    #[inline]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Observations in insertion order.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// A sorted copy of the observations.
    pub fn sorted_values(&self) -> Vec<f64> {
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        sorted
    }

    /// Sample variance `M2/(n-1)`.
    pub fn variance(&self) -> Result<f64, StatsError> {
        if self.count() < 2 {
            return Err(StatsError::InsufficientData(
                "variance requires at least two observations",
            ));
        }
        Ok(self.m2 / (self.count() - 1) as f64)
    }

    /// Population variance `M2/n`.
    pub fn biased_variance(&self) -> Result<f64, StatsError> {
        if self.values.is_empty() {
            return Err(StatsError::InsufficientData(
                "variance requires at least one observation",
            ));
        }
        Ok(self.m2 / self.count() as f64)
    }

    pub fn standard_deviation(&self) -> Result<f64, StatsError> {
        Ok(self.variance()?.sqrt())
    }

    pub fn biased_standard_deviation(&self) -> Result<f64, StatsError> {
        Ok(self.biased_variance()?.sqrt())
    }

    /// Middle value of the sorted sample, i.e. `percentile(50)`.
    pub fn median(&self) -> Result<f64, StatsError> {
        self.percentile(50.0)
    }

    /// Largest observation at or below the `p`-th percentile rank
    /// (nearest rank below: index `floor(p/100 * n)`, clamped).
    pub fn percentile(&self, p: f64) -> Result<f64, StatsError> {
        if p.is_nan() || !(0.0..=100.0).contains(&p) {
            return Err(StatsError::Domain(format!(
                "percentile must lie in [0, 100], got {p}"
            )));
        }
        if self.values.is_empty() {
            return Err(StatsError::InsufficientData(
                "percentile requires at least one observation",
            ));
        }
        let n = self.count();
        let idx = ((p / 100.0 * n as f64).floor() as usize).min(n - 1);
        Ok(self.sorted_values()[idx])
    }

    /// Most frequent observation; ties go to the value that appeared
    /// first in insertion order.
    pub fn mode(&self) -> Result<f64, StatsError> {
        if self.values.is_empty() {
            return Err(StatsError::InsufficientData(
                "mode requires at least one observation",
            ));
        }
        let mut best = self.values[0];
        let mut best_count = 0usize;
        for (i, &v) in self.values.iter().enumerate() {
            if self.values[..i].iter().any(|&u| u == v) {
                continue;
            }
            let freq = self.values[i..].iter().filter(|&&u| u == v).count();
            if freq > best_count {
                best = v;
                best_count = freq;
            }
        }
        Ok(best)
    }

    /// `n / sum(1/x_i)`; every observation must be non-zero.
    pub fn harmonic_mean(&self) -> Result<f64, StatsError> {
        if self.values.is_empty() {
            return Err(StatsError::InsufficientData(
                "harmonic mean requires at least one observation",
            ));
        }
        let mut reciprocal_sum = 0.0;
        for &v in &self.values {
            if v == 0.0 {
                return Err(StatsError::Domain(
                    "harmonic mean is undefined for zero observations".into(),
                ));
            }
            reciprocal_sum += 1.0 / v;
        }
        Ok(self.count() as f64 / reciprocal_sum)
    }

    /// `exp(mean(ln x_i))`; every observation must be positive.
    pub fn geometric_mean(&self) -> Result<f64, StatsError> {
        if self.values.is_empty() {
            return Err(StatsError::InsufficientData(
                "geometric mean requires at least one observation",
            ));
        }
        let mut log_sum = 0.0;
        for &v in &self.values {
            if v <= 0.0 {
                return Err(StatsError::Domain(format!(
                    "geometric mean requires positive observations, got {v}"
                )));
            }
            log_sum += v.ln();
        }
        Ok((log_sum / self.count() as f64).exp())
    }

    /// Builds a new accumulator from the sorted sample with the lowest
    /// `low` fraction and highest `high` fraction of values dropped.
    /// The receiver is left untouched.
    pub fn discarding_outliers(&self, low: f64, high: f64) -> Result<Self, StatsError> {
        if !(0.0..1.0).contains(&low) || !(0.0..1.0).contains(&high) || low + high >= 1.0 {
            return Err(StatsError::Domain(format!(
                "outlier fractions must lie in [0, 1) and sum below 1, got low = {low}, high = {high}"
            )));
        }
        let n = self.count();
        let cut_low = (low * n as f64).floor() as usize;
        let cut_high = (high * n as f64).floor() as usize;
        let sorted = self.sorted_values();
        Ok(Self::from_values(&sorted[cut_low..n - cut_high]))
    }
}

impl Default for DescriptiveStatistics {
    fn default() -> Self {
        Self::new()
    }
}
