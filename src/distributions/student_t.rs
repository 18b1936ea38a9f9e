use crate::error::StatsError;
use crate::numeric::regularized_beta;
use libm::lgamma;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Default absolute accuracy of the inverse-CDF bisection.
pub const DEFAULT_INVERSE_CUMULATIVE_ACCURACY: f64 = 1e-9;

/// Student's t-distribution with `degrees_of_freedom > 0`.
///
/// Parameters are immutable after construction. The cumulative
/// probability is computed through the regularized incomplete beta
/// function; the inverse goes through a bracketing bisection solved to
/// the configured accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudentT {
    degrees_of_freedom: f64,
    solver_accuracy: f64,
}

impl StudentT {
    /// Builds the distribution with the default inverse-CDF accuracy.
    pub fn new(degrees_of_freedom: f64) -> Result<Self, StatsError> {
        Self::with_accuracy(degrees_of_freedom, DEFAULT_INVERSE_CUMULATIVE_ACCURACY)
    }

    /// Builds the distribution with an explicit inverse-CDF accuracy.
    pub fn with_accuracy(
        degrees_of_freedom: f64,
        inverse_cumulative_accuracy: f64,
    ) -> Result<Self, StatsError> {
        if !degrees_of_freedom.is_finite() || degrees_of_freedom <= 0.0 {
            return Err(StatsError::Domain(format!(
                "degrees of freedom must be positive, got {degrees_of_freedom}"
            )));
        }
        Ok(Self {
            degrees_of_freedom,
            solver_accuracy: inverse_cumulative_accuracy,
        })
    }

    #[inline]
    pub fn degrees_of_freedom(&self) -> f64 {
        self.degrees_of_freedom
    }

    #[inline]
    pub fn solver_accuracy(&self) -> f64 {
        self.solver_accuracy
    }

    /// Log of the density at `x`, assembled from log-gamma terms so
    /// extreme `x` or large degrees of freedom neither underflow nor
    /// overflow the intermediate gamma ratio.
    pub fn log_density(&self, x: f64) -> f64 {
        let v = self.degrees_of_freedom;
        let half_v_plus_one = (v + 1.0) / 2.0;
        lgamma(half_v_plus_one) - lgamma(v / 2.0)
            - 0.5 * (v * PI).ln()
            - half_v_plus_one * (1.0 + x * x / v).ln()
    }

    /// Density of the distribution at `x`.
    pub fn density(&self, x: f64) -> f64 {
        self.log_density(x).exp()
    }

    /// `P(T <= x)`.
    ///
    /// Exactly `0.5` at `x == 0` by symmetry; elsewhere computed as
    /// `1 - I_t(v/2, 1/2)/2` for positive `x` (and the mirror for
    /// negative `x`) with `t = v/(v + x^2)`.
    pub fn cumulative_probability(&self, x: f64) -> Result<f64, StatsError> {
        if x == 0.0 {
            return Ok(0.5);
        }
        let v = self.degrees_of_freedom;
        let t = v / (v + x * x);
        let beta = regularized_beta(t, v / 2.0, 0.5)?;
        if x > 0.0 {
            Ok(1.0 - 0.5 * beta)
        } else {
            Ok(0.5 * beta)
        }
    }

    /// Inverse of [`cumulative_probability`], solved by bisection to the
    /// configured accuracy.
    ///
    /// `p == 0` and `p == 1` map to the infinite support bounds.
    ///
    /// [`cumulative_probability`]: StudentT::cumulative_probability
    pub fn inverse_cumulative_probability(&self, p: f64) -> Result<f64, StatsError> {
        if p.is_nan() || !(0.0..=1.0).contains(&p) {
            return Err(StatsError::Domain(format!(
                "probability must lie in [0, 1], got {p}"
            )));
        }
        if p == 0.0 {
            return Ok(f64::NEG_INFINITY);
        }
        if p == 1.0 {
            return Ok(f64::INFINITY);
        }
        if p == 0.5 {
            return Ok(0.0);
        }

        // Bracket the quantile by doubling outward from the center.
        let mut lo = -1.0;
        while self.cumulative_probability(lo)? > p {
            lo *= 2.0;
        }
        let mut hi = 1.0;
        while self.cumulative_probability(hi)? < p {
            hi *= 2.0;
        }

        while hi - lo > self.solver_accuracy {
            let mid = 0.5 * (lo + hi);
            if self.cumulative_probability(mid)? < p {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Ok(0.5 * (lo + hi))
    }

    /// Mean of the distribution: `0` when `v > 1`, undefined otherwise.
    pub fn mean(&self) -> Result<f64, StatsError> {
        if self.degrees_of_freedom > 1.0 {
            Ok(0.0)
        } else {
            Err(StatsError::UndefinedMoment {
                degrees_of_freedom: self.degrees_of_freedom,
            })
        }
    }

    /// Variance: `v/(v-2)` when `v > 2`, infinite when `1 < v <= 2`,
    /// undefined otherwise.
    pub fn variance(&self) -> Result<f64, StatsError> {
        let v = self.degrees_of_freedom;
        if v > 2.0 {
            Ok(v / (v - 2.0))
        } else if v > 1.0 {
            Ok(f64::INFINITY)
        } else {
            Err(StatsError::UndefinedMoment {
                degrees_of_freedom: v,
            })
        }
    }

    #[inline]
    pub fn support_lower_bound(&self) -> f64 {
        f64::NEG_INFINITY
    }

    #[inline]
    pub fn support_upper_bound(&self) -> f64 {
        f64::INFINITY
    }

    #[inline]
    pub fn is_support_lower_bound_inclusive(&self) -> bool {
        false
    }

    #[inline]
    pub fn is_support_upper_bound_inclusive(&self) -> bool {
        false
    }

    #[inline]
    pub fn is_support_connected(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPS: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn rejects_nonpositive_degrees_of_freedom() {
        assert!(matches!(StudentT::new(0.0), Err(StatsError::Domain(_))));
        assert!(matches!(StudentT::new(-3.0), Err(StatsError::Domain(_))));
        assert!(matches!(
            StudentT::new(f64::NAN),
            Err(StatsError::Domain(_))
        ));
    }

    #[test]
    fn cdf_at_zero_is_exactly_half() {
        for &v in &[0.5, 1.0, 2.0, 10.0, 100.0] {
            let t = StudentT::new(v).unwrap();
            assert_eq!(t.cumulative_probability(0.0).unwrap(), 0.5);
        }
    }

    #[test]
    fn cdf_matches_cauchy_closed_form() {
        // v = 1 is the Cauchy distribution: F(x) = 1/2 + atan(x)/pi.
        let t = StudentT::new(1.0).unwrap();
        for &x in &[-3.0f64, -1.0, 0.5, 1.0, 4.0] {
            let expected = 0.5 + x.atan() / PI;
            assert!(approx_eq(t.cumulative_probability(x).unwrap(), expected, EPS));
        }
    }

    #[test]
    fn cdf_matches_two_degrees_closed_form() {
        // v = 2: F(x) = 1/2 + x / (2 sqrt(2 + x^2)).
        let t = StudentT::new(2.0).unwrap();
        for &x in &[-2.0f64, -0.5, 1.0, 3.0] {
            let expected = 0.5 + x / (2.0 * (2.0 + x * x).sqrt());
            assert!(approx_eq(t.cumulative_probability(x).unwrap(), expected, EPS));
        }
    }

    #[test]
    fn cdf_is_symmetric_and_increasing() {
        let t = StudentT::new(7.0).unwrap();
        let mut prev = 0.0;
        for i in 1..=40 {
            let x = -4.0 + 0.2 * i as f64;
            let p = t.cumulative_probability(x).unwrap();
            let q = t.cumulative_probability(-x).unwrap();
            assert!(approx_eq(p + q, 1.0, EPS));
            assert!(p > prev);
            prev = p;
        }
    }

    #[test]
    fn density_matches_cauchy_at_zero() {
        let t = StudentT::new(1.0).unwrap();
        assert!(approx_eq(t.density(0.0), 1.0 / PI, EPS));
    }

    #[test]
    fn log_density_consistent_with_density() {
        let t = StudentT::new(5.0).unwrap();
        for &x in &[-2.5, 0.0, 0.7, 3.0] {
            assert!(approx_eq(t.log_density(x), t.density(x).ln(), EPS));
        }
    }

    #[test]
    fn log_density_finite_for_extreme_arguments() {
        let t = StudentT::new(4.0).unwrap();
        let ld = t.log_density(1e8);
        assert!(ld.is_finite());
        // the density is tiny but still representable here
        let d = t.density(1e8);
        assert!(d > 0.0 && d < 1e-30);
        // far enough out, exp of the log-density does underflow while
        // the log form stays finite
        assert!(t.log_density(1e70).is_finite());
        assert_eq!(t.density(1e70), 0.0);
    }

    #[test]
    fn inverse_cdf_reproduces_table_values() {
        // t_{0.975} critical values from standard tables.
        let cases = [(1.0, 12.706204736), (5.0, 2.5705818366), (10.0, 2.2281388520)];
        for &(v, expected) in &cases {
            let t = StudentT::new(v).unwrap();
            let q = t.inverse_cumulative_probability(0.975).unwrap();
            assert!(approx_eq(q, expected, 1e-6));
        }
    }

    #[test]
    fn inverse_cdf_round_trip() {
        let t = StudentT::new(7.0).unwrap();
        for &x in &[-2.0, -0.3, 0.8, 1.5] {
            let p = t.cumulative_probability(x).unwrap();
            let back = t.inverse_cumulative_probability(p).unwrap();
            assert!(approx_eq(back, x, 1e-6));
        }
    }

    #[test]
    fn inverse_cdf_edges() {
        let t = StudentT::new(3.0).unwrap();
        assert_eq!(
            t.inverse_cumulative_probability(0.0).unwrap(),
            f64::NEG_INFINITY
        );
        assert_eq!(t.inverse_cumulative_probability(1.0).unwrap(), f64::INFINITY);
        assert_eq!(t.inverse_cumulative_probability(0.5).unwrap(), 0.0);
        assert!(matches!(
            t.inverse_cumulative_probability(1.5),
            Err(StatsError::Domain(_))
        ));
    }

    #[test]
    fn moments_follow_degrees_of_freedom() {
        assert_eq!(StudentT::new(10.0).unwrap().mean().unwrap(), 0.0);
        assert!(matches!(
            StudentT::new(1.0).unwrap().mean(),
            Err(StatsError::UndefinedMoment { .. })
        ));

        assert!(approx_eq(
            StudentT::new(10.0).unwrap().variance().unwrap(),
            1.25,
            EPS
        ));
        assert_eq!(
            StudentT::new(1.5).unwrap().variance().unwrap(),
            f64::INFINITY
        );
        assert!(matches!(
            StudentT::new(0.5).unwrap().variance(),
            Err(StatsError::UndefinedMoment { .. })
        ));
    }

    #[test]
    fn support_is_the_open_real_line() {
        let t = StudentT::new(2.0).unwrap();
        assert_eq!(t.support_lower_bound(), f64::NEG_INFINITY);
        assert_eq!(t.support_upper_bound(), f64::INFINITY);
        assert!(!t.is_support_lower_bound_inclusive());
        assert!(!t.is_support_upper_bound_inclusive());
        assert!(t.is_support_connected());
    }
}
