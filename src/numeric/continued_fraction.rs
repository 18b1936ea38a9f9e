use crate::error::StatsError;

/// Floor applied to near-zero denominators so a single vanishing term
/// cannot blow up the ratio chains with a division by zero.
const TINY: f64 = 1e-50;

/// A continued fraction `b0 + a1/(b1 + a2/(b2 + ...))` defined by its
/// coefficient functions.
///
/// Implementors supply the numerator coefficients [`a`] (queried for
/// `n >= 1`) and the denominator coefficients [`b`] (queried for
/// `n >= 0`); [`evaluate`] runs the modified Lentz algorithm over them.
///
/// [`a`]: ContinuedFraction::a
/// [`b`]: ContinuedFraction::b
/// [`evaluate`]: ContinuedFraction::evaluate
pub trait ContinuedFraction {
    /// Numerator coefficient `a_n` at the evaluation point `x`.
    fn a(&self, n: usize, x: f64) -> f64;

    /// Denominator coefficient `b_n` at the evaluation point `x`.
    fn b(&self, n: usize, x: f64) -> f64;

    /// Evaluates the fraction at `x` to a relative precision of
    /// `epsilon`.
    ///
    /// Iteration stops once successive convergents agree to within
    /// `epsilon`. Returns [`StatsError::ConvergenceFailure`] if the cap
    /// of `max_iterations` is reached first, or if the running value
    /// turns non-finite (a diverging fraction).
    fn evaluate(&self, x: f64, epsilon: f64, max_iterations: usize) -> Result<f64, StatsError> {
        let mut h_prev = self.b(0, x);
        if h_prev.abs() < TINY {
            h_prev = TINY;
        }

        let mut d_prev = 0.0;
        let mut c_prev = h_prev;

        for n in 1..=max_iterations {
            let a_n = self.a(n, x);
            let b_n = self.b(n, x);

            let mut d_n = b_n + a_n * d_prev;
            if d_n.abs() < TINY {
                d_n = TINY;
            }
            let mut c_n = b_n + a_n / c_prev;
            if c_n.abs() < TINY {
                c_n = TINY;
            }
            d_n = 1.0 / d_n;

            let delta = c_n * d_n;
            let h_n = h_prev * delta;

            if !h_n.is_finite() {
                return Err(StatsError::ConvergenceFailure { max_iterations: n });
            }
            if (delta - 1.0).abs() < epsilon {
                return Ok(h_n);
            }

            d_prev = d_n;
            c_prev = c_n;
            h_prev = h_n;
        }

        Err(StatsError::ConvergenceFailure { max_iterations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPS: f64 = 1e-10;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    /// All-ones fraction: converges to the golden ratio.
    struct GoldenRatio;

    impl ContinuedFraction for GoldenRatio {
        fn a(&self, _n: usize, _x: f64) -> f64 {
            1.0
        }

        fn b(&self, _n: usize, _x: f64) -> f64 {
            1.0
        }
    }

    #[test]
    fn all_ones_fraction_converges_to_golden_ratio() {
        let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
        let value = GoldenRatio.evaluate(0.0, 1e-12, 200).unwrap();
        assert!(approx_eq(value, phi, EPS));
    }

    #[test]
    fn iteration_cap_fires() {
        let err = GoldenRatio.evaluate(0.0, 1e-12, 1).unwrap_err();
        assert_eq!(err, StatsError::ConvergenceFailure { max_iterations: 1 });
    }

    #[test]
    fn near_zero_denominators_do_not_produce_nan() {
        struct ZeroB0;
        impl ContinuedFraction for ZeroB0 {
            fn a(&self, _n: usize, _x: f64) -> f64 {
                1.0
            }
            fn b(&self, n: usize, _x: f64) -> f64 {
                if n == 0 { 0.0 } else { 2.0 }
            }
        }
        // b0 = 0, rest 2: value is 0 + 1/(2 + 1/(2 + ...)) = sqrt(2) - 1.
        let value = ZeroB0.evaluate(0.0, 1e-12, 200).unwrap();
        assert!(value.is_finite());
        assert!(approx_eq(value, 2.0_f64.sqrt() - 1.0, EPS));
    }
}
