use crate::distributions::StudentT;
use crate::error::StatsError;
use serde::{Deserialize, Serialize};

/// Degenerate-denominator guard for slope and R-square queries.
const SINGULAR_THRESHOLD: f64 = 10.0 * f64::MIN_POSITIVE;

/// Incremental ordinary-least-squares regression of `y` on a single
/// predictor `x`.
///
/// Only sufficient statistics are retained: `n`, the raw sums, the
/// running means of both variables, and the three second-moment
/// accumulators. Observations can be added, removed and merged in;
/// every derived quantity (slope, intercept, error terms, confidence
/// interval, significance) is computed from the accumulators on demand.
///
/// The model moves through three states as observations arrive: empty
/// (`n == 0`), underdetermined (`n == 1`) and fitted (`n >= 2`).
/// Slope and intercept queries in the first two states return
/// [`StatsError::InsufficientData`]; inference queries additionally
/// need `n >= 3` so that `n - 2` degrees of freedom remain.
///
/// Instances are single-writer: share one across threads only behind an
/// external lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleRegression {
    n: u64,
    sum_x: f64,
    sum_y: f64,
    /// Second moment of x: centered (`sum (x - x_bar)^2`) when the
    /// model has an intercept, raw (`sum x^2`) otherwise.
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
    x_bar: f64,
    y_bar: f64,
    has_intercept: bool,
}

impl SimpleRegression {
    /// A model estimated with a constant term.
    pub fn new() -> Self {
        SimpleRegression {
            n: 0,
            sum_x: 0.0,
            sum_y: 0.0,
            sum_xx: 0.0,
            sum_yy: 0.0,
            sum_xy: 0.0,
            x_bar: 0.0,
            y_bar: 0.0,
            has_intercept: true,
        }
    }

    /// A model forced through the origin: the intercept is fixed at
    /// zero and the sufficient statistics accumulate raw products
    /// instead of centered ones. The flag is fixed for the lifetime of
    /// the instance.
    pub fn without_intercept() -> Self {
        SimpleRegression {
            has_intercept: false,
            ..Self::new()
        }
    }

    #[inline]
    pub fn has_intercept(&self) -> bool {
        self.has_intercept
    }

    #[inline]
    pub fn n_observations(&self) -> u64 {
        self.n
    }

    /// Adds the observation `(x, y)`.
    ///
    /// The centered accumulators are updated with deltas taken against
    /// the means *before* this observation; the means move afterwards.
    /// Reversing that order corrupts the cross-product term.
    pub fn add_observation(&mut self, x: f64, y: f64) {
        if self.n == 0 {
            self.x_bar = x;
            self.y_bar = y;
        } else if self.has_intercept {
            let fact1 = 1.0 + self.n as f64;
            let fact2 = self.n as f64 / fact1;
            let dx = x - self.x_bar;
            let dy = y - self.y_bar;
            self.sum_xx += dx * dx * fact2;
            self.sum_yy += dy * dy * fact2;
            self.sum_xy += dx * dy * fact2;
            self.x_bar += dx / fact1;
            self.y_bar += dy / fact1;
        }
        if !self.has_intercept {
            self.sum_xx += x * x;
            self.sum_yy += y * y;
            self.sum_xy += x * y;
        }
        self.sum_x += x;
        self.sum_y += y;
        self.n += 1;
    }

    pub fn add_observations(&mut self, observations: &[(f64, f64)]) {
        for &(x, y) in observations {
            self.add_observation(x, y);
        }
    }

    /// Removes the observation `(x, y)`, the exact algebraic inverse of
    /// [`add_observation`].
    ///
    /// No record of individual pairs is kept: removing a pair that was
    /// never added silently corrupts the accumulators. That contract is
    /// the caller's to uphold. Removing the last remaining observation
    /// resets the model to its empty state.
    ///
    /// [`add_observation`]: SimpleRegression::add_observation
    pub fn remove_observation(&mut self, x: f64, y: f64) -> Result<(), StatsError> {
        if self.n == 0 {
            return Err(StatsError::InsufficientData("no observations to remove"));
        }
        if self.n == 1 {
            self.clear();
            return Ok(());
        }
        if self.has_intercept {
            let fact1 = self.n as f64 - 1.0;
            let fact2 = self.n as f64 / fact1;
            let dx = x - self.x_bar;
            let dy = y - self.y_bar;
            self.sum_xx -= dx * dx * fact2;
            self.sum_yy -= dy * dy * fact2;
            self.sum_xy -= dx * dy * fact2;
            self.x_bar -= dx / fact1;
            self.y_bar -= dy / fact1;
        } else {
            self.sum_xx -= x * x;
            self.sum_yy -= y * y;
            self.sum_xy -= x * y;
        }
        self.sum_x -= x;
        self.sum_y -= y;
        self.n -= 1;
        Ok(())
    }

    /// Merges another model's sufficient statistics into this one.
    ///
    /// Uses the parallel-combination formula: means are combined
    /// weighted by counts and the second moments pick up a correction
    /// term for the mean difference. Summing raw centered accumulators
    /// would double-count the centering error. Both models are assumed
    /// to share the same intercept configuration.
    pub fn append(&mut self, other: &SimpleRegression) {
        if other.n == 0 {
            return;
        }
        if self.n == 0 {
            self.x_bar = other.x_bar;
            self.y_bar = other.y_bar;
            self.sum_xx = other.sum_xx;
            self.sum_yy = other.sum_yy;
            self.sum_xy = other.sum_xy;
        } else if self.has_intercept {
            let combined = (self.n + other.n) as f64;
            let fact1 = other.n as f64 / combined;
            let fact2 = self.n as f64 * other.n as f64 / combined;
            let dx = other.x_bar - self.x_bar;
            let dy = other.y_bar - self.y_bar;
            self.sum_xx += other.sum_xx + dx * dx * fact2;
            self.sum_yy += other.sum_yy + dy * dy * fact2;
            self.sum_xy += other.sum_xy + dx * dy * fact2;
            self.x_bar += dx * fact1;
            self.y_bar += dy * fact1;
        } else {
            self.sum_xx += other.sum_xx;
            self.sum_yy += other.sum_yy;
            self.sum_xy += other.sum_xy;
        }
        self.sum_x += other.sum_x;
        self.sum_y += other.sum_y;
        self.n += other.n;
    }

    /// Resets to the empty state, keeping the intercept configuration.
    pub fn clear(&mut self) {
        *self = SimpleRegression {
            has_intercept: self.has_intercept,
            ..Self::new()
        };
    }

    fn require_fitted(&self) -> Result<(), StatsError> {
        if self.n < 2 {
            return Err(StatsError::InsufficientData(
                "regression requires at least two observations",
            ));
        }
        Ok(())
    }

    fn require_error_degrees(&self) -> Result<(), StatsError> {
        if self.n < 3 {
            return Err(StatsError::InsufficientData(
                "error statistics require at least three observations",
            ));
        }
        Ok(())
    }

    /// Estimated slope `sum_xy / sum_xx`.
    pub fn slope(&self) -> Result<f64, StatsError> {
        self.require_fitted()?;
        if self.sum_xx.abs() < SINGULAR_THRESHOLD {
            return Err(StatsError::SingularRegression(
                "all x values are identical",
            ));
        }
        Ok(self.sum_xy / self.sum_xx)
    }

    /// Estimated intercept, exactly zero for a model built with
    /// [`without_intercept`].
    ///
    /// [`without_intercept`]: SimpleRegression::without_intercept
    pub fn intercept(&self) -> Result<f64, StatsError> {
        self.require_fitted()?;
        if !self.has_intercept {
            return Ok(0.0);
        }
        let slope = self.slope()?;
        Ok((self.sum_y - slope * self.sum_x) / self.n as f64)
    }

    /// `intercept + slope * x`.
    pub fn predict(&self, x: f64) -> Result<f64, StatsError> {
        Ok(self.intercept()? + self.slope()? * x)
    }

    /// Sum of squared residuals, floored at zero against rounding.
    pub fn sum_squared_errors(&self) -> Result<f64, StatsError> {
        let slope = self.slope()?;
        Ok((self.sum_yy - slope * self.sum_xy).max(0.0))
    }

    /// Total sum of squares of `y` around its mean (raw in no-intercept
    /// mode).
    pub fn total_sum_squares(&self) -> Result<f64, StatsError> {
        self.require_fitted()?;
        Ok(self.sum_yy)
    }

    /// Second moment of `x` (centered, or raw without an intercept).
    pub fn x_sum_squares(&self) -> Result<f64, StatsError> {
        self.require_fitted()?;
        Ok(self.sum_xx)
    }

    #[inline]
    pub fn sum_of_cross_products(&self) -> f64 {
        self.sum_xy
    }

    /// Sum of squares attributed to the model, `slope^2 * sum_xx`.
    pub fn regression_sum_squares(&self) -> Result<f64, StatsError> {
        let slope = self.slope()?;
        Ok(slope * slope * self.sum_xx)
    }

    /// `SSE / (n - 2)`.
    pub fn mean_square_error(&self) -> Result<f64, StatsError> {
        self.require_error_degrees()?;
        Ok(self.sum_squared_errors()? / (self.n - 2) as f64)
    }

    /// Coefficient of determination `1 - SSE/TSS`.
    pub fn r_square(&self) -> Result<f64, StatsError> {
        self.require_fitted()?;
        if self.sum_yy.abs() < SINGULAR_THRESHOLD {
            return Err(StatsError::SingularRegression(
                "total sum of squares is zero",
            ));
        }
        Ok(1.0 - self.sum_squared_errors()? / self.sum_yy)
    }

    /// Pearson correlation: `sqrt(r_square)` carrying the slope's sign.
    pub fn r(&self) -> Result<f64, StatsError> {
        let slope = self.slope()?;
        let r = self.r_square()?.sqrt();
        Ok(if slope < 0.0 { -r } else { r })
    }

    /// Standard error of the slope estimate.
    pub fn slope_std_err(&self) -> Result<f64, StatsError> {
        Ok((self.mean_square_error()? / self.sum_xx).sqrt())
    }

    /// Standard error of the intercept estimate. Only defined for
    /// models with an intercept.
    pub fn intercept_std_err(&self) -> Result<f64, StatsError> {
        if !self.has_intercept {
            return Err(StatsError::Domain(
                "model was built without an intercept".into(),
            ));
        }
        let mse = self.mean_square_error()?;
        Ok((mse * (1.0 / self.n as f64 + self.x_bar * self.x_bar / self.sum_xx)).sqrt())
    }

    /// Half-width of the 95% confidence interval for the slope.
    pub fn slope_confidence_interval(&self) -> Result<f64, StatsError> {
        self.slope_confidence_interval_with(0.05)
    }

    /// Half-width of the `100(1 - alpha)%` confidence interval for the
    /// slope: `t_{1 - alpha/2, n-2} * slope_std_err`.
    pub fn slope_confidence_interval_with(&self, alpha: f64) -> Result<f64, StatsError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(StatsError::Domain(format!(
                "significance level must lie in (0, 1), got {alpha}"
            )));
        }
        self.require_error_degrees()?;
        let distribution = StudentT::new((self.n - 2) as f64)?;
        let critical = distribution.inverse_cumulative_probability(1.0 - alpha / 2.0)?;
        Ok(critical * self.slope_std_err()?)
    }

    /// Two-tailed p-value of the slope against the null hypothesis that
    /// it is zero: `2 * (1 - P(T <= |slope| / slope_std_err))` at
    /// `n - 2` degrees of freedom.
    pub fn significance(&self) -> Result<f64, StatsError> {
        self.require_error_degrees()?;
        let t_statistic = self.slope()?.abs() / self.slope_std_err()?;
        let distribution = StudentT::new((self.n - 2) as f64)?;
        Ok(2.0 * (1.0 - distribution.cumulative_probability(t_statistic)?))
    }
}

impl Default for SimpleRegression {
    fn default() -> Self {
        Self::new()
    }
}
