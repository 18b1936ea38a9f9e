use thiserror::Error;

/// Errors surfaced by the accumulators and distribution routines.
///
/// Every fallible query returns one of these synchronously; nothing is
/// silently defaulted to zero, since a zeroed statistic would corrupt
/// downstream significance calculations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("argument out of domain: {0}")]
    Domain(String),

    #[error("insufficient data: {0}")]
    InsufficientData(&'static str),

    #[error("regression is singular: {0}")]
    SingularRegression(&'static str),

    #[error("continued fraction did not converge within {max_iterations} iterations")]
    ConvergenceFailure { max_iterations: usize },

    #[error("moment is undefined for {degrees_of_freedom} degrees of freedom")]
    UndefinedMoment { degrees_of_freedom: f64 },
}
