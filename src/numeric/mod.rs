mod beta;
mod continued_fraction;

pub use beta::{
    DEFAULT_EPSILON, DEFAULT_MAX_ITERATIONS, ln_beta, regularized_beta, regularized_beta_with,
};
pub use continued_fraction::ContinuedFraction;
