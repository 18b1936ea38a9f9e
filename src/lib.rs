pub mod distributions;
pub mod error;
pub mod numeric;
pub mod regression;
pub mod summary;
