mod student_t;

pub use student_t::{DEFAULT_INVERSE_CUMULATIVE_ACCURACY, StudentT};
