mod simple;

pub use simple::SimpleRegression;
