mod descriptive;

pub use descriptive::DescriptiveStatistics;
