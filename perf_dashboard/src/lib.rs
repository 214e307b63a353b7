pub mod chart;
pub mod cli;
pub mod columns;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod defaults;
pub mod errors;
pub mod filter;
pub mod formatter;
pub mod import;
pub mod render;
pub mod report;
pub mod sorting;
pub mod table;
pub mod template;
pub mod thresholds;

// Sample datasets shared by unit tests, integration tests and benchmarks
#[doc(hidden)]
#[cfg(any(test, doctest, feature = "test-helpers"))]
pub mod test_helpers;
