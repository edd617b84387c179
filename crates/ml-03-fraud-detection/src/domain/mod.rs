//! Domain layer - fraud checks and their verdicts.

pub mod config;
pub mod detector;
pub mod verdict;

pub use config::*;
pub use detector::*;
pub use verdict::*;
