//! Domain layer - validator registry and selection.

pub mod engine;
pub mod validator;

pub use engine::*;
pub use validator::*;
