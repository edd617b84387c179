//! Domain layer - transaction entity and validation rules.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
