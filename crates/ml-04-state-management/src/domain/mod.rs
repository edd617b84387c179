//! Domain layer - state values, transitions and the committed state map.

pub mod errors;
pub mod manager;
pub mod transitions;
pub mod values;

pub use errors::*;
pub use manager::*;
pub use transitions::*;
pub use values::*;
