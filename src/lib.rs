/// Implemented RL algorithms
pub mod algo;

/// Data structures
pub mod ds;

/// Error types
pub mod error;

/// Action selection
pub mod exploration;

/// Grid world environment
pub mod gym;

/// Text rendering of learned policies
pub mod viz;

mod util;

pub use error::{Error, Result};
