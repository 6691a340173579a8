// Public modules
pub mod config;
pub mod error;
pub mod prefix;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
