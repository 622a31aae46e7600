//! Utility modules
//!
//! Provides logging setup and local input validation.

pub mod logging;
pub mod validation;

pub use logging::init_logging;
