//! Foundation module - Core utilities
//!
//! - Logging utilities

pub mod logging;
