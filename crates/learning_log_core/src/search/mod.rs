//! Keyword search entry points.
//!
//! # Responsibility
//! - Expose substring search over topic text.
//! - Own the case-sensitivity policy applied to matching.

pub mod substring;
