//! Foundation types for the Synesis toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`LineCol`] - 1-indexed line/column pair
//! - [`Location`] - workspace-relative file plus [`LineCol`]
//! - Domain constants (file extensions, separators)
//!
//! This module has NO dependencies on other synesis modules.

pub mod constants;
mod position;

pub use position::{LineCol, Location};
