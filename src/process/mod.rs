//! File processing and fixing pipeline.
//!
//! Each file is handled independently:
//!
//! **Pass 1 - Line rules:**
//! - Empty whitespace-only lines
//! - Strip trailing blanks
//! - Normalize spacing around `|` filters inside template expressions
//!
//! **Pass 2 - Indentation:**
//! - Classify every line and track nesting depth
//! - Re-render each line at its depth, with continuation padding inside
//!   multi-line tags
//!
//! The main entry point is [`format_file`] which processes a buffered reader
//! and writes fixed output to any `Write` implementation.

pub mod pipeline;

pub use pipeline::{format_file, format_str};
