//! Error types and result aliases for tmplfix.
//!
//! The indentation core never fails; errors only come from I/O, decoding and
//! configuration loading at the edges.
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used throughout the crate

use anyhow::Result as AnyhowResult;

pub type Result<T> = AnyhowResult<T>;
