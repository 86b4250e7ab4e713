//! Template text parsing utilities.
//!
//! This module provides the lexical layer the formatter works on:
//! - [`lines`]: Splits file content into numbered [`Line`]s and joins them back
//! - [`patterns`]: Precompiled regex patterns and predicates for markup and
//!   template syntax (`<tag>`, `{% block %}`, `{{ output }}`)
//!
//! Nothing here builds a syntax tree; every predicate looks at a single line.

pub mod lines;
pub mod patterns;

pub use lines::{detect_line_ending, has_trailing_newline, join_lines, split_lines, Line};
