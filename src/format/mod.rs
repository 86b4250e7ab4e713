//! Template formatting.
//!
//! This module contains the fixing logic organized into submodules:
//! - [`indenter`]: Recomputes indentation from construct nesting
//! - [`rules`]: Single-line cosmetic rules (blank lines, trailing blanks, filter pipes)

pub mod indenter;
pub mod rules;

pub use indenter::{reindent, IndentParams, TemplateIndenter};
pub use rules::{apply_line_rules, Rule, LINE_RULES};
