//! tmplfix - Style fixer for Twig/HTML templates
//!
//! Recomputes the indentation of every line of a template that mixes HTML
//! markup with `{% %}` / `{{ }}` template syntax, plus a few single-line
//! cosmetic rules (trailing blanks, blank lines, pipe-filter spacing).

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod config;
pub mod directive;
pub mod error;
pub mod format;
pub mod parser;
pub mod process;
pub mod scope;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::Config;
pub use directive::{find_directive, parse_directive, DirectiveOverrides};
pub use error::Result;
pub use format::{reindent, IndentParams, Rule, TemplateIndenter};
pub use parser::{join_lines, split_lines, Line};
pub use process::{format_file, format_str};
pub use scope::{
    classify, has_matching_close, has_matching_close_of, ClassifierState, LineType,
    MultiLineFlavor,
};
