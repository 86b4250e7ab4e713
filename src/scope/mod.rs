//! Structural analysis of template lines.
//!
//! Each trimmed line is given a [`LineType`] describing its effect on nesting:
//! - Markup elements: `<div>`, `</div>`, `<img />`
//! - Template blocks: `{% if %}`, `{% else %}`, `{% endif %}`
//! - Multi-line tags whose terminator sits on a later line
//! - Expressions spanning lines inside a quoted attribute value
//! - Script bodies, which are left alone
//!
//! [`classify`] threads a small [`ClassifierState`] from line to line, and
//! [`has_matching_close`] decides whether an opener will ever be closed.

pub mod classifier;
pub mod reachability;
pub mod types;

pub use classifier::classify;
pub use reachability::{has_matching_close, has_matching_close_of};
pub use types::{ClassifierState, LineType, MultiLineFlavor};
