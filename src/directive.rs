//! Inline directive parsing for `{# tmplfix: #}` comments
//!
//! Supports in-file configuration overrides via a template comment:
//! `{# tmplfix: --indent 2 --disable-rule trailing_space #}`

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::Config;
use crate::format::Rule;

/// Pattern to match tmplfix directives
static TMPLFIX_DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\{#-?\s*tmplfix:\s*(.*?)\s*-?#\}\s*$")
        .unwrap_or_else(|e| panic!("Invalid directive pattern: {e}"))
});

/// Parsed directive options that can override config
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectiveOverrides {
    pub indent: Option<usize>,
    pub inner_indent: Option<usize>,
    /// Rule switches by rule
    pub rules: HashMap<Rule, bool>,
}

impl DirectiveOverrides {
    /// Check if any overrides are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indent.is_none() && self.inner_indent.is_none() && self.rules.is_empty()
    }

    /// Apply the overrides on top of `config`
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(indent) = self.indent {
            config.indent = indent;
        }
        if let Some(inner_indent) = self.inner_indent {
            config.inner_indent = inner_indent;
        }
        for (rule, enabled) in &self.rules {
            config.set_rule(*rule, *enabled);
        }
    }
}

/// Check if a line contains a tmplfix directive
#[must_use]
pub fn is_directive_line(line: &str) -> bool {
    TMPLFIX_DIRECTIVE_RE.is_match(line)
}

/// Parse a tmplfix directive line and return option overrides
///
/// # Returns
/// * `Some(DirectiveOverrides)` if the line is a directive with at least one known option
/// * `None` otherwise
#[must_use]
pub fn parse_directive(line: &str) -> Option<DirectiveOverrides> {
    let caps = TMPLFIX_DIRECTIVE_RE.captures(line)?;
    let args_str = caps.get(1)?.as_str();

    parse_directive_args(args_str)
}

/// Parse directive arguments into overrides
fn parse_directive_args(args_str: &str) -> Option<DirectiveOverrides> {
    let mut overrides = DirectiveOverrides::default();
    let mut tokens = args_str.split_whitespace();

    while let Some(token) = tokens.next() {
        match token {
            "-i" | "--indent" => {
                overrides.indent = tokens.next().and_then(|v| v.parse().ok());
            }
            "--inner-indent" => {
                overrides.inner_indent = tokens.next().and_then(|v| v.parse().ok());
            }
            "--no-indent" | "--disable-indent" => {
                overrides.rules.insert(Rule::Indent, false);
            }
            "--enable-indent" => {
                overrides.rules.insert(Rule::Indent, true);
            }
            "--disable-rule" | "--enable-rule" => {
                if let Some(rule) = tokens.next().and_then(|v| v.parse::<Rule>().ok()) {
                    overrides.rules.insert(rule, token == "--enable-rule");
                }
            }
            _ => {
                // Unknown option, skip
            }
        }
    }

    if overrides.is_empty() {
        None
    } else {
        Some(overrides)
    }
}

/// Scan input for tmplfix directives and return the first found
///
/// Only the first directive line is used (subsequent ones are ignored).
pub fn find_directive<R: std::io::BufRead>(input: &mut R) -> Option<DirectiveOverrides> {
    let mut buffer = String::new();

    while input.read_line(&mut buffer).ok()? > 0 {
        if is_directive_line(&buffer) {
            return parse_directive(&buffer);
        }
        buffer.clear();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_is_directive_line() {
        assert!(is_directive_line("{# tmplfix: --indent 2 #}"));
        assert!(is_directive_line("  {#- tmplfix: --no-indent -#}\n"));
        assert!(is_directive_line("{# TMPLFIX: -i 2 #}"));
        assert!(!is_directive_line("{# a regular comment #}"));
        assert!(!is_directive_line("<p>{# tmplfix: -i 2 #}</p>"));
    }

    #[test]
    fn test_parse_directive_indent() {
        let overrides = parse_directive("{# tmplfix: --indent 2 #}").unwrap();
        assert_eq!(overrides.indent, Some(2));
        assert_eq!(overrides.inner_indent, None);
    }

    #[test]
    fn test_parse_directive_multiple() {
        let overrides =
            parse_directive("{# tmplfix: -i 3 --inner-indent 1 --no-indent #}").unwrap();
        assert_eq!(overrides.indent, Some(3));
        assert_eq!(overrides.inner_indent, Some(1));
        assert_eq!(overrides.rules.get(&Rule::Indent), Some(&false));
    }

    #[test]
    fn test_parse_directive_rules() {
        let overrides = parse_directive(
            "{# tmplfix: --disable-rule trailing_space --enable-rule pipe-suffix-spacing #}",
        )
        .unwrap();
        assert_eq!(overrides.rules.get(&Rule::TrailingSpace), Some(&false));
        assert_eq!(overrides.rules.get(&Rule::PipeSuffixSpacing), Some(&true));
    }

    #[test]
    fn test_parse_invalid_directive() {
        assert!(parse_directive("{# tmplfix: #}").is_none());
        assert!(parse_directive("{# tmplfix: --disable-rule nonsense #}").is_none());
    }

    #[test]
    fn test_apply_to_config() {
        let mut config = Config::default();
        let overrides = parse_directive("{# tmplfix: -i 2 --disable-rule space_line #}").unwrap();
        overrides.apply_to(&mut config);
        assert_eq!(config.indent, 2);
        assert!(!config.is_rule_enabled(Rule::SpaceLine));
        assert!(config.is_rule_enabled(Rule::Indent));
    }

    #[test]
    fn test_find_directive_uses_first() {
        let content = "<div>\n{# tmplfix: -i 2 #}\n{# tmplfix: -i 8 #}\n</div>\n";
        let overrides = find_directive(&mut Cursor::new(content)).unwrap();
        assert_eq!(overrides.indent, Some(2));
        assert!(find_directive(&mut Cursor::new("<div>\n</div>\n")).is_none());
    }
}
