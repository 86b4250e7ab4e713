//! Fixing pipeline
//!
//! Implements the per-file pipeline:
//! - Split content into lines
//! - Pass 1: single-line cosmetic rules, in rule order
//! - Pass 2 (optional): reindentation over the whole file
//! - Join lines, keeping the original line terminator and final newline

use std::io::{BufRead, Write};

use anyhow::Context;
use tracing::debug;

use crate::config::Config;
use crate::format::{apply_line_rules, reindent, Rule};
use crate::parser::{detect_line_ending, has_trailing_newline, join_lines, split_lines};
use crate::Result;

/// Fix template text held in memory
#[must_use]
pub fn format_str(content: &str, config: &Config) -> String {
    let mut lines = split_lines(content);
    let enabled = config.enabled_rules();

    // Pass 1: single-line rules
    for line in &mut lines {
        line.fixed = apply_line_rules(&line.fixed, &enabled);
    }

    // Pass 2: indentation
    if enabled.contains(&Rule::Indent) {
        reindent(&mut lines, &config.indent_params());
    }

    let modified = lines.iter().filter(|line| line.is_modified()).count();
    debug!(
        lines = lines.len(),
        modified,
        rules = ?enabled,
        "fixed template"
    );

    join_lines(
        &lines,
        detect_line_ending(content),
        has_trailing_newline(content),
    )
}

/// Fix a template read from `input`, writing the result to `output`
///
/// `filename` is only used for error context and diagnostics.
pub fn format_file<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    config: &Config,
    filename: &str,
) -> Result<()> {
    let mut input_buffer = Vec::new();
    let mut reader = input;
    reader
        .read_to_end(&mut input_buffer)
        .with_context(|| format!("failed to read {filename}"))?;

    let content = String::from_utf8(input_buffer)
        .with_context(|| format!("{filename} is not valid UTF-8"))?;

    debug!(file = filename, bytes = content.len(), "fixing");
    let fixed = format_str(&content, config);
    output
        .write_all(fixed.as_bytes())
        .with_context(|| format!("failed to write output for {filename}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Cursor};

    use super::*;

    fn run(input: &str, config: &Config) -> String {
        let reader = BufReader::new(Cursor::new(input.as_bytes()));
        let mut output = Vec::new();
        format_file(reader, &mut output, config, "test.twig").unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_format_file_all_rules() {
        let input = "<div>   \n<p>{{ name |upper }}</p>\n  \n</div>\n";
        assert_eq!(
            run(input, &Config::default()),
            "<div>\n    <p>{{ name|upper }}</p>\n\n</div>\n"
        );
    }

    #[test]
    fn test_format_file_indent_only() {
        let mut config = Config::default();
        for rule in [
            Rule::TrailingSpace,
            Rule::SpaceLine,
            Rule::PipePrefixSpacing,
            Rule::PipeSuffixSpacing,
        ] {
            config.set_rule(rule, false);
        }
        let input = "{% if x %}\n{{ a | b }}\n{% endif %}\n";
        assert_eq!(run(input, &config), "{% if x %}\n    {{ a | b }}\n{% endif %}\n");
    }

    #[test]
    fn test_format_file_without_indent() {
        let mut config = Config::default();
        config.set_rule(Rule::Indent, false);
        let input = "<div>\n<p>x</p>  \n</div>\n";
        assert_eq!(run(input, &config), "<div>\n<p>x</p>\n</div>\n");
    }

    #[test]
    fn test_format_file_keeps_missing_final_newline() {
        assert_eq!(run("<div>\nx\n</div>", &Config::default()), "<div>\n    x\n</div>");
    }

    #[test]
    fn test_format_file_keeps_crlf() {
        assert_eq!(
            run("<div>\r\nx\r\n</div>\r\n", &Config::default()),
            "<div>\r\n    x\r\n</div>\r\n"
        );
    }

    #[test]
    fn test_format_file_empty_input() {
        assert_eq!(run("", &Config::default()), "");
    }

    #[test]
    fn test_format_file_rejects_invalid_utf8() {
        let reader = BufReader::new(Cursor::new(vec![0x3c, 0xff, 0xfe]));
        let mut output = Vec::new();
        let err = format_file(reader, &mut output, &Config::default(), "bad.twig").unwrap_err();
        assert!(format!("{err:#}").contains("bad.twig"));
    }

    #[test]
    fn test_format_str_uses_configured_widths() {
        let config = Config {
            indent: 2,
            ..Default::default()
        };
        assert_eq!(format_str("<ul>\n<li>a</li>\n</ul>\n", &config), "<ul>\n  <li>a</li>\n</ul>\n");
    }
}
