//! Single-line cosmetic rules
//!
//! Each rule is a stateless rewrite of one line's text. They run before
//! reindentation, in the order of [`LINE_RULES`].

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use anyhow::bail;

use crate::parser::patterns::EXPRESSION_SPAN_RE;

/// A named fixing rule that can be enabled or disabled in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    Indent,
    TrailingSpace,
    SpaceLine,
    PipePrefixSpacing,
    PipeSuffixSpacing,
}

/// Per-line rules, in the order they are applied
pub const LINE_RULES: [Rule; 4] = [
    Rule::SpaceLine,
    Rule::TrailingSpace,
    Rule::PipePrefixSpacing,
    Rule::PipeSuffixSpacing,
];

impl Rule {
    pub const ALL: [Rule; 5] = [
        Rule::Indent,
        Rule::TrailingSpace,
        Rule::SpaceLine,
        Rule::PipePrefixSpacing,
        Rule::PipeSuffixSpacing,
    ];

    /// Name used in config files and directives
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Rule::Indent => "indent",
            Rule::TrailingSpace => "trailing_space",
            Rule::SpaceLine => "space_line",
            Rule::PipePrefixSpacing => "pipe_prefix_spacing",
            Rule::PipeSuffixSpacing => "pipe_suffix_spacing",
        }
    }

    /// Apply this rule to one line; `Indent` works on whole files and is a no-op here
    #[must_use]
    pub fn apply<'a>(self, text: &'a str) -> Cow<'a, str> {
        match self {
            Rule::Indent => Cow::Borrowed(text),
            Rule::TrailingSpace => fix_trailing_space(text),
            Rule::SpaceLine => fix_space_line(text),
            Rule::PipePrefixSpacing => fix_pipe_prefix_spacing(text),
            Rule::PipeSuffixSpacing => fix_pipe_suffix_spacing(text),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rule {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match Rule::ALL.iter().find(|rule| rule.name() == normalized) {
            Some(rule) => Ok(*rule),
            None => bail!("unknown rule '{s}'"),
        }
    }
}

fn is_blank(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

/// A line of nothing but blanks becomes empty
#[must_use]
pub fn fix_space_line(text: &str) -> Cow<'_, str> {
    if !text.is_empty() && text.chars().all(is_blank) {
        Cow::Owned(String::new())
    } else {
        Cow::Borrowed(text)
    }
}

/// Strip blanks after the last non-blank character
#[must_use]
pub fn fix_trailing_space(text: &str) -> Cow<'_, str> {
    let trimmed = text.trim_end_matches(is_blank);
    if trimmed.is_empty() || trimmed.len() == text.len() {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(trimmed.to_string())
    }
}

/// Remove blanks before a `|` filter inside template expressions
#[must_use]
pub fn fix_pipe_prefix_spacing(text: &str) -> Cow<'_, str> {
    rewrite_expressions(text, remove_blanks_before_pipe)
}

/// Remove blanks after a `|` filter inside template expressions
#[must_use]
pub fn fix_pipe_suffix_spacing(text: &str) -> Cow<'_, str> {
    rewrite_expressions(text, remove_blanks_after_pipe)
}

/// Run every enabled per-line rule over `text`
#[must_use]
pub fn apply_line_rules(text: &str, enabled: &[Rule]) -> String {
    let mut line = text.to_string();
    for rule in LINE_RULES.iter().filter(|rule| enabled.contains(rule)) {
        let fixed = match rule.apply(&line) {
            Cow::Borrowed(_) => continue,
            Cow::Owned(fixed) => fixed,
        };
        line = fixed;
    }
    line
}

fn rewrite_expressions(text: &str, rewrite: fn(&str) -> String) -> Cow<'_, str> {
    if !text.contains('|') {
        return Cow::Borrowed(text);
    }
    EXPRESSION_SPAN_RE.replace_all(text, |caps: &regex::Captures<'_>| rewrite(&caps[0]))
}

/// Tracks whether a scan position is inside a string literal
#[derive(Default)]
struct QuoteState {
    quote: Option<char>,
    escaped: bool,
}

impl QuoteState {
    /// Feed one character; returns true if it belongs to a string literal
    fn feed(&mut self, ch: char) -> bool {
        match self.quote {
            Some(q) => {
                if self.escaped {
                    self.escaped = false;
                } else if ch == '\\' {
                    self.escaped = true;
                } else if ch == q {
                    self.quote = None;
                }
                true
            }
            None if ch == '"' || ch == '\'' => {
                self.quote = Some(ch);
                true
            }
            None => false,
        }
    }
}

fn remove_blanks_before_pipe(span: &str) -> String {
    let mut out = String::with_capacity(span.len());
    let mut pending = String::new();
    let mut quotes = QuoteState::default();

    for ch in span.chars() {
        if quotes.feed(ch) {
            out.push_str(&pending);
            pending.clear();
            out.push(ch);
        } else if is_blank(ch) {
            pending.push(ch);
        } else {
            if ch != '|' {
                out.push_str(&pending);
            }
            pending.clear();
            out.push(ch);
        }
    }
    out.push_str(&pending);
    out
}

fn remove_blanks_after_pipe(span: &str) -> String {
    let mut out = String::with_capacity(span.len());
    let mut after_pipe = false;
    let mut quotes = QuoteState::default();

    for ch in span.chars() {
        if quotes.feed(ch) {
            after_pipe = false;
            out.push(ch);
            continue;
        }
        if after_pipe && is_blank(ch) {
            continue;
        }
        after_pipe = ch == '|';
        out.push(ch);
    }
    out
}
