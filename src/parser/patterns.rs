/// Regex patterns and line predicates for template syntax
///
/// All patterns are compiled once at startup using `LazyLock`. The predicates
/// below are the vocabulary the line classifier is built from; each answers
/// one lexical question about a trimmed line and nothing else.
use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Build a regex from a compile-time constant pattern.
///
/// # Panics
///
/// Panics if the pattern is invalid. This is acceptable because all patterns
/// in this module are compile-time constants that are verified by tests.
/// The panic occurs at first access of the `LazyLock` static.
fn build_re(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .unicode(true)
        .build()
        .unwrap_or_else(|_| panic!("Invalid regex pattern: {pattern}"))
}

// Tag and keyword name fragments
const TAG_NAME: &str = r"[a-zA-Z][\w:.-]*";
const BLOCK_START: &str = r"\{%[-~]?\s*";

// ===== MARKUP =====

/// An opening tag that is terminated on the same line (`<div ...>`)
pub static MARKUP_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"<[a-zA-Z].*>"));
/// A complete closing tag (`</div>`)
pub static MARKUP_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"</[a-zA-Z][^>]*>"));
/// The start of an opening tag, terminated or not (`<div`)
pub static MARKUP_TAG_START_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"<({TAG_NAME})")));
/// Every tag marker on a line, opening or closing, in textual order
pub static MARKUP_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"<(/?)({TAG_NAME})([^<>]*)(>?)")));

// Script regions
pub static SCRIPT_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"(?i)<script(\s[^>]*)?>"));
pub static SCRIPT_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"(?i)</script"));

// ===== TEMPLATE BLOCKS =====

/// A complete block tag (`{% ... %}`)
pub static BLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"\{%.*%\}"));
/// Every block keyword on a line (`{% if`, `{%- endfor`), in textual order
pub static BLOCK_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{BLOCK_START}([a-zA-Z_]\w*)")));
/// A complete closing block tag (`{% endif %}`)
pub static BLOCK_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{BLOCK_START}end\w+\b.*?%\}}")));
/// An alternate branch (`{% else %}`, `{% elseif x %}`)
pub static BLOCK_ELSE_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{BLOCK_START}el[a-z]+\b.*?%\}}")));
/// A complete output expression (`{{ ... }}`)
pub static OUTPUT_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"\{\{.*\}\}"));
/// The start of a block tag or output expression
pub static TEMPLATE_START_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"\{[%{]"));
/// The end of a block tag or output expression
pub static TEMPLATE_END_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"%\}|\}\}"));
/// Block and output spans, shortest match
pub static EXPRESSION_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"\{\{.*?\}\}|\{%.*?%\}"));

// Block tags that never carry an end tag
pub static SET_ASSIGN_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{BLOCK_START}set\s+.+?=")));
pub static PARENT_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{BLOCK_START}parent\s*[-~]?%\}}")));
pub static BLOCK_SHORTHAND_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"{BLOCK_START}block\s+\w+\s+[^-~%\s]")));

// ===== INNER EXPRESSIONS (quoted attribute values) =====

/// An attribute whose quoted value starts an expression (`class="{{`)
pub static INNER_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r#":?\S+=["']\{"#));
/// The end of an expression inside a quoted value (`}}"`)
pub static INNER_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r#"\}["']"#));
/// An attribute expression opened and closed on one line
pub static INNER_SELF_CLOSING_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r#":?\S+=["']\{.*\}["']"#));
/// A keyed output call (`label: "{{ 'x'|trans }}"`)
pub static INNER_FUNCTION_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r#":\s*["']\{\{.+\}\}["']"#));

/// One tag marker found on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMarker<'a> {
    pub name: &'a str,
    pub closing: bool,
    /// The marker's `>` is on the same line
    pub terminated: bool,
    pub self_closing: bool,
}

/// Iterate over the tag markers of a line in textual order
pub fn markup_markers(line: &str) -> impl Iterator<Item = TagMarker<'_>> {
    MARKUP_MARKER_RE.captures_iter(line).filter_map(|caps| {
        let name = caps.get(2)?.as_str();
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let terminated = caps.get(4).is_some_and(|m| !m.as_str().is_empty());
        let self_closing =
            terminated && caps.get(3).is_some_and(|m| m.as_str().trim_end().ends_with('/'));
        Some(TagMarker {
            name,
            closing,
            terminated,
            self_closing,
        })
    })
}

/// Iterate over the block keywords of a line in textual order
pub fn block_markers(line: &str) -> impl Iterator<Item = &str> {
    BLOCK_MARKER_RE
        .captures_iter(line)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Name of the first opening tag on the line
#[must_use]
pub fn markup_name(line: &str) -> Option<&str> {
    MARKUP_TAG_START_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Keyword of the first block tag on the line
#[must_use]
pub fn block_name(line: &str) -> Option<&str> {
    block_markers(line).next()
}

/// Replace every `{{ }}` / `{% %}` span with blanks of the same length
///
/// Keeps byte offsets stable while hiding operators like `>` that belong to
/// expressions rather than markup.
#[must_use]
pub fn mask_expressions(line: &str) -> Cow<'_, str> {
    EXPRESSION_SPAN_RE.replace_all(line, |caps: &regex::Captures<'_>| " ".repeat(caps[0].len()))
}

// ----- markup predicates -----

#[must_use]
pub fn is_self_closing(line: &str) -> bool {
    line.contains("/>")
}

#[must_use]
pub fn opens_markup(line: &str) -> bool {
    MARKUP_OPEN_RE.is_match(line)
}

#[must_use]
pub fn closes_markup(line: &str) -> bool {
    MARKUP_CLOSE_RE.is_match(line)
}

#[must_use]
pub fn starts_markup_tag(line: &str) -> bool {
    MARKUP_TAG_START_RE.is_match(line)
}

/// The first element opened on the line is also closed on it
#[must_use]
pub fn opens_and_closes_markup(line: &str) -> bool {
    if !opens_markup(line) || !closes_markup(line) {
        return false;
    }
    let Some(name) = markup_name(line) else {
        return false;
    };
    markup_markers(line).any(|marker| marker.closing && marker.name == name)
}

/// Byte offset of the first `>` that is not part of a template expression
#[must_use]
pub fn markup_terminator(line: &str) -> Option<usize> {
    mask_expressions(line).find('>')
}

/// The line is nothing but a tag terminator (`>` or `/>`)
#[must_use]
pub fn is_bare_terminator(line: &str) -> bool {
    matches!(line.trim(), ">" | "/>")
}

/// Element `name` is closed after the terminator on the same line (`">text</a>`)
///
/// Same-name elements opened after the terminator are balanced first, so
/// `"><span>icon</span>` does not close a `button`.
#[must_use]
pub fn closes_element_inline(line: &str, name: &str) -> bool {
    let masked = mask_expressions(line);
    let Some(end) = masked.find('>') else {
        return false;
    };
    let mut opened = 0usize;
    for marker in markup_markers(&masked[end + 1..]) {
        if marker.name != name || marker.self_closing {
            continue;
        }
        match (marker.closing, marker.terminated) {
            (true, true) if opened == 0 => return true,
            (true, true) => opened -= 1,
            (false, _) => opened += 1,
            (true, false) => {}
        }
    }
    false
}

#[must_use]
pub fn opens_script(line: &str) -> bool {
    SCRIPT_OPEN_RE.is_match(line) && !is_self_closing(line)
}

#[must_use]
pub fn closes_script(line: &str) -> bool {
    SCRIPT_CLOSE_RE.is_match(line)
}

// ----- block predicates -----

#[must_use]
pub fn opens_block(line: &str) -> bool {
    BLOCK_TAG_RE.is_match(line)
}

#[must_use]
pub fn closes_block(line: &str) -> bool {
    BLOCK_CLOSE_RE.is_match(line)
}

#[must_use]
pub fn is_else(line: &str) -> bool {
    BLOCK_ELSE_RE.is_match(line)
}

/// The first block keyword on the line is ended on it (`{% if %}..{% endif %}`)
#[must_use]
pub fn opens_and_closes_block(line: &str) -> bool {
    if !opens_block(line) {
        return false;
    }
    let Some(name) = block_name(line) else {
        return false;
    };
    if name.starts_with("end") {
        return false;
    }
    block_markers(line)
        .skip(1)
        .any(|marker| marker.strip_prefix("end") == Some(name))
}

#[must_use]
pub fn is_output(line: &str) -> bool {
    OUTPUT_RE.is_match(line)
}

#[must_use]
pub fn starts_template_tag(line: &str) -> bool {
    TEMPLATE_START_RE.is_match(line)
}

#[must_use]
pub fn ends_template_tag(line: &str) -> bool {
    TEMPLATE_END_RE.is_match(line)
}

/// Block tags known to never have a matching end tag
#[must_use]
pub fn is_non_closing(line: &str) -> bool {
    SET_ASSIGN_RE.is_match(line) || PARENT_RE.is_match(line) || BLOCK_SHORTHAND_RE.is_match(line)
}

// ----- inner expression predicates -----

#[must_use]
pub fn opens_inner(line: &str) -> bool {
    INNER_OPEN_RE.is_match(line) && !INNER_SELF_CLOSING_RE.is_match(line)
}

/// Byte offset just past the inner-expression close (`}"`), if this line ends one
#[must_use]
pub fn inner_close_end(line: &str) -> Option<usize> {
    if INNER_SELF_CLOSING_RE.is_match(line) || INNER_FUNCTION_RE.is_match(line) {
        return None;
    }
    INNER_CLOSE_RE.find(line).map(|m| m.end())
}
