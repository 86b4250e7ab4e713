/// Closing reachability - does an opening construct have a matching close
/// later in the file?
///
/// The indenter only deepens after an opener whose close can actually be
/// found. That keeps one unclosed tag from shifting the rest of the file.
use crate::parser::patterns;
use crate::parser::Line;
use crate::scope::types::MultiLineFlavor;

/// The construct an opener introduces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Construct<'a> {
    Markup(&'a str),
    Block(&'a str),
}

impl<'a> Construct<'a> {
    fn of_flavor(flavor: MultiLineFlavor, text: &'a str) -> Option<Self> {
        match flavor {
            MultiLineFlavor::Markup => patterns::markup_name(text).map(Construct::Markup),
            MultiLineFlavor::Block => match patterns::block_name(text) {
                Some(name) if !name.starts_with("end") => Some(Construct::Block(name)),
                _ => None,
            },
        }
    }

    /// Whichever construct starts first on the line
    fn detect(text: &'a str) -> Option<Self> {
        let markup = patterns::MARKUP_TAG_START_RE.find(text).map(|m| m.start());
        let block = patterns::BLOCK_MARKER_RE.find(text).map(|m| m.start());
        let flavor = match (markup, block) {
            (Some(m), Some(b)) if b < m => MultiLineFlavor::Block,
            (Some(_), _) => MultiLineFlavor::Markup,
            (None, _) => MultiLineFlavor::Block,
        };
        Self::of_flavor(flavor, text)
    }
}

/// One same-name start or end found while scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Start,
    /// A start tag whose `>` or `/>` is on a later line
    OpenStart,
    End,
}

/// Events for `construct` on one line, in textual order
fn events(construct: Construct<'_>, text: &str) -> Vec<Event> {
    match construct {
        Construct::Markup(name) => patterns::markup_markers(text)
            .filter(|marker| marker.name == name && !marker.self_closing)
            .map(|marker| match (marker.closing, marker.terminated) {
                (true, _) => Event::End,
                (false, true) => Event::Start,
                (false, false) => Event::OpenStart,
            })
            .collect(),
        Construct::Block(name) => {
            // `{% set x = 1 %}` inside `{% set x %}...{% endset %}` opens nothing
            let opens_nothing = patterns::is_non_closing(text);
            patterns::block_markers(text)
                .filter_map(|keyword| {
                    if keyword == name && !opens_nothing {
                        Some(Event::Start)
                    } else if keyword.strip_prefix("end") == Some(name) {
                        Some(Event::End)
                    } else {
                        None
                    }
                })
                .collect()
        }
    }
}

/// Check whether `opening` has a matching close after it
///
/// The construct is identified from `multi_line_opener` when given (the first
/// line of a multi-line tag), otherwise from `opening` itself, taking whichever
/// of a markup tag or a block keyword comes first on the line. Lines after
/// `opening` are scanned in order; same-name starts and ends are balanced with
/// a counter, and the first end seen at balance zero is the match.
///
/// Block tags that never take an end tag (`{% set x = 1 %}`, `{% parent %}`,
/// `{% block name value %}`) are reported as unclosed.
#[must_use]
pub fn has_matching_close(opening: &Line, lines: &[Line], multi_line_opener: Option<&Line>) -> bool {
    let source = multi_line_opener.unwrap_or(opening).fixed.trim();
    if patterns::is_non_closing(source) {
        return false;
    }
    Construct::detect(source).is_some_and(|construct| scan(construct, opening, lines))
}

/// Like [`has_matching_close`], for a construct whose flavor is already known
///
/// `{% if a<b %}` is a block even though `<b` looks like a tag.
#[must_use]
pub fn has_matching_close_of(
    flavor: MultiLineFlavor,
    opening: &Line,
    lines: &[Line],
    multi_line_opener: Option<&Line>,
) -> bool {
    let source = multi_line_opener.unwrap_or(opening).fixed.trim();
    if patterns::is_non_closing(source) {
        return false;
    }
    Construct::of_flavor(flavor, source).is_some_and(|construct| scan(construct, opening, lines))
}

fn scan(construct: Construct<'_>, opening: &Line, lines: &[Line]) -> bool {
    let mut opened = 0usize;
    // A same-name start tag still waiting for its terminator
    let mut pending = false;
    let mut in_script = starts_script_region(&opening.fixed);

    for line in lines.iter().filter(|line| line.index > opening.index) {
        let mut text = line.fixed.as_str();

        // Script bodies are opaque
        if in_script {
            if !patterns::closes_script(text) {
                continue;
            }
            in_script = false;
        } else if starts_script_region(text) {
            in_script = true;
        }

        if pending {
            let Some(end) = patterns::markup_terminator(text) else {
                continue;
            };
            pending = false;
            if !text[..end].trim_end().ends_with('/') {
                opened += 1;
            }
            text = &text[end + 1..];
        }

        for event in events(construct, text) {
            match event {
                Event::Start => opened += 1,
                Event::OpenStart => pending = true,
                Event::End if opened == 0 => return true,
                Event::End => opened -= 1,
            }
        }
    }
    false
}

fn starts_script_region(text: &str) -> bool {
    patterns::opens_script(text) && !patterns::closes_script(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::split_lines;

    fn check(content: &str, opening: usize) -> bool {
        let lines = split_lines(content);
        has_matching_close(&lines[opening], &lines, None)
    }

    #[test]
    fn test_simple_markup_close() {
        assert!(check("<div>\n<p>x</p>\n</div>\n", 0));
        assert!(!check("<div>\n<p>x</p>\n", 0));
    }

    #[test]
    fn test_other_names_are_ignored() {
        assert!(!check("<section>\n</div>\n", 0));
        assert!(!check("{% if x %}\n{% endfor %}\n", 0));
    }

    #[test]
    fn test_nested_same_name_is_balanced() {
        let content = "<div>\n<div>\n</div>\n";
        assert!(!check(content, 0));
        assert!(check(content, 1));
        assert!(check("<div>\n<div>\n</div>\n</div>\n", 0));
    }

    #[test]
    fn test_block_balance() {
        let content = "{% group %}\n{% group %}\n{% endgroup %}\n{% endgroup %}\n";
        assert!(check(content, 0));
        assert!(check(content, 1));

        let unclosed = "{% group %}\n{% group %}\n{% endgroup %}\n";
        assert!(!check(unclosed, 0));
    }

    #[test]
    fn test_several_markers_on_one_line() {
        assert!(check("<ul>\n<ul></ul></ul>\n", 0));
        assert!(!check("<ul>\n<ul><ul></ul></ul>\n", 0));
    }

    #[test]
    fn test_self_closing_same_name_does_not_open() {
        assert!(check("<div>\n<div />\n</div>\n", 0));
    }

    #[test]
    fn test_non_closing_blocks() {
        assert!(!check("{% set x = 1 %}\n{% endset %}\n", 0));
        assert!(!check("{% parent %}\n", 0));
        assert!(!check("{% block title page.title %}\n{% endblock %}\n", 0));
        assert!(check("{% set x %}\nvalue\n{% endset %}\n", 0));
    }

    #[test]
    fn test_assignment_inside_capture_is_not_nested() {
        assert!(check("{% set nav %}\n{% set a = 1 %}\n{% endset %}\n", 0));
    }

    #[test]
    fn test_comparison_in_block_is_not_markup() {
        assert!(check("{% if a<b %}\nx\n{% endif %}\n", 0));
        let lines = split_lines("{% if a<b %}\nx\n{% endif %}\n");
        assert!(has_matching_close_of(
            MultiLineFlavor::Block,
            &lines[0],
            &lines,
            None
        ));
        assert!(!has_matching_close_of(
            MultiLineFlavor::Markup,
            &lines[0],
            &lines,
            None
        ));
    }

    #[test]
    fn test_script_bodies_are_skipped() {
        let content = "<div>\n<script>\nconst tpl = '<div>';\n</script>\n</div>\n";
        assert!(check(content, 0));
        assert!(check("<script>\nif (a < b) {}\n</script>\n", 0));
    }

    #[test]
    fn test_multi_line_self_closing_same_name() {
        let content = "<my-widget>\n<my-widget\nsize=\"2\"\n/>\n</my-widget>\n";
        assert!(check(content, 0));

        let nested = "<div>\n<div\nclass=\"a\">\n</div>\n";
        assert!(!check(nested, 0));
    }

    #[test]
    fn test_outputs_never_close() {
        assert!(!check("{{ value }}\n</div>\n", 0));
    }

    #[test]
    fn test_close_before_opening_is_ignored() {
        assert!(!check("</div>\n<div>\n", 1));
    }

    #[test]
    fn test_multi_line_opener_names_the_construct() {
        let lines = split_lines("<div\nclass=\"a\">\n</div>\n");
        assert!(has_matching_close(&lines[1], &lines, Some(&lines[0])));
        assert!(!has_matching_close(&lines[1], &lines, None));
    }
}
