/// Line classifier - assigns a [`LineType`] to each trimmed line
///
/// Categories overlap, so the checks run in a fixed order and the first
/// match wins. The only memory between lines is the [`ClassifierState`]
/// threaded through each call.
use crate::parser::patterns;
use crate::scope::types::{ClassifierState, LineType, MultiLineFlavor};

/// Classify one trimmed line
///
/// Returns the line type together with the state to use for the next line.
#[must_use]
pub fn classify(line: &str, state: ClassifierState) -> (LineType, ClassifierState) {
    let mut next = state;
    let line_type = classify_in_place(line, &mut next);
    (line_type, next)
}

fn classify_in_place(line: &str, state: &mut ClassifierState) -> LineType {
    // Script regions: the body is opaque, the boundary lines are regular tags
    if state.is_script_region {
        if !patterns::closes_script(line) {
            return LineType::Verbatim;
        }
        state.is_script_region = false;
    } else if patterns::opens_script(line) && !patterns::closes_script(line) {
        state.is_script_region = true;
    }

    if state.is_multi_line {
        return classify_multi_line(line, state);
    }

    if patterns::is_self_closing(line) {
        return LineType::SelfClosing;
    }

    if patterns::opens_and_closes_markup(line) || patterns::opens_and_closes_block(line) {
        return LineType::OpenAndClose;
    }

    if patterns::opens_markup(line) {
        return LineType::Open;
    }

    if patterns::is_else(line) {
        return LineType::Else;
    }

    if patterns::opens_block(line) && !patterns::closes_block(line) {
        return LineType::BlockOpen;
    }

    if patterns::closes_markup(line) || patterns::closes_block(line) {
        return LineType::Close;
    }

    if patterns::is_output(line) && !patterns::starts_markup_tag(line) {
        return LineType::Content;
    }

    if patterns::starts_markup_tag(line) {
        state.flavor = Some(MultiLineFlavor::Markup);
        state.element = patterns::markup_name(line).map(str::to_string);
        state.is_multi_line = true;
        return LineType::MultiLineOpen;
    }

    if patterns::starts_template_tag(line) && !patterns::closes_block(line) {
        state.flavor = Some(MultiLineFlavor::Block);
        state.is_multi_line = true;
        return LineType::MultiLineOpen;
    }

    LineType::Content
}

/// Classify a line inside a multi-line tag
///
/// `is_multi_line` stays set on terminator lines so the indenter can still
/// tell the region was open while rendering; it clears it afterwards. The one
/// exception is a terminator followed by the element's own closing tag, which
/// leaves nothing open. Closing tags of other elements on that line do not
/// count.
fn classify_multi_line(line: &str, state: &mut ClassifierState) -> LineType {
    if state.is_inner_multi_line {
        if let Some(end) = patterns::inner_close_end(line) {
            state.is_inner_multi_line = false;
            let rest = &line[end..];
            let closes_outer = match state.flavor {
                Some(MultiLineFlavor::Markup) => patterns::markup_terminator(rest).is_some(),
                Some(MultiLineFlavor::Block) => patterns::ends_template_tag(rest),
                None => false,
            };
            if closes_outer {
                state.flavor = None;
                state.element = None;
                return LineType::MultiLineCloseWithInner;
            }
            return LineType::InnerMultiLineClose;
        }
    }

    match state.flavor {
        Some(MultiLineFlavor::Markup) if patterns::markup_terminator(line).is_some() => {
            state.flavor = None;
            let element = state.element.take();
            if element.is_some_and(|name| patterns::closes_element_inline(line, &name)) {
                state.is_multi_line = false;
                return LineType::MultiLineClose;
            }
            if patterns::is_bare_terminator(line) {
                return LineType::MultiLineClose;
            }
            return LineType::MultiLineCloseWithContent;
        }
        Some(MultiLineFlavor::Block) if patterns::ends_template_tag(line) => {
            state.flavor = None;
            return LineType::MultiLineClose;
        }
        _ => {}
    }

    if patterns::opens_inner(line) {
        state.is_inner_multi_line = true;
        return LineType::InnerMultiLineOpen;
    }

    LineType::MultiLineContent
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Classify a sequence of lines, threading state through
    fn classify_all(lines: &[&str]) -> Vec<LineType> {
        let mut state = ClassifierState::default();
        lines
            .iter()
            .map(|line| {
                let (line_type, next) = classify(line, std::mem::take(&mut state));
                state = next;
                // The indenter ends the region after a terminator line
                if line_type.closes_multi_line() {
                    state.is_multi_line = false;
                }
                line_type
            })
            .collect()
    }

    #[test]
    fn test_single_line_markup() {
        assert_eq!(classify_all(&["<div>"]), [LineType::Open]);
        assert_eq!(classify_all(&["</div>"]), [LineType::Close]);
        assert_eq!(
            classify_all(&["<span>text</span>"]),
            [LineType::OpenAndClose]
        );
        assert_eq!(
            classify_all(&[r#"<img src="a.png" alt="" />"#]),
            [LineType::SelfClosing]
        );
        assert_eq!(classify_all(&["<li><a>x</a>"]), [LineType::Open]);
    }

    #[test]
    fn test_single_line_blocks() {
        assert_eq!(classify_all(&["{% if x %}"]), [LineType::BlockOpen]);
        assert_eq!(classify_all(&["{% endif %}"]), [LineType::Close]);
        assert_eq!(classify_all(&["{% else %}"]), [LineType::Else]);
        assert_eq!(classify_all(&["{% elseif y %}"]), [LineType::Else]);
        assert_eq!(
            classify_all(&["{% if x %}a{% endif %}"]),
            [LineType::OpenAndClose]
        );
        assert_eq!(classify_all(&["{% set x = 1 %}"]), [LineType::BlockOpen]);
    }

    #[test]
    fn test_content() {
        assert_eq!(classify_all(&["{{ title }}"]), [LineType::Content]);
        assert_eq!(classify_all(&["plain text"]), [LineType::Content]);
        assert_eq!(classify_all(&["{# comment #}"]), [LineType::Content]);
        assert_eq!(classify_all(&["<!DOCTYPE html>"]), [LineType::Content]);
    }

    #[test]
    fn test_output_followed_by_open_tag_is_multi_line() {
        let (line_type, state) = classify("{{ icon }} <span", ClassifierState::default());
        assert_eq!(line_type, LineType::MultiLineOpen);
        assert_eq!(state.flavor, Some(MultiLineFlavor::Markup));
        assert!(state.is_multi_line);
    }

    #[test]
    fn test_multi_line_markup() {
        let types = classify_all(&["<div", r#"class="a""#, r#"id="b">"#]);
        assert_eq!(
            types,
            [
                LineType::MultiLineOpen,
                LineType::MultiLineContent,
                LineType::MultiLineCloseWithContent
            ]
        );
    }

    #[test]
    fn test_multi_line_markup_bare_terminator() {
        let types = classify_all(&["<div", r#"class="a""#, ">"]);
        assert_eq!(types[2], LineType::MultiLineClose);
    }

    #[test]
    fn test_multi_line_markup_closed_inline() {
        let mut state = ClassifierState::default();
        let (_, next) = classify("<a", state);
        state = next;
        let (line_type, next) = classify(r#"href="/">Home</a>"#, state);
        assert_eq!(line_type, LineType::MultiLineClose);
        assert!(!next.is_multi_line);
        assert_eq!(next.flavor, None);
    }

    #[test]
    fn test_other_element_closed_after_terminator() {
        let mut state = ClassifierState::default();
        let (_, next) = classify("<button", state);
        assert_eq!(next.element.as_deref(), Some("button"));
        state = next;
        let (line_type, next) = classify(r#"class="x"><span>icon</span>"#, state);
        assert_eq!(line_type, LineType::MultiLineCloseWithContent);
        assert!(next.is_multi_line);
        assert_eq!(next.element, None);
    }

    #[test]
    fn test_self_closing_terminator_inside_multi_line() {
        let types = classify_all(&["<img", r#"src="a.png""#, "/>"]);
        assert_eq!(
            types,
            [
                LineType::MultiLineOpen,
                LineType::MultiLineContent,
                LineType::MultiLineClose
            ]
        );
    }

    #[test]
    fn test_multi_line_block() {
        let types = classify_all(&["{% include 'card.twig' with {", "title: 'x'", "} %}"]);
        assert_eq!(
            types,
            [
                LineType::MultiLineOpen,
                LineType::MultiLineContent,
                LineType::MultiLineClose
            ]
        );
    }

    #[test]
    fn test_expression_operator_is_not_a_terminator() {
        let types = classify_all(&["<div", r#"class="{{ a > b ? 'x' }}""#, ">"]);
        assert_eq!(types[1], LineType::MultiLineContent);
        assert_eq!(types[2], LineType::MultiLineClose);
    }

    #[test]
    fn test_inner_multi_line() {
        let types = classify_all(&[
            "<div",
            r#"class="{{"#,
            "active ? 'on'",
            r#"}}""#,
            ">",
        ]);
        assert_eq!(
            types,
            [
                LineType::MultiLineOpen,
                LineType::InnerMultiLineOpen,
                LineType::MultiLineContent,
                LineType::InnerMultiLineClose,
                LineType::MultiLineClose
            ]
        );
    }

    #[test]
    fn test_inner_close_with_outer_terminator() {
        let types = classify_all(&["<div", r#"class="{{"#, "active ? 'on'", r#"}}">"#]);
        assert_eq!(types[3], LineType::MultiLineCloseWithInner);
    }

    #[test]
    fn test_script_region() {
        let mut state = ClassifierState::default();
        let mut types = Vec::new();
        for line in ["<script>", "if (a < b) {", "<div>", "</script>"] {
            let (line_type, next) = classify(line, state);
            state = next;
            types.push(line_type);
        }
        assert_eq!(
            types,
            [
                LineType::Open,
                LineType::Verbatim,
                LineType::Verbatim,
                LineType::Close
            ]
        );
        assert!(!state.is_script_region);
    }

    #[test]
    fn test_inline_script_does_not_start_region() {
        let (line_type, state) = classify(
            r#"<script src="app.js"></script>"#,
            ClassifierState::default(),
        );
        assert_eq!(line_type, LineType::OpenAndClose);
        assert!(!state.is_script_region);
    }
}
