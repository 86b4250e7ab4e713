/// `TemplateIndenter` - Depth-based indentation state machine
///
/// Walks the lines of one file in order, classifies each one and moves a
/// running depth counter according to its type. Every line is re-rendered
/// as padding plus its trimmed text.
use tracing::trace;

use crate::parser::patterns;
use crate::parser::Line;
use crate::scope::{classify, has_matching_close_of, ClassifierState, LineType, MultiLineFlavor};

/// Parameters for indentation processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentParams {
    /// Spaces per nesting level
    pub unit_width: usize,
    /// Extra spaces for lines inside a multi-line tag
    pub continuation_width: usize,
}

impl IndentParams {
    #[must_use]
    pub fn new(unit_width: usize, continuation_width: usize) -> Self {
        Self {
            unit_width,
            continuation_width,
        }
    }
}

impl Default for IndentParams {
    fn default() -> Self {
        Self::new(4, 2)
    }
}

/// `TemplateIndenter` tracks nesting depth across the lines of one file
///
/// A fresh indenter is needed per file; the classifier state and the depth
/// counter carry over from one line to the next.
pub struct TemplateIndenter {
    params: IndentParams,
    /// Lexical state threaded through the classifier
    state: ClassifierState,
    /// Depth for the next line; negative after unmatched closes
    next_indent: isize,
    /// Position and flavor of the first line of the open multi-line tag
    multi_line_opener: Option<(usize, MultiLineFlavor)>,
}

impl TemplateIndenter {
    #[must_use]
    pub fn new(params: IndentParams) -> Self {
        Self {
            params,
            state: ClassifierState::default(),
            next_indent: 0,
            multi_line_opener: None,
        }
    }

    /// Re-render every line's `fixed` text in place
    pub fn reindent(&mut self, lines: &mut [Line]) {
        for pos in 0..lines.len() {
            if let Some(rendered) = self.process_line(pos, lines) {
                lines[pos].fixed = rendered;
            }
        }
    }

    /// Depth that applies to the next line
    #[must_use]
    pub fn depth(&self) -> isize {
        self.next_indent
    }

    /// Compute the new text of `lines[pos]`, or `None` to leave it untouched
    fn process_line(&mut self, pos: usize, lines: &[Line]) -> Option<String> {
        let line = &lines[pos];
        let mut current = self.next_indent;
        let text = line.fixed.trim();

        if text.is_empty() {
            return Some(String::new());
        }

        let (line_type, state) = classify(text, std::mem::take(&mut self.state));
        self.state = state;

        trace!(
            line = line.index + 1,
            line_type = %line_type,
            depth = current,
            "classified"
        );

        if line_type == LineType::Verbatim {
            return None;
        }

        // Depth changes that affect this line's own rendering
        match line_type {
            LineType::Open => {
                if has_matching_close_of(MultiLineFlavor::Markup, line, lines, None) {
                    self.next_indent += 1;
                }
            }
            LineType::BlockOpen => {
                if has_matching_close_of(MultiLineFlavor::Block, line, lines, None) {
                    self.next_indent += 1;
                }
            }
            LineType::Close => {
                current -= 1;
                self.next_indent -= 1;
            }
            LineType::Else => current -= 1,
            LineType::MultiLineOpen => {
                self.multi_line_opener = self.state.flavor.map(|flavor| (pos, flavor));
            }
            _ => {}
        }

        let width = self.padding(current, line_type);
        let rendered = format!("{:width$}{text}", "");

        // Depth changes that only affect the following lines
        match line_type {
            LineType::MultiLineClose | LineType::MultiLineCloseWithContent => {
                if self.state.is_multi_line && !patterns::is_self_closing(text) {
                    if let Some((opener, flavor)) = self.multi_line_opener {
                        if has_matching_close_of(flavor, line, lines, Some(&lines[opener])) {
                            self.next_indent += 1;
                        }
                    }
                }
                self.end_multi_line();
            }
            LineType::MultiLineCloseWithInner => {
                if !patterns::is_self_closing(text) {
                    self.next_indent += 1;
                }
                self.end_multi_line();
            }
            LineType::InnerMultiLineClose => self.state.is_inner_multi_line = false,
            _ => {}
        }

        Some(rendered)
    }

    /// Leading spaces for a line rendered at depth `current`
    fn padding(&self, current: isize, line_type: LineType) -> usize {
        let depth = usize::try_from(current.max(0)).unwrap_or(0);
        let mut width = self.params.unit_width * depth;

        if self.state.is_multi_line && !line_type.is_multi_line_boundary() {
            width += self.params.continuation_width;
            if self.state.is_inner_multi_line && !line_type.is_inner_boundary() {
                width += self.params.continuation_width;
            }
        }
        width
    }

    fn end_multi_line(&mut self) {
        self.state.is_multi_line = false;
        self.state.is_inner_multi_line = false;
        self.multi_line_opener = None;
    }
}

/// Reindent the lines of one file
pub fn reindent(lines: &mut [Line], params: &IndentParams) {
    TemplateIndenter::new(*params).reindent(lines);
}
