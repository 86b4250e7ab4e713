/// Line types and classifier state for template constructs
use std::fmt;

/// Structural role of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineType {
    /// Opens a markup element (`<div>`)
    Open,
    /// Opens a block construct (`{% if x %}`)
    BlockOpen,
    /// Closes a markup element or block construct
    Close,
    /// Opens and closes the same construct (`<b>x</b>`)
    OpenAndClose,
    /// Contains a self-closing element (`<img />`)
    SelfClosing,
    /// Alternate branch of the enclosing block (`{% else %}`)
    Else,
    /// Anything without structural effect
    Content,
    /// Starts a tag whose terminator is on a later line
    MultiLineOpen,
    /// Inside a multi-line tag
    MultiLineContent,
    /// Terminates a multi-line tag
    MultiLineClose,
    /// Terminates a multi-line tag after more attribute text
    MultiLineCloseWithContent,
    /// Starts an expression inside a quoted attribute value
    InnerMultiLineOpen,
    /// Ends an expression inside a quoted attribute value
    InnerMultiLineClose,
    /// Ends an inner expression and the enclosing multi-line tag
    MultiLineCloseWithInner,
    /// Inside a script region; emitted as-is
    Verbatim,
}

impl LineType {
    /// Line terminates the enclosing multi-line tag
    #[must_use]
    pub fn closes_multi_line(self) -> bool {
        matches!(
            self,
            LineType::MultiLineClose
                | LineType::MultiLineCloseWithContent
                | LineType::MultiLineCloseWithInner
        )
    }

    /// Line is the first or last line of a multi-line tag
    #[must_use]
    pub fn is_multi_line_boundary(self) -> bool {
        matches!(self, LineType::MultiLineOpen | LineType::MultiLineClose)
    }

    /// Line is the first or last line of an inner expression
    #[must_use]
    pub fn is_inner_boundary(self) -> bool {
        matches!(
            self,
            LineType::InnerMultiLineOpen | LineType::InnerMultiLineClose
        )
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineType::Open => "OPEN",
            LineType::BlockOpen => "BLOCK_OPEN",
            LineType::Close => "CLOSE",
            LineType::OpenAndClose => "OPEN_AND_CLOSE",
            LineType::SelfClosing => "SELF_CLOSING",
            LineType::Else => "ELSE",
            LineType::Content => "CONTENT",
            LineType::MultiLineOpen => "MULTI_LINE_OPEN",
            LineType::MultiLineContent => "MULTI_LINE_CONTENT",
            LineType::MultiLineClose => "MULTI_LINE_CLOSE",
            LineType::MultiLineCloseWithContent => "MULTI_LINE_CLOSE_WITH_CONTENT",
            LineType::InnerMultiLineOpen => "INNER_MULTI_LINE_OPEN",
            LineType::InnerMultiLineClose => "INNER_MULTI_LINE_CLOSE",
            LineType::MultiLineCloseWithInner => "MULTI_LINE_CLOSE_WITH_INNER",
            LineType::Verbatim => "VERBATIM",
        };
        write!(f, "{name}")
    }
}

/// Which kind of tag a multi-line region belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiLineFlavor {
    /// `<tag` ... `>`
    Markup,
    /// `{% tag` ... `%}` or `{{ expr` ... `}}`
    Block,
}

/// Lexical state carried from one line to the next
///
/// Lives for one file; a fresh default value starts every file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierState {
    /// Flavor of the open multi-line tag, until its terminator is seen
    pub flavor: Option<MultiLineFlavor>,
    /// Element name of the open multi-line markup tag
    pub element: Option<String>,
    /// Inside a multi-line tag
    pub is_multi_line: bool,
    /// Inside an expression spanning lines within a quoted attribute value
    pub is_inner_multi_line: bool,
    /// Between `<script>` and `</script>`
    pub is_script_region: bool,
}
