//! Line extraction: splits template text into numbered physical lines
//! and joins the fixed lines back together.

/// One physical line of a template file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 0-based position in the file
    pub index: usize,
    /// Text as read, without the line terminator
    pub raw: String,
    /// Text after the rules that have run so far
    pub fixed: String,
}

impl Line {
    #[must_use]
    pub fn new(index: usize, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            index,
            fixed: raw.clone(),
            raw,
        }
    }

    /// Whether any rule changed this line
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.raw != self.fixed
    }
}

/// Split file content into lines
///
/// Lines are split on `\n`; a `\r` before the `\n` is dropped. A final line
/// terminator does not produce an extra empty line (see [`has_trailing_newline`]).
#[must_use]
pub fn split_lines(content: &str) -> Vec<Line> {
    if content.is_empty() {
        return Vec::new();
    }

    let body = content.strip_suffix('\n').unwrap_or(content);
    body.split('\n')
        .enumerate()
        .map(|(index, text)| Line::new(index, text.strip_suffix('\r').unwrap_or(text)))
        .collect()
}

/// Line terminator used by the content, `\r\n` if its first line ends that way
#[must_use]
pub fn detect_line_ending(content: &str) -> &'static str {
    match content.find('\n') {
        Some(pos) if pos > 0 && content.as_bytes()[pos - 1] == b'\r' => "\r\n",
        _ => "\n",
    }
}

#[must_use]
pub fn has_trailing_newline(content: &str) -> bool {
    content.ends_with('\n')
}

/// Join fixed lines with `line_ending`, optionally terminating the last one
#[must_use]
pub fn join_lines(lines: &[Line], line_ending: &str, trailing_newline: bool) -> String {
    let capacity = lines
        .iter()
        .map(|line| line.fixed.len() + line_ending.len())
        .sum();
    let mut output = String::with_capacity(capacity);

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            output.push_str(line_ending);
        }
        output.push_str(&line.fixed);
    }
    if trailing_newline && !lines.is_empty() {
        output.push_str(line_ending);
    }
    output
}
