//! Mutable line buffer backing the script extraction pipeline.
//!
//! The buffer holds the program as an ordered sequence of lines keyed by
//! 0-based index. Extraction phases *blank* the spans they consume, so later
//! phases observe the same coordinate system as earlier ones while seeing
//! empty text where earlier phases already matched. The line count never
//! changes for the lifetime of the buffer.

use crate::sm_component::Span;

/// An ordered, mutable sequence of script lines.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    lines: Vec<String>,
    original_non_blank: usize,
}

impl LineBuffer {
    /// Splits `text` into lines. Trailing carriage returns are stripped so
    /// Windows-encoded scripts behave like Unix ones. A trailing newline does
    /// not produce a phantom empty line.
    pub fn new(text: &str) -> Self {
        let mut lines: Vec<String> = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        if text.ends_with('\n') {
            lines.pop();
        }
        let original_non_blank = lines.iter().filter(|l| !l.trim().is_empty()).count();
        Self {
            lines,
            original_non_blank,
        }
    }

    /// Number of lines. Constant across all blanking operations.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the buffer holds no lines at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line at `i`, or `None` past the end.
    pub fn line(&self, i: usize) -> Option<&str> {
        self.lines.get(i).map(|s| s.as_str())
    }

    /// Iterates all lines in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|s| s.as_str())
    }

    /// Joins the lines of `span` with `\n`, exactly as the multi-line
    /// matchers see them.
    pub fn joined(&self, span: Span) -> String {
        self.lines[span.start..span.end].join("\n")
    }

    /// Blanks `content` out of `span`.
    ///
    /// The span's lines are joined, the first occurrence of `content` is
    /// removed, and the remainder is written back padded with empty lines to
    /// the original span length. Text sharing a line with the extracted
    /// construct therefore survives into the residual.
    pub fn blank(&mut self, span: Span, content: &str) {
        let span_len = span.end - span.start;
        let joined = self.joined(span);
        let remainder = if content.is_empty() {
            joined
        } else {
            joined.replacen(content, "", 1)
        };
        let mut replacement: Vec<String> = remainder
            .split('\n')
            .take(span_len)
            .map(|l| l.to_string())
            .collect();
        replacement.resize(span_len, String::new());
        self.lines[span.start..span.end].clone_from_slice(&replacement);
    }

    /// Count of lines that held text when the buffer was created.
    pub fn original_non_blank(&self) -> usize {
        self.original_non_blank
    }

    /// Count of lines currently holding non-whitespace text.
    pub fn non_blank(&self) -> usize {
        self.lines.iter().filter(|l| !l.trim().is_empty()).count()
    }

    /// Fraction of originally non-blank lines that the pipeline has blanked.
    /// A buffer with no non-blank lines to begin with reports `1.0`.
    pub fn extraction_ratio(&self) -> f64 {
        if self.original_non_blank == 0 {
            1.0
        } else {
            (self.original_non_blank - self.non_blank()) as f64 / self.original_non_blank as f64
        }
    }

    /// Renders the residual buffer, one line per original line.
    pub fn to_text(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_preserves_line_count() {
        let mut buf = LineBuffer::new("a\nb\nc\nd");
        assert_eq!(buf.len(), 4);
        buf.blank(Span { start: 1, end: 3 }, "b\nc");
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.line(1), Some(""));
        assert_eq!(buf.line(2), Some(""));
        assert_eq!(buf.line(3), Some("d"));
    }

    #[test]
    fn blank_keeps_text_outside_the_match() {
        let mut buf = LineBuffer::new("x = 1; /* note */ y = 2;");
        buf.blank(Span { start: 0, end: 1 }, "/* note */");
        assert_eq!(buf.line(0), Some("x = 1;  y = 2;"));
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn blank_pads_with_empty_lines() {
        let mut buf = LineBuffer::new("data a;\nset b;\nrun;\ntail");
        buf.blank(Span { start: 0, end: 3 }, "data a;\nset b;\nrun;");
        assert_eq!(buf.line(0), Some(""));
        assert_eq!(buf.line(1), Some(""));
        assert_eq!(buf.line(2), Some(""));
        assert_eq!(buf.line(3), Some("tail"));
    }

    #[test]
    fn extraction_ratio_counts_only_originally_non_blank() {
        let mut buf = LineBuffer::new("a;\n\nb;\n");
        assert_eq!(buf.original_non_blank(), 2);
        buf.blank(Span { start: 0, end: 1 }, "a;");
        assert!((buf.extraction_ratio() - 0.5).abs() < f64::EPSILON);
        buf.blank(Span { start: 2, end: 3 }, "b;");
        assert!((buf.extraction_ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_buffer_ratio_is_one() {
        let buf = LineBuffer::new("\n\n");
        assert!((buf.extraction_ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn to_text_round_trips_lines() {
        let buf = LineBuffer::new("one\ntwo");
        assert_eq!(buf.to_text(), "one\ntwo\n");
    }
}
