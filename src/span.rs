use colored::Colorize;

use crate::lexer::Location;

/// A source range, used on every AST node so later phases can point back
/// at the text that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(start: Location, end: Location) -> Self {
        Span { start, end }
    }

    pub fn point(loc: Location) -> Self {
        Span {
            start: loc,
            end: loc,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }

    /// Renders a source snippet with the span underlined in red, the way
    /// the teacher's diagnostics print a caret under the offending text.
    pub fn render(&self, source: &str, message: impl AsRef<str>) -> String {
        let lines: Vec<&str> = source.lines().collect();
        let line_idx = self.start.line.saturating_sub(1);
        let Some(line_text) = lines.get(line_idx) else {
            return format!("{}: {}", self.start, message.as_ref());
        };

        let margin = format!("{}", self.start.line).len();
        let margin_fill = " ".repeat(margin);
        let caret_pad = " ".repeat(self.start.column.saturating_sub(1));
        let caret_len = if self.end.line == self.start.line {
            (self.end.column.saturating_sub(self.start.column)).max(1)
        } else {
            1
        };
        let caret = "^".repeat(caret_len).red();

        format!(
            "{margin_fill} |\n{line} |{line_text}\n{margin_fill} |{caret_pad}{caret} {}",
            message.as_ref(),
            line = self.start.line,
        )
    }
}
