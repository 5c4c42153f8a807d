//! Indentation-aware text builder for generated source.

/// Builds source text line by line, tracking brace nesting.
#[derive(Debug, Clone)]
pub struct SourceBuilder {
    content: String,
    indent_level: usize,
    indent: &'static str,
}

impl Default for SourceBuilder {
    fn default() -> Self {
        Self::new("    ")
    }
}

impl SourceBuilder {
    /// Creates an empty builder using `indent` for each nesting level.
    pub fn new(indent: &'static str) -> Self {
        Self {
            content: String::new(),
            indent_level: 0,
            indent,
        }
    }

    /// Appends one indented line. Empty input produces an unindented blank
    /// line, so the output carries no trailing whitespace.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent_level {
                self.content.push_str(self.indent);
            }
            self.content.push_str(text);
        }
        self.content.push('\n');
        self
    }

    /// Appends a blank line.
    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Increases nesting by one level.
    pub fn indent(&mut self) -> &mut Self {
        self.indent_level += 1;
        self
    }

    /// Decreases nesting by one level.
    pub fn dedent(&mut self) -> &mut Self {
        self.indent_level = self.indent_level.saturating_sub(1);
        self
    }

    /// Writes `header`, then `{` on its own line, and indents.
    pub fn open(&mut self, header: impl AsRef<str>) -> &mut Self {
        self.line(header);
        self.line("{");
        self.indent()
    }

    /// Dedents and writes `}` followed by `suffix`.
    pub fn close_with(&mut self, suffix: &str) -> &mut Self {
        self.dedent();
        self.line(format!("}}{suffix}"))
    }

    /// Dedents and writes `}`.
    pub fn close(&mut self) -> &mut Self {
        self.close_with("")
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.indent_level
    }

    /// Returns the accumulated text.
    pub fn build(self) -> String {
        self.content
    }
}
