//! Appendable DDL text buffer.

use std::fmt;

/// Ordered buffer of DDL statements.
///
/// Text is appended piecewise into the current statement; `end_of_statement`
/// completes it with the terminator and records it in [`DdlBuffer::statements`].
/// `end` writes a blank line separating logical groups (one per table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlBuffer {
    terminator: String,
    content: String,
    current: String,
    statements: Vec<String>,
}

impl Default for DdlBuffer {
    fn default() -> Self {
        Self::new(";")
    }
}

impl DdlBuffer {
    pub fn new(terminator: impl Into<String>) -> Self {
        Self {
            terminator: terminator.into(),
            content: String::new(),
            current: String::new(),
            statements: Vec::new(),
        }
    }

    pub fn append(&mut self, text: &str) -> &mut Self {
        self.current.push_str(text);
        self
    }

    /// Append `text` padded with spaces to `width`, always leaving one space.
    pub fn append_padded(&mut self, text: &str, width: usize) -> &mut Self {
        self.current.push_str(text);
        let len = text.chars().count();
        let pad = if len < width { width - len } else { 1 };
        self.current.extend(std::iter::repeat(' ').take(pad));
        self
    }

    /// Append with a leading space unless `text` is empty.
    pub fn append_with_space(&mut self, text: &str) -> &mut Self {
        if !text.is_empty() {
            self.current.push(' ');
            self.current.push_str(text);
        }
        self
    }

    pub fn new_line(&mut self) -> &mut Self {
        self.current.push('\n');
        self
    }

    /// Complete the current statement with the terminator.
    pub fn end_of_statement(&mut self) -> &mut Self {
        let statement = std::mem::take(&mut self.current);
        let statement = statement.trim_end();
        if !statement.is_empty() {
            self.content.push_str(statement);
            self.content.push_str(&self.terminator);
            self.content.push('\n');
            self.statements.push(statement.to_string());
        }
        self
    }

    /// Append a complete statement that carries its own delimiters
    /// (trigger bodies using `delimiter`), written without a terminator.
    pub fn append_block(&mut self, block: &str) -> &mut Self {
        let block = block.trim_end();
        if !block.is_empty() {
            self.content.push_str(block);
            self.content.push('\n');
            self.statements.push(block.to_string());
        }
        self
    }

    /// Blank line separating groups; nothing when the buffer is empty.
    pub fn end(&mut self) -> &mut Self {
        if !self.content.is_empty() && !self.content.ends_with("\n\n") {
            self.content.push('\n');
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.current.is_empty()
    }

    /// Rendered text of all completed statements
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Completed statements without terminators, in insertion order
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Position of the first statement starting with `prefix`
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.statements.iter().position(|s| s.starts_with(prefix))
    }
}

impl fmt::Display for DdlBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}
