//! Diagnostics data model.
//!
//! Diagnostics are produced by the engine and attributed to a [`SourceFile`] (or to no file at
//! all, for option/global problems). Messages may be a tree of chained explanations, as when one
//! assignability error explains the nested property that caused it.

use crate::source::SourceFile;
use std::cmp::Ordering;
use std::sync::Arc;

/// Diagnostic categories reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCategory {
    /// Warning diagnostics.
    Warning,
    /// Error diagnostics.
    Error,
    /// Suggestion diagnostics.
    Suggestion,
    /// Informational messages.
    Message,
}

impl DiagnosticCategory {
    /// Parse the engine's lowercase category name (`"error"`, `"warning"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "suggestion" => Some(Self::Suggestion),
            "message" => Some(Self::Message),
            _ => None,
        }
    }
}

/// One node of a chained diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessageChain {
    /// Message text of this node.
    pub message_text: String,
    /// Nested explanations.
    pub next: Vec<DiagnosticMessageChain>,
}

impl DiagnosticMessageChain {
    /// Create a leaf node.
    pub fn new(message_text: impl Into<String>) -> Self {
        Self {
            message_text: message_text.into(),
            next: Vec::new(),
        }
    }

    /// Append a nested explanation.
    pub fn with_next(mut self, next: DiagnosticMessageChain) -> Self {
        self.next.push(next);
        self
    }
}

/// A diagnostic message: plain text or a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticMessage {
    /// Already-flat text (may still contain newlines).
    Text(String),
    /// A tree of chained messages.
    Chain(DiagnosticMessageChain),
}

impl DiagnosticMessage {
    /// Flatten the message into one string, joining chain levels with `new_line`.
    ///
    /// Each nested level starts on a new line indented by two spaces per depth.
    pub fn flatten(&self, new_line: &str) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Chain(chain) => {
                let mut out = String::new();
                flatten_chain(chain, new_line, 0, &mut out);
                out
            }
        }
    }

    /// The first line of the flattened message.
    pub fn first_line(&self) -> String {
        let flat = self.flatten("\n");
        match flat.split_once('\n') {
            Some((first, _)) => first.to_string(),
            None => flat,
        }
    }
}

impl From<&str> for DiagnosticMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for DiagnosticMessage {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<DiagnosticMessageChain> for DiagnosticMessage {
    fn from(chain: DiagnosticMessageChain) -> Self {
        Self::Chain(chain)
    }
}

fn flatten_chain(chain: &DiagnosticMessageChain, new_line: &str, indent: usize, out: &mut String) {
    if indent > 0 {
        out.push_str(new_line);
        for _ in 0..indent {
            out.push_str("  ");
        }
    }
    out.push_str(&chain.message_text);
    for next in &chain.next {
        flatten_chain(next, new_line, indent + 1, out);
    }
}

/// A single syntactic or semantic problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file the diagnostic belongs to (`None` for option/global diagnostics).
    pub file: Option<Arc<SourceFile>>,
    /// Start offset in UTF-16 code units.
    pub start: Option<usize>,
    /// Length in UTF-16 code units.
    pub length: Option<usize>,
    /// Engine diagnostic code (e.g. `2322`).
    pub code: u32,
    /// Diagnostic category.
    pub category: DiagnosticCategory,
    /// Diagnostic message.
    pub message: DiagnosticMessage,
}

impl Diagnostic {
    /// Create an error diagnostic attached to `file`.
    pub fn error(
        file: Arc<SourceFile>,
        start: usize,
        length: usize,
        code: u32,
        message: impl Into<DiagnosticMessage>,
    ) -> Self {
        Self {
            file: Some(file),
            start: Some(start),
            length: Some(length),
            code,
            category: DiagnosticCategory::Error,
            message: message.into(),
        }
    }

    /// Create a diagnostic that is not attached to any file.
    pub fn global(
        code: u32,
        category: DiagnosticCategory,
        message: impl Into<DiagnosticMessage>,
    ) -> Self {
        Self {
            file: None,
            start: None,
            length: None,
            code,
            category,
            message: message.into(),
        }
    }

    /// Name of the owning file, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.file.as_deref().map(SourceFile::file_name)
    }
}

/// Total order used by the engine for pre-emit diagnostics.
///
/// File name (file-less first), then start, length, code, and finally flattened message text.
/// Missing values sort before present ones.
pub fn compare_diagnostics(a: &Diagnostic, b: &Diagnostic) -> Ordering {
    a.file_name()
        .cmp(&b.file_name())
        .then_with(|| a.start.cmp(&b.start))
        .then_with(|| a.length.cmp(&b.length))
        .then_with(|| a.code.cmp(&b.code))
        .then_with(|| a.message.flatten("\n").cmp(&b.message.flatten("\n")))
}

/// Sort `diagnostics` with [`compare_diagnostics`] and drop adjacent duplicates.
pub fn sort_and_deduplicate(mut diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    diagnostics.sort_by(compare_diagnostics);
    diagnostics.dedup_by(|b, a| compare_diagnostics(a, b) == Ordering::Equal);
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptTarget;

    fn file(name: &str) -> Arc<SourceFile> {
        Arc::new(SourceFile::new(name, "", ScriptTarget::default()))
    }

    #[test]
    fn test_flatten_chain_indents_nested_levels() {
        let chain = DiagnosticMessageChain::new("Type '{ a: string; }' is not assignable.")
            .with_next(
                DiagnosticMessageChain::new("Types of property 'a' are incompatible.")
                    .with_next(DiagnosticMessageChain::new("'string' is not 'number'.")),
            );
        let message = DiagnosticMessage::from(chain);

        assert_eq!(
            message.flatten("\n"),
            "Type '{ a: string; }' is not assignable.\n  Types of property 'a' are incompatible.\n    'string' is not 'number'."
        );
        assert_eq!(
            message.first_line(),
            "Type '{ a: string; }' is not assignable."
        );
    }

    #[test]
    fn test_first_line_of_plain_text() {
        assert_eq!(DiagnosticMessage::from("one\ntwo").first_line(), "one");
        assert_eq!(DiagnosticMessage::from("only").first_line(), "only");
        assert_eq!(DiagnosticMessage::from("").first_line(), "");
    }

    #[test]
    fn test_category_names() {
        assert_eq!(
            DiagnosticCategory::from_name("error"),
            Some(DiagnosticCategory::Error)
        );
        assert_eq!(DiagnosticCategory::from_name("fatal"), None);
    }

    #[test]
    fn test_sort_orders_by_file_then_position() {
        let a = file("a.ts");
        let b = file("b.ts");
        let diagnostics = vec![
            Diagnostic::error(b.clone(), 0, 1, 1005, "b0"),
            Diagnostic::error(a.clone(), 10, 1, 2322, "a10"),
            Diagnostic::global(5023, DiagnosticCategory::Error, "global"),
            Diagnostic::error(a.clone(), 2, 3, 2304, "a2"),
        ];

        let sorted = sort_and_deduplicate(diagnostics);
        let order: Vec<_> = sorted.iter().map(|d| d.message.flatten("\n")).collect();
        assert_eq!(order, vec!["global", "a2", "a10", "b0"]);
    }

    #[test]
    fn test_sort_removes_exact_duplicates_only() {
        let a = file("a.ts");
        let diagnostics = vec![
            Diagnostic::error(a.clone(), 2, 3, 2304, "dup"),
            Diagnostic::error(a.clone(), 2, 3, 2304, "dup"),
            Diagnostic::error(a.clone(), 2, 3, 2304, "other"),
        ];

        let sorted = sort_and_deduplicate(diagnostics);
        assert_eq!(sorted.len(), 2);
    }
}
