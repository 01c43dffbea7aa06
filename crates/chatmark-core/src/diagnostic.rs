//! Non-fatal findings recorded while parsing.
//!
//! Parsing never fails. When input is degraded into a lower-fidelity tree
//! (an unclosed fence, emphasis nested past the configured limit) the parser
//! records a [`Diagnostic`] next to the document instead.

use thiserror::Error;

use crate::span::Span;

/// Diagnostic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A code fence was opened but never closed; the block ran to end of input.
    UnterminatedCodeFence,
    /// Emphasis nesting exceeded the parser's limit and was kept unexamined.
    NestingLimit,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::UnterminatedCodeFence => "unterminated-code-fence",
            DiagnosticKind::NestingLimit => "nesting-limit",
        }
    }
}

/// A single finding with the source location it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (line {line})")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// 1-based line the finding refers to.
    pub line: usize,
    pub span: Span,
}

impl Diagnostic {
    pub fn unterminated_code_fence(line: usize, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::UnterminatedCodeFence,
            message: "code fence is never closed".to_string(),
            line,
            span,
        }
    }

    pub fn nesting_limit(limit: usize, line: usize, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::NestingLimit,
            message: format!("emphasis nested deeper than {limit} levels was not expanded"),
            line,
            span,
        }
    }
}

/// Diagnostics in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of diagnostics of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'d> IntoIterator for &'d Diagnostics {
    type Item = &'d Diagnostic;
    type IntoIter = std::slice::Iter<'d, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
