//! # chatmark core
//!
//! A small, deterministic Markdown-subset parser for chat message content.
//!
//! Input is turned into a flat sequence of blocks (headers, paragraphs,
//! fenced code, lists, quotes, rules, empty lines). Paragraph lines are split
//! into inline elements: links, bold, italic, bold-italic, inline code and
//! strikethrough. Parsing is total: every string yields at least one block,
//! and malformed markup degrades to plain text.
//!
//! ## Quick Start
//!
//! ```rust
//! use chatmark_core::{parse, Block, Inline};
//!
//! let blocks = parse("# Hello\n\nSome **bold** text.");
//! assert_eq!(blocks.len(), 3);
//!
//! if let Block::Paragraph(p) = &blocks[2] {
//!     assert_eq!(p.content[1], Inline::BoldText("bold".into()));
//! }
//! ```
//!
//! ## Diagnostics
//!
//! ```rust
//! use chatmark_core::{DiagnosticKind, Parser};
//!
//! let result = Parser::new().parse_with_diagnostics("```rust\nfn main() {}");
//! assert_eq!(result.document.blocks.len(), 1);
//! assert_eq!(
//!     result.diagnostics.count(DiagnosticKind::UnterminatedCodeFence),
//!     1
//! );
//! ```
//!
//! ## Links inside emphasis
//!
//! Bold and italic spans that contain a link dissolve so the link stays
//! reachable:
//!
//! ```rust
//! use chatmark_core::{tokenize, Inline, Link};
//!
//! let inlines = tokenize("*see [link](url) here*");
//! assert!(inlines.contains(&Inline::Link(Link::new("link", "url"))));
//! assert!(!inlines.iter().any(|i| matches!(i, Inline::ItalicText(_))));
//! ```

pub mod ast;
pub mod diagnostic;
pub mod inline;
pub mod lexer;
pub mod link;
pub mod parser;
pub mod span;

pub use ast::{
    plain_text, Block, Blockquote, CodeBlock, CowStr, Document, Header, Inline, Link, List,
    Paragraph,
};
pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use inline::tokenize;
pub use link::LinkTarget;
pub use parser::{ParseResult, Parser};

/// Parse `input` with the default configuration. Never fails.
pub fn parse(input: &str) -> Vec<Block<'_>> {
    Parser::new().parse(input)
}
