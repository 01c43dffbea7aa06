//! Precedence-ordered inline tokenizer.
//!
//! Each pass evaluates every [`Construct`] against the unconsumed text and
//! keeps the earliest match, breaking ties by priority. Plain text before the
//! match is emitted, the match is emitted, and scanning resumes after it.
//!
//! Delimiter scanning is hand-rolled with `memchr`. Emphasis payloads are
//! lazy (the nearest closing delimiter wins), never empty, and never cross a
//! line break.
//!
//! Bold and italic matches are re-tokenized. If the inner text contains a
//! link, the emphasis dissolves and the inner elements are spliced in its
//! place; otherwise the element is kept with its inner text verbatim.

use std::borrow::Cow;

use memchr::{memchr, memmem};

use crate::ast::{Inline, Link};
use crate::lexer::is_line_break;

/// Nesting limit used by [`tokenize`] and by `Parser::default()`.
pub const DEFAULT_MAX_NESTING: usize = 50;

/// Tokenize a single line with the default nesting limit.
///
/// ```rust
/// use chatmark_core::{tokenize, Inline};
///
/// assert_eq!(
///     tokenize("a **x** b"),
///     vec![
///         Inline::PlainText("a ".into()),
///         Inline::BoldText("x".into()),
///         Inline::PlainText(" b".into()),
///     ]
/// );
/// ```
pub fn tokenize(text: &str) -> Vec<Inline<'_>> {
    InlineTokenizer::new(DEFAULT_MAX_NESTING).tokenize(text)
}

/// Inline constructs in priority order, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    Link,
    BoldItalic,
    BoldStars,
    BoldUnderscores,
    Code,
    Strikethrough,
    ItalicStar,
    ItalicUnderscore,
}

impl Construct {
    pub const PRIORITY: [Construct; 8] = [
        Construct::Link,
        Construct::BoldItalic,
        Construct::BoldStars,
        Construct::BoldUnderscores,
        Construct::Code,
        Construct::Strikethrough,
        Construct::ItalicStar,
        Construct::ItalicUnderscore,
    ];

    /// Leftmost match of this construct in `text`.
    pub fn find(self, text: &str) -> Option<Match<'_>> {
        let found = match self {
            Construct::Link => find_link(text),
            Construct::BoldItalic => find_lazy(text, b"***"),
            Construct::BoldStars => find_lazy(text, b"**"),
            Construct::BoldUnderscores => find_lazy(text, b"__"),
            Construct::Code => find_code(text),
            Construct::Strikethrough => find_lazy(text, b"~~"),
            Construct::ItalicStar => find_single(text, b'*'),
            Construct::ItalicUnderscore => find_single(text, b'_'),
        };
        found.map(|(start, end, payload, url)| Match {
            construct: self,
            start,
            end,
            payload,
            url,
        })
    }

    /// Whether a match is re-tokenized to look for nested links.
    #[inline]
    fn reexamines(self) -> bool {
        matches!(
            self,
            Construct::BoldStars
                | Construct::BoldUnderscores
                | Construct::ItalicStar
                | Construct::ItalicUnderscore
        )
    }
}

/// A construct located in a text span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub construct: Construct,
    /// Byte offset of the opening delimiter.
    pub start: usize,
    /// Byte offset just past the closing delimiter.
    pub end: usize,
    /// Text between the delimiters (the label, for links).
    pub payload: &'a str,
    /// Link destination; empty for other constructs.
    pub url: &'a str,
}

impl<'a> Match<'a> {
    fn into_inline(self) -> Inline<'a> {
        let text = Cow::Borrowed(self.payload);
        match self.construct {
            Construct::Link => Inline::Link(Link::new(self.payload, self.url)),
            Construct::BoldItalic => Inline::BoldItalicText(text),
            Construct::BoldStars | Construct::BoldUnderscores => Inline::BoldText(text),
            Construct::Code => Inline::InlineCode(text),
            Construct::Strikethrough => Inline::Strikethrough(text),
            Construct::ItalicStar | Construct::ItalicUnderscore => Inline::ItalicText(text),
        }
    }
}

/// Earliest match across all constructs; ties go to the higher priority.
pub fn find_best_match(text: &str) -> Option<Match<'_>> {
    let mut best: Option<Match<'_>> = None;
    for construct in Construct::PRIORITY {
        if let Some(found) = construct.find(text) {
            if best.map_or(true, |b| found.start < b.start) {
                best = Some(found);
            }
        }
    }
    best
}

/// Tokenizer with a recursion limit for nested emphasis.
#[derive(Debug, Clone)]
pub struct InlineTokenizer {
    max_nesting: usize,
    limit_reached: bool,
}

impl InlineTokenizer {
    pub fn new(max_nesting: usize) -> Self {
        Self {
            max_nesting,
            limit_reached: false,
        }
    }

    /// Whether any emphasis was left unexamined because of the limit.
    pub fn limit_reached(&self) -> bool {
        self.limit_reached
    }

    pub fn tokenize<'a>(&mut self, text: &'a str) -> Vec<Inline<'a>> {
        self.tokenize_at(text, 0)
    }

    fn tokenize_at<'a>(&mut self, text: &'a str, depth: usize) -> Vec<Inline<'a>> {
        let mut inlines = Vec::with_capacity(4);
        let mut rest = text;

        while !rest.is_empty() {
            let Some(found) = find_best_match(rest) else {
                inlines.push(Inline::PlainText(Cow::Borrowed(rest)));
                break;
            };

            log::trace!(
                "inline {:?} at {}..{} (depth {})",
                found.construct,
                found.start,
                found.end,
                depth
            );

            if found.start > 0 {
                inlines.push(Inline::PlainText(Cow::Borrowed(&rest[..found.start])));
            }
            self.emit(found, depth, &mut inlines);
            rest = &rest[found.end..];
        }

        if inlines.is_empty() {
            inlines.push(Inline::PlainText(Cow::Borrowed(text)));
        }
        inlines
    }

    fn emit<'a>(&mut self, found: Match<'a>, depth: usize, out: &mut Vec<Inline<'a>>) {
        if !found.construct.reexamines() {
            out.push(found.into_inline());
            return;
        }

        if depth >= self.max_nesting {
            log::warn!(
                "emphasis nesting limit of {} reached, keeping {:?} unexamined",
                self.max_nesting,
                found.construct
            );
            self.limit_reached = true;
            out.push(found.into_inline());
            return;
        }

        let nested = self.tokenize_at(found.payload, depth + 1);
        if nested.iter().any(Inline::is_link) {
            out.extend(nested);
        } else {
            out.push(found.into_inline());
        }
    }
}

type Found<'a> = (usize, usize, &'a str, &'a str);

/// `[label](url)` with a non-empty label free of `]` and a non-empty url
/// free of `)`.
fn find_link(text: &str) -> Option<Found<'_>> {
    let bytes = text.as_bytes();
    let mut from = 0;

    while let Some(offset) = memchr(b'[', &bytes[from..]) {
        let open = from + offset;
        let label_start = open + 1;
        // No `]` after this bracket means none after any later one either.
        let close = label_start + memchr(b']', &bytes[label_start..])?;

        if close > label_start && bytes.get(close + 1) == Some(&b'(') {
            let url_start = close + 2;
            let paren = url_start + memchr(b')', &bytes[url_start..])?;
            if paren > url_start {
                return Some((
                    open,
                    paren + 1,
                    &text[label_start..close],
                    &text[url_start..paren],
                ));
            }
        }
        from = open + 1;
    }

    None
}

/// `` `code` `` with at least one non-backtick character. Code may span lines.
fn find_code(text: &str) -> Option<Found<'_>> {
    let bytes = text.as_bytes();
    let mut from = 0;

    while let Some(offset) = memchr(b'`', &bytes[from..]) {
        let open = from + offset;
        let close = open + 1 + memchr(b'`', &bytes[open + 1..])?;
        if close > open + 1 {
            return Some((open, close + 1, &text[open + 1..close], ""));
        }
        // Empty pair: the second backtick may open the next span.
        from = close;
    }

    None
}

/// Symmetric delimiter with a lazy, single-line, non-empty payload.
fn find_lazy<'a>(text: &'a str, delim: &[u8]) -> Option<Found<'a>> {
    let bytes = text.as_bytes();
    let width = delim.len();
    let mut from = 0;

    while let Some(offset) = memmem::find(&bytes[from..], delim) {
        let open = from + offset;
        let content_start = open + width;
        // Skip one byte so the payload is never empty.
        let search_from = content_start + 1;
        let close = search_from + memmem::find(bytes.get(search_from..)?, delim)?;

        let payload = &text[content_start..close];
        match payload.char_indices().find(|&(_, c)| is_line_break(c)) {
            None => return Some((open, close + width, payload, "")),
            // Every opener before the break would have to span it.
            Some((at, c)) => from = content_start + at + c.len_utf8(),
        }
    }

    None
}

/// Single-character delimiter that must not touch another copy of itself:
/// the opener is not preceded by `delim`, the closer is not followed by it.
fn find_single(text: &str, delim: u8) -> Option<Found<'_>> {
    let bytes = text.as_bytes();
    let mut from = 0;

    while let Some(offset) = memchr(delim, &bytes[from..]) {
        let open = from + offset;
        if open > 0 && bytes[open - 1] == delim {
            from = open + 1;
            continue;
        }

        let content_start = open + 1;
        let mut search = content_start + 1;
        let close = loop {
            let candidate = search + memchr(delim, bytes.get(search..)?)?;
            if bytes.get(candidate + 1) != Some(&delim) {
                break candidate;
            }
            search = candidate + 1;
        };

        let payload = &text[content_start..close];
        match payload.char_indices().find(|&(_, c)| is_line_break(c)) {
            None => return Some((open, close + 1, payload, "")),
            Some((at, c)) => from = content_start + at + c.len_utf8(),
        }
    }

    None
}
