//! Line splitter and line classifiers for the block scanner.
//!
//! Lines borrow directly from the input. Terminators are located with
//! `memchr2`: `\n`, `\r\n` and a lone `\r` each end a line. Input that is
//! empty or ends with a terminator yields one final empty line, so every
//! input produces at least one line.

use memchr::memchr2;

use crate::span::Span;

/// Characters a line-bound payload may not contain.
#[inline]
pub(crate) fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Whitespace stripped when trimming line text: Unicode white space other
/// than NEL, plus the information separators U+001C to U+001F.
#[inline]
fn is_trim_space(c: char) -> bool {
    matches!(c, '\u{1C}'..='\u{1F}') || (c.is_whitespace() && c != '\u{85}')
}

#[inline]
fn trim(text: &str) -> &str {
    text.trim_matches(is_trim_space)
}

/// ASCII whitespace as accepted after list numbers and rule markers.
#[inline]
fn is_marker_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0B' | b'\x0C' | b'\r')
}

/// A single line from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// The line text, without its terminator.
    pub text: &'a str,
    /// Byte span of `text` in the original input.
    pub span: Span,
    /// 1-based line number.
    pub number: usize,
}

impl<'a> Line<'a> {
    /// Check if this line is empty after trimming.
    #[inline]
    pub fn is_blank(&self) -> bool {
        trim(self.text).is_empty()
    }

    #[inline]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.text.as_bytes().starts_with(prefix.as_bytes())
    }

    /// Header level and trimmed title for lines starting with `#`.
    ///
    /// There is no upper bound on the level and no space is required after
    /// the hashes: `#Title` is a level 1 header.
    pub fn header(&self) -> Option<(usize, &'a str)> {
        if !self.starts_with("#") {
            return None;
        }
        let level = self.text.bytes().take_while(|&b| b == b'#').count();
        Some((level, trim(&self.text[level..])))
    }

    #[inline]
    pub fn is_fence(&self) -> bool {
        self.starts_with("```")
    }

    /// Info string after an opening fence, `None` when blank.
    pub fn fence_language(&self) -> Option<&'a str> {
        let info = trim(self.text.strip_prefix("```")?);
        (!info.is_empty()).then_some(info)
    }

    /// Item text for `- `, `* ` and `+ ` bullets.
    pub fn unordered_item(&self) -> Option<&'a str> {
        match self.text.as_bytes() {
            [b'-' | b'*' | b'+', b' ', ..] => Some(trim(&self.text[2..])),
            _ => None,
        }
    }

    /// Item text for `<digits>.<whitespace>` lines, prefix removed.
    pub fn ordered_item(&self) -> Option<&'a str> {
        let bytes = self.text.as_bytes();
        let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 || bytes.get(digits) != Some(&b'.') {
            return None;
        }
        let after_dot = digits + 1;
        let spaces = bytes[after_dot..]
            .iter()
            .take_while(|&&b| is_marker_space(b))
            .count();
        if spaces == 0 {
            return None;
        }
        let item = &self.text[after_dot + spaces..];
        if item.contains(is_line_break) {
            return None;
        }
        Some(item)
    }

    /// Quoted text for `> ` lines, trimmed.
    pub fn blockquote_content(&self) -> Option<&'a str> {
        self.text.strip_prefix("> ").map(trim)
    }

    /// Three or more `-`, `*` or `_` with nothing but trailing whitespace.
    pub fn is_horizontal_rule(&self) -> bool {
        let bytes = self.text.as_bytes();
        let Some(&marker) = bytes.first() else {
            return false;
        };
        if !matches!(marker, b'-' | b'*' | b'_') {
            return false;
        }
        let run = bytes.iter().take_while(|&&b| b == marker).count();
        run >= 3 && bytes[run..].iter().all(|&b| is_marker_space(b))
    }
}

/// Line reader with one line of lookahead.
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    /// Byte offset of the next unread line.
    offset: usize,
    /// Number of lines read so far.
    line_number: usize,
    /// Set once the final line has been produced.
    finished: bool,
    peeked: Option<Line<'a>>,
}

impl<'a> Lexer<'a> {
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            offset: 0,
            line_number: 0,
            finished: false,
            peeked: None,
        }
    }

    /// Peek at the next line without consuming it.
    #[inline]
    pub fn peek_line(&mut self) -> Option<&Line<'a>> {
        if self.peeked.is_none() {
            self.peeked = self.read_line();
        }
        self.peeked.as_ref()
    }

    /// Consume and return the next line.
    #[inline]
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        if let Some(line) = self.peeked.take() {
            return Some(line);
        }
        self.read_line()
    }

    /// Consume the next line only if `pred` accepts it.
    pub fn next_line_if(&mut self, pred: impl FnOnce(&Line<'a>) -> bool) -> Option<Line<'a>> {
        match self.peek_line() {
            Some(line) if pred(line) => self.next_line(),
            _ => None,
        }
    }

    fn read_line(&mut self) -> Option<Line<'a>> {
        if self.finished {
            return None;
        }

        let start = self.offset;
        let text_end = match memchr2(b'\n', b'\r', &self.bytes[start..]) {
            Some(pos) => {
                let end = start + pos;
                let crlf = self.bytes[end] == b'\r' && self.bytes.get(end + 1) == Some(&b'\n');
                self.offset = if crlf { end + 2 } else { end + 1 };
                end
            }
            None => {
                self.offset = self.bytes.len();
                self.finished = true;
                self.bytes.len()
            }
        };

        self.line_number += 1;
        Some(Line {
            text: &self.input[start..text_end],
            span: Span::new(start, text_end),
            number: self.line_number,
        })
    }
}
