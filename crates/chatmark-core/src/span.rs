//! Byte ranges into the parsed input.
//!
//! Element nodes do not carry spans; spans locate lines and diagnostics.

/// A half-open byte range `[start, end)` in the source text.
///
/// # Example
///
/// ```rust
/// use chatmark_core::span::Span;
///
/// let span = Span::new(4, 10);
/// assert_eq!(span.len(), 6);
/// assert_eq!(span.slice("abc\ndefghi\n"), "defghi");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Starting byte offset (inclusive).
    pub start: usize,
    /// Ending byte offset (exclusive).
    pub end: usize,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Smallest span covering both `self` and `other`.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The text this span covers, or `""` if it does not fit `source`.
    #[inline]
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_covers_both() {
        let merged = Span::new(10, 14).merge(Span::new(2, 5));
        assert_eq!(merged, Span::new(2, 14));
    }

    #[test]
    fn test_empty_span() {
        assert!(Span::new(3, 3).is_empty());
        assert_eq!(Span::new(5, 3).len(), 0);
    }

    #[test]
    fn test_slice_out_of_range_is_empty() {
        assert_eq!(Span::new(2, 50).slice("short"), "");
    }
}
