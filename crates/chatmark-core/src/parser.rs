//! Line-oriented block scanner.
//!
//! Each line is classified by the first matching rule, in order: header,
//! code fence, bullet, numbered item, quote, horizontal rule, paragraph,
//! empty line. Lists and quotes absorb the run of lines that follow with the
//! same shape. Every branch appends exactly one block, so the result is never
//! empty.

use std::borrow::Cow;

use crate::ast::{Block, Blockquote, CodeBlock, Document, Header, Inline, List, Paragraph};
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::inline::{InlineTokenizer, DEFAULT_MAX_NESTING};
use crate::lexer::{Lexer, Line};

/// Parse result with diagnostics for any degraded input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult<'a> {
    pub document: Document<'a>,
    pub diagnostics: Diagnostics,
}

impl ParseResult<'_> {
    /// True when the input parsed without degradation.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Block and inline parser.
///
/// A `Parser` holds only configuration, so one instance can be shared
/// across threads and reused for any number of inputs.
///
/// ```rust
/// use chatmark_core::{Block, Parser};
///
/// let parser = Parser::new().with_max_nesting(8);
/// let blocks = parser.parse("### Title");
/// assert!(matches!(&blocks[0], Block::Header(h) if h.level == 3 && h.text == "Title"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parser {
    max_nesting: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    #[inline]
    pub fn new() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    /// Set how deep bold and italic spans are re-examined for nested links.
    ///
    /// Past the limit an emphasis element is kept as-is. Zero disables
    /// re-examination entirely.
    pub fn with_max_nesting(mut self, depth: usize) -> Self {
        self.max_nesting = depth;
        self
    }

    #[inline]
    pub fn max_nesting(&self) -> usize {
        self.max_nesting
    }

    /// Parse into blocks. Never fails.
    pub fn parse<'a>(&self, input: &'a str) -> Vec<Block<'a>> {
        self.parse_with_diagnostics(input).document.blocks
    }

    /// Parse, also reporting where the input was degraded.
    pub fn parse_with_diagnostics<'a>(&self, input: &'a str) -> ParseResult<'a> {
        let mut scanner = BlockScanner {
            lexer: Lexer::new(input),
            input,
            max_nesting: self.max_nesting,
            diagnostics: Diagnostics::new(),
        };
        let blocks = scanner.scan_blocks();
        ParseResult {
            document: Document::new(blocks),
            diagnostics: scanner.diagnostics,
        }
    }

    /// Tokenize one line of paragraph text with this parser's nesting limit.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<Inline<'a>> {
        InlineTokenizer::new(self.max_nesting).tokenize(text)
    }
}

struct BlockScanner<'a> {
    lexer: Lexer<'a>,
    input: &'a str,
    max_nesting: usize,
    diagnostics: Diagnostics,
}

impl<'a> BlockScanner<'a> {
    fn scan_blocks(&mut self) -> Vec<Block<'a>> {
        let mut blocks = Vec::with_capacity(16);

        while let Some(line) = self.lexer.next_line() {
            let block = self.scan_block(line);
            log::debug!("line {}: {}", line.number, block.name());
            blocks.push(block);
        }

        blocks
    }

    fn scan_block(&mut self, line: Line<'a>) -> Block<'a> {
        if let Some((level, text)) = line.header() {
            return Block::Header(Header {
                text: Cow::Borrowed(text),
                level,
            });
        }
        if line.is_fence() {
            return self.parse_code_block(line);
        }
        if let Some(first) = line.unordered_item() {
            return Block::UnorderedList(self.collect_run(first, Line::unordered_item));
        }
        if let Some(first) = line.ordered_item() {
            return Block::OrderedList(self.collect_run(first, Line::ordered_item));
        }
        if let Some(first) = line.blockquote_content() {
            return self.parse_blockquote(first);
        }
        if line.is_horizontal_rule() {
            return Block::HorizontalRule;
        }
        if !line.is_blank() {
            return self.parse_paragraph(line);
        }
        Block::EmptyLine
    }

    /// Lines up to the closing fence, or to end of input if there is none.
    fn parse_code_block(&mut self, open: Line<'a>) -> Block<'a> {
        let language = open.fence_language().map(Cow::Borrowed);
        let mut body: Vec<Line<'a>> = Vec::new();
        let mut closed = false;

        while let Some(line) = self.lexer.next_line() {
            if line.is_fence() {
                closed = true;
                break;
            }
            body.push(line);
        }

        if !closed {
            log::warn!("code fence opened on line {} is never closed", open.number);
            self.diagnostics
                .push(Diagnostic::unterminated_code_fence(open.number, open.span));
        }

        Block::CodeBlock(CodeBlock {
            code: self.join_code(&body),
            language,
        })
    }

    /// Borrow the body when it is a contiguous `\n`-separated slice of the
    /// input; rebuild it when any terminator was `\r\n` or a lone `\r`.
    fn join_code(&self, body: &[Line<'a>]) -> Cow<'a, str> {
        let (Some(first), Some(last)) = (body.first(), body.last()) else {
            return Cow::Borrowed("");
        };
        let slice = first.span.merge(last.span).slice(self.input);
        if slice.contains('\r') {
            let lines: Vec<&str> = body.iter().map(|l| l.text).collect();
            Cow::Owned(lines.join("\n"))
        } else {
            Cow::Borrowed(slice)
        }
    }

    fn collect_run(
        &mut self,
        first: &'a str,
        item: fn(&Line<'a>) -> Option<&'a str>,
    ) -> List<'a> {
        let mut items = vec![Cow::Borrowed(first)];
        while let Some(line) = self.lexer.next_line_if(|l| item(l).is_some()) {
            if let Some(text) = item(&line) {
                items.push(Cow::Borrowed(text));
            }
        }
        List { items }
    }

    fn parse_blockquote(&mut self, first: &'a str) -> Block<'a> {
        let mut parts = vec![first];
        while let Some(line) = self.lexer.next_line_if(|l| l.blockquote_content().is_some()) {
            parts.extend(line.blockquote_content());
        }

        let content = if parts.len() == 1 {
            Cow::Borrowed(first)
        } else {
            Cow::Owned(parts.join(" "))
        };
        Block::Blockquote(Blockquote { content })
    }

    fn parse_paragraph(&mut self, line: Line<'a>) -> Block<'a> {
        let mut tokenizer = InlineTokenizer::new(self.max_nesting);
        let content = tokenizer.tokenize(line.text);
        if tokenizer.limit_reached() {
            self.diagnostics.push(Diagnostic::nesting_limit(
                self.max_nesting,
                line.number,
                line.span,
            ));
        }
        Block::Paragraph(Paragraph { content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticKind;
    use crate::span::Span;

    fn parse(input: &str) -> Vec<Block<'_>> {
        Parser::new().parse(input)
    }

    fn items<'a>(list: &[&'a str]) -> List<'a> {
        List {
            items: list.iter().map(|s| Cow::Borrowed(*s)).collect(),
        }
    }

    #[test]
    fn test_empty_input_is_single_empty_line() {
        assert_eq!(parse(""), vec![Block::EmptyLine]);
    }

    #[test]
    fn test_header() {
        assert_eq!(
            parse("### Title"),
            vec![Block::Header(Header {
                text: "Title".into(),
                level: 3
            })]
        );
    }

    #[test]
    fn test_list_run_boundaries() {
        let blocks = parse("- a\n- b\n\nPara");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], Block::UnorderedList(items(&["a", "b"])));
        assert_eq!(blocks[1], Block::EmptyLine);
        assert!(matches!(blocks[2], Block::Paragraph(_)));
    }

    #[test]
    fn test_mixed_bullets_form_one_run() {
        assert_eq!(
            parse("- a\n* b\n+ c"),
            vec![Block::UnorderedList(items(&["a", "b", "c"]))]
        );
    }

    #[test]
    fn test_ordered_then_unordered_are_separate_runs() {
        assert_eq!(
            parse("1. one\n2. two\n- dash"),
            vec![
                Block::OrderedList(items(&["one", "two"])),
                Block::UnorderedList(items(&["dash"])),
            ]
        );
    }

    #[test]
    fn test_unterminated_fence() {
        let result = Parser::new().parse_with_diagnostics("```py\ncode");
        assert_eq!(
            result.document.blocks,
            vec![Block::CodeBlock(CodeBlock {
                code: "code".into(),
                language: Some("py".into()),
            })]
        );
        let diagnostics: Vec<_> = result.diagnostics.iter().collect();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnterminatedCodeFence);
        assert_eq!(diagnostics[0].span, Span::new(0, 5));
    }

    #[test]
    fn test_code_block_borrows_lf_body() {
        let blocks = parse("```\na\nb\n```");
        match &blocks[0] {
            Block::CodeBlock(c) => {
                assert!(matches!(c.code, Cow::Borrowed("a\nb")));
                assert_eq!(c.language, None);
            }
            other => panic!("Expected code block, got {:?}", other),
        }
    }

    #[test]
    fn test_code_block_rebuilds_crlf_body() {
        let blocks = parse("```\r\na\r\nb\r\n```\r\n");
        assert_eq!(
            blocks,
            vec![
                Block::CodeBlock(CodeBlock {
                    code: "a\nb".into(),
                    language: None,
                }),
                Block::EmptyLine,
            ]
        );
    }

    #[test]
    fn test_code_block_rebuilds_cr_body() {
        assert_eq!(
            parse("```sh\ra\rb\n```"),
            vec![Block::CodeBlock(CodeBlock {
                code: "a\nb".into(),
                language: Some("sh".into()),
            })]
        );
    }

    #[test]
    fn test_lone_carriage_return_separates_blocks() {
        assert_eq!(
            parse("- a\r- b"),
            vec![Block::UnorderedList(items(&["a", "b"]))]
        );
        assert_eq!(
            parse("# Title\rbody"),
            vec![
                Block::Header(Header {
                    text: "Title".into(),
                    level: 1
                }),
                Block::Paragraph(Paragraph {
                    content: vec![Inline::PlainText("body".into())]
                }),
            ]
        );
    }

    #[test]
    fn test_information_separator_line_is_empty() {
        assert_eq!(parse("\u{1F}"), vec![Block::EmptyLine]);
        assert!(matches!(parse("\u{85}")[0], Block::Paragraph(_)));
    }

    #[test]
    fn test_empty_code_block() {
        let blocks = parse("```\n```");
        assert_eq!(
            blocks,
            vec![Block::CodeBlock(CodeBlock {
                code: "".into(),
                language: None,
            })]
        );
    }

    #[test]
    fn test_blockquote_lines_joined_with_space() {
        assert_eq!(
            parse("> first\n>  second "),
            vec![Block::Blockquote(Blockquote {
                content: "first second".into()
            })]
        );
    }

    #[test]
    fn test_star_bullet_beats_rule() {
        assert_eq!(
            parse("* * *"),
            vec![Block::UnorderedList(items(&["* *"]))]
        );
        assert_eq!(parse("***"), vec![Block::HorizontalRule]);
    }

    #[test]
    fn test_whitespace_only_line_is_empty() {
        assert_eq!(parse("   \t"), vec![Block::EmptyLine]);
    }

    #[test]
    fn test_paragraph_keeps_untrimmed_text() {
        assert_eq!(
            parse("  indented  "),
            vec![Block::Paragraph(Paragraph {
                content: vec![Inline::PlainText("  indented  ".into())]
            })]
        );
    }

    #[test]
    fn test_nesting_limit_reported_per_paragraph() {
        let parser = Parser::new().with_max_nesting(0);
        let result = parser.parse_with_diagnostics("*a [x](y)*\nplain\n**b**");
        assert_eq!(result.diagnostics.count(DiagnosticKind::NestingLimit), 2);
        let lines: Vec<usize> = result.diagnostics.into_iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn test_clean_parse() {
        let result = Parser::default().parse_with_diagnostics("# Hi\n\ntext");
        assert!(result.is_clean());
        assert_eq!(result.document.blocks.len(), 3);
    }
}
