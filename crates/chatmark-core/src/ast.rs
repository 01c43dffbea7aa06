//! Element tree produced by the parser.
//!
//! The tree is deliberately flat: a document is a sequence of [`Block`]s and
//! paragraphs hold a sequence of [`Inline`]s. Text borrows from the input
//! wherever it is a contiguous slice of it; [`Document::into_owned`] detaches
//! a tree from the input lifetime.

use std::borrow::Cow;

use crate::link::LinkTarget;

/// Borrowed or owned string type for zero-copy parsing.
pub type CowStr<'a> = Cow<'a, str>;

#[inline]
fn owned(s: CowStr<'_>) -> CowStr<'static> {
    Cow::Owned(s.into_owned())
}

/// A parsed message: its blocks in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document<'a> {
    pub blocks: Vec<Block<'a>>,
}

impl<'a> Document<'a> {
    pub fn new(blocks: Vec<Block<'a>>) -> Self {
        Self { blocks }
    }

    /// Every link in paragraph order.
    pub fn links(&self) -> impl Iterator<Item = &Link<'a>> + '_ {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph(p) => Some(p.content.iter()),
                _ => None,
            })
            .flatten()
            .filter_map(|inline| match inline {
                Inline::Link(link) => Some(link),
                _ => None,
            })
    }

    /// Visible text of all non-marker blocks, one block per line.
    pub fn plain_text(&self) -> String {
        let parts: Vec<String> = self
            .blocks
            .iter()
            .filter(|b| !b.is_marker())
            .map(Block::plain_text)
            .collect();
        parts.join("\n")
    }

    pub fn into_owned(self) -> Document<'static> {
        Document {
            blocks: self.blocks.into_iter().map(Block::into_owned).collect(),
        }
    }
}

/// Block-level elements, one per logical block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block<'a> {
    /// `#` heading.
    Header(Header<'a>),
    /// One non-blank line of prose.
    Paragraph(Paragraph<'a>),
    /// Fenced code block.
    CodeBlock(CodeBlock<'a>),
    /// Run of `-`, `*` or `+` bullets.
    UnorderedList(List<'a>),
    /// Run of `1.` style items.
    OrderedList(List<'a>),
    /// Run of `> ` lines.
    Blockquote(Blockquote<'a>),
    HorizontalRule,
    EmptyLine,
}

impl<'a> Block<'a> {
    /// Stable name of the block kind.
    pub fn name(&self) -> &'static str {
        match self {
            Block::Header(_) => "header",
            Block::Paragraph(_) => "paragraph",
            Block::CodeBlock(_) => "code-block",
            Block::UnorderedList(_) => "unordered-list",
            Block::OrderedList(_) => "ordered-list",
            Block::Blockquote(_) => "blockquote",
            Block::HorizontalRule => "horizontal-rule",
            Block::EmptyLine => "empty-line",
        }
    }

    /// True for payload-free blocks.
    pub fn is_marker(&self) -> bool {
        matches!(self, Block::HorizontalRule | Block::EmptyLine)
    }

    /// Visible text of the block. List items are joined with `\n`.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Header(h) => h.text.to_string(),
            Block::Paragraph(p) => plain_text(&p.content),
            Block::CodeBlock(c) => c.code.to_string(),
            Block::UnorderedList(l) | Block::OrderedList(l) => l.items.join("\n"),
            Block::Blockquote(q) => q.content.to_string(),
            Block::HorizontalRule | Block::EmptyLine => String::new(),
        }
    }

    pub fn into_owned(self) -> Block<'static> {
        match self {
            Block::Header(h) => Block::Header(Header {
                text: owned(h.text),
                level: h.level,
            }),
            Block::Paragraph(p) => Block::Paragraph(Paragraph {
                content: p.content.into_iter().map(Inline::into_owned).collect(),
            }),
            Block::CodeBlock(c) => Block::CodeBlock(CodeBlock {
                code: owned(c.code),
                language: c.language.map(owned),
            }),
            Block::UnorderedList(l) => Block::UnorderedList(l.into_owned()),
            Block::OrderedList(l) => Block::OrderedList(l.into_owned()),
            Block::Blockquote(q) => Block::Blockquote(Blockquote {
                content: owned(q.content),
            }),
            Block::HorizontalRule => Block::HorizontalRule,
            Block::EmptyLine => Block::EmptyLine,
        }
    }
}

/// Section heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'a> {
    /// Title with the hashes removed, trimmed.
    pub text: CowStr<'a>,
    /// Number of leading `#`.
    pub level: usize,
}

/// A paragraph line split into inline elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph<'a> {
    pub content: Vec<Inline<'a>>,
}

/// Fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock<'a> {
    /// Lines between the fences joined with `\n`.
    pub code: CowStr<'a>,
    /// Info string from the opening fence.
    pub language: Option<CowStr<'a>>,
}

/// List items as literal text. Items are not inline-tokenized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List<'a> {
    pub items: Vec<CowStr<'a>>,
}

impl List<'_> {
    fn into_owned(self) -> List<'static> {
        List {
            items: self.items.into_iter().map(owned).collect(),
        }
    }
}

/// Quoted lines joined with single spaces. Not inline-tokenized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blockquote<'a> {
    pub content: CowStr<'a>,
}

/// Inline elements within a paragraph.
///
/// Each variant carries only its visible text; delimiters are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline<'a> {
    PlainText(CowStr<'a>),
    /// `**bold**` or `__bold__`.
    BoldText(CowStr<'a>),
    /// `*italic*` or `_italic_`.
    ItalicText(CowStr<'a>),
    /// `***both***`.
    BoldItalicText(CowStr<'a>),
    /// `` `code` ``.
    InlineCode(CowStr<'a>),
    /// `[text](url)`.
    Link(Link<'a>),
    /// `~~struck~~`.
    Strikethrough(CowStr<'a>),
}

impl<'a> Inline<'a> {
    /// Stable name of the element kind.
    pub fn name(&self) -> &'static str {
        match self {
            Inline::PlainText(_) => "plain-text",
            Inline::BoldText(_) => "bold-text",
            Inline::ItalicText(_) => "italic-text",
            Inline::BoldItalicText(_) => "bold-italic-text",
            Inline::InlineCode(_) => "inline-code",
            Inline::Link(_) => "link",
            Inline::Strikethrough(_) => "strikethrough",
        }
    }

    /// Visible text: the code of inline code, the label of a link.
    pub fn text(&self) -> &str {
        match self {
            Inline::PlainText(t)
            | Inline::BoldText(t)
            | Inline::ItalicText(t)
            | Inline::BoldItalicText(t)
            | Inline::InlineCode(t)
            | Inline::Strikethrough(t) => t,
            Inline::Link(link) => &link.text,
        }
    }

    #[inline]
    pub fn is_link(&self) -> bool {
        matches!(self, Inline::Link(_))
    }

    pub fn into_owned(self) -> Inline<'static> {
        match self {
            Inline::PlainText(t) => Inline::PlainText(owned(t)),
            Inline::BoldText(t) => Inline::BoldText(owned(t)),
            Inline::ItalicText(t) => Inline::ItalicText(owned(t)),
            Inline::BoldItalicText(t) => Inline::BoldItalicText(owned(t)),
            Inline::InlineCode(t) => Inline::InlineCode(owned(t)),
            Inline::Link(link) => Inline::Link(Link {
                text: owned(link.text),
                url: owned(link.url),
            }),
            Inline::Strikethrough(t) => Inline::Strikethrough(owned(t)),
        }
    }
}

/// Hyperlink label and destination, both taken verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link<'a> {
    pub text: CowStr<'a>,
    pub url: CowStr<'a>,
}

impl<'a> Link<'a> {
    pub fn new(text: impl Into<CowStr<'a>>, url: impl Into<CowStr<'a>>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }

    /// Where the link points: another conversation or an external resource.
    pub fn target(&self) -> LinkTarget<'_> {
        LinkTarget::classify(&self.url)
    }
}

/// Concatenated visible text of a run of inline elements.
pub fn plain_text(inlines: &[Inline<'_>]) -> String {
    inlines.iter().map(Inline::text).collect()
}
