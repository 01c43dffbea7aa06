//! chatmark CLI - Inspect how chat messages parse
//!
//! Usage:
//!   chatmark [OPTIONS] <COMMAND>
//!
//! Commands:
//!   parse     Parse and display the block structure
//!   inline    Tokenize a single line of text
//!   validate  Report degraded input
//!   stats     Show message statistics

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use chatmark_core::inline::DEFAULT_MAX_NESTING;
use chatmark_core::{Block, Diagnostic, Document, Inline, LinkTarget, Parser};
use clap::{ArgAction, Parser as ClapParser, Subcommand};
use serde::Serialize;

#[derive(ClapParser)]
#[command(name = "chatmark", version, about = "Chat message markup inspector")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// How deep emphasis is re-examined for nested links
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_NESTING)]
    max_nesting: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse and display the block structure
    Parse {
        /// Input file, or `-` for stdin
        file: Option<PathBuf>,
    },

    /// Tokenize one line of text into inline elements
    Inline {
        /// Text to tokenize
        text: String,
    },

    /// Check the input and report every diagnostic
    Validate {
        /// Input file, or `-` for stdin
        file: Option<PathBuf>,
    },

    /// Show block, inline and link counts
    Stats {
        /// Input file, or `-` for stdin
        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let parser = Parser::new().with_max_nesting(cli.max_nesting);

    match &cli.command {
        Command::Parse { file } => {
            let input = read_input(file.as_ref())?;
            cmd_parse(&parser, &input, cli)
        }
        Command::Inline { text } => cmd_inline(&parser, text, cli.json),
        Command::Validate { file } => {
            let input = read_input(file.as_ref())?;
            cmd_validate(&parser, &input, cli.json)
        }
        Command::Stats { file } => {
            let input = read_input(file.as_ref())?;
            cmd_stats(&parser, &input, cli.json)
        }
    }
}

/// Read a file, or stdin when no path (or `-`) is given.
fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display())),
        _ => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(parser: &Parser, input: &str, cli: &Cli) -> Result<()> {
    let result = parser.parse_with_diagnostics(input);

    for diagnostic in &result.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    if cli.json {
        let json = JsonDocument::from(&result.document);
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else if cli.verbose > 0 {
        print_document_verbose(&result.document);
    } else {
        print_document_summary(&result.document);
    }

    Ok(())
}

// =============================================================================
// Inline Command
// =============================================================================

fn cmd_inline(parser: &Parser, text: &str, json: bool) -> Result<()> {
    let inlines = parser.tokenize(text);

    if json {
        let json: Vec<JsonInline<'_>> = inlines.iter().map(JsonInline::from).collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    for (i, inline) in inlines.iter().enumerate() {
        match inline {
            Inline::Link(link) => println!(
                "  [{}] link: {:?} -> {}",
                i + 1,
                link.text,
                describe_target(link.target())
            ),
            other => println!("  [{}] {}: {:?}", i + 1, other.name(), other.text()),
        }
    }
    Ok(())
}

// =============================================================================
// Validate Command
// =============================================================================

fn cmd_validate(parser: &Parser, input: &str, json: bool) -> Result<()> {
    let result = parser.parse_with_diagnostics(input);
    let count = result.diagnostics.len();

    if json {
        let diagnostics: Vec<JsonDiagnostic<'_>> =
            result.diagnostics.iter().map(JsonDiagnostic::from).collect();
        println!(
            "{}",
            serde_json::json!({ "valid": count == 0, "diagnostics": diagnostics })
        );
    } else if count == 0 {
        println!("Valid: no diagnostics");
    } else {
        eprintln!("Invalid: {} diagnostic(s) found", count);
        for diagnostic in &result.diagnostics {
            eprintln!("  - [{}] {}", diagnostic.kind.as_str(), diagnostic);
        }
    }

    if count > 0 {
        bail!("{} diagnostic(s) found", count);
    }
    Ok(())
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(parser: &Parser, input: &str, json: bool) -> Result<()> {
    let result = parser.parse_with_diagnostics(input);
    let stats = MessageStats::from_document(&result.document, input);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Message Statistics");
    println!("------------------");
    println!("Blocks:");
    println!("  Total:            {}", stats.total_blocks);
    println!("  Headers:          {}", stats.headers);
    println!("  Paragraphs:       {}", stats.paragraphs);
    println!("  Code blocks:      {}", stats.code_blocks);
    println!("  Unordered lists:  {}", stats.unordered_lists);
    println!("  Ordered lists:    {}", stats.ordered_lists);
    println!("  Blockquotes:      {}", stats.blockquotes);
    println!("  Rules:            {}", stats.horizontal_rules);
    println!("  Empty lines:      {}", stats.empty_lines);
    println!();
    println!("Inline:");
    println!("  Elements:         {}", stats.inline_elements);
    println!("  Formatted:        {}", stats.formatted);
    println!();
    println!("Links:");
    println!("  Conversation:     {}", stats.conversation_links);
    println!("  External:         {}", stats.external_links);
    println!();
    println!("Size:");
    println!("  Bytes:            {}", stats.bytes);
    println!("  Lines:            {}", stats.lines);
    println!();
    println!("Diagnostics:        {}", result.diagnostics.len());

    Ok(())
}

#[derive(Debug, Default, Serialize)]
struct MessageStats {
    total_blocks: usize,
    headers: usize,
    paragraphs: usize,
    code_blocks: usize,
    unordered_lists: usize,
    ordered_lists: usize,
    blockquotes: usize,
    horizontal_rules: usize,
    empty_lines: usize,
    inline_elements: usize,
    formatted: usize,
    conversation_links: usize,
    external_links: usize,
    bytes: usize,
    lines: usize,
}

impl MessageStats {
    fn from_document(doc: &Document<'_>, input: &str) -> Self {
        let mut stats = Self {
            total_blocks: doc.blocks.len(),
            bytes: input.len(),
            lines: count_lines(input),
            ..Self::default()
        };

        for block in &doc.blocks {
            match block {
                Block::Header(_) => stats.headers += 1,
                Block::Paragraph(p) => {
                    stats.paragraphs += 1;
                    stats.inline_elements += p.content.len();
                    stats.formatted += p
                        .content
                        .iter()
                        .filter(|i| !matches!(i, Inline::PlainText(_) | Inline::Link(_)))
                        .count();
                }
                Block::CodeBlock(_) => stats.code_blocks += 1,
                Block::UnorderedList(_) => stats.unordered_lists += 1,
                Block::OrderedList(_) => stats.ordered_lists += 1,
                Block::Blockquote(_) => stats.blockquotes += 1,
                Block::HorizontalRule => stats.horizontal_rules += 1,
                Block::EmptyLine => stats.empty_lines += 1,
            }
        }

        for link in doc.links() {
            if link.target().is_conversation() {
                stats.conversation_links += 1;
            } else {
                stats.external_links += 1;
            }
        }

        stats
    }
}

/// Lines as the parser splits them: `\n`, `\r\n` and a lone `\r` each end one.
fn count_lines(input: &str) -> usize {
    let breaks = input.matches('\n').count() + input.matches('\r').count();
    breaks - input.matches("\r\n").count() + 1
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonDocument<'a> {
    blocks: Vec<JsonBlock<'a>>,
}

impl<'a> From<&'a Document<'a>> for JsonDocument<'a> {
    fn from(doc: &'a Document<'a>) -> Self {
        Self {
            blocks: doc.blocks.iter().map(JsonBlock::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum JsonBlock<'a> {
    Header {
        level: usize,
        text: &'a str,
    },
    Paragraph {
        content: Vec<JsonInline<'a>>,
    },
    CodeBlock {
        language: Option<&'a str>,
        code: &'a str,
    },
    UnorderedList {
        items: Vec<&'a str>,
    },
    OrderedList {
        items: Vec<&'a str>,
    },
    Blockquote {
        content: &'a str,
    },
    HorizontalRule,
    EmptyLine,
}

impl<'a> From<&'a Block<'a>> for JsonBlock<'a> {
    fn from(block: &'a Block<'a>) -> Self {
        match block {
            Block::Header(h) => JsonBlock::Header {
                level: h.level,
                text: &h.text,
            },
            Block::Paragraph(p) => JsonBlock::Paragraph {
                content: p.content.iter().map(JsonInline::from).collect(),
            },
            Block::CodeBlock(c) => JsonBlock::CodeBlock {
                language: c.language.as_deref(),
                code: &c.code,
            },
            Block::UnorderedList(l) => JsonBlock::UnorderedList {
                items: l.items.iter().map(|i| &**i).collect(),
            },
            Block::OrderedList(l) => JsonBlock::OrderedList {
                items: l.items.iter().map(|i| &**i).collect(),
            },
            Block::Blockquote(q) => JsonBlock::Blockquote {
                content: &q.content,
            },
            Block::HorizontalRule => JsonBlock::HorizontalRule,
            Block::EmptyLine => JsonBlock::EmptyLine,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum JsonInline<'a> {
    PlainText {
        content: &'a str,
    },
    BoldText {
        content: &'a str,
    },
    ItalicText {
        content: &'a str,
    },
    BoldItalicText {
        content: &'a str,
    },
    InlineCode {
        content: &'a str,
    },
    Link {
        text: &'a str,
        url: &'a str,
        conversation: Option<&'a str>,
    },
    Strikethrough {
        content: &'a str,
    },
}

impl<'a> From<&'a Inline<'a>> for JsonInline<'a> {
    fn from(inline: &'a Inline<'a>) -> Self {
        match inline {
            Inline::PlainText(t) => JsonInline::PlainText { content: t },
            Inline::BoldText(t) => JsonInline::BoldText { content: t },
            Inline::ItalicText(t) => JsonInline::ItalicText { content: t },
            Inline::BoldItalicText(t) => JsonInline::BoldItalicText { content: t },
            Inline::InlineCode(t) => JsonInline::InlineCode { content: t },
            Inline::Link(link) => JsonInline::Link {
                text: &link.text,
                url: &link.url,
                conversation: match link.target() {
                    LinkTarget::Conversation(id) => Some(id),
                    LinkTarget::External(_) => None,
                },
            },
            Inline::Strikethrough(t) => JsonInline::Strikethrough { content: t },
        }
    }
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    kind: &'static str,
    message: &'a str,
    line: usize,
    start: usize,
    end: usize,
}

impl<'a> From<&'a Diagnostic> for JsonDiagnostic<'a> {
    fn from(d: &'a Diagnostic) -> Self {
        Self {
            kind: d.kind.as_str(),
            message: &d.message,
            line: d.line,
            start: d.span.start,
            end: d.span.end,
        }
    }
}

// =============================================================================
// Text Output
// =============================================================================

fn print_document_summary(doc: &Document<'_>) {
    println!("Blocks: {}", doc.blocks.len());
    for (i, block) in doc.blocks.iter().enumerate() {
        println!("  [{}] {}", i + 1, describe_block(block));
    }
}

fn print_document_verbose(doc: &Document<'_>) {
    println!("=== chatmark tree ===");
    println!();
    println!("--- Blocks ---");
    for (i, block) in doc.blocks.iter().enumerate() {
        println!();
        println!("[{}] {}", i + 1, describe_block(block));
        print_block_verbose(block, 1);
    }
}

fn describe_block(block: &Block<'_>) -> String {
    match block {
        Block::Header(h) => format!("Header (level {})", h.level),
        Block::Paragraph(p) => format!("Paragraph ({} inline)", p.content.len()),
        Block::CodeBlock(c) => match &c.language {
            Some(lang) => format!("CodeBlock (lang: {})", lang),
            None => "CodeBlock".to_string(),
        },
        Block::UnorderedList(l) => format!("UnorderedList ({} items)", l.items.len()),
        Block::OrderedList(l) => format!("OrderedList ({} items)", l.items.len()),
        Block::Blockquote(_) => "Blockquote".to_string(),
        Block::HorizontalRule => "HorizontalRule".to_string(),
        Block::EmptyLine => "EmptyLine".to_string(),
    }
}

fn print_block_verbose(block: &Block<'_>, indent: usize) {
    let prefix = "  ".repeat(indent);

    match block {
        Block::Header(h) => println!("{}Text: {}", prefix, h.text),
        Block::Paragraph(p) => {
            println!("{}Content: {}", prefix, format_inlines(&p.content));
            for inline in &p.content {
                println!("{}  - {}", prefix, inline.name());
            }
        }
        Block::CodeBlock(c) => {
            let preview: String = c.code.chars().take(60).collect();
            let ellipsis = if c.code.chars().count() > 60 { "..." } else { "" };
            println!(
                "{}Code: {}{}",
                prefix,
                preview.replace('\n', "\\n"),
                ellipsis
            );
        }
        Block::UnorderedList(l) | Block::OrderedList(l) => {
            for (i, item) in l.items.iter().enumerate() {
                println!("{}Item {}: {}", prefix, i + 1, item);
            }
        }
        Block::Blockquote(q) => println!("{}Content: {}", prefix, q.content),
        Block::HorizontalRule | Block::EmptyLine => {}
    }
}

fn describe_target(target: LinkTarget<'_>) -> String {
    match target {
        LinkTarget::Conversation(id) => format!("conversation {}", id),
        LinkTarget::External(url) => url.to_string(),
    }
}

/// Render inline elements back to markup.
fn format_inlines(inlines: &[Inline<'_>]) -> String {
    let mut result = String::new();
    for inline in inlines {
        match inline {
            Inline::PlainText(t) => result.push_str(t),
            Inline::BoldText(t) => {
                result.push_str("**");
                result.push_str(t);
                result.push_str("**");
            }
            Inline::ItalicText(t) => {
                result.push('*');
                result.push_str(t);
                result.push('*');
            }
            Inline::BoldItalicText(t) => {
                result.push_str("***");
                result.push_str(t);
                result.push_str("***");
            }
            Inline::InlineCode(t) => {
                result.push('`');
                result.push_str(t);
                result.push('`');
            }
            Inline::Link(l) => {
                result.push('[');
                result.push_str(&l.text);
                result.push_str("](");
                result.push_str(&l.url);
                result.push(')');
            }
            Inline::Strikethrough(t) => {
                result.push_str("~~");
                result.push_str(t);
                result.push_str("~~");
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["chatmark", "parse", "-", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.max_nesting, DEFAULT_MAX_NESTING);
        assert!(matches!(cli.command, Command::Parse { file: Some(_) }));
    }

    #[test]
    fn test_format_inlines_restores_markup() {
        let parser = Parser::new();
        let text = "a **b** *c* `d` [e](f) ~~g~~";
        assert_eq!(format_inlines(&parser.tokenize(text)), text);
    }

    #[test]
    fn test_stats_counts_links_by_target() {
        let input = "# T\n[a](conversation://x) [b](https://y)\n- i\n---";
        let result = Parser::new().parse_with_diagnostics(input);
        let stats = MessageStats::from_document(&result.document, input);
        assert_eq!(stats.total_blocks, 4);
        assert_eq!(stats.headers, 1);
        assert_eq!(stats.unordered_lists, 1);
        assert_eq!(stats.horizontal_rules, 1);
        assert_eq!(stats.conversation_links, 1);
        assert_eq!(stats.external_links, 1);
        assert_eq!(stats.lines, 4);
    }

    #[test]
    fn test_count_lines_matches_parser_split() {
        for input in ["", "a", "a\nb", "a\r\nb\n", "a\rb\r\rc"] {
            assert_eq!(Parser::new().parse(input).len(), count_lines(input), "{:?}", input);
        }
        assert_eq!(count_lines("a\rb\r\rc"), 4);
        assert_eq!(count_lines("a\r\nb\n"), 3);
    }

    #[test]
    fn test_json_inline_is_tagged() {
        let parser = Parser::new();
        let inlines = parser.tokenize("[a](conversation://x)");
        let json = serde_json::to_value(JsonInline::from(&inlines[0])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "Link",
                "text": "a",
                "url": "conversation://x",
                "conversation": "x"
            })
        );
    }

    #[test]
    fn test_validate_fails_on_unclosed_fence() {
        let parser = Parser::new();
        assert!(cmd_validate(&parser, "# fine", true).is_ok());
        assert!(cmd_validate(&parser, "```\nopen", true).is_err());
    }
}
