//! Property-based tests for the block scanner and inline tokenizer
//!
//! Parsing is total and deterministic for any input, and text without
//! markup passes through untouched.

use chatmark_core::{parse, plain_text, tokenize, Block, Document, Inline, Link, Parser};
use proptest::prelude::*;

/// Short strings dense in markup characters.
fn markup_strategy() -> impl Strategy<Value = String> {
    "[#*_`~\\[\\]()>+\\- 0-9a-z.\n\r\t]{0,64}"
}

/// Text that contains no inline delimiter.
fn prose_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,.!?]{1,40}"
}

fn word_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,12}"
}

proptest! {
    #[test]
    fn test_parse_is_total(input in any::<String>()) {
        let blocks = parse(&input);
        prop_assert!(!blocks.is_empty());
    }

    #[test]
    fn test_parse_markup_is_total(input in markup_strategy()) {
        let result = Parser::new().parse_with_diagnostics(&input);
        prop_assert!(!result.document.blocks.is_empty());
    }

    #[test]
    fn test_parse_is_deterministic(input in markup_strategy()) {
        prop_assert_eq!(parse(&input), parse(&input));
    }

    #[test]
    fn test_never_more_blocks_than_lines(input in markup_strategy()) {
        let breaks = input.matches('\n').count() + input.matches('\r').count();
        let lines = breaks - input.matches("\r\n").count() + 1;
        prop_assert!(parse(&input).len() <= lines);
    }

    #[test]
    fn test_into_owned_preserves_tree(input in markup_strategy()) {
        let blocks = parse(&input);
        let owned = Document::new(blocks.clone()).into_owned();
        prop_assert_eq!(owned.blocks, blocks);
    }

    #[test]
    fn test_inline_elements_are_never_empty(input in markup_strategy()) {
        for line in input.lines().filter(|l| !l.is_empty()) {
            for inline in tokenize(line) {
                prop_assert!(!inline.text().is_empty(), "empty {:?} in {:?}", inline, line);
            }
        }
    }

    #[test]
    fn test_prose_is_single_plain_element(text in prose_strategy()) {
        prop_assert_eq!(tokenize(&text), vec![Inline::PlainText(text.as_str().into())]);
    }

    #[test]
    fn test_prose_lines_are_paragraphs(
        lines in prop::collection::vec("[a-zA-Z][a-zA-Z ]{0,20}", 1..8)
    ) {
        let input = lines.join("\n");
        let blocks = parse(&input);
        prop_assert_eq!(blocks.len(), lines.len());
        for (block, line) in blocks.iter().zip(&lines) {
            match block {
                Block::Paragraph(p) => prop_assert_eq!(plain_text(&p.content), line.as_str()),
                other => prop_assert!(false, "expected paragraph, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_line_terminators_are_interchangeable(
        lines in prop::collection::vec("[a-zA-Z#>*+\\- ]{0,12}", 1..8)
    ) {
        let lf_input = lines.join("\n");
        let crlf_input = lines.join("\r\n");
        let cr_input = lines.join("\r");
        let lf = parse(&lf_input);
        prop_assert_eq!(&parse(&crlf_input), &lf);
        prop_assert_eq!(&parse(&cr_input), &lf);
    }

    #[test]
    fn test_wrapped_word_is_bold(word in word_strategy()) {
        let star = format!("**{word}**");
        let under = format!("__{word}__");
        prop_assert_eq!(
            tokenize(&star),
            vec![Inline::BoldText(word.as_str().into())]
        );
        prop_assert_eq!(
            tokenize(&under),
            vec![Inline::BoldText(word.as_str().into())]
        );
    }

    #[test]
    fn test_link_round_trip(label in word_strategy(), url in word_strategy()) {
        let text = format!("[{label}]({url})");
        prop_assert_eq!(
            tokenize(&text),
            vec![Inline::Link(Link::new(label.as_str(), url.as_str()))]
        );
    }

    #[test]
    fn test_emphasised_link_dissolves(label in word_strategy(), url in word_strategy()) {
        let text = format!("*[{label}]({url})*");
        prop_assert_eq!(
            tokenize(&text),
            vec![Inline::Link(Link::new(label.as_str(), url.as_str()))]
        );
    }
}
