//! Post-processing applied to raw model responses before scoring.
//!
//! Mirrors the client-side cleanup shipped with the rewriting app, so scores
//! reflect what a user would actually see.

use std::sync::LazyLock;

use regex::Regex;

const CODE_FENCE: &str = "```";

static REASONING_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<think>.*?</think>").expect("reasoning span pattern is valid")
});

/// The response contained only reasoning spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReasoningOnly;

pub fn clean(raw: &str) -> String {
    let without_reasoning = strip_reasoning(raw);
    let unquoted = strip_wrapping_quotes(&without_reasoning);
    strip_code_fences(unquoted)
}

/// Like [`clean`], but reports a response that was non-empty only because of
/// reasoning spans. An empty raw response is a legitimately empty rewrite.
pub fn clean_checked(raw: &str) -> Result<String, ReasoningOnly> {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && strip_reasoning(trimmed).is_empty() {
        return Err(ReasoningOnly);
    }
    Ok(clean(raw))
}

fn strip_reasoning(raw: &str) -> String {
    REASONING_SPAN
        .replace_all(raw.trim(), "")
        .trim()
        .to_string()
}

fn strip_wrapping_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return text[1..text.len() - 1].trim();
        }
    }
    text
}

fn strip_code_fences(text: &str) -> String {
    if !text.starts_with(CODE_FENCE) {
        return text.to_string();
    }

    text.split('\n')
        .filter(|line| !line.starts_with(CODE_FENCE))
        .collect::<Vec<&str>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_removes_multiline_reasoning_spans() {
        let raw = "<think>\nthe user wants a fix\n</think>\n\nThey're going home.";
        assert_eq!(clean(raw), "They're going home.");
    }

    #[test]
    fn clean_removes_every_reasoning_span_non_greedily() {
        let raw = "<think>a</think>Keep this<think>b</think> and this";
        assert_eq!(clean(raw), "Keep this and this");
    }

    #[test]
    fn clean_strips_one_layer_of_wrapping_quotes() {
        assert_eq!(clean("\"Fixed sentence.\""), "Fixed sentence.");
        assert_eq!(clean("'Fixed sentence.'"), "Fixed sentence.");
        assert_eq!(clean("\"mismatched'"), "\"mismatched'");
    }

    #[test]
    fn clean_leaves_a_lone_quote_character_alone() {
        assert_eq!(clean("\""), "\"");
    }

    #[test]
    fn clean_drops_code_fence_lines() {
        let raw = "```text\nLine one.\nLine two.\n```";
        assert_eq!(clean(raw), "Line one.\nLine two.");
    }

    #[test]
    fn clean_keeps_inner_fences_when_text_does_not_open_with_one() {
        let raw = "Use this:\n```\ncode\n```";
        assert_eq!(clean(raw), raw);
    }

    #[test]
    fn clean_is_idempotent_without_fenced_or_nested_quotes() {
        let inputs = [
            "  plain text  ",
            "<think>x</think>\"quoted\"",
            "```\nfenced\n```",
            "<think>\n\n</think>\n```md\nBoth.\n```",
            "",
            "They said \"hi\" to me.",
        ];
        for input in inputs {
            let once = clean(input);
            assert_eq!(clean(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn clean_unquotes_before_unfencing_so_fenced_quotes_survive_one_pass() {
        let raw = "```\n\"They're going home.\"\n```";
        let once = clean(raw);
        assert_eq!(once, "\"They're going home.\"");
        assert_eq!(clean(&once), "They're going home.");

        assert_eq!(clean("\"'nested'\""), "'nested'");
    }

    #[test]
    fn clean_checked_flags_reasoning_only_responses() {
        assert_eq!(
            clean_checked("<think>long deliberation</think>"),
            Err(ReasoningOnly)
        );
        assert_eq!(clean_checked("   "), Ok(String::new()));
        assert_eq!(
            clean_checked("<think>x</think> Done."),
            Ok("Done.".to_string())
        );
    }
}
