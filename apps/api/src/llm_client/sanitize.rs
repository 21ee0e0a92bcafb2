//! Heuristic cleanup of raw model output before JSON parsing.
//!
//! Nothing here parses JSON. The worst case is returning text that still fails to
//! parse, which the response mappers handle.

const FENCE: &str = "```";

/// Trims the text and removes a surrounding triple-backtick fence, with or without a
/// language tag. A missing closing fence (truncated output) is tolerated.
pub fn strip_fences(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix(FENCE) else {
        return text;
    };

    let rest = skip_language_tag(rest);
    let rest = rest.trim_end();
    rest.strip_suffix(FENCE).unwrap_or(rest).trim()
}

/// Full sanitization: trim, strip fences, then keep the span from the first `{` to the
/// last `}` when both exist in that order. Otherwise returns the unfenced text.
pub fn sanitize(raw: &str) -> String {
    let text = strip_fences(raw);

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => text[start..=end].to_string(),
        _ => text.to_string(),
    }
}

/// Removes every fence marker (and the language tag that may follow an opening one)
/// from inside a string, e.g. a summary field the model wrapped in a code block.
pub fn strip_fence_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = skip_language_tag(&rest[pos + FENCE.len()..]);
    }
    out.push_str(rest);

    out.trim().to_string()
}

/// Skips a language tag directly after an opening fence.
///
/// When the fence line ends in a line break, any single token on it (no inner
/// whitespace, `{` or `[`) is a tag and the whole line is dropped, trailing spaces
/// included. Without a line break the leading word only counts as a tag when it runs
/// straight into a JSON value or the end of text; otherwise it is content and is kept.
fn skip_language_tag(after_fence: &str) -> &str {
    if let Some(newline) = after_fence.find('\n') {
        let first_line = after_fence[..newline].trim_end();
        if !first_line.contains(|c: char| c.is_whitespace() || matches!(c, '{' | '[')) {
            return &after_fence[newline + 1..];
        }
    }

    let tag_len = after_fence
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.' | '#')))
        .unwrap_or(after_fence.len());
    let (tag, remainder) = after_fence.split_at(tag_len);

    if tag.is_empty() {
        return after_fence.trim_start_matches([' ', '\t', '\r', '\n']);
    }

    match remainder.chars().next() {
        None => remainder,
        Some('\r' | '{' | '[') => remainder.trim_start_matches('\r'),
        Some(_) => after_fence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_with_various_language_tags() {
        for tag in ["", "json", "JSON", "json5", "javascript", "text"] {
            let input = format!("```{tag}\n{{\"key\": \"value\"}}\n```");
            assert_eq!(sanitize(&input), "{\"key\": \"value\"}", "tag {tag:?}");
            assert_eq!(strip_fences(&input), "{\"key\": \"value\"}", "tag {tag:?}");
        }
    }

    #[test]
    fn test_tag_with_trailing_space_or_symbol_is_dropped() {
        assert_eq!(sanitize("```text \nhello world\n```"), "hello world");
        assert_eq!(sanitize("```c#\nhello world\n```"), "hello world");
        assert_eq!(sanitize("```json\t\r\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(
            strip_fences("```json \n[{\"id\":\"q1\"},{\"id\":\"q2\"}]\n```"),
            "[{\"id\":\"q1\"},{\"id\":\"q2\"}]"
        );
    }

    #[test]
    fn test_fence_line_with_json_start_is_content() {
        assert_eq!(strip_fences("```json {\"a\": 1}\n```"), "json {\"a\": 1}");
        assert_eq!(sanitize("```json {\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_fences_keeps_array_content() {
        let input = "```json\n[{\"id\":\"q1\",\"text\":\"Explain REST\"}]\n```";
        assert_eq!(strip_fences(input), "[{\"id\":\"q1\",\"text\":\"Explain REST\"}]");
    }

    #[test]
    fn test_strip_fences_single_line_and_truncated() {
        assert_eq!(strip_fences("```json{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_fences("```json\n{\"a\":1"), "{\"a\":1");
        assert_eq!(strip_fences("```Plain words```"), "Plain words");
    }

    #[test]
    fn test_sanitize_extracts_object_from_prose() {
        let input = "Sure! Here is the review:\n{\"overall_score\": 80, \"nested\": {\"x\": 1}}\nHope it helps.";
        assert_eq!(
            sanitize(input),
            "{\"overall_score\": 80, \"nested\": {\"x\": 1}}"
        );
    }

    #[test]
    fn test_sanitize_without_braces_returns_trimmed_text() {
        assert_eq!(sanitize("  no json here \n"), "no json here");
        assert_eq!(sanitize("} backwards {"), "} backwards {");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_sanitize_fenced_object_with_prose_inside() {
        let input = "```json\nResult:\n{\"a\": 1}\n```";
        assert_eq!(sanitize(input), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_fence_markers_inside_field() {
        assert_eq!(strip_fence_markers("```\nGood structure\n```"), "Good structure");
        assert_eq!(
            strip_fence_markers("```markdown\nClear summary```"),
            "Clear summary"
        );
        assert_eq!(strip_fence_markers("No fences"), "No fences");
    }
}
