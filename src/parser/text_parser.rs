use crate::ast::{ParsedText, TextToken};
use serde_json::Value;

/// Split interpolated text into an expression the renderer can evaluate.
///
/// Returns `None` when the text carries no interpolation at all; the caller
/// keeps such text as a plain static node. Literal segments are JSON-quoted
/// so the expression concatenates cleanly, binding segments are wrapped in
/// the `_s` stringify helper and trimmed.
pub fn parse_text(text: &str, delimiters: &(String, String)) -> Option<ParsedText> {
    let open = delimiters.0.as_str();
    let close = delimiters.1.as_str();
    let mut parts: Vec<String> = Vec::new();
    let mut tokens: Vec<TextToken> = Vec::new();
    let mut last = 0;
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find(open) {
        let open_at = cursor + found;
        let content_start = open_at + open.len();
        // Shortest non-empty content followed by a closing delimiter. An
        // immediately adjacent close is absorbed into the content instead.
        let close_at = {
            let mut search = content_start;
            loop {
                match text[search..].find(close) {
                    Some(rel) => {
                        let at = search + rel;
                        if at > content_start {
                            break Some(at);
                        }
                        match text[at..].chars().next() {
                            Some(c) => search = at + c.len_utf8(),
                            None => break None,
                        }
                    }
                    None => break None,
                }
            }
        };
        let Some(close_at) = close_at else { break };

        if open_at > last {
            let literal = &text[last..open_at];
            parts.push(Value::String(literal.to_string()).to_string());
            tokens.push(TextToken::Literal(literal.to_string()));
        }
        let binding = text[content_start..close_at].trim().to_string();
        parts.push(format!("_s({})", binding));
        tokens.push(TextToken::Binding { binding });
        last = close_at + close.len();
        cursor = last;
    }

    if parts.is_empty() {
        return None;
    }
    if last < text.len() {
        let literal = &text[last..];
        parts.push(Value::String(literal.to_string()).to_string());
        tokens.push(TextToken::Literal(literal.to_string()));
    }
    Some(ParsedText { expression: parts.join("+"), tokens })
}
