//! Model output post-processing

use serde_json::Value;

/// Drop the prompt when a text-generation endpoint echoes it back
pub fn strip_prompt_echo<'a>(generated: &'a str, prompt: &str) -> &'a str {
    generated
        .strip_prefix(prompt)
        .unwrap_or(generated)
        .trim()
}

/// Pull a JSON value out of model text.
///
/// Tries the whole text, then a fenced code block, then the outermost
/// `{...}` span. No schema is checked.
pub fn extract_json(text: &str) -> Option<Value> {
    let text = text.trim();

    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }

    if let Some(fenced) = fenced_block(text) {
        if let Ok(value) = serde_json::from_str(fenced) {
            return Some(value);
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let body = &text[open + 3..];
    // Skip an info string such as `json`
    let body = match body.find('\n') {
        Some(newline) if !body[..newline].trim().contains(' ') => &body[newline + 1..],
        _ => body,
    };
    let close = body.find("```")?;
    Some(body[..close].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_prompt_echo() {
        let prompt = "Who wins?";
        assert_eq!(strip_prompt_echo("Who wins? Arsenal.", prompt), "Arsenal.");
        assert_eq!(strip_prompt_echo("  Arsenal. ", prompt), "Arsenal.");
    }

    #[test]
    fn test_extract_plain_json() {
        let value = extract_json(r#" {"winner": "Arsenal", "confidence": 72} "#).unwrap();
        assert_eq!(value["winner"], "Arsenal");
    }

    #[test]
    fn test_extract_fenced_json() {
        let text = "Here you go:\n```json\n{\"winner\": \"Draw\"}\n```\nGood luck!";
        assert_eq!(extract_json(text), Some(json!({"winner": "Draw"})));
    }

    #[test]
    fn test_extract_embedded_object() {
        let text = "Prediction: {\"winner\": \"Chelsea\", \"reasoning\": \"better form\"} done";
        assert_eq!(extract_json(text).unwrap()["reasoning"], "better form");
    }

    #[test]
    fn test_no_json() {
        assert_eq!(extract_json("Arsenal should win comfortably."), None);
        assert_eq!(extract_json("} backwards {"), None);
    }
}
