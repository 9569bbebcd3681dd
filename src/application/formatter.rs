//! Renderings of a conversation for export.
//!
//! Supports JSON (raw message list), Markdown, and a standalone HTML page.

use chrono::{DateTime, Utc};

use crate::domain::{Contact, ExportFormat, Message};

const UNKNOWN: &str = "Unknown";
const NO_CONTENT: &str = "[no content]";

const HTML_STYLE: &str = "    body { font-family: sans-serif; margin: 20px; }
    .message { margin: 10px 0; padding: 10px; border-left: 3px solid #ccc; }
    .sender { font-weight: bold; color: #333; }
    .timestamp { color: #999; font-size: 0.9em; }
    .body { margin-top: 5px; color: #333; }";

/// Renders `messages` in the given format.
///
/// # Errors
/// Returns error if JSON serialization fails.
pub fn render(
    format: ExportFormat,
    contact: &Contact,
    messages: &[Message],
    exported_at: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    match format {
        ExportFormat::Json => format_messages_json(messages),
        ExportFormat::Md => Ok(format_messages_markdown(contact, messages, exported_at)),
        ExportFormat::Html => Ok(format_messages_html(contact, messages, exported_at)),
    }
}

/// Pretty-printed JSON array of the messages, untouched.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_messages_json(messages: &[Message]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(messages)
}

/// Markdown header block followed by one section per message.
pub fn format_messages_markdown(
    contact: &Contact,
    messages: &[Message],
    exported_at: DateTime<Utc>,
) -> String {
    let mut lines = vec![
        format!("# Conversation with {}", or_unknown(contact.name.as_deref())),
        format!("\nPhone: {}", or_unknown(contact.number.as_deref())),
        format!("UUID: {}", or_unknown(contact.uuid.as_deref())),
        format!("Export Date: {}", exported_at.to_rfc3339()),
        format!("Message Count: {}", messages.len()),
        "\n---\n".to_string(),
    ];

    for msg in messages {
        let (sender, body, timestamp) = message_parts(msg);
        lines.push(format!("\n### {sender} @ {timestamp}"));
        lines.push(format!("\n{body}"));
    }

    lines.join("\n")
}

/// Standalone HTML page with one `.message` block per message.
pub fn format_messages_html(
    contact: &Contact,
    messages: &[Message],
    exported_at: DateTime<Utc>,
) -> String {
    let name = escape_html(or_unknown(contact.name.as_deref()));
    let mut lines = vec![
        "<!DOCTYPE html>".to_string(),
        "<html>".to_string(),
        "<head>".to_string(),
        format!("  <title>Conversation with {name}</title>"),
        "  <meta charset='utf-8'>".to_string(),
        "  <style>".to_string(),
        HTML_STYLE.to_string(),
        "  </style>".to_string(),
        "</head>".to_string(),
        "<body>".to_string(),
        format!("  <h1>Conversation with {name}</h1>"),
        format!(
            "  <p><strong>Phone:</strong> {}</p>",
            escape_html(or_unknown(contact.number.as_deref()))
        ),
        format!(
            "  <p><strong>UUID:</strong> {}</p>",
            escape_html(or_unknown(contact.uuid.as_deref()))
        ),
        format!(
            "  <p><strong>Export Date:</strong> {}</p>",
            exported_at.to_rfc3339()
        ),
        format!("  <p><strong>Messages:</strong> {}</p>", messages.len()),
        "  <hr>".to_string(),
    ];

    for msg in messages {
        let (sender, body, timestamp) = message_parts(msg);
        lines.push("  <div class='message'>".to_string());
        lines.push(format!("    <div class='sender'>{}</div>", escape_html(&sender)));
        lines.push(format!(
            "    <div class='timestamp'>{}</div>",
            escape_html(&timestamp)
        ));
        lines.push(format!("    <div class='body'>{}</div>", escape_html(&body)));
        lines.push("  </div>".to_string());
    }

    lines.push("</body>".to_string());
    lines.push("</html>".to_string());
    lines.join("\n")
}

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or(UNKNOWN)
}

/// Sender, body, and timestamp with placeholders for missing fields.
fn message_parts(msg: &Message) -> (String, String, String) {
    (
        msg.field_text("sender").unwrap_or_else(|| UNKNOWN.to_string()),
        msg.field_text("body").unwrap_or_else(|| NO_CONTENT.to_string()),
        msg.field_text("timestamp")
            .unwrap_or_else(|| UNKNOWN.to_string()),
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn alice() -> Contact {
        Contact {
            name: Some("Alice Smith".into()),
            number: Some("+15551234567".into()),
            uuid: None,
        }
    }

    fn messages() -> Vec<Message> {
        let raw = json!([
            {"sender": "+15551234567", "body": "hi <b>there</b>", "timestamp": "2024-01-01T10:00:00", "attachments": []},
            {"sender": "me", "timestamp": 1_704_103_200, "extra": {"nested": true}},
        ]);
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_json_round_trip() {
        let input = messages();
        let text = format_messages_json(&input).unwrap();
        let back: Vec<Message> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn test_json_empty_list() {
        let text = format_messages_json(&[]).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), json!([]));
    }

    #[test]
    fn test_markdown_layout() {
        let md = format_messages_markdown(&alice(), &messages(), Utc::now());
        assert!(md.starts_with("# Conversation with Alice Smith\n\nPhone: +15551234567\nUUID: Unknown"));
        assert!(md.contains("Message Count: 2"));
        assert!(md.contains("\n### +15551234567 @ 2024-01-01T10:00:00\n\nhi <b>there</b>"));
        assert!(md.contains("### me @ 1704103200\n\n[no content]"));
    }

    #[test]
    fn test_html_escapes_and_blocks() {
        let html = format_messages_html(&alice(), &messages(), Utc::now());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches("<div class='message'>").count(), 2);
        assert!(html.contains("hi &lt;b&gt;there&lt;/b&gt;"));
        assert!(html.contains("<title>Conversation with Alice Smith</title>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & 'b' \"c\""), "a &amp; &#39;b&#39; &quot;c&quot;");
    }
}
