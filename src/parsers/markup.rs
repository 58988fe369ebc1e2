//! Conversion of log markup to plain text.
//!
//! Logs are stored as the client's HTML subset. Search compares against the
//! plain text, and the terminal surfaces display it.

use tracing::warn;

use crate::models::ReadFlags;

// Wide enough that a conversation line is never wrapped in the middle of a word
const RENDER_WIDTH: usize = 1 << 16;

/// Render markup as undecorated plain text.
///
/// Line-ending tags (`<br>`, `</p>`, ...) become newlines and entities are
/// decoded. Trailing blank space is trimmed from every line and from the end.
/// Markup that cannot be rendered is returned unchanged.
pub fn strip_html(markup: &str) -> String {
    match html2text::config::plain_no_decorate().string_from_read(markup.as_bytes(), RENDER_WIDTH)
    {
        Ok(rendered) => tidy(&rendered),
        Err(e) => {
            warn!(error = %e, "Failed to render log markup, using it verbatim");
            markup.to_string()
        }
    }
}

/// Plain text for display, honouring the log's read flags.
///
/// With [`ReadFlags::NO_NEWLINE`] raw newlines are formatting noise and only the
/// markup breaks lines; otherwise raw newlines are kept as line breaks.
pub fn to_plain_text(text: &str, flags: ReadFlags) -> String {
    let markup: String = if flags.contains(ReadFlags::NO_NEWLINE) {
        text.chars().filter(|c| *c != '\n' && *c != '\r').collect()
    } else {
        text.replace('\r', "").replace('\n', "<br>")
    };
    strip_html(&markup)
}

/// Escape plain text so it survives [`strip_html`] unchanged
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn tidy(rendered: &str) -> String {
    let lines: Vec<&str> = rendered.lines().map(str::trim_end).collect();
    let end = lines.iter().rposition(|line| !line.is_empty()).map_or(0, |last| last + 1);
    lines[..end].join("\n").replace('\u{a0}', " ")
}
