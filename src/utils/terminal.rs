//! Terminal output sanitization
//!
//! Log text comes from other people. Before it is printed or drawn it goes through
//! [`sanitize_for_terminal`], which removes escape sequences that could move the
//! cursor, retitle the window or recolor the terminal.

/// Strips terminal escape sequences and control characters from log text
///
/// Removes CSI sequences (`ESC [ ... letter`), OSC sequences (`ESC ] ... BEL` or
/// `ESC ] ... ESC \`), two-byte escapes, and every control character except tab
/// and newline. Carriage returns are dropped so CRLF logs print cleanly.
///
/// # Examples
///
/// ```
/// use purple_log_explorer::utils::terminal::sanitize_for_terminal;
///
/// assert_eq!(sanitize_for_terminal("\x1b[31mbob:\x1b[0m hi"), "bob: hi");
/// assert_eq!(sanitize_for_terminal("\x1b]0;pwned\x07hello"), "hello");
/// ```
pub fn sanitize_for_terminal(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    while let Some(next_ch) = chars.next() {
                        if next_ch.is_ascii_alphabetic() || next_ch == '~' {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(next_ch) = chars.next() {
                        if next_ch == '\x07' {
                            break;
                        }
                        if next_ch == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                Some(_) => {
                    chars.next();
                }
                None => {}
            }
            continue;
        }

        if ch.is_control() && ch != '\t' && ch != '\n' {
            continue;
        }

        result.push(ch);
    }

    result
}
