use std::borrow::Cow;
use std::env;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

// Maximum size of a single log file: 10MB
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

// Characters the messaging client leaves unescaped in log directory names
const ESCAPE_SET: &AsciiSet =
    &NON_ALPHANUMERIC.remove(b'@').remove(b'-').remove(b'_').remove(b'.').remove(b'#');

/// Escapes an account or buddy name into a log directory name
///
/// # Examples
///
/// ```
/// use purple_log_explorer::escape_filename;
///
/// assert_eq!(escape_filename("bob@example.org"), "bob@example.org");
/// assert_eq!(escape_filename("Bob Smith/Home"), "Bob%20Smith%2FHome");
/// ```
pub fn escape_filename(name: &str) -> String {
    utf8_percent_encode(name, ESCAPE_SET).to_string()
}

/// Decodes a log directory name back into the account or buddy name
///
/// # Examples
///
/// ```
/// use purple_log_explorer::unescape_filename;
///
/// assert_eq!(unescape_filename("Bob%20Smith%2FHome"), "Bob Smith/Home");
/// ```
pub fn unescape_filename(escaped: &str) -> String {
    match percent_decode_str(escaped).decode_utf8_lossy() {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}

/// Normalizes an identity the way the client does before naming log directories:
/// lowercase, without a trailing `/resource`.
pub fn normalize_name(name: &str) -> String {
    let without_resource = name.split_once('/').map(|(base, _)| base).unwrap_or(name);
    without_resource.to_lowercase()
}

/// Validates that a file's size is within acceptable limits (10MB)
///
/// Takes an open file handle so the size check and the subsequent read see the
/// same file.
///
/// # Errors
///
/// Returns an error if:
/// - The file metadata cannot be read
/// - The file is larger than 10MB
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_FILE_SIZE_BYTES {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_FILE_SIZE_BYTES
        );
    }

    Ok(())
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use purple_log_explorer::format_path_with_tilde;
///
/// let path = PathBuf::from("/home/alice/.purple");
/// // Returns "~/.purple" if HOME=/home/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
