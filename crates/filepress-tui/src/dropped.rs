//! Paths dropped onto the terminal.
//!
//! Terminals deliver a drag-and-drop as pasted text. Depending on the
//! terminal and platform that text is a `file://` URI list, one or more
//! quoted paths, or paths with backslash-escaped spaces.

use std::path::PathBuf;

/// Extract file paths from pasted text, in order.
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for token in split_shell_words(line) {
            if let Some(path) = token_to_path(&token) {
                out.push(path);
            }
        }
    }
    out
}

fn token_to_path(token: &str) -> Option<PathBuf> {
    if token.is_empty() {
        return None;
    }
    let Some(body) = token.strip_prefix("file://") else {
        return Some(PathBuf::from(token));
    };
    // Drop an optional host ("file://localhost/tmp/x").
    let body = match body.find('/') {
        Some(0) => body,
        Some(i) => &body[i..],
        None => return None,
    };
    let decoded = urlencoding::decode(body).ok()?;
    #[cfg(target_os = "windows")]
    let decoded = decoded.trim_start_matches('/').to_string();
    Some(PathBuf::from(decoded.to_string()))
}

/// Split on unquoted whitespace, honouring single quotes, double quotes and
/// (outside Windows) backslash escapes.
fn split_shell_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            // Backslash is a path separator on Windows, an escape elsewhere.
            (None, '\\') if cfg!(not(target_os = "windows")) => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_path() {
        assert_eq!(
            parse_dropped_paths("/tmp/scan.png"),
            vec![PathBuf::from("/tmp/scan.png")]
        );
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn escaped_and_quoted_spaces() {
        assert_eq!(
            parse_dropped_paths(r"/tmp/my\ scan.png '/tmp/other file.jpg'"),
            vec![
                PathBuf::from("/tmp/my scan.png"),
                PathBuf::from("/tmp/other file.jpg"),
            ]
        );
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn file_uri_list() {
        let text = "file:///tmp/a%20b.png\r\nfile://localhost/tmp/c.pdf\n# comment\n";
        assert_eq!(
            parse_dropped_paths(text),
            vec![PathBuf::from("/tmp/a b.png"), PathBuf::from("/tmp/c.pdf")]
        );
    }

    #[test]
    fn blank_paste_is_empty() {
        assert!(parse_dropped_paths("   \n").is_empty());
    }
}
