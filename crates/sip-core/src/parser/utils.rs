// Utility functions for parsing

use crate::error::{Error, Result};

/// Decodes URI percent-encoding (%HH) within a string.
///
/// Only `%HH` escapes are decoded; `+` is left untouched because SIP uses it
/// in parameter names such as `+sip.instance`.
pub fn unescape_uri_component(input: &str) -> Result<String> {
    let bytes = input.as_bytes();
    if !bytes.contains(&b'%') {
        return Ok(input.to_string());
    }

    let mut unescaped: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                if i + 2 < bytes.len() {
                    let h1 = bytes[i + 1];
                    let h2 = bytes[i + 2];
                    if let (Some(v1), Some(v2)) = (hex_val(h1), hex_val(h2)) {
                        unescaped.push((v1 << 4) | v2);
                        i += 3;
                    } else {
                        return Err(Error::MalformedUriComponent {
                            component: input.to_string(),
                            message: format!("Invalid hex sequence: %{}{}", h1 as char, h2 as char),
                        });
                    }
                } else {
                    return Err(Error::MalformedUriComponent {
                        component: input.to_string(),
                        message: "Incomplete escape sequence at end of input".to_string(),
                    });
                }
            }
            b => {
                unescaped.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(unescaped).map_err(|e| Error::MalformedUriComponent {
        component: input.to_string(),
        message: format!("UTF-8 error after unescaping: {}", e),
    })
}

// Helper to convert a hex character (byte) to its value (0-15)
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Strips surrounding whitespace and then one layer of double quotes.
pub fn trim_quotes(value: &str) -> &str {
    value.trim().trim_matches('"').trim()
}

/// Returns `true` if the value must be quoted when written back to the wire.
pub fn needs_quoting(value: &str) -> bool {
    value.contains(|c: char| c == ' ' || c == '\t')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_uri_component() {
        assert_eq!(unescape_uri_component("simple").unwrap(), "simple");
        assert_eq!(unescape_uri_component("%20").unwrap(), " ");
        assert_eq!(unescape_uri_component("a%20b%20c").unwrap(), "a b c");
        assert_eq!(unescape_uri_component("%41%42%43").unwrap(), "ABC");
        assert_eq!(unescape_uri_component("%c3%a9").unwrap(), "é");
        assert_eq!(unescape_uri_component("%25").unwrap(), "%");
        assert_eq!(unescape_uri_component("+sip.instance").unwrap(), "+sip.instance");
    }

    #[test]
    fn test_unescape_uri_component_invalid() {
        assert!(unescape_uri_component("%").is_err());
        assert!(unescape_uri_component("%2").is_err());
        assert!(unescape_uri_component("%G0").is_err());
        assert!(unescape_uri_component("%2G").is_err());
        assert!(unescape_uri_component("%AF%").is_err());
        assert!(unescape_uri_component("%C0%80").is_err());
    }

    #[test]
    fn test_trim_quotes() {
        assert_eq!(trim_quotes("  \"Alice\" "), "Alice");
        assert_eq!(trim_quotes("token"), "token");
        assert_eq!(trim_quotes("\" padded \""), "padded");
    }
}
