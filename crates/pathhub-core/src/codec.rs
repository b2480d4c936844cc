//! Encoding of filesystem paths into `pathhub://` URLs and back.
//!
//! Each backslash-delimited segment is percent-encoded on its own and the
//! segments are joined with the literal token `%5C`. The URL therefore never
//! carries a raw separator that a browser or HTML parser could rewrite, while
//! segment boundaries stay recoverable on the decoding side.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PathHubError;
use crate::normalize::normalize_windows_path;

/// URL scheme registered for the protocol helper.
pub const SCHEME: &str = "pathhub";

/// Percent-encoded backslash, used as the segment delimiter inside URLs.
pub const ENCODED_SEPARATOR: &str = "%5C";

/// A `scheme://<encoded-path>` URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProtocolUrl(String);

impl ProtocolUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ProtocolUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProtocolUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Result of decoding a protocol URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPath {
    /// Best-effort path. Normalized unless decoding failed as a whole.
    pub path: String,
    /// Decode failures. A segment listed here was kept in its raw encoded
    /// form, so `path` no longer matches the path that was shared.
    pub lossy_segments: Vec<PathHubError>,
}

impl DecodedPath {
    fn lossless(path: String) -> Self {
        Self {
            path,
            lossy_segments: Vec::new(),
        }
    }

    pub fn is_lossless(&self) -> bool {
        self.lossy_segments.is_empty()
    }
}

/// Percent-encode a path segment by segment, joined with `%5C`.
///
/// Empty segments (UNC prefix, doubled separators) stay empty so the decoder
/// rebuilds the same separator layout. A one-letter first segment is escaped
/// (`a\b.txt` becomes `%61%5Cb.txt`) so it cannot be read back as a drive.
pub fn encode_path(path: &str) -> String {
    let encoded = path
        .split('\\')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join(ENCODED_SEPARATOR);

    match path.as_bytes() {
        [letter, b'\\' | b'/', ..] if letter.is_ascii_alphabetic() => {
            format!("%{:02X}{}", letter, &encoded[1..])
        }
        _ => encoded,
    }
}

/// Build the `pathhub://` URL for a path.
pub fn protocol_url(path: &str) -> ProtocolUrl {
    protocol_url_with_scheme(path, SCHEME)
}

/// Build a protocol URL for a path using a custom scheme.
pub fn protocol_url_with_scheme(path: &str, scheme: &str) -> ProtocolUrl {
    ProtocolUrl(format!("{}://{}", scheme, encode_path(path)))
}

/// Recover and normalize the path carried by a `pathhub://` URL.
///
/// Never fails. Input that does not use the scheme is returned unchanged.
pub fn decode_protocol_url(url: &str) -> DecodedPath {
    decode_protocol_url_with_scheme(url, SCHEME)
}

/// Same as [`decode_protocol_url`] for a custom scheme.
pub fn decode_protocol_url_with_scheme(url: &str, scheme: &str) -> DecodedPath {
    let Some(remainder) = strip_scheme(url, scheme) else {
        debug!("Input is not a {}:// URL, using it as-is", scheme);
        return DecodedPath::lossless(url.to_string());
    };
    let remainder = strip_query(remainder);
    debug!("Encoded path: {}", remainder);
    let drive_letter = starts_with_bare_letter(remainder);

    if remainder.contains(ENCODED_SEPARATOR) {
        decode_segments(remainder, drive_letter)
    } else {
        match decode_segment(remainder) {
            Ok(decoded) => {
                debug!("Decoded as a single unit: {}", decoded);
                let decoded = restore_drive_colon(decoded, drive_letter);
                DecodedPath::lossless(normalize_windows_path(&decoded))
            }
            Err(e) => {
                warn!("Failed to decode path, keeping encoded form: {}", e);
                DecodedPath {
                    path: remainder.to_string(),
                    lossy_segments: vec![e],
                }
            }
        }
    }
}

fn decode_segments(remainder: &str, drive_letter: bool) -> DecodedPath {
    let mut lossy_segments = Vec::new();
    let mut decoded_parts = Vec::new();

    for part in remainder.split(ENCODED_SEPARATOR) {
        if part.is_empty() {
            decoded_parts.push(String::new());
            continue;
        }
        match decode_segment(part) {
            Ok(decoded) => decoded_parts.push(decoded),
            Err(e) => {
                warn!("Keeping segment '{}' undecoded: {}", part, e);
                decoded_parts.push(part.to_string());
                lossy_segments.push(e);
            }
        }
    }

    let joined = restore_drive_colon(decoded_parts.join("\\"), drive_letter);
    debug!("Decoded {} segments: {}", decoded_parts.len(), joined);

    DecodedPath {
        path: normalize_windows_path(&joined),
        lossy_segments,
    }
}

/// Percent-decode one unit, rejecting malformed escapes and non-UTF-8 bytes.
fn decode_segment(segment: &str) -> Result<String, PathHubError> {
    let bytes = segment.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape_ok = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !escape_ok {
                return Err(PathHubError::Decode {
                    segment: segment.to_string(),
                    reason: format!("malformed percent escape at byte {}", i),
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| PathHubError::Decode {
            segment: segment.to_string(),
            reason: format!("invalid UTF-8: {}", e),
        })
}

fn strip_scheme<'a>(url: &'a str, scheme: &str) -> Option<&'a str> {
    let prefix_len = scheme.len() + 3;
    let prefix = url.get(..prefix_len)?;
    let (name, slashes) = prefix.split_at(scheme.len());
    if name.eq_ignore_ascii_case(scheme) && slashes == "://" {
        Some(&url[prefix_len..])
    } else {
        None
    }
}

/// Drop a `?query` or `#fragment` appended by the sharing page.
fn strip_query(remainder: &str) -> &str {
    match remainder.find(['?', '#']) {
        Some(idx) => &remainder[..idx],
        None => remainder,
    }
}

/// Whether the still-encoded URL body starts with a literal one-letter
/// segment followed by a separator, raw or escaped.
fn starts_with_bare_letter(remainder: &str) -> bool {
    let bytes = remainder.as_bytes();
    if bytes.len() < 2 || !bytes[0].is_ascii_alphabetic() {
        return false;
    }
    match &bytes[1..] {
        [b'\\' | b'/', ..] => true,
        [b'%', hi, lo, ..] => {
            let escape = [*hi, *lo];
            escape.eq_ignore_ascii_case(b"5C") || escape.eq_ignore_ascii_case(b"2F")
        }
        _ => false,
    }
}

/// Browsers drop the colon after a drive letter (`C:` parses like a port), so
/// a literal `C%5CUsers` is read back as `C:\Users`. An escaped letter
/// (`%61%5Cb.txt`) is a relative segment and is left alone.
fn restore_drive_colon(path: String, drive_letter: bool) -> String {
    let bytes = path.as_bytes();
    if drive_letter
        && bytes.len() >= 2
        && bytes[0].is_ascii_alphabetic()
        && matches!(bytes[1], b'\\' | b'/')
    {
        let mut restored = String::with_capacity(path.len() + 1);
        restored.push_str(&path[..1]);
        restored.push(':');
        restored.push_str(&path[1..]);
        restored
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_local_path() {
        assert_eq!(
            encode_path("C:\\Users\\Documents\\sample.txt"),
            "C%3A%5CUsers%5CDocuments%5Csample.txt"
        );
    }

    #[test]
    fn test_encode_escapes_spaces_and_unicode() {
        let encoded = encode_path("C:\\My Files\\ユーザー");
        assert_eq!(
            encoded,
            "C%3A%5CMy%20Files%5C%E3%83%A6%E3%83%BC%E3%82%B6%E3%83%BC"
        );
        assert!(!encoded.contains('\\'));
        assert!(!encoded.contains(' '));
    }

    #[test]
    fn test_encode_escapes_one_letter_first_segment() {
        assert_eq!(encode_path("a\\b.txt"), "%61%5Cb.txt");
        assert_eq!(encode_path("a/b.txt"), "%61%2Fb.txt");
        assert_eq!(encode_path("ab\\c.txt"), "ab%5Cc.txt");
        assert_eq!(encode_path("a"), "a");
    }

    #[test]
    fn test_relative_one_letter_segment_is_not_a_drive() {
        for path in ["a\\b.txt", "Z\\notes\\todo.md", "x/y"] {
            let decoded = decode_protocol_url(protocol_url(path).as_str());
            assert_eq!(decoded.path, normalize_windows_path(path), "path: {path}");
            assert!(decoded.is_lossless());
        }
    }

    #[test]
    fn test_decode_restores_drive_colon_in_simple_mode() {
        assert_eq!(decode_protocol_url("pathhub://C/Users/a.txt").path, "C:\\Users\\a.txt");
        assert_eq!(decode_protocol_url("pathhub://d%2fdata").path, "d:\\data");
        assert_eq!(decode_protocol_url("pathhub://%61%2Fb.txt").path, "a\\b.txt");
    }

    #[test]
    fn test_encode_unc_keeps_empty_leading_segments() {
        assert_eq!(
            encode_path("\\\\server\\share\\dir"),
            "%5C%5Cserver%5Cshare%5Cdir"
        );
    }

    #[test]
    fn test_protocol_url() {
        assert_eq!(
            protocol_url("C:\\Users").as_str(),
            "pathhub://C%3A%5CUsers"
        );
        assert_eq!(
            protocol_url_with_scheme("C:\\Users", "other").to_string(),
            "other://C%3A%5CUsers"
        );
    }

    #[test]
    fn test_decode_restores_drive_colon() {
        let decoded = decode_protocol_url("pathhub://C%5CUsers%5CDocuments%5Csample.txt");
        assert_eq!(decoded.path, "C:\\Users\\Documents\\sample.txt");
        assert!(decoded.is_lossless());
    }

    #[test]
    fn test_decode_unc_path() {
        let decoded = decode_protocol_url("pathhub://%5C%5Cserver%5Cshare%5Cdeep%5Cpath");
        assert_eq!(decoded.path, "\\\\server\\share\\deep\\path");
    }

    #[test]
    fn test_decode_simple_mode() {
        let decoded = decode_protocol_url("pathhub://C%3A%2FUsers%2Fsample.txt");
        assert_eq!(decoded.path, "C:\\Users\\sample.txt");
        assert!(decoded.is_lossless());
    }

    #[test]
    fn test_decode_simple_mode_failure_keeps_encoded_text() {
        let decoded = decode_protocol_url("pathhub://C%3A%2FUsers%ZZ");
        assert_eq!(decoded.path, "C%3A%2FUsers%ZZ");
        assert_eq!(decoded.lossy_segments.len(), 1);
    }

    #[test]
    fn test_decode_keeps_malformed_segment_raw() {
        let decoded = decode_protocol_url("pathhub://C%3A%5Cbad%E3%5Cgood%20name");
        assert_eq!(decoded.path, "C:\\bad%E3\\good name");
        assert_eq!(decoded.lossy_segments.len(), 1);
        match &decoded.lossy_segments[0] {
            PathHubError::Decode { segment, .. } => assert_eq!(segment, "bad%E3"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_truncated_escape_is_lossy() {
        let decoded = decode_protocol_url("pathhub://C%3A%5Cfile%2");
        assert_eq!(decoded.path, "C:\\file%2");
        assert!(!decoded.is_lossless());
    }

    #[test]
    fn test_decode_non_protocol_input_is_unchanged() {
        let decoded = decode_protocol_url("C:/Users/raw");
        assert_eq!(decoded.path, "C:/Users/raw");
        assert!(decoded.is_lossless());
    }

    #[test]
    fn test_decode_scheme_is_case_insensitive() {
        let decoded = decode_protocol_url("PathHub://C%3A%5CUsers");
        assert_eq!(decoded.path, "C:\\Users");
    }

    #[test]
    fn test_decode_strips_query_and_trailing_slash() {
        let decoded = decode_protocol_url("pathhub://C%3A%5CUsers%5Cdocs/?auto=true");
        assert_eq!(decoded.path, "C:\\Users\\docs");
    }

    #[test]
    fn test_decode_empty_remainder() {
        assert_eq!(decode_protocol_url("pathhub://").path, "");
    }

    #[test]
    fn test_decode_does_not_treat_plus_as_space() {
        let decoded = decode_protocol_url("pathhub://C%3A%5Ca+b.txt");
        assert_eq!(decoded.path, "C:\\a+b.txt");
    }
}
