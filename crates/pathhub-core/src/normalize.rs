//! Windows path normalization and component helpers.
//!
//! All helpers work on strings rather than `std::path::Path`: shared paths are
//! Windows paths regardless of the host the code runs on.

const SEPARATOR: char = '\\';
const UNC_PREFIX: &str = "\\\\";

/// Whether the path is a UNC network path (`\\server\share` or `//server/share`).
pub fn is_unc_path(path: &str) -> bool {
    path.starts_with(UNC_PREFIX) || path.starts_with("//")
}

/// Normalize a Windows path.
///
/// - forward slashes become backslashes
/// - runs of backslashes collapse to one, except the leading UNC prefix which
///   is kept as exactly two
/// - one trailing backslash is removed unless the path is a bare root such as
///   `C:\` (three characters or fewer)
///
/// Normalizing an already normalized path returns it unchanged.
pub fn normalize_windows_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let unified = path.replace('/', "\\");
    let (prefix, rest) = if unified.starts_with(UNC_PREFIX) {
        (UNC_PREFIX, unified.trim_start_matches(SEPARATOR))
    } else {
        ("", unified.as_str())
    };

    let mut normalized = String::with_capacity(unified.len());
    normalized.push_str(prefix);

    let mut previous_was_separator = false;
    for ch in rest.chars() {
        if ch == SEPARATOR {
            if previous_was_separator {
                continue;
            }
            previous_was_separator = true;
        } else {
            previous_was_separator = false;
        }
        normalized.push(ch);
    }

    if normalized.chars().count() > 3 && normalized.ends_with(SEPARATOR) {
        normalized.pop();
    }

    normalized
}

/// Parent directory of a normalized Windows path.
///
/// `C:\a\b` gives `C:\a`, `C:\a` gives the drive root `C:\`, and a UNC path
/// never goes above its `\\server\share` root. A bare name gives `.`.
pub fn parent_dir(path: &str) -> String {
    if is_unc_path(path) {
        let normalized = normalize_windows_path(path);
        let root = unc_server_root(&normalized).unwrap_or_else(|| normalized.clone());
        return match normalized.rfind(SEPARATOR) {
            Some(idx) if idx > root.len() => normalized[..idx].to_string(),
            _ => root,
        };
    }

    match path.rfind(SEPARATOR) {
        None if is_drive(path) => path.to_string(),
        None => ".".to_string(),
        Some(0) => SEPARATOR.to_string(),
        Some(2) if is_drive(&path[..2]) => path[..3].to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Last component of the path, for display in notifications.
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['\\', '/']);
    match trimmed.rsplit(['\\', '/']).next() {
        Some(name) if !name.is_empty() => name,
        _ => path,
    }
}

/// The `\\server\share` root of a UNC path.
///
/// Takes the first four backslash-delimited components, so shares nested
/// deeper than one level are not recognised. Returns `None` for local paths
/// and for UNC paths that stop at the server name.
pub fn unc_server_root(path: &str) -> Option<String> {
    if !is_unc_path(path) {
        return None;
    }

    let normalized = normalize_windows_path(path);
    let components: Vec<&str> = normalized.split(SEPARATOR).take(4).collect();
    match components.as_slice() {
        ["", "", server, share] if !server.is_empty() && !share.is_empty() => {
            Some(components.join("\\"))
        }
        _ => None,
    }
}

fn is_drive(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_converts_forward_slashes() {
        assert_eq!(
            normalize_windows_path("C:/Users/Documents/sample.txt"),
            "C:\\Users\\Documents\\sample.txt"
        );
    }

    #[test]
    fn test_normalize_collapses_separator_runs() {
        assert_eq!(
            normalize_windows_path("C:\\\\Users\\\\\\Documents"),
            "C:\\Users\\Documents"
        );
        assert_eq!(normalize_windows_path("C:/\\Users//x"), "C:\\Users\\x");
    }

    #[test]
    fn test_normalize_keeps_unc_prefix() {
        assert_eq!(
            normalize_windows_path("\\\\server\\\\share\\dir"),
            "\\\\server\\share\\dir"
        );
        assert_eq!(
            normalize_windows_path("//server/share/dir/"),
            "\\\\server\\share\\dir"
        );
    }

    #[test]
    fn test_normalize_reduces_excess_unc_prefix_to_two() {
        assert_eq!(
            normalize_windows_path("\\\\\\\\server\\share"),
            "\\\\server\\share"
        );
        assert_eq!(normalize_windows_path("\\\\\\"), "\\\\");
    }

    #[test]
    fn test_normalize_drive_root_keeps_separator() {
        assert_eq!(normalize_windows_path("C:\\"), "C:\\");
        assert_eq!(normalize_windows_path("C:/"), "C:\\");
        assert_eq!(normalize_windows_path("C:\\\\"), "C:\\");
    }

    #[test]
    fn test_normalize_strips_one_trailing_separator() {
        assert_eq!(normalize_windows_path("C:\\Users\\"), "C:\\Users");
        assert_eq!(normalize_windows_path("C:\\Users\\\\"), "C:\\Users");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_windows_path(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "C:\\Users\\",
            "\\\\\\server\\\\share\\",
            "//a//b//",
            "C:",
            "\\",
            "\\\\",
            "D:\\ユーザー\\\\資料\\",
            "relative//path",
        ];
        for input in inputs {
            let once = normalize_windows_path(input);
            assert_eq!(normalize_windows_path(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_is_unc_path() {
        assert!(is_unc_path("\\\\server\\share"));
        assert!(is_unc_path("//server/share"));
        assert!(!is_unc_path("C:\\Users"));
        assert!(!is_unc_path("\\Users"));
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("C:\\Users\\Documents\\a.txt"), "C:\\Users\\Documents");
        assert_eq!(parent_dir("C:\\a.txt"), "C:\\");
        assert_eq!(parent_dir("C:\\"), "C:\\");
        assert_eq!(parent_dir("C:"), "C:");
        assert_eq!(parent_dir("\\a"), "\\");
        assert_eq!(parent_dir("a.txt"), ".");
    }

    #[test]
    fn test_parent_dir_unc_stops_at_share() {
        assert_eq!(parent_dir("\\\\srv\\share\\dir\\f.txt"), "\\\\srv\\share\\dir");
        assert_eq!(parent_dir("\\\\srv\\share\\dir"), "\\\\srv\\share");
        assert_eq!(parent_dir("\\\\srv\\share"), "\\\\srv\\share");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("C:\\Users\\Documents\\sample.txt"), "sample.txt");
        assert_eq!(file_name("\\\\srv\\share\\資料"), "資料");
        assert_eq!(file_name("C:\\Users\\"), "Users");
        assert_eq!(file_name("report"), "report");
    }

    #[test]
    fn test_unc_server_root() {
        assert_eq!(
            unc_server_root("\\\\server\\share\\deep\\path").as_deref(),
            Some("\\\\server\\share")
        );
        assert_eq!(
            unc_server_root("//server/share/deep").as_deref(),
            Some("\\\\server\\share")
        );
        assert_eq!(
            unc_server_root("\\\\server\\share").as_deref(),
            Some("\\\\server\\share")
        );
        assert_eq!(unc_server_root("\\\\server"), None);
        assert_eq!(unc_server_root("C:\\share\\deep"), None);
    }
}
