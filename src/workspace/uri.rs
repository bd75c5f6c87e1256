//! Decoding of stored `file://` references into native filesystem paths.
//!
//! Editor state stores persist open files and workspace folders as
//! percent-encoded `file://` URIs. [`decode_file_uri`] turns one of those
//! into a native path. The function is total and pure: any malformed input
//! yields an empty string, which callers must treat as "skip, undecodable".

/// Path separator convention of the decode target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFlavor {
    /// Drive-letter paths with backslash separators (`C:\foo\bar`).
    Windows,
    /// Forward-slash paths, returned unchanged after decoding.
    Posix,
}

impl PathFlavor {
    /// Flavor of the platform this binary runs on.
    pub fn native() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

/// Decodes a stored `file://` URI into a native path for this platform.
///
/// Returns `""` when the input is not a decodable file URI.
pub fn decode_file_uri(uri: &str) -> String {
    decode_file_uri_for(uri, PathFlavor::native())
}

/// Decodes a stored `file://` URI into a path for the given flavor.
///
/// Strips the `file://` prefix, percent-decodes, and for the Windows
/// flavor rewrites a leading `/X:` segment to `X:` and converts forward
/// slashes to backslashes. Never panics; malformed input (missing scheme,
/// invalid percent-encoding, empty path) yields `""`.
pub fn decode_file_uri_for(uri: &str, flavor: PathFlavor) -> String {
    let Some(rest) = uri.strip_prefix("file://") else {
        return String::new();
    };

    let decoded = match urlencoding::decode(rest) {
        Ok(s) => s.into_owned(),
        Err(_) => return String::new(),
    };

    if decoded.is_empty() {
        return String::new();
    }

    match flavor {
        PathFlavor::Posix => decoded,
        PathFlavor::Windows => {
            // "/C:/foo/bar" is how drive-letter paths round-trip through
            // file URIs; strip the leading slash before the drive.
            let trimmed = match decoded.as_bytes() {
                [b'/', drive, b':', ..] if drive.is_ascii_alphabetic() => &decoded[1..],
                _ => decoded.as_str(),
            };
            trimmed.replace('/', "\\")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_posix_path_unchanged() {
        assert_eq!(
            decode_file_uri_for("file:///home/u/bar.txt", PathFlavor::Posix),
            "/home/u/bar.txt"
        );
    }

    #[test]
    fn test_decode_windows_drive_letter() {
        assert_eq!(
            decode_file_uri_for("file:///C:/foo/bar.txt", PathFlavor::Windows),
            "C:\\foo\\bar.txt"
        );
    }

    #[test]
    fn test_decode_percent_encoding() {
        assert_eq!(
            decode_file_uri_for("file:///home/u/my%20project/a.rs", PathFlavor::Posix),
            "/home/u/my project/a.rs"
        );
    }

    #[test]
    fn test_decode_never_panics_on_garbage() {
        for input in ["", "not a uri", "file://", "http://example.com/a", "file:///%zz"] {
            let _ = decode_file_uri_for(input, PathFlavor::Posix);
            let _ = decode_file_uri_for(input, PathFlavor::Windows);
        }
    }

    #[test]
    fn test_decode_empty_input_yields_empty() {
        assert_eq!(decode_file_uri_for("", PathFlavor::Posix), "");
    }

    #[test]
    fn test_decode_non_uri_text_yields_empty() {
        assert_eq!(decode_file_uri_for("/home/u/plain/path", PathFlavor::Posix), "");
        assert_eq!(decode_file_uri_for("https://host/x", PathFlavor::Posix), "");
    }

    #[test]
    fn test_decode_invalid_percent_sequence_yields_empty() {
        // 0x80 alone is not valid UTF-8 once decoded
        assert_eq!(decode_file_uri_for("file:///tmp/%80", PathFlavor::Posix), "");
    }

    #[test]
    fn test_decode_bare_scheme_yields_empty() {
        assert_eq!(decode_file_uri_for("file://", PathFlavor::Windows), "");
    }

    #[test]
    fn test_windows_path_without_drive_still_converts_separators() {
        assert_eq!(
            decode_file_uri_for("file:///shared/foo/bar", PathFlavor::Windows),
            "\\shared\\foo\\bar"
        );
    }
}
