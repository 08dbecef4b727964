//! tree::mime
//!
//! MIME type guessing for repository paths.
//!
//! Extension lookup comes first since it needs no download. When the path
//! has no extension or an unknown one, the contents are classified by
//! their leading bytes.

use crate::core::paths::extension;

/// Type reported for directories.
pub const DIRECTORY_MIME: &str = "directory";

/// Fallback for binary contents nothing else matched.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Type for readable text contents.
pub const TEXT_PLAIN: &str = "text/plain";

/// MIME type from the path's extension, if known.
pub fn from_extension(path: &str) -> Option<&'static str> {
    extension(path).and_then(|ext| mime_guess::from_ext(ext).first_raw())
}

/// MIME type from file contents.
///
/// Known magic numbers win. Anything else is text when it is valid UTF-8
/// without NUL bytes.
pub fn sniff(contents: &[u8]) -> &'static str {
    if let Some(kind) = infer::get(contents) {
        return kind.mime_type();
    }

    match std::str::from_utf8(contents) {
        Ok(text) if !text.contains('\0') => TEXT_PLAIN,
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(from_extension("docs/readme.md"), Some("text/markdown"));
        assert_eq!(from_extension("a/b.png"), Some("image/png"));
        assert_eq!(from_extension("style.css"), Some("text/css"));
    }

    #[test]
    fn missing_or_unknown_extension() {
        assert_eq!(from_extension("Makefile"), None);
        assert_eq!(from_extension(".gitignore"), None);
        assert_eq!(from_extension("blob.zzzunknown"), None);
    }

    #[test]
    fn sniffs_signatures() {
        assert_eq!(sniff(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"), "image/png");
        assert_eq!(sniff(b"%PDF-1.7\n"), "application/pdf");
        assert_eq!(sniff(b"GIF89a...."), "image/gif");
        assert_eq!(sniff(b"RIFF\x24\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(sniff(b"\x1f\x8b\x08\0\0\0\0\0"), "application/gzip");
    }

    #[test]
    fn text_and_binary() {
        assert_eq!(sniff(b"all: build\n"), TEXT_PLAIN);
        assert_eq!(sniff(b""), TEXT_PLAIN);
        assert_eq!(sniff(b"abc\0def"), OCTET_STREAM);
        assert_eq!(sniff(&[0xfe, 0xfe, 0x01]), OCTET_STREAM);
    }
}
