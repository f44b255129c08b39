use std::path::Path;

const SKIPPED_EXTENSIONS: &[&str] = &[
    "gz", "tgz", "tar", "zip", "bz2", "xz", "db", "sqlite", "png", "jpg", "jpeg", "gif", "pdf",
];

/// Whether a file found while scanning a corpus directory should be read as a
/// document. Hidden files and archives/binaries are skipped; the newsgroup
/// archive stores posts in files without an extension.
pub fn is_supported_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    !SKIPPED_EXTENSIONS.contains(&ext.as_str())
}

/// Decode bytes as ISO-8859-1. Every byte maps to the code point of the same
/// value, so this never fails.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head.trim_end())
    } else {
        head
    }
}
