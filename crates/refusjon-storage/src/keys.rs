//! Shared key generation for storage backends.
//!
//! Key format: `documents/{timestamp_millis}-{filename}`. The timestamp
//! prefix keeps repeat uploads of the same filename from clobbering each
//! other; the filename is sanitized so the key is valid on every backend.

/// Strip characters that are unsafe in object keys or filesystem paths.
///
/// Path separators and parent references are removed outright; anything
/// outside a conservative allowlist becomes '_'. An empty result falls back
/// to "file".
pub fn sanitize_filename(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .replace("..", "");

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(['.', '_']).is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

/// Generate the storage key for an uploaded document.
///
/// All backends must use this format for consistency.
pub fn document_key(timestamp_millis: u64, filename: &str) -> String {
    format!("documents/{}-{}", timestamp_millis, sanitize_filename(filename))
}
