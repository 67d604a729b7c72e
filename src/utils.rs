use sha2::{Digest, Sha256};

/// Characters of the readable part of a record file name
const STEM_PREFIX_CHARS: usize = 64;

/// Hex digits of the id digest appended to a record file name
const STEM_DIGEST_CHARS: usize = 16;

/// Convert a page id or URL to a sanitized file name stem
pub fn sanitize_filename(id: &str) -> String {
    // Remove protocol and replace invalid filename characters
    let mut name = id.replace("http://", "").replace("https://", "");
    name = name.replace(['/', '\\', ':', '?', '&', '=', '#', '%', '*', '"', '<', '>', '|'], "_");

    // Limit filename length on a char boundary
    if name.chars().count() > 100 {
        name.chars().take(100).collect()
    } else {
        name
    }
}

/// File name stem of a page record: readable prefix plus a digest of the full id.
///
/// Distinct ids get distinct stems even when their sanitized forms agree.
pub fn record_file_stem(page_id: &str) -> String {
    let prefix = sanitize_filename(page_id)
        .chars()
        .take(STEM_PREFIX_CHARS)
        .collect::<String>();

    let mut hasher = Sha256::new();
    hasher.update(page_id.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    format!("{}-{}", prefix, &digest[..STEM_DIGEST_CHARS])
}
