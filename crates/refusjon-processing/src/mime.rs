//! Content-type resolution for fetched receipt images.

/// Whether a filename (or URL path) points at a HEIC/HEIF image.
///
/// Detection is by extension: HEIC uploads frequently arrive with an empty or
/// generic content type, so the name is the reliable signal.
pub fn is_heic(name: &str) -> bool {
    let lower = name.to_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or(&lower);
    path.ends_with(".heic") || path.ends_with(".heif")
}

/// Resolve the MIME type of a fetched image.
///
/// The upstream `Content-Type` header wins when it names an image type.
/// Otherwise the extension is sniffed in a fixed order, and anything
/// unrecognized defaults to JPEG.
pub fn resolve_mime(content_type: Option<&str>, name: &str) -> &'static str {
    if let Some(ct) = content_type {
        let ct = ct.split(';').next().unwrap_or(ct).trim().to_lowercase();
        match ct.as_str() {
            "image/png" => return "image/png",
            "image/jpeg" | "image/jpg" => return "image/jpeg",
            "image/webp" => return "image/webp",
            "image/gif" => return "image/gif",
            "image/bmp" => return "image/bmp",
            "image/heic" => return "image/heic",
            "image/heif" => return "image/heif",
            _ => {}
        }
    }

    let lower = name.to_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or(&lower);
    if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        "image/jpeg"
    } else if path.ends_with(".webp") {
        "image/webp"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else if path.ends_with(".bmp") {
        "image/bmp"
    } else if path.ends_with(".heic") {
        "image/heic"
    } else if path.ends_with(".heif") {
        "image/heif"
    } else {
        "image/jpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_wins_over_extension() {
        assert_eq!(
            resolve_mime(Some("image/png"), "receipt.jpg"),
            "image/png"
        );
        assert_eq!(
            resolve_mime(Some("image/webp; charset=binary"), "x"),
            "image/webp"
        );
    }

    #[test]
    fn extension_sniffing_order_and_default() {
        assert_eq!(resolve_mime(None, "a.png"), "image/png");
        assert_eq!(resolve_mime(None, "a.JPG"), "image/jpeg");
        assert_eq!(resolve_mime(None, "a.jpeg"), "image/jpeg");
        assert_eq!(resolve_mime(None, "a.webp"), "image/webp");
        assert_eq!(resolve_mime(None, "a.gif"), "image/gif");
        assert_eq!(resolve_mime(None, "a.bmp"), "image/bmp");
        // Unknown extensions fall back to JPEG
        assert_eq!(resolve_mime(None, "a.bin"), "image/jpeg");
        assert_eq!(resolve_mime(Some("application/octet-stream"), "a.bin"), "image/jpeg");
    }

    #[test]
    fn query_strings_do_not_confuse_sniffing() {
        assert_eq!(
            resolve_mime(None, "https://cdn/x/receipt.png?sig=abc"),
            "image/png"
        );
        assert!(is_heic("https://cdn/x/IMG_0042.HEIC?sig=abc"));
    }

    #[test]
    fn heic_detection_by_extension() {
        assert!(is_heic("IMG_0042.heic"));
        assert!(is_heic("IMG_0042.HEIF"));
        assert!(!is_heic("IMG_0042.jpg"));
    }
}
