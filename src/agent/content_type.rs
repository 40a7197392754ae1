//! Extension → MIME type resolution for synthesized responses.

/// Resolve a MIME type from the trailing dot-segment of a URL path.
///
/// Case-insensitive; query strings and fragments are ignored. Unrecognized
/// or absent extensions resolve to `text/plain`.
pub fn content_type_for(url: &str) -> &'static str {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url);

    let extension = match path.rsplit('/').next().and_then(|seg| seg.rsplit_once('.')) {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return "text/plain",
    };

    match extension.as_str() {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "json" => "application/json",
        _ => "text/plain",
    }
}
