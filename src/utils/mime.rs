//! Content-Type detection for the preview servers.

use std::path::Path;

/// MIME types the preview servers answer with.
pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const MANIFEST: &str = "application/manifest+json";
    pub const XML: &str = "application/xml";
    pub const WASM: &str = "application/wasm";
    pub const PDF: &str = "application/pdf";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// Guess MIME type from a file path's extension.
pub fn from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    from_extension(ext.as_deref())
}

/// Guess MIME type from an extension (without the dot).
pub fn from_extension(ext: Option<&str>) -> &'static str {
    match ext {
        Some("html" | "htm") => types::HTML,
        Some("css") => types::CSS,
        Some("js" | "mjs" | "cjs") => types::JAVASCRIPT,
        Some("json" | "map") => types::JSON,
        Some("webmanifest") => types::MANIFEST,
        Some("xml") => types::XML,
        Some("txt") => types::PLAIN,
        Some("wasm") => types::WASM,
        Some("pdf") => types::PDF,

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg" | "oga") => "audio/ogg",
        Some("mp4" | "m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("vtt") => "text/vtt; charset=utf-8",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        _ => types::OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(from_path(Path::new("index.html")), types::HTML);
        assert_eq!(from_path(Path::new("a.min.css")), types::CSS);
        assert_eq!(from_path(Path::new("b.js")), types::JAVASCRIPT);
        assert_eq!(from_path(Path::new("b.js.map")), types::JSON);
        assert_eq!(from_path(Path::new("site.webmanifest")), types::MANIFEST);
        assert_eq!(from_path(Path::new("LOGO.PNG")), "image/png");
        assert_eq!(from_path(Path::new("noext")), types::OCTET_STREAM);
    }
}
