use std::fmt;
use url::Url;

/// Resource types a surface can refuse to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Document,
    Image,
    Stylesheet,
    Font,
    Media,
    Script,
}

/// Resource types blocked on every crawl surface before its first navigation
pub const DEFAULT_BLOCKED_RESOURCES: &[ResourceKind] = &[
    ResourceKind::Image,
    ResourceKind::Stylesheet,
    ResourceKind::Font,
    ResourceKind::Media,
];

impl ResourceKind {
    /// Infers the resource type from the extension of the URL's last path segment
    ///
    /// Anything without a known asset extension is treated as a document.
    pub fn from_url(url: &Url) -> Self {
        let extension = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|last| last.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" | "ico" | "bmp" | "avif") => {
                Self::Image
            }
            Some("css") => Self::Stylesheet,
            Some("woff" | "woff2" | "ttf" | "otf" | "eot") => Self::Font,
            Some("mp4" | "webm" | "mp3" | "wav" | "ogg" | "mov" | "avi" | "m4a") => Self::Media,
            Some("js" | "mjs") => Self::Script,
            _ => Self::Document,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Document => "document",
            Self::Image => "image",
            Self::Stylesheet => "stylesheet",
            Self::Font => "font",
            Self::Media => "media",
            Self::Script => "script",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(url: &str) -> ResourceKind {
        ResourceKind::from_url(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_asset_extensions() {
        assert_eq!(kind("https://a.com/img/logo.PNG"), ResourceKind::Image);
        assert_eq!(kind("https://a.com/site.css?v=3"), ResourceKind::Stylesheet);
        assert_eq!(kind("https://a.com/fonts/inter.woff2"), ResourceKind::Font);
        assert_eq!(kind("https://a.com/intro.mp4"), ResourceKind::Media);
        assert_eq!(kind("https://a.com/app.js"), ResourceKind::Script);
    }

    #[test]
    fn test_documents() {
        assert_eq!(kind("https://a.com/"), ResourceKind::Document);
        assert_eq!(kind("https://a.com/contact"), ResourceKind::Document);
        assert_eq!(kind("https://a.com/index.html"), ResourceKind::Document);
        assert_eq!(kind("https://a.com/v1.2/about"), ResourceKind::Document);
    }

    #[test]
    fn test_default_policy_keeps_documents_and_scripts() {
        assert!(!DEFAULT_BLOCKED_RESOURCES.contains(&ResourceKind::Document));
        assert!(!DEFAULT_BLOCKED_RESOURCES.contains(&ResourceKind::Script));
        assert_eq!(DEFAULT_BLOCKED_RESOURCES.len(), 4);
    }
}
