//! Source type detection

use url::Url;

/// Extensions played directly by the media element
const FILE_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "webm", "ogv", "ogg"];

/// How a source URL should be fed to the media element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Progressive file, always played directly
    File,
    /// Adaptive manifest (or anything that is not a known file format)
    Manifest,
}

/// Detect the source kind from the URL path's extension.
///
/// Query string and fragment are ignored; relative URLs are accepted.
pub fn detect_source_kind(src: &str) -> SourceKind {
    let path = resolve(src)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|| strip_suffixes(src).to_string());

    let extension = path
        .rsplit('/')
        .next()
        .and_then(|file| file.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if FILE_EXTENSIONS.contains(&ext.as_str()) => SourceKind::File,
        _ => SourceKind::Manifest,
    }
}

/// `src` with any `#fragment` removed
pub fn without_fragment(src: &str) -> &str {
    src.split_once('#').map_or(src, |(head, _)| head)
}

fn resolve(src: &str) -> Option<Url> {
    let base = Url::parse("http://localhost/").ok()?;
    base.join(src).ok()
}

fn strip_suffixes(src: &str) -> &str {
    let src = without_fragment(src);
    src.split_once('?').map_or(src, |(head, _)| head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_file() {
        assert_eq!(detect_source_kind("clip.mp4"), SourceKind::File);
        assert_eq!(detect_source_kind("https://cdn.example/v/clip.MP4"), SourceKind::File);
        assert_eq!(detect_source_kind("/media/clip.webm?token=abc#t=3"), SourceKind::File);
    }

    #[test]
    fn test_detect_manifest() {
        assert_eq!(detect_source_kind("stream.m3u8"), SourceKind::Manifest);
        assert_eq!(
            detect_source_kind("https://cdn.example/live/master.m3u8?session=1"),
            SourceKind::Manifest
        );
        assert_eq!(detect_source_kind("https://cdn.example/playlist"), SourceKind::Manifest);
        assert_eq!(detect_source_kind("https://mp4.example/stream"), SourceKind::Manifest);
    }

    #[test]
    fn test_without_fragment() {
        assert_eq!(without_fragment("clip.mp4#t=5"), "clip.mp4");
        assert_eq!(without_fragment("clip.mp4"), "clip.mp4");
    }
}
