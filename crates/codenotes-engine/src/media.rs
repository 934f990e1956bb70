//! Media block helpers: YouTube id extraction and image URL checks.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{ImageData, VideoData};

fn youtube_id_regexes() -> &'static [Regex; 2] {
    static RE: OnceLock<[Regex; 2]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)")
                .expect("Invalid youtube url regex"),
            Regex::new(r"youtube\.com/watch\?.*v=([^&\n?#]+)").expect("Invalid youtube url regex"),
        ]
    })
}

fn image_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://\S+\.(jpg|jpeg|png|gif|webp|svg)$")
            .expect("Invalid image url regex")
    })
}

/// Extracts the video id from `watch?v=`, `youtu.be/` and `/embed/` URLs.
pub fn extract_youtube_id(url: &str) -> Option<String> {
    youtube_id_regexes()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn is_valid_youtube_url(url: &str) -> bool {
    extract_youtube_id(url).is_some()
}

/// True for absolute URLs ending in a known image extension.
pub fn is_valid_image_url(url: &str) -> bool {
    image_url_regex().is_match(url.trim())
}

pub fn youtube_watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

pub fn youtube_embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{video_id}")
}

/// Video payload for a pasted or typed URL; `None` when no id can be found.
pub fn video_from_url(url: &str, description: &str) -> Option<VideoData> {
    let url = url.trim();
    let video_id = extract_youtube_id(url)?;
    Some(VideoData {
        video_url: url.to_string(),
        video_id,
        description: description.to_string(),
    })
}

/// Video payload for a known id, using the canonical watch URL.
pub fn video_from_id(video_id: &str, description: &str) -> VideoData {
    VideoData {
        video_id: video_id.to_string(),
        video_url: youtube_watch_url(video_id),
        description: description.to_string(),
    }
}

/// Image payload for a URL; `None` unless the URL passes [`is_valid_image_url`].
pub fn image_from_url(src: &str, alt: &str) -> Option<ImageData> {
    let src = src.trim();
    is_valid_image_url(src).then(|| ImageData {
        src: src.to_string(),
        alt: alt.to_string(),
        description: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ", Some("dQw4w9WgXcQ"))]
    #[case("https://youtu.be/dQw4w9WgXcQ", Some("dQw4w9WgXcQ"))]
    #[case("https://www.youtube.com/embed/dQw4w9WgXcQ", Some("dQw4w9WgXcQ"))]
    #[case("https://www.youtube.com/watch?v=abc123&t=10s", Some("abc123"))]
    #[case("https://www.youtube.com/watch?feature=share&v=xyz789", Some("xyz789"))]
    #[case("https://vimeo.com/123456", None)]
    #[case("not a url", None)]
    fn test_extract_youtube_id(#[case] url: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_youtube_id(url).as_deref(), expected);
    }

    #[rstest]
    #[case("https://example.com/cat.png", true)]
    #[case("https://example.com/cat.JPEG", true)]
    #[case("http://example.com/a/b/diagram.svg", true)]
    #[case("https://example.com/cat.png?size=2", false)]
    #[case("example.com/cat.png", false)]
    #[case("https://example.com/page.html", false)]
    fn test_is_valid_image_url(#[case] url: &str, #[case] expected: bool) {
        assert_eq!(is_valid_image_url(url), expected);
    }

    #[test]
    fn test_video_from_url_keeps_original_url() {
        let video = video_from_url(" https://youtu.be/abc ", "demo").unwrap();
        assert_eq!(
            video,
            VideoData {
                video_id: "abc".to_string(),
                video_url: "https://youtu.be/abc".to_string(),
                description: "demo".to_string(),
            }
        );
    }

    #[test]
    fn test_video_from_id_builds_watch_url() {
        let video = video_from_id("abc", "");
        assert_eq!(video.video_url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(youtube_embed_url("abc"), "https://www.youtube.com/embed/abc");
    }

    #[test]
    fn test_image_from_url_rejects_non_images() {
        assert!(image_from_url("https://example.com/x.txt", "").is_none());
        assert_eq!(
            image_from_url("https://example.com/x.gif", "x").unwrap().src,
            "https://example.com/x.gif"
        );
    }
}
