//! MIME type inference for source URLs.
//!
//! Unrecognized inputs never fail: the last path segment's extension is used
//! as a best guess.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(concat!(
        r"(?:https?://)?",
        r"(?:www\.)?",
        r"(?:(?:youtube\.com/",
        r"(?:attribution_link\?(?:\S+))?",
        r"(?:v/|embed/|watch/|(?:user/(?:\S+)/)?watch(?:\S+)v=))|",
        r"(?:youtu\.be/|y2u\.be/))",
        r"([A-Za-z0-9_-]{11})",
    ))
    .case_insensitive(true)
    .build()
    .unwrap()
});

static PANOPTO_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^[^/]+://([^/]+)/Panopto/.+\?id=(.+)$")
        .case_insensitive(true)
        .build()
        .unwrap()
});

static VIMEO_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^.*(vimeo\.com/)((channels/[A-z]+/)|(groups/[A-z]+/videos/))?([0-9]+)")
        .case_insensitive(true)
        .build()
        .unwrap()
});

static ECHO360_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^[^/]+://(echo360[^/]+)/media/([^/]+)/h5p.*$")
        .case_insensitive(true)
        .build()
        .unwrap()
});

/// Externally hosted video services recognized by URL shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoHost {
    YouTube,
    Panopto,
    Vimeo,
    Echo360,
}

impl VideoHost {
    /// Recognize a host, trying YouTube, Panopto, Vimeo and Echo360 in that order.
    pub fn detect(url: &str) -> Option<Self> {
        if YOUTUBE_RE.is_match(url) {
            Some(VideoHost::YouTube)
        } else if PANOPTO_RE.is_match(url) {
            Some(VideoHost::Panopto)
        } else if VIMEO_RE.is_match(url) {
            Some(VideoHost::Vimeo)
        } else if ECHO360_RE.is_match(url) {
            Some(VideoHost::Echo360)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoHost::YouTube => "YouTube",
            VideoHost::Panopto => "Panopto",
            VideoHost::Vimeo => "Vimeo",
            VideoHost::Echo360 => "Echo360",
        }
    }
}

/// Self-hosted video formats that the player can fit visually.
pub const FITTABLE_VIDEO_MIMES: [&str; 3] = ["video/mp4", "video/webm", "video/ogg"];

/// The extension of the URL's last path segment, ignoring query and fragment.
pub fn extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment
        .rsplit('.')
        .next()
        .unwrap_or(segment)
        .to_lowercase()
}

pub fn image_mime(url: &str) -> String {
    let subtype = match extension(url).as_str() {
        "svg" => "svg+xml".to_owned(),
        "jpg" => "jpeg".to_owned(),
        other => other.to_owned(),
    };
    format!("image/{subtype}")
}

pub fn audio_mime(url: &str) -> String {
    let subtype = match extension(url).as_str() {
        "mp3" => "mpeg".to_owned(),
        "ogv" | "oga" => "ogg".to_owned(),
        other => other.to_owned(),
    };
    format!("audio/{subtype}")
}

pub fn video_mime(url: &str) -> String {
    if let Some(host) = VideoHost::detect(url) {
        return format!("video/{}", host.as_str());
    }

    let subtype = match extension(url).as_str() {
        "ogv" => "ogg".to_owned(),
        other => other.to_owned(),
    };
    format!("video/{subtype}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_overrides() {
        assert_eq!(image_mime("https://example.com/logo.svg"), "image/svg+xml");
        assert_eq!(image_mime("https://example.com/a.jpg"), "image/jpeg");
        assert_eq!(image_mime("https://example.com/a.PNG?w=200"), "image/png");
    }

    #[test]
    fn audio_overrides() {
        assert_eq!(audio_mime("https://example.com/song.mp3"), "audio/mpeg");
        assert_eq!(audio_mime("https://example.com/song.oga"), "audio/ogg");
        assert_eq!(audio_mime("https://example.com/song.ogv"), "audio/ogg");
        assert_eq!(audio_mime("https://example.com/song.wav"), "audio/wav");
    }

    #[test]
    fn video_hosts() {
        assert_eq!(
            video_mime("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "video/YouTube"
        );
        assert_eq!(video_mime("https://youtu.be/dQw4w9WgXcQ"), "video/YouTube");
        assert_eq!(
            video_mime("https://uni.hosted.panopto.com/Panopto/Pages/Viewer.aspx?id=abc-123"),
            "video/Panopto"
        );
        assert_eq!(video_mime("https://vimeo.com/76979871"), "video/Vimeo");
        assert_eq!(
            video_mime("https://echo360.org.uk/media/0a1b2c/h5p"),
            "video/Echo360"
        );
    }

    #[test]
    fn video_extensions() {
        assert_eq!(video_mime("https://example.com/clip.mp4"), "video/mp4");
        assert_eq!(video_mime("https://example.com/clip.ogv"), "video/ogg");
        assert_eq!(video_mime("https://example.com/clip.webm#t=10"), "video/webm");
    }

    #[test]
    fn no_extension_is_a_best_guess() {
        assert_eq!(image_mime("https://example.com/photo"), "image/photo");
    }
}
