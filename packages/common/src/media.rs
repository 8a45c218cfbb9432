use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaTypeError {
    #[error("invalid media type: {0}")]
    Malformed(String),

    #[error("unsupported fragment type: {0}")]
    Unsupported(String),
}

/// The closed set of media types a fragment may be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum MediaType {
    #[serde(rename = "text/plain")]
    TextPlain,
    #[serde(rename = "text/markdown")]
    TextMarkdown,
    #[serde(rename = "text/html")]
    TextHtml,
    #[serde(rename = "application/json")]
    ApplicationJson,
    #[serde(rename = "image/png")]
    ImagePng,
    #[serde(rename = "image/jpeg")]
    ImageJpeg,
    #[serde(rename = "image/webp")]
    ImageWebp,
    #[serde(rename = "image/gif")]
    ImageGif,
}

const IMAGE_TARGETS: &[MediaType] = &[
    MediaType::ImagePng,
    MediaType::ImageJpeg,
    MediaType::ImageWebp,
    MediaType::ImageGif,
];

impl MediaType {
    pub const ALL: [MediaType; 8] = [
        MediaType::TextPlain,
        MediaType::TextMarkdown,
        MediaType::TextHtml,
        MediaType::ApplicationJson,
        MediaType::ImagePng,
        MediaType::ImageJpeg,
        MediaType::ImageWebp,
        MediaType::ImageGif,
    ];

    /// Parse a raw `Content-Type` value, ignoring any parameters.
    ///
    /// `"text/html; charset=utf-8"` parses to [`MediaType::TextHtml`].
    pub fn parse(raw: &str) -> Result<Self, MediaTypeError> {
        let essence = essence(raw)?;
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == essence)
            .ok_or(MediaTypeError::Unsupported(essence))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextPlain => "text/plain",
            Self::TextMarkdown => "text/markdown",
            Self::TextHtml => "text/html",
            Self::ApplicationJson => "application/json",
            Self::ImagePng => "image/png",
            Self::ImageJpeg => "image/jpeg",
            Self::ImageWebp => "image/webp",
            Self::ImageGif => "image/gif",
        }
    }

    /// Canonical file extension for this type.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::TextPlain => "txt",
            Self::TextMarkdown => "md",
            Self::TextHtml => "html",
            Self::ApplicationJson => "json",
            Self::ImagePng => "png",
            Self::ImageJpeg => "jpg",
            Self::ImageWebp => "webp",
            Self::ImageGif => "gif",
        }
    }

    /// Resolve a requested extension (without the leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(Self::TextPlain),
            "md" => Some(Self::TextMarkdown),
            "html" => Some(Self::TextHtml),
            "json" => Some(Self::ApplicationJson),
            "png" => Some(Self::ImagePng),
            "jpg" | "jpeg" => Some(Self::ImageJpeg),
            "webp" => Some(Self::ImageWebp),
            "gif" => Some(Self::ImageGif),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        self.as_str().starts_with("text/")
    }

    pub fn is_image(&self) -> bool {
        IMAGE_TARGETS.contains(self)
    }

    /// Types this one may be converted into, identity included.
    pub fn targets(&self) -> &'static [MediaType] {
        match self {
            Self::TextPlain => &[Self::TextPlain],
            Self::TextMarkdown => &[Self::TextMarkdown, Self::TextHtml, Self::TextPlain],
            Self::TextHtml => &[Self::TextHtml, Self::TextPlain],
            Self::ApplicationJson => &[Self::ApplicationJson, Self::TextPlain],
            Self::ImagePng | Self::ImageJpeg | Self::ImageWebp | Self::ImageGif => IMAGE_TARGETS,
        }
    }

    pub fn can_convert_to(&self, target: MediaType) -> bool {
        self.targets().contains(&target)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Returns true if `raw` is a well-formed Content-Type whose base type is supported.
pub fn is_supported_type(raw: &str) -> bool {
    MediaType::parse(raw).is_ok()
}

/// Validate a Content-Type value and return its lowercased `type/subtype`.
fn essence(raw: &str) -> Result<String, MediaTypeError> {
    let malformed = || MediaTypeError::Malformed(raw.to_string());

    let mut parts = raw.splitn(2, ';');
    let base = parts.next().unwrap_or_default().trim();
    let (kind, subtype) = base.split_once('/').ok_or_else(malformed)?;
    if !is_token(kind) || !is_token(subtype) {
        return Err(malformed());
    }

    if let Some(params) = parts.next() {
        for param in params.split(';') {
            let (name, value) = param.split_once('=').ok_or_else(malformed)?;
            if !is_token(name.trim()) || !is_param_value(value.trim()) {
                return Err(malformed());
            }
        }
    }

    Ok(format!("{kind}/{subtype}").to_ascii_lowercase())
}

fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_tchar)
}

fn is_param_value(s: &str) -> bool {
    if let Some(inner) = s.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return !inner.chars().any(|c| c.is_control() && c != '\t');
    }
    is_token(s)
}
