//! On-demand conversion of fragment payloads between media types.
//!
//! Legal `(source, target)` pairs are the rows of [`MediaType::targets`].
//! Each legal pair maps to exactly one [`Conversion`]; anything else is an
//! [`ConvertError::Unsupported`] request.

mod raster;
mod text;

use thiserror::Error;

use crate::media::MediaType;

pub use text::html_to_text;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The target is unknown or not reachable from the source type.
    #[error("fragment of type {from} cannot be converted to .{extension}")]
    Unsupported { from: MediaType, extension: String },

    /// The transform itself failed on the stored bytes.
    #[error("conversion failed: {0}")]
    Failed(String),
}

/// One concrete transform, chosen from a `(source, target)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Identity,
    MarkdownToHtml,
    MarkdownToText,
    HtmlToText,
    JsonToText,
    Image(MediaType),
}

impl Conversion {
    /// Pick the transform for a pair, `None` if the pair is not legal.
    pub fn plan(from: MediaType, to: MediaType) -> Option<Self> {
        use MediaType::*;

        match (from, to) {
            (a, b) if a == b => Some(Self::Identity),
            (TextMarkdown, TextHtml) => Some(Self::MarkdownToHtml),
            (TextMarkdown, TextPlain) => Some(Self::MarkdownToText),
            (TextHtml, TextPlain) => Some(Self::HtmlToText),
            (ApplicationJson, TextPlain) => Some(Self::JsonToText),
            (a, b) if a.is_image() && b.is_image() => Some(Self::Image(b)),
            _ => None,
        }
    }

    /// Whether the transform is CPU-heavy enough to move off the async executor.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Image(_))
    }

    pub fn apply(self, data: &[u8]) -> Result<Vec<u8>, ConvertError> {
        match self {
            Self::Identity => Ok(data.to_vec()),
            Self::MarkdownToHtml => Ok(text::markdown_to_html(utf8(data)?).into_bytes()),
            Self::MarkdownToText => {
                let html = text::markdown_to_html(utf8(data)?);
                Ok(text::html_to_text(&html).into_bytes())
            }
            Self::HtmlToText => Ok(text::html_to_text(utf8(data)?).into_bytes()),
            Self::JsonToText => text::json_to_text(data).map(String::into_bytes),
            Self::Image(target) => raster::reencode(data, target),
        }
    }
}

/// A payload after conversion, with the type it now has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub data: Vec<u8>,
    pub media_type: MediaType,
}

/// Resolve a requested extension against a source type.
pub fn resolve(from: MediaType, extension: &str) -> Result<(MediaType, Conversion), ConvertError> {
    MediaType::from_extension(extension)
        .and_then(|to| Conversion::plan(from, to).map(|c| (to, c)))
        .ok_or_else(|| ConvertError::Unsupported {
            from,
            extension: extension.to_string(),
        })
}

/// Convert `data` of type `from` into the type named by `extension`.
pub fn convert(from: MediaType, data: &[u8], extension: &str) -> Result<Converted, ConvertError> {
    let (media_type, conversion) = resolve(from, extension)?;
    Ok(Converted {
        data: conversion.apply(data)?,
        media_type,
    })
}

fn utf8(data: &[u8]) -> Result<&str, ConvertError> {
    std::str::from_utf8(data).map_err(|e| ConvertError::Failed(format!("payload is not UTF-8: {e}")))
}
