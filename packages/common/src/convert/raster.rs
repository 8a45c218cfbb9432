use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use super::ConvertError;
use crate::media::MediaType;

fn image_format(media_type: MediaType) -> Option<ImageFormat> {
    match media_type {
        MediaType::ImagePng => Some(ImageFormat::Png),
        MediaType::ImageJpeg => Some(ImageFormat::Jpeg),
        MediaType::ImageWebp => Some(ImageFormat::WebP),
        MediaType::ImageGif => Some(ImageFormat::Gif),
        _ => None,
    }
}

/// Decode any supported raster image and encode it as `target`.
pub(super) fn reencode(data: &[u8], target: MediaType) -> Result<Vec<u8>, ConvertError> {
    let format = image_format(target)
        .ok_or_else(|| ConvertError::Failed(format!("{target} is not an image type")))?;

    let decoded = image::load_from_memory(data)
        .map_err(|e| ConvertError::Failed(format!("image decode failed: {e}")))?;

    // JPEG has no alpha channel; the other encoders all take RGBA8.
    let prepared = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(decoded.to_rgb8()),
        _ => DynamicImage::ImageRgba8(decoded.to_rgba8()),
    };

    let mut out = Cursor::new(Vec::new());
    prepared
        .write_to(&mut out, format)
        .map_err(|e| ConvertError::Failed(format!("image encode failed: {e}")))?;
    Ok(out.into_inner())
}
