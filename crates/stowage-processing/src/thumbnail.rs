//! Thumbnail rendering
//!
//! Every variant keeps the source aspect ratio and is scaled to the width of its
//! [`ThumbnailSize`]. Images are never upscaled: a source narrower than the target
//! is re-encoded at its own size. Output uses the source format when the encoder
//! supports it and PNG otherwise.

use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use stowage_core::models::ThumbnailSize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),
}

/// Stateless thumbnail renderer
pub struct ThumbnailRenderer;

impl ThumbnailRenderer {
    /// Decode `data` once and render every size in [`ThumbnailSize::ALL`].
    pub fn render_all(data: &[u8]) -> Result<Vec<(ThumbnailSize, Bytes)>, ProcessingError> {
        let (img, format) = Self::decode(data)?;

        ThumbnailSize::ALL
            .iter()
            .map(|&size| Ok((size, Self::encode(&Self::resize(&img, size.width()), format)?)))
            .collect()
    }

    fn decode(data: &[u8]) -> Result<(DynamicImage, ImageFormat), ProcessingError> {
        let reader = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;
        let format = reader.format().unwrap_or(ImageFormat::Png);
        let img = reader
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;
        Ok((img, format))
    }

    fn resize(img: &DynamicImage, target_width: u32) -> DynamicImage {
        let (width, height) = img.dimensions();
        if width <= target_width {
            return img.clone();
        }

        let scaled_height = ((height as f64) * (target_width as f64) / (width as f64)).round();
        let target_height = (scaled_height as u32).max(1);
        img.resize_exact(target_width, target_height, FilterType::Lanczos3)
    }

    fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Bytes, ProcessingError> {
        let format = match format {
            ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif | ImageFormat::WebP => format,
            _ => ImageFormat::Png,
        };

        // JPEG has no alpha channel
        let img = if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(img.to_rgb8())
        } else {
            img.clone()
        };

        let (width, height) = img.dimensions();
        let mut buffer = Vec::with_capacity((width * height * 3) as usize);
        img.write_to(&mut Cursor::new(&mut buffer), format)
            .map_err(|e| ProcessingError::Encode(e.to_string()))?;

        tracing::debug!(
            width,
            height,
            format = ?format,
            size_bytes = buffer.len(),
            "Rendered thumbnail"
        );

        Ok(Bytes::from(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn create_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgba8(img)
                .to_rgb8()
                .write_to(&mut cursor, format)
                .unwrap();
        } else {
            img.write_to(&mut cursor, format).unwrap();
        }
        buffer
    }

    fn dimensions_of(data: &[u8]) -> (u32, u32) {
        image::load_from_memory(data).unwrap().dimensions()
    }

    fn variant(variants: &[(ThumbnailSize, Bytes)], size: ThumbnailSize) -> &Bytes {
        &variants.iter().find(|(s, _)| *s == size).unwrap().1
    }

    #[test]
    fn test_render_all_preserves_aspect_ratio() {
        let data = create_test_image(1000, 600, ImageFormat::Png);

        let variants = ThumbnailRenderer::render_all(&data).unwrap();

        let dims: Vec<(ThumbnailSize, (u32, u32))> = variants
            .iter()
            .map(|(size, bytes)| (*size, dimensions_of(bytes)))
            .collect();
        assert_eq!(
            dims,
            vec![
                (ThumbnailSize::W500, (500, 300)),
                (ThumbnailSize::W250, (250, 150)),
                (ThumbnailSize::W100, (100, 60)),
            ]
        );
    }

    #[test]
    fn test_small_image_is_not_upscaled() {
        let data = create_test_image(80, 40, ImageFormat::Png);

        let variants = ThumbnailRenderer::render_all(&data).unwrap();
        for (_, rendered) in &variants {
            assert_eq!(dimensions_of(rendered), (80, 40));
        }
    }

    #[test]
    fn test_keeps_source_format() {
        let data = create_test_image(600, 600, ImageFormat::Jpeg);

        let variants = ThumbnailRenderer::render_all(&data).unwrap();
        for (_, rendered) in &variants {
            assert_eq!(image::guess_format(rendered).unwrap(), ImageFormat::Jpeg);
        }
        assert_eq!(
            dimensions_of(variant(&variants, ThumbnailSize::W100)),
            (100, 100)
        );
    }

    #[test]
    fn test_invalid_image_fails_to_decode() {
        let result = ThumbnailRenderer::render_all(b"definitely not an image");
        assert!(matches!(result, Err(ProcessingError::Decode(_))));
    }
}
