use crate::domain::model::InferenceImage;
use crate::utils::error::Result;
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

pub const DEFAULT_MAX_IMAGE_EDGE: u32 = 1400;

/// 長邊超過 `max_edge` 時等比例縮小，每邊至少 1 像素
pub fn scaled_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let long_edge = width.max(height);
    if long_edge <= max_edge {
        return (width, height);
    }

    let scale = |side: u32| ((side as u64 * max_edge as u64 / long_edge as u64) as u32).max(1);
    (scale(width), scale(height))
}

/// 解碼 PNG/JPEG，轉成 RGB，必要時縮小，再以 JPEG 編碼
pub fn prepare_for_inference(bytes: &[u8], max_edge: u32) -> Result<InferenceImage> {
    let decoded = image::load_from_memory(bytes)?;
    let (width, height) = decoded.dimensions();
    let (new_width, new_height) = scaled_dimensions(width, height, max_edge);

    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
    let resized = if (new_width, new_height) != (width, height) {
        tracing::debug!(
            "🖼️ Resizing image {}x{} -> {}x{}",
            width,
            height,
            new_width,
            new_height
        );
        rgb.resize_exact(new_width, new_height, FilterType::Triangle)
    } else {
        rgb
    };

    let mut encoded = Cursor::new(Vec::new());
    resized.write_to(&mut encoded, ImageFormat::Jpeg)?;

    Ok(InferenceImage::jpeg(encoded.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(width, height));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_scaled_dimensions() {
        assert_eq!(scaled_dimensions(800, 600, 1400), (800, 600));
        assert_eq!(scaled_dimensions(1400, 700, 1400), (1400, 700));
        assert_eq!(scaled_dimensions(2800, 1400, 1400), (1400, 700));
        assert_eq!(scaled_dimensions(1000, 4000, 1400), (350, 1400));
        assert_eq!(scaled_dimensions(5000, 1, 1400), (1400, 1));
    }

    #[test]
    fn test_prepare_resizes_and_encodes_jpeg() {
        let prepared = prepare_for_inference(&png_bytes(200, 100), 64).unwrap();
        assert_eq!(prepared.mime_type, "image/jpeg");

        let decoded = image::load_from_memory(&prepared.data).unwrap();
        assert_eq!(decoded.dimensions(), (64, 32));
    }

    #[test]
    fn test_prepare_rejects_garbage() {
        let err = prepare_for_inference(b"definitely not an image", 1400).unwrap_err();
        assert!(matches!(
            err,
            crate::utils::error::BioGuardError::ImageError { .. }
        ));
    }
}
