// shoebox/src/intake/process.rs

//! Decoding, downscaling and re-encoding of uploaded images. Everything here is
//! synchronous and CPU-bound; callers run it on the blocking pool.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};

use crate::error::{CatalogError, CatalogResult};
use crate::intake::IncomingFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeConfig {
  /// Widest image kept after intake, in pixels. Height follows proportionally.
  pub max_width: u32,
  /// JPEG quality (1-100) for JPEG-family uploads.
  pub jpeg_quality: u8,
  /// Quality factor for every other format. PNG output is lossless, so values
  /// up to 50 select the strongest compression preset.
  pub other_quality: u8,
}

impl Default for IntakeConfig {
  fn default() -> Self {
    Self {
      max_width: 400,
      jpeg_quality: 30,
      other_quality: 50,
    }
  }
}

/// Re-encoded image bytes ready for a content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
  pub bytes: Vec<u8>,
  pub content_type: &'static str,
  pub width: u32,
  pub height: u32,
}

pub fn is_image(content_type: &str) -> bool {
  content_type.trim().to_ascii_lowercase().starts_with("image/")
}

pub fn is_jpeg_family(content_type: &str) -> bool {
  matches!(
    content_type.trim().to_ascii_lowercase().as_str(),
    "image/jpeg" | "image/jpg" | "image/pjpeg"
  )
}

/// Target dimensions for an image of `width` x `height` under `max_width`.
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
  if width <= max_width || width == 0 {
    return (width, height);
  }
  let scaled = (u64::from(height) * u64::from(max_width) / u64::from(width)).max(1);
  (max_width, scaled as u32)
}

pub fn downscale(file: &IncomingFile, config: &IntakeConfig) -> CatalogResult<EncodedImage> {
  let decoded = image::load_from_memory(&file.bytes).map_err(|source| CatalogError::ImageDecode {
    file_name: file.file_name.clone(),
    source,
  })?;

  let (width, height) = target_dimensions(decoded.width(), decoded.height(), config.max_width);
  let resized = if (width, height) == (decoded.width(), decoded.height()) {
    decoded
  } else {
    decoded.resize_exact(width, height, FilterType::Triangle)
  };

  let encoded = if is_jpeg_family(&file.content_type) {
    encode_jpeg(&resized, config.jpeg_quality).map(|bytes| (bytes, "image/jpeg"))
  } else {
    encode_png(&resized, config.other_quality).map(|bytes| (bytes, "image/png"))
  };
  let (bytes, content_type) = encoded
    .map_err(|e| CatalogError::Internal(format!("re-encoding '{}' failed: {}", file.file_name, e)))?;

  Ok(EncodedImage {
    bytes,
    content_type,
    width,
    height,
  })
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> image::ImageResult<Vec<u8>> {
  let rgb = img.to_rgb8();
  let mut buf = Vec::new();
  JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)).write_image(
    rgb.as_raw(),
    rgb.width(),
    rgb.height(),
    ExtendedColorType::Rgb8,
  )?;
  Ok(buf)
}

fn encode_png(img: &DynamicImage, quality: u8) -> image::ImageResult<Vec<u8>> {
  let compression = if quality <= 50 {
    CompressionType::Best
  } else {
    CompressionType::Default
  };
  let rgba = img.to_rgba8();
  let mut buf = Vec::new();
  PngEncoder::new_with_quality(&mut buf, compression, PngFilter::Adaptive).write_image(
    rgba.as_raw(),
    rgba.width(),
    rgba.height(),
    ExtendedColorType::Rgba8,
  )?;
  Ok(buf)
}
