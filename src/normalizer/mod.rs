//! 画像正規化モジュール
//!
//! 入力画像を長辺 max_size 以内に縮小（アスペクト比維持、拡大はしない）し、
//! JPEGに再エンコードしてBase64文字列にする

use crate::config::Config;
use crate::error::{ArtworkMatchError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub max_size: u32,
    pub jpeg_quality: u8,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_size: 512,
            jpeg_quality: 85,
        }
    }
}

impl From<&Config> for NormalizeOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_size: config.max_image_size,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

/// 送信用にエンコード済みの画像
///
/// 1回のリクエストで消費される（`into_data_url` は self を取る）
#[derive(Debug, PartialEq, Eq)]
pub struct EncodedImage {
    data: String,
    width: u32,
    height: u32,
}

impl EncodedImage {
    pub fn base64(&self) -> &str {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn into_data_url(self) -> String {
        format!("data:image/jpeg;base64,{}", self.data)
    }
}

/// 長辺が max 以内に収まる寸法を計算
///
/// 既に収まっている場合はそのまま。各辺は最低1px
pub fn bounded_dimensions(width: u32, height: u32, max: u32) -> (u32, u32) {
    let max = max.max(1);
    if width <= max && height <= max {
        return (width, height);
    }

    let scale = f64::from(max) / f64::from(width.max(height));
    let scaled = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, max);
    (scaled(width), scaled(height))
}

/// ファイルパスから正規化
pub fn normalize_path(path: &Path, options: NormalizeOptions) -> Result<EncodedImage> {
    if !path.is_file() {
        return Err(ArtworkMatchError::NotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    normalize_bytes(&bytes, options)
}

/// メモリ上のエンコード済みバイト列から正規化
pub fn normalize_bytes(bytes: &[u8], options: NormalizeOptions) -> Result<EncodedImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ArtworkMatchError::ImageDecode(e.to_string()))?;
    normalize_image(&img, options)
}

/// デコード済み画像から正規化
pub fn normalize_image(img: &DynamicImage, options: NormalizeOptions) -> Result<EncodedImage> {
    let (width, height) = bounded_dimensions(img.width(), img.height(), options.max_size);

    // JPEGはアルファ非対応のためRGB8に変換
    let rgb = if (width, height) == (img.width(), img.height()) {
        img.to_rgb8()
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3).to_rgb8()
    };

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, options.jpeg_quality)
        .encode_image(&rgb)
        .map_err(|e| ArtworkMatchError::ImageEncode(e.to_string()))?;

    tracing::debug!(
        from_width = img.width(),
        from_height = img.height(),
        width,
        height,
        bytes = buffer.len(),
        "画像を正規化"
    );

    Ok(EncodedImage {
        data: STANDARD.encode(&buffer),
        width,
        height,
    })
}
