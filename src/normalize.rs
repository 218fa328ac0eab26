//! Image normalization: decode, bounded downscale, size-bounded JPEG re-encode
//!
//! Takes an arbitrary user-supplied image and deterministically produces a
//! bounded-size JPEG suitable for transmission to the generator. Dimensions
//! are clamped to a maximum edge length (aspect preserved, never upscaled),
//! then the encode quality is walked down in fixed steps until the payload
//! fits the byte budget or the quality floor is reached.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::error::TaskError;

/// Raw uploaded bytes plus their declared MIME type.
///
/// Ephemeral: exists only for the duration of one `normalize` call and is
/// never persisted.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl UploadedImage {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Build from a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self, TaskError> {
        let (mime, bytes) = parse_data_uri(uri)?;
        Ok(Self { bytes, mime })
    }

    /// Build from bare bytes, sniffing the MIME type from content first and
    /// falling back to the file name extension.
    pub fn sniffed(bytes: Vec<u8>, name: Option<&str>) -> Self {
        let mime = sniff_mime(&bytes, name);
        Self { bytes, mime }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// What to do when the byte budget cannot be met even at the quality floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Fail with `InvalidInput` rather than return an oversized payload.
    #[default]
    Fail,
    /// Return the smallest attempt even though it exceeds the budget.
    BestEffort,
}

/// Tuning knobs for [`normalize`].
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Maximum pixel length of the longest edge.
    pub max_edge: u32,
    /// Initial JPEG quality factor, 0.0..=1.0.
    pub start_quality: f32,
    /// Quality below which no further reduction is attempted.
    pub quality_floor: f32,
    /// Fixed quality decrement per re-encode.
    pub quality_step: f32,
    /// Encoded-size ceiling in bytes.
    pub max_bytes: usize,
    pub overflow: OverflowPolicy,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_edge: 1600,
            start_quality: 0.85,
            quality_floor: 0.4,
            quality_step: 0.05,
            max_bytes: 4_000_000,
            overflow: OverflowPolicy::Fail,
        }
    }
}

/// A bounded, re-encoded image ready for transmission.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    /// Always `image/jpeg`; the normalizer re-encodes regardless of input format.
    pub mime: &'static str,
    /// Quality factor the final encode used.
    pub quality: f32,
    pub width: u32,
    pub height: u32,
}

impl NormalizedImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Self-describing `data:image/jpeg;base64,...` URI.
    pub fn to_data_uri(&self) -> String {
        build_data_uri(self.mime, &self.bytes)
    }
}

/// Normalize an uploaded image to a bounded-size JPEG.
///
/// Pure function of its inputs: rejects non-image MIME types and undecodable
/// bytes with `InvalidInput`, downscales so that neither edge exceeds
/// `max_edge` (aspect preserved to nearest pixel, never upscaled), then
/// re-encodes at decreasing quality until the payload fits `max_bytes` or
/// the quality floor is hit. Floor behavior is governed by
/// [`NormalizeOptions::overflow`].
pub fn normalize(
    image: &UploadedImage,
    opts: &NormalizeOptions,
) -> Result<NormalizedImage, TaskError> {
    if !image.mime.starts_with("image/") {
        return Err(TaskError::InvalidInput(format!(
            "Unsupported file type '{}': expected an image",
            image.mime
        )));
    }

    let decoded = image::load_from_memory(&image.bytes)
        .map_err(|e| TaskError::InvalidInput(format!("Failed to read image: {e}")))?;

    let (width, height) = (decoded.width(), decoded.height());
    let scale = f64::min(1.0, f64::from(opts.max_edge) / f64::from(width.max(height)));
    let target_w = ((f64::from(width) * scale).round() as u32).max(1);
    let target_h = ((f64::from(height) * scale).round() as u32).max(1);

    let raster = if target_w < width || target_h < height {
        decoded.resize_exact(target_w, target_h, FilterType::Lanczos3)
    } else {
        decoded
    };
    // JPEG has no alpha channel.
    let rgb = raster.to_rgb8();

    let mut quality = opts.start_quality;
    let mut encoded = encode_jpeg(&rgb, quality)?;
    while encoded.len() > opts.max_bytes && quality > opts.quality_floor + f32::EPSILON {
        quality = (quality - opts.quality_step).max(opts.quality_floor);
        encoded = encode_jpeg(&rgb, quality)?;
    }

    if encoded.len() > opts.max_bytes && opts.overflow == OverflowPolicy::Fail {
        return Err(TaskError::InvalidInput(format!(
            "Image could not be compressed under {} bytes (got {} at quality {:.2})",
            opts.max_bytes,
            encoded.len(),
            quality
        )));
    }

    Ok(NormalizedImage {
        bytes: encoded,
        mime: "image/jpeg",
        quality,
        width: target_w,
        height: target_h,
    })
}

/// Encode an RGB raster as JPEG at a 0.0..=1.0 quality factor, in memory.
fn encode_jpeg(rgb: &RgbImage, quality: f32) -> Result<Vec<u8>, TaskError> {
    let q = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, q);
    rgb.write_with_encoder(encoder)
        .map_err(|e| TaskError::InvalidInput(format!("Failed to encode image: {e}")))?;
    Ok(buffer.into_inner())
}

/// Parse a `data:<mime>;base64,<payload>` URI into its MIME type and bytes.
pub fn parse_data_uri(uri: &str) -> Result<(String, Vec<u8>), TaskError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| TaskError::InvalidInput("Not a data URI".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| TaskError::InvalidInput("Malformed data URI: missing payload".into()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| TaskError::InvalidInput("Only base64 data URIs are supported".into()))?;
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| TaskError::InvalidInput(format!("Invalid base64 payload: {e}")))?;
    Ok((mime.to_string(), bytes))
}

/// Build a `data:` URI from a MIME type and raw bytes.
pub fn build_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Guess a MIME type: content sniffing first, extension fallback.
pub fn sniff_mime(bytes: &[u8], name: Option<&str>) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }
    if let Some(n) = name
        && let Some(m) = mime_guess::from_path(n).first_raw()
    {
        return m.to_string();
    }
    "application/octet-stream".to_string()
}
