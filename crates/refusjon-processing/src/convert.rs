//! JPEG conversion ladder for incoming receipt images.
//!
//! HEIC/HEIF uploads (and anything else the mail clients cannot render) are
//! normalized to JPEG through an ordered list of (codec, quality) attempts.
//! The ladder is data, not control flow: attempts are consumed in sequence
//! with early exit on the first success.

use std::io::Cursor;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::ImageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    /// The input format is structurally unsupported; no quality change or
    /// retry can fix it.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Encode failed: {0}")]
    Encode(String),
}

/// A codec that converts an image to JPEG at a given quality (0.0..=1.0).
pub trait JpegCodec: Send + Sync {
    fn name(&self) -> &'static str;

    fn convert(&self, data: &[u8], quality: f32) -> Result<Vec<u8>, CodecError>;
}

fn decode(data: &[u8]) -> Result<image::DynamicImage, CodecError> {
    image::load_from_memory(data).map_err(|e| match e {
        ImageError::Unsupported(err) => CodecError::UnsupportedFormat(err.to_string()),
        other => CodecError::Decode(other.to_string()),
    })
}

fn jpeg_quality(quality: f32) -> f32 {
    (quality * 100.0).clamp(1.0, 100.0)
}

/// Primary codec: mozjpeg encode over an image-rs decode.
pub struct MozjpegCodec;

impl JpegCodec for MozjpegCodec {
    fn name(&self) -> &'static str {
        "mozjpeg"
    }

    fn convert(&self, data: &[u8], quality: f32) -> Result<Vec<u8>, CodecError> {
        let img = decode(data)?;
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(jpeg_quality(quality));
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);

        let mut comp = comp
            .start_compress(Vec::new())
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        comp.write_scanlines(&rgb_img)
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        comp.finish().map_err(|e| CodecError::Encode(e.to_string()))
    }
}

/// Fallback codec: image-rs's own JPEG encoder.
pub struct ImageRsCodec;

impl JpegCodec for ImageRsCodec {
    fn name(&self) -> &'static str {
        "image-rs"
    }

    fn convert(&self, data: &[u8], quality: f32) -> Result<Vec<u8>, CodecError> {
        let img = decode(data)?;
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(
            Cursor::new(&mut buffer),
            jpeg_quality(quality) as u8,
        );
        img.write_with_encoder(encoder)
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(buffer)
    }
}

/// Outcome of running the ladder over one file.
#[derive(Debug)]
pub enum ConversionOutcome {
    /// Converted to JPEG by one of the attempts.
    Converted(Vec<u8>),
    /// The format itself is unsupported; callers drop the file with a warning.
    Unsupported(String),
    /// Every attempt failed for a non-structural reason; callers may fall back
    /// to the original bytes.
    Failed(String),
}

/// Ordered (codec, quality) attempts, walked with early exit on success.
///
/// An `UnsupportedFormat` error aborts the walk immediately: the remaining
/// attempts decode the same bytes, so they cannot succeed either.
pub struct ConversionLadder {
    attempts: Vec<(Arc<dyn JpegCodec>, f32)>,
}

impl ConversionLadder {
    pub fn new(attempts: Vec<(Arc<dyn JpegCodec>, f32)>) -> Self {
        ConversionLadder { attempts }
    }

    /// The production ladder: primary codec at descending quality, then the
    /// fallback codec exactly once.
    pub fn standard() -> Self {
        let primary: Arc<dyn JpegCodec> = Arc::new(MozjpegCodec);
        let fallback: Arc<dyn JpegCodec> = Arc::new(ImageRsCodec);
        ConversionLadder::new(vec![
            (primary.clone(), 1.0),
            (primary.clone(), 0.8),
            (primary, 0.5),
            (fallback, 0.9),
        ])
    }

    pub fn convert(&self, data: &[u8]) -> ConversionOutcome {
        let mut last_error = String::new();

        for (codec, quality) in &self.attempts {
            match codec.convert(data, *quality) {
                Ok(jpeg) => {
                    tracing::debug!(
                        codec = codec.name(),
                        quality = *quality,
                        size_bytes = jpeg.len(),
                        "Image converted to JPEG"
                    );
                    return ConversionOutcome::Converted(jpeg);
                }
                Err(CodecError::UnsupportedFormat(msg)) => {
                    tracing::warn!(codec = codec.name(), error = %msg, "Unsupported image format");
                    return ConversionOutcome::Unsupported(msg);
                }
                Err(err) => {
                    tracing::debug!(
                        codec = codec.name(),
                        quality = *quality,
                        error = %err,
                        "Conversion attempt failed"
                    );
                    last_error = err.to_string();
                }
            }
        }

        ConversionOutcome::Failed(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every (name, quality) call and replays scripted results.
    struct ScriptedCodec {
        name: &'static str,
        results: Mutex<Vec<Result<Vec<u8>, CodecError>>>,
        calls: Arc<Mutex<Vec<(&'static str, f32)>>>,
    }

    impl JpegCodec for ScriptedCodec {
        fn name(&self) -> &'static str {
            self.name
        }

        fn convert(&self, _data: &[u8], quality: f32) -> Result<Vec<u8>, CodecError> {
            self.calls.lock().unwrap().push((self.name, quality));
            self.results.lock().unwrap().remove(0)
        }
    }

    fn scripted(
        name: &'static str,
        results: Vec<Result<Vec<u8>, CodecError>>,
        calls: Arc<Mutex<Vec<(&'static str, f32)>>>,
    ) -> Arc<dyn JpegCodec> {
        Arc::new(ScriptedCodec {
            name,
            results: Mutex::new(results),
            calls,
        })
    }

    fn ladder_with(
        primary: Arc<dyn JpegCodec>,
        fallback: Arc<dyn JpegCodec>,
    ) -> ConversionLadder {
        ConversionLadder::new(vec![
            (primary.clone(), 1.0),
            (primary.clone(), 0.8),
            (primary, 0.5),
            (fallback, 0.9),
        ])
    }

    #[test]
    fn ladder_walks_qualities_in_order_then_fallback_once() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let fail = || Err(CodecError::Encode("boom".to_string()));
        let primary = scripted("primary", vec![fail(), fail(), fail()], calls.clone());
        let fallback = scripted("fallback", vec![Ok(vec![1, 2, 3])], calls.clone());

        let outcome = ladder_with(primary, fallback).convert(b"data");
        assert!(matches!(outcome, ConversionOutcome::Converted(ref b) if b == &vec![1, 2, 3]));

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                ("primary", 1.0),
                ("primary", 0.8),
                ("primary", 0.5),
                ("fallback", 0.9),
            ]
        );
    }

    #[test]
    fn first_success_short_circuits() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let primary = scripted("primary", vec![Ok(vec![7])], calls.clone());
        let fallback = scripted("fallback", vec![], calls.clone());

        let outcome = ladder_with(primary, fallback).convert(b"data");
        assert!(matches!(outcome, ConversionOutcome::Converted(_)));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn unsupported_format_aborts_the_ladder() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let primary = scripted(
            "primary",
            vec![Err(CodecError::UnsupportedFormat("heic".to_string()))],
            calls.clone(),
        );
        let fallback = scripted("fallback", vec![], calls.clone());

        let outcome = ladder_with(primary, fallback).convert(b"data");
        assert!(matches!(outcome, ConversionOutcome::Unsupported(_)));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn exhausted_ladder_reports_failure() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let fail = || Err(CodecError::Encode("boom".to_string()));
        let primary = scripted("primary", vec![fail(), fail(), fail()], calls.clone());
        let fallback = scripted("fallback", vec![fail()], calls.clone());

        let outcome = ladder_with(primary, fallback).convert(b"data");
        assert!(matches!(outcome, ConversionOutcome::Failed(_)));
        assert_eq!(calls.lock().unwrap().len(), 4);
    }

    #[test]
    fn standard_ladder_converts_png_to_jpeg() {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            8,
            8,
            image::Rgb([200, 100, 50]),
        ));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        match ConversionLadder::standard().convert(&png) {
            ConversionOutcome::Converted(jpeg) => {
                let format = image::guess_format(&jpeg).unwrap();
                assert_eq!(format, image::ImageFormat::Jpeg);
            }
            other => panic!("expected conversion, got {:?}", other),
        }
    }

    #[test]
    fn standard_ladder_skips_unrecognized_bytes() {
        let outcome = ConversionLadder::standard().convert(b"not an image at all");
        assert!(matches!(outcome, ConversionOutcome::Unsupported(_)));
    }
}
