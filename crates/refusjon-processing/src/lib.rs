//! Receipt normalization and document generation.
//!
//! Incoming receipt images are normalized to JPEG before they are embedded in
//! a generated PDF; `convert` holds the conversion ladder, `mime` the
//! content-type resolution, and `pdf` the lopdf-based document builder.

pub mod convert;
pub mod mime;
pub mod pdf;

pub use convert::{
    CodecError, ConversionLadder, ConversionOutcome, ImageRsCodec, JpegCodec, MozjpegCodec,
};
pub use pdf::{FormDocument, PdfError};
