use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::io::Reader;
use image::{ColorType, DynamicImage, GenericImageView, ImageEncoder, ImageError, RgbaImage};

use crate::error::{Error, Result};

/// The decoder is chosen from the file contents, not the extension.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let decoded = Reader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(ImageError::IoError)
        .and_then(|reader| reader.decode());

    decoded.map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Encodes in the image's own color type, so an RGB payload stays RGB.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    encode_raw(image.as_bytes(), image.width(), image.height(), image.color())
}

pub fn encode_rgba_png(image: &RgbaImage) -> Result<Vec<u8>> {
    encode_raw(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
}

fn encode_raw(bytes: &[u8], width: u32, height: u32, color: ColorType) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    // PNG is lossless; skip the slow "best" compression search.
    let encoder = PngEncoder::new_with_quality(&mut buf, CompressionType::Default, FilterType::Adaptive);
    encoder
        .write_image(bytes, width, height, color)
        .map_err(Error::ImageEncode)?;
    Ok(buf.into_inner())
}

pub fn write_bytes(bytes: &[u8], path: &Path) -> Result<()> {
    fs::write(path, bytes).map_err(|source| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
