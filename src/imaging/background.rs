use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

use super::png::{encode_rgba_png, load_image, write_bytes};
use crate::error::{Error, Result};
use crate::logger;

/// A channel must be strictly above this to count as "light".
pub const LIGHT_THRESHOLD: u8 = 220;
pub const TARGET_HEIGHT: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripOptions {
    pub threshold: u8,
    pub target_height: u32,
}

impl Default for StripOptions {
    fn default() -> Self {
        Self {
            threshold: LIGHT_THRESHOLD,
            target_height: TARGET_HEIGHT,
        }
    }
}

impl StripOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_target_height(mut self, target_height: u32) -> Self {
        self.target_height = target_height;
        self
    }
}

#[inline]
pub fn is_light(pixel: &Rgba<u8>, threshold: u8) -> bool {
    let [r, g, b, _] = pixel.0;
    r > threshold && g > threshold && b > threshold
}

/// Light pixels become fully transparent, everything else fully opaque.
/// Whatever alpha the pixel had before is discarded.
pub fn apply_alpha_mask(image: &mut RgbaImage, threshold: u8) {
    for pixel in image.pixels_mut() {
        pixel.0[3] = if is_light(pixel, threshold) { 0 } else { 255 };
    }
}

/// Width for a resize to `target_height` that keeps the aspect ratio.
pub fn target_dimensions(width: u32, height: u32, target_height: u32) -> Result<(u32, u32)> {
    if width == 0 || height == 0 {
        return Err(Error::Validation(format!(
            "cannot resize a {}x{} image",
            width, height
        )));
    }
    if target_height == 0 {
        return Err(Error::Validation("target height must be at least 1".into()));
    }

    let scaled = (f64::from(target_height) * f64::from(width) / f64::from(height)).round();
    let target_width = (scaled as u32).max(1);
    Ok((target_width, target_height))
}

pub fn strip_background(image: DynamicImage, options: &StripOptions) -> Result<RgbaImage> {
    let (width, height) = image.dimensions();
    let (target_width, target_height) = target_dimensions(width, height, options.target_height)?;

    let mut rgba = image.into_rgba8();
    apply_alpha_mask(&mut rgba, options.threshold);

    log::debug!(
        "Resizing {}x{} -> {}x{} (Lanczos3, premultiplied alpha)",
        width,
        height,
        target_width,
        target_height
    );
    // Resample in premultiplied space so transparent background colour
    // does not bleed into the sprite's edges.
    premultiply(&mut rgba);
    let mut resized = imageops::resize(&rgba, target_width, target_height, FilterType::Lanczos3);
    unpremultiply(&mut resized);
    Ok(resized)
}

fn premultiply(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let alpha = u32::from(pixel.0[3]);
        for channel in &mut pixel.0[..3] {
            *channel = ((u32::from(*channel) * alpha + 127) / 255) as u8;
        }
    }
}

fn unpremultiply(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let alpha = u32::from(pixel.0[3]);
        if alpha == 0 || alpha == 255 {
            continue;
        }
        for channel in &mut pixel.0[..3] {
            *channel = ((u32::from(*channel) * 255 + alpha / 2) / alpha).min(255) as u8;
        }
    }
}

/// Load `input`, strip its light background, and write the result to
/// `output` as PNG. Nothing is written unless every earlier step succeeded.
pub fn strip_background_file(
    input: &Path,
    output: &Path,
    options: &StripOptions,
) -> Result<PathBuf> {
    let _timer = logger::timer("strip background");

    let image = load_image(input)?;
    log::info!(
        "Loaded {} ({}x{}, {:?})",
        input.display(),
        image.width(),
        image.height(),
        image.color()
    );

    let result = strip_background(image, options)?;
    let bytes = encode_rgba_png(&result)?;
    write_bytes(&bytes, output)?;

    log::info!("Background removed and saved to {}", output.display());
    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const MARGIN: u32 = 8;

    #[test]
    fn test_threshold_boundaries() {
        for value in [0u8, 100, 219, 220] {
            // one dark channel keeps the pixel opaque
            for channel in 0..3 {
                let mut px = [255u8, 255, 255, 0];
                px[channel] = value;
                assert!(!is_light(&Rgba(px), LIGHT_THRESHOLD), "{:?}", px);
            }
        }
        for value in [221u8, 230, 255] {
            assert!(is_light(&Rgba([value, value, value, 255]), LIGHT_THRESHOLD));
        }
        assert!(is_light(&Rgba([221, 221, 221, 0]), LIGHT_THRESHOLD));
        assert!(!is_light(&Rgba([220, 221, 221, 255]), LIGHT_THRESHOLD));
        assert!(!is_light(&Rgba([221, 220, 221, 255]), LIGHT_THRESHOLD));
        assert!(!is_light(&Rgba([221, 221, 220, 255]), LIGHT_THRESHOLD));
    }

    #[test]
    fn test_mask_overwrites_existing_alpha() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([250, 250, 250, 255]));
        img.put_pixel(1, 0, Rgba([10, 10, 10, 0]));

        apply_alpha_mask(&mut img, LIGHT_THRESHOLD);

        assert_eq!(img.get_pixel(0, 0).0, [250, 250, 250, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [10, 10, 10, 255]);
    }

    #[test]
    fn test_mask_only_produces_binary_alpha() {
        let mut img = RgbaImage::from_fn(256, 3, |x, y| {
            let v = x as u8;
            match y {
                0 => Rgba([v, 255, 255, 128]),
                1 => Rgba([255, v, 255, 128]),
                _ => Rgba([v, v, v, 128]),
            }
        });
        apply_alpha_mask(&mut img, LIGHT_THRESHOLD);

        for (x, _, px) in img.enumerate_pixels() {
            let expected = if x > 220 { 0 } else { 255 };
            assert_eq!(px.0[3], expected, "x = {}", x);
        }
    }

    #[test]
    fn test_target_dimensions() {
        assert_eq!(target_dimensions(1024, 1024, 256).unwrap(), (256, 256));
        assert_eq!(target_dimensions(1024, 512, 256).unwrap(), (512, 256));
        assert_eq!(target_dimensions(300, 200, 256).unwrap(), (384, 256));
        // 256 * 100 / 300 = 85.33
        assert_eq!(target_dimensions(100, 300, 256).unwrap(), (85, 256));
        // 256 * 2 / 3 = 170.67
        assert_eq!(target_dimensions(2, 3, 256).unwrap(), (171, 256));
        assert_eq!(target_dimensions(1, 10_000, 256).unwrap(), (1, 256));
    }

    #[test]
    fn test_aspect_ratio_within_one_pixel() {
        for (w, h) in [(640, 480), (333, 777), (1920, 1080), (17, 5), (5, 17)] {
            let (out_w, out_h) = target_dimensions(w, h, TARGET_HEIGHT).unwrap();
            let ideal = (256.0 * w as f64 / h as f64).round() as i64;
            assert_eq!(out_h, TARGET_HEIGHT);
            assert!((out_w as i64 - ideal).abs() <= 1);
        }
    }

    #[test]
    fn test_zero_sized_images_rejected() {
        assert!(matches!(
            target_dimensions(100, 0, 256),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            target_dimensions(0, 100, 256),
            Err(Error::Validation(_))
        ));
        assert!(target_dimensions(100, 100, 0).is_err());

        let empty = DynamicImage::new_rgba8(16, 0);
        assert!(matches!(
            strip_background(empty, &StripOptions::default()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_all_white_square() {
        let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(1024, 1024, Rgb([255, 255, 255])));
        let out = strip_background(white, &StripOptions::default()).unwrap();

        assert_eq!(out.dimensions(), (256, 256));
        assert!(out.pixels().all(|px| px.0[3] == 0));
    }

    #[test]
    fn test_half_black_half_white() {
        let img = RgbImage::from_fn(1024, 512, |x, _| {
            if x < 512 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let out = strip_background(DynamicImage::ImageRgb8(img), &StripOptions::default()).unwrap();

        assert_eq!(out.dimensions(), (512, 256));
        // Lanczos blends a few columns either side of the edge at x = 256.
        for (x, _, px) in out.enumerate_pixels() {
            if x < 256 - MARGIN {
                assert_eq!(px.0[3], 255, "x = {}", x);
            } else if x >= 256 + MARGIN {
                assert_eq!(px.0[3], 0, "x = {}", x);
            }
        }
    }

    #[test]
    fn test_edges_keep_sprite_colour() {
        let img = RgbImage::from_fn(1024, 512, |x, _| {
            if x < 512 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let out = strip_background(DynamicImage::ImageRgb8(img), &StripOptions::default()).unwrap();

        let mut edge_pixels = 0;
        for px in out.pixels().filter(|px| px.0[3] > 0 && px.0[3] < 255) {
            edge_pixels += 1;
            assert_eq!(&px.0[..3], &[0, 0, 0], "{:?}", px);
        }
        assert!(edge_pixels > 0);
    }

    #[test]
    fn test_coloured_edges_keep_hue() {
        let img = RgbImage::from_fn(1024, 512, |x, _| {
            if x < 512 {
                Rgb([200, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let out = strip_background(DynamicImage::ImageRgb8(img), &StripOptions::default()).unwrap();

        for px in out.pixels().filter(|px| px.0[3] >= 32) {
            let [r, g, b, _] = px.0;
            assert_eq!((g, b), (0, 0), "{:?}", px);
            // Lanczos overshoot near the edge can push red slightly past 200
            assert!((185..=225).contains(&r), "{:?}", px);
        }
    }

    #[test]
    fn test_premultiply_round_trip() {
        let mut img = RgbaImage::from_vec(
            4,
            1,
            vec![
                200, 100, 50, 255, //
                200, 100, 50, 128, //
                255, 255, 255, 0, //
                10, 20, 30, 64,
            ],
        )
        .unwrap();
        premultiply(&mut img);
        assert_eq!(img.get_pixel(0, 0).0, [200, 100, 50, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [100, 50, 25, 128]);
        assert_eq!(img.get_pixel(2, 0).0, [0, 0, 0, 0]);

        unpremultiply(&mut img);
        assert_eq!(img.get_pixel(0, 0).0, [200, 100, 50, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [199, 100, 50, 128]);
        assert_eq!(img.get_pixel(2, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_custom_options() {
        let grey = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 20, Rgb([200, 200, 200])));
        let options = StripOptions::new().with_threshold(150).with_target_height(10);
        let out = strip_background(grey, &options).unwrap();

        assert_eq!(out.dimensions(), (20, 10));
        assert!(out.pixels().all(|px| px.0[3] == 0));
    }

    #[test]
    fn test_strip_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("generated_ship.png");
        let output = dir.path().join("player_ship.png");

        let img = RgbImage::from_fn(512, 512, |x, y| {
            if (128..384).contains(&x) && (128..384).contains(&y) {
                Rgb([40, 60, 200])
            } else {
                Rgb([250, 250, 250])
            }
        });
        img.save(&input).unwrap();

        let written = strip_background_file(&input, &output, &StripOptions::default()).unwrap();
        assert_eq!(written, output);

        let first = image::open(&output).unwrap().to_rgba8();
        assert_eq!(first.dimensions(), (256, 256));
        assert_eq!(first.get_pixel(128, 128).0[3], 255);
        assert_eq!(first.get_pixel(5, 5).0[3], 0);

        // lossless: a second encode/decode reproduces the same mask
        let bytes = encode_rgba_png(&first).unwrap();
        let second = image::load_from_memory(&bytes).unwrap().to_rgba8();
        let alpha = |img: &RgbaImage| img.pixels().map(|px| px.0[3]).collect::<Vec<_>>();
        assert_eq!(alpha(&first), alpha(&second));
    }

    #[test]
    fn test_unreadable_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("garbage.png");
        let output = dir.path().join("out.png");
        std::fs::write(&input, b"definitely not a png").unwrap();

        let err = strip_background_file(&input, &output, &StripOptions::default()).unwrap_err();
        assert!(matches!(err, Error::ImageLoad { .. }));
        assert!(!output.exists());
    }
}
