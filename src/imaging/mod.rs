//! Pixel work: loading, near-white background removal, resizing and PNG
//! output. Everything here is synchronous and operates on complete rasters.

mod background;
mod png;

pub use background::{
    apply_alpha_mask, is_light, strip_background, strip_background_file, target_dimensions,
    StripOptions, LIGHT_THRESHOLD, TARGET_HEIGHT,
};
pub use png::{encode_png, encode_rgba_png, load_image, write_bytes};
