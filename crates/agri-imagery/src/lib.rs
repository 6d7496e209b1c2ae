//! Crop imagery for AgriGenius
//!
//! Resolves crop names to displayable images: a session cache, generated SVG
//! placeholders, and curated photo URLs tried in order.

pub mod catalog;
pub mod placeholder;
pub mod resolver;

pub use catalog::{CropGlyph, TERMINAL_GLYPH};
pub use resolver::{normalize_crop_name, CropImageResolution, CropImageResolver, ImageAttempt};
