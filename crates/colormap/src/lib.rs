//! # Cropsight Colormap
//!
//! RGB encoding of three-level maps (health, moisture condition, pest risk).
//!
//! Level codes are ordinal: 1 is the worst level and renders red, 2 renders
//! yellow and 3 (the best level) renders green. Code 0 means "no value" and
//! renders black. The main entry point is [`encode_levels`].
//!
//! ## Usage
//!
//! ```ignore
//! use cropsight_colormap::encode_levels;
//!
//! let rgb = encode_levels(&health.health_map);
//! assert_eq!(rgb.len(), rows * cols * 3);
//! ```

mod render;
mod scheme;

pub use render::{encode_levels, encode_levels_with};
pub use scheme::{LevelPalette, Rgb};
