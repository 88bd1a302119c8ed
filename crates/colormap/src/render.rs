//! Level-map to RGB rendering.

use crate::scheme::LevelPalette;
use cropsight_core::raster::Raster;

/// Encode a level map with the default red/yellow/green palette.
///
/// Returns a `Vec<u8>` of length `rows * cols * 3` in row-major order.
pub fn encode_levels(levels: &Raster<u8>) -> Vec<u8> {
    encode_levels_with(levels, &LevelPalette::default())
}

/// Encode a level map with an explicit palette.
///
/// Cells equal to the raster's nodata value render with `palette.nodata`.
pub fn encode_levels_with(levels: &Raster<u8>, palette: &LevelPalette) -> Vec<u8> {
    let nodata = levels.nodata();
    let mut rgb = Vec::with_capacity(levels.len() * 3);

    for &code in levels.data().iter() {
        let color = if nodata == Some(code) {
            palette.nodata
        } else {
            palette.color(code)
        };
        rgb.extend_from_slice(&color.to_array());
    }

    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::Rgb;

    #[test]
    fn encode_levels_basic() {
        let r = Raster::<u8>::from_vec(vec![1, 2, 3, 0], 2, 2).unwrap();
        let rgb = encode_levels(&r);

        assert_eq!(rgb.len(), 12); // 4 pixels * 3 bytes
        assert_eq!(&rgb[0..3], &[255, 0, 0]);
        assert_eq!(&rgb[3..6], &[255, 255, 0]);
        assert_eq!(&rgb[6..9], &[0, 255, 0]);
        assert_eq!(&rgb[9..12], &[0, 0, 0]);
    }

    #[test]
    fn explicit_nodata_value() {
        let mut r = Raster::<u8>::filled(1, 2, 3);
        r.set(0, 1, 9).unwrap();
        r.set_nodata(Some(3));
        let rgb = encode_levels(&r);
        // 3 is declared nodata here, 9 is an unknown code
        assert_eq!(&rgb[0..3], &[0, 0, 0]);
        assert_eq!(&rgb[3..6], &[0, 0, 0]);
    }

    #[test]
    fn custom_palette() {
        let palette = LevelPalette {
            best: Rgb::new(0, 128, 255),
            ..Default::default()
        };
        let r = Raster::<u8>::filled(1, 1, 3);
        assert_eq!(encode_levels_with(&r, &palette), vec![0, 128, 255]);
    }
}
