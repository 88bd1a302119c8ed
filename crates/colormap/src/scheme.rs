//! Colors and the level palette

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const RED: Self = Self::new(255, 0, 0);
    /// Red + green
    pub const YELLOW: Self = Self::new(255, 255, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    /// Used for nodata.
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Colors of the three ordinal levels plus nodata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelPalette {
    /// Code 1
    pub worst: Rgb,
    /// Code 2
    pub middle: Rgb,
    /// Code 3
    pub best: Rgb,
    /// Code 0 and any unknown code
    pub nodata: Rgb,
}

impl Default for LevelPalette {
    fn default() -> Self {
        Self {
            worst: Rgb::RED,
            middle: Rgb::YELLOW,
            best: Rgb::GREEN,
            nodata: Rgb::BLACK,
        }
    }
}

impl LevelPalette {
    /// Color of a level code
    pub fn color(&self, code: u8) -> Rgb {
        match code {
            1 => self.worst,
            2 => self.middle,
            3 => self.best,
            _ => self.nodata,
        }
    }
}
