//! GeoTIFF reading and writing for band files and output maps

mod native;

pub use native::{
    read_band_stack, read_geotiff, read_geotiff_from_buffer, write_geotiff,
    write_geotiff_to_buffer,
};
