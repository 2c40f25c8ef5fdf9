// Library exports for ani2mousecape

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::ConvertOptions;
pub use error::{Error, FormatError};
pub use pipeline::{
    AniCursor, AniParser, DisplayOrder, FrameImage, compose_strip, convert_bytes, convert_dir,
    convert_file, encode_png,
};
