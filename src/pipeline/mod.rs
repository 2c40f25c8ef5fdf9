pub mod ani;
pub mod converter;
pub mod cur;
pub mod dib;
pub mod fs_ops;
pub mod riff;
pub mod strip;
pub mod summary;

pub use ani::{AniCursor, AniParser, DisplayOrder};
pub use converter::{BatchReport, Conversion, convert_bytes, convert_dir, convert_file};
pub use cur::{CurParser, FrameImage};
pub use strip::{compose_strip, encode_png};

#[cfg(test)]
pub(crate) mod test_support;
