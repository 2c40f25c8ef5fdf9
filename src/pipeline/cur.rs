use byteorder::{ByteOrder, LittleEndian};
use image::RgbaImage;

use super::dib::decode_dib;
use crate::error::FormatError;

const ICO_TYPE_ICON: u16 = 1;
const ICO_TYPE_CUR: u16 = 2;
const ICONDIR_LEN: usize = 6;
const ICONDIRENTRY_LEN: usize = 16;
const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

/// One decoded animation frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameImage {
    pub image: RgbaImage,
    pub hotspot: (u16, u16),
}

impl FrameImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

#[derive(Debug, Clone, Copy)]
struct IconDirEntry {
    width: u32,
    height: u32,
    bit_count: u16,
    hotspot: (u16, u16),
    size_bytes: usize,
    offset: usize,
}

impl IconDirEntry {
    fn area(&self) -> u32 {
        self.width * self.height
    }
}

pub struct CurParser;

impl CurParser {
    pub fn can_parse(data: &[u8]) -> bool {
        data.len() >= 4
            && LittleEndian::read_u16(&data[0..2]) == 0
            && matches!(LittleEndian::read_u16(&data[2..4]), ICO_TYPE_ICON | ICO_TYPE_CUR)
    }

    /// Decode an embedded icon or cursor into a single frame. When the
    /// directory holds several sizes, the largest one is used.
    pub fn parse(data: &[u8]) -> Result<FrameImage, FormatError> {
        if data.len() < ICONDIR_LEN {
            return Err(FormatError::truncated("icon directory", 0, ICONDIR_LEN, data.len()));
        }
        if !Self::can_parse(data) {
            return Err(FormatError::BadImage {
                frame: 0,
                reason: "not an icon or cursor image".to_string(),
            });
        }

        let ico_type = LittleEndian::read_u16(&data[2..4]);
        let count = LittleEndian::read_u16(&data[4..6]) as usize;
        if count == 0 {
            return Err(FormatError::BadImage {
                frame: 0,
                reason: "icon directory has no images".to_string(),
            });
        }

        let dir_len = ICONDIR_LEN + count * ICONDIRENTRY_LEN;
        if data.len() < dir_len {
            return Err(FormatError::truncated("icon directory entries", ICONDIR_LEN, dir_len, data.len()));
        }

        let entry = (0..count)
            .map(|i| Self::read_dir_entry(&data[ICONDIR_LEN + i * ICONDIRENTRY_LEN..], ico_type))
            .max_by_key(|e| (e.area(), e.bit_count))
            .ok_or(FormatError::NoFrames)?;

        let image = Self::parse_image(data, &entry)?;

        Ok(FrameImage {
            image,
            hotspot: entry.hotspot,
        })
    }

    fn read_dir_entry(raw: &[u8], ico_type: u16) -> IconDirEntry {
        let dim = |b: u8| if b == 0 { 256 } else { b as u32 };
        let planes_or_x = LittleEndian::read_u16(&raw[4..6]);
        let bits_or_y = LittleEndian::read_u16(&raw[6..8]);

        // Cursors reuse the planes/bit-count fields for the hotspot.
        let (hotspot, bit_count) = if ico_type == ICO_TYPE_CUR {
            ((planes_or_x, bits_or_y), 0)
        } else {
            ((0, 0), bits_or_y)
        };

        IconDirEntry {
            width: dim(raw[0]),
            height: dim(raw[1]),
            bit_count,
            hotspot,
            size_bytes: LittleEndian::read_u32(&raw[8..12]) as usize,
            offset: LittleEndian::read_u32(&raw[12..16]) as usize,
        }
    }

    fn parse_image(data: &[u8], entry: &IconDirEntry) -> Result<RgbaImage, FormatError> {
        let available = data.len().saturating_sub(entry.offset);
        if entry.offset > data.len() || entry.size_bytes > available {
            return Err(FormatError::LengthMismatch {
                chunk: "icon image".to_string(),
                offset: entry.offset,
                declared: entry.size_bytes,
                available,
            });
        }

        let image_data = &data[entry.offset..entry.offset + entry.size_bytes];

        if image_data.starts_with(PNG_MAGIC) {
            let img = image::load_from_memory_with_format(image_data, image::ImageFormat::Png)
                .map_err(|e| FormatError::BadImage {
                    frame: 0,
                    reason: format!("embedded PNG: {e}"),
                })?;
            Ok(img.to_rgba8())
        } else {
            decode_dib(image_data)
        }
    }
}
