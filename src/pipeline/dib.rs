// Decoding of the DIB payload embedded in icon and cursor images.
//
// Icon DIBs store a colour (XOR) bitmap followed by a 1-bit AND mask, and the
// header height counts both planes.

use byteorder::{ByteOrder, LittleEndian};
use image::{Rgba, RgbaImage};

use crate::error::FormatError;

const BITMAPINFOHEADER_LEN: usize = 40;
const BI_RGB: u32 = 0;
const BI_BITFIELDS: u32 = 3;
const BITFIELDS_MASKS_LEN: usize = 12;

#[derive(Debug, Clone, Copy)]
pub struct DibHeader {
    pub header_size: usize,
    pub width: u32,
    pub height: u32,
    pub top_down: bool,
    pub bit_count: u16,
    pub compression: u32,
    pub colors_used: u32,
}

impl DibHeader {
    pub fn parse(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() < BITMAPINFOHEADER_LEN {
            return Err(FormatError::truncated("DIB header", 0, BITMAPINFOHEADER_LEN, data.len()));
        }

        let header_size = LittleEndian::read_u32(&data[0..4]) as usize;
        if header_size < BITMAPINFOHEADER_LEN || header_size > data.len() {
            return Err(bad(format!("invalid DIB header size {header_size}")));
        }

        let width = LittleEndian::read_i32(&data[4..8]);
        let raw_height = LittleEndian::read_i32(&data[8..12]);
        let bit_count = LittleEndian::read_u16(&data[14..16]);
        let compression = LittleEndian::read_u32(&data[16..20]);
        let colors_used = LittleEndian::read_u32(&data[32..36]);

        // The stored height covers the colour bitmap and the AND mask.
        let height = raw_height.unsigned_abs() / 2;
        if width <= 0 || height == 0 {
            return Err(bad(format!("invalid dimensions {width}x{raw_height}")));
        }

        Ok(Self {
            header_size,
            width: width as u32,
            height,
            top_down: raw_height < 0,
            bit_count,
            compression,
            colors_used,
        })
    }

    fn palette_entries(&self) -> usize {
        if self.bit_count > 8 {
            return 0;
        }
        let max = 1usize << self.bit_count;
        if self.colors_used > 0 {
            (self.colors_used as usize).min(max)
        } else {
            max
        }
    }
}

/// Decode an icon DIB into a top-down RGBA image.
///
/// 32-bit bitmaps carrying any non-zero alpha use that alpha directly and
/// ignore the AND mask. Every other bitmap takes its transparency from the
/// mask: a set bit yields alpha 0, a clear bit alpha 255.
pub fn decode_dib(data: &[u8]) -> Result<RgbaImage, FormatError> {
    let header = DibHeader::parse(data)?;

    match (header.bit_count, header.compression) {
        (1 | 4 | 8 | 24 | 32, BI_RGB) | (32, BI_BITFIELDS) => {}
        (bpp, BI_RGB) => return Err(bad(format!("unsupported bit depth {bpp}"))),
        (bpp, compression) => {
            return Err(bad(format!(
                "unsupported compression {compression} at {bpp} bits per pixel"
            )));
        }
    }

    let width = header.width as usize;
    let height = header.height as usize;
    let bpp = header.bit_count as usize;

    let palette_offset = header.header_size;
    let palette = read_palette(data, palette_offset, header.palette_entries())?;

    let mut pixel_offset = palette_offset + palette.len() * 4;
    if header.compression == BI_BITFIELDS && header.header_size == BITMAPINFOHEADER_LEN {
        pixel_offset += BITFIELDS_MASKS_LEN;
    }

    let xor_stride = stride(width, bpp)?;
    let xor_len = xor_stride
        .checked_mul(height)
        .ok_or_else(|| bad("colour bitmap size overflows".to_string()))?;
    let xor_data = slice_at(data, pixel_offset, xor_len, "colour bitmap")?;

    let mut image = RgbaImage::new(header.width, header.height);
    let mut has_alpha = false;

    for row in 0..height {
        let src = &xor_data[row * xor_stride..(row + 1) * xor_stride];
        let y = dest_row(row, height, header.top_down);

        for x in 0..width {
            let pixel = match bpp {
                1 | 4 | 8 => {
                    let index = packed_index(src, x, bpp);
                    let [b, g, r, _] = *palette.get(index).ok_or_else(|| {
                        bad(format!(
                            "palette index {index} out of range ({} entries)",
                            palette.len()
                        ))
                    })?;
                    Rgba([r, g, b, 255])
                }
                24 => {
                    let p = &src[x * 3..x * 3 + 3];
                    Rgba([p[2], p[1], p[0], 255])
                }
                _ => {
                    let p = &src[x * 4..x * 4 + 4];
                    has_alpha |= p[3] != 0;
                    Rgba([p[2], p[1], p[0], p[3]])
                }
            };
            image.put_pixel(x as u32, y as u32, pixel);
        }
    }

    if has_alpha {
        return Ok(image);
    }

    let mask_stride = stride(width, 1)?;
    let mask_len = mask_stride * height;
    let mask = slice_at(data, pixel_offset + xor_len, mask_len, "AND mask")?;

    for row in 0..height {
        let src = &mask[row * mask_stride..(row + 1) * mask_stride];
        let y = dest_row(row, height, header.top_down);

        for x in 0..width {
            let transparent = packed_index(src, x, 1) == 1;
            let pixel = image.get_pixel_mut(x as u32, y as u32);
            pixel[3] = if transparent { 0 } else { 255 };
        }
    }

    Ok(image)
}

fn read_palette(data: &[u8], offset: usize, entries: usize) -> Result<Vec<[u8; 4]>, FormatError> {
    let bytes = slice_at(data, offset, entries * 4, "colour table")?;
    Ok(bytes
        .chunks_exact(4)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect())
}

/// Rows are padded to a 4-byte boundary.
fn stride(width: usize, bpp: usize) -> Result<usize, FormatError> {
    width
        .checked_mul(bpp)
        .and_then(|bits| bits.checked_add(31))
        .map(|bits| bits / 32 * 4)
        .ok_or_else(|| bad(format!("row of {width} pixels overflows")))
}

fn packed_index(row: &[u8], x: usize, bpp: usize) -> usize {
    let bit = x * bpp;
    let byte = row[bit / 8];
    let shift = 8 - bpp - (bit % 8);
    ((byte >> shift) & ((1u16 << bpp) - 1) as u8) as usize
}

fn dest_row(row: usize, height: usize, top_down: bool) -> usize {
    if top_down { row } else { height - 1 - row }
}

fn slice_at<'a>(data: &'a [u8], offset: usize, len: usize, what: &str) -> Result<&'a [u8], FormatError> {
    let available = data.len().saturating_sub(offset);
    if len > available {
        return Err(FormatError::truncated(what, offset, len, available));
    }
    Ok(&data[offset..offset + len])
}

fn bad(reason: String) -> FormatError {
    FormatError::BadImage { frame: 0, reason }
}
