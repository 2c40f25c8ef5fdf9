// Builders for synthetic cursor containers used by the unit and pipeline tests

use image::{Rgba, RgbaImage};

/// Deterministic, fully opaque test pattern. Different seeds give different pixels.
pub fn gradient_frame(width: u32, height: u32, seed: u8) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x as u8).wrapping_mul(7).wrapping_add(seed),
            (y as u8).wrapping_mul(5).wrapping_add(seed.wrapping_mul(3)),
            seed.wrapping_mul(31),
            255,
        ])
    })
}

fn info_header(width: u32, height: u32, bit_count: u16, colors_used: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&((height * 2) as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&bit_count.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    out.extend_from_slice(&0u32.to_le_bytes()); // image size
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&colors_used.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out
}

fn padded_row(mut row: Vec<u8>) -> Vec<u8> {
    while row.len() % 4 != 0 {
        row.push(0);
    }
    row
}

fn pack_bits(bits: &[bool]) -> Vec<u8> {
    let mut out = vec![0u8; bits.len().div_ceil(8)];
    for (i, &set) in bits.iter().enumerate() {
        if set {
            out[i / 8] |= 0x80 >> (i % 8);
        }
    }
    out
}

/// Bottom-up AND mask from a top-down, row-major list of "transparent" flags.
fn and_mask(width: u32, height: u32, mask: &[bool]) -> Vec<u8> {
    let mut out = Vec::new();
    for y in (0..height as usize).rev() {
        let row = &mask[y * width as usize..(y + 1) * width as usize];
        out.extend(padded_row(pack_bits(row)));
    }
    out
}

/// 32-bit BGRA DIB with alpha; the AND mask marks alpha-zero pixels.
pub fn dib_32bpp(image: &RgbaImage) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let mut out = info_header(width, height, 32, 0);
    for y in (0..height).rev() {
        for x in 0..width {
            let [r, g, b, a] = image.get_pixel(x, y).0;
            out.extend_from_slice(&[b, g, r, a]);
        }
    }
    let mask: Vec<bool> = image.pixels().map(|p| p[3] == 0).collect();
    out.extend(and_mask(width, height, &mask));
    out
}

/// 24-bit BGR DIB whose transparency comes only from `mask` (top-down, row-major).
pub fn dib_24bpp(image: &RgbaImage, mask: &[bool]) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let mut out = info_header(width, height, 24, 0);
    for y in (0..height).rev() {
        let mut row = Vec::new();
        for x in 0..width {
            let [r, g, b, _] = image.get_pixel(x, y).0;
            row.extend_from_slice(&[b, g, r]);
        }
        out.extend(padded_row(row));
    }
    out.extend(and_mask(width, height, mask));
    out
}

/// 1-bit indexed DIB. `palette` entries are BGRX.
pub fn dib_1bpp(width: u32, height: u32, bits: &[bool], palette: &[[u8; 4]], mask: &[bool]) -> Vec<u8> {
    let mut out = info_header(width, height, 1, palette.len() as u32);
    for entry in palette {
        out.extend_from_slice(entry);
    }
    out.extend(and_mask(width, height, bits));
    out.extend(and_mask(width, height, mask));
    out
}

/// Wrap image payloads in a cursor (type 2) directory.
pub fn cur_file(images: &[(u32, u32, Vec<u8>)], hotspot: (u16, u16)) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&(images.len() as u16).to_le_bytes());

    let mut offset = 6 + 16 * images.len();
    for (width, height, payload) in images {
        out.push(if *width >= 256 { 0 } else { *width as u8 });
        out.push(if *height >= 256 { 0 } else { *height as u8 });
        out.push(0);
        out.push(0);
        out.extend_from_slice(&hotspot.0.to_le_bytes());
        out.extend_from_slice(&hotspot.1.to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        offset += payload.len();
    }
    for (_, _, payload) in images {
        out.extend_from_slice(payload);
    }
    out
}

/// Single-image cursor holding `image` as a 32-bit DIB.
pub fn cursor_for(image: &RgbaImage) -> Vec<u8> {
    let (width, height) = image.dimensions();
    cur_file(&[(width, height, dib_32bpp(image))], (0, 0))
}

pub fn riff_chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(id);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
    out
}

fn dwords(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[derive(Debug, Clone)]
pub struct AniBuilder {
    pub icons: Vec<Vec<u8>>,
    pub sequence: Option<Vec<u32>>,
    pub rates: Option<Vec<u32>>,
    pub frame_count: Option<u32>,
    pub step_count: Option<u32>,
    pub display_rate: u32,
    pub flags: u32,
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl AniBuilder {
    pub fn new(icons: Vec<Vec<u8>>) -> Self {
        Self {
            icons,
            sequence: None,
            rates: None,
            frame_count: None,
            step_count: None,
            display_rate: 6,
            flags: 0x1,
            title: None,
            artist: None,
        }
    }

    pub fn from_frames(frames: &[RgbaImage]) -> Self {
        Self::new(frames.iter().map(cursor_for).collect())
    }

    pub fn sequence(mut self, seq: &[u32]) -> Self {
        self.sequence = Some(seq.to_vec());
        self.flags |= 0x2;
        self
    }

    pub fn rates(mut self, rates: &[u32]) -> Self {
        self.rates = Some(rates.to_vec());
        self
    }

    pub fn info(mut self, title: &str, artist: &str) -> Self {
        self.title = Some(title.to_string());
        self.artist = Some(artist.to_string());
        self
    }

    pub fn header(&self) -> Vec<u8> {
        let frames = self.frame_count.unwrap_or(self.icons.len() as u32);
        let steps = self.step_count.unwrap_or_else(|| {
            self.sequence
                .as_ref()
                .map(|s| s.len() as u32)
                .unwrap_or(frames)
        });
        dwords(&[36, frames, steps, 0, 0, 0, 0, self.display_rate, self.flags])
    }

    pub fn body(&self) -> Vec<u8> {
        let mut body = Vec::new();

        if self.title.is_some() || self.artist.is_some() {
            let mut info = b"INFO".to_vec();
            if let Some(title) = &self.title {
                let mut text = title.as_bytes().to_vec();
                text.push(0);
                info.extend(riff_chunk(b"INAM", &text));
            }
            if let Some(artist) = &self.artist {
                let mut text = artist.as_bytes().to_vec();
                text.push(0);
                info.extend(riff_chunk(b"IART", &text));
            }
            body.extend(riff_chunk(b"LIST", &info));
        }

        body.extend(riff_chunk(b"anih", &self.header()));
        if let Some(rates) = &self.rates {
            body.extend(riff_chunk(b"rate", &dwords(rates)));
        }
        if let Some(seq) = &self.sequence {
            body.extend(riff_chunk(b"seq ", &dwords(seq)));
        }

        let mut fram = b"fram".to_vec();
        for icon in &self.icons {
            fram.extend(riff_chunk(b"icon", icon));
        }
        body.extend(riff_chunk(b"LIST", &fram));
        body
    }

    pub fn build(&self) -> Vec<u8> {
        wrap_acon(&self.body())
    }
}

pub fn wrap_acon(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&((body.len() + 4) as u32).to_le_bytes());
    out.extend_from_slice(b"ACON");
    out.extend_from_slice(body);
    out
}
