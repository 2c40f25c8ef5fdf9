// Vertical sprite-strip composition in the layout Mousecape expects

use image::{ImageFormat, RgbaImage, imageops};
use std::io::Cursor;
use std::num::NonZeroUsize;
use tracing::warn;

use super::ani::AniCursor;
use crate::error::{Error, Result};

/// Upper bound on strip canvas pixels (1 GiB of RGBA).
pub const MAX_STRIP_PIXELS: u64 = 1 << 28;

/// Steps to place in the strip. Without a cap every step is kept; with one,
/// steps are sampled evenly across the animation.
pub fn select_steps(step_count: usize, max_frames: Option<NonZeroUsize>) -> Vec<usize> {
    match max_frames.map(NonZeroUsize::get) {
        Some(cap) if step_count > cap => (0..cap).map(|i| i * step_count / cap).collect(),
        _ => (0..step_count).collect(),
    }
}

/// Stack the displayed frames top to bottom on a transparent canvas.
///
/// The first displayed frame fixes the segment size. Frames of another size
/// are copied at the top-left of their segment and clipped to it.
pub fn compose_strip(cursor: &AniCursor, max_frames: Option<NonZeroUsize>) -> Result<RgbaImage> {
    let steps = select_steps(cursor.step_count(), max_frames);
    let (width, height) = cursor.frame_at(steps[0]).dimensions();

    // Checked before allocating: a few bytes of 'seq ' entries can ask for a
    // canvas many orders of magnitude larger than the file.
    let total_height = u32::try_from(steps.len())
        .ok()
        .and_then(|n| n.checked_mul(height))
        .filter(|&h| width as u64 * h as u64 <= MAX_STRIP_PIXELS)
        .ok_or(Error::StripTooLarge {
            steps: steps.len(),
            frame_height: height,
        })?;

    let mut strip = RgbaImage::new(width, total_height);

    for (segment, &step) in steps.iter().enumerate() {
        let frame = cursor.frame_at(step);
        if frame.dimensions() != (width, height) {
            warn!(
                "Frame {} is {}x{}, strip segments are {}x{}; copying without scaling",
                cursor.order.as_slice()[step],
                frame.width(),
                frame.height(),
                width,
                height
            );
        }

        let y = segment as u32 * height;
        let segment_view = imageops::crop_imm(&frame.image, 0, 0, width, height).to_image();
        imageops::replace(&mut strip, &segment_view, 0, y as i64);
    }

    Ok(strip)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
