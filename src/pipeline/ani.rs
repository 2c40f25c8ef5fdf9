use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, warn};

use super::cur::{CurParser, FrameImage};
use super::riff::{Chunk, ChunkReader, LIST_CHUNK, parse_riff, tag_name};
use crate::error::FormatError;

const ANI_TYPE: &[u8; 4] = b"ACON";
const HEADER_CHUNK: &[u8; 4] = b"anih";
const SEQ_CHUNK: &[u8; 4] = b"seq ";
const RATE_CHUNK: &[u8; 4] = b"rate";
const FRAME_TYPE: &[u8; 4] = b"fram";
const INFO_TYPE: &[u8; 4] = b"INFO";
const ICON_CHUNK: &[u8; 4] = b"icon";
const TITLE_CHUNK: &[u8; 4] = b"INAM";
const ARTIST_CHUNK: &[u8; 4] = b"IART";

const ANIH_LEN: usize = 36;
const ICON_FLAG: u32 = 0x1;
const SEQUENCE_FLAG: u32 = 0x2;

/// Display rates are counted in jiffies of 1/60 s.
const JIFFIES_PER_SECOND: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AniHeader {
    pub header_size: u32,
    pub frame_count: u32,
    pub step_count: u32,
    pub width: u32,
    pub height: u32,
    pub bit_count: u32,
    pub planes: u32,
    pub display_rate: u32,
    pub flags: u32,
}

impl AniHeader {
    fn parse(chunk: &Chunk<'_>) -> Result<Self, FormatError> {
        let data = chunk.data;
        if data.len() < ANIH_LEN {
            return Err(FormatError::truncated(
                "'anih' header",
                chunk.data_offset(),
                ANIH_LEN,
                data.len(),
            ));
        }

        let field = |i: usize| LittleEndian::read_u32(&data[i * 4..i * 4 + 4]);
        let header = Self {
            header_size: field(0),
            frame_count: field(1),
            step_count: field(2),
            width: field(3),
            height: field(4),
            bit_count: field(5),
            planes: field(6),
            display_rate: field(7),
            flags: field(8),
        };

        if header.header_size as usize != ANIH_LEN {
            warn!("Unexpected 'anih' header size {}", header.header_size);
        }

        Ok(header)
    }

    pub fn has_icon_frames(&self) -> bool {
        self.flags & ICON_FLAG != 0
    }

    pub fn has_sequence(&self) -> bool {
        self.flags & SEQUENCE_FLAG != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AniInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl AniInfo {
    fn read(&mut self, children: ChunkReader<'_>) -> Result<(), FormatError> {
        for child in children {
            let child = child?;
            if child.is(TITLE_CHUNK) {
                self.title = text_value(child.data);
            } else if child.is(ARTIST_CHUNK) {
                self.artist = text_value(child.data);
            }
        }
        Ok(())
    }
}

fn text_value(data: &[u8]) -> Option<String> {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let text = String::from_utf8_lossy(&data[..end]).trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}

/// Playback order as indices into the stored frames. Never empty, and every
/// index is known to be in range for the frames it was built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOrder(Vec<usize>);

impl DisplayOrder {
    pub fn identity(frame_count: usize) -> Self {
        Self((0..frame_count).collect())
    }

    pub fn from_sequence(sequence: &[u32], frame_count: usize) -> Result<Self, FormatError> {
        if sequence.is_empty() {
            return Err(FormatError::EmptySequence);
        }

        sequence
            .iter()
            .enumerate()
            .map(|(step, &index)| {
                if (index as usize) < frame_count {
                    Ok(index as usize)
                } else {
                    Err(FormatError::FrameIndexOutOfRange {
                        step,
                        index,
                        frame_count,
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

/// A fully decoded animated cursor.
#[derive(Debug, Clone)]
pub struct AniCursor {
    pub header: AniHeader,
    pub frames: Vec<FrameImage>,
    pub order: DisplayOrder,
    /// Display duration of each step in jiffies.
    pub rates: Vec<u32>,
    pub info: AniInfo,
}

impl AniCursor {
    pub fn step_count(&self) -> usize {
        self.order.len()
    }

    /// Frame shown at `step`.
    pub fn frame_at(&self, step: usize) -> &FrameImage {
        &self.frames[self.order.as_slice()[step]]
    }

    /// Frames in playback order.
    pub fn displayed(&self) -> impl Iterator<Item = &FrameImage> + '_ {
        self.order.iter().map(move |i| &self.frames[i])
    }

    pub fn delays_ms(&self) -> Vec<u32> {
        self.rates
            .iter()
            .map(|&jiffies| (jiffies as u64 * 1000 / JIFFIES_PER_SECOND as u64) as u32)
            .collect()
    }
}

pub struct AniParser;

impl AniParser {
    pub fn can_parse(data: &[u8]) -> bool {
        data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == ANI_TYPE
    }

    pub fn parse(data: &[u8]) -> Result<AniCursor, FormatError> {
        let mut header = None;
        let mut icons: Vec<Chunk<'_>> = Vec::new();
        let mut sequence: Option<Vec<u32>> = None;
        let mut rates: Option<Vec<u32>> = None;
        let mut info = AniInfo::default();

        for chunk in parse_riff(data, ANI_TYPE)? {
            let chunk = chunk?;
            debug!(
                "chunk '{}' at offset {} ({} bytes)",
                chunk.tag(),
                chunk.offset,
                chunk.data.len()
            );

            match &chunk.id {
                HEADER_CHUNK => header = Some(AniHeader::parse(&chunk)?),
                SEQ_CHUNK => sequence = Some(read_dwords(&chunk)?),
                RATE_CHUNK => rates = Some(read_dwords(&chunk)?),
                LIST_CHUNK => {
                    let (list_type, children) = chunk.list()?;
                    match &list_type {
                        FRAME_TYPE => {
                            for child in children {
                                let child = child?;
                                if child.is(ICON_CHUNK) {
                                    icons.push(child);
                                } else {
                                    debug!("skipping '{}' chunk in frame list", child.tag());
                                }
                            }
                        }
                        INFO_TYPE => info.read(children)?,
                        _ => debug!("skipping '{}' list", tag_name(&list_type)),
                    }
                }
                _ => debug!("skipping unknown chunk '{}'", chunk.tag()),
            }
        }

        let header = header.ok_or(FormatError::MissingChunk("anih"))?;

        if icons.is_empty() {
            return Err(FormatError::NoFrames);
        }

        if !header.has_icon_frames() {
            if !icons.iter().all(|c| CurParser::can_parse(c.data)) {
                return Err(FormatError::RawFrames);
            }
            warn!("'anih' flags do not mark icon frames, decoding them as icons anyway");
        }

        if header.frame_count as usize != icons.len() {
            warn!(
                "Header declares {} frames but {} are stored",
                header.frame_count,
                icons.len()
            );
        }

        let frames = icons
            .iter()
            .enumerate()
            .map(|(i, chunk)| CurParser::parse(chunk.data).map_err(|e| e.in_frame(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let order = match sequence {
            Some(seq) => DisplayOrder::from_sequence(&seq, frames.len())?,
            None => DisplayOrder::identity(frames.len()),
        };

        if header.step_count as usize != order.len() {
            warn!(
                "Header declares {} steps but the sequence has {}",
                header.step_count,
                order.len()
            );
        }

        let rates = match rates {
            Some(mut rates) => {
                if rates.len() != order.len() {
                    warn!(
                        "'rate' chunk has {} entries for {} steps",
                        rates.len(),
                        order.len()
                    );
                }
                rates.resize(order.len(), header.display_rate);
                rates
            }
            None => vec![header.display_rate; order.len()],
        };

        debug!("decoded {} frames, {} steps", frames.len(), order.len());

        Ok(AniCursor {
            header,
            frames,
            order,
            rates,
            info,
        })
    }
}

fn read_dwords(chunk: &Chunk<'_>) -> Result<Vec<u32>, FormatError> {
    let rem = chunk.data.len() % 4;
    if rem != 0 {
        return Err(FormatError::LengthMismatch {
            chunk: chunk.tag(),
            offset: chunk.offset,
            declared: chunk.data.len(),
            available: chunk.data.len() - rem,
        });
    }
    Ok(chunk
        .data
        .chunks_exact(4)
        .map(LittleEndian::read_u32)
        .collect())
}
