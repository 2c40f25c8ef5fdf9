// RIFF chunk walking over an explicit offset into a borrowed buffer

use byteorder::{ByteOrder, LittleEndian};

use crate::error::FormatError;

pub const RIFF_SIGNATURE: &[u8; 4] = b"RIFF";
pub const LIST_CHUNK: &[u8; 4] = b"LIST";

const CHUNK_HEADER_LEN: usize = 8;

/// One `(tag, length, payload)` record. `offset` is the absolute position of
/// the chunk header within the container.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    pub id: [u8; 4],
    pub offset: usize,
    pub data: &'a [u8],
}

impl<'a> Chunk<'a> {
    pub fn tag(&self) -> String {
        tag_name(&self.id)
    }

    pub fn is(&self, id: &[u8; 4]) -> bool {
        &self.id == id
    }

    /// Absolute offset of the first payload byte.
    pub fn data_offset(&self) -> usize {
        self.offset + CHUNK_HEADER_LEN
    }

    /// Split a `LIST` chunk into its list type and a reader over its children.
    pub fn list(&self) -> Result<([u8; 4], ChunkReader<'a>), FormatError> {
        if self.data.len() < 4 {
            return Err(FormatError::truncated(
                format!("'{}' list type", self.tag()),
                self.data_offset(),
                4,
                self.data.len(),
            ));
        }
        let mut list_type = [0u8; 4];
        list_type.copy_from_slice(&self.data[..4]);
        let reader = ChunkReader::new(&self.data[4..], self.data_offset() + 4, tag_name(&list_type));
        Ok((list_type, reader))
    }
}

/// Iterates the chunk records of one parent. Each record's declared length is
/// checked against the bytes the parent actually holds; the first failure is
/// yielded once and iteration stops.
#[derive(Debug)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    base: usize,
    pos: usize,
    parent: String,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a [u8], base: usize, parent: impl Into<String>) -> Self {
        Self {
            data,
            base,
            pos: 0,
            parent: parent.into(),
        }
    }

    fn read_chunk(&mut self) -> Result<Chunk<'a>, FormatError> {
        let remaining = self.data.len() - self.pos;
        if remaining < CHUNK_HEADER_LEN {
            return Err(FormatError::truncated(
                format!("chunk header in '{}'", self.parent),
                self.base + self.pos,
                CHUNK_HEADER_LEN,
                remaining,
            ));
        }

        let header = &self.data[self.pos..self.pos + CHUNK_HEADER_LEN];
        let mut id = [0u8; 4];
        id.copy_from_slice(&header[..4]);
        let declared = LittleEndian::read_u32(&header[4..8]) as usize;

        let body_start = self.pos + CHUNK_HEADER_LEN;
        let available = self.data.len() - body_start;
        if declared > available {
            return Err(FormatError::LengthMismatch {
                chunk: tag_name(&id),
                offset: self.base + self.pos,
                declared,
                available,
            });
        }

        let chunk = Chunk {
            id,
            offset: self.base + self.pos,
            data: &self.data[body_start..body_start + declared],
        };

        // Odd-sized payloads are padded to a word boundary; a missing pad at the
        // very end of the parent is accepted.
        let next = body_start + declared + (declared & 1);
        self.pos = next.min(self.data.len());

        Ok(chunk)
    }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = Result<Chunk<'a>, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }
        let result = self.read_chunk();
        if result.is_err() {
            self.pos = self.data.len();
        }
        Some(result)
    }
}

/// Validate the `RIFF <size> <form>` header and return a reader over the
/// top-level chunk list.
pub fn parse_riff<'a>(data: &'a [u8], form_type: &'static [u8; 4]) -> Result<ChunkReader<'a>, FormatError> {
    if data.len() < 4 || &data[..4] != RIFF_SIGNATURE {
        return Err(FormatError::BadSignature {
            expected: "RIFF",
            found: lossy_prefix(data),
        });
    }
    if data.len() < 12 {
        return Err(FormatError::truncated("RIFF header", 0, 12, data.len()));
    }
    if &data[8..12] != form_type {
        return Err(FormatError::BadSignature {
            expected: std::str::from_utf8(form_type).unwrap_or("????"),
            found: tag_name(&[data[8], data[9], data[10], data[11]]),
        });
    }

    let declared = LittleEndian::read_u32(&data[4..8]) as usize;
    let available = data.len() - 8;
    if declared < 4 || declared > available {
        return Err(FormatError::LengthMismatch {
            chunk: "RIFF".to_string(),
            offset: 0,
            declared,
            available,
        });
    }

    Ok(ChunkReader::new(&data[12..8 + declared], 12, "RIFF"))
}

pub fn tag_name(id: &[u8; 4]) -> String {
    String::from_utf8_lossy(id).into_owned()
}

fn lossy_prefix(data: &[u8]) -> String {
    String::from_utf8_lossy(&data[..data.len().min(4)]).into_owned()
}
