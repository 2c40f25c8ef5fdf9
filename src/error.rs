// Error types for cursor decoding and strip output

use std::path::PathBuf;
use thiserror::Error;

/// A malformed or unrecognized animated cursor container.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("bad signature: expected {expected:?}, found {found:?}")]
    BadSignature {
        expected: &'static str,
        found: String,
    },

    #[error("truncated {context} at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        context: String,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("'{chunk}' chunk at offset {offset} declares {declared} bytes but only {available} remain")]
    LengthMismatch {
        chunk: String,
        offset: usize,
        declared: usize,
        available: usize,
    },

    #[error("required '{0}' chunk not found")]
    MissingChunk(&'static str),

    #[error("frames stored as raw bitmaps are not supported")]
    RawFrames,

    #[error("no icon frames found in container")]
    NoFrames,

    #[error("'seq ' chunk has no entries")]
    EmptySequence,

    #[error("sequence step {step} references frame {index} but only {frame_count} frames are stored")]
    FrameIndexOutOfRange {
        step: usize,
        index: u32,
        frame_count: usize,
    },

    #[error("frame {frame}: {reason}")]
    BadImage { frame: usize, reason: String },
}

impl FormatError {
    pub(crate) fn truncated(
        context: impl Into<String>,
        offset: usize,
        needed: usize,
        available: usize,
    ) -> Self {
        FormatError::Truncated {
            context: context.into(),
            offset,
            needed,
            available,
        }
    }

    /// Attach the stored frame index to an image-level failure.
    pub(crate) fn in_frame(self, frame: usize) -> Self {
        match self {
            FormatError::BadImage { reason, .. } => FormatError::BadImage { frame, reason },
            other => FormatError::BadImage {
                frame,
                reason: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("strip of {steps} frames at {frame_height}px per frame exceeds the maximum image height")]
    StripTooLarge { steps: usize, frame_height: u32 },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
