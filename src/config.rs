use std::num::NonZeroUsize;

/// Mousecape caps animated cursors at 24 frames; pass this to `with_max_frames`
/// to sample longer animations down to that length.
pub const MOUSECAPE_MAX_FRAMES: NonZeroUsize = NonZeroUsize::MIN.saturating_add(23);

pub const SUMMARY_FILE_NAME: &str = "cursors.yaml";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    pub max_frames: Option<NonZeroUsize>,
    pub recursive: bool,
    pub write_summary: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            max_frames: None,
            recursive: false,
            write_summary: true,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_frames(mut self, max_frames: NonZeroUsize) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_summary(mut self, write: bool) -> Self {
        self.write_summary = write;
        self
    }
}
