// cursors.yaml summary of a batch conversion

use std::path::Path;

use super::fs_ops::write_output;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorSummary {
    pub name: String,
    pub frames: usize,
    pub original_frames: usize,
    pub width: u32,
    pub height: u32,
    /// First step's display rate, in jiffies.
    pub rate: u32,
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl CursorSummary {
    pub fn stacked_height(&self) -> u64 {
        self.height as u64 * self.frames as u64
    }
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

pub fn format_summary_entry(summary: &CursorSummary) -> String {
    let mut lines = vec![
        format!("  - name: {}", quoted(&summary.name)),
        format!("    frames: {}", summary.frames),
    ];
    if summary.original_frames != summary.frames {
        lines.push(format!("    original_frames: {}", summary.original_frames));
    }
    lines.push(format!("    size: {}x{}", summary.width, summary.height));
    lines.push(format!(
        "    stacked_size: {}x{}",
        summary.width,
        summary.stacked_height()
    ));
    lines.push(format!("    rate: {}", summary.rate));
    if let Some(title) = &summary.title {
        lines.push(format!("    title: {}", quoted(title)));
    }
    if let Some(artist) = &summary.artist {
        lines.push(format!("    artist: {}", quoted(artist)));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn format_summary(summaries: &[CursorSummary]) -> String {
    let mut out = String::from("cursors:\n");
    for summary in summaries {
        out.push_str(&format_summary_entry(summary));
        out.push('\n');
    }
    out
}

pub fn write_summary(path: &Path, summaries: &[CursorSummary]) -> Result<()> {
    write_output(path, format_summary(summaries).as_bytes())
}
