// High-level conversion API: .ani bytes or files to Mousecape PNG strips

use anyhow::{Context, bail};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use super::ani::AniParser;
use super::fs_ops::{is_ani_path, read_input, write_output};
use super::strip::{compose_strip, encode_png, select_steps};
use super::summary::{CursorSummary, write_summary};
use crate::config::{ConvertOptions, SUMMARY_FILE_NAME};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Conversion {
    pub png: Vec<u8>,
    pub summary: CursorSummary,
}

/// Decode, compose and encode in memory. Nothing is produced unless every
/// stage succeeds.
pub fn convert_bytes(name: &str, data: &[u8], options: &ConvertOptions) -> Result<Conversion> {
    let cursor = AniParser::parse(data)?;
    let strip = compose_strip(&cursor, options.max_frames)?;
    let frames = select_steps(cursor.step_count(), options.max_frames).len();
    let first = cursor.frame_at(0);

    if frames < cursor.step_count() {
        info!(
            "Reduced {} from {} to {} frames",
            name,
            cursor.step_count(),
            frames
        );
    }

    let png = encode_png(&strip)?;

    Ok(Conversion {
        png,
        summary: CursorSummary {
            name: name.to_string(),
            frames,
            original_frames: cursor.step_count(),
            width: first.width(),
            height: first.height(),
            rate: cursor.rates[0],
            title: cursor.info.title.clone(),
            artist: cursor.info.artist.clone(),
        },
    })
}

pub fn convert_file(input: &Path, output: &Path, options: &ConvertOptions) -> Result<CursorSummary> {
    let data = read_input(input)?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    let conversion = convert_bytes(&name, &data, options)?;
    write_output(output, &conversion.png)?;

    let summary = conversion.summary;
    info!(
        "Converted {} -> {} ({} frames, {}x{}, stacked {}x{})",
        input.display(),
        output.display(),
        summary.frames,
        summary.width,
        summary.height,
        summary.width,
        summary.stacked_height()
    );

    Ok(summary)
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<CursorSummary>,
    pub failed: Vec<(PathBuf, Error)>,
    pub summary_path: Option<PathBuf>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Convert every `.ani` file under `input_dir`, mirroring relative paths into
/// `output_dir`. A failing file is recorded and the batch continues.
pub fn convert_dir(input_dir: &Path, output_dir: &Path, options: &ConvertOptions) -> anyhow::Result<BatchReport> {
    if !input_dir.is_dir() {
        bail!("Input directory does not exist: {}", input_dir.display());
    }

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let mut report = BatchReport::default();

    for entry in WalkDir::new(input_dir)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || !is_ani_path(path) {
            continue;
        }

        let relative = path.strip_prefix(input_dir).unwrap_or(path);
        let output = output_dir.join(relative).with_extension("png");

        match convert_file(path, &output, options) {
            Ok(summary) => report.converted.push(summary),
            Err(e) => {
                warn!("Failed to convert {}: {}", path.display(), e);
                report.failed.push((path.to_path_buf(), e));
            }
        }
    }

    if report.converted.is_empty() && report.failed.is_empty() {
        warn!("No .ani files found in {}", input_dir.display());
    }

    if options.write_summary && !report.converted.is_empty() {
        let summary_path = output_dir.join(SUMMARY_FILE_NAME);
        write_summary(&summary_path, &report.converted)
            .with_context(|| format!("Failed to write summary {}", summary_path.display()))?;
        info!("Generated summary at {}", summary_path.display());
        report.summary_path = Some(summary_path);
    }

    Ok(report)
}
