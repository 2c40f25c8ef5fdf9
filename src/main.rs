use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ani2mousecape::config::ConvertOptions;
use ani2mousecape::pipeline::{convert_dir, convert_file};

#[derive(Parser, Debug)]
#[command(name = "ani2mousecape", version)]
#[command(about = "Convert Windows animated cursors to Mousecape-compatible PNG strips", long_about = None)]
struct Cli {
    /// Input .ani file, or a directory containing .ani files
    input: PathBuf,

    /// Output PNG file, or output directory when the input is a directory
    #[arg(short, long)]
    output: PathBuf,

    /// Descend into subdirectories when the input is a directory
    #[arg(short, long)]
    recursive: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Sample animations longer than this down to N evenly spaced frames
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_frames: Option<u32>,

    /// Do not write cursors.yaml in directory mode
    #[arg(long)]
    no_summary: bool,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        let mut options = ConvertOptions::new()
            .with_recursive(self.recursive)
            .with_summary(!self.no_summary);
        if let Some(max) = self.max_frames.and_then(|n| NonZeroUsize::new(n as usize)) {
            options = options.with_max_frames(max);
        }
        options
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = cli.options();

    if cli.input.is_dir() {
        let report = convert_dir(&cli.input, &cli.output, &options)?;
        println!(
            "Converted {} cursor(s), {} failed",
            report.converted.len(),
            report.failed.len()
        );
        if let Some(path) = &report.summary_path {
            println!("Summary written to {}", path.display());
        }
        if !report.is_success() {
            bail!("{} file(s) could not be converted", report.failed.len());
        }
        return Ok(());
    }

    let summary = convert_file(&cli.input, &cli.output, &options)
        .with_context(|| format!("Failed to convert {}", cli.input.display()))?;
    println!(
        "Frames: {}, Size: {}x{}, Stacked size: {}x{}",
        summary.frames,
        summary.width,
        summary.height,
        summary.width,
        summary.stacked_height()
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::parse_from(["ani2mousecape", "busy.ani", "-o", "busy.png", "--max-frames", "24"]);
        assert_eq!(cli.input, PathBuf::from("busy.ani"));
        assert_eq!(cli.output, PathBuf::from("busy.png"));

        let options = cli.options();
        assert_eq!(options.max_frames.map(NonZeroUsize::get), Some(24));
        assert!(!options.recursive);
        assert!(options.write_summary);
    }

    #[test]
    fn test_zero_max_frames_rejected() {
        let result = Cli::try_parse_from(["ani2mousecape", "busy.ani", "-o", "busy.png", "--max-frames", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_is_required() {
        assert!(Cli::try_parse_from(["ani2mousecape", "busy.ani"]).is_err());
    }
}
