//! Matchlight CLI — turn a recorded match into events and a highlight.
//!
//! Usage:
//!   matchlight analyze <VIDEO> --detections <JSONL>   Extract events and base videos
//!   matchlight render <RECORD> --video <BASE>         Render the fixed-duration highlight
//!   matchlight info <RECORD>                          Show a match record summary
//!   matchlight validate <RECORD>                      Check record invariants

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "matchlight",
    about = "Event extraction and adaptive highlight rendering for recorded matches",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a recording: extract the event record and the base videos
    Analyze {
        /// Recording to scan: a raw RGB24 file with a JSON sidecar, or a
        /// PNG sequence directory
        video: PathBuf,

        /// Detection sidecar (JSONL) from the external model service
        #[arg(short, long)]
        detections: PathBuf,

        /// Output directory for the record and base videos
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Screen layout JSON overriding the built-in 1080p calibration
        #[arg(long)]
        layout: Option<PathBuf>,
    },

    /// Render the fixed-duration highlight from a match record
    Render {
        /// Match record produced by `analyze`
        record: PathBuf,

        /// Trail-annotated base video
        #[arg(long, default_value = "base_minimap.rgb")]
        video: PathBuf,

        /// Clean base video (defaults to `<video>` with a `_clean` suffix)
        #[arg(long)]
        clean: Option<PathBuf>,

        /// Output path: `.rgb` for a raw stream, anything else for a PNG
        /// sequence directory
        #[arg(short, long, default_value = "highlight.rgb")]
        output: PathBuf,

        /// Target output duration in seconds
        #[arg(long)]
        target_secs: Option<f64>,

        /// TTF/OTF font for overlay captions
        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// Show a match record summary
    Info {
        /// Path to the match record
        record: PathBuf,
    },

    /// Check match record invariants
    Validate {
        /// Path to the match record
        record: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    matchlight_common::logging::init_logging(&matchlight_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Analyze {
            video,
            detections,
            out_dir,
            layout,
        } => commands::analyze::run(video, detections, out_dir, layout),
        Commands::Render {
            record,
            video,
            clean,
            output,
            target_secs,
            font,
        } => commands::render::run(record, video, clean, output, target_secs, font),
        Commands::Info { record } => commands::info::run(record),
        Commands::Validate { record } => commands::validate::run(record),
    }
}
