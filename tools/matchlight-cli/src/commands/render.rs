//! Render the fixed-duration highlight from a match record.

use std::path::{Path, PathBuf};

use matchlight_common::config::AppConfig;
use matchlight_match_model::MatchRecord;
use matchlight_render_engine::{
    FrameSink, FrameSource, HighlightRenderer, PngSequenceSink, RawVideoSink,
};

use super::analyze::open_source;

/// Sibling path with a `_clean` suffix before the extension.
fn default_clean_path(video: &Path) -> PathBuf {
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match video.extension() {
        Some(ext) => format!("{stem}_clean.{}", ext.to_string_lossy()),
        None => format!("{stem}_clean"),
    };
    video.with_file_name(name)
}

pub fn run(
    record: PathBuf,
    video: PathBuf,
    clean: Option<PathBuf>,
    output: PathBuf,
    target_secs: Option<f64>,
    font: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = AppConfig::load();
    let record = MatchRecord::load(&record)
        .map_err(|e| anyhow::anyhow!("Failed to load match record: {e}"))?;

    let mut defaults = config.render;
    if let Some(secs) = target_secs {
        defaults.target_secs = secs;
    }
    if font.is_some() {
        defaults.font_path = font;
    }

    let mut annotated = open_source(&video)?;

    let clean_path = clean.unwrap_or_else(|| default_clean_path(&video));
    let mut clean_source: Option<Box<dyn FrameSource>> = match open_source(&clean_path) {
        Ok(source) => Some(source),
        Err(e) => {
            tracing::warn!(path = %clean_path.display(), error = %e, "clean base video unavailable");
            None
        }
    };

    let meta = annotated.meta();
    let mut sink: Box<dyn FrameSink> = if output.extension().is_some_and(|e| e == "rgb") {
        Box::new(RawVideoSink::create(&output, meta)?)
    } else {
        Box::new(PngSequenceSink::create(&output, meta)?)
    };

    println!(
        "Rendering {:.0}s highlight from {} events...",
        defaults.target_secs,
        record.events.len()
    );
    let summary = HighlightRenderer::new(defaults).render(
        &record,
        annotated.as_mut(),
        clean_source
            .as_deref_mut()
            .map(|s| s as &mut (dyn FrameSource + '_)),
        sink.as_mut(),
    )?;

    println!(
        "  Output: {} ({} frames, {:.1}s)",
        output.display(),
        summary.output_frames,
        summary.output_frames as f64 / meta.fps
    );
    if summary.over_budget {
        println!("  Warning: event scenes alone exceed the target duration; travel parts were skipped");
    } else {
        println!("  Travel speed: {:.2}x", summary.multiplier);
    }

    Ok(())
}
