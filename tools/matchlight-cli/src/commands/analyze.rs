//! Scan a recording into a match record plus the two base videos.

use std::path::PathBuf;

use matchlight_common::config::AppConfig;
use matchlight_match_model::ScreenLayout;
use matchlight_render_engine::{
    ExtractionPass, FrameSource, PngSequenceSource, PrecomputedDetections, RawVideoSink,
    RawVideoSource,
};

/// Open a recording: a directory is a PNG sequence, anything else a raw
/// RGB24 stream with a metadata sidecar.
pub(crate) fn open_source(path: &PathBuf) -> anyhow::Result<Box<dyn FrameSource>> {
    if path.is_dir() {
        Ok(Box::new(PngSequenceSource::open(path)?))
    } else {
        Ok(Box::new(RawVideoSource::open(path)?))
    }
}

pub fn run(
    video: PathBuf,
    detections: PathBuf,
    out_dir: PathBuf,
    layout: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = AppConfig::load();

    let layout = match layout {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("Failed to read layout {}: {e}", path.display()))?;
            serde_json::from_str::<ScreenLayout>(&json)
                .map_err(|e| anyhow::anyhow!("Malformed layout {}: {e}", path.display()))?
        }
        None => ScreenLayout::default(),
    };

    let mut source = open_source(&video)?;
    let mut classifier = PrecomputedDetections::load(&detections)?;

    let pass = ExtractionPass::new(layout, config.extraction);
    let base_meta = pass.base_video_meta(&source.meta());

    std::fs::create_dir_all(&out_dir)?;
    let annotated_path = out_dir.join("base_minimap.rgb");
    let clean_path = out_dir.join("base_minimap_clean.rgb");
    let record_path = out_dir.join("match_record.json");

    let mut annotated = RawVideoSink::create(&annotated_path, base_meta)?;
    let mut clean = RawVideoSink::create(&clean_path, base_meta)?;

    println!("Scanning: {}", video.display());
    let record = pass.run(
        source.as_mut(),
        &mut classifier,
        &mut annotated,
        &mut clean,
    )?;

    record
        .save(&record_path)
        .map_err(|e| anyhow::anyhow!("Failed to write match record: {e}"))?;

    println!("  Events: {}", record.events.len());
    println!("  Trail detections: {}", record.trails.len());
    println!("  Record: {}", record_path.display());
    println!("  Base video: {}", annotated_path.display());
    println!("  Clean base video: {}", clean_path.display());

    Ok(())
}
