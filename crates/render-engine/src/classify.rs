//! The external-model seam.
//!
//! The object detector itself runs out of process; the engine only needs a
//! way to ask "what did the model see in this region of this frame". The
//! production path replays a JSONL sidecar exported by the model service;
//! tests implement the trait directly with scripted detections.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use image::RgbImage;
use matchlight_common::error::{MatchlightError, MatchlightResult};
use matchlight_extract_core::RawDetection;
use matchlight_match_model::{Point, Region};
use serde::{Deserialize, Serialize};

/// Per-region detection lookup for one frame.
pub trait FrameClassifier {
    /// Ungated detections for one region crop of one frame, in
    /// region-local coordinates.
    fn detect(
        &mut self,
        region: Region,
        frame: u64,
        image: &RgbImage,
    ) -> MatchlightResult<Vec<RawDetection>>;
}

/// One JSONL row of the detection sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DetectionRow {
    frame: u64,
    region: Region,
    label: String,
    /// Box center, region-local pixels.
    cx: f64,
    cy: f64,
    width: f32,
    height: f32,
    confidence: f32,
}

/// Replays a detection sidecar produced by the external model service.
#[derive(Debug, Default)]
pub struct PrecomputedDetections {
    by_key: HashMap<(u64, Region), Vec<RawDetection>>,
}

impl PrecomputedDetections {
    /// Load a JSONL sidecar; every line is one detection row. Malformed
    /// lines are an error, not a skip — a corrupt sidecar means the model
    /// run must be repeated.
    pub fn load(path: &Path) -> MatchlightResult<Self> {
        if !path.exists() {
            return Err(MatchlightError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let reader = BufReader::new(std::fs::File::open(path)?);
        let mut by_key: HashMap<(u64, Region), Vec<RawDetection>> = HashMap::new();
        let mut rows = 0usize;
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let row: DetectionRow = serde_json::from_str(&line).map_err(|e| {
                MatchlightError::detection(format!("malformed detection row: {e}"))
            })?;
            by_key.entry((row.frame, row.region)).or_default().push(
                RawDetection::new(
                    row.label,
                    Point::new(row.cx, row.cy),
                    row.width,
                    row.height,
                    row.confidence,
                ),
            );
            rows += 1;
        }
        tracing::info!(rows, frames = by_key.len(), "loaded detection sidecar");
        Ok(Self { by_key })
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, frame: u64, region: Region, detections: Vec<RawDetection>) {
        self.by_key.insert((frame, region), detections);
    }
}

impl FrameClassifier for PrecomputedDetections {
    fn detect(
        &mut self,
        region: Region,
        frame: u64,
        _image: &RgbImage,
    ) -> MatchlightResult<Vec<RawDetection>> {
        Ok(self
            .by_key
            .get(&(frame, region))
            .cloned()
            .unwrap_or_default())
    }
}
