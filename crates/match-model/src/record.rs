//! The persisted match record: the sole interface between the extraction
//! and render passes. Written once, read once, and must round-trip
//! losslessly.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detection::Trail;
use crate::event::{MatchEvent, PlantEvent};

/// Errors for match-record persistence.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to read match record: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed match record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything the renderer needs from the extraction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Semantic events, globally sorted by frame.
    pub events: Vec<MatchEvent>,

    /// The full minimap trail.
    pub trails: Trail,

    /// Source frame rate.
    pub fps: f64,
}

impl MatchRecord {
    pub fn new(events: Vec<MatchEvent>, trails: Trail, fps: f64) -> Self {
        let mut record = Self {
            events,
            trails,
            fps,
        };
        record.sort_events();
        record
    }

    /// Sort events by frame. Stable, so same-frame events keep their
    /// emission order.
    pub fn sort_events(&mut self) {
        self.events.sort_by_key(MatchEvent::frame);
    }

    pub fn spike_plant(&self) -> Option<&PlantEvent> {
        self.events.iter().find_map(|e| match e {
            MatchEvent::SpikePlant(p) => Some(p),
            _ => None,
        })
    }

    pub fn load(path: &Path) -> Result<Self, RecordError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Structural checks over the persisted invariants. Returns a list of
    /// human-readable violations; empty means the record is well-formed.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.events.windows(2).any(|w| w[0].frame() > w[1].frame()) {
            issues.push("events are not sorted by frame".to_string());
        }

        let plants = self
            .events
            .iter()
            .filter(|e| matches!(e, MatchEvent::SpikePlant(_)))
            .count();
        if plants > 1 {
            issues.push(format!("{plants} spike_plant events (at most one allowed)"));
        }

        // Kill dedup: identical (killer, victim) pairs must be >= 5s apart.
        let dedup_frames = (self.fps * 5.0) as u64;
        let mut last_pair_frame: HashMap<(String, String), u64> = HashMap::new();
        for event in &self.events {
            if let Some(kill) = event.as_kill() {
                let key = (kill.killer.clone(), kill.victim.clone());
                if let Some(prev) = last_pair_frame.get(&key) {
                    if kill.frame.abs_diff(*prev) < dedup_frames {
                        issues.push(format!(
                            "duplicate kill {} -> {} within {} frames",
                            kill.killer,
                            kill.victim,
                            kill.frame.abs_diff(*prev)
                        ));
                    }
                }
                last_pair_frame.insert(key, kill.frame);
            }
        }

        // Focal non-duplication: same detail never within 10 frames.
        let mut last_detail_frame: HashMap<&str, u64> = HashMap::new();
        for event in &self.events {
            if let Some(focal) = event.as_focal() {
                if let Some(prev) = last_detail_frame.get(focal.detail.as_str()) {
                    if focal.frame.abs_diff(*prev) < 10 {
                        issues.push(format!(
                            "focal_point {} repeated within 10 frames",
                            focal.detail
                        ));
                    }
                }
                last_detail_frame.insert(&focal.detail, focal.frame);
            }
        }

        if self.trails.0.windows(2).any(|w| w[0].frame > w[1].frame) {
            issues.push("trail frames are not non-decreasing".to_string());
        }

        issues
    }
}
