//! Detection ingest: per-label confidence gating and size filtering.
//!
//! The frame classifier is deliberately run with a permissive confidence
//! floor so that faint-but-important ability markers survive; the gate
//! here re-applies the real per-label policy. Detections that fail the
//! gate are dropped silently — that is expected sensor noise, not an
//! error.

use std::collections::BTreeSet;

use matchlight_common::config::ExtractionDefaults;
use matchlight_match_model::{Detection, Point};

/// One ungated classifier observation for a single region of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub label: String,
    /// Box center in region-local pixel coordinates.
    pub pos: Point,
    /// Bounding-box size in pixels.
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

impl RawDetection {
    pub fn new(
        label: impl Into<String>,
        pos: Point,
        width: f32,
        height: f32,
        confidence: f32,
    ) -> Self {
        Self {
            label: label.into(),
            pos,
            width,
            height,
            confidence,
        }
    }
}

/// Per-label confidence gating and minimum-size filtering.
#[derive(Debug, Clone)]
pub struct GatePolicy {
    /// Low-signal-but-important labels admitted at the low floor.
    pub low_confidence_labels: BTreeSet<String>,
    pub low_floor: f32,
    pub high_floor: f32,
    pub kill_feed_floor: f32,
    pub plant_ui_floor: f32,
    pub min_box_px: f32,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self::from_defaults(&ExtractionDefaults::default())
    }
}

impl GatePolicy {
    pub fn from_defaults(defaults: &ExtractionDefaults) -> Self {
        let low_confidence_labels = [
            "astra_star_enemy",
            "astra_star_friend",
            "astra_ult_enemy",
            "fade_haunt_f",
            "fade_prowler_f",
            "smoke",
            "sova_drone_e",
            "sova_recon_e",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        Self {
            low_confidence_labels,
            low_floor: defaults.low_confidence_floor,
            high_floor: defaults.high_confidence_floor,
            kill_feed_floor: defaults.kill_feed_floor,
            plant_ui_floor: defaults.plant_ui_floor,
            min_box_px: defaults.min_box_px,
        }
    }

    /// Confidence threshold for a minimap label.
    pub fn minimap_floor(&self, label: &str) -> f32 {
        if self.low_confidence_labels.contains(label) {
            self.low_floor
        } else {
            self.high_floor
        }
    }

    /// Gate one minimap observation into a trail detection.
    pub fn admit_minimap(&self, frame: u64, raw: &RawDetection) -> Option<Detection> {
        if raw.confidence < self.minimap_floor(&raw.label) {
            return None;
        }
        if raw.width < self.min_box_px || raw.height < self.min_box_px {
            return None;
        }
        Some(Detection::new(
            frame,
            raw.label.clone(),
            raw.pos,
            raw.confidence,
        ))
    }

    /// Gate kill-feed observations (confidence floor only; the feed's
    /// glyphs are small by design).
    pub fn admit_kill_feed<'a>(
        &self,
        raw: &'a [RawDetection],
    ) -> impl Iterator<Item = &'a RawDetection> + 'a {
        let floor = self.kill_feed_floor;
        raw.iter().filter(move |d| d.confidence >= floor)
    }

    /// Gate plant-UI observations.
    pub fn admit_plant_ui<'a>(
        &self,
        raw: &'a [RawDetection],
    ) -> impl Iterator<Item = &'a RawDetection> + 'a {
        let floor = self.plant_ui_floor;
        raw.iter().filter(move |d| d.confidence >= floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(label: &str, confidence: f32) -> RawDetection {
        RawDetection::new(label, Point::new(50.0, 50.0), 10.0, 10.0, confidence)
    }

    #[test]
    fn test_low_confidence_allowlist_uses_low_floor() {
        let policy = GatePolicy::default();
        // Ability at 10% passes, agent at 10% is dropped.
        assert!(policy.admit_minimap(0, &raw("smoke", 0.10)).is_some());
        assert!(policy.admit_minimap(0, &raw("jett_e", 0.10)).is_none());
        assert!(policy.admit_minimap(0, &raw("jett_e", 0.30)).is_some());
    }

    #[test]
    fn test_below_threshold_never_enters_trail() {
        let policy = GatePolicy::default();
        assert!(policy.admit_minimap(0, &raw("smoke", 0.05)).is_none());
        assert!(policy.admit_minimap(0, &raw("sage_f", 0.24)).is_none());
    }

    #[test]
    fn test_minimum_size_floor() {
        let policy = GatePolicy::default();
        let tiny = RawDetection::new("jett_e", Point::new(1.0, 1.0), 4.0, 12.0, 0.9);
        assert!(policy.admit_minimap(0, &tiny).is_none());
    }

    #[test]
    fn test_kill_feed_floor() {
        let policy = GatePolicy::default();
        let dets = vec![raw("jett_e", 0.19), raw("sage_f", 0.21)];
        let admitted: Vec<_> = policy.admit_kill_feed(&dets).collect();
        assert_eq!(admitted.len(), 1);
        assert_eq!(admitted[0].label, "sage_f");
    }
}
