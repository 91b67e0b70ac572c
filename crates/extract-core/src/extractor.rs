//! The extraction façade: feed it per-frame classifier observations in
//! order, then finish into a match record.
//!
//! Frames must be observed in non-decreasing order — temporal clustering,
//! cooldown windows, and the trail's ordering invariant all depend on it.

use matchlight_common::config::ExtractionDefaults;
use matchlight_match_model::{
    AbilityCatalog, Detection, MatchEvent, MatchRecord, PlantEvent, RawKillDetection, Trail,
};

use crate::focal::attribute_focal_points;
use crate::ingest::{GatePolicy, RawDetection};
use crate::kill_feed::resolve_kill_pair;
use crate::sequence::sequence_kills;
use crate::smoke::{classify_smokes, SmokeConfig};
use crate::spike::{SpikeConfig, SpikePlantDetector};
use crate::stabilize::stabilize_kills;

/// Everything the classifier saw in one frame. Kill-feed and plant-UI
/// regions are only classified on sampled frames; `None` means the region
/// was not sampled (distinct from sampled-but-empty).
#[derive(Debug, Clone, Default)]
pub struct FrameObservation {
    pub minimap: Vec<RawDetection>,
    pub kill_feed: Option<Vec<RawDetection>>,
    pub plant_ui: Option<Vec<RawDetection>>,
}

/// Incremental event extractor for one match run.
#[derive(Debug)]
pub struct MatchExtractor {
    policy: GatePolicy,
    smoke_config: SmokeConfig,
    catalog: AbilityCatalog,
    spike: SpikePlantDetector,

    trail: Trail,
    raw_kills: Vec<RawKillDetection>,
    plant: Option<PlantEvent>,
}

impl MatchExtractor {
    pub fn new(policy: GatePolicy, catalog: AbilityCatalog) -> Self {
        Self {
            policy,
            smoke_config: SmokeConfig::default(),
            catalog,
            spike: SpikePlantDetector::new(SpikeConfig::default()),
            trail: Trail::new(),
            raw_kills: Vec::new(),
            plant: None,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            GatePolicy::from_defaults(&ExtractionDefaults::default()),
            AbilityCatalog::default(),
        )
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Observe one frame's classifier output. Gating happens here; the
    /// surviving minimap detections are appended to the trail in frame
    /// order and returned so the caller can draw them.
    pub fn observe_frame(&mut self, frame: u64, observation: FrameObservation) -> Vec<Detection> {
        let mut frame_minimap: Vec<Detection> = Vec::new();
        for raw in &observation.minimap {
            if let Some(detection) = self.policy.admit_minimap(frame, raw) {
                frame_minimap.push(detection.clone());
                self.trail.push(detection);
            }
        }

        if let Some(feed) = &observation.kill_feed {
            let gated: Vec<RawDetection> =
                self.policy.admit_kill_feed(feed).cloned().collect();
            if let Some((killer, victim)) = resolve_kill_pair(&gated) {
                self.raw_kills.push(RawKillDetection {
                    frame,
                    killer,
                    victim,
                });
            }
        }

        if self.plant.is_none() {
            if let Some(ui) = &observation.plant_ui {
                let gated: Vec<&RawDetection> = self.policy.admit_plant_ui(ui).collect();
                self.plant = self.spike.observe(frame, &gated, &frame_minimap);
            }
        }

        frame_minimap
    }

    /// Run the post-scan stages and produce the persisted record.
    pub fn finish(mut self, fps: f64) -> MatchRecord {
        classify_smokes(&mut self.trail, &self.smoke_config, fps);

        let confirmed = stabilize_kills(&self.raw_kills, fps);
        tracing::info!(
            raw = self.raw_kills.len(),
            confirmed = confirmed.len(),
            "kill stabilization complete"
        );

        let mut events: Vec<MatchEvent> = Vec::new();
        if let Some(plant) = self.plant {
            events.push(MatchEvent::SpikePlant(plant));
        }
        events.extend(sequence_kills(&confirmed, &self.trail, fps));

        let focal = attribute_focal_points(&events, &self.trail, &self.catalog, fps);
        events.extend(focal);

        MatchRecord::new(events, self.trail, fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchlight_match_model::Point;

    fn map_det(label: &str, x: f64, y: f64, confidence: f32) -> RawDetection {
        RawDetection::new(label, Point::new(x, y), 10.0, 10.0, confidence)
    }

    fn feed_det(label: &str, x: f64) -> RawDetection {
        RawDetection::new(label, Point::new(x, 20.0), 12.0, 12.0, 0.8)
    }

    #[test]
    fn test_end_to_end_single_kill_run() {
        let mut extractor = MatchExtractor::with_defaults();

        // Agents walking around; the kill feed shows jett_e > sage_f on
        // the sampled frames 100-105 only.
        for frame in 0..120u64 {
            let kill_feed = if matches!(frame, 100 | 103 | 105) {
                Some(vec![feed_det("jett_e", 10.0), feed_det("sage_f", 300.0)])
            } else {
                None
            };
            extractor.observe_frame(
                frame,
                FrameObservation {
                    minimap: vec![
                        map_det("jett_e", 100.0 + frame as f64, 80.0, 0.9),
                        map_det("sage_f", 200.0, 120.0, 0.9),
                    ],
                    kill_feed,
                    ..Default::default()
                },
            );
        }

        let record = extractor.finish(60.0);
        assert_eq!(record.events.len(), 1);
        let MatchEvent::FirstBlood(kill) = &record.events[0] else {
            panic!("expected first_blood, got {:?}", record.events[0]);
        };
        assert!((100..=105).contains(&kill.frame));
        assert_eq!(kill.killer, "jett_e");
        assert_eq!(kill.victim, "sage_f");
        assert!(kill.k_pos.is_some());
        assert!(record.check_invariants().is_empty());
    }

    #[test]
    fn test_end_to_end_plant_confirmation() {
        let mut extractor = MatchExtractor::with_defaults();
        extractor.observe_frame(
            300,
            FrameObservation {
                minimap: vec![map_det("minimap_spike", 120.0, 150.0, 0.9)],
                plant_ui: Some(vec![map_det("ui_spike_plant", 80.0, 40.0, 0.6)]),
                ..Default::default()
            },
        );

        let record = extractor.finish(60.0);
        let plant = record.spike_plant().expect("plant should be confirmed");
        assert_eq!(plant.frame, 300);

        // Marker below the map cutoff: no event.
        let mut extractor = MatchExtractor::with_defaults();
        extractor.observe_frame(
            300,
            FrameObservation {
                minimap: vec![map_det("minimap_spike", 120.0, 250.0, 0.9)],
                plant_ui: Some(vec![map_det("ui_spike_plant", 80.0, 40.0, 0.6)]),
                ..Default::default()
            },
        );
        assert!(extractor.finish(60.0).spike_plant().is_none());
    }

    #[test]
    fn test_low_confidence_plant_ui_gated_out() {
        let mut extractor = MatchExtractor::with_defaults();
        extractor.observe_frame(
            300,
            FrameObservation {
                minimap: vec![map_det("minimap_spike", 120.0, 150.0, 0.9)],
                plant_ui: Some(vec![map_det("ui_spike_plant", 80.0, 40.0, 0.4)]),
                ..Default::default()
            },
        );
        assert!(extractor.finish(60.0).spike_plant().is_none());
    }

    #[test]
    fn test_no_observations_degenerate_to_empty_record() {
        let extractor = MatchExtractor::with_defaults();
        let record = extractor.finish(60.0);
        assert!(record.events.is_empty());
        assert!(record.trails.is_empty());
        assert!(record.check_invariants().is_empty());
    }

    #[test]
    fn test_events_sorted_across_streams() {
        let mut extractor = MatchExtractor::with_defaults();

        // Plant early, kill streak later.
        extractor.observe_frame(
            300,
            FrameObservation {
                minimap: vec![map_det("minimap_spike", 120.0, 150.0, 0.9)],
                plant_ui: Some(vec![map_det("ui_spike_plant", 80.0, 40.0, 0.6)]),
                ..Default::default()
            },
        );
        for frame in [900u64, 903] {
            extractor.observe_frame(
                frame,
                FrameObservation {
                    kill_feed: Some(vec![feed_det("jett_e", 10.0), feed_det("sage_f", 300.0)]),
                    ..Default::default()
                },
            );
        }

        let record = extractor.finish(60.0);
        assert_eq!(record.events.len(), 2);
        assert!(record.events[0].frame() <= record.events[1].frame());
        assert!(matches!(record.events[0], MatchEvent::SpikePlant(_)));
    }
}
