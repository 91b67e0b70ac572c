//! Spike plant confirmation: a one-shot state machine over coincident
//! UI and map-marker evidence.
//!
//! The plant-status UI alone false-positives on the defuse indicator and
//! on partial occlusions, so a plant is only confirmed when the minimap
//! simultaneously shows the spike marker in the playable upper map area.

use matchlight_match_model::{Detection, PlantEvent, Point};

use crate::ingest::RawDetection;

/// Tuning for the plant confirmation.
#[derive(Debug, Clone)]
pub struct SpikeConfig {
    /// Label of the plant-status UI detection.
    pub ui_label: String,
    /// Label of the spike's minimap marker.
    pub marker_label: String,
    /// Markers at or below this y are off-map icons or defuse UI bleed.
    pub marker_y_cutoff: f64,
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            ui_label: "ui_spike_plant".to_string(),
            marker_label: "minimap_spike".to_string(),
            marker_y_cutoff: 200.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlantState {
    Waiting,
    Confirmed,
}

/// One-shot plant detector. Once confirmed it stays terminal for the rest
/// of the run; at most one plant event is ever emitted.
#[derive(Debug)]
pub struct SpikePlantDetector {
    config: SpikeConfig,
    state: PlantState,
}

impl SpikePlantDetector {
    pub fn new(config: SpikeConfig) -> Self {
        Self {
            config,
            state: PlantState::Waiting,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SpikeConfig::default())
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == PlantState::Confirmed
    }

    /// Observe one sampled frame. `plant_ui` holds the already-gated UI
    /// detections for this frame; `minimap` holds the frame's gated map
    /// detections.
    pub fn observe(
        &mut self,
        frame: u64,
        plant_ui: &[&RawDetection],
        minimap: &[Detection],
    ) -> Option<PlantEvent> {
        if self.state == PlantState::Confirmed {
            return None;
        }

        let ui_fired = plant_ui.iter().any(|d| d.label == self.config.ui_label);
        if !ui_fired {
            return None;
        }

        let marker_pos: Option<Point> = minimap
            .iter()
            .find(|d| d.label == self.config.marker_label)
            .map(|d| d.pos);

        match marker_pos {
            Some(pos) if pos.y < self.config.marker_y_cutoff => {
                self.state = PlantState::Confirmed;
                tracing::info!(frame, x = pos.x, y = pos.y, "spike plant confirmed");
                Some(PlantEvent { frame, pos })
            }
            _ => None,
        }
    }
}
