//! Smoke classification: resolve ambiguous area-denial detections into
//! friendly/enemy variants using nearby faction-tagged star markers.
//!
//! Pure post-hoc relabeling over the finished trail — no detections are
//! created or removed. Smokes that never match a marker stay ambiguous and
//! are excluded from faction-aware logic downstream.

use matchlight_match_model::Trail;

/// Tuning for the marker search.
#[derive(Debug, Clone)]
pub struct SmokeConfig {
    /// Label of the yet-unclassified smoke detection.
    pub ambiguous_label: String,
    /// Faction-specific marker labels searched, friendly first.
    pub friendly_marker: String,
    pub enemy_marker: String,
    /// Rewritten labels.
    pub friendly_label: String,
    pub enemy_label: String,
    /// Spatial search radius in pixels.
    pub search_radius: f64,
    /// Temporal lookback in seconds.
    pub lookback_secs: f64,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            ambiguous_label: "smoke".to_string(),
            friendly_marker: "astra_star_friend".to_string(),
            enemy_marker: "astra_star_enemy".to_string(),
            friendly_label: "smoke_friend".to_string(),
            enemy_label: "smoke_enemy".to_string(),
            search_radius: 30.0,
            lookback_secs: 5.0,
        }
    }
}

/// Relabel ambiguous smokes in place. Returns how many were classified.
///
/// For each smoke, the nearest marker within the lookback window and
/// radius wins. The friendly list is scanned before the enemy list, and
/// the distance comparison is strict, so a friendly marker wins an exact
/// distance tie but either side may win on distance alone.
pub fn classify_smokes(trail: &mut Trail, config: &SmokeConfig, fps: f64) -> usize {
    let friendly: Vec<(u64, matchlight_match_model::Point)> = trail
        .iter()
        .filter(|d| d.label == config.friendly_marker)
        .map(|d| (d.frame, d.pos))
        .collect();
    let enemy: Vec<(u64, matchlight_match_model::Point)> = trail
        .iter()
        .filter(|d| d.label == config.enemy_marker)
        .map(|d| (d.frame, d.pos))
        .collect();

    let lookback_frames = (fps * config.lookback_secs) as u64;
    let mut classified = 0;

    for detection in trail.iter_mut() {
        if detection.label != config.ambiguous_label {
            continue;
        }

        let min_frame = detection.frame.saturating_sub(lookback_frames);
        let mut best_distance = f64::INFINITY;
        let mut resolved: Option<&str> = None;

        for (markers, label) in [
            (&friendly, config.friendly_label.as_str()),
            (&enemy, config.enemy_label.as_str()),
        ] {
            for (frame, pos) in markers {
                if *frame < min_frame || *frame > detection.frame {
                    continue;
                }
                let distance = detection.pos.distance_to(pos);
                if distance < config.search_radius && distance < best_distance {
                    best_distance = distance;
                    resolved = Some(label);
                }
            }
        }

        if let Some(label) = resolved {
            detection.relabel(label.to_string());
            classified += 1;
        }
    }

    if classified > 0 {
        tracing::debug!(classified, "resolved ambiguous smokes");
    }
    classified
}
