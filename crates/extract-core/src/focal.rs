//! Focal-point attribution: causally link tactical-ability usage to nearby
//! confirmed events via a space-time decay score.
//!
//! An ability cast shortly before and close to a kill or plant is credited
//! as a contribution. The score decays quadratically in time and linearly
//! in distance, so recency dominates.

use matchlight_match_model::{AbilityCatalog, Faction, FocalEvent, MatchEvent, Trail};

/// Candidate window (seconds) strictly before the anchor event.
const WINDOW_MIN_SECS: f64 = 1.0;
const WINDOW_MAX_SECS: f64 = 10.0;

/// Minimum score for an attribution to be accepted at all.
const SCORE_FLOOR: f64 = 0.01;

/// Frame window within which the same ability detail is never credited
/// twice.
const DEDUP_FRAMES: u64 = 10;

/// Attribute ability casts to the given events, returning the new focal
/// events (not merged into the input).
pub fn attribute_focal_points(
    events: &[MatchEvent],
    trail: &Trail,
    catalog: &AbilityCatalog,
    fps: f64,
) -> Vec<MatchEvent> {
    let abilities: Vec<&matchlight_match_model::Detection> = trail
        .iter()
        .filter(|d| catalog.is_tactical(&d.label))
        .collect();

    let mut focal_events: Vec<FocalEvent> = Vec::new();

    for event in events {
        if matches!(event, MatchEvent::FocalPoint(_)) {
            continue;
        }
        let Some(anchor) = event.anchor() else {
            continue;
        };
        let anchor_frame = event.frame();
        let plant_anchor = matches!(event, MatchEvent::SpikePlant(_));

        let mut best: Option<&matchlight_match_model::Detection> = None;
        let mut best_score = f64::NEG_INFINITY;

        for ability in &abilities {
            // A plant is an enemy-team action; friendly abilities cannot
            // have caused it.
            if plant_anchor && ability.faction == Faction::Friendly {
                continue;
            }

            if ability.frame >= anchor_frame {
                continue;
            }
            let delta_secs = (anchor_frame - ability.frame) as f64 / fps;
            if delta_secs <= WINDOW_MIN_SECS || delta_secs >= WINDOW_MAX_SECS {
                continue;
            }

            let distance = anchor.distance_to(&ability.pos).max(1.0);
            let score = 1.0 / (delta_secs * delta_secs) / distance;

            if score > best_score {
                best_score = score;
                best = Some(ability);
            }
        }

        let Some(ability) = best else { continue };
        if best_score <= SCORE_FLOOR {
            continue;
        }

        // Never re-credit the same cast for multiple nearby events.
        let duplicate = focal_events.iter().any(|fe| {
            fe.detail == ability.label && fe.frame.abs_diff(ability.frame) < DEDUP_FRAMES
        });
        if duplicate {
            continue;
        }

        let Some(category) = catalog.category(&ability.label) else {
            continue;
        };
        focal_events.push(FocalEvent {
            frame: ability.frame,
            detail: ability.label.clone(),
            category,
            pos: ability.pos,
        });
    }

    tracing::debug!(count = focal_events.len(), "attributed contributions");
    focal_events.into_iter().map(MatchEvent::FocalPoint).collect()
}
