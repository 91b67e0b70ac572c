//! Kill-feed pair resolution: extract the best killer/victim label pair
//! from one sampled kill-feed frame.
//!
//! The feed lays the killer's icon on the left and the victim's on the
//! right, so clustering by horizontal position recovers the roles. A frame
//! whose detections are too tightly packed is rejected outright — an
//! ambiguous feed row is worse evidence than none.

use matchlight_match_model::Faction;

use crate::ingest::RawDetection;

/// Horizontal cluster width for killer/victim candidates, in pixels.
const CLUSTER_PX: f64 = 40.0;

/// Minimum spread between the extreme detections for the row to be
/// resolvable at all.
const MIN_SPREAD_PX: f64 = 50.0;

/// Resolve a `(killer, victim)` pair from one frame's gated kill-feed
/// detections, or `None` if the frame is unusable.
///
/// Among all killer-cluster x victim-cluster combinations, same-faction
/// pairs are excluded and the pair with the highest summed confidence
/// wins; ties keep the first maximum encountered (iteration is in sorted-x
/// order, so the tie-break is stable and auditable).
pub fn resolve_kill_pair(detections: &[RawDetection]) -> Option<(String, String)> {
    if detections.len() < 2 {
        return None;
    }

    let mut sorted: Vec<&RawDetection> = detections.iter().collect();
    sorted.sort_by(|a, b| a.pos.x.total_cmp(&b.pos.x));

    let min_x = sorted.first()?.pos.x;
    let max_x = sorted.last()?.pos.x;
    if max_x - min_x < MIN_SPREAD_PX {
        return None;
    }

    let killers: Vec<&RawDetection> = sorted
        .iter()
        .copied()
        .filter(|d| d.pos.x < min_x + CLUSTER_PX)
        .collect();
    let victims: Vec<&RawDetection> = sorted
        .iter()
        .copied()
        .filter(|d| d.pos.x > max_x - CLUSTER_PX)
        .collect();

    let mut best: Option<(&RawDetection, &RawDetection)> = None;
    let mut best_score = f32::NEG_INFINITY;

    for killer in &killers {
        for victim in &victims {
            if std::ptr::eq(*killer, *victim) {
                continue;
            }
            if Faction::from_label(&killer.label) == Faction::from_label(&victim.label) {
                continue;
            }
            let score = killer.confidence + victim.confidence;
            if score > best_score {
                best_score = score;
                best = Some((killer, victim));
            }
        }
    }

    best.map(|(k, v)| (k.label.clone(), v.label.clone()))
}
