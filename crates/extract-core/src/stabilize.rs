//! Kill stabilization: cluster raw per-frame kill-feed readings into
//! confirmed kill events.
//!
//! The feed shows each elimination for a second or two, so one real kill
//! produces a streak of raw readings with a consistent victim. Grouping on
//! that streak, discarding uncorroborated singletons, and majority-voting
//! the identities absorbs per-frame classifier flicker. A final dedup pass
//! protects against the same elimination being re-confirmed from lingering
//! feed entries.

use matchlight_match_model::{ConfirmedKill, RawKillDetection};

/// Maximum frame gap (seconds) for two raw readings to stay in one group.
const GROUP_GAP_SECS: f64 = 2.0;

/// Window (seconds) in which an identical (killer, victim) pair is treated
/// as a duplicate of an already-accepted kill.
const DEDUP_SECS: f64 = 5.0;

/// Stabilize an ordered stream of raw kill readings into confirmed kills.
pub fn stabilize_kills(raw: &[RawKillDetection], fps: f64) -> Vec<ConfirmedKill> {
    if raw.is_empty() {
        return Vec::new();
    }

    let gap_frames = (fps * GROUP_GAP_SECS) as u64;

    // Stage 1: temporal grouping on (same victim, small gap).
    let mut groups: Vec<Vec<&RawKillDetection>> = Vec::new();
    let mut current: Vec<&RawKillDetection> = vec![&raw[0]];
    for pair in raw.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        if curr.victim == prev.victim && curr.frame - prev.frame < gap_frames {
            current.push(curr);
        } else {
            groups.push(std::mem::replace(&mut current, vec![curr]));
        }
    }
    groups.push(current);

    // Stage 2: majority vote within each corroborated group.
    let mut voted: Vec<ConfirmedKill> = Vec::new();
    for group in &groups {
        if group.len() < 2 {
            continue; // a single sighting is not corroboration
        }
        let killer = majority_label(group.iter().map(|g| g.killer.as_str()));
        let victim = majority_label(group.iter().map(|g| g.victim.as_str()));
        // Representative frame: the middle element by list position.
        let frame = group[group.len() / 2].frame;
        voted.push(ConfirmedKill {
            frame,
            killer,
            victim,
        });
    }

    // Stage 3: cross-group dedup on identical pairs within the window.
    let dedup_frames = (fps * DEDUP_SECS) as u64;
    let mut confirmed: Vec<ConfirmedKill> = Vec::new();
    for candidate in voted {
        let duplicate = confirmed.iter().any(|past| {
            past.killer == candidate.killer
                && past.victim == candidate.victim
                && candidate.frame - past.frame < dedup_frames
        });
        if !duplicate {
            confirmed.push(candidate);
        }
    }

    tracing::debug!(
        raw = raw.len(),
        confirmed = confirmed.len(),
        "stabilized kill feed"
    );
    confirmed
}

/// Most frequent label; ties broken by first appearance in the group.
fn majority_label<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    let labels: Vec<&str> = labels.collect();
    let mut best: &str = labels[0];
    let mut best_count = 0usize;
    for (i, label) in labels.iter().enumerate() {
        // Only the first occurrence of each label is a candidate, which
        // preserves first-seen order on count ties.
        if labels[..i].contains(label) {
            continue;
        }
        let count = labels.iter().filter(|l| *l == label).count();
        if count > best_count {
            best_count = count;
            best = label;
        }
    }
    best.to_string()
}
