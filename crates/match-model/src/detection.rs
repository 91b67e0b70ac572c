//! Detection records and the ordered trail they accumulate into.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Team affiliation, derived once from the classifier's label vocabulary.
///
/// The model names faction-tagged classes with a `_friend`/`_f` or
/// `_enemy`/`_e` suffix; untagged classes (ambiguous smokes, the spike
/// marker, UI elements) are Neutral until something resolves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Friendly,
    Enemy,
    Neutral,
}

impl Faction {
    /// Parse the faction from a label's suffix convention.
    pub fn from_label(label: &str) -> Self {
        if label.ends_with("_friend") || label.ends_with("_f") {
            Faction::Friendly
        } else if label.ends_with("_enemy") || label.ends_with("_e") {
            Faction::Enemy
        } else {
            Faction::Neutral
        }
    }
}

/// A single labeled, positioned, confidence-scored observation from the
/// frame classifier, after ingest gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Source frame index.
    pub frame: u64,

    /// Classifier label.
    pub label: String,

    /// Faction derived from the label at ingest time.
    pub faction: Faction,

    /// Center position in region-local pixel coordinates.
    pub pos: Point,

    /// Classifier confidence in [0, 1].
    pub confidence: f32,
}

impl Detection {
    pub fn new(frame: u64, label: impl Into<String>, pos: Point, confidence: f32) -> Self {
        let label = label.into();
        let faction = Faction::from_label(&label);
        Self {
            frame,
            label,
            faction,
            pos,
            confidence,
        }
    }

    /// Rewrite the label and re-derive the faction. Used by the smoke
    /// classifier, the only stage allowed to mutate ingested detections.
    pub fn relabel(&mut self, label: impl Into<String>) {
        self.label = label.into();
        self.faction = Faction::from_label(&self.label);
    }
}

/// The time-ordered sequence of minimap detections across the whole run.
///
/// Append-only during extraction (frame order is non-decreasing by
/// construction of the sequential scan), read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trail(pub Vec<Detection>);

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, detection: Detection) {
        self.0.push(detection);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Detection> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Best-effort position of `label` at `frame`, searching backward within
    /// `lookback` frames and returning the temporally closest hit.
    pub fn position_near(&self, frame: u64, label: &str, lookback: u64) -> Option<Point> {
        self.0
            .iter()
            .filter(|d| d.label == label && d.frame <= frame && frame - d.frame < lookback)
            .min_by_key(|d| frame - d.frame)
            .map(|d| d.pos)
    }
}

impl<'a> IntoIterator for &'a Trail {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One kill-feed reading from a single sampled frame where a valid
/// killer/victim pair could be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawKillDetection {
    pub frame: u64,
    pub killer: String,
    pub victim: String,
}

/// A kill that survived temporal clustering, majority vote, and dedup.
///
/// Invariant: no two confirmed kills share the same (killer, victim) pair
/// within a 5-second window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedKill {
    /// Cluster-center frame.
    pub frame: u64,
    pub killer: String,
    pub victim: String,
}
