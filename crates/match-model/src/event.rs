//! Semantic match events.
//!
//! Events are the persisted output of the extraction pass and the driving
//! input of the renderer. The list is globally sorted by frame before
//! persistence; a run carries at most one spike plant.

use serde::{Deserialize, Serialize};

use crate::ability::AbilityCategory;
use crate::geometry::Point;

/// A distinguished elimination (plain kills are evidence, not persisted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillEvent {
    pub frame: u64,
    pub killer: String,
    pub victim: String,
    /// Best-effort killer position from the trail, if any.
    pub k_pos: Option<Point>,
    /// Best-effort victim position from the trail, if any.
    pub v_pos: Option<Point>,
}

/// The one-shot spike plant confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantEvent {
    pub frame: u64,
    /// Map-marker position of the spike.
    pub pos: Point,
}

/// A tactical-ability usage causally attributed to a later event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocalEvent {
    /// Frame of the ability cast itself, not of the attributed event.
    pub frame: u64,
    /// Classifier label of the ability (e.g. `sova_recon_e`).
    pub detail: String,
    pub category: AbilityCategory,
    pub pos: Point,
}

/// Tagged union over every persisted event variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    FirstBlood(KillEvent),
    MultiKill(KillEvent),
    LastKill(KillEvent),
    SpikePlant(PlantEvent),
    FocalPoint(FocalEvent),
}

/// Coarse event class used for renderer arbitration and window sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    Kill,
    SpikePlant,
    FocalPoint,
}

impl EventClass {
    /// Total order used whenever event windows overlap: the highest
    /// priority event wins framing and annotation. Kills beat the plant,
    /// the plant beats contributions.
    pub fn priority(&self) -> u8 {
        match self {
            EventClass::Kill => 100,
            EventClass::SpikePlant => 50,
            EventClass::FocalPoint => 10,
        }
    }
}

impl MatchEvent {
    pub fn frame(&self) -> u64 {
        match self {
            MatchEvent::FirstBlood(k) | MatchEvent::MultiKill(k) | MatchEvent::LastKill(k) => {
                k.frame
            }
            MatchEvent::SpikePlant(p) => p.frame,
            MatchEvent::FocalPoint(f) => f.frame,
        }
    }

    pub fn class(&self) -> EventClass {
        match self {
            MatchEvent::FirstBlood(_) | MatchEvent::MultiKill(_) | MatchEvent::LastKill(_) => {
                EventClass::Kill
            }
            MatchEvent::SpikePlant(_) => EventClass::SpikePlant,
            MatchEvent::FocalPoint(_) => EventClass::FocalPoint,
        }
    }

    pub fn as_kill(&self) -> Option<&KillEvent> {
        match self {
            MatchEvent::FirstBlood(k) | MatchEvent::MultiKill(k) | MatchEvent::LastKill(k) => {
                Some(k)
            }
            _ => None,
        }
    }

    pub fn as_focal(&self) -> Option<&FocalEvent> {
        match self {
            MatchEvent::FocalPoint(f) => Some(f),
            _ => None,
        }
    }

    /// Anchor position for camera framing and focal attribution: killer
    /// position preferred, else victim; plants and focal points carry their
    /// own position.
    pub fn anchor(&self) -> Option<Point> {
        match self {
            MatchEvent::FirstBlood(k) | MatchEvent::MultiKill(k) | MatchEvent::LastKill(k) => {
                k.k_pos.or(k.v_pos)
            }
            MatchEvent::SpikePlant(p) => Some(p.pos),
            MatchEvent::FocalPoint(f) => Some(f.pos),
        }
    }

    /// Uppercased label drawn by the overlay compositor.
    pub fn display_label(&self) -> &'static str {
        match self {
            MatchEvent::FirstBlood(_) => "FIRST BLOOD",
            MatchEvent::MultiKill(_) => "MULTI KILL",
            MatchEvent::LastKill(_) => "LAST KILL",
            MatchEvent::SpikePlant(_) => "SPIKE PLANT",
            MatchEvent::FocalPoint(_) => "CONTRIBUTION",
        }
    }
}
