//! Screen-region calibration for the source footage.
//!
//! The frame classifier only sees three fixed crops of each frame: the
//! overview minimap, the kill feed, and the plant-status indicator. The
//! default rectangles match 1920x1080 footage; other resolutions can load
//! a layout from JSON.

use serde::{Deserialize, Serialize};

use crate::geometry::PixelRect;

/// The three fixed screen regions the classifier observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Overview minimap (top-left).
    Minimap,
    /// Kill feed (top-right).
    KillFeed,
    /// Spike plant-status indicator (top-center).
    PlantUi,
}

/// Pixel rectangles for each classifier region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenLayout {
    pub minimap: PixelRect,
    pub kill_feed: PixelRect,
    pub plant_ui: PixelRect,
}

impl Default for ScreenLayout {
    fn default() -> Self {
        Self {
            minimap: PixelRect::new(35, 140, 365, 340),
            kill_feed: PixelRect::new(1207, 165, 440, 70),
            plant_ui: PixelRect::new(748, 96, 162, 93),
        }
    }
}

impl ScreenLayout {
    pub fn region(&self, region: Region) -> PixelRect {
        match region {
            Region::Minimap => self.minimap,
            Region::KillFeed => self.kill_feed,
            Region::PlantUi => self.plant_ui,
        }
    }
}
