//! Accumulated movement-trail overlay for the minimap base video.
//!
//! Agent positions are drawn into a persistent canvas as the scan
//! advances: a dot per detection, plus a connecting segment when the same
//! label moved less than 50 px since its last sighting (larger jumps are
//! re-detections across deaths or teleports, not movement). The canvas is
//! alpha-blended under each live minimap crop, and the live pixels are
//! restored in a small square around every current detection so agent
//! icons stay legible over their own history.

use std::collections::{BTreeSet, HashMap};

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use matchlight_match_model::{Detection, Faction, Point};

/// Largest frame-to-frame move still drawn as a segment.
const SEGMENT_MAX_PX: f64 = 50.0;

/// Trail canvas weight in the blend (live crop keeps full weight).
const CANVAS_ALPHA: f32 = 0.6;

/// Half-size of the live-pixel cutout around each current detection.
const ICON_CUTOUT_PX: i64 = 9;

/// Labels never drawn into the trail: abilities, the spike, UI bleed.
const EXCLUDED_LABELS: [&str; 11] = [
    "astra_star_enemy",
    "astra_star_friend",
    "astra_ult_enemy",
    "fade_haunt_f",
    "fade_prowler_f",
    "minimap_spike",
    "smoke",
    "sova_drone_e",
    "sova_recon_e",
    "ui_spike_defuse",
    "ui_spike_plant",
];

fn faction_color(faction: Faction) -> Rgb<u8> {
    match faction {
        Faction::Friendly => Rgb([0, 255, 0]),
        Faction::Enemy => Rgb([255, 0, 0]),
        Faction::Neutral => Rgb([255, 255, 0]),
    }
}

/// Persistent trail canvas, sized to the minimap crop.
pub struct TrailCanvas {
    canvas: RgbImage,
    last_positions: HashMap<String, Point>,
    excluded: BTreeSet<&'static str>,
}

impl TrailCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbImage::new(width, height),
            last_positions: HashMap::new(),
            excluded: EXCLUDED_LABELS.into_iter().collect(),
        }
    }

    fn is_drawn(&self, detection: &Detection) -> bool {
        !self.excluded.contains(detection.label.as_str())
    }

    /// Draw one frame's admitted detections into the canvas.
    pub fn trace(&mut self, detections: &[Detection]) {
        for detection in detections {
            if !self.is_drawn(detection) {
                continue;
            }
            let color = faction_color(detection.faction);
            let current = detection.pos;

            if let Some(previous) = self.last_positions.get(&detection.label) {
                if previous.distance_to(&current) < SEGMENT_MAX_PX {
                    draw_line_segment_mut(
                        &mut self.canvas,
                        (previous.x as f32, previous.y as f32),
                        (current.x as f32, current.y as f32),
                        color,
                    );
                }
            }
            draw_filled_circle_mut(
                &mut self.canvas,
                (current.x as i32, current.y as i32),
                1,
                color,
            );
            self.last_positions.insert(detection.label.clone(), current);
        }
    }

    /// Blend the canvas under a live minimap crop, restoring live pixels
    /// around this frame's detections.
    pub fn composite(&self, live: &RgbImage, detections: &[Detection]) -> RgbImage {
        let mut out = live.clone();
        for (dst, src) in out.pixels_mut().zip(self.canvas.pixels()) {
            for c in 0..3 {
                let weighted = (src[c] as f32 * CANVAS_ALPHA) as u16;
                dst[c] = (dst[c] as u16 + weighted).min(255) as u8;
            }
        }

        let (width, height) = (live.width() as i64, live.height() as i64);
        for detection in detections {
            if !self.is_drawn(detection) {
                continue;
            }
            let (cx, cy) = (detection.pos.x as i64, detection.pos.y as i64);
            let x_range = (cx - ICON_CUTOUT_PX).max(0)..(cx + ICON_CUTOUT_PX).min(width);
            for x in x_range {
                for y in (cy - ICON_CUTOUT_PX).max(0)..(cy + ICON_CUTOUT_PX).min(height) {
                    out.put_pixel(x as u32, y as u32, *live.get_pixel(x as u32, y as u32));
                }
            }
        }
        out
    }
}
