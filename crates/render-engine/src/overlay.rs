//! Event annotation drawing.
//!
//! All drawing happens after the camera crop, in output-frame
//! coordinates. Text needs a font file; when none is configured the
//! geometric markers are still drawn and the captions are skipped.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut,
    draw_text_mut,
};
use imageproc::rect::Rect;
use matchlight_common::error::{MatchlightError, MatchlightResult};
use matchlight_match_model::{AbilityCategory, EventClass, MatchEvent};

const COLOR_KILLER: Rgb<u8> = Rgb([255, 255, 0]);
const COLOR_VICTIM: Rgb<u8> = Rgb([255, 0, 0]);
const COLOR_ARROW: Rgb<u8> = Rgb([255, 255, 0]);
const COLOR_SPIKE: Rgb<u8> = Rgb([255, 0, 255]);
const COLOR_FOCAL: Rgb<u8> = Rgb([0, 255, 0]);
const COLOR_TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const COLOR_BORDER: Rgb<u8> = Rgb([255, 255, 0]);

const BORDER_PX: i32 = 10;
const MARKER_HALF_PX: i32 = 15;
const SPIKE_HALF_PX: i32 = 20;
const FOCAL_RADIUS_PX: i32 = 30;

const TL_BG: Rgb<u8> = Rgb([50, 50, 50]);
const TL_EVENT: Rgb<u8> = Rgb([255, 0, 0]);
const TL_FOCAL: Rgb<u8> = Rgb([0, 255, 0]);
const TL_CURSOR: Rgb<u8> = Rgb([255, 255, 255]);
const TL_HEIGHT: u32 = 30;
const TL_BOTTOM_MARGIN: u32 = 20;

fn draw_hollow_rect_thick(frame: &mut RgbImage, rect: Rect, color: Rgb<u8>, thickness: u32) {
    for i in 0..thickness as i32 {
        let w = rect.width() as i64 - 2 * i as i64;
        let h = rect.height() as i64 - 2 * i as i64;
        if w <= 0 || h <= 0 {
            break;
        }
        draw_hollow_rect_mut(
            frame,
            Rect::at(rect.left() + i, rect.top() + i).of_size(w as u32, h as u32),
            color,
        );
    }
}

fn draw_arrow(frame: &mut RgbImage, from: (i32, i32), to: (i32, i32), color: Rgb<u8>) {
    let (fx, fy) = (from.0 as f32, from.1 as f32);
    let (tx, ty) = (to.0 as f32, to.1 as f32);
    draw_line_segment_mut(frame, (fx, fy), (tx, ty), color);

    let (dx, dy) = (tx - fx, ty - fy);
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1.0 {
        return;
    }
    let tip = 0.3 * len;
    let angle = dy.atan2(dx);
    for side in [-1.0f32, 1.0] {
        let a = angle + side * 0.5;
        let hx = tx - tip * a.cos();
        let hy = ty - tip * a.sin();
        draw_line_segment_mut(frame, (tx, ty), (hx, hy), color);
    }
}

fn centered_square(center: (i32, i32), half: i32) -> Rect {
    Rect::at(center.0 - half, center.1 - half).of_size(half as u32 * 2, half as u32 * 2)
}

/// Draws event markers, captions, the highlight border, and the timeline
/// bar onto camera-processed frames.
#[derive(Debug)]
pub struct OverlayCompositor {
    width: u32,
    height: u32,
    font: Option<FontVec>,
}

impl OverlayCompositor {
    pub fn new(width: u32, height: u32, font_path: Option<&Path>) -> MatchlightResult<Self> {
        let font = match font_path {
            Some(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    MatchlightError::render(format!("failed to read font {path:?}: {e}"))
                })?;
                Some(FontVec::try_from_vec(bytes).map_err(|_| {
                    MatchlightError::render(format!("invalid font file {path:?}"))
                })?)
            }
            None => {
                tracing::debug!("no overlay font configured; captions will be skipped");
                None
            }
        };
        Ok(Self {
            width,
            height,
            font,
        })
    }

    fn text(&self, frame: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, px: f32, s: &str) {
        if let Some(font) = &self.font {
            draw_text_mut(frame, color, x, y, PxScale::from(px), font, s);
        }
    }

    /// Killer/victim boxes with a killer-to-victim arrow. Either marker is
    /// optional; the arrow needs both.
    pub fn draw_kill_markers(
        &self,
        frame: &mut RgbImage,
        killer: Option<(i32, i32)>,
        victim: Option<(i32, i32)>,
    ) {
        if let (Some(k), Some(v)) = (killer, victim) {
            draw_arrow(frame, k, v, COLOR_ARROW);
        }
        if let Some(k) = killer {
            draw_hollow_rect_thick(frame, centered_square(k, MARKER_HALF_PX), COLOR_KILLER, 2);
            self.text(frame, COLOR_KILLER, k.0 - 25, k.1 - 40, 20.0, "KILLER");
        }
        if let Some(v) = victim {
            draw_hollow_rect_thick(frame, centered_square(v, MARKER_HALF_PX), COLOR_VICTIM, 2);
            self.text(frame, COLOR_VICTIM, v.0 - 25, v.1 - 40, 20.0, "VICTIM");
        }
    }

    pub fn draw_plant_marker(&self, frame: &mut RgbImage, pos: (i32, i32)) {
        draw_hollow_rect_thick(frame, centered_square(pos, SPIKE_HALF_PX), COLOR_SPIKE, 3);
        self.text(frame, COLOR_SPIKE, pos.0 - 50, pos.1 - 55, 24.0, "SPIKE PLANT");
    }

    /// Contribution marker: circle in general, square for Astra ultimates
    /// whose footprint is rectangular on the map.
    pub fn draw_focal_marker(
        &self,
        frame: &mut RgbImage,
        pos: (i32, i32),
        detail: &str,
        category: AbilityCategory,
    ) {
        if detail.starts_with("astra_ult") {
            draw_hollow_rect_thick(frame, centered_square(pos, FOCAL_RADIUS_PX), COLOR_FOCAL, 3);
        } else {
            for r in 0..3 {
                draw_hollow_circle_mut(frame, pos, FOCAL_RADIUS_PX - r, COLOR_FOCAL);
            }
        }
        self.text(
            frame,
            COLOR_FOCAL,
            pos.0 - 40,
            pos.1 - 70,
            26.0,
            category.caption(),
        );
        let detail_caption = detail.replace('_', " ").to_uppercase();
        self.text(frame, COLOR_TEXT, pos.0 - 40, pos.1 + 45, 16.0, &detail_caption);
    }

    /// Full-frame highlight border plus the uppercased event-type label.
    pub fn draw_event_frame(&self, frame: &mut RgbImage, event: &MatchEvent) {
        draw_hollow_rect_thick(
            frame,
            Rect::at(0, 0).of_size(self.width, self.height),
            COLOR_BORDER,
            BORDER_PX as u32,
        );
        self.text(frame, COLOR_TEXT, 20, 30, 40.0, event.display_label());
    }
}

/// Fixed timeline bar: event ranges painted once up front, a cursor line
/// stamped per output frame. Focal ranges are painted first so kill and
/// plant ranges win where they overlap.
pub struct TimelineBar {
    image: RgbImage,
    total_frames: u64,
}

impl TimelineBar {
    pub fn new(events: &[MatchEvent], fps: f64, width: u32, total_frames: u64) -> Self {
        let mut image = RgbImage::from_pixel(width, TL_HEIGHT, TL_BG);
        let to_x = |frame: u64| (frame as f64 / total_frames as f64 * width as f64) as i64;

        let mut paint = |event: &MatchEvent, color: Rgb<u8>| {
            let (start, end) = crate::speed::event_window(event, fps, total_frames);
            let (x0, x1) = (to_x(start), to_x(end));
            if x1 > x0 {
                draw_filled_rect_mut(
                    &mut image,
                    Rect::at(x0 as i32, 0).of_size((x1 - x0) as u32, TL_HEIGHT),
                    color,
                );
            }
        };

        for event in events.iter().filter(|e| e.class() == EventClass::FocalPoint) {
            paint(event, TL_FOCAL);
        }
        for event in events.iter().filter(|e| e.class() != EventClass::FocalPoint) {
            paint(event, TL_EVENT);
        }

        Self {
            image,
            total_frames,
        }
    }

    /// Stamp the bar and the input-position cursor onto an output frame.
    pub fn stamp(&self, frame: &mut RgbImage, input_pos: f64) {
        let width = frame.width();
        let height = frame.height();
        if height < TL_HEIGHT + TL_BOTTOM_MARGIN {
            return;
        }
        let y0 = height - TL_HEIGHT - TL_BOTTOM_MARGIN;
        for y in 0..TL_HEIGHT {
            for x in 0..width.min(self.image.width()) {
                frame.put_pixel(x, y0 + y, *self.image.get_pixel(x, y));
            }
        }

        let cursor_x =
            ((input_pos / self.total_frames as f64) * width as f64) as i32;
        let x0 = (cursor_x - 1).max(0);
        let w = (cursor_x + 2).min(width as i32) - x0;
        if w > 0 {
            draw_filled_rect_mut(
                frame,
                Rect::at(x0, y0 as i32 - 5).of_size(w as u32, TL_HEIGHT + 10),
                TL_CURSOR,
            );
        }
    }
}
