//! Virtual camera: exponential smoothing toward the active event anchor.
//!
//! The camera has exactly two framing intents: wide (zoom 1.0, frame
//! center) when nothing is happening, and a fixed magnified zoom on the
//! event anchor. Smoothing runs in output time, so cuts between intents
//! become glides regardless of how fast the input cursor is moving.

use image::imageops::{self, FilterType};
use image::RgbImage;
use matchlight_match_model::Point;

/// Crop window in input-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl CropRect {
    /// Map an input-frame point into the resized output frame.
    pub fn project(&self, p: Point, out_width: u32, out_height: u32) -> (i32, i32) {
        let zx = (p.x - self.x) * out_width as f64 / self.w;
        let zy = (p.y - self.y) * out_height as f64 / self.h;
        (zx as i32, zy as i32)
    }
}

/// Clamp a centered crop of `w x h` inside the frame.
fn clamped_crop(center: Point, crop_w: f64, crop_h: f64, width: u32, height: u32) -> CropRect {
    let x = (center.x - crop_w / 2.0).clamp(0.0, (width as f64 - crop_w).max(0.0));
    let y = (center.y - crop_h / 2.0).clamp(0.0, (height as f64 - crop_h).max(0.0));
    CropRect {
        x,
        y,
        w: crop_w,
        h: crop_h,
    }
}

pub struct CameraController {
    width: u32,
    height: u32,
    smoothing: f64,
    /// Zoom applied when framing an event anchor.
    event_zoom: f64,

    center: Point,
    zoom: f64,
}

impl CameraController {
    /// `zoom_radius_px` is the half-size of the window the event zoom
    /// should fill, so the magnification is `width / (2 * radius)`. A
    /// radius wider than the frame would zoom out; clamp it to wide.
    pub fn new(width: u32, height: u32, smoothing: f64, zoom_radius_px: f64) -> Self {
        Self {
            width,
            height,
            smoothing,
            event_zoom: (width as f64 / (zoom_radius_px * 2.0)).max(1.0),
            center: Point::new(width as f64 / 2.0, height as f64 / 2.0),
            zoom: 1.0,
        }
    }

    /// Advance one output frame toward the target intent.
    pub fn step(&mut self, target: Option<Point>) {
        let (target_center, target_zoom) = match target {
            Some(anchor) => (anchor, self.event_zoom),
            None => (
                Point::new(self.width as f64 / 2.0, self.height as f64 / 2.0),
                1.0,
            ),
        };
        let a = self.smoothing;
        self.zoom = self.zoom * (1.0 - a) + target_zoom * a;
        self.center.x = self.center.x * (1.0 - a) + target_center.x * a;
        self.center.y = self.center.y * (1.0 - a) + target_center.y * a;
    }

    /// Current crop window, clamped to frame bounds.
    pub fn crop(&self) -> CropRect {
        clamped_crop(
            self.center,
            self.width as f64 / self.zoom,
            self.height as f64 / self.zoom,
            self.width,
            self.height,
        )
    }

    /// Crop and resize back to full resolution. A degenerate crop (rounds
    /// to zero pixels) falls back to the unzoomed frame.
    pub fn apply(&self, frame: &RgbImage) -> (RgbImage, CropRect) {
        let crop = self.crop();
        let (w, h) = (crop.w as u32, crop.h as u32);
        if w == 0 || h == 0 {
            let full = CropRect {
                x: 0.0,
                y: 0.0,
                w: self.width as f64,
                h: self.height as f64,
            };
            return (frame.clone(), full);
        }
        let cropped = imageops::crop_imm(frame, crop.x as u32, crop.y as u32, w, h).to_image();
        let resized = imageops::resize(&cropped, self.width, self.height, FilterType::Triangle);
        (resized, crop)
    }
}
