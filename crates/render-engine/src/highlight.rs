//! The highlight pass: re-time the base video onto a fixed duration and
//! annotate the active event.
//!
//! The pass reads two synchronized minimap videos — the trail-annotated
//! one for travel parts, the clean one for zoomed event shots — and walks
//! them with a fractional cursor driven by the speed plan. Both sources
//! are forward-only; the cursor never moves backward, so "seeking" is
//! just reading ahead.

use std::collections::HashMap;

use image::RgbImage;
use matchlight_common::config::RenderDefaults;
use matchlight_common::error::{MatchlightError, MatchlightResult};
use matchlight_match_model::{KillEvent, MatchEvent, MatchRecord, Point, Trail};

use crate::camera::CameraController;
use crate::frame::{FrameSink, FrameSource};
use crate::overlay::{OverlayCompositor, TimelineBar};
use crate::speed::{active_event, FrameCursor, SpeedPlan};

/// Default backward search when a label is missing from the exact frame.
const KILLER_LOOKBACK_FRAMES: u64 = 30;
/// Wider search for the victim while the kill is still upcoming.
const VICTIM_PRE_LOOKBACK_FRAMES: u64 = 60;

/// Per-frame position lookup over the persisted trail.
struct TrailIndex<'a> {
    by_frame: HashMap<u64, Vec<(&'a str, Point)>>,
}

impl<'a> TrailIndex<'a> {
    fn new(trail: &'a Trail) -> Self {
        let mut by_frame: HashMap<u64, Vec<(&str, Point)>> = HashMap::new();
        for detection in trail.iter() {
            by_frame
                .entry(detection.frame)
                .or_default()
                .push((detection.label.as_str(), detection.pos));
        }
        Self { by_frame }
    }

    fn at(&self, frame: u64, label: &str) -> Option<Point> {
        self.by_frame
            .get(&frame)?
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, p)| *p)
    }

    fn last_known(&self, frame: u64, label: &str, lookback: u64) -> Option<Point> {
        (0..lookback)
            .map_while(|i| frame.checked_sub(i))
            .find_map(|f| self.at(f, label))
    }
}

/// Forward-only frame reader with a one-frame cache, so the same index
/// can be served repeatedly when the cursor moves by less than a frame.
struct SteppedReader<'a> {
    source: &'a mut dyn FrameSource,
    current: Option<RgbImage>,
    index: Option<u64>,
}

impl<'a> SteppedReader<'a> {
    fn new(source: &'a mut dyn FrameSource) -> Self {
        Self {
            source,
            current: None,
            index: None,
        }
    }

    fn frame_at(&mut self, idx: u64) -> MatchlightResult<Option<&RgbImage>> {
        while self.index.is_none() || self.index.is_some_and(|i| i < idx) {
            match self.source.read_frame()? {
                Some(frame) => {
                    self.current = Some(frame);
                    self.index = Some(self.index.map_or(0, |i| i + 1));
                }
                None => return Ok(None),
            }
        }
        Ok(self.current.as_ref())
    }
}

/// Killer/victim positions resolved for the current output frame.
struct KillAnchors {
    killer: Option<Point>,
    victim: Option<Point>,
    target: Option<Point>,
}

/// The killer tracks live through the shot; the victim freezes at the
/// kill frame once the cursor passes it, so the marker stays on the spot
/// where they died.
fn resolve_kill_anchors(
    event: &MatchEvent,
    kill: &KillEvent,
    idx: u64,
    index: &TrailIndex<'_>,
) -> KillAnchors {
    let killer = index
        .at(idx, &kill.killer)
        .or_else(|| index.last_known(idx, &kill.killer, KILLER_LOOKBACK_FRAMES))
        .or(kill.k_pos);

    let victim = if idx >= kill.frame {
        index
            .at(kill.frame, &kill.victim)
            .or_else(|| index.last_known(kill.frame, &kill.victim, KILLER_LOOKBACK_FRAMES))
    } else {
        index
            .at(idx, &kill.victim)
            .or_else(|| index.last_known(idx, &kill.victim, VICTIM_PRE_LOOKBACK_FRAMES))
    }
    .or(kill.v_pos);

    // A kill streak follows the killer; a death shot frames the victim.
    let preferred = match event {
        MatchEvent::FirstBlood(_) | MatchEvent::MultiKill(_) => killer,
        _ => victim,
    };
    KillAnchors {
        killer,
        victim,
        target: preferred.or(killer).or(victim),
    }
}

/// Outcome counters for one render run.
#[derive(Debug, Clone, Copy)]
pub struct RenderSummary {
    pub output_frames: u64,
    pub multiplier: f64,
    pub over_budget: bool,
}

pub struct HighlightRenderer {
    defaults: RenderDefaults,
}

impl HighlightRenderer {
    pub fn new(defaults: RenderDefaults) -> Self {
        Self { defaults }
    }

    /// Render the fixed-duration highlight. `clean` carries the
    /// trail-free copy of the base video; when it is missing the
    /// annotated source doubles for event shots, degraded but usable.
    pub fn render(
        &self,
        record: &MatchRecord,
        annotated: &mut dyn FrameSource,
        clean: Option<&mut dyn FrameSource>,
        sink: &mut dyn FrameSink,
    ) -> MatchlightResult<RenderSummary> {
        let meta = annotated.meta();
        let total = meta.total_frames;

        let mut clean_reader = match clean {
            Some(source) => {
                let clean_meta = source.meta();
                if (clean_meta.width, clean_meta.height) != (meta.width, meta.height) {
                    return Err(MatchlightError::render(format!(
                        "clean video is {}x{} but the annotated video is {}x{}",
                        clean_meta.width, clean_meta.height, meta.width, meta.height
                    )));
                }
                Some(SteppedReader::new(source))
            }
            None => {
                tracing::warn!("clean base video missing; event shots will show the trail overlay");
                None
            }
        };

        let plan = SpeedPlan::compute(&record.events, record.fps, total, self.defaults.target_secs);
        let timeline = TimelineBar::new(&record.events, record.fps, meta.width, total);
        let overlay =
            OverlayCompositor::new(meta.width, meta.height, self.defaults.font_path.as_deref())?;
        let mut camera = CameraController::new(
            meta.width,
            meta.height,
            self.defaults.camera_smoothing,
            self.defaults.zoom_radius_px,
        );
        let index = TrailIndex::new(&record.trails);

        let mut annotated_reader = SteppedReader::new(annotated);
        let mut cursor = FrameCursor::new();
        let mut output_frames: u64 = 0;

        while !cursor.is_done(total) {
            let idx = cursor.index();

            let annotated_frame = match annotated_reader.frame_at(idx) {
                Ok(Some(frame)) => frame.clone(),
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(frame = idx, error = %e, "frame read failed; ending render early");
                    break;
                }
            };

            let active = active_event(&record.events, idx, record.fps, total);

            let base = if active.is_some() {
                let clean = match clean_reader.as_mut() {
                    Some(reader) => reader.frame_at(idx).map(|f| f.cloned()),
                    None => Ok(None),
                };
                match clean {
                    Ok(Some(frame)) => frame,
                    Ok(None) => annotated_frame,
                    Err(e) => {
                        tracing::warn!(
                            frame = idx,
                            error = %e,
                            "clean frame read failed; event shots keep the trail overlay"
                        );
                        clean_reader = None;
                        annotated_frame
                    }
                }
            } else {
                annotated_frame
            };

            // Resolve the framing target and the marker positions in one
            // place so camera and overlay agree.
            let mut kill_anchors: Option<KillAnchors> = None;
            let target: Option<Point> = match active {
                Some(event @ (MatchEvent::FirstBlood(k) | MatchEvent::MultiKill(k)
                | MatchEvent::LastKill(k))) => {
                    let anchors = resolve_kill_anchors(event, k, idx, &index);
                    let target = anchors.target;
                    kill_anchors = Some(anchors);
                    target
                }
                Some(MatchEvent::SpikePlant(p)) => Some(p.pos),
                Some(MatchEvent::FocalPoint(f)) => Some(f.pos),
                None => None,
            };

            camera.step(target);
            let (mut out, crop) = camera.apply(&base);

            if let (Some(event), Some(_)) = (active, target) {
                let project = |p: Point| crop.project(p, meta.width, meta.height);
                match event {
                    MatchEvent::FirstBlood(_) | MatchEvent::MultiKill(_)
                    | MatchEvent::LastKill(_) => {
                        if let Some(anchors) = &kill_anchors {
                            overlay.draw_kill_markers(
                                &mut out,
                                anchors.killer.map(project),
                                anchors.victim.map(project),
                            );
                        }
                    }
                    MatchEvent::SpikePlant(p) => {
                        overlay.draw_plant_marker(&mut out, project(p.pos));
                    }
                    MatchEvent::FocalPoint(f) => {
                        overlay.draw_focal_marker(&mut out, project(f.pos), &f.detail, f.category);
                    }
                }
                overlay.draw_event_frame(&mut out, event);
            }

            timeline.stamp(&mut out, cursor.position());

            if let Err(e) = sink.write_frame(&out) {
                tracing::warn!(frame = idx, error = %e, "frame write failed; ending render early");
                break;
            }
            output_frames += 1;
            cursor.advance(plan.step_at(idx));
        }

        sink.finish()?;
        tracing::info!(
            output_frames,
            output_secs = output_frames as f64 / meta.fps,
            multiplier = plan.multiplier,
            "highlight render complete"
        );
        Ok(RenderSummary {
            output_frames,
            multiplier: plan.multiplier,
            over_budget: plan.over_budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{MemoryFrameSink, MemoryFrameSource, VideoMeta};
    use image::Rgb;
    use matchlight_match_model::Detection;

    fn sources(total: u64) -> (MemoryFrameSource, MemoryFrameSource) {
        let annotated = RgbImage::from_pixel(64, 48, Rgb([40, 40, 40]));
        let clean = RgbImage::from_pixel(64, 48, Rgb([10, 10, 10]));
        (
            MemoryFrameSource::new(vec![annotated; total as usize], 10.0).unwrap(),
            MemoryFrameSource::new(vec![clean; total as usize], 10.0).unwrap(),
        )
    }

    fn kill_record(total: u64, kill_frame: u64) -> MatchRecord {
        let mut trail = Trail::new();
        for frame in 0..total {
            trail.push(Detection::new(frame, "jett_e", Point::new(20.0, 20.0), 0.9));
            trail.push(Detection::new(frame, "sage_f", Point::new(40.0, 30.0), 0.9));
        }
        MatchRecord::new(
            vec![MatchEvent::FirstBlood(KillEvent {
                frame: kill_frame,
                killer: "jett_e".to_string(),
                victim: "sage_f".to_string(),
                k_pos: Some(Point::new(20.0, 20.0)),
                v_pos: Some(Point::new(40.0, 30.0)),
            })],
            trail,
            10.0,
        )
    }

    fn defaults(target_secs: f64) -> RenderDefaults {
        RenderDefaults {
            target_secs,
            zoom_radius_px: 16.0,
            ..RenderDefaults::default()
        }
    }

    fn sink() -> MemoryFrameSink {
        MemoryFrameSink::new(VideoMeta {
            width: 64,
            height: 48,
            fps: 10.0,
            total_frames: 0,
        })
    }

    #[test]
    fn test_render_hits_target_duration() {
        // 300 input frames at 10 fps, kill at 150, 18 s target: 60 event
        // frames play at real time, 240 travel frames at exactly 2x, so
        // the output is exactly 180 frames.
        let (mut annotated, mut clean) = sources(300);
        let record = kill_record(300, 150);
        let mut out = sink();

        let summary = HighlightRenderer::new(defaults(18.0))
            .render(&record, &mut annotated, Some(&mut clean), &mut out)
            .unwrap();

        assert_eq!(summary.output_frames, 180);
        assert_eq!(out.frames.len(), 180);
        assert!(!summary.over_budget);
        assert!((summary.multiplier - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_event_frames_use_clean_source() {
        let (mut annotated, mut clean) = sources(300);
        let record = kill_record(300, 150);
        let mut out = sink();

        HighlightRenderer::new(defaults(18.0))
            .render(&record, &mut annotated, Some(&mut clean), &mut out)
            .unwrap();

        // First output frame is travel: annotated gray, untouched by the
        // camera (zoom still 1).
        assert_eq!(out.frames[0].get_pixel(32, 2)[0], 40);
        // The kill window (input 120..180) starts at output frame 60:
        // clean dark base from there.
        let event_frame = &out.frames[60];
        assert!(event_frame.get_pixel(32, 24)[0] < 40);
    }

    /// Serves solid frames until `fail_after`, then errors on every read.
    struct FlakySource {
        meta: VideoMeta,
        frame: RgbImage,
        served: u64,
        fail_after: u64,
    }

    impl crate::frame::FrameSource for FlakySource {
        fn meta(&self) -> VideoMeta {
            self.meta
        }

        fn read_frame(&mut self) -> matchlight_common::error::MatchlightResult<Option<RgbImage>> {
            if self.served >= self.fail_after {
                return Err(MatchlightError::render("simulated read failure"));
            }
            self.served += 1;
            Ok(Some(self.frame.clone()))
        }
    }

    #[test]
    fn test_clean_read_failure_degrades_without_aborting() {
        let (mut annotated, _) = sources(300);
        // The clean source dies before the event window is ever reached.
        let mut clean = FlakySource {
            meta: VideoMeta {
                width: 64,
                height: 48,
                fps: 10.0,
                total_frames: 300,
            },
            frame: RgbImage::from_pixel(64, 48, Rgb([10, 10, 10])),
            served: 0,
            fail_after: 100,
        };
        let record = kill_record(300, 150);
        let mut out = sink();

        let summary = HighlightRenderer::new(defaults(18.0))
            .render(&record, &mut annotated, Some(&mut clean), &mut out)
            .unwrap();

        // The render still hits the target, and event shots fall back to
        // the annotated (lighter) base instead of aborting.
        assert_eq!(summary.output_frames, 180);
        assert_eq!(out.frames[60].get_pixel(32, 24)[0], 40);
    }

    #[test]
    fn test_missing_clean_source_degrades() {
        let (mut annotated, _) = sources(300);
        let record = kill_record(300, 150);
        let mut out = sink();

        let summary = HighlightRenderer::new(defaults(18.0))
            .render(&record, &mut annotated, None, &mut out)
            .unwrap();
        assert_eq!(summary.output_frames, 180);
    }

    #[test]
    fn test_mismatched_clean_size_is_fatal() {
        let (mut annotated, _) = sources(10);
        let wrong = RgbImage::new(32, 32);
        let mut clean = MemoryFrameSource::new(vec![wrong; 10], 10.0).unwrap();
        let record = kill_record(10, 5);
        let mut out = sink();

        let err = HighlightRenderer::new(defaults(15.0))
            .render(&record, &mut annotated, Some(&mut clean), &mut out)
            .unwrap_err();
        assert!(matches!(err, MatchlightError::Render { .. }));
    }

    #[test]
    fn test_empty_record_fast_forwards_everything() {
        let (mut annotated, mut clean) = sources(200);
        let record = MatchRecord::new(Vec::new(), Trail::new(), 10.0);
        let mut out = sink();

        let summary = HighlightRenderer::new(defaults(10.0))
            .render(&record, &mut annotated, Some(&mut clean), &mut out)
            .unwrap();
        // 200 travel frames into 100 output frames at 2x.
        assert_eq!(summary.output_frames, 100);
        assert!((summary.multiplier - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_victim_anchor_freezes_after_kill_frame() {
        let mut trail = Trail::new();
        // Victim at (40, 30) up to the kill frame, then "moves" (a ghost
        // re-detection) afterwards.
        for frame in 0..100u64 {
            let pos = if frame <= 50 {
                Point::new(40.0, 30.0)
            } else {
                Point::new(5.0, 5.0)
            };
            trail.push(Detection::new(frame, "sage_f", pos, 0.9));
        }
        let index = TrailIndex::new(&trail);
        let kill = KillEvent {
            frame: 50,
            killer: "jett_e".to_string(),
            victim: "sage_f".to_string(),
            k_pos: None,
            v_pos: None,
        };
        let event = MatchEvent::LastKill(kill.clone());

        // Before the kill: live position.
        let before = resolve_kill_anchors(&event, &kill, 40, &index);
        assert_eq!(before.victim, Some(Point::new(40.0, 30.0)));
        // After the kill: still the kill-frame position, not the ghost.
        let after = resolve_kill_anchors(&event, &kill, 80, &index);
        assert_eq!(after.victim, Some(Point::new(40.0, 30.0)));
        // LastKill frames the victim.
        assert_eq!(after.target, after.victim);
    }

    #[test]
    fn test_kill_anchors_fall_back_to_persisted_positions() {
        let trail = Trail::new();
        let index = TrailIndex::new(&trail);
        let kill = KillEvent {
            frame: 50,
            killer: "jett_e".to_string(),
            victim: "sage_f".to_string(),
            k_pos: Some(Point::new(1.0, 2.0)),
            v_pos: Some(Point::new(3.0, 4.0)),
        };
        let event = MatchEvent::FirstBlood(kill.clone());
        let anchors = resolve_kill_anchors(&event, &kill, 50, &index);
        assert_eq!(anchors.killer, Some(Point::new(1.0, 2.0)));
        assert_eq!(anchors.victim, Some(Point::new(3.0, 4.0)));
        // FirstBlood frames the killer.
        assert_eq!(anchors.target, anchors.killer);
    }
}
