//! The extraction pass: one sequential sweep over the recording.
//!
//! Per frame, the three layout regions are cropped and classified (the
//! kill feed and plant UI only on sampled frames), the observations are
//! fed to the extractor, and the minimap crop is exported twice: once
//! with the accumulated trail overlay, once clean for the zoomed event
//! shots. A frame read failure ends the pass early; everything scanned so
//! far still produces a record and valid base videos.

use image::imageops;
use image::RgbImage;
use matchlight_common::config::ExtractionDefaults;
use matchlight_common::error::{MatchlightError, MatchlightResult};
use matchlight_extract_core::{FrameObservation, GatePolicy, MatchExtractor};
use matchlight_match_model::{AbilityCatalog, MatchRecord, PixelRect, Region, ScreenLayout};

use crate::classify::FrameClassifier;
use crate::frame::{FrameSink, FrameSource, VideoMeta};

fn crop_region(frame: &RgbImage, rect: PixelRect) -> RgbImage {
    imageops::crop_imm(frame, rect.x, rect.y, rect.w, rect.h).to_image()
}

/// Scan driver configuration and entry point.
pub struct ExtractionPass {
    layout: ScreenLayout,
    defaults: ExtractionDefaults,
}

impl ExtractionPass {
    pub fn new(layout: ScreenLayout, defaults: ExtractionDefaults) -> Self {
        Self { layout, defaults }
    }

    pub fn with_defaults() -> Self {
        Self::new(ScreenLayout::default(), ExtractionDefaults::default())
    }

    /// Metadata for the minimap-sized base videos this pass writes.
    pub fn base_video_meta(&self, source_meta: &VideoMeta) -> VideoMeta {
        VideoMeta {
            width: self.layout.minimap.w,
            height: self.layout.minimap.h,
            fps: source_meta.fps,
            total_frames: source_meta.total_frames,
        }
    }

    /// Run the pass, writing the trail-annotated and clean minimap videos
    /// and returning the extracted match record.
    pub fn run(
        &self,
        source: &mut dyn FrameSource,
        classifier: &mut dyn FrameClassifier,
        annotated: &mut dyn FrameSink,
        clean: &mut dyn FrameSink,
    ) -> MatchlightResult<MatchRecord> {
        let meta = source.meta();
        for region in [Region::Minimap, Region::KillFeed, Region::PlantUi] {
            if !self.layout.region(region).fits_within(meta.width, meta.height) {
                return Err(MatchlightError::extraction(format!(
                    "layout region {region:?} does not fit a {}x{} frame",
                    meta.width, meta.height
                )));
            }
        }

        let mut extractor = MatchExtractor::new(
            GatePolicy::from_defaults(&self.defaults),
            AbilityCatalog::default(),
        );
        let mut canvas =
            crate::trail::TrailCanvas::new(self.layout.minimap.w, self.layout.minimap.h);

        let mut frame_idx: u64 = 0;
        loop {
            let frame = match source.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(frame = frame_idx, error = %e, "frame read failed; ending scan early");
                    break;
                }
            };

            let minimap_crop = crop_region(&frame, self.layout.minimap);
            let minimap = classifier.detect(Region::Minimap, frame_idx, &minimap_crop)?;

            let sampled = frame_idx % self.defaults.sample_stride == 0;
            let kill_feed = if sampled {
                let crop = crop_region(&frame, self.layout.kill_feed);
                Some(classifier.detect(Region::KillFeed, frame_idx, &crop)?)
            } else {
                None
            };
            let plant_ui = if sampled {
                let crop = crop_region(&frame, self.layout.plant_ui);
                Some(classifier.detect(Region::PlantUi, frame_idx, &crop)?)
            } else {
                None
            };

            let admitted = extractor.observe_frame(
                frame_idx,
                FrameObservation {
                    minimap,
                    kill_feed,
                    plant_ui,
                },
            );

            canvas.trace(&admitted);
            if let Err(e) = annotated
                .write_frame(&canvas.composite(&minimap_crop, &admitted))
                .and_then(|()| clean.write_frame(&minimap_crop))
            {
                tracing::warn!(frame = frame_idx, error = %e, "frame write failed; ending scan early");
                break;
            }

            frame_idx += 1;
        }

        annotated.finish()?;
        clean.finish()?;

        tracing::info!(frames = frame_idx, "scan complete");
        Ok(extractor.finish(meta.fps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::PrecomputedDetections;
    use crate::frame::{MemoryFrameSink, MemoryFrameSource};
    use image::Rgb;
    use matchlight_extract_core::RawDetection;
    use matchlight_match_model::{MatchEvent, Point};

    fn small_layout() -> ScreenLayout {
        ScreenLayout {
            minimap: PixelRect::new(0, 0, 200, 200),
            kill_feed: PixelRect::new(200, 0, 100, 40),
            plant_ui: PixelRect::new(200, 40, 60, 40),
        }
    }

    fn source(frames: u64) -> MemoryFrameSource {
        let frame = RgbImage::from_pixel(320, 240, Rgb([8, 8, 8]));
        MemoryFrameSource::new(vec![frame; frames as usize], 60.0).unwrap()
    }

    fn feed_det(label: &str, x: f64) -> RawDetection {
        RawDetection::new(label, Point::new(x, 20.0), 12.0, 12.0, 0.8)
    }

    #[test]
    fn test_scan_produces_record_and_base_videos() {
        let pass = ExtractionPass::new(small_layout(), ExtractionDefaults::default());
        let mut src = source(120);
        let base_meta = pass.base_video_meta(&src.meta());

        let mut classifier = PrecomputedDetections::default();
        for frame in 0..120u64 {
            classifier.insert(
                frame,
                Region::Minimap,
                vec![RawDetection::new(
                    "jett_e",
                    Point::new(50.0 + frame as f64, 80.0),
                    10.0,
                    10.0,
                    0.9,
                )],
            );
        }
        // Kill feed on sampled frames only (stride 3).
        for frame in [99u64, 102, 105] {
            classifier.insert(
                frame,
                Region::KillFeed,
                vec![feed_det("jett_e", 5.0), feed_det("sage_f", 80.0)],
            );
        }

        let mut annotated = MemoryFrameSink::new(base_meta);
        let mut clean = MemoryFrameSink::new(base_meta);
        let record = pass
            .run(&mut src, &mut classifier, &mut annotated, &mut clean)
            .unwrap();

        assert_eq!(annotated.frames.len(), 120);
        assert_eq!(clean.frames.len(), 120);
        assert_eq!(record.events.len(), 1);
        assert!(matches!(record.events[0], MatchEvent::FirstBlood(_)));

        // The annotated export carries trail pixels the clean one lacks.
        assert_ne!(annotated.frames[119], clean.frames[119]);
        assert!(clean.frames[119].pixels().all(|p| *p == Rgb([8, 8, 8])));
    }

    #[test]
    fn test_unsampled_frames_skip_feed_regions() {
        let pass = ExtractionPass::new(small_layout(), ExtractionDefaults::default());
        let mut src = source(12);

        let mut classifier = PrecomputedDetections::default();
        // Feed evidence only on unsampled frames: never observed, so no
        // kill can come out of it.
        for frame in [1u64, 2, 4, 5, 7, 8] {
            classifier.insert(
                frame,
                Region::KillFeed,
                vec![feed_det("jett_e", 5.0), feed_det("sage_f", 80.0)],
            );
        }

        let base_meta = pass.base_video_meta(&src.meta());
        let mut annotated = MemoryFrameSink::new(base_meta);
        let mut clean = MemoryFrameSink::new(base_meta);
        let record = pass
            .run(&mut src, &mut classifier, &mut annotated, &mut clean)
            .unwrap();
        assert!(record.events.is_empty());
    }

    #[test]
    fn test_layout_must_fit_frame() {
        let pass = ExtractionPass::with_defaults(); // 1080p layout
        let mut src = source(1); // 320x240 frames
        let mut classifier = PrecomputedDetections::default();
        let base_meta = pass.base_video_meta(&src.meta());
        let mut annotated = MemoryFrameSink::new(base_meta);
        let mut clean = MemoryFrameSink::new(base_meta);
        assert!(pass
            .run(&mut src, &mut classifier, &mut annotated, &mut clean)
            .is_err());
    }

    #[test]
    fn test_empty_recording_degenerates_cleanly() {
        let pass = ExtractionPass::new(small_layout(), ExtractionDefaults::default());
        let mut src = source(3);
        let mut classifier = PrecomputedDetections::default();
        let base_meta = pass.base_video_meta(&src.meta());
        let mut annotated = MemoryFrameSink::new(base_meta);
        let mut clean = MemoryFrameSink::new(base_meta);
        let record = pass
            .run(&mut src, &mut classifier, &mut annotated, &mut clean)
            .unwrap();
        assert!(record.events.is_empty());
        assert!(record.trails.is_empty());
        assert_eq!(clean.frames.len(), 3);
    }
}
