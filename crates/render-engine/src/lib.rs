//! Frame scanning and adaptive highlight rendering.
//!
//! Two passes over a recorded match:
//!
//! 1. **Scan** ([`scan::ExtractionPass`]): crop the layout regions out of
//!    every frame, classify them, feed the extractor, and export the
//!    trail-annotated and clean minimap base videos.
//! 2. **Highlight** ([`highlight::HighlightRenderer`]): re-time the base
//!    video onto a fixed duration with a speed plan, glide a virtual
//!    camera onto the active event, and draw the annotations.
//!
//! Frame I/O and the detection model sit behind traits
//! ([`frame::FrameSource`], [`frame::FrameSink`],
//! [`classify::FrameClassifier`]) so both passes run unchanged against
//! files, pipes, or in-memory fixtures.

pub mod camera;
pub mod classify;
pub mod frame;
pub mod highlight;
pub mod overlay;
pub mod scan;
pub mod speed;
pub mod trail;

pub use camera::CameraController;
pub use classify::{FrameClassifier, PrecomputedDetections};
pub use frame::{
    FrameSink, FrameSource, MemoryFrameSink, MemoryFrameSource, PngSequenceSink,
    PngSequenceSource, RawVideoSink, RawVideoSource, VideoMeta,
};
pub use highlight::{HighlightRenderer, RenderSummary};
pub use overlay::{OverlayCompositor, TimelineBar};
pub use scan::ExtractionPass;
pub use speed::{FrameCursor, SpeedPlan};
pub use trail::TrailCanvas;
