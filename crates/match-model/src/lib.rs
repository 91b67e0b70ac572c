//! Matchlight Match Model
//!
//! Defines the core data contracts shared between the extraction and render
//! passes:
//! - **Detections:** labeled, positioned, confidence-scored observations
//!   from the frame classifier, plus the ordered trail they accumulate into
//! - **Events:** the semantic match timeline (eliminations, spike plant,
//!   tactical contributions)
//! - **Match record:** the serialized handoff between the two passes
//!
//! Positions are region-local pixel coordinates; frame indices count from
//! zero at the start of the source video.

pub mod ability;
pub mod detection;
pub mod event;
pub mod geometry;
pub mod layout;
pub mod record;

pub use ability::*;
pub use detection::*;
pub use event::*;
pub use geometry::*;
pub use layout::*;
pub use record::*;
