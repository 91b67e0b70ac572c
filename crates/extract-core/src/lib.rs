//! Matchlight Extract Core — Event Extraction & Stabilization
//!
//! Turns raw, confidence-scored per-frame detections into a trustworthy
//! event timeline:
//! - **Ingest gating:** per-label confidence thresholds and size floors
//! - **Smoke classification:** resolve ambiguous area-denial detections
//! - **Kill stabilization:** temporal clustering, majority vote, dedup
//! - **Spike confirmation:** one-shot UI + map-marker state machine
//! - **Sequencing:** first-blood / multi-kill / last-kill tagging
//! - **Focal attribution:** causally link ability casts to later events
//!
//! This crate is pure computation — no I/O, no frame decoding. All inputs
//! are data; all outputs are data. The frame loop that feeds it lives in
//! the render-engine crate.

pub mod extractor;
pub mod focal;
pub mod ingest;
pub mod kill_feed;
pub mod sequence;
pub mod smoke;
pub mod spike;
pub mod stabilize;

pub use extractor::{FrameObservation, MatchExtractor};
pub use ingest::{GatePolicy, RawDetection};
