//! Adaptive playback-speed planning.
//!
//! Every event projects a pre/post window onto the input timeline; the
//! union of those windows plays at real time and everything else is
//! fast-forwarded by a single multiplier chosen so the output lands on the
//! target duration.

use matchlight_match_model::{EventClass, MatchEvent};

/// Real-time window, in seconds, around each event class (pre, post).
const KILL_WINDOW_SECS: (f64, f64) = (3.0, 3.0);
const SPIKE_WINDOW_SECS: (f64, f64) = (3.0, 2.0);
const FOCAL_WINDOW_SECS: (f64, f64) = (5.0, 3.0);

/// Multiplier used when the event windows alone exceed the budget; the
/// travel parts are effectively skipped.
const OVER_BUDGET_MULTIPLIER: f64 = 100.0;

/// Frame window `[start, end)` an event projects onto the input timeline,
/// clamped to `[0, total_frames)`.
pub fn event_window(event: &MatchEvent, fps: f64, total_frames: u64) -> (u64, u64) {
    let (pre_secs, post_secs) = match event.class() {
        EventClass::Kill => KILL_WINDOW_SECS,
        EventClass::SpikePlant => SPIKE_WINDOW_SECS,
        EventClass::FocalPoint => FOCAL_WINDOW_SECS,
    };
    let pre = (fps * pre_secs) as u64;
    let post = (fps * post_secs) as u64;
    let start = event.frame().saturating_sub(pre);
    let end = (event.frame() + post).min(total_frames);
    (start.min(total_frames), end)
}

/// The event whose window covers `frame`, highest priority winning.
/// Same-priority overlaps keep the earliest event in record order.
pub fn active_event<'a>(events: &'a [MatchEvent], frame: u64, fps: f64, total_frames: u64) -> Option<&'a MatchEvent> {
    let mut best: Option<&MatchEvent> = None;
    for event in events {
        let (start, end) = event_window(event, fps, total_frames);
        if frame < start || frame > end {
            continue;
        }
        let beats = match best {
            Some(current) => event.class().priority() > current.class().priority(),
            None => true,
        };
        if beats {
            best = Some(event);
        }
    }
    best
}

/// Precomputed per-frame playback plan for the highlight pass.
#[derive(Debug, Clone)]
pub struct SpeedPlan {
    mask: Vec<bool>,
    /// Step applied outside event windows.
    pub multiplier: f64,
    /// Event windows alone exceed the target duration.
    pub over_budget: bool,
}

impl SpeedPlan {
    pub fn compute(events: &[MatchEvent], fps: f64, total_frames: u64, target_secs: f64) -> Self {
        let mut mask = vec![false; total_frames as usize];
        for event in events {
            let (start, end) = event_window(event, fps, total_frames);
            for flag in &mut mask[start as usize..end as usize] {
                *flag = true;
            }
        }

        let event_frames = mask.iter().filter(|f| **f).count() as u64;
        let normal_frames = total_frames - event_frames;
        let target_frames = (target_secs * fps) as u64;

        let (multiplier, over_budget) = if target_frames <= event_frames {
            tracing::warn!(
                event_secs = event_frames as f64 / fps,
                target_secs,
                "event windows alone exceed the target duration; travel parts will be skipped"
            );
            (OVER_BUDGET_MULTIPLIER, true)
        } else {
            let m = normal_frames as f64 / (target_frames - event_frames) as f64;
            tracing::info!(
                event_secs = event_frames as f64 / fps,
                multiplier = m,
                "playback speed plan computed"
            );
            (m, false)
        };

        Self {
            mask,
            multiplier,
            over_budget,
        }
    }

    pub fn in_event(&self, frame: u64) -> bool {
        self.mask.get(frame as usize).copied().unwrap_or(false)
    }

    /// Cursor step at an input frame: real time inside event windows, the
    /// computed multiplier outside.
    pub fn step_at(&self, frame: u64) -> f64 {
        if self.in_event(frame) {
            1.0
        } else {
            self.multiplier
        }
    }

    pub fn event_frames(&self) -> u64 {
        self.mask.iter().filter(|f| **f).count() as u64
    }
}

/// Fractional input-frame cursor.
///
/// The accumulated position advances by fractional steps; the frame
/// actually read is the floor of the position, so sub-frame progress
/// carries over instead of being rounded away.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCursor {
    pos: f64,
}

impl FrameCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input frame index to read at the current position.
    pub fn index(&self) -> u64 {
        self.pos as u64
    }

    pub fn position(&self) -> f64 {
        self.pos
    }

    pub fn advance(&mut self, step: f64) {
        self.pos += step;
    }

    pub fn is_done(&self, total_frames: u64) -> bool {
        self.pos >= total_frames as f64
    }
}
