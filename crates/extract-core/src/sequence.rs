//! Event sequencing: tag confirmed kills as first-blood, multi-kill, or
//! last-kill.
//!
//! Only the distinguished tags are materialized into the persisted event
//! list; plain kills are evidence but not surfaced. A single-kill run
//! yields one `first_blood` and no `last_kill` — the first-index check
//! takes precedence when both conditions land on the same kill.

use std::collections::HashMap;

use matchlight_match_model::{ConfirmedKill, KillEvent, MatchEvent, Trail};

/// Per-killer cooldown (seconds) under which an interior kill counts as a
/// multi-kill.
const MULTI_KILL_SECS: f64 = 3.0;

/// Backward trail search window (frames) for actor positions.
const POSITION_LOOKBACK_FRAMES: u64 = 90;

/// Tag confirmed kills and materialize the distinguished ones, enriched
/// with best-effort actor positions from the trail.
///
/// `kills` must be sorted by frame (the stabilizer emits them that way).
pub fn sequence_kills(kills: &[ConfirmedKill], trail: &Trail, fps: f64) -> Vec<MatchEvent> {
    let mut events = Vec::new();
    if kills.is_empty() {
        return events;
    }

    let cooldown_frames = (fps * MULTI_KILL_SECS) as u64;
    let mut last_kill_frame_by_killer: HashMap<&str, u64> = HashMap::new();

    for (i, kill) in kills.iter().enumerate() {
        let tag = if i == 0 {
            Some(KillTag::FirstBlood)
        } else if i == kills.len() - 1 {
            Some(KillTag::LastKill)
        } else {
            match last_kill_frame_by_killer.get(kill.killer.as_str()) {
                Some(prev) if kill.frame - prev < cooldown_frames => Some(KillTag::MultiKill),
                _ => None, // plain kill: evidence only
            }
        };

        last_kill_frame_by_killer.insert(&kill.killer, kill.frame);

        if let Some(tag) = tag {
            let event = KillEvent {
                frame: kill.frame,
                killer: kill.killer.clone(),
                victim: kill.victim.clone(),
                k_pos: trail.position_near(kill.frame, &kill.killer, POSITION_LOOKBACK_FRAMES),
                v_pos: trail.position_near(kill.frame, &kill.victim, POSITION_LOOKBACK_FRAMES),
            };
            events.push(match tag {
                KillTag::FirstBlood => MatchEvent::FirstBlood(event),
                KillTag::MultiKill => MatchEvent::MultiKill(event),
                KillTag::LastKill => MatchEvent::LastKill(event),
            });
        }
    }

    events
}

#[derive(Debug, Clone, Copy)]
enum KillTag {
    FirstBlood,
    MultiKill,
    LastKill,
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchlight_match_model::{Detection, Point};

    fn kill(frame: u64, killer: &str, victim: &str) -> ConfirmedKill {
        ConfirmedKill {
            frame,
            killer: killer.to_string(),
            victim: victim.to_string(),
        }
    }

    #[test]
    fn test_first_and_last_tags() {
        let kills = vec![
            kill(100, "jett_e", "sage_f"),
            kill(1000, "omen_f", "neon_e"),
            kill(2000, "raze_e", "omen_f"),
        ];
        let events = sequence_kills(&kills, &Trail::new(), 60.0);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], MatchEvent::FirstBlood(_)));
        assert!(matches!(events[1], MatchEvent::LastKill(_)));
    }

    #[test]
    fn test_interior_multi_kill_within_cooldown() {
        let kills = vec![
            kill(100, "jett_e", "sage_f"),
            kill(200, "jett_e", "omen_f"), // 100 frames later, < 3s at 60fps
            kill(2000, "raze_e", "neon_e"),
        ];
        let events = sequence_kills(&kills, &Trail::new(), 60.0);
        assert_eq!(events.len(), 3);
        assert!(matches!(events[1], MatchEvent::MultiKill(_)));
    }

    #[test]
    fn test_interior_plain_kill_not_persisted() {
        let kills = vec![
            kill(100, "jett_e", "sage_f"),
            kill(1000, "omen_f", "neon_e"), // no recent kill by omen_f
            kill(2000, "raze_e", "omen_f"),
        ];
        let events = sequence_kills(&kills, &Trail::new(), 60.0);
        assert!(events.iter().all(|e| {
            let k = e.as_kill().unwrap();
            k.frame != 1000
        }));
    }

    #[test]
    fn test_single_kill_run_yields_first_blood_only() {
        let kills = vec![kill(100, "jett_e", "sage_f")];
        let events = sequence_kills(&kills, &Trail::new(), 60.0);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], MatchEvent::FirstBlood(_)));
    }

    #[test]
    fn test_positions_enriched_from_trail() {
        let mut trail = Trail::new();
        trail.push(Detection::new(95, "jett_e", Point::new(40.0, 50.0), 0.9));
        trail.push(Detection::new(90, "sage_f", Point::new(60.0, 70.0), 0.9));

        let events = sequence_kills(&[kill(100, "jett_e", "sage_f")], &trail, 60.0);
        let k = events[0].as_kill().unwrap();
        assert_eq!(k.k_pos, Some(Point::new(40.0, 50.0)));
        assert_eq!(k.v_pos, Some(Point::new(60.0, 70.0)));
    }

    #[test]
    fn test_stale_trail_positions_omitted() {
        let mut trail = Trail::new();
        // 200 frames stale: outside the 90-frame lookback.
        trail.push(Detection::new(0, "jett_e", Point::new(40.0, 50.0), 0.9));

        let events = sequence_kills(&[kill(200, "jett_e", "sage_f")], &trail, 60.0);
        let k = events[0].as_kill().unwrap();
        assert!(k.k_pos.is_none());
        assert!(k.v_pos.is_none());
    }

    #[test]
    fn test_empty_input() {
        assert!(sequence_kills(&[], &Trail::new(), 60.0).is_empty());
    }
}
