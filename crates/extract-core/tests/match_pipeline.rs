//! Full-pipeline scenario: a synthetic round driven through the public
//! extractor façade, checked against the persisted event timeline it must
//! produce.

use matchlight_extract_core::{FrameObservation, MatchExtractor, RawDetection};
use matchlight_match_model::{EventClass, MatchEvent, Point};

const FPS: f64 = 60.0;

fn map_det(label: &str, x: f64, y: f64, confidence: f32) -> RawDetection {
    RawDetection::new(label, Point::new(x, y), 10.0, 10.0, confidence)
}

fn feed_pair(killer: &str, victim: &str) -> Vec<RawDetection> {
    vec![
        RawDetection::new(killer, Point::new(10.0, 20.0), 12.0, 12.0, 0.8),
        RawDetection::new(victim, Point::new(300.0, 20.0), 12.0, 12.0, 0.8),
    ]
}

/// One scripted round: a recon cast at frame 900, a double kill around
/// frames 1083/1173, a spike plant at 1500, and a closing kill at 2403.
fn run_scripted_round() -> matchlight_match_model::MatchRecord {
    let mut extractor = MatchExtractor::with_defaults();

    for frame in 0..=2500u64 {
        let mut minimap = vec![
            map_det("jett_e", 100.0, 80.0, 0.9),
            map_det("sage_f", 200.0, 120.0, 0.9),
            map_det("omen_f", 210.0, 130.0, 0.9),
            map_det("raze_f", 220.0, 140.0, 0.9),
        ];
        if frame == 900 {
            // Recon dart right next to the killer, 3.05s before the
            // opening kill.
            minimap.push(map_det("sova_recon_e", 101.0, 81.0, 0.2));
        }
        if frame == 1500 {
            minimap.push(map_det("minimap_spike", 120.0, 150.0, 0.9));
        }

        let kill_feed = match frame {
            1080 | 1083 | 1086 => Some(feed_pair("jett_e", "sage_f")),
            1170 | 1173 | 1176 => Some(feed_pair("jett_e", "omen_f")),
            2400 | 2403 | 2406 => Some(feed_pair("jett_e", "raze_f")),
            _ => None,
        };
        let plant_ui = (frame == 1500)
            .then(|| vec![map_det("ui_spike_plant", 80.0, 40.0, 0.6)]);

        extractor.observe_frame(
            frame,
            FrameObservation {
                minimap,
                kill_feed,
                plant_ui,
            },
        );
    }

    extractor.finish(FPS)
}

#[test]
fn scripted_round_produces_the_expected_timeline() {
    let record = run_scripted_round();

    // Contribution, first blood, multi kill, plant, last kill — in frame
    // order.
    assert_eq!(record.events.len(), 5);
    let classes: Vec<EventClass> = record.events.iter().map(|e| e.class()).collect();
    assert_eq!(
        classes,
        vec![
            EventClass::FocalPoint,
            EventClass::Kill,
            EventClass::Kill,
            EventClass::SpikePlant,
            EventClass::Kill,
        ]
    );

    let focal = record.events[0].as_focal().expect("contribution first");
    assert_eq!(focal.frame, 900);
    assert_eq!(focal.detail, "sova_recon_e");

    let MatchEvent::FirstBlood(fb) = &record.events[1] else {
        panic!("expected first_blood, got {:?}", record.events[1]);
    };
    assert_eq!(fb.frame, 1083);
    assert_eq!((fb.killer.as_str(), fb.victim.as_str()), ("jett_e", "sage_f"));
    assert_eq!(fb.k_pos, Some(Point::new(100.0, 80.0)));

    let MatchEvent::MultiKill(mk) = &record.events[2] else {
        panic!("expected multi_kill, got {:?}", record.events[2]);
    };
    assert_eq!(mk.frame, 1173);
    assert_eq!(mk.victim, "omen_f");

    let plant = record.spike_plant().expect("plant confirmed");
    assert_eq!(plant.frame, 1500);
    assert_eq!(plant.pos, Point::new(120.0, 150.0));

    let MatchEvent::LastKill(lk) = &record.events[4] else {
        panic!("expected last_kill, got {:?}", record.events[4]);
    };
    assert_eq!(lk.frame, 2403);
    assert_eq!(lk.victim, "raze_f");

    assert!(record.check_invariants().is_empty());
}

#[test]
fn scripted_round_record_round_trips_through_json() {
    let record = run_scripted_round();

    let json = serde_json::to_string(&record).expect("record serializes");
    let reloaded: matchlight_match_model::MatchRecord =
        serde_json::from_str(&json).expect("record deserializes");

    assert_eq!(
        serde_json::to_value(&reloaded).expect("value"),
        serde_json::to_value(&record).expect("value")
    );
    assert_eq!(reloaded.events.len(), record.events.len());
    assert_eq!(reloaded.trails.len(), record.trails.len());
}

#[test]
fn same_cast_is_credited_once_across_the_double_kill() {
    let record = run_scripted_round();
    let contributions = record
        .events
        .iter()
        .filter(|e| e.class() == EventClass::FocalPoint)
        .count();
    assert_eq!(contributions, 1);
}
