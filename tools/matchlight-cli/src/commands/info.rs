//! Show a match record summary.

use std::path::PathBuf;

use matchlight_match_model::{EventClass, MatchRecord};

pub fn run(record: PathBuf) -> anyhow::Result<()> {
    let record = MatchRecord::load(&record)
        .map_err(|e| anyhow::anyhow!("Failed to load match record: {e}"))?;

    let kills = record
        .events
        .iter()
        .filter(|e| e.class() == EventClass::Kill)
        .count();
    let focal = record
        .events
        .iter()
        .filter(|e| e.class() == EventClass::FocalPoint)
        .count();

    println!("Match record:");
    println!("  FPS: {}", record.fps);
    println!("  Trail detections: {}", record.trails.len());
    println!();

    println!("Events: {}", record.events.len());
    println!("  Kills: {kills}");
    match record.spike_plant() {
        Some(plant) => println!(
            "  Spike plant: frame {} ({:.1}s)",
            plant.frame,
            plant.frame as f64 / record.fps
        ),
        None => println!("  Spike plant: none"),
    }
    println!("  Contributions: {focal}");
    println!();

    for event in &record.events {
        let secs = event.frame() as f64 / record.fps;
        match event.as_kill() {
            Some(kill) => println!(
                "  {:>8.1}s  {:<12} {} -> {}",
                secs,
                event.display_label(),
                kill.killer,
                kill.victim
            ),
            None => match event.as_focal() {
                Some(f) => println!(
                    "  {:>8.1}s  {:<12} {} ({})",
                    secs,
                    event.display_label(),
                    f.detail,
                    f.category.caption()
                ),
                None => println!("  {:>8.1}s  {:<12}", secs, event.display_label()),
            },
        }
    }

    Ok(())
}
