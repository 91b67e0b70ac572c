//! Check match record invariants.

use std::path::PathBuf;

use matchlight_match_model::MatchRecord;

pub fn run(record: PathBuf) -> anyhow::Result<()> {
    println!("Validating record at: {}", record.display());

    let record = MatchRecord::load(&record)
        .map_err(|e| anyhow::anyhow!("Failed to load match record: {e}"))?;

    println!("  Events: {}", record.events.len());
    println!("  Trail detections: {}", record.trails.len());
    println!("  FPS: {}", record.fps);

    let issues = record.check_invariants();
    if issues.is_empty() {
        println!("\nRecord is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        anyhow::bail!("{} invariant violation(s) found", issues.len());
    }

    Ok(())
}
