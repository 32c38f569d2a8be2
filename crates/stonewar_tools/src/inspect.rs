//! Stored battle log inspection.

use std::fmt::Write as _;
use std::path::Path;

use stonewar_core::battle::{ActionKind, BattleLog};

use crate::{read, Result};

/// Load a bincode battle log from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_log(path: &Path) -> Result<BattleLog> {
    let bytes = read(path)?;
    Ok(BattleLog::decode(&bytes)?)
}

/// One-screen summary of a battle log.
#[must_use]
pub fn summarize(log: &BattleLog) -> String {
    let count = |kind: ActionKind| log.actions().iter().filter(|a| a.kind == kind).count();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "started: {}",
        log.started().map_or_else(|| "never".to_string(), |t| t.to_string())
    );
    let _ = writeln!(out, "units: {}", log.initial_locations().len());
    let _ = writeln!(
        out,
        "actions: {} (move {}, attack {}, pass {}, timed out {}, skipped {})",
        log.actions().len(),
        count(ActionKind::Move),
        count(ActionKind::Attack),
        count(ActionKind::Pass),
        count(ActionKind::TimedOut),
        count(ActionKind::Skipped),
    );
    let _ = writeln!(out, "snapshots: {}", log.snapshots().len());
    if let Some(last) = log.snapshots().last() {
        let _ = writeln!(
            out,
            "final hp: defender {}, attacker {}",
            last.hp_count[0], last.hp_count[1]
        );
    }
    match log.outcome() {
        Some((winner, condition)) => {
            let _ = write!(out, "outcome: {} wins ({condition})", winner.name());
        }
        None => {
            let _ = write!(out, "outcome: undecided");
        }
    }
    out
}
