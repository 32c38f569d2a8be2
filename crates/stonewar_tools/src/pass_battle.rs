//! Scripted all-pass battle, for checking end-of-battle rules by hand.

use stonewar_core::battle::BattleLog;
use stonewar_core::prelude::*;

use crate::inspect::summarize;
use crate::Result;

/// Spoils and prisoners reported at the end of a battle.
#[derive(Debug, Default)]
pub struct Tally {
    /// Winning side.
    pub winner: Option<Side>,
    /// Awards taken from the fallen.
    pub awards: Vec<Stone>,
    /// Surviving losers.
    pub prisoners: Vec<Unit>,
}

impl BattleEndCallback for Tally {
    fn battle_end(
        &mut self,
        _attacker: Squad,
        _defender: Squad,
        winner: Side,
        awards: Vec<Stone>,
        prisoners: Vec<Unit>,
    ) {
        self.winner = Some(winner);
        self.awards = awards;
        self.prisoners = prisoners;
    }
}

/// Pit one scient against another and pass until the battle ends.
///
/// Returns the log summary followed by the prisoner count.
///
/// # Errors
///
/// Returns an error if `config` is invalid or too small for two units.
pub fn run_pass_battle(config: BattleConfig) -> Result<String> {
    let (log, tally) = play(config)?;
    tracing::info!(actions = log.actions().len(), "Pass battle finished");
    Ok(format!("{}\nprisoners: {}", summarize(&log), tally.prisoners.len()))
}

fn play(config: BattleConfig) -> stonewar_core::error::Result<(BattleLog, Tally)> {
    let mut ids = UnitIdAllocator::new();
    let (warden, raider) = (ids.allocate(), ids.allocate());

    let mut keep = Squad::new(1, "Keep", Some(1));
    keep.append(Unit::scient(warden, "Warden", Element::Earth, Composition::new(8, 2, 2, 0))?)?;
    let mut raid = Squad::new(2, "Raid", Some(2));
    raid.append(Unit::scient(raider, "Ember", Element::Fire, Composition::new(2, 8, 0, 2))?)?;

    let field = Field::barren(Element::Earth, keep, &config);
    let mut battle = Battle::new(field, raid, config)?;
    battle.place(warden, Hex::new(0, -1))?;
    battle.place(raider, Hex::new(0, 1))?;
    battle.start(Timestamp(0))?;

    let mut secs = 0;
    while let Some(unit) = battle.whose_turn() {
        secs += 1;
        battle.process_action(ActionRequest::pass(unit), Timestamp::from_secs(secs))?;
    }

    let mut tally = Tally::default();
    let log = battle.conclude(&mut tally)?;
    Ok((log, tally))
}
