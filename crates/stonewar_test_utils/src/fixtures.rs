//! Test fixtures and helpers.
//!
//! Pre-built units, squads and battles for consistent testing. Scenarios can
//! also be described in RON and built on demand.

use serde::{Deserialize, Serialize};
use stonewar_core::prelude::*;
use stonewar_core::units::PlayerId;

/// Owner of every fixture defender squad.
pub const DEFENDER_OWNER: PlayerId = 1;

/// Owner of every fixture attacker squad.
pub const ATTACKER_OWNER: PlayerId = 2;

/// Build a scient, panicking on invalid input.
#[must_use]
pub fn scient(id: UnitId, element: Element, comp: Composition) -> Unit {
    Unit::scient(id, format!("scient-{id}"), element, comp).expect("valid scient")
}

/// Build a scient holding a 4-point weapon of its own element.
#[must_use]
pub fn armed_scient(id: UnitId, element: Element, comp: Composition) -> Unit {
    let mut unit = scient(id, element, comp);
    let weapon = Weapon::new(element, Composition::single(element, 4)).expect("valid weapon");
    unit.equip(weapon).expect("scients can equip");
    unit
}

/// Build a squad from units, in order.
#[must_use]
pub fn squad(id: u64, owner: PlayerId, units: Vec<Unit>) -> Squad {
    let mut squad = Squad::new(id, format!("squad-{id}"), Some(owner));
    for unit in units {
        squad.append(unit).expect("squad has room");
    }
    squad
}

/// One unit in a RON scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitEntry {
    /// Unit id.
    pub id: UnitId,
    /// Primary element.
    pub element: Element,
    /// Composition, Earth/Fire/Ice/Wind.
    pub comp: [u8; 4],
    /// Weapon composition; the weapon takes the unit's element.
    #[serde(default)]
    pub weapon: Option<[u8; 4]>,
    /// Facing, for nescients.
    #[serde(default)]
    pub facing: Option<Direction>,
    /// Axial placement `(q, r)`.
    pub at: (i32, i32),
}

impl UnitEntry {
    /// Build the unit.
    #[must_use]
    pub fn build(&self) -> Unit {
        let comp = Composition::from(self.comp);
        let mut unit = match self.facing {
            Some(facing) => Unit::nescient(self.id, format!("nescient-{}", self.id), self.element, comp, facing)
                .expect("valid nescient"),
            None => scient(self.id, self.element, comp),
        };
        if let Some(weapon) = self.weapon {
            let weapon = Weapon::new(self.element, Composition::from(weapon)).expect("valid weapon");
            unit.equip(weapon).expect("only scients carry weapons");
        }
        unit
    }
}

/// A battle described in RON.
///
/// # Example RON
///
/// ```ron
/// Scenario(
///     element: Earth,
///     radius: 4,
///     defenders: [(id: 1, element: Earth, comp: (4, 1, 1, 0), at: (0, -1))],
///     attackers: [(id: 2, element: Fire, comp: (1, 4, 0, 1), weapon: Some((0, 4, 0, 0)), at: (0, 2))],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Terrain element.
    pub element: Element,
    /// Grid radius.
    pub radius: u32,
    /// Defending units, in squad order.
    pub defenders: Vec<UnitEntry>,
    /// Attacking units, in squad order.
    pub attackers: Vec<UnitEntry>,
}

impl Scenario {
    /// Parse a scenario, panicking on invalid RON.
    #[must_use]
    pub fn from_ron(text: &str) -> Self {
        ron::from_str(text).expect("valid scenario RON")
    }

    /// Build the battle with every unit placed, not yet started.
    #[must_use]
    pub fn build(&self, config: BattleConfig) -> Battle {
        let defenders = squad(
            1,
            DEFENDER_OWNER,
            self.defenders.iter().map(UnitEntry::build).collect(),
        );
        let attackers = squad(
            2,
            ATTACKER_OWNER,
            self.attackers.iter().map(UnitEntry::build).collect(),
        );
        let field = Field::new(self.element, Grid::new(self.radius), defenders);
        let mut battle = Battle::new(field, attackers, config).expect("valid battle");
        for entry in self.defenders.iter().chain(&self.attackers) {
            battle
                .place(entry.id, Hex::new(entry.at.0, entry.at.1))
                .expect("legal placement");
        }
        tracing::debug!(
            defenders = self.defenders.len(),
            attackers = self.attackers.len(),
            "Built scenario"
        );
        battle
    }

    /// Build and start the battle at time zero.
    #[must_use]
    pub fn start(&self, config: BattleConfig) -> Battle {
        let mut battle = self.build(config);
        battle.start(Timestamp(0)).expect("all units placed");
        battle
    }
}

/// Two swordsmen facing each other; the weak defender acts first.
pub const DUEL_RON: &str = r"Scenario(
    element: Earth,
    radius: 4,
    defenders: [(id: 1, element: Earth, comp: (4, 1, 1, 0), weapon: Some((4, 0, 0, 0)), at: (0, -1))],
    attackers: [(id: 2, element: Earth, comp: (200, 100, 100, 0), weapon: Some((4, 0, 0, 0)), at: (0, 1))],
)";

/// Two units a side, including a nescient and a glove fighter.
pub const SKIRMISH_RON: &str = r"Scenario(
    element: Ice,
    radius: 6,
    defenders: [
        (id: 1, element: Earth, comp: (20, 8, 8, 0), weapon: Some((6, 0, 0, 0)), at: (0, -3)),
        (id: 2, element: Ice, comp: (4, 0, 30, 2), facing: Some(South), at: (3, -3)),
    ],
    attackers: [
        (id: 3, element: Wind, comp: (0, 10, 10, 30), weapon: Some((0, 0, 0, 8)), at: (0, 3)),
        (id: 4, element: Fire, comp: (6, 24, 0, 6), weapon: Some((0, 8, 0, 0)), at: (-3, 3)),
    ],
)";

/// Started duel, see [`DUEL_RON`].
#[must_use]
pub fn duel() -> Battle {
    Scenario::from_ron(DUEL_RON).start(BattleConfig::default())
}

/// Started skirmish, see [`SKIRMISH_RON`].
#[must_use]
pub fn skirmish() -> Battle {
    Scenario::from_ron(SKIRMISH_RON).start(BattleConfig::default())
}

/// Pass with whoever is due until the battle ends, one second apart.
///
/// Returns the number of actions taken.
pub fn pass_until_over(battle: &mut Battle) -> u64 {
    let mut taken = 0;
    while let Some(unit) = battle.whose_turn() {
        taken += 1;
        battle
            .process_action(ActionRequest::pass(unit), Timestamp::from_secs(taken))
            .expect("pass is always legal");
    }
    taken
}
