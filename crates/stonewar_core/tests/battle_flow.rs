//! End-to-end battle flows: termination, timeouts, burial and conclusion.

use proptest::prelude::*;
use stonewar_core::prelude::*;
use stonewar_core::units::Damageable;
use stonewar_test_utils::determinism::{greedy_step, play_out};
use stonewar_test_utils::fixtures::{self, Scenario, DUEL_RON};
use stonewar_test_utils::strategies::arb_battle_config;

#[derive(Default)]
struct Results {
    winner: Option<Side>,
    attacker: Option<Squad>,
    defender: Option<Squad>,
    awards: Vec<Stone>,
    prisoners: Vec<Unit>,
}

impl BattleEndCallback for Results {
    fn battle_end(
        &mut self,
        attacker: Squad,
        defender: Squad,
        winner: Side,
        awards: Vec<Stone>,
        prisoners: Vec<Unit>,
    ) {
        self.winner = Some(winner);
        self.attacker = Some(attacker);
        self.defender = Some(defender);
        self.awards = awards;
        self.prisoners = prisoners;
    }
}

const GLOVE_RON: &str = r"Scenario(
    element: Earth,
    radius: 3,
    defenders: [(id: 1, element: Earth, comp: (4, 1, 1, 0), at: (0, 0))],
    attackers: [(id: 2, element: Wind, comp: (0, 40, 40, 100), weapon: Some((0, 0, 0, 8)), at: (0, 1))],
)";

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_passing_ends_at_first_limit(config in arb_battle_config()) {
        let stagnation_at = u64::from(config.stagnant_turn_limit) * config.actions_per_turn;
        let passes_at = u64::from(config.pass_limit);
        let mut battle = Scenario::from_ron(DUEL_RON).start(config);

        let taken = fixtures::pass_until_over(&mut battle);

        prop_assert_eq!(taken, stagnation_at.min(passes_at));
        let expected = if stagnation_at <= passes_at {
            GameOverCondition::Stagnation
        } else {
            GameOverCondition::BothPassed
        };
        prop_assert_eq!(
            battle.status(),
            BattleStatus::GameOver { winner: Side::Defender, condition: expected }
        );
    }
}

#[test]
fn test_timeouts_fill_whole_plies() {
    for plies in 1..=3u64 {
        let mut battle = fixtures::duel();
        let ply = battle.config().ply_time_millis();
        let filled = battle.check_timeouts(Timestamp(ply * plies + 1)).unwrap();
        assert_eq!(filled, 2 * plies);
        assert!(battle
            .log()
            .actions()
            .iter()
            .all(|a| a.kind == ActionKind::TimedOut));
        assert_eq!(battle.state().pass_count, 2 * plies as u32);
    }
}

#[test]
fn test_no_timeout_at_the_deadline() {
    let mut battle = fixtures::duel();
    let deadline = battle.deadline().unwrap();
    assert_eq!(battle.check_timeouts(deadline).unwrap(), 0);
    assert_eq!(battle.check_timeouts(deadline.plus_millis(1)).unwrap(), 2);
}

#[test]
fn test_late_request_is_dropped() {
    let mut battle = fixtures::duel();
    let unit = battle.whose_turn().unwrap();
    let late = battle.deadline().unwrap().plus_millis(1);
    let outcome = battle.process_action(ActionRequest::pass(unit), late).unwrap();
    assert_eq!(outcome, ActionOutcome::TimedOut { filled: 2 });
    assert_eq!(battle.log().actions().len(), 2);
}

#[test]
fn test_buried_units_leave_the_grid() {
    let mut battle = fixtures::skirmish();
    while !battle.is_over() && battle.log().actions().len() < 1_000 {
        greedy_step(&mut battle);
        let field = battle.field();
        for &id in field.graveyard() {
            assert_eq!(field.unit(id).unwrap().location(), None);
            assert!(!field.find_units().contains_key(&id));
            assert!(field.queued_damage(id).is_none());
        }
        for (_, occupant) in field.grid().occupied() {
            assert!(!field.is_buried(occupant));
        }
    }
    assert!(battle.is_over());
}

#[test]
fn test_dead_units_ply_is_skipped() {
    let mut battle = fixtures::skirmish();
    play_out(&mut battle, 1_000);
    let field = battle.field();
    for action in battle.log().actions() {
        if action.kind == ActionKind::Skipped {
            assert!(field.is_buried(action.unit));
        }
    }
}

#[test]
fn test_glove_damage_lands_at_turn_boundary() {
    let mut battle = Scenario::from_ron(GLOVE_RON).start(BattleConfig::default());
    let order: Vec<UnitId> = battle.queue().order().collect();
    assert_eq!(order, vec![1, 2]);
    let start_hp = battle.field().unit(1).unwrap().hp();

    battle.process_action(ActionRequest::pass(1), Timestamp(1_000)).unwrap();
    battle.process_action(ActionRequest::pass(1), Timestamp(2_000)).unwrap();
    let outcome = battle
        .process_action(ActionRequest::attack(2, Hex::new(0, 0)), Timestamp(3_000))
        .unwrap();
    let ActionOutcome::Applied { strikes, .. } = outcome else {
        panic!("attack should apply");
    };
    assert_eq!(strikes.len(), 1);
    assert_eq!(strikes[0].outcome, None);
    assert_eq!(battle.field().unit(1).unwrap().hp(), start_hp);
    assert_eq!(battle.field().queued_damage(1).unwrap().len(), 1);

    battle.process_action(ActionRequest::pass(2), Timestamp(4_000)).unwrap();
    assert_eq!(battle.winner(), Some(Side::Attacker));
    assert_eq!(
        battle.status(),
        BattleStatus::GameOver {
            winner: Side::Attacker,
            condition: GameOverCondition::DefenderDead
        }
    );

    let mut results = Results::default();
    let log = battle.conclude(&mut results).unwrap();
    assert_eq!(log.outcome(), Some((Side::Attacker, GameOverCondition::DefenderDead)));
    assert_eq!(results.winner, Some(Side::Attacker));
    assert_eq!(results.awards.len(), 1);
    assert_eq!(results.awards[0].comp(), Composition::new(2, 0, 0, 0));
    assert!(results.prisoners.is_empty());
    assert_eq!(results.attacker.unwrap().units().len(), 1);
    assert!(results.defender.unwrap().is_empty());
}

#[test]
fn test_defender_win_takes_prisoners() {
    let mut battle = fixtures::skirmish();
    fixtures::pass_until_over(&mut battle);
    assert_eq!(battle.winner(), Some(Side::Defender));

    let mut results = Results::default();
    battle.conclude(&mut results).unwrap();
    assert!(results.awards.is_empty());
    let mut taken: Vec<UnitId> = results.prisoners.iter().map(Unit::id).collect();
    taken.sort_unstable();
    assert_eq!(taken, vec![3, 4]);
    assert!(results.attacker.unwrap().is_empty());
    assert_eq!(results.defender.unwrap().units().len(), 2);
}

#[test]
fn test_log_replays_to_same_hash() {
    let mut first = fixtures::skirmish();
    let mut second = fixtures::skirmish();
    play_out(&mut first, 120);
    for action in first.log().actions() {
        if action.kind.is_reserved() {
            continue;
        }
        let request = ActionRequest {
            unit: action.unit,
            kind: action.kind,
            target: action.target,
        };
        second.process_action(request, action.stamp).unwrap();
    }
    assert_eq!(first.log(), second.log());
    assert_eq!(first.state_hash(), second.state_hash());
}
