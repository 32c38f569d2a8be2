//! Proptest strategies for stonewar types.
//!
//! These strategies generate random but reproducible inputs for
//! property-based testing of the core rules.

use proptest::prelude::*;
use proptest::sample::select;
use stonewar_core::element::ELEMENTS;
use stonewar_core::prelude::*;

/// Generate any element.
pub fn arb_element() -> impl Strategy<Value = Element> {
    select(ELEMENTS.to_vec())
}

/// Generate any direction.
pub fn arb_direction() -> impl Strategy<Value = Direction> {
    select(Direction::ALL.to_vec())
}

/// Generate a composition with every component in `0..=max`.
pub fn arb_composition(max: u8) -> impl Strategy<Value = Composition> {
    [0..=max, 0..=max, 0..=max, 0..=max].prop_map(Composition::from)
}

/// Generate an unbounded-limit stone with components in `0..=max`.
pub fn arb_stone(max: u8) -> impl Strategy<Value = Stone> {
    arb_composition(max).prop_map(Stone::new)
}

/// Generate a composition that makes a legal scient of `element`.
///
/// The primary is in `1..=max`, each orthogonal at most half of it and the
/// opposite element absent.
pub fn arb_scient_comp(element: Element, max: u8) -> impl Strategy<Value = Composition> {
    (1..=max.max(1))
        .prop_flat_map(|primary| (Just(primary), 0..=primary / 2, 0..=primary / 2))
        .prop_map(move |(primary, first, second)| {
            let [a, b] = element.orthogonals();
            Composition::single(element, primary)
                .with(a, first)
                .with(b, second)
        })
}

/// Generate an element and a legal scient composition for it.
pub fn arb_scient_recipe(max: u8) -> impl Strategy<Value = (Element, Composition)> {
    arb_element().prop_flat_map(move |element| (Just(element), arb_scient_comp(element, max)))
}

/// Generate a hex inside a grid of `radius`.
pub fn arb_hex(radius: u32) -> impl Strategy<Value = Hex> {
    let n = i32::try_from(radius).unwrap_or(i32::MAX / 4);
    (-n..=n)
        .prop_flat_map(move |q| (Just(q), (-n).max(-q - n)..=n.min(-q + n)))
        .prop_map(|(q, r)| Hex::new(q, r))
}

/// Generate a valid battle config with small limits.
pub fn arb_battle_config() -> impl Strategy<Value = BattleConfig> {
    (1u64..600, 1u64..4, 1u32..12, 1u32..8, 2u32..20, 1u32..12).prop_map(
        |(ply_time_secs, half_turn, pass_limit, stagnant_turn_limit, grid_radius, squad_capacity)| {
            BattleConfig {
                ply_time_secs,
                actions_per_turn: half_turn * 2,
                pass_limit,
                stagnant_turn_limit,
                grid_radius,
                squad_capacity,
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_hexes_stay_in_bounds(hex in arb_hex(5)) {
            prop_assert!(hex.length() <= 5);
        }

        #[test]
        fn prop_scient_comps_are_legal((element, comp) in arb_scient_recipe(60)) {
            prop_assert!(Unit::scient(1, "p", element, comp).is_ok());
        }

        #[test]
        fn prop_configs_validate(config in arb_battle_config()) {
            prop_assert!(config.validate().is_empty());
        }
    }
}
