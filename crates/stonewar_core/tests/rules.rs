//! Property tests for the elemental rules, geometry and turn order.

use proptest::prelude::*;
use stonewar_core::element::ELEMENTS;
use stonewar_core::prelude::*;
use stonewar_test_utils::strategies::{
    arb_battle_config, arb_composition, arb_direction, arb_element, arb_hex, arb_scient_recipe,
    arb_stone,
};

proptest! {
    #[test]
    fn prop_checked_add_respects_bounds(a in arb_composition(255), b in arb_composition(255)) {
        let fits = ELEMENTS.iter().all(|&e| u32::from(a.get(e)) + u32::from(b.get(e)) <= 255);
        match a.checked_add(&b) {
            Ok(sum) => {
                prop_assert!(fits);
                prop_assert_eq!(sum.value(), a.value() + b.value());
            }
            Err(_) => prop_assert!(!fits),
        }
    }

    #[test]
    fn prop_imbue_conserves_elements(mut host in arb_stone(255), guest in arb_stone(255)) {
        let before = host.comp().value() + guest.comp().value();
        let residual = host.imbue(guest);
        let after = host.comp().value() + residual.map_or(0, |r| r.comp().value());
        prop_assert_eq!(before, after);
        prop_assert!(host.comp().fits_within(&host.limit()));
    }

    #[test]
    fn prop_split_then_imbue_restores(mut stone in arb_stone(200), piece in arb_composition(200)) {
        let original = stone.comp();
        match stone.split(piece) {
            Ok(part) => {
                prop_assert_eq!(part.comp(), piece);
                prop_assert!(stone.imbue(part).is_none());
                prop_assert_eq!(stone.comp(), original);
            }
            Err(_) => {
                prop_assert!(!piece.fits_within(&original));
                prop_assert_eq!(stone.comp(), original);
            }
        }
    }

    #[test]
    fn prop_transmute_plan_pays_exactly(silo in arb_composition(30), need in arb_composition(12)) {
        let mut transmuter = Transmuter::new(silo, need);
        if let Ok(plan) = transmuter.plan() {
            let total = plan.total().unwrap();
            prop_assert!(total.fits_within(&silo));
            for element in ELEMENTS {
                let produced: u32 = plan
                    .conversions
                    .iter()
                    .filter(|c| c.to == element)
                    .map(|c| c.produced)
                    .sum();
                prop_assert_eq!(u32::from(plan.direct.get(element)) + produced, u32::from(need.get(element)));
            }
        } else {
            prop_assert!(transmuter.has_failed());
            prop_assert!(transmuter.get_cost().is_err());
        }
    }

    #[test]
    fn prop_direct_cover_costs_the_need(need in arb_composition(50), extra in arb_composition(50)) {
        let silo = need.checked_add(&extra).unwrap();
        let mut transmuter = Transmuter::new(silo, need);
        prop_assert_eq!(transmuter.get_cost().unwrap(), need);
    }

    #[test]
    fn prop_range_is_a_disc(origin in arb_hex(6), distance in 0u32..5) {
        let grid = Grid::new(8);
        let disc = grid.range(origin, distance);
        prop_assert!(!disc.contains(&origin));
        for hex in &disc {
            prop_assert!(hex.distance(origin) <= distance);
            prop_assert!(grid.in_bounds(*hex));
        }
        let full = 3 * distance * (distance + 1);
        prop_assert!(disc.len() as u32 <= full);
    }

    #[test]
    fn prop_rotation_preserves_length(hex in arb_hex(10), steps in 0usize..6) {
        let mut rotated = hex;
        for _ in 0..steps {
            rotated = rotated.rotate_cw();
        }
        prop_assert_eq!(rotated.length(), hex.length());
        for _ in 0..steps {
            rotated = rotated.rotate_ccw();
        }
        prop_assert_eq!(rotated, hex);
    }

    #[test]
    fn prop_nescient_body_is_connected(head in arb_hex(3), facing in arb_direction()) {
        let unit = Unit::nescient(1, "n", Element::Ice, Composition::new(1, 0, 9, 1), facing).unwrap();
        let body = unit.footprint(head);
        prop_assert_eq!(body.len(), 4);
        prop_assert_eq!(body[0], head);
        for part in &body[1..] {
            prop_assert!(part.distance(head) == 1);
        }
    }

    #[test]
    fn prop_physical_damage_never_heals(
        (a_el, a_comp) in arb_scient_recipe(60),
        (d_el, d_comp) in arb_scient_recipe(60),
        terrain in arb_element(),
    ) {
        let mut atk = Squad::new(2, "atk", None);
        let mut attacker = Unit::scient(2, "a", a_el, a_comp).unwrap();
        let sword = Weapon::new(Element::Earth, Composition::new(5, 0, 0, 0)).unwrap();
        attacker.equip(sword).unwrap();
        atk.append(attacker).unwrap();
        let mut def = Squad::new(1, "def", None);
        def.append(Unit::scient(1, "d", d_el, d_comp).unwrap()).unwrap();

        let mut field = Battlefield::new(Grid::new(3), terrain, def, atk).unwrap();
        field.place(1, Hex::new(0, 0)).unwrap();
        field.place(2, Hex::new(0, 1)).unwrap();
        prop_assert!(field.dmg(2, 1).unwrap() >= 0);
    }

    #[test]
    fn prop_magic_on_own_element_never_harms((element, comp) in arb_scient_recipe(60)) {
        let mut atk = Squad::new(2, "atk", None);
        let mut attacker = Unit::scient(2, "a", element, comp).unwrap();
        let staff = Weapon::new(Element::Ice, Composition::new(0, 0, 5, 0)).unwrap();
        attacker.equip(staff).unwrap();
        atk.append(attacker).unwrap();
        let mut def = Squad::new(1, "def", None);
        def.append(Unit::scient(1, "d", element, comp).unwrap()).unwrap();

        let mut field = Battlefield::new(Grid::new(3), Element::Fire, def, atk).unwrap();
        field.place(1, Hex::new(0, 0)).unwrap();
        field.place(2, Hex::new(0, 2)).unwrap();
        prop_assert!(field.dmg(2, 1).unwrap() <= 0);
    }

    #[test]
    fn prop_magic_on_other_elements_never_heals(
        ((a_el, a_comp), (d_el, d_comp)) in (arb_scient_recipe(60), arb_scient_recipe(60))
            .prop_filter("elements differ", |((a, _), (d, _))| a != d),
        weapon_el in proptest::sample::select(vec![Element::Ice, Element::Wind]),
        terrain in arb_element(),
    ) {
        let mut atk = Squad::new(2, "atk", None);
        let mut attacker = Unit::scient(2, "a", a_el, a_comp).unwrap();
        let focus = Weapon::new(weapon_el, Composition::single(weapon_el, 5)).unwrap();
        attacker.equip(focus).unwrap();
        atk.append(attacker).unwrap();
        let mut def = Squad::new(1, "def", None);
        def.append(Unit::scient(1, "d", d_el, d_comp).unwrap()).unwrap();

        let mut field = Battlefield::new(Grid::new(3), terrain, def, atk).unwrap();
        field.place(1, Hex::new(0, 1)).unwrap();
        field.place(2, Hex::ORIGIN).unwrap();
        prop_assert!(field.dmg(2, 1).unwrap() >= 0);
        let hits = field.calc_damage(2, Hex::new(0, 1)).unwrap();
        prop_assert_eq!(hits.len(), 1);
        prop_assert!(hits.iter().all(|hit| hit.amount >= 0));
    }

    #[test]
    fn prop_scient_moves_exactly_within_range(dst in arb_hex(7)) {
        let mut def = Squad::new(1, "def", None);
        def.append(Unit::scient(1, "d", Element::Earth, Composition::new(6, 2, 2, 0)).unwrap()).unwrap();
        let mut field = Battlefield::new(Grid::new(7), Element::Earth, def, Squad::new(2, "atk", None)).unwrap();
        field.place(1, Hex::ORIGIN).unwrap();

        let steps = dst.distance(Hex::ORIGIN);
        let reachable = steps > 0 && steps <= field.unit(1).unwrap().move_range();
        let moved = field.move_unit(1, Hex::ORIGIN, dst).is_ok();
        prop_assert_eq!(moved, reachable);
        if moved {
            prop_assert_eq!(field.unit(1).unwrap().location(), Some(dst));
            prop_assert_eq!(field.grid().tile(dst).unwrap().occupant(), Some(1));
        }
    }

    #[test]
    fn prop_queue_is_a_stable_permutation(
        recipes in proptest::collection::vec(arb_scient_recipe(40), 2..8),
        terrain in arb_element(),
    ) {
        let mut def = Squad::new(1, "def", None);
        let mut atk = Squad::new(2, "atk", None);
        for (i, (element, comp)) in recipes.iter().enumerate() {
            let unit = Unit::scient(i as u64 + 1, "u", *element, *comp).unwrap();
            if i % 2 == 0 {
                def.append(unit).unwrap();
            } else {
                atk.append(unit).unwrap();
            }
        }
        let field = Battlefield::new(Grid::new(4), terrain, def, atk).unwrap();
        let queue = ActionQueue::new(&field);
        prop_assert_eq!(&queue, &ActionQueue::new(&field));

        let mut order: Vec<UnitId> = queue.order().collect();
        order.sort_unstable();
        let expected: Vec<UnitId> = (1..=recipes.len() as u64).collect();
        prop_assert_eq!(order, expected);

        let values: Vec<u32> = queue.entries().iter().map(|e| e.value).collect();
        prop_assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prop_config_ron_roundtrip(config in arb_battle_config()) {
        let text = config.to_ron_string().unwrap();
        prop_assert_eq!(BattleConfig::from_ron_str(&text).unwrap(), config);
    }
}
