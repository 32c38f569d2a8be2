//! Plain JSON projections of core entities.
//!
//! The RPC layer serves these views as-is. Maps keyed by hexes are flattened
//! to lists, since JSON object keys must be strings.

use serde_json::{json, Value};

use crate::battle::{Battle, BattleStatus};
use crate::battlefield::{Battlefield, Side};
use crate::composition::Composition;
use crate::element::Element;
use crate::grid::Tile;
use crate::hex::Hex;
use crate::squad::Squad;
use crate::stone::Stone;
use crate::units::{Damageable, Unit, UnitKind};
use crate::weapons::Weapon;

/// Something with an API view.
pub trait ApiView {
    /// Nested JSON projection.
    fn api_view(&self) -> Value;
}

fn comp_view(comp: &Composition) -> Value {
    json!({
        "Earth": comp.get(Element::Earth),
        "Fire": comp.get(Element::Fire),
        "Ice": comp.get(Element::Ice),
        "Wind": comp.get(Element::Wind),
    })
}

/// Unplaced renders as `[null, null]`.
fn hex_view(hex: Option<Hex>) -> Value {
    hex.map_or_else(|| json!([null, null]), |h| json!([h.q, h.r]))
}

impl ApiView for Composition {
    fn api_view(&self) -> Value {
        comp_view(self)
    }
}

impl ApiView for Stone {
    fn api_view(&self) -> Value {
        json!({
            "comp": comp_view(&self.comp()),
            "limit": comp_view(&self.limit()),
        })
    }
}

impl ApiView for Weapon {
    fn api_view(&self) -> Value {
        json!({
            "element": self.element().name(),
            "type": self.weapon_type().name(),
            "comp": comp_view(&self.comp()),
        })
    }
}

impl ApiView for Unit {
    fn api_view(&self) -> Value {
        let stats = self.stats();
        let mut view = json!({
            "id": self.id(),
            "name": self.name(),
            "element": self.element().name(),
            "comp": comp_view(&self.comp()),
            "hp": self.hp(),
            "max_hp": self.max_hp(),
            "stats": {
                "p": stats.p,
                "m": stats.m,
                "atk": stats.atk,
                "defe": stats.defe,
                "patk": stats.patk,
                "pdef": stats.pdef,
                "matk": stats.matk,
                "mdef": stats.mdef,
            },
            "location": hex_view(self.location()),
            "owner": self.owner(),
            "container": self.container().map(|c| json!({ "squad": c.squad, "slot": c.slot })),
            "size": self.size(),
            "move": self.move_range(),
        });
        match self.kind() {
            UnitKind::Scient { weapon } => {
                view["kind"] = json!("scient");
                view["weapon"] = weapon.as_ref().map_or(Value::Null, ApiView::api_view);
            }
            UnitKind::Nescient {
                nescient_type,
                facing,
            } => {
                view["kind"] = json!("nescient");
                view["type"] = json!(nescient_type.name());
                view["facing"] = json!(facing.to_string());
                view["body"] = json!(self
                    .occupied_tiles()
                    .into_iter()
                    .map(|h| hex_view(Some(h)))
                    .collect::<Vec<_>>());
            }
        }
        view
    }
}

impl ApiView for Squad {
    fn api_view(&self) -> Value {
        json!({
            "id": self.id(),
            "name": self.name(),
            "owner": self.owner(),
            "capacity": self.capacity(),
            "size": self.size(),
            "value": self.value(),
            "hp": self.hp(),
            "units": self.units().iter().map(ApiView::api_view).collect::<Vec<_>>(),
        })
    }
}

impl ApiView for Tile {
    fn api_view(&self) -> Value {
        json!({
            "location": hex_view(Some(self.location())),
            "comp": comp_view(&self.comp()),
            "occupant": self.occupant(),
        })
    }
}

impl ApiView for Battlefield {
    fn api_view(&self) -> Value {
        let squads: Vec<Value> = Side::BOTH
            .into_iter()
            .map(|side| {
                let roster = self.roster(side);
                json!({
                    "side": side.name(),
                    "id": roster.id,
                    "name": roster.name,
                    "owner": roster.owner,
                    "hp": self.squad_hp(side),
                    "value": self.squad_value(side),
                    "units": self.members(side).map(ApiView::api_view).collect::<Vec<_>>(),
                })
            })
            .collect();
        let queued: Vec<Value> = self
            .units()
            .filter_map(|u| {
                let pending = self.queued_damage(u.id())?;
                if pending.is_empty() {
                    return None;
                }
                Some(json!({
                    "unit": u.id(),
                    "pending": pending
                        .iter()
                        .map(|d| json!([d.amount, d.ticks]))
                        .collect::<Vec<_>>(),
                }))
            })
            .collect();
        json!({
            "element": self.element().name(),
            "radius": self.grid().radius(),
            "squads": squads,
            "occupied": self
                .grid()
                .occupied()
                .map(|(hex, unit)| json!({ "location": hex_view(Some(hex)), "unit": unit }))
                .collect::<Vec<_>>(),
            "damage_queue": queued,
            "graveyard": self.graveyard(),
        })
    }
}

impl ApiView for Battle {
    fn api_view(&self) -> Value {
        let (status, winner, condition) = match self.status() {
            BattleStatus::Setup => ("setup", None, None),
            BattleStatus::Active => ("active", None, None),
            BattleStatus::GameOver { winner, condition } => {
                ("game_over", Some(winner.name()), Some(condition.message()))
            }
        };
        let log = self.log();
        json!({
            "status": status,
            "winner": winner,
            "condition": condition,
            "whose_turn": self.whose_turn(),
            "deadline": self.deadline().map(|t| t.as_millis()),
            "pass_count": self.state().pass_count,
            "stagnant_turns": self.state().stagnant_turns,
            "order": self.queue().order().collect::<Vec<_>>(),
            "field": self.field().api_view(),
            "actions": log
                .actions()
                .iter()
                .map(|a| json!({
                    "num": a.num,
                    "unit": a.unit,
                    "type": a.kind.name(),
                    "target": hex_view(a.target),
                    "when": a.stamp.as_millis(),
                }))
                .collect::<Vec<_>>(),
            "messages": log
                .messages()
                .iter()
                .map(|m| json!({ "num": m.num, "text": m.text }))
                .collect::<Vec<_>>(),
        })
    }
}
