//! The game reducer: pure functions, fully testable.
//!
//! `reduce` is the single transition function `(state, action) -> state`. It
//! performs no I/O and reads no clocks; time arrives inside action payloads.
//! Every transition is all-or-nothing: a failed precondition (insufficient
//! funds, already unlocked, dock full, boost still running) returns the input
//! state unchanged rather than raising an error. Actions that change
//! persisted-relevant fields set the dirty flag.

use crate::actions::GameAction;
use crate::economy;
use crate::state::{ActiveBoost, BoostKind, GameState, UpgradeKind};

/// Apply one action to the state, producing the next state.
pub fn reduce(state: &GameState, action: &GameAction) -> GameState {
    match action {
        GameAction::ProduceMaterial { node_id, amount } => {
            produce_material(state, node_id, *amount)
        }
        GameAction::SellMaterials { now_ms } => sell_materials(state, *now_ms),
        GameAction::UpgradeNode { node_id, kind } => upgrade_node(state, node_id, *kind),
        GameAction::UnlockNode { node_id } => unlock_node(state, node_id),
        GameAction::UpgradeDock => upgrade_dock(state),
        GameAction::UpgradeGlobal { kind } => {
            let current_level = state.global_upgrades.track(*kind).level;
            let cost = economy::global_upgrade_cost(current_level);
            if state.money < cost {
                return state.clone();
            }
            let mut next = state.clone();
            next.money -= cost;
            let track = next.global_upgrades.track_mut(*kind);
            track.level = current_level + 1;
            track.multiplier = economy::global_multiplier(*kind, current_level);
            next.should_save = true;
            next
        }
        GameAction::PurchaseDockManager => {
            if state.loading_dock.has_manager || state.money < economy::DOCK_MANAGER_COST {
                return state.clone();
            }
            let mut next = state.clone();
            next.money -= economy::DOCK_MANAGER_COST;
            next.loading_dock.has_manager = true;
            next.should_save = true;
            next
        }
        GameAction::ClickBlackHole { gems_earned, now_ms } => {
            let mut next = state.clone();
            let boost = next.boost_multiplier(BoostKind::ClickPower, *now_ms);
            next.money += economy::click_value(next.black_hole.level) * boost;
            next.cosmic_gems += *gems_earned as f64;
            next.should_save = next.should_save || *gems_earned > 0;
            next
        }
        GameAction::UpgradeBlackHole => {
            let cost = economy::black_hole_upgrade_cost(state.black_hole.level);
            if state.money < cost {
                return state.clone();
            }
            let mut next = state.clone();
            next.money -= cost;
            next.black_hole.level += 1;
            next.should_save = true;
            next
        }
        GameAction::UpgradeBlackHoleAutoClicker => {
            let level = state.black_hole.auto_clicker.level;
            if level >= economy::MAX_AUTO_CLICKER_LEVEL {
                return state.clone();
            }
            let cost = economy::auto_clicker_cost(level);
            if state.money < cost {
                return state.clone();
            }
            let mut next = state.clone();
            next.money -= cost;
            next.black_hole.auto_clicker.level = level + 1;
            next.black_hole.auto_clicker.clicks_per_second =
                economy::auto_clicker_clicks_per_second(level + 1);
            next.should_save = true;
            next
        }
        GameAction::ActivateBoost { kind, cost, now_ms } => {
            activate_boost(state, *kind, *cost, *now_ms)
        }
        GameAction::LoadGameState(snapshot) => {
            let mut next = (**snapshot).clone();
            next.should_save = false;
            next
        }
        GameAction::SaveGameState => {
            let mut next = state.clone();
            next.should_save = false;
            next
        }
    }
}

/// Store up to `amount` units of the node's material, clipped to the dock's
/// remaining space. Production alone does not mark the state dirty.
fn produce_material(state: &GameState, node_id: &str, amount: u32) -> GameState {
    let node = match state.node(node_id) {
        Some(n) if n.is_unlocked => n,
        _ => return state.clone(),
    };

    let total = state.loading_dock.total_stored();
    if total >= state.loading_dock.capacity {
        return state.clone();
    }
    let space = state.loading_dock.capacity - total;
    let to_store = amount.min(space);

    let material_id = node.material.id.to_string();
    let mut next = state.clone();
    *next.loading_dock.stored.entry(material_id).or_insert(0) += to_store;
    next
}

/// Sell everything in the dock: per-material value with the node's value
/// multiplier, the global material multiplier and any active material boost,
/// summed, then payload-boosted by dock level. Gems come from the boosted
/// total. Selling an empty dock is a no-op.
fn sell_materials(state: &GameState, now_ms: f64) -> GameState {
    if state.loading_dock.total_stored() == 0 {
        return state.clone();
    }

    let material_boost = state.boost_multiplier(BoostKind::MaterialValue, now_ms);
    let global_mult = state.global_upgrades.material_value.multiplier;

    let mut total_value = 0.0;
    for (material_id, amount) in &state.loading_dock.stored {
        if *amount == 0 {
            continue;
        }
        let node = state
            .nodes
            .iter()
            .find(|n| n.material.id == material_id.as_str());
        if let Some(node) = node {
            let value_mult = economy::node_value_multiplier(node.level.value);
            total_value +=
                node.material.base_value * *amount as f64 * value_mult * global_mult * material_boost;
        }
    }

    let boosted = total_value * economy::payload_boost(state.loading_dock.level);

    let mut next = state.clone();
    next.money += boosted;
    next.cosmic_gems += economy::gems_from_sale(boosted);
    next.loading_dock.stored.clear();
    next.should_save = true;
    next
}

fn upgrade_node(state: &GameState, node_id: &str, kind: UpgradeKind) -> GameState {
    let index = match state.node_index(node_id) {
        Some(i) => i,
        None => return state.clone(),
    };
    let cost = economy::node_upgrade_cost_for(state, index, kind);
    if state.money < cost {
        return state.clone();
    }

    let mut next = state.clone();
    next.money -= cost;
    let node = &mut next.nodes[index];
    match kind {
        UpgradeKind::Production => {
            node.level.production += 1;
            node.production_rate = economy::production_rate_for_level(node.level.production);
        }
        UpgradeKind::Value => {
            node.level.value += 1;
        }
    }
    next.should_save = true;
    next
}

fn unlock_node(state: &GameState, node_id: &str) -> GameState {
    let index = match state.node_index(node_id) {
        Some(i) => i,
        None => return state.clone(),
    };
    let node = &state.nodes[index];
    if node.is_unlocked || state.money < node.unlock_cost {
        return state.clone();
    }

    let mut next = state.clone();
    next.money -= node.unlock_cost;
    next.nodes[index].is_unlocked = true;
    next.should_save = true;
    next
}

/// Dock upgrade: capacity grows by 10 scaled by the storage optimization
/// track, floored.
fn upgrade_dock(state: &GameState) -> GameState {
    let cost = economy::dock_upgrade_cost(state.loading_dock.level);
    if state.money < cost {
        return state.clone();
    }

    let increase = (10.0 * state.global_upgrades.storage_optimization.multiplier).floor() as u32;
    let mut next = state.clone();
    next.money -= cost;
    next.loading_dock.capacity += increase;
    next.loading_dock.level += 1;
    next.should_save = true;
    next
}

fn activate_boost(state: &GameState, kind: BoostKind, cost: f64, now_ms: f64) -> GameState {
    if state.cosmic_gems < cost {
        return state.clone();
    }
    if let Some(existing) = state.active_boosts.get(&kind) {
        if existing.is_active(now_ms) {
            return state.clone();
        }
    }

    let mut next = state.clone();
    next.cosmic_gems -= cost;
    next.active_boosts.insert(
        kind,
        ActiveBoost {
            multiplier: kind.multiplier(),
            duration_ms: kind.duration_ms(),
            ends_at: Some(now_ms + kind.duration_ms()),
            cost,
        },
    );
    next.should_save = true;
    next
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_node_id() -> impl Strategy<Value = String> {
        (0usize..16).prop_map(|i| format!("node-{i}"))
    }

    proptest! {
        /// Capacity invariant: no sequence of produce actions can overfill
        /// the dock.
        #[test]
        fn prop_capacity_never_exceeded(
            amounts in proptest::collection::vec((0usize..16, 1u32..10), 1..80),
        ) {
            let mut state = GameState::new();
            for node in state.nodes.iter_mut() {
                node.is_unlocked = true;
            }
            for (index, amount) in amounts {
                state = reduce(
                    &state,
                    &GameAction::ProduceMaterial {
                        node_id: format!("node-{index}"),
                        amount,
                    },
                );
                prop_assert!(
                    state.loading_dock.total_stored() <= state.loading_dock.capacity
                );
            }
        }

        /// Paid actions with zero money are always observably no-ops.
        #[test]
        fn prop_broke_player_cannot_buy(node_id in arb_node_id()) {
            let state = GameState::new();
            let actions = [
                GameAction::UpgradeNode { node_id: node_id.clone(), kind: UpgradeKind::Production },
                GameAction::UpgradeNode { node_id: node_id.clone(), kind: UpgradeKind::Value },
                GameAction::UnlockNode { node_id },
                GameAction::UpgradeDock,
                GameAction::UpgradeGlobal { kind: crate::state::GlobalUpgradeKind::MaterialValue },
                GameAction::PurchaseDockManager,
                GameAction::UpgradeBlackHole,
                GameAction::UpgradeBlackHoleAutoClicker,
            ];
            for action in &actions {
                let next = reduce(&state, action);
                prop_assert_eq!(&next, &state);
            }
        }

        /// Selling never decreases money and always empties the dock.
        #[test]
        fn prop_sell_empties_and_pays(
            stored in proptest::collection::btree_map(0usize..16, 1u32..5, 0..8),
        ) {
            let mut state = GameState::new();
            state.loading_dock.capacity = 1_000;
            for (index, amount) in &stored {
                state
                    .loading_dock
                    .stored
                    .insert(crate::state::MATERIALS[*index].id.to_string(), *amount);
            }
            let before = state.money;
            let next = reduce(&state, &GameAction::SellMaterials { now_ms: 0.0 });
            prop_assert!(next.money >= before);
            prop_assert_eq!(next.loading_dock.total_stored(), 0);
        }

        /// Gems never appear from clicks that earned none.
        #[test]
        fn prop_click_gem_accounting(gems in 0u32..5) {
            let state = GameState::new();
            let next = reduce(
                &state,
                &GameAction::ClickBlackHole { gems_earned: gems, now_ms: 0.0 },
            );
            prop_assert_eq!(next.cosmic_gems, gems as f64);
        }
    }
}
