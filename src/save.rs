//! Persisted document shape, versioning and load-time migration.
//!
//! ## Versioning policy
//!
//! - `SAVE_VERSION`: the current save format version. Incremented when fields
//!   are added.
//! - `MIN_COMPATIBLE_VERSION`: the oldest version that can still be loaded.
//!   Additive changes keep this untouched (old documents are backfilled with
//!   defaults); it only moves on breaking changes to existing fields.
//!
//! Documents at or above `MIN_COMPATIBLE_VERSION` load with `#[serde(default)]`
//! backfill for anything missing; `cosmicGems`, `blackHole`, `activeBoosts`
//! and `hasManager` all arrived after launch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::{
    ActiveBoost, BlackHole, BoostKind, GameState, GlobalUpgrades, LoadingDock, NodeLevels,
};

/// Current save format version.
pub const SAVE_VERSION: u32 = 2;

/// Oldest loadable version.
pub const MIN_COMPATIBLE_VERSION: u32 = 1;

/// Per-node persisted state. Catalog metadata (name, material, unlock cost)
/// is never persisted; the canonical catalog supplies it on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedNode {
    pub id: String,
    #[serde(default = "default_production_rate")]
    pub production_rate: f64,
    pub is_unlocked: bool,
    #[serde(default)]
    pub level: NodeLevels,
}

fn default_production_rate() -> f64 {
    1.0
}

fn default_version() -> u32 {
    1
}

/// The full persisted document. The dirty flag is deliberately absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGameState {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Client-side write timestamp (ms). Drives the last-writer-wins skip.
    #[serde(default)]
    pub client_timestamp: f64,
    /// Server-assigned write time, stamped by the store. Informational.
    #[serde(default)]
    pub last_updated_server_time: Option<f64>,
    pub money: f64,
    #[serde(default)]
    pub cosmic_gems: f64,
    pub nodes: Vec<SavedNode>,
    pub loading_dock: LoadingDock,
    #[serde(default)]
    pub global_upgrades: GlobalUpgrades,
    #[serde(default)]
    pub black_hole: BlackHole,
    #[serde(default)]
    pub active_boosts: BTreeMap<BoostKind, ActiveBoost>,
}

/// Whether a persisted document's version can still be loaded.
pub fn is_compatible(version: u32) -> bool {
    (MIN_COMPATIBLE_VERSION..=SAVE_VERSION).contains(&version)
}

/// Extract the persistable payload from the live state.
pub fn extract_save(state: &GameState, client_timestamp: f64) -> SavedGameState {
    SavedGameState {
        version: SAVE_VERSION,
        client_timestamp,
        last_updated_server_time: None,
        money: state.money,
        cosmic_gems: state.cosmic_gems,
        nodes: state
            .nodes
            .iter()
            .map(|n| SavedNode {
                id: n.id.clone(),
                production_rate: n.production_rate,
                is_unlocked: n.is_unlocked,
                level: n.level,
            })
            .collect(),
        loading_dock: state.loading_dock.clone(),
        global_upgrades: state.global_upgrades,
        black_hole: state.black_hole,
        active_boosts: state.active_boosts.clone(),
    }
}

/// Rebuild a live `GameState` from a persisted document.
///
/// Nodes merge against the canonical list by id: the catalog supplies
/// name/material/unlock-cost metadata, the document supplies level, unlock
/// state and production rate. Unknown persisted ids are dropped; nodes the
/// document predates come in at canonical defaults. Missing top-level fields
/// were already backfilled by serde during parsing.
pub fn migrate(saved: &SavedGameState) -> GameState {
    let mut state = GameState::new();

    state.money = saved.money;
    state.cosmic_gems = saved.cosmic_gems;
    state.loading_dock = saved.loading_dock.clone();
    state.global_upgrades = saved.global_upgrades;
    state.black_hole = saved.black_hole;
    state.active_boosts = saved.active_boosts.clone();

    for saved_node in &saved.nodes {
        if let Some(node) = state.nodes.iter_mut().find(|n| n.id == saved_node.id) {
            node.level = saved_node.level;
            node.is_unlocked = saved_node.is_unlocked;
            node.production_rate = saved_node.production_rate;
        }
    }

    state.should_save = false;
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GlobalUpgradeKind;

    #[test]
    fn extract_then_migrate_round_trips() {
        let mut state = GameState::new();
        state.money = 12_345.5;
        state.cosmic_gems = 7.0;
        state.nodes[2].is_unlocked = true;
        state.nodes[2].level = NodeLevels { production: 4, value: 2 };
        state.nodes[2].production_rate = 1.03;
        state.loading_dock.stored.insert("voidIron".into(), 3);
        state.loading_dock.level = 3;
        state.black_hole.level = 5;
        state.should_save = true; // must not survive

        let saved = extract_save(&state, 1_000.0);
        let restored = migrate(&saved);

        assert_eq!(restored.money, state.money);
        assert_eq!(restored.cosmic_gems, state.cosmic_gems);
        assert_eq!(restored.nodes[2].level, state.nodes[2].level);
        assert_eq!(restored.nodes[2].production_rate, 1.03);
        assert_eq!(restored.loading_dock, state.loading_dock);
        assert_eq!(restored.black_hole, state.black_hole);
        assert!(!restored.should_save);
    }

    #[test]
    fn save_payload_has_no_dirty_flag() {
        let state = GameState::new();
        let saved = extract_save(&state, 0.0);
        let json = serde_json::to_value(&saved).unwrap();
        assert!(json.get("shouldSave").is_none());
        assert!(json.get("_shouldSave").is_none());
    }

    #[test]
    fn json_round_trip() {
        let mut state = GameState::new();
        state.active_boosts.insert(
            BoostKind::ClickPower,
            ActiveBoost {
                multiplier: 5.0,
                duration_ms: 15_000.0,
                ends_at: Some(42_000.0),
                cost: 75.0,
            },
        );
        let saved = extract_save(&state, 5.0);
        let json = serde_json::to_string(&saved).unwrap();
        let parsed: SavedGameState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, saved);
    }

    #[test]
    fn v1_document_backfills_missing_fields() {
        // A version-1 document: no cosmicGems, blackHole, activeBoosts,
        // hasManager or storageOptimization anywhere.
        let json = r#"{
            "version": 1,
            "money": 500.0,
            "nodes": [
                {"id": "node-0", "isUnlocked": true,
                 "level": {"production": 3, "value": 2}, "productionRate": 1.02}
            ],
            "loadingDock": {"capacity": 35, "stored": {"neutronium": 4}, "level": 2},
            "globalUpgrades": {
                "materialValue": {"level": 2, "multiplier": 1.05},
                "nodeEfficiency": {"level": 1, "multiplier": 1.0}
            }
        }"#;
        let saved: SavedGameState = serde_json::from_str(json).unwrap();
        let state = migrate(&saved);

        assert_eq!(state.cosmic_gems, 0.0);
        assert!(!state.loading_dock.has_manager);
        assert_eq!(state.black_hole, BlackHole::default());
        assert!(state.active_boosts.is_empty());
        assert_eq!(
            state.global_upgrades.track(GlobalUpgradeKind::StorageOptimization).level,
            1
        );
        // Persisted state still applied.
        assert_eq!(state.money, 500.0);
        assert_eq!(state.nodes[0].level.production, 3);
        assert_eq!(state.loading_dock.capacity, 35);
        assert_eq!(
            state.global_upgrades.track(GlobalUpgradeKind::MaterialValue).level,
            2
        );
    }

    #[test]
    fn migrate_prefers_canonical_metadata() {
        let mut saved = extract_save(&GameState::new(), 0.0);
        saved.nodes[1].is_unlocked = true;
        saved.nodes[1].level = NodeLevels { production: 9, value: 1 };

        let state = migrate(&saved);
        // Persisted dynamic state wins...
        assert!(state.nodes[1].is_unlocked);
        assert_eq!(state.nodes[1].level.production, 9);
        // ...canonical metadata wins.
        assert_eq!(state.nodes[1].name, "CryoSteel");
        assert_eq!(state.nodes[1].material.id, "cryosteel");
        assert_eq!(state.nodes[1].unlock_cost, 5623.0);
    }

    #[test]
    fn migrate_drops_unknown_nodes_and_defaults_missing_ones() {
        let mut saved = extract_save(&GameState::new(), 0.0);
        saved.nodes.truncate(2); // document predates the later nodes
        saved.nodes.push(SavedNode {
            id: "node-99".into(),
            production_rate: 5.0,
            is_unlocked: true,
            level: NodeLevels { production: 9, value: 9 },
        });

        let state = migrate(&saved);
        assert_eq!(state.nodes.len(), 16);
        assert!(state.node("node-99").is_none());
        // Nodes beyond the document come in at canonical defaults.
        assert!(!state.nodes[5].is_unlocked);
        assert_eq!(state.nodes[5].level, NodeLevels::default());
    }

    #[test]
    fn version_compatibility_window() {
        assert!(is_compatible(MIN_COMPATIBLE_VERSION));
        assert!(is_compatible(SAVE_VERSION));
        assert!(!is_compatible(0));
        assert!(!is_compatible(SAVE_VERSION + 1));
    }

    #[test]
    fn missing_version_field_defaults_to_v1() {
        let json = r#"{
            "money": 0.0,
            "nodes": [],
            "loadingDock": {"capacity": 25, "stored": {}, "level": 1}
        }"#;
        let saved: SavedGameState = serde_json::from_str(json).unwrap();
        assert_eq!(saved.version, 1);
    }

    #[test]
    fn boost_map_uses_camel_case_keys() {
        let mut state = GameState::new();
        state.active_boosts.insert(
            BoostKind::MaterialValue,
            ActiveBoost { multiplier: 2.0, duration_ms: 30_000.0, ends_at: None, cost: 25.0 },
        );
        let json = serde_json::to_value(extract_save(&state, 0.0)).unwrap();
        assert!(json["activeBoosts"].get("materialValue").is_some());
    }
}
