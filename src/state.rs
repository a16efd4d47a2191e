//! Cosmo Company game state definitions.
//!
//! The canonical data model: the material catalog, production nodes, the
//! loading dock, global upgrade tracks, the black hole, and the `GameState`
//! aggregate that the reducer owns. Presentation layers get a read-only view
//! of this and nothing else.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::economy;

/// A catalog entry: something a node can produce and the dock can hold.
/// The catalog is fixed at compile time and never mutated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub id: &'static str,
    pub name: &'static str,
    pub base_value: f64,
    /// Color tag used by the presentation layer.
    pub color: &'static str,
}

/// All materials in node order. Node `i` always produces `MATERIALS[i]`.
pub const MATERIALS: [Material; 16] = [
    Material { id: "neutronium", name: "Neutronium", base_value: 10.0, color: "cyan" },
    Material { id: "cryosteel", name: "CryoSteel", base_value: 25.0, color: "blue" },
    Material { id: "voidIron", name: "Void Iron", base_value: 35.0, color: "indigo" },
    Material { id: "stellarAlloy", name: "Stellar Alloy", base_value: 45.0, color: "sky" },
    Material { id: "plasmaCore", name: "Plasma Core", base_value: 60.0, color: "purple" },
    Material { id: "darkMatter", name: "Dark Matter", base_value: 80.0, color: "fuchsia" },
    Material { id: "antimatter", name: "Antimatter", base_value: 90.0, color: "pink" },
    Material { id: "quantumDust", name: "Quantum Dust", base_value: 100.0, color: "green" },
    Material { id: "cosmicShard", name: "Cosmic Shard", base_value: 250.0, color: "amber" },
    Material { id: "timeEssence", name: "Time Essence", base_value: 500.0, color: "orange" },
    Material { id: "voidCrystal", name: "Void Crystal", base_value: 800.0, color: "violet" },
    Material { id: "starEssence", name: "Star Essence", base_value: 1200.0, color: "yellow" },
    Material { id: "realityFragment", name: "Reality Fragment", base_value: 1800.0, color: "rose" },
    Material { id: "eternityMatter", name: "Eternity Matter", base_value: 2500.0, color: "emerald" },
    Material { id: "infinityDust", name: "Infinity Dust", base_value: 3500.0, color: "teal" },
    Material { id: "omnipotenceOrb", name: "Omnipotence Orb", base_value: 5000.0, color: "red" },
];

/// Which track of a node is being upgraded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeKind {
    Production,
    Value,
}

/// Account-wide upgrade tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GlobalUpgradeKind {
    MaterialValue,
    NodeEfficiency,
    StorageOptimization,
}

impl GlobalUpgradeKind {
    /// All tracks in display order.
    pub fn all() -> &'static [GlobalUpgradeKind] {
        &[
            GlobalUpgradeKind::MaterialValue,
            GlobalUpgradeKind::NodeEfficiency,
            GlobalUpgradeKind::StorageOptimization,
        ]
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            GlobalUpgradeKind::MaterialValue => "Material Value",
            GlobalUpgradeKind::NodeEfficiency => "Node Efficiency",
            GlobalUpgradeKind::StorageOptimization => "Storage Optimization",
        }
    }
}

/// Time-limited multipliers purchased with cosmic gems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoostKind {
    MaterialValue,
    ProductionSpeed,
    ClickPower,
}

impl BoostKind {
    /// All boost kinds in display order.
    pub fn all() -> &'static [BoostKind] {
        &[
            BoostKind::MaterialValue,
            BoostKind::ProductionSpeed,
            BoostKind::ClickPower,
        ]
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            BoostKind::MaterialValue => "2X Material Value",
            BoostKind::ProductionSpeed => "3X Production Speed",
            BoostKind::ClickPower => "5X Click Power",
        }
    }

    /// Multiplier applied while the boost is active.
    pub fn multiplier(&self) -> f64 {
        match self {
            BoostKind::MaterialValue => 2.0,
            BoostKind::ProductionSpeed => 3.0,
            BoostKind::ClickPower => 5.0,
        }
    }

    /// How long an activation lasts, in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        match self {
            BoostKind::MaterialValue => 30_000.0,
            BoostKind::ProductionSpeed => 20_000.0,
            BoostKind::ClickPower => 15_000.0,
        }
    }

    /// Price in cosmic gems.
    pub fn cost(&self) -> f64 {
        match self {
            BoostKind::MaterialValue => 25.0,
            BoostKind::ProductionSpeed => 50.0,
            BoostKind::ClickPower => 75.0,
        }
    }
}

/// One running boost. At most one instance per `BoostKind`; re-activating an
/// unexpired boost is rejected, not extended.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBoost {
    pub multiplier: f64,
    pub duration_ms: f64,
    /// Wall-clock expiry (ms). `None` never happens for boosts the reducer
    /// creates but old saves may carry it.
    pub ends_at: Option<f64>,
    pub cost: f64,
}

impl ActiveBoost {
    /// Whether the boost is still running at `now_ms`.
    pub fn is_active(&self, now_ms: f64) -> bool {
        matches!(self.ends_at, Some(t) if t > now_ms)
    }
}

/// Upgrade levels of a single node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLevels {
    pub production: u32,
    pub value: u32,
}

impl Default for NodeLevels {
    fn default() -> Self {
        NodeLevels { production: 1, value: 1 }
    }
}

/// A production slot bound to exactly one material.
///
/// All sixteen nodes exist from game start; only `is_unlocked`, the levels and
/// `production_rate` ever change.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub material: Material,
    pub production_rate: f64,
    pub is_unlocked: bool,
    pub unlock_cost: f64,
    pub level: NodeLevels,
}

impl Node {
    fn at_index(index: usize) -> Self {
        let material = MATERIALS[index];
        Node {
            id: format!("node-{index}"),
            name: material.name.to_string(),
            material,
            production_rate: 1.0,
            is_unlocked: index == 0,
            unlock_cost: economy::unlock_cost(index),
            level: NodeLevels::default(),
        }
    }
}

/// Capacity-limited buffer for produced materials pending sale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingDock {
    pub capacity: u32,
    /// material id → stored count. Keys may linger at zero.
    pub stored: BTreeMap<String, u32>,
    pub level: u32,
    #[serde(default)]
    pub has_manager: bool,
}

impl Default for LoadingDock {
    fn default() -> Self {
        LoadingDock {
            capacity: 25,
            stored: BTreeMap::new(),
            level: 1,
            has_manager: false,
        }
    }
}

impl LoadingDock {
    /// Total units currently stored across all materials.
    pub fn total_stored(&self) -> u32 {
        self.stored.values().sum()
    }

    /// Whether the dock has no room left.
    pub fn is_full(&self) -> bool {
        self.total_stored() >= self.capacity
    }
}

/// One global upgrade track.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTrack {
    pub level: u32,
    pub multiplier: f64,
}

impl Default for UpgradeTrack {
    fn default() -> Self {
        UpgradeTrack { level: 1, multiplier: 1.0 }
    }
}

/// The three account-wide upgrade tracks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalUpgrades {
    #[serde(default)]
    pub material_value: UpgradeTrack,
    #[serde(default)]
    pub node_efficiency: UpgradeTrack,
    /// Added after launch; old saves are backfilled with the default.
    #[serde(default)]
    pub storage_optimization: UpgradeTrack,
}

impl GlobalUpgrades {
    pub fn track(&self, kind: GlobalUpgradeKind) -> &UpgradeTrack {
        match kind {
            GlobalUpgradeKind::MaterialValue => &self.material_value,
            GlobalUpgradeKind::NodeEfficiency => &self.node_efficiency,
            GlobalUpgradeKind::StorageOptimization => &self.storage_optimization,
        }
    }

    pub fn track_mut(&mut self, kind: GlobalUpgradeKind) -> &mut UpgradeTrack {
        match kind {
            GlobalUpgradeKind::MaterialValue => &mut self.material_value,
            GlobalUpgradeKind::NodeEfficiency => &mut self.node_efficiency,
            GlobalUpgradeKind::StorageOptimization => &mut self.storage_optimization,
        }
    }
}

/// The black hole auto-clicker. Level 0 means not purchased.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoClicker {
    pub level: u32,
    pub clicks_per_second: f64,
}

impl Default for AutoClicker {
    fn default() -> Self {
        AutoClicker { level: 0, clicks_per_second: 0.0 }
    }
}

/// Secondary click-based income mechanic.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlackHole {
    pub level: u32,
    #[serde(default)]
    pub auto_clicker: AutoClicker,
}

impl Default for BlackHole {
    fn default() -> Self {
        BlackHole { level: 1, auto_clicker: AutoClicker::default() }
    }
}

/// The aggregate root. Owned exclusively by the reducer; everything else holds
/// a read reference and an action-dispatch capability.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub money: f64,
    pub cosmic_gems: f64,
    pub nodes: Vec<Node>,
    pub loading_dock: LoadingDock,
    pub global_upgrades: GlobalUpgrades,
    pub black_hole: BlackHole,
    pub active_boosts: BTreeMap<BoostKind, ActiveBoost>,
    /// Transient dirty flag: unsaved changes pending persistence. Never part
    /// of the persisted payload.
    pub should_save: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Fresh game: no money, node 0 unlocked, empty dock.
    pub fn new() -> Self {
        GameState {
            money: 0.0,
            cosmic_gems: 0.0,
            nodes: (0..MATERIALS.len()).map(Node::at_index).collect(),
            loading_dock: LoadingDock::default(),
            global_upgrades: GlobalUpgrades::default(),
            black_hole: BlackHole::default(),
            active_boosts: BTreeMap::new(),
            should_save: false,
        }
    }

    /// Position of a node in the fixed node ordering.
    pub fn node_index(&self, node_id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == node_id)
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    /// The composed multiplier for a boost kind: its multiplier while
    /// unexpired at `now_ms`, otherwise 1.0.
    pub fn boost_multiplier(&self, kind: BoostKind, now_ms: f64) -> f64 {
        match self.active_boosts.get(&kind) {
            Some(b) if b.is_active(now_ms) => b.multiplier,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_sixteen_materials() {
        assert_eq!(MATERIALS.len(), 16);
        assert_eq!(MATERIALS[0].id, "neutronium");
        assert!((MATERIALS[0].base_value - 10.0).abs() < f64::EPSILON);
        assert_eq!(MATERIALS[15].id, "omnipotenceOrb");
    }

    #[test]
    fn nodes_align_with_materials() {
        let state = GameState::new();
        assert_eq!(state.nodes.len(), MATERIALS.len());
        for (i, node) in state.nodes.iter().enumerate() {
            assert_eq!(node.id, format!("node-{i}"));
            assert_eq!(node.material.id, MATERIALS[i].id);
            assert_eq!(node.name, MATERIALS[i].name);
        }
    }

    #[test]
    fn only_first_node_starts_unlocked() {
        let state = GameState::new();
        assert!(state.nodes[0].is_unlocked);
        assert!(state.nodes[1..].iter().all(|n| !n.is_unlocked));
    }

    #[test]
    fn fresh_state_defaults() {
        let state = GameState::new();
        assert_eq!(state.money, 0.0);
        assert_eq!(state.cosmic_gems, 0.0);
        assert_eq!(state.loading_dock.capacity, 25);
        assert_eq!(state.loading_dock.level, 1);
        assert!(!state.loading_dock.has_manager);
        assert_eq!(state.black_hole.level, 1);
        assert_eq!(state.black_hole.auto_clicker.level, 0);
        assert!(state.active_boosts.is_empty());
        assert!(!state.should_save);
    }

    #[test]
    fn unlock_costs_grow_with_index() {
        let state = GameState::new();
        assert_eq!(state.nodes[0].unlock_cost, 1000.0);
        for pair in state.nodes.windows(2) {
            assert!(pair[1].unlock_cost > pair[0].unlock_cost);
        }
    }

    #[test]
    fn dock_total_and_full() {
        let mut dock = LoadingDock::default();
        assert_eq!(dock.total_stored(), 0);
        assert!(!dock.is_full());
        dock.stored.insert("neutronium".into(), 20);
        dock.stored.insert("cryosteel".into(), 5);
        assert_eq!(dock.total_stored(), 25);
        assert!(dock.is_full());
    }

    #[test]
    fn boost_activity_window() {
        let boost = ActiveBoost {
            multiplier: 2.0,
            duration_ms: 30_000.0,
            ends_at: Some(1_000.0),
            cost: 25.0,
        };
        assert!(boost.is_active(999.0));
        assert!(!boost.is_active(1_000.0));
        let never = ActiveBoost { ends_at: None, ..boost };
        assert!(!never.is_active(0.0));
    }

    #[test]
    fn boost_multiplier_defaults_to_one() {
        let state = GameState::new();
        assert_eq!(state.boost_multiplier(BoostKind::MaterialValue, 0.0), 1.0);
    }

    #[test]
    fn global_track_accessors_agree() {
        let mut upgrades = GlobalUpgrades::default();
        upgrades.track_mut(GlobalUpgradeKind::StorageOptimization).level = 3;
        assert_eq!(upgrades.track(GlobalUpgradeKind::StorageOptimization).level, 3);
        assert_eq!(upgrades.track(GlobalUpgradeKind::MaterialValue).level, 1);
    }
}
