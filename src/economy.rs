//! Economic formula library: pure functions, fully testable.
//!
//! Every cost curve, multiplier and threshold in the game lives here, with no
//! state of its own. Costs are floored to whole numbers (returned as `f64`,
//! matching the currency representation); currency totals stay floating-point.

use crate::state::{BoostKind, GameState, GlobalUpgradeKind, UpgradeKind};

/// Auto-clicker level cap.
pub const MAX_AUTO_CLICKER_LEVEL: u32 = 6;

/// Auto-clicker rate cap in clicks per second.
pub const MAX_AUTO_CLICKS_PER_SECOND: f64 = 32.0;

/// Price of the loading dock manager (enables auto-sell-on-full).
pub const DOCK_MANAGER_COST: f64 = 500_000.0;

/// Sale value required per cosmic gem earned from selling.
pub const GEMS_SALE_THRESHOLD: f64 = 250_000.0;

/// Black hole clicks required per cosmic gem.
pub const CLICKS_PER_GEM: u64 = 750;

/// Cost to unlock the node at `index` (0-based). Node 0 costs 1000; each
/// later node raises the exponent by 0.25.
pub fn unlock_cost(index: usize) -> f64 {
    1000f64.powf(1.0 + index as f64 * 0.25).floor()
}

/// Cost of the next level on either node track. The base doubles per node
/// index and scales 1.5x per level already owned.
pub fn node_upgrade_cost(index: usize, current_level: u32) -> f64 {
    let base = 15.0 * 2f64.powi(index as i32);
    (base * 1.5f64.powi(current_level as i32 - 1)).floor()
}

/// Cost of the next loading dock level.
pub fn dock_upgrade_cost(dock_level: u32) -> f64 {
    (100.0 * 1.5f64.powi(dock_level as i32 - 1)).floor()
}

/// Cost of the next level on a global upgrade track.
pub fn global_upgrade_cost(current_level: u32) -> f64 {
    (10_000.0 * 2f64.powi(current_level as i32 - 1)).floor()
}

/// The multiplier a track carries after upgrading from `current_level`.
/// Storage optimization grows 10% per level, the other tracks 5%.
pub fn global_multiplier(kind: GlobalUpgradeKind, current_level: u32) -> f64 {
    let per_level = match kind {
        GlobalUpgradeKind::StorageOptimization => 0.10,
        _ => 0.05,
    };
    1.0 + current_level as f64 * per_level
}

/// Sale-value multiplier from a node's value level: +15% per level past 1.
pub fn node_value_multiplier(value_level: u32) -> f64 {
    1.0 + (value_level as f64 - 1.0) * 0.15
}

/// Intrinsic speed of the node at `index`: each node is 1.5x slower than the
/// previous one.
pub fn node_base_speed(index: usize) -> f64 {
    7.0 / 1.5f64.powi(index as i32)
}

/// Progress (percent) a node gains per millisecond, with the global
/// efficiency track and any active speed boost applied.
pub fn production_per_ms(state: &GameState, index: usize, now_ms: f64) -> f64 {
    let node = &state.nodes[index];
    let efficiency = state.global_upgrades.node_efficiency.multiplier;
    let speed_boost = state.boost_multiplier(BoostKind::ProductionSpeed, now_ms);
    node.production_rate
        * node.level.production as f64
        * node_base_speed(index)
        * efficiency
        * speed_boost
        / 1000.0
}

/// Production rate scalar after reaching `production_level` on the speed
/// track: +1% per level past 1.
pub fn production_rate_for_level(production_level: u32) -> f64 {
    1.0 + (production_level as f64 - 1.0) * 0.01
}

/// Money from one black hole click before boosts.
pub fn click_value(black_hole_level: u32) -> f64 {
    (10.0 * 1.5f64.powi(black_hole_level as i32 - 1)).floor()
}

/// Cost of the next black hole level.
pub fn black_hole_upgrade_cost(black_hole_level: u32) -> f64 {
    (1000.0 * 2f64.powi(black_hole_level as i32 - 1)).floor()
}

/// Cost of the next auto-clicker level. The first purchase is flat; later
/// levels double from there.
pub fn auto_clicker_cost(current_level: u32) -> f64 {
    if current_level == 0 {
        5_000_000.0
    } else {
        (5_000_000.0 * 2f64.powi(current_level as i32)).floor()
    }
}

/// Auto-clicker rate at `level`, clipped to the rate cap. Level 0 (not
/// purchased) never clicks.
pub fn auto_clicker_clicks_per_second(level: u32) -> f64 {
    if level == 0 {
        0.0
    } else {
        2f64.powi(level as i32 - 1).min(MAX_AUTO_CLICKS_PER_SECOND)
    }
}

/// Payload boost on sale value from the dock level: +1% per level past 1.
pub fn payload_boost(dock_level: u32) -> f64 {
    1.0 + (dock_level as f64 - 1.0) * 0.01
}

/// Cosmic gems earned from a sale worth `boosted_value`.
pub fn gems_from_sale(boosted_value: f64) -> f64 {
    (boosted_value / GEMS_SALE_THRESHOLD).floor()
}

/// Gems earned by moving the lifetime click counter from `old_count` to
/// `new_count`: one per 750-click threshold crossed, however many that is.
pub fn gems_for_clicks(old_count: u64, new_count: u64) -> u64 {
    new_count / CLICKS_PER_GEM - old_count / CLICKS_PER_GEM
}

/// Cost of the node upgrade the player would buy next.
pub fn node_upgrade_cost_for(state: &GameState, index: usize, kind: UpgradeKind) -> f64 {
    let level = match kind {
        UpgradeKind::Production => state.nodes[index].level.production,
        UpgradeKind::Value => state.nodes[index].level.value,
    };
    node_upgrade_cost(index, level)
}
