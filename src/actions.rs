//! The closed set of game actions.
//!
//! The presentation layer drives the game exclusively through these variants;
//! the reducer in `logic.rs` matches on them exhaustively. Actions whose
//! outcome depends on wall-clock time carry `now_ms` in the payload so the
//! reducer itself never reads a clock.

use crate::state::{BoostKind, GameState, GlobalUpgradeKind, UpgradeKind};

#[derive(Clone, Debug, PartialEq)]
pub enum GameAction {
    /// A node finished a production cycle; store up to `amount` units.
    ProduceMaterial { node_id: String, amount: u32 },
    /// Sell everything in the loading dock.
    SellMaterials { now_ms: f64 },
    /// Buy the next level on one of a node's two tracks.
    UpgradeNode { node_id: String, kind: UpgradeKind },
    /// Pay a locked node's unlock cost.
    UnlockNode { node_id: String },
    /// Buy the next loading dock level.
    UpgradeDock,
    /// Buy the next level on a global upgrade track.
    UpgradeGlobal { kind: GlobalUpgradeKind },
    /// Buy the dock manager (one-time purchase, enables auto-sell).
    PurchaseDockManager,
    /// One black hole click. `gems_earned` is computed by the click counter
    /// that observed the click (threshold crossings of the lifetime count).
    ClickBlackHole { gems_earned: u32, now_ms: f64 },
    /// Buy the next black hole level.
    UpgradeBlackHole,
    /// Buy the next auto-clicker level (capped).
    UpgradeBlackHoleAutoClicker,
    /// Spend gems to activate a boost. Re-activating an unexpired boost of
    /// the same kind is rejected.
    ActivateBoost { kind: BoostKind, cost: f64, now_ms: f64 },
    /// Replace the entire state with a loaded snapshot.
    LoadGameState(Box<GameState>),
    /// Persistence completed; clear the dirty flag.
    SaveGameState,
}
