//! Delta-time production scheduler.
//!
//! The host calls `tick()` at whatever cadence it likes (a render loop, a
//! fixed timer); the scheduler integrates real elapsed wall-clock time since
//! its own previous tick, so simulation speed is independent of call rate.
//! It only reads state and emits actions; the reducer stays the single
//! writer.
//!
//! There is deliberately no catch-up cap: a large gap (backgrounded tab)
//! applies as-is, which still yields at most one production unit per node
//! because the progress accumulator resets on emit.

use crate::actions::GameAction;
use crate::economy;
use crate::state::{GameState, MATERIALS};

/// Lifetime black hole click counter. Shared by manual clicks and the
/// auto-clicker so gem thresholds apply to the combined count. Session-local;
/// not persisted.
#[derive(Debug, Default)]
pub struct ClickCounter {
    total: u64,
}

impl ClickCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `clicks` clicks and return the cosmic gems earned by the
    /// thresholds crossed (handles several thresholds in one call).
    pub fn record(&mut self, clicks: u64) -> u32 {
        let old = self.total;
        self.total += clicks;
        economy::gems_for_clicks(old, self.total) as u32
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Per-node production accumulators plus the auto-clicker accumulator.
///
/// Each unlocked node accumulates percent progress; crossing 100 emits one
/// `ProduceMaterial` and resets the accumulator to zero; the excess is
/// dropped, not carried. The auto-clicker instead carries its fractional
/// remainder, because clicks are events, not progress toward a single unit.
pub struct ProductionScheduler {
    /// Percent progress (0..100) toward the next unit, per node index.
    node_progress: Vec<f64>,
    /// Fractional pending auto-clicks.
    pending_clicks: f64,
    /// Timestamp of the previous tick (ms); `None` before the first tick.
    last_tick_ms: Option<f64>,
}

impl Default for ProductionScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductionScheduler {
    pub fn new() -> Self {
        ProductionScheduler {
            node_progress: vec![0.0; MATERIALS.len()],
            pending_clicks: 0.0,
            last_tick_ms: None,
        }
    }

    /// Drop all accumulated progress and re-baseline the clock at `now_ms`.
    /// Called after a snapshot load so stale progress never leaks into the
    /// loaded game.
    pub fn reset(&mut self, now_ms: f64) {
        for p in &mut self.node_progress {
            *p = 0.0;
        }
        self.pending_clicks = 0.0;
        self.last_tick_ms = Some(now_ms);
    }

    /// Display-only: current percent progress of a node.
    pub fn progress(&self, index: usize) -> f64 {
        self.node_progress.get(index).copied().unwrap_or(0.0)
    }

    /// Advance to `now_ms` and return the actions the elapsed time produced,
    /// in dispatch order. The first call only establishes the baseline.
    pub fn tick(
        &mut self,
        state: &GameState,
        clicks: &mut ClickCounter,
        now_ms: f64,
    ) -> Vec<GameAction> {
        let delta_ms = match self.last_tick_ms {
            Some(prev) => (now_ms - prev).max(0.0),
            None => {
                self.last_tick_ms = Some(now_ms);
                return Vec::new();
            }
        };
        self.last_tick_ms = Some(now_ms);

        let mut actions = Vec::new();

        // Auto-sell first so freshly produced units find room.
        if state.loading_dock.has_manager && state.loading_dock.is_full() {
            actions.push(GameAction::SellMaterials { now_ms });
        }

        for (index, node) in state.nodes.iter().enumerate() {
            if !node.is_unlocked {
                self.node_progress[index] = 0.0;
                continue;
            }
            let per_ms = economy::production_per_ms(state, index, now_ms);
            self.node_progress[index] += per_ms * delta_ms;
            if self.node_progress[index] >= 100.0 {
                actions.push(GameAction::ProduceMaterial {
                    node_id: node.id.clone(),
                    amount: 1,
                });
                self.node_progress[index] = 0.0;
            }
        }

        let cps = state
            .black_hole
            .auto_clicker
            .clicks_per_second
            .min(economy::MAX_AUTO_CLICKS_PER_SECOND);
        if cps > 0.0 {
            self.pending_clicks += cps * delta_ms / 1000.0;
            let whole = self.pending_clicks.floor();
            self.pending_clicks -= whole;
            for _ in 0..whole as u64 {
                let gems_earned = clicks.record(1);
                actions.push(GameAction::ClickBlackHole { gems_earned, now_ms });
            }
        }

        actions
    }
}
