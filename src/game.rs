//! Composition root: wires the reducer, scheduler, click counter and store
//! into one session.
//!
//! The host owns a `Game` and drives it with wall-clock timestamps:
//! `load()` once, then `tick()` from its loop, `click_black_hole()` on input,
//! `maybe_save()` periodically and `flush()` on teardown. All persistence is
//! best-effort; a failed save leaves the dirty flag set so the next
//! `maybe_save()` retries.

use log::{info, warn};

use crate::actions::GameAction;
use crate::logic::reduce;
use crate::save::{self, SavedGameState};
use crate::scheduler::{ClickCounter, ProductionScheduler};
use crate::state::GameState;
use crate::store::GameStore;

pub struct Game {
    state: GameState,
    scheduler: ProductionScheduler,
    clicks: ClickCounter,
    store: Box<dyn GameStore>,
    user_id: String,
    /// This session's fencing token; a strictly newer one in the store means
    /// another tab took over.
    session_token: String,
    is_loading: bool,
    signed_out: bool,
}

impl Game {
    /// Create a session for `user_id`. `now_ms` becomes the session token,
    /// so tokens from the same clock order sessions by start time.
    pub fn new(store: Box<dyn GameStore>, user_id: &str, now_ms: f64) -> Self {
        Game {
            state: GameState::new(),
            scheduler: ProductionScheduler::new(),
            clicks: ClickCounter::new(),
            store,
            user_id: user_id.to_owned(),
            session_token: format!("{now_ms}"),
            is_loading: true,
            signed_out: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn scheduler(&self) -> &ProductionScheduler {
        &self.scheduler
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Whether a newer session has taken over and this one went inert.
    pub fn signed_out(&self) -> bool {
        self.signed_out
    }

    /// Register this session, then load and migrate the saved game. A missing
    /// or unreadable save starts a fresh game; an incompatible version does
    /// too (losing the save beats refusing to start). After a successful
    /// migration the normalized document is written back so the next load
    /// skips the backfill.
    pub fn load(&mut self, now_ms: f64) {
        if let Err(err) = self.store.register_session(&self.user_id, &self.session_token) {
            warn!("session registration failed: {err}");
        }

        match self.store.load(&self.user_id) {
            Ok(Some(saved)) if save::is_compatible(saved.version) => {
                let needs_write_back = saved.version < save::SAVE_VERSION;
                let state = save::migrate(&saved);
                self.dispatch(GameAction::LoadGameState(Box::new(state)));
                if needs_write_back {
                    info!("migrated save v{} -> v{}", saved.version, save::SAVE_VERSION);
                    if let Err(err) = self.write_save(now_ms) {
                        warn!("post-migration write-back failed: {err}");
                    }
                }
            }
            Ok(Some(saved)) => {
                warn!("save version {} outside compatible window, starting fresh", saved.version);
                self.dispatch(GameAction::LoadGameState(Box::new(GameState::new())));
            }
            Ok(None) => {
                self.dispatch(GameAction::LoadGameState(Box::new(GameState::new())));
            }
            Err(err) => {
                warn!("loading save failed, starting fresh: {err}");
                self.dispatch(GameAction::LoadGameState(Box::new(GameState::new())));
            }
        }

        self.scheduler.reset(now_ms);
        self.is_loading = false;
    }

    /// Apply one action through the reducer, unless a newer session has
    /// taken over, in which case the action is dropped and the session goes
    /// inert.
    pub fn dispatch(&mut self, action: GameAction) {
        if self.signed_out {
            return;
        }
        if self.session_is_stale() {
            info!("newer session detected, signing out");
            self.signed_out = true;
            return;
        }
        self.state = reduce(&self.state, &action);
    }

    /// Tokens are decimal milliseconds; compare numerically so "999.0" does
    /// not out-rank "1000.0". An unparseable stored token is ignored. Store
    /// errors also leave the session current: fencing is advisory and must
    /// not take the game down.
    fn session_is_stale(&self) -> bool {
        let latest = match self.store.latest_session(&self.user_id) {
            Ok(Some(token)) => token,
            Ok(None) => return false,
            Err(err) => {
                warn!("session check failed: {err}");
                return false;
            }
        };
        match (latest.parse::<f64>(), self.session_token.parse::<f64>()) {
            (Ok(theirs), Ok(ours)) => theirs > ours,
            _ => false,
        }
    }

    /// Advance the simulation to `now_ms` and apply whatever the elapsed
    /// time produced.
    pub fn tick(&mut self, now_ms: f64) {
        if self.is_loading || self.signed_out {
            return;
        }
        for action in self.scheduler.tick(&self.state, &mut self.clicks, now_ms) {
            self.dispatch(action);
        }
    }

    /// A manual black hole click. Gem thresholds run through the same
    /// counter the auto-clicker uses.
    pub fn click_black_hole(&mut self, now_ms: f64) {
        let gems_earned = self.clicks.record(1);
        self.dispatch(GameAction::ClickBlackHole { gems_earned, now_ms });
    }

    /// Persist if the state is dirty. On success the dirty flag clears; on
    /// failure it stays set and the next call retries.
    pub fn maybe_save(&mut self, now_ms: f64) {
        if !self.state.should_save || self.is_loading || self.signed_out {
            return;
        }
        match self.write_save(now_ms) {
            Ok(true) => self.dispatch(GameAction::SaveGameState),
            Ok(false) => {
                // Remote copy is newer; our write was skipped. Clear the flag
                // anyway, retrying would lose the same race.
                info!("save skipped, remote copy is newer");
                self.dispatch(GameAction::SaveGameState);
            }
            Err(err) => warn!("save failed, will retry: {err}"),
        }
    }

    /// Unconditional best-effort save for teardown (tab close, app exit).
    pub fn flush(&mut self, now_ms: f64) {
        if self.is_loading || self.signed_out {
            return;
        }
        if let Err(err) = self.write_save(now_ms) {
            warn!("final save failed: {err}");
        }
    }

    /// Write the current state unless the remote document carries a strictly
    /// newer client timestamp (another writer won). Returns whether the
    /// write happened.
    fn write_save(&mut self, now_ms: f64) -> Result<bool, crate::store::StoreError> {
        if let Some(remote) = self.store.load(&self.user_id)? {
            if remote.client_timestamp > now_ms {
                return Ok(false);
            }
        }
        let saved: SavedGameState = save::extract_save(&self.state, now_ms);
        self.store.save(&self.user_id, &saved)?;
        Ok(true)
    }
}
