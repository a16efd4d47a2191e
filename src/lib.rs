//! Core simulation for Cosmo Company, an idle space-mining game.
//!
//! The crate is a pure game core with no rendering: production nodes mine
//! materials into a loading dock, sales convert them to money, money buys
//! upgrades, and a black hole converts clicks into money and cosmic gems.
//!
//! Architecture in one pass:
//! - [`state`] holds the data model and the canonical material/node catalog.
//! - [`actions`] is the closed set of state transitions.
//! - [`logic::reduce`] applies one action to a state, pure and total.
//! - [`economy`] holds every pricing and production formula.
//! - [`scheduler`] turns elapsed wall-clock time into actions.
//! - [`save`] / [`store`] persist and migrate saved games.
//! - [`game`] wires it all into a session the host drives with timestamps.

pub mod actions;
pub mod economy;
pub mod format;
pub mod game;
pub mod logic;
pub mod save;
pub mod scheduler;
pub mod state;
pub mod store;

pub use actions::GameAction;
pub use game::Game;
pub use logic::reduce;
pub use state::GameState;
