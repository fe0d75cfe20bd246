// Domino Engine Library - Core Module Organization
//
// Decision engine for four-player partnership dominoes: given one seat's
// view of a hand it picks the tile and edge to play, or passes.

// Core data structures
pub mod enums;
pub mod errors;
pub mod state;
pub mod table;
pub mod tile;

// Decision making
pub mod config;
pub mod endgame;
pub mod heuristics;
pub mod knowledge;
pub mod session;
pub mod tracker;

// Simulation
pub mod game;
pub mod players;

// Server implementation
pub mod server;
pub mod wire;

// Re-export common types for convenient access
pub use crate::config::EngineConfig;
pub use crate::enums::{Edge, Seat};
pub use crate::errors::{EngineError, EngineResult};
pub use crate::players::DominoPlayer;
pub use crate::session::EngineSession;
pub use crate::state::{GameSnapshot, Move, Play};
pub use crate::table::Table;
pub use crate::tile::{PlacedTile, Tile};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
