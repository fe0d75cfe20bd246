use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::{Edge, Seat};
use crate::tile::Tile;

/// Top-level error type for the domino engine
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineError {
    #[error("Tile error: {0}")]
    Tile(#[from] TileError),

    #[error("Not seat's turn: expected={expected}, attempted={attempted}")]
    NotYourTurn { expected: Seat, attempted: Seat },

    #[error("Illegal play in history: seat {seat} cannot glue {tile} on the {edge} edge")]
    IllegalPlay { seat: Seat, tile: Tile, edge: Edge },

    #[error("Seat {seat} does not hold {tile}")]
    TileNotInHand { seat: Seat, tile: Tile },

    #[error("Seat {seat} passed while holding a legal tile")]
    IllegalPass { seat: Seat },

    #[error("Invalid seat {value}: must be between 1 and 4")]
    InvalidSeat { value: u8 },

    #[error("Invalid edge {value:?}: expected left/esquerda or right/direita")]
    InvalidEdge { value: String },

    #[error("Session not found: {id}")]
    SessionNotFound { id: String },

    #[error("Configuration error: {details}")]
    Config { details: String },
}

/// Tile construction errors, raised at the notation boundary only
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileError {
    #[error("Tile out of range: {left}-{right}")]
    OutOfRange { left: u8, right: u8 },

    #[error("Cannot parse tile: {input:?}")]
    Malformed { input: String },
}

/// Result type aliases for convenience
pub type EngineResult<T> = Result<T, EngineError>;
pub type TileResult<T> = Result<T, TileError>;

/// Helper methods for creating common errors
impl EngineError {
    pub fn not_your_turn(expected: Seat, attempted: Seat) -> Self {
        Self::NotYourTurn {
            expected,
            attempted,
        }
    }

    pub fn illegal_play(seat: Seat, tile: Tile, edge: Edge) -> Self {
        Self::IllegalPlay { seat, tile, edge }
    }

    pub fn invalid_edge(value: impl Into<String>) -> Self {
        Self::InvalidEdge {
            value: value.into(),
        }
    }

    pub fn config(details: impl Into<String>) -> Self {
        Self::Config {
            details: details.into(),
        }
    }

    /// True for the conditions the boundary reports as bad input.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::Tile(_)
                | Self::IllegalPlay { .. }
                | Self::InvalidSeat { .. }
                | Self::InvalidEdge { .. }
        )
    }
}

impl TileError {
    pub fn malformed(input: impl Into<String>) -> Self {
        Self::Malformed {
            input: input.into(),
        }
    }
}
