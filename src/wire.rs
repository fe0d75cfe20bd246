// JSON wire format
//
// Field names follow the public API the engine is deployed behind:
// `jogador` (seat), `mao` (hand), `mesa` (table), `jogadas` (plays),
// `pedra` (tile) and `lado` (edge).

use serde::{Deserialize, Serialize};

use crate::enums::{Edge, Seat};
use crate::errors::{EngineError, EngineResult};
use crate::state::{GameSnapshot, Move, Play};
use crate::tile::{PlacedTile, Tile, TileSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateRequest {
    #[serde(rename = "jogador")]
    pub seat: u8,
    #[serde(rename = "mao", default)]
    pub hand: Vec<String>,
    /// Informational; the table is rebuilt from `plays`.
    #[serde(rename = "mesa", default)]
    pub table: Vec<String>,
    #[serde(rename = "jogadas", default)]
    pub plays: Vec<PlayRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRequest {
    #[serde(rename = "jogador")]
    pub seat: u8,
    #[serde(rename = "pedra")]
    pub tile: String,
    #[serde(rename = "lado", default)]
    pub edge: String,
}

/// `pedra` and `lado` are both null for a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayResponse {
    #[serde(rename = "jogador")]
    pub seat: u8,
    #[serde(rename = "pedra")]
    pub tile: Option<String>,
    #[serde(rename = "lado")]
    pub edge: Option<String>,
}

/// Edges are read by their first letter, any case: `esquerda`/`left` or
/// `direita`/`right`. A missing `lado` (the opening play) reads as left.
pub fn parse_edge(raw: &str) -> EngineResult<Edge> {
    let trimmed = raw.trim();
    match trimmed.chars().next().map(|c| c.to_ascii_lowercase()) {
        None | Some('e') | Some('l') => Ok(Edge::Left),
        Some('d') | Some('r') => Ok(Edge::Right),
        Some(_) => Err(EngineError::invalid_edge(trimmed)),
    }
}

pub fn edge_label(edge: Edge) -> &'static str {
    match edge {
        Edge::Left => "esquerda",
        Edge::Right => "direita",
    }
}

fn parse_tiles(raw: &[String]) -> EngineResult<Vec<Tile>> {
    raw.iter()
        .map(|s| s.parse::<Tile>().map_err(EngineError::from))
        .collect()
}

impl PlayRequest {
    pub fn to_play(&self) -> EngineResult<Play> {
        let seat = Seat::try_from(self.seat)?;
        let tile: Tile = self.tile.parse()?;
        Ok(Play::new(seat, PlacedTile::opening(tile, parse_edge(&self.edge)?)))
    }
}

impl GameStateRequest {
    /// Validates every field and replays the plays into a table.
    pub fn to_snapshot(&self) -> EngineResult<GameSnapshot> {
        let seat = Seat::try_from(self.seat)?;
        let hand = parse_tiles(&self.hand)?;
        let table = parse_tiles(&self.table)?;
        let plays = self
            .plays
            .iter()
            .map(PlayRequest::to_play)
            .collect::<EngineResult<Vec<Play>>>()?;

        let snapshot = GameSnapshot::from_plays(seat, hand, plays)?;
        if !table.is_empty() && TileSet::from_tiles(&table) != snapshot.table.played() {
            log::warn!(
                "Request table lists {} tiles but its plays place {}; using the plays",
                table.len(),
                snapshot.table.len()
            );
        }
        Ok(snapshot)
    }
}

impl From<Move> for PlayResponse {
    fn from(mv: Move) -> Self {
        PlayResponse {
            seat: mv.seat.number(),
            tile: mv.placed.map(|placed| placed.tile().to_string()),
            edge: mv.placed.map(|placed| edge_label(placed.edge).to_string()),
        }
    }
}
