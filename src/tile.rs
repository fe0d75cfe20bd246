use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::enums::{Edge, MAX_PIP, NUM_PIPS, NUM_TILES};
use crate::errors::{TileError, TileResult};

/// An unplaced domino. The pips keep the order they were given in, but
/// equality and hashing ignore it: 2-5 and 5-2 are the same tile.
#[derive(Debug, Clone, Copy)]
pub struct Tile {
    a: u8,
    b: u8,
}

impl Tile {
    /// Builds a tile from pips already known to be in range.
    pub const fn new(a: u8, b: u8) -> Tile {
        Tile { a, b }
    }

    /// Validating constructor for boundary input.
    pub fn try_new(a: u8, b: u8) -> TileResult<Tile> {
        if a > MAX_PIP || b > MAX_PIP {
            return Err(TileError::OutOfRange { left: a, right: b });
        }
        Ok(Tile::new(a, b))
    }

    /// Dense id in 0..28, independent of orientation.
    pub fn from_id(id: u8) -> Tile {
        let mut hi = 0u8;
        while (hi as u16 + 1) * (hi as u16 + 2) / 2 <= id as u16 {
            hi += 1;
        }
        let lo = id - hi * (hi + 1) / 2;
        Tile::new(hi, lo)
    }

    /// Every tile of the set, doubles included.
    pub fn all() -> impl Iterator<Item = Tile> {
        (0..NUM_TILES as u8).map(Tile::from_id)
    }

    #[inline]
    pub fn pips(self) -> (u8, u8) {
        (self.a, self.b)
    }

    #[inline]
    pub fn id(self) -> u8 {
        let (hi, lo) = if self.a >= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        };
        hi * (hi + 1) / 2 + lo
    }

    #[inline]
    pub fn sum(self) -> u8 {
        self.a + self.b
    }

    #[inline]
    pub fn is_double(self) -> bool {
        self.a == self.b
    }

    #[inline]
    pub fn reversed(self) -> Tile {
        Tile::new(self.b, self.a)
    }

    #[inline]
    pub fn contains(self, pip: u8) -> bool {
        self.a == pip || self.b == pip
    }

    /// The pip left exposed once `pip` is matched against the line.
    pub fn other(self, pip: u8) -> Option<u8> {
        if self.a == pip {
            Some(self.b)
        } else if self.b == pip {
            Some(self.a)
        } else {
            None
        }
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Tile {}

impl Hash for Tile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

/// Accepts the `"L-R"` notation used on the wire.
impl FromStr for Tile {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (a, b) = trimmed
            .split_once('-')
            .ok_or_else(|| TileError::malformed(s))?;
        let a: u8 = a.trim().parse().map_err(|_| TileError::malformed(s))?;
        let b: u8 = b.trim().parse().map_err(|_| TileError::malformed(s))?;
        Tile::try_new(a, b)
    }
}

impl Serialize for Tile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A tile bound to one edge of the line, oriented left-to-right.
/// The pip facing outward on its edge is the only one new tiles may match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedTile {
    pub left: u8,
    pub right: u8,
    pub edge: Edge,
}

impl PlacedTile {
    /// Opening placement: the tile goes down as given.
    pub fn opening(tile: Tile, edge: Edge) -> PlacedTile {
        let (a, b) = tile.pips();
        PlacedTile {
            left: a,
            right: b,
            edge,
        }
    }

    #[inline]
    pub fn tile(self) -> Tile {
        Tile::new(self.left, self.right)
    }

    #[inline]
    pub fn sum(self) -> u8 {
        self.left + self.right
    }

    /// The glueable side: the pip facing outward on this tile's edge.
    #[inline]
    pub fn exposed(self) -> u8 {
        match self.edge {
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    /// The same tile read from the other end of the line.
    pub fn facing(self, edge: Edge) -> PlacedTile {
        PlacedTile { edge, ..self }
    }

    /// Attaches `tile` to this edge, oriented so its matching pip is hidden
    /// against the line. `None` when no pip of `tile` matches.
    pub fn glue(self, tile: Tile) -> Option<PlacedTile> {
        let pip = self.exposed();
        let (a, b) = tile.pips();
        let (left, right) = match self.edge {
            Edge::Left if b == pip => (a, b),
            Edge::Left if a == pip => (b, a),
            Edge::Right if a == pip => (a, b),
            Edge::Right if b == pip => (b, a),
            _ => return None,
        };
        Some(PlacedTile {
            left,
            right,
            edge: self.edge,
        })
    }
}

impl fmt::Display for PlacedTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}@{}", self.left, self.right, self.edge)
    }
}

/// Set of tiles keyed by dense id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TileSet(u32);

impl TileSet {
    pub const EMPTY: TileSet = TileSet(0);
    pub const FULL: TileSet = TileSet((1 << NUM_TILES) - 1);

    pub fn from_tiles<'a>(tiles: impl IntoIterator<Item = &'a Tile>) -> TileSet {
        let mut set = TileSet::EMPTY;
        for tile in tiles {
            set.insert(*tile);
        }
        set
    }

    #[inline]
    pub fn insert(&mut self, tile: Tile) {
        self.0 |= 1 << tile.id();
    }

    #[inline]
    pub fn remove(&mut self, tile: Tile) {
        self.0 &= !(1 << tile.id());
    }

    #[inline]
    pub fn with(self, tile: Tile) -> TileSet {
        TileSet(self.0 | (1 << tile.id()))
    }

    #[inline]
    pub fn without(self, tile: Tile) -> TileSet {
        TileSet(self.0 & !(1 << tile.id()))
    }

    #[inline]
    pub fn contains(self, tile: Tile) -> bool {
        self.0 & (1 << tile.id()) != 0
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn union(self, other: TileSet) -> TileSet {
        TileSet(self.0 | other.0)
    }

    #[inline]
    pub fn difference(self, other: TileSet) -> TileSet {
        TileSet(self.0 & !other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Tile> {
        (0..NUM_TILES as u8)
            .filter(move |id| self.0 & (1 << id) != 0)
            .map(Tile::from_id)
    }

    pub fn pip_sum(self) -> u32 {
        self.iter().map(|tile| tile.sum() as u32).sum()
    }

    /// Tiles of this set touching any pip in `pips`.
    pub fn touching(self, pips: PipSet) -> TileSet {
        let mut out = TileSet::EMPTY;
        for tile in self.iter() {
            let (a, b) = tile.pips();
            if pips.contains(a) || pips.contains(b) {
                out.insert(tile);
            }
        }
        out
    }
}

/// Set of pip values 0..=6.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PipSet(u8);

impl PipSet {
    pub const EMPTY: PipSet = PipSet(0);

    #[inline]
    pub fn insert(&mut self, pip: u8) -> bool {
        let was = self.contains(pip);
        self.0 |= 1 << pip;
        !was
    }

    #[inline]
    pub fn with(self, pip: u8) -> PipSet {
        PipSet(self.0 | (1 << pip))
    }

    #[inline]
    pub fn contains(self, pip: u8) -> bool {
        pip <= MAX_PIP && self.0 & (1 << pip) != 0
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..NUM_PIPS as u8).filter(move |pip| self.contains(*pip))
    }
}
