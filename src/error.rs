//! crate‑wide error type

use std::fmt;

use crate::registry::TileId;

pub type Result<T> = std::result::Result<T, WorldError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// name not present in the registry
    UnknownTile(String),
    /// id not present in the registry
    UnknownId(TileId),
    /// the same name registered twice
    DuplicateTile(String),
    /// coordinate outside the tile grid / height map
    OutOfBounds { x: i64, y: i64 },
    /// malformed biome or world configuration
    InvalidConfig(String),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::UnknownTile(name) => write!(f, "unknown tile name '{name}'"),
            WorldError::UnknownId(id) => write!(f, "unknown tile id {id}"),
            WorldError::DuplicateTile(name) => write!(f, "tile '{name}' registered twice"),
            WorldError::OutOfBounds { x, y } => write!(f, "({x}, {y}) is outside the world"),
            WorldError::InvalidConfig(msg) => write!(f, "invalid world config: {msg}"),
        }
    }
}

impl std::error::Error for WorldError {}
