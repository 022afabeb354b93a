//! Error types for the simulation core

use thiserror::Error;

/// Actor registry failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("actor capacity exhausted ({limit} live actors)")]
    CapacityExhausted { limit: usize },
}

/// Arena data failures
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("arena has {found} tiles, expected {expected}")]
    TileCount { expected: usize, found: usize },
    #[error("arena has {found} normals, expected {expected}")]
    NormalCount { expected: usize, found: usize },
    #[error("normal of tile ({x}, {y}) does not point up")]
    DownwardNormal { x: usize, y: usize },
    #[error("placement at ({x}, {y}) lies outside the arena")]
    PlacementOutOfBounds { x: u16, y: u16 },
    #[error("malformed arena data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Match settings failures
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("player count {0} outside 1..=4")]
    PlayerCount(u8),
    #[error("match length must be at least one second")]
    ZeroLength,
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}
