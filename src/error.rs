//! Error types
//!
//! Construction-time failures are fatal: the engine refuses to start with an
//! inconsistent world. Content failures are always recovered by the caller.

/// Fatal engine construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("tilemap has {actual} tiles, expected {expected} (width x height)")]
    TilemapSize { expected: usize, actual: usize },

    #[error("tilemap dimensions must be non-zero (got {width}x{height})")]
    EmptyDimensions { width: usize, height: usize },

    #[error("level row {row} has {actual} columns, expected {expected}")]
    LevelRowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("level contains no rows")]
    EmptyLevel,

    #[error("level has no player spawn marker")]
    MissingSpawn,

    #[error("level has {0} player spawn markers, expected exactly one")]
    MultipleSpawns(usize),

    #[error("unknown level glyph {glyph:?} at column {col}, row {row}")]
    UnknownGlyph { glyph: char, col: usize, row: usize },
}

/// GPU setup failures; the host falls back to a static page
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to acquire a GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,

    #[error("atlas upload has {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    AtlasSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Content catalog failures (recovered: the item pool stays empty)
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog payload is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog request failed: {0}")]
    Network(String),
}
