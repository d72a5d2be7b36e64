//! Error types for rendering, exporting and loading designs.
//!
//! Every failure is recoverable at the caller: each operation reports a single
//! human-readable message through `Display`, while the variants stay
//! matchable for callers that need to branch.

use std::io;
use std::path::PathBuf;

use crate::color::ParseColorError;

/// Errors produced while compositing an icon.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The requested resolution scale was zero, negative or not finite.
    #[error("invalid resolution scale {0}: must be a finite value greater than zero")]
    InvalidScale(f32),

    /// The rasterization surface could not be allocated.
    #[error("could not allocate a {width}x{height} drawing surface")]
    SurfaceAllocation { width: u32, height: u32 },

    /// A layer document could not be parsed.
    #[error("layer document could not be parsed: {0}")]
    Svg(String),
}

/// Errors produced by the export and folder-icon pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A dropped item was not a usable directory reference.
    #[error("{0}")]
    InvalidInput(String),

    /// The icon could not be rendered.
    #[error("failed to render icon: {0}")]
    Render(#[from] RenderError),

    /// PNG encoding failed or produced no data.
    #[error("failed to create PNG data: {0}")]
    Encoding(String),

    /// Writing the PNG to disk failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cached PNG could not be read back.
    #[error("could not load the PNG from {}: {reason}", path.display())]
    CacheReload { path: PathBuf, reason: String },

    /// The target folder does not exist or is not a directory.
    #[error("{} is not an existing folder", .0.display())]
    InvalidTarget(PathBuf),

    /// The operating system rejected the icon assignment.
    #[error("failed to set folder icon for {}: {source}", path.display())]
    IconAssignment {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors produced while loading a design profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("invalid design profile: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Color(#[from] ParseColorError),

    #[error("could not load overlay image {}: {reason}", path.display())]
    Image { path: PathBuf, reason: String },

    #[error("unknown preset {0:?}")]
    UnknownPreset(String),

    #[error("unknown symbol {0:?}")]
    UnknownSymbol(String),

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
