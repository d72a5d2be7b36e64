//! folco-composer: Folder icon design, rendering and assignment
//!
//! This crate composes custom folder icons from a small set of visual
//! parameters (folder colors plus an optional image or symbol overlay),
//! renders them deterministically at any resolution, exports them as PNG and
//! applies them as the icon of folders on disk.
//!
//! # Example
//!
//! ```
//! use folco_composer::{IconComposer, VisualParameters, Preset};
//!
//! let mut params = VisualParameters::default();
//! params.apply_preset(Preset::find("ocean").unwrap());
//! params.set_symbol("star");
//! params.set_overlay_opacity(0.8);
//!
//! // Live preview: only changed layers are redrawn between renders
//! let mut composer = IconComposer::new();
//! composer.sync(&params);
//! let preview = composer.render(0.5).unwrap();
//! assert_eq!(preview.data.dimensions(), (235, 198));
//! ```
//!
//! # Exporting
//!
//! An [`Exporter`] renders at full size and either writes a PNG or assigns
//! the icon to a folder through an [`IconAssigner`]:
//!
//! ```no_run
//! use std::path::Path;
//! use folco_composer::{ExportConfig, Exporter, VisualParameters};
//!
//! let exporter = Exporter::new(ExportConfig::default());
//! let params = VisualParameters::default();
//! exporter.export_to_file(&params, Path::new("icon.png"))?;
//! exporter.apply_to_folder(&params, Path::new("/Users/me/Projects"))?;
//! # Ok::<(), folco_composer::ExportError>(())
//! ```

mod assign;
mod color;
mod composer;
mod config;
mod drop;
mod error;
mod export;
mod icon;
mod layer;
mod params;
mod profile;
mod store;

pub use assign::{DesktopEntryAssigner, IconAssigner, WorkspaceAssigner, default_assigner};
pub use color::{IconColor, PRESETS, ParseColorError, Preset};
pub use composer::{IconComposer, compose, compose_with};
pub use config::ExportConfig;
pub use drop::{DropOutcome, DroppedItem, apply_dropped, handle_drop};
pub use error::{ExportError, ProfileError, RenderError};
pub use export::{Exporter, encode_png, fit_within, normalize_to_square};
pub use icon::{CANVAS_HEIGHT, CANVAS_WIDTH, IconImage, MAX_SURFACE_BYTES, RectPx, SizePx};
pub use layer::{
    BodyConfig, BodyShade, CACHED_SIZES, CacheKey, DependencyVersion, ImageOverlayConfig, Layer,
    LayerConfig, LayerEffect, LayerPipeline, LayerVersions, OVERLAY_ANCHOR, OVERLAY_EXTENT,
    OverlayPlacement, RenderCache, RenderContext, SymbolLibrary, SymbolOverlayConfig, TabConfig,
};
pub use params::{OverlayType, SymbolWeight, VisualParameters};
pub use profile::{DesignProfile, load_image};
pub use store::{EchoToken, ParameterStore};
