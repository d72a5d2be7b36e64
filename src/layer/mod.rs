//! The folder icon's layer stack.
//!
//! A layer pairs an optional config with an on/off switch, a version counter
//! and a cache of the canvases it produced, one per output size. Configs
//! implement [`LayerEffect`] to say which lower layers they depend on, how
//! they draw, and which facts they publish in the [`RenderContext`] for the
//! layers above.
//!
//! A cached canvas already contains everything drawn beneath it, so it is
//! only reused while the lower layers still have the versions it was stored
//! against.

pub mod image_overlay;
pub mod overlay;
pub mod shape;
pub mod svg;
pub mod symbol;

pub use image_overlay::ImageOverlayConfig;
pub use overlay::{OVERLAY_ANCHOR, OVERLAY_EXTENT, OverlayPlacement};
pub use shape::{BodyConfig, TabConfig};
pub use symbol::{SymbolLibrary, SymbolOverlayConfig};

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::color::IconColor;
use crate::error::RenderError;
use crate::icon::{IconImage, SizePx};

/// The canvas being drawn plus facts published by the layers already drawn.
///
/// ```ignore
/// // The body publishes its fill...
/// ctx.set(BodyShade(color));
///
/// // ...and the image overlay picks it up for the imprint.
/// let shade = ctx.get::<BodyShade>().map(|s| s.0);
/// ```
pub struct RenderContext {
    pub image: IconImage,
    facts: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RenderContext {
    pub fn new(image: IconImage) -> Self {
        Self {
            image,
            facts: HashMap::new(),
        }
    }

    /// Publishes `value`, replacing an earlier value of the same type.
    pub fn set<T: Any + Send + Sync>(&mut self, value: T) {
        self.facts.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.facts
            .get(&TypeId::of::<T>())
            .and_then(|fact| fact.downcast_ref::<T>())
    }

    pub fn scale(&self) -> f32 {
        self.image.scale
    }
}

/// Fill color of the folder body, published by the body layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyShade(pub IconColor);

/// A layer configuration that knows whether a replacement would render
/// differently.
pub trait LayerConfig: Clone {
    fn differs_from(&self, other: &Self) -> bool;
}

/// A layer configuration that draws itself.
pub trait LayerEffect: LayerConfig {
    /// Versions of the lower layers a cached canvas of this layer was drawn over.
    fn dependencies(versions: &LayerVersions) -> DependencyVersion;

    /// Draws onto `ctx.image`.
    fn transform(&self, ctx: &mut RenderContext) -> Result<(), RenderError>;

    /// Publishes facts for higher layers. Runs after every `transform` and
    /// on every cache hit, since facts are not cached.
    fn emit(&self, _ctx: &mut RenderContext) {}
}

/// Fingerprint of the lower-layer versions a canvas was drawn over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DependencyVersion(u64);

impl DependencyVersion {
    /// For the bottom layer.
    pub const BASE: Self = Self(0);

    /// Folds lower-layer versions together. Versions never decrease, so a
    /// change to any of them changes the result.
    pub fn of(versions: &[u64]) -> Self {
        Self(versions.iter().copied().fold(0, u64::wrapping_add))
    }
}

/// Current version of every layer in the pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerVersions {
    pub body: u64,
    pub tab: u64,
    pub image: u64,
    pub symbol: u64,
}

/// One output size: pixel dimensions plus the exact scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    size: SizePx,
    scale_bits: u32,
}

impl CacheKey {
    pub fn new(size: SizePx, scale: f32) -> Self {
        Self {
            size,
            scale_bits: scale.to_bits(),
        }
    }
}

/// How many output sizes a [`RenderCache`] holds before dropping the oldest.
pub const CACHED_SIZES: usize = 4;

/// Canvases by output size, each tagged with the dependency version it was
/// drawn against. Holds at most [`CACHED_SIZES`] sizes; storing another
/// drops the least recently stored one.
#[derive(Default)]
pub struct RenderCache {
    // Oldest first
    entries: Vec<(CacheKey, IconImage, DependencyVersion)>,
}

impl RenderCache {
    /// The canvas for `key`, unless it was drawn against other dependencies.
    pub fn lookup(&self, key: CacheKey, deps: DependencyVersion) -> Option<&IconImage> {
        self.entries
            .iter()
            .find(|(k, _, stored)| *k == key && *stored == deps)
            .map(|(_, image, _)| image)
    }

    pub fn store(&mut self, key: CacheKey, image: IconImage, deps: DependencyVersion) {
        self.entries.retain(|(k, _, _)| *k != key);
        if self.entries.len() >= CACHED_SIZES {
            self.entries.remove(0);
        }
        self.entries.push((key, image, deps));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One slot of the stack.
///
/// Anything that could alter the output (a different config, switching the
/// layer on or off) bumps `version` and drops the cache. The layers above
/// see the new version through their dependencies and redraw as well.
pub struct Layer<C: LayerConfig> {
    config: Option<C>,
    enabled: bool,
    version: u64,
    cache: RenderCache,
}

impl<C: LayerConfig> Default for Layer<C> {
    fn default() -> Self {
        Self {
            config: None,
            enabled: true,
            version: 0,
            cache: RenderCache::default(),
        }
    }
}

impl<C: LayerConfig> Layer<C> {
    pub fn config(&self) -> Option<&C> {
        self.config.as_ref()
    }

    pub fn has_config(&self) -> bool {
        self.config.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Configured and switched on.
    pub fn is_active(&self) -> bool {
        self.enabled && self.has_config()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Switches the layer on or off, keeping its config. Returns true on a change.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        self.invalidate();
        true
    }

    /// Replaces the config. Returns true if the output could change.
    pub fn set_config(&mut self, config: Option<C>) -> bool {
        let changed = match (&self.config, &config) {
            (Some(old), Some(new)) => old.differs_from(new),
            (current, next) => current.is_some() != next.is_some(),
        };
        if changed {
            self.config = config;
            self.invalidate();
        }
        changed
    }

    /// Bumps the version and forgets every cached canvas.
    pub fn invalidate(&mut self) {
        self.version = self.version.wrapping_add(1);
        self.cache.clear();
    }

    pub fn cached(&self, key: CacheKey, deps: DependencyVersion) -> Option<&IconImage> {
        self.cache.lookup(key, deps)
    }

    /// Number of sizes currently cached.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

impl<C: LayerEffect> Layer<C> {
    /// Draws this layer into `ctx`, or swaps in the cached canvas when the
    /// lower layers are unchanged. Inactive layers leave `ctx` alone.
    pub fn apply(
        &mut self,
        ctx: &mut RenderContext,
        key: CacheKey,
        versions: &LayerVersions,
    ) -> Result<(), RenderError> {
        let Some(config) = self.config.as_ref().filter(|_| self.enabled) else {
            return Ok(());
        };
        let deps = C::dependencies(versions);

        if let Some(hit) = self.cache.lookup(key, deps) {
            ctx.image = hit.clone();
        } else {
            config.transform(ctx)?;
            self.cache.store(key, ctx.image.clone(), deps);
        }
        config.emit(ctx);
        Ok(())
    }
}

/// The folder icon's layers, bottom first.
///
/// ```text
///   body     no dependencies, publishes BodyShade
///    │
///   tab      body
///    │
///   image    body + tab, reads BodyShade
///    │
///   symbol   body + tab + image
///    │
///   output   every layer
/// ```
///
/// At most one of the two overlay layers is configured at a time.
#[derive(Default)]
pub struct LayerPipeline {
    pub body: Layer<BodyConfig>,
    pub tab: Layer<TabConfig>,
    pub image: Layer<ImageOverlayConfig>,
    pub symbol: Layer<SymbolOverlayConfig>,
    /// Finished icons.
    pub output: RenderCache,
}

impl LayerPipeline {
    pub fn layer_versions(&self) -> LayerVersions {
        LayerVersions {
            body: self.body.version(),
            tab: self.tab.version(),
            image: self.image.version(),
            symbol: self.symbol.version(),
        }
    }

    /// Drops every cached canvas and finished icon.
    pub fn invalidate_all(&mut self) {
        self.body.invalidate();
        self.tab.invalidate();
        self.image.invalidate();
        self.symbol.invalidate();
        self.output.clear();
    }

    /// Renders the icon at `resolution_scale`, reusing whatever is still
    /// valid: the finished icon if no layer changed, otherwise each layer's
    /// own canvas where its dependencies allow.
    pub fn render(&mut self, resolution_scale: f32) -> Result<IconImage, RenderError> {
        let size = SizePx::canvas_at(resolution_scale)?;
        let key = CacheKey::new(size, resolution_scale);
        let versions = self.layer_versions();
        let all = DependencyVersion::of(&[versions.body, versions.tab, versions.image, versions.symbol]);

        if let Some(done) = self.output.lookup(key, all) {
            log::debug!("reusing {}x{} icon", size.width, size.height);
            return Ok(done.clone());
        }

        let mut ctx = RenderContext::new(IconImage::blank(size, resolution_scale));
        self.body.apply(&mut ctx, key, &versions)?;
        self.tab.apply(&mut ctx, key, &versions)?;
        self.image.apply(&mut ctx, key, &versions)?;
        self.symbol.apply(&mut ctx, key, &versions)?;

        log::debug!("rendered {}x{} icon", size.width, size.height);
        self.output.store(key, ctx.image.clone(), all);
        Ok(ctx.image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: IconColor = IconColor::rgb(0, 0, 255);

    fn key_at(scale: f32) -> (SizePx, CacheKey) {
        let size = SizePx::canvas_at(scale).unwrap();
        (size, CacheKey::new(size, scale))
    }

    #[test]
    fn config_changes_bump_the_version() {
        let mut layer: Layer<BodyConfig> = Layer::default();
        assert!(layer.is_enabled());
        assert!(!layer.is_active());
        assert_eq!(layer.version(), 0);

        assert!(layer.set_config(Some(BodyConfig::new(BLUE))));
        assert!(layer.is_active());
        assert_eq!(layer.version(), 1);

        // Equal config
        assert!(!layer.set_config(Some(BodyConfig::new(BLUE))));
        assert_eq!(layer.version(), 1);

        assert!(layer.set_config(Some(BodyConfig::new(IconColor::rgb(1, 2, 3)))));
        assert!(layer.set_config(None));
        assert!(!layer.set_config(None));
        assert_eq!(layer.version(), 3);
    }

    #[test]
    fn disabling_keeps_the_config() {
        let mut layer: Layer<TabConfig> = Layer::default();
        layer.set_config(Some(TabConfig::new(BLUE)));

        assert!(layer.set_enabled(false));
        assert!(!layer.set_enabled(false));
        assert!(!layer.is_active());
        assert!(layer.has_config());

        assert!(layer.set_enabled(true));
        assert_eq!(layer.config().map(|c| c.color), Some(BLUE));
        assert_eq!(layer.version(), 3);
    }

    #[test]
    fn cache_hit_still_publishes_facts() {
        let mut layer: Layer<BodyConfig> = Layer::default();
        layer.set_config(Some(BodyConfig::new(BLUE)));
        let (size, key) = key_at(0.1);
        let versions = LayerVersions::default();

        let mut first = RenderContext::new(IconImage::blank(size, 0.1));
        layer.apply(&mut first, key, &versions).unwrap();
        assert_eq!(layer.cached_len(), 1);

        let mut second = RenderContext::new(IconImage::blank(size, 0.1));
        layer.apply(&mut second, key, &versions).unwrap();
        assert_eq!(second.get::<BodyShade>(), Some(&BodyShade(BLUE)));
        assert_eq!(first.image, second.image);
    }

    #[test]
    fn lower_layer_change_misses_the_cache() {
        let mut layer: Layer<TabConfig> = Layer::default();
        layer.set_config(Some(TabConfig::new(BLUE)));
        let (size, key) = key_at(0.1);

        let mut ctx = RenderContext::new(IconImage::blank(size, 0.1));
        layer.apply(&mut ctx, key, &LayerVersions::default()).unwrap();

        let before = TabConfig::dependencies(&LayerVersions::default());
        let after = TabConfig::dependencies(&LayerVersions { body: 1, ..LayerVersions::default() });
        assert!(layer.cached(key, before).is_some());
        assert!(layer.cached(key, after).is_none());
    }

    #[test]
    fn disabled_layer_draws_nothing() {
        let mut layer: Layer<BodyConfig> = Layer::default();
        layer.set_config(Some(BodyConfig::new(BLUE)));
        layer.set_enabled(false);
        let (size, key) = key_at(0.1);

        let mut ctx = RenderContext::new(IconImage::blank(size, 0.1));
        layer.apply(&mut ctx, key, &LayerVersions::default()).unwrap();
        assert!(ctx.image.data.pixels().all(|p| p[3] == 0));
        assert!(ctx.get::<BodyShade>().is_none());
    }

    #[test]
    fn pipeline_reuses_output_until_a_layer_changes() {
        let mut pipeline = LayerPipeline::default();
        pipeline.body.set_config(Some(BodyConfig::new(BLUE)));
        pipeline.tab.set_config(Some(TabConfig::new(BLUE)));

        let first = pipeline.render(0.2).unwrap();
        assert_eq!(pipeline.render(0.2).unwrap(), first);
        assert_eq!(pipeline.output.len(), 1);

        pipeline.tab.set_config(Some(TabConfig::new(IconColor::rgb(255, 0, 0))));
        assert_ne!(pipeline.render(0.2).unwrap(), first);
    }

    #[test]
    fn each_scale_is_cached_separately() {
        let mut pipeline = LayerPipeline::default();
        pipeline.body.set_config(Some(BodyConfig::new(BLUE)));
        pipeline.render(0.1).unwrap();
        pipeline.render(0.2).unwrap();
        assert_eq!(pipeline.body.cached_len(), 2);

        pipeline.invalidate_all();
        assert_eq!(pipeline.body.cached_len(), 0);
        assert!(pipeline.output.is_empty());
    }

    #[test]
    fn many_scales_keep_only_recent_sizes() {
        let mut pipeline = LayerPipeline::default();
        pipeline.body.set_config(Some(BodyConfig::new(BLUE)));
        let scales = [0.05, 0.06, 0.07, 0.08, 0.09, 0.1];
        for scale in scales {
            pipeline.render(scale).unwrap();
        }
        assert_eq!(pipeline.output.len(), CACHED_SIZES);
        assert_eq!(pipeline.body.cached_len(), CACHED_SIZES);

        let deps = DependencyVersion::of(&[1, 0, 0, 0]);
        let (_, oldest) = key_at(scales[0]);
        let (_, newest) = key_at(scales[5]);
        assert!(pipeline.output.lookup(oldest, deps).is_none());
        assert!(pipeline.output.lookup(newest, deps).is_some());
    }

    #[test]
    fn storing_a_size_again_replaces_its_entry() {
        let mut cache = RenderCache::default();
        let (size, key) = key_at(0.1);
        cache.store(key, IconImage::blank(size, 0.1), DependencyVersion::BASE);
        cache.store(key, IconImage::blank(size, 0.1), DependencyVersion::of(&[2]));
        assert_eq!(cache.len(), 1);
        assert!(cache.lookup(key, DependencyVersion::BASE).is_none());
        assert!(cache.lookup(key, DependencyVersion::of(&[2])).is_some());
    }

    #[test]
    fn empty_pipeline_renders_transparent_canvas() {
        let mut pipeline = LayerPipeline::default();
        let img = pipeline.render(0.1).unwrap();
        assert_eq!(img.dimensions(), SizePx::new(47, 40));
        assert!(img.data.pixels().all(|p| p[3] == 0));
    }
}
