//! PNG export and folder icon assignment.
//!
//! Both entry points share one render step at full resolution, so a design
//! exported to a file and the same design applied to a folder start from
//! pixel-identical PNG data.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ImageEncoder, RgbaImage};

use crate::assign::{IconAssigner, default_assigner};
use crate::composer::compose_with;
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::icon::{IconImage, RectPx};
use crate::layer::SymbolLibrary;
use crate::params::VisualParameters;

/// Renders designs at full resolution and writes or applies them.
///
/// An `Exporter` is `Sync`: the drop handler shares one across threads.
/// Calls that go through the cache file are serialized internally.
pub struct Exporter {
    config: ExportConfig,
    assigner: Box<dyn IconAssigner>,
    symbols: SymbolLibrary,
    cache_lock: Mutex<()>,
}

impl Exporter {
    /// An exporter using the platform's icon assigner, staging any file it
    /// needs in the cache directory.
    pub fn new(config: ExportConfig) -> Self {
        let assigner = default_assigner(&config.cache_dir);
        Self::with_assigner(config, assigner)
    }

    pub fn with_assigner(config: ExportConfig, assigner: Box<dyn IconAssigner>) -> Self {
        Self {
            config,
            assigner,
            symbols: SymbolLibrary::builtin(),
            cache_lock: Mutex::new(()),
        }
    }

    /// Replaces the symbol library designs are rendered with.
    pub fn with_symbols(mut self, symbols: SymbolLibrary) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Renders `params` on the full-size canvas.
    pub fn render_full(&self, params: &VisualParameters) -> Result<IconImage, ExportError> {
        Ok(compose_with(params, 1.0, &self.symbols)?)
    }

    /// Renders `params` at full size and encodes the result as PNG.
    pub fn render_png(&self, params: &VisualParameters) -> Result<Vec<u8>, ExportError> {
        let icon = self.render_full(params)?;
        encode_png(&icon.data)
    }

    /// Writes the full-size PNG of `params` to `path`.
    pub fn export_to_file(&self, params: &VisualParameters, path: &Path) -> Result<(), ExportError> {
        let png = self.render_png(params)?;
        fs::write(path, &png).map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("exported icon to {}", path.display());
        Ok(())
    }

    /// Renders `params` and assigns it as the icon of `folder`.
    ///
    /// The PNG goes through the cache file, is reloaded, fitted into the
    /// configured square and handed to the [`IconAssigner`]. The cache file
    /// is overwritten on every call and left in place afterwards.
    pub fn apply_to_folder(&self, params: &VisualParameters, folder: &Path) -> Result<(), ExportError> {
        let png = self.render_png(params)?;

        // The cache file is shared by every call
        let _guard = self.cache_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let cache_path = self.config.cache_path();
        fs::create_dir_all(&self.config.cache_dir).map_err(|source| ExportError::Write {
            path: self.config.cache_dir.clone(),
            source,
        })?;
        match fs::remove_file(&cache_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ExportError::Write {
                    path: cache_path,
                    source,
                });
            }
        }
        fs::write(&cache_path, &png).map_err(|source| ExportError::Write {
            path: cache_path.clone(),
            source,
        })?;
        log::debug!("wrote {} bytes to {}", png.len(), cache_path.display());

        let reloaded = image::open(&cache_path)
            .map_err(|e| ExportError::CacheReload {
                path: cache_path.clone(),
                reason: e.to_string(),
            })?
            .to_rgba8();
        let icon = normalize_to_square(&reloaded, self.config.icon_size);
        if icon.width() == 0 {
            return Err(ExportError::Encoding(format!(
                "icon size {} leaves no pixels",
                self.config.icon_size
            )));
        }

        if !folder.is_dir() {
            return Err(ExportError::InvalidTarget(folder.to_path_buf()));
        }

        self.assigner
            .assign(&icon, folder)
            .map_err(|source| ExportError::IconAssignment {
                path: folder.to_path_buf(),
                source,
            })?;
        log::info!("set folder icon for {}", folder.display());
        Ok(())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encodes an RGBA image as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::Encoding("image has no pixels".to_string()));
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| ExportError::Encoding(e.to_string()))?;

    if png.is_empty() {
        return Err(ExportError::Encoding("encoder produced no data".to_string()));
    }
    Ok(png)
}

/// Where a `width` x `height` image lands when fitted, aspect preserved and
/// centered, into a `side` x `side` square.
pub fn fit_within(width: u32, height: u32, side: u32) -> RectPx {
    if side == 0 {
        return RectPx::default();
    }
    if width == 0 || height == 0 {
        return RectPx::new(side / 2, side / 2, 0, 0);
    }

    let ratio = (side as f32 / width as f32).min(side as f32 / height as f32);
    let fitted_width = ((width as f32 * ratio).round() as u32).clamp(1, side);
    let fitted_height = ((height as f32 * ratio).round() as u32).clamp(1, side);

    RectPx::new(
        (side - fitted_width) / 2,
        (side - fitted_height) / 2,
        fitted_width,
        fitted_height,
    )
}

/// Fits `image` into a transparent `side` x `side` square.
pub fn normalize_to_square(image: &RgbaImage, side: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(side, side);
    let rect = fit_within(image.width(), image.height(), side);
    if rect.width == 0 || rect.height == 0 {
        return canvas;
    }

    let resized = if (rect.width, rect.height) == image.dimensions() {
        image.clone()
    } else {
        imageops::resize(image, rect.width, rect.height, FilterType::Lanczos3)
    };
    imageops::replace(&mut canvas, &resized, rect.x as i64, rect.y as i64);
    canvas
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::testing::RecordingAssigner;
    use crate::color::IconColor;
    use image::Rgba;

    fn exporter(cache: &Path, assigner: RecordingAssigner) -> Exporter {
        Exporter::with_assigner(ExportConfig::with_cache_dir(cache), Box::new(assigner))
    }

    fn design() -> VisualParameters {
        let mut params = VisualParameters::default();
        params.set_symbol("heart");
        params.overlay_color = IconColor::rgb(255, 255, 255);
        params
    }

    #[test]
    fn canvas_fits_with_vertical_padding() {
        assert_eq!(fit_within(470, 395, 512), RectPx::new(0, 41, 512, 430));
        assert_eq!(fit_within(100, 200, 512), RectPx::new(128, 0, 256, 512));
        assert_eq!(fit_within(512, 512, 512), RectPx::new(0, 0, 512, 512));
    }

    #[test]
    fn zero_sized_square_is_empty() {
        assert_eq!(fit_within(470, 395, 0), RectPx::default());
        let source = RgbaImage::from_pixel(470, 395, Rgba([0, 0, 255, 255]));
        assert_eq!(normalize_to_square(&source, 0).dimensions(), (0, 0));
    }

    #[test]
    fn zero_icon_size_fails_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ExportConfig::with_cache_dir(dir.path().join("cache"));
        config.icon_size = 0;
        let assigner = RecordingAssigner::default();
        let exporter = Exporter::with_assigner(config, Box::new(assigner.clone()));

        let err = exporter.apply_to_folder(&design(), dir.path()).unwrap_err();
        assert!(matches!(err, ExportError::Encoding(_)));
        assert!(assigner.folders().is_empty());
    }

    #[test]
    fn normalization_leaves_padding_transparent() {
        let source = RgbaImage::from_pixel(470, 395, Rgba([0, 0, 255, 255]));
        let square = normalize_to_square(&source, 512);

        assert_eq!(square.dimensions(), (512, 512));
        assert_eq!(square.get_pixel(256, 20).0[3], 0);
        assert_eq!(square.get_pixel(256, 491).0[3], 0);
        assert_eq!(square.get_pixel(256, 256).0, [0, 0, 255, 255]);
    }

    #[test]
    fn exported_png_is_full_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("icon.png");
        exporter(&dir.path().join("cache"), RecordingAssigner::default())
            .export_to_file(&design(), &out)
            .unwrap();

        let written = image::open(&out).unwrap();
        assert_eq!((written.width(), written.height()), (470, 395));
    }

    #[test]
    fn export_and_apply_share_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("cache");
        let target = dir.path().join("Projects");
        fs::create_dir(&target).unwrap();
        let assigner = RecordingAssigner::default();
        let exporter = exporter(&cache, assigner.clone());

        let out = dir.path().join("icon.png");
        exporter.export_to_file(&design(), &out).unwrap();
        exporter.apply_to_folder(&design(), &target).unwrap();

        let exported = image::open(&out).unwrap().to_rgba8();
        let cached = image::open(cache.join("currentIcon.png")).unwrap().to_rgba8();
        assert_eq!(exported, cached);

        let calls = assigner.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(target.clone(), (512, 512))]);
    }

    #[test]
    fn cache_file_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("cache");
        let exporter = exporter(&cache, RecordingAssigner::default());

        let mut red = VisualParameters::default();
        red.base_color = IconColor::rgb(255, 0, 0);
        exporter.apply_to_folder(&design(), dir.path()).unwrap();
        exporter.apply_to_folder(&red, dir.path()).unwrap();

        let cached = image::open(cache.join("currentIcon.png")).unwrap().to_rgba8();
        assert_eq!(cached.get_pixel(235, 300).0, [255, 0, 0, 255]);
    }

    #[test]
    fn missing_folder_is_invalid_target() {
        let dir = tempfile::tempdir().unwrap();
        let assigner = RecordingAssigner::default();
        let exporter = exporter(&dir.path().join("cache"), assigner.clone());

        let missing = dir.path().join("gone");
        let err = exporter.apply_to_folder(&design(), &missing).unwrap_err();
        assert!(matches!(err, ExportError::InvalidTarget(ref p) if *p == missing));

        let file = dir.path().join("notes.txt");
        fs::write(&file, "hi").unwrap();
        let err = exporter.apply_to_folder(&design(), &file).unwrap_err();
        assert!(matches!(err, ExportError::InvalidTarget(_)));

        assert!(assigner.folders().is_empty());
    }

    #[test]
    fn assigner_failure_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let assigner = RecordingAssigner {
            refuse: vec![dir.path().to_path_buf()],
            ..RecordingAssigner::default()
        };
        let exporter = exporter(&dir.path().join("cache"), assigner);

        let err = exporter.apply_to_folder(&design(), dir.path()).unwrap_err();
        match err {
            ExportError::IconAssignment { path, source } => {
                assert_eq!(path, dir.path());
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unwritable_destination_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = exporter(&dir.path().join("cache"), RecordingAssigner::default());
        let out = dir.path().join("missing").join("icon.png");

        let err = exporter.export_to_file(&design(), &out).unwrap_err();
        assert!(matches!(err, ExportError::Write { ref path, .. } if *path == out));
    }

    #[test]
    fn custom_symbols_reach_the_full_render() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = SymbolLibrary::new();
        library.insert("bar", "M0 50 H100");
        let exporter = exporter(&dir.path().join("cache"), RecordingAssigner::default())
            .with_symbols(library);
        assert_eq!(
            exporter.config().cache_path(),
            dir.path().join("cache").join("currentIcon.png")
        );

        let mut params = design();
        params.set_symbol("bar");
        let custom = exporter.render_full(&params).unwrap();
        params.overlay_type = crate::params::OverlayType::None;
        assert_ne!(custom, exporter.render_full(&params).unwrap());

        // "heart" is not in the replacement library
        assert_eq!(
            exporter.render_full(&design()).unwrap(),
            exporter.render_full(&params).unwrap()
        );
    }

    #[test]
    fn empty_image_cannot_be_encoded() {
        let err = encode_png(&RgbaImage::new(0, 0)).unwrap_err();
        assert!(matches!(err, ExportError::Encoding(_)));
    }

    #[test]
    fn png_bytes_decode_to_the_render() {
        let exporter = exporter(Path::new("/unused"), RecordingAssigner::default());
        let png = exporter.render_png(&design()).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded, exporter.render_full(&design()).unwrap().data);
    }
}
