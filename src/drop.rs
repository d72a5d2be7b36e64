//! Applying a design to folders dropped onto the preview.
//!
//! Every dropped item is handled on its own thread. Failures do not stop the
//! other items; the drop reports a single message, the last one recorded.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::thread;

use url::Url;

use crate::error::ExportError;
use crate::export::Exporter;
use crate::params::VisualParameters;

const NOT_A_FOLDER: &str = "The dropped item is not a folder.";
const INVALID_URL: &str = "Invalid URL format.";

/// One item handed over by a drag source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DroppedItem {
    /// A filesystem path.
    Path(PathBuf),
    /// A URL string, expected to be a `file://` URL.
    Url(String),
    /// The drag source could not provide the item.
    Failed(String),
}

impl DroppedItem {
    /// Interprets a command-line argument: `file://` URLs stay URLs,
    /// anything else is a path.
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("file:") {
            Self::Url(arg.to_string())
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }

    /// The filesystem path this item refers to.
    pub fn resolve(&self) -> Result<PathBuf, ExportError> {
        match self {
            Self::Path(path) => Ok(path.clone()),
            Self::Url(raw) => Url::parse(raw)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| ExportError::InvalidInput(INVALID_URL.to_string())),
            Self::Failed(reason) => Err(ExportError::InvalidInput(format!(
                "Error loading item: {reason}"
            ))),
        }
    }
}

impl From<PathBuf> for DroppedItem {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for DroppedItem {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// The result of a whole drop.
#[derive(Debug, Default)]
pub struct DropOutcome {
    /// Folders whose icon was set, in completion order.
    pub applied: Vec<PathBuf>,
    /// The last error encountered, if any.
    pub error: Option<String>,
}

impl DropOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Validates one dropped item and applies `params` to it.
///
/// Items that are not existing directories fail with
/// [`ExportError::InvalidInput`] before anything is rendered.
pub fn apply_dropped(
    exporter: &Exporter,
    params: &VisualParameters,
    item: &DroppedItem,
) -> Result<PathBuf, ExportError> {
    let folder = item.resolve()?;
    if !folder.is_dir() {
        return Err(ExportError::InvalidInput(NOT_A_FOLDER.to_string()));
    }
    exporter.apply_to_folder(params, &folder)?;
    Ok(folder)
}

/// The message a failed item reports.
fn drop_message(err: &ExportError) -> String {
    match err {
        ExportError::InvalidInput(message) => message.clone(),
        other => format!("Failed to set folder icon: {other}"),
    }
}

/// Applies `params` to every dropped item concurrently and waits for all
/// of them.
pub fn handle_drop(exporter: &Exporter, params: &VisualParameters, items: &[DroppedItem]) -> DropOutcome {
    let applied = Mutex::new(Vec::new());
    let error = Mutex::new(None);

    thread::scope(|scope| {
        for item in items {
            let applied = &applied;
            let error = &error;
            scope.spawn(move || match apply_dropped(exporter, params, item) {
                Ok(folder) => applied
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(folder),
                Err(e) => {
                    let message = drop_message(&e);
                    log::warn!("dropped item {item:?}: {message}");
                    *error.lock().unwrap_or_else(PoisonError::into_inner) = Some(message);
                }
            });
        }
    });

    DropOutcome {
        applied: applied.into_inner().unwrap_or_else(PoisonError::into_inner),
        error: error.into_inner().unwrap_or_else(PoisonError::into_inner),
    }
}

// ============================================================================
// Tests
// ============================================================================
