//! Assigning a rendered icon to a folder through the operating system.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::RgbaImage;

/// Sets a folder's custom icon.
///
/// Implementations receive the normalized square icon and an existing
/// directory. Errors are the OS's own and are wrapped by the exporter.
pub trait IconAssigner: Send + Sync {
    fn assign(&self, icon: &RgbaImage, folder: &Path) -> io::Result<()>;
}

/// The assigner for the platform this binary was built for.
///
/// Assigners that hand the OS a file stage it in `staging_dir`.
pub fn default_assigner(staging_dir: &Path) -> Box<dyn IconAssigner> {
    if cfg!(target_os = "macos") {
        Box::new(WorkspaceAssigner::new(staging_dir))
    } else {
        Box::new(DesktopEntryAssigner)
    }
}

fn save_png(icon: &RgbaImage, path: &Path) -> io::Result<()> {
    icon.save_with_format(path, image::ImageFormat::Png)
        .map_err(io::Error::other)
}

// ============================================================================
// macOS
// ============================================================================

const STAGED_FILE_NAME: &str = "folderIcon.png";

/// JavaScript for Automation: `run(argv)` gets the PNG path and the folder.
/// Option 2 excludes pre-10.5 icon elements.
const SET_ICON_SCRIPT: &str = r#"ObjC.import('AppKit');
function run(argv) {
  const image = $.NSImage.alloc.initWithContentsOfFile(argv[0]);
  if (image.isNil()) { throw new Error('could not load ' + argv[0]); }
  if (!$.NSWorkspace.sharedWorkspace.setIconForFileOptions(image, argv[1], 2)) {
    throw new Error('NSWorkspace refused the icon');
  }
}"#;

/// Sets the Finder icon through `NSWorkspace`, driven by `osascript`.
#[derive(Debug, Clone)]
pub struct WorkspaceAssigner {
    staging_dir: PathBuf,
}

impl WorkspaceAssigner {
    /// `staging_dir` receives the PNG that `NSImage` loads.
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
        }
    }

    pub fn staged_path(&self) -> PathBuf {
        self.staging_dir.join(STAGED_FILE_NAME)
    }
}

impl IconAssigner for WorkspaceAssigner {
    fn assign(&self, icon: &RgbaImage, folder: &Path) -> io::Result<()> {
        fs::create_dir_all(&self.staging_dir)?;
        let staged = self.staged_path();
        save_png(icon, &staged)?;

        let output = Command::new("osascript")
            .args(["-l", "JavaScript", "-e", SET_ICON_SCRIPT])
            .arg(&staged)
            .arg(folder)
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(io::Error::other(stderr.trim().to_string()))
        }
    }
}

// ============================================================================
// freedesktop
// ============================================================================

const ICON_FILE_NAME: &str = ".folder-icon.png";
const DESKTOP_ENTRY_FILE: &str = ".directory";

/// Writes the icon into the folder and points a `.directory` desktop entry
/// at it, which Dolphin, Nautilus and most freedesktop file managers honor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopEntryAssigner;

impl IconAssigner for DesktopEntryAssigner {
    fn assign(&self, icon: &RgbaImage, folder: &Path) -> io::Result<()> {
        let icon_path = folder.join(ICON_FILE_NAME);
        save_png(icon, &icon_path)?;

        let entry_path = folder.join(DESKTOP_ENTRY_FILE);
        let existing = match fs::read_to_string(&entry_path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };
        let icon_ref = format!("./{ICON_FILE_NAME}");
        fs::write(&entry_path, upsert_icon_entry(&existing, &icon_ref))
    }
}

/// Sets `Icon=` in the `[Desktop Entry]` group, keeping every other line.
fn upsert_icon_entry(existing: &str, icon: &str) -> String {
    let mut out = Vec::new();
    let mut in_entry = false;
    let mut written = false;

    for line in existing.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            if in_entry && !written {
                out.push(format!("Icon={icon}"));
                written = true;
            }
            in_entry = trimmed == "[Desktop Entry]";
            out.push(line.to_string());
            continue;
        }
        if in_entry && trimmed.starts_with("Icon=") {
            if !written {
                out.push(format!("Icon={icon}"));
                written = true;
            }
            continue;
        }
        out.push(line.to_string());
    }

    if in_entry && !written {
        out.push(format!("Icon={icon}"));
        written = true;
    }
    if !written {
        if !out.is_empty() {
            out.push(String::new());
        }
        out.push("[Desktop Entry]".to_string());
        out.push(format!("Icon={icon}"));
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn desktop_entry_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let icon = RgbaImage::from_pixel(4, 4, Rgba([0, 122, 255, 255]));

        DesktopEntryAssigner.assign(&icon, dir.path()).unwrap();

        let entry = fs::read_to_string(dir.path().join(".directory")).unwrap();
        assert_eq!(entry, "[Desktop Entry]\nIcon=./.folder-icon.png\n");
        let written = image::open(dir.path().join(".folder-icon.png")).unwrap();
        assert_eq!(written.to_rgba8(), icon);
    }

    #[test]
    fn existing_icon_line_is_replaced() {
        let existing = "[Desktop Entry]\nIcon=folder-red\nName=Work\n\n[Other]\nIcon=keep\n";
        assert_eq!(
            upsert_icon_entry(existing, "./x.png"),
            "[Desktop Entry]\nIcon=./x.png\nName=Work\n\n[Other]\nIcon=keep\n"
        );
    }

    #[test]
    fn icon_is_added_to_existing_group() {
        let existing = "[Desktop Entry]\nName=Work\n[Other]\nA=1";
        assert_eq!(
            upsert_icon_entry(existing, "./x.png"),
            "[Desktop Entry]\nName=Work\nIcon=./x.png\n[Other]\nA=1\n"
        );
    }

    #[test]
    fn group_is_appended_when_missing() {
        assert_eq!(
            upsert_icon_entry("[Other]\nA=1\n", "./x.png"),
            "[Other]\nA=1\n\n[Desktop Entry]\nIcon=./x.png\n"
        );
    }

    #[test]
    fn workspace_icon_is_staged_in_the_given_dir() {
        let dir = tempfile::tempdir().unwrap();
        let assigner = WorkspaceAssigner::new(dir.path());
        assert_eq!(assigner.staged_path(), dir.path().join("folderIcon.png"));
    }

    #[test]
    fn missing_folder_fails() {
        let icon = RgbaImage::new(1, 1);
        assert!(
            DesktopEntryAssigner
                .assign(&icon, Path::new("/no/such/folder"))
                .is_err()
        );
    }
}
