//! Export, import and download of drawings as files, plus drag-and-drop import.

use std::fs;
use std::path::{Path, PathBuf};

use eframe::egui;

use crate::persistence::{PersistenceError, PersistenceResult};
use crate::scene::{RasterFormat, Scene, SceneError};
use crate::util::time;

/// Extension of exported drawing files
pub const EXPORT_EXTENSION: &str = "json";

const UNTITLED_SLUG: &str = "untitled";

/// Lower-case `name` and turn whitespace runs into single hyphens
pub fn slugify(name: &str) -> String {
    let slug = name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() { UNTITLED_SLUG.to_owned() } else { slug }
}

/// File name an exported drawing is offered under
pub fn export_filename(name: &str) -> String {
    format!("{}.{}", slugify(name), EXPORT_EXTENSION)
}

/// File name of a PNG download, unique per millisecond
pub fn png_filename() -> String {
    format!("manga-drawing-{}.png", time::timestamp_millis())
}

/// Write the serialized scene to `path`
pub fn export_to_path(scene: &dyn Scene, path: &Path) -> PersistenceResult<()> {
    fs::write(path, scene.serialize()?)?;
    log::info!("Exported drawing to {}", path.display());
    Ok(())
}

/// Write the serialized scene into `dir` under the slugified `name`
pub fn export_to_file(scene: &dyn Scene, name: &str, dir: &Path) -> PersistenceResult<PathBuf> {
    let path = dir.join(export_filename(name));
    export_to_path(scene, &path)?;
    Ok(path)
}

/// Replace the scene with the contents of an exported drawing file.
///
/// The file is read completely and parsed before the scene is touched; a
/// malformed file leaves the scene unchanged. Returns the display name
/// taken from the file's base name.
pub fn import_from_file(path: &Path, scene: &mut dyn Scene) -> PersistenceResult<String> {
    let text = fs::read_to_string(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::InvalidData => {
            PersistenceError::ImportFormat(format!("{} is not a text file", path.display()))
        }
        _ => PersistenceError::Io(err),
    })?;
    import_from_text(&text, path, scene)
}

/// Same as [`import_from_file`] for contents that were already read
pub fn import_from_text(text: &str, path: &Path, scene: &mut dyn Scene) -> PersistenceResult<String> {
    scene.deserialize(text).map_err(|err| match err {
        SceneError::Deserialize(_) | SceneError::UnsupportedVersion { .. } | SceneError::OutOfRange(_) => {
            PersistenceError::ImportFormat(format!("{}: {}", path.display(), err))
        }
        other => PersistenceError::Scene(other),
    })?;

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    log::info!("Imported drawing '{}' from {}", name, path.display());
    Ok(name)
}

/// Write a full-resolution PNG of the scene to `path`
pub fn write_png(scene: &dyn Scene, path: &Path) -> PersistenceResult<()> {
    fs::write(path, scene.to_raster(RasterFormat::Png, 1.0)?)?;
    log::info!("Downloaded drawing to {}", path.display());
    Ok(())
}

/// Write a full-resolution PNG of the scene into `dir`
pub fn download_png(scene: &dyn Scene, dir: &Path) -> PersistenceResult<PathBuf> {
    let path = dir.join(png_filename());
    write_png(scene, &path)?;
    Ok(path)
}

/// A drawing file dropped onto the window
#[derive(Debug, Clone)]
pub enum DroppedDrawing {
    /// Native drop, still to be read from disk
    Path(PathBuf),
    /// Contents delivered with the drop event
    Contents { name: PathBuf, text: String },
}

/// Collects drawing files dropped onto the window
#[derive(Debug, Default)]
pub struct FileHandler {
    pending: Vec<DroppedDrawing>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up newly dropped files from the UI context.
    /// Returns true if any drawing file was queued.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let before = self.pending.len();

        for file in dropped {
            let display_name = file
                .path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| file.name.clone());

            if !Self::is_drawing_file(&file) {
                log::warn!("Dropped file is not a drawing: {}", display_name);
                continue;
            }

            if let Some(bytes) = &file.bytes {
                match std::str::from_utf8(bytes) {
                    Ok(text) => self.pending.push(DroppedDrawing::Contents {
                        name: PathBuf::from(&file.name),
                        text: text.to_owned(),
                    }),
                    Err(err) => log::warn!("Dropped file {} is not UTF-8: {}", display_name, err),
                }
            } else if let Some(path) = file.path {
                self.pending.push(DroppedDrawing::Path(path));
            } else {
                log::warn!("Dropped file has no accessible data: {}", display_name);
            }
        }

        self.pending.len() > before
    }

    /// Take the queued drops, oldest first
    pub fn take_pending(&mut self) -> Vec<DroppedDrawing> {
        std::mem::take(&mut self.pending)
    }

    /// Check if a file is a drawing based on MIME type or extension
    fn is_drawing_file(file: &egui::DroppedFile) -> bool {
        if !file.mime.is_empty() {
            return file.mime == "application/json" || file.mime.ends_with("+json");
        }
        let path = file.path.clone().unwrap_or_else(|| PathBuf::from(&file.name));
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(EXPORT_EXTENSION))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Sketch A"), "sketch-a");
        assert_eq!(slugify("  Chapter  1\tDraft "), "chapter-1-draft");
        assert_eq!(slugify("   "), "untitled");
        assert_eq!(export_filename("My Manga Page"), "my-manga-page.json");
    }

    #[test]
    fn test_png_filename_shape() {
        let name = png_filename();
        assert!(name.starts_with("manga-drawing-"));
        assert!(name.ends_with(".png"));
    }
}
