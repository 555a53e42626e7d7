//! The retained-mode scene the editor draws into.
//!
//! The editor core never reaches into a concrete scene; it goes through the
//! [`Scene`] trait, which models the capabilities of a 2D scene library:
//! adding and removing objects, ordered enumeration, hit testing,
//! serialization and raster snapshots. [`Document`] is the in-memory
//! implementation used by the application and the tests.

mod document;
pub mod raster;

use egui::{Color32, Pos2};
use thiserror::Error;

use crate::element::Element;

pub use document::{Document, SceneSnapshot, SNAPSHOT_VERSION};
pub use raster::RasterFormat;

/// Errors produced by scene serialization and rasterization
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Failed to serialize scene: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Invalid scene data: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("Unsupported scene version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Scene contains a {0} outside the drawable range")]
    OutOfRange(&'static str),

    #[error("Failed to encode raster snapshot: {0}")]
    Raster(#[from] image::ImageError),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Opaque handle of an object owned by a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(usize);

impl ObjectHandle {
    pub fn new() -> Self {
        Self(crate::id_generator::generate_id())
    }

    pub fn id(&self) -> usize {
        self.0
    }
}

impl Default for ObjectHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Role of a transient object that only exists while a shape is under construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempKind {
    /// Live segment from the last traced point to the cursor
    Preview,
    /// Edge of a polygon that is still being traced
    TraceEdge,
}

/// Tag data attached to a scene object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectData {
    pub temp: Option<TempKind>,
}

impl ObjectData {
    pub fn permanent() -> Self {
        Self { temp: None }
    }

    pub fn preview() -> Self {
        Self { temp: Some(TempKind::Preview) }
    }

    pub fn trace_edge() -> Self {
        Self { temp: Some(TempKind::TraceEdge) }
    }

    pub fn is_temp(&self) -> bool {
        self.temp.is_some()
    }
}

/// An object stored in a scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub handle: ObjectHandle,
    pub element: Element,
    pub data: ObjectData,
}

/// The free-drawing brush of a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub color: Color32,
    pub width: f32,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            color: Color32::BLACK,
            width: 2.0,
        }
    }
}

/// Capabilities the editor needs from a retained-mode 2D scene
pub trait Scene {
    /// Add an object on top of the stack and return its handle
    fn add_object(&mut self, element: Element, data: ObjectData) -> ObjectHandle;

    /// Remove an object; returns it if it was present
    fn remove_object(&mut self, handle: ObjectHandle) -> Option<SceneObject>;

    /// Handles of all objects in creation (stacking) order
    fn objects(&self) -> Vec<ObjectHandle>;

    /// Look up an object by handle
    fn object(&self, handle: ObjectHandle) -> Option<&SceneObject>;

    /// Number of objects, transient ones included
    fn object_count(&self) -> usize {
        self.objects().len()
    }

    /// Remove every object and reset the background
    fn clear(&mut self);

    /// Serialize the permanent objects to an opaque blob
    fn serialize(&self) -> SceneResult<String>;

    /// Replace the scene contents with a serialized blob.
    ///
    /// The blob is fully validated before anything is replaced; on error
    /// the scene is left untouched.
    fn deserialize(&mut self, blob: &str) -> SceneResult<()>;

    /// Encode a raster snapshot, scaled by `scale` (1.0 = full size)
    fn to_raster(&self, format: RasterFormat, scale: f32) -> SceneResult<Vec<u8>>;

    /// Topmost permanent object under `pos`
    fn hit_test(&self, pos: Pos2) -> Option<ObjectHandle>;

    fn background(&self) -> Color32;

    fn brush(&self) -> Brush;

    fn set_brush(&mut self, brush: Brush);

    fn is_free_drawing(&self) -> bool;

    fn set_free_drawing(&mut self, enabled: bool);

    /// Currently selected object, if any
    fn active_object(&self) -> Option<ObjectHandle>;

    fn set_active_object(&mut self, handle: Option<ObjectHandle>);

    /// Deselect the active object
    fn discard_active_object(&mut self) {
        self.set_active_object(None);
    }
}
