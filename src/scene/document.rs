use egui::{Color32, Pos2, Vec2};
use serde::{Deserialize, Serialize};

use super::raster::{self, RasterFormat};
use super::{Brush, ObjectData, ObjectHandle, Scene, SceneError, SceneObject, SceneResult};
use crate::element::Element;

/// Version written into every serialized scene
pub const SNAPSHOT_VERSION: u32 = 1;

pub const DEFAULT_BACKGROUND: Color32 = Color32::WHITE;

/// Loaded geometry must stay within this distance of the canvas origin
pub const MAX_COORDINATE: f32 = 1.0e6;

/// Serialized form of a scene. Transient objects are never included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub version: u32,
    pub background: Color32,
    pub objects: Vec<Element>,
}

/// In-memory retained-mode scene
#[derive(Debug, Clone)]
pub struct Document {
    size: Vec2,
    background: Color32,
    objects: Vec<SceneObject>,
    brush: Brush,
    free_drawing: bool,
    active: Option<ObjectHandle>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Vec2::new(800.0, 600.0))
    }
}

impl Document {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            background: DEFAULT_BACKGROUND,
            objects: Vec::new(),
            brush: Brush::default(),
            free_drawing: false,
            active: None,
        }
    }

    /// Canvas size in canvas pixels
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    pub fn set_background(&mut self, color: Color32) {
        self.background = color;
    }

    /// All objects in stacking order, transient ones included
    pub fn scene_objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Objects that belong to the drawing (no construction helpers)
    pub fn permanent_objects(&self) -> impl DoubleEndedIterator<Item = &SceneObject> {
        self.objects.iter().filter(|object| !object.data.is_temp())
    }

    /// Editable content of a text box
    pub fn text_content_mut(&mut self, handle: ObjectHandle) -> Option<&mut String> {
        let object = self.objects.iter_mut().find(|object| object.handle == handle)?;
        match &mut object.element {
            Element::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            version: SNAPSHOT_VERSION,
            background: self.background,
            objects: self.permanent_objects().map(|object| object.element.clone()).collect(),
        }
    }
}

impl Scene for Document {
    fn add_object(&mut self, element: Element, data: ObjectData) -> ObjectHandle {
        let handle = ObjectHandle::new();
        log::debug!("Adding {} {:?} ({:?})", element.element_type(), handle, data.temp);
        self.objects.push(SceneObject { handle, element, data });
        handle
    }

    fn remove_object(&mut self, handle: ObjectHandle) -> Option<SceneObject> {
        let index = self.objects.iter().position(|object| object.handle == handle)?;
        if self.active == Some(handle) {
            self.active = None;
        }
        Some(self.objects.remove(index))
    }

    fn objects(&self) -> Vec<ObjectHandle> {
        self.objects.iter().map(|object| object.handle).collect()
    }

    fn object(&self, handle: ObjectHandle) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.handle == handle)
    }

    fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn clear(&mut self) {
        self.objects.clear();
        self.active = None;
        self.background = DEFAULT_BACKGROUND;
    }

    fn serialize(&self) -> SceneResult<String> {
        serde_json::to_string(&self.snapshot()).map_err(SceneError::Serialize)
    }

    fn deserialize(&mut self, blob: &str) -> SceneResult<()> {
        let snapshot: SceneSnapshot = serde_json::from_str(blob).map_err(SceneError::Deserialize)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SceneError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        if let Some(element) = snapshot.objects.iter().find(|element| !element.is_within(MAX_COORDINATE)) {
            return Err(SceneError::OutOfRange(element.element_type()));
        }

        self.background = snapshot.background;
        self.active = None;
        self.objects = snapshot
            .objects
            .into_iter()
            .map(|element| SceneObject {
                handle: ObjectHandle::new(),
                element,
                data: ObjectData::permanent(),
            })
            .collect();
        Ok(())
    }

    fn to_raster(&self, format: RasterFormat, scale: f32) -> SceneResult<Vec<u8>> {
        let image = raster::rasterize(self, scale);
        raster::encode(&image, format)
    }

    fn hit_test(&self, pos: Pos2) -> Option<ObjectHandle> {
        self.permanent_objects()
            .rev()
            .find(|object| object.element.hit_test(pos))
            .map(|object| object.handle)
    }

    fn background(&self) -> Color32 {
        self.background
    }

    fn brush(&self) -> Brush {
        self.brush
    }

    fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    fn is_free_drawing(&self) -> bool {
        self.free_drawing
    }

    fn set_free_drawing(&mut self, enabled: bool) {
        self.free_drawing = enabled;
    }

    fn active_object(&self) -> Option<ObjectHandle> {
        self.active
    }

    fn set_active_object(&mut self, handle: Option<ObjectHandle>) {
        self.active = handle.filter(|handle| self.objects.iter().any(|object| object.handle == *handle));
    }
}
