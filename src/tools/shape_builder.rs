//! Multi-click construction of lines and polygons.
//!
//! ```text
//!            pointer_down                 pointer_up (Line)
//!   ┌──────┐ ───────────► ┌─────────┐ ─────────────────────► ┌──────┐
//!   │ Idle │              │ Tracing │  double_click (Polygon, │ Idle │
//!   └──────┘ ◄─────────── └─────────┘  more than 2 points) ─► └──────┘
//!             cancel        │     ▲
//!                           └─────┘ pointer_move / pointer_up (Polygon)
//! ```
//!
//! While tracing, the builder owns at most one preview primitive and, for
//! polygons, one trace edge per committed click. Both are tagged as
//! transient in the scene and are removed on close or cancel.

use egui::Pos2;
use thiserror::Error;

use super::StrokeStyle;
use crate::element::{factory, same_point};
use crate::scene::{ObjectData, ObjectHandle, Scene};

/// Shapes built over several pointer events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Line,
    Polygon,
}

/// Why a construction step was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("A polygon needs more than 2 points to close (have {points})")]
    DegenerateShape { points: usize },

    #[error("No polygon is being traced")]
    NotTracing,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum TraceState {
    #[default]
    Idle,
    Tracing {
        kind: ShapeKind,
        /// Never empty while tracing
        points: Vec<Pos2>,
        preview: Option<ObjectHandle>,
        edges: Vec<ObjectHandle>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct MultiClickShapeBuilder {
    state: TraceState,
}

impl MultiClickShapeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TraceState {
        &self.state
    }

    pub fn is_tracing(&self) -> bool {
        matches!(self.state, TraceState::Tracing { .. })
    }

    /// Points accumulated so far; empty when idle
    pub fn points(&self) -> &[Pos2] {
        match &self.state {
            TraceState::Idle => &[],
            TraceState::Tracing { points, .. } => points,
        }
    }

    pub fn preview(&self) -> Option<ObjectHandle> {
        match &self.state {
            TraceState::Tracing { preview, .. } => *preview,
            TraceState::Idle => None,
        }
    }

    /// Start tracing at `pos`. Presses while already tracing are ignored;
    /// polygon vertices are committed on release.
    pub fn pointer_down(&mut self, kind: ShapeKind, pos: Pos2) -> bool {
        if self.is_tracing() {
            return false;
        }
        log::debug!("Start tracing {:?} at {:?}", kind, pos);
        self.state = TraceState::Tracing {
            kind,
            points: vec![pos],
            preview: None,
            edges: Vec::new(),
        };
        true
    }

    /// Replace the preview segment so it runs from the last point to `pos`
    pub fn pointer_move(&mut self, pos: Pos2, style: &StrokeStyle, scene: &mut dyn Scene) {
        let TraceState::Tracing { points, preview, .. } = &mut self.state else {
            return;
        };
        let Some(&last) = points.last() else {
            return;
        };

        // Remove before add so at most one preview exists at any time
        if let Some(old) = preview.take() {
            scene.remove_object(old);
        }
        let segment = factory::create_line(last, pos, style.width_f32(), style.color);
        *preview = Some(scene.add_object(segment, ObjectData::preview()));
    }

    /// Finish a line, or commit the next polygon vertex.
    ///
    /// Returns the handle of a permanent object when one was committed.
    pub fn pointer_up(&mut self, pos: Pos2, style: &StrokeStyle, scene: &mut dyn Scene) -> Option<ObjectHandle> {
        let kind = match &self.state {
            TraceState::Idle => return None,
            TraceState::Tracing { kind, .. } => *kind,
        };

        match kind {
            ShapeKind::Line => self.finish_line(pos, style, scene),
            ShapeKind::Polygon => {
                self.append_vertex(pos, style, scene);
                None
            }
        }
    }

    /// Close the polygon if possible. Too few points is a silent no-op and
    /// tracing continues.
    pub fn double_click(&mut self, style: &StrokeStyle, scene: &mut dyn Scene) -> Option<ObjectHandle> {
        match self.close_polygon(style, scene) {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::debug!("Ignoring double click: {}", err);
                None
            }
        }
    }

    /// Replace the traced edges with a single closed polygon
    pub fn close_polygon(&mut self, style: &StrokeStyle, scene: &mut dyn Scene) -> Result<ObjectHandle, ConstructionError> {
        match &self.state {
            TraceState::Tracing { kind: ShapeKind::Polygon, points, .. } if points.len() <= 2 => {
                return Err(ConstructionError::DegenerateShape { points: points.len() });
            }
            TraceState::Tracing { kind: ShapeKind::Polygon, .. } => {}
            _ => return Err(ConstructionError::NotTracing),
        }

        let TraceState::Tracing { points, preview, edges, .. } = std::mem::take(&mut self.state) else {
            return Err(ConstructionError::NotTracing);
        };
        remove_transients(scene, preview, edges);

        let vertex_count = points.len();
        let polygon = factory::create_polygon(points, style.width_f32(), style.color);
        let handle = scene.add_object(polygon, ObjectData::permanent());
        log::info!("Closed polygon with {} points", vertex_count);
        Ok(handle)
    }

    /// Abandon the current trace, removing every transient primitive.
    /// Returns true if something was being traced.
    pub fn cancel(&mut self, scene: &mut dyn Scene) -> bool {
        match std::mem::take(&mut self.state) {
            TraceState::Idle => false,
            TraceState::Tracing { kind, preview, edges, .. } => {
                log::debug!("Cancelled {:?} construction", kind);
                remove_transients(scene, preview, edges);
                true
            }
        }
    }

    fn finish_line(&mut self, pos: Pos2, style: &StrokeStyle, scene: &mut dyn Scene) -> Option<ObjectHandle> {
        let TraceState::Tracing { points, preview, edges, .. } = std::mem::take(&mut self.state) else {
            return None;
        };
        remove_transients(scene, preview, edges);

        let start = *points.first()?;
        if same_point(start, pos) {
            log::debug!("Discarding zero-length line at {:?}", pos);
            return None;
        }
        let line = factory::create_line(start, pos, style.width_f32(), style.color);
        Some(scene.add_object(line, ObjectData::permanent()))
    }

    fn append_vertex(&mut self, pos: Pos2, style: &StrokeStyle, scene: &mut dyn Scene) {
        let TraceState::Tracing { points, preview, edges, .. } = &mut self.state else {
            return;
        };
        let Some(&last) = points.last() else {
            return;
        };
        // The release of the opening click, or the second click of a double click
        if same_point(last, pos) {
            return;
        }

        if let Some(old) = preview.take() {
            scene.remove_object(old);
        }
        let edge = factory::create_line(last, pos, style.width_f32(), style.color);
        edges.push(scene.add_object(edge, ObjectData::trace_edge()));
        points.push(pos);
    }
}

fn remove_transients(scene: &mut dyn Scene, preview: Option<ObjectHandle>, edges: Vec<ObjectHandle>) {
    for handle in preview.into_iter().chain(edges) {
        scene.remove_object(handle);
    }
}
