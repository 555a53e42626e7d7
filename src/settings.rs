use std::path::PathBuf;

use egui::{Color32, Vec2};
use serde::{Deserialize, Serialize};

use crate::persistence::{DEFAULT_PREVIEW_SCALE, DEFAULT_QUOTA_BYTES};
use crate::tools::StrokeStyle;

/// Name the application registers its storage under
pub const APP_NAME: &str = "Manga Sketch";

/// Canvas size presets offered in the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl CanvasSize {
    pub const ALL: [CanvasSize; 3] = [CanvasSize::Small, CanvasSize::Medium, CanvasSize::Large];

    pub fn size(&self) -> Vec2 {
        match self {
            CanvasSize::Small => Vec2::new(600.0, 450.0),
            CanvasSize::Medium => Vec2::new(800.0, 600.0),
            CanvasSize::Large => Vec2::new(1024.0, 768.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CanvasSize::Small => "Small (600×450)",
            CanvasSize::Medium => "Medium (800×600)",
            CanvasSize::Large => "Large (1024×768)",
        }
    }
}

/// Editor preferences restored across restarts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct EditorSettings {
    pub canvas_size: CanvasSize,
    pub stroke_width: u32,
    pub stroke_color: Color32,
    /// Bytes available to saved drawings
    pub storage_quota: usize,
    pub preview_scale: f32,
    /// Overrides the platform data directory for saved drawings
    pub storage_dir: Option<PathBuf>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        let style = StrokeStyle::default();
        Self {
            canvas_size: CanvasSize::default(),
            stroke_width: style.width,
            stroke_color: style.color,
            storage_quota: DEFAULT_QUOTA_BYTES,
            preview_scale: DEFAULT_PREVIEW_SCALE,
            storage_dir: None,
        }
    }
}

impl EditorSettings {
    /// Stroke style with the width clamped to the allowed range
    pub fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle {
            color: self.stroke_color,
            width: StrokeStyle::clamp_width(self.stroke_width),
        }
    }

    /// Directory saved drawings live in
    pub fn drawings_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage_dir {
            return dir.clone();
        }
        eframe::storage_dir(APP_NAME)
            .map(|dir| dir.join("drawings"))
            .unwrap_or_else(|| PathBuf::from("drawings"))
    }
}
