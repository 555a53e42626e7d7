#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod editor;
pub mod element;
pub mod file_handler;
pub mod id_generator;
pub mod panels;
pub mod persistence;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod tools;
pub mod util;

pub use app::MangaSketchApp;
pub use command::HistoryStack;
pub use editor::DrawingEditor;
pub use element::Element;
pub use persistence::{PersistenceError, PersistenceManager};
pub use renderer::Renderer;
pub use scene::{Document, Scene};
pub use tools::{Tool, ToolController};
