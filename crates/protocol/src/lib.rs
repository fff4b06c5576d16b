pub mod commands;
pub mod theme;
pub mod types;

pub use commands::{RenderCommand, TextAlign};
pub use theme::{Paint, Theme, ThemeToken};
pub use types::{Color, Point, Rect};
