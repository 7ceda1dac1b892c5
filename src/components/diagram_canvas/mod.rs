//! Canvas diagram viewer.
//!
//! Draws a [`ParsedDocument`](crate::model::ParsedDocument) from its diagram
//! interchange geometry with:
//! - Pan and wheel zoom, mirrored to a sibling viewer through listeners
//! - Per-category change markers with glyph badges
//! - A fading flash ring for elements picked from the change list
//!
//! # Example
//!
//! ```ignore
//! let viewer = CanvasViewer::new();
//! viewer.import(document)?;
//! view! { <DiagramCanvas viewer=viewer height=300.0 /> }
//! ```

mod component;
mod render;
pub mod scale;
mod state;
pub mod theme;
mod viewer;

pub use component::DiagramCanvas;
pub use state::CanvasState;
pub use theme::DiagramTheme;
pub use viewer::CanvasViewer;
