//! Preview pipeline for one displayed file, independent of any UI binding.
//!
//! [`state`] drives fetch, parse and diff; [`overlay`] and [`sync`] drive the
//! two viewers through the [`viewer::DiagramViewer`] contract.

pub mod overlay;
pub mod split;
pub mod state;
pub mod sync;
pub mod toggle;
pub mod viewer;

#[cfg(test)]
pub(crate) mod mock;

pub use overlay::{LayerVisibility, Side};
pub use split::Split;
pub use state::{FileIdentity, Notice, PreviewMachine, PreviewState, load_preview, prepare};
pub use sync::ViewportSync;
pub use toggle::DisplayMode;
pub use viewer::{DiagramViewer, ViewerError, Viewport};
