//! Leptos components injected into the host page.

mod change_list;
mod controls;
pub mod diagram_canvas;
mod file_diff;
mod file_preview;
mod notices;
mod styles;

pub use change_list::ChangeListDialog;
pub use controls::{LayerToggle, SourceRichToggle};
pub use diagram_canvas::{CanvasViewer, DiagramCanvas};
pub use file_diff::{DualViewer, FileDiffView, SingleViewer};
pub use file_preview::FilePreviewView;
pub use notices::{ErrorNotice, Loading, NotLoggedIn};
pub use styles::{STYLE_ID, ViewerStyles};
