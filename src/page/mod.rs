//! GitHub page integration: which page this is, what it gets, and where it goes.
//!
//! [`url`], [`navigation`] and [`plan`] are DOM-free; [`dom`] and [`inject`] touch the page.

pub mod dom;
pub mod inject;
pub mod navigation;
pub mod plan;
pub mod url;

pub use inject::run;
pub use navigation::{Navigation, Visit};
pub use plan::{PagePlan, resolve_page};
pub use url::PageKind;
