//! Overlay and notice styles, added to the host page once.

use leptos::prelude::*;
use leptos_meta::{Style, provide_meta_context};

pub const STYLE_ID: &str = "model-diff-viewer-style";

const CSS: &str = r#"
.mdv-preview { padding: 8px; }
.mdv-toolbar { display: flex; flex-wrap: wrap; gap: 12px; align-items: center; margin-bottom: 8px; }
.mdv-sides { display: flex; gap: 8px; }
.mdv-side, .mdv-single { flex: 1 1 0; min-width: 0; border: 1px solid var(--borderColor-default, #d0d7de); border-radius: 6px; overflow: hidden; }
.mdv-divider { flex: 0 0 6px; margin: 0 -4px; cursor: col-resize; border-radius: 3px; }
.mdv-divider:hover, .mdv-resizing .mdv-divider { background: var(--borderColor-default, #d0d7de); }
.mdv-resizing { cursor: col-resize; user-select: none; }
.mdv-side-label { font-size: 12px; font-weight: 600; padding: 4px 8px; border-bottom: 1px solid var(--borderColor-default, #d0d7de); }
.mdv-muted { color: var(--fgColor-muted, #656d76); font-size: 12px; }
.mdv-toggle { float: right; margin-right: 8px; }
.mdv-layers { display: flex; gap: 12px; font-size: 12px; }
.mdv-layer { display: inline-flex; align-items: center; gap: 4px; cursor: pointer; }
.mdv-glyph, .mdv-badge { font-weight: 600; }
.mdv-badge { padding: 0 6px; border-radius: 10px; font-size: 12px; color: #fff; white-space: nowrap; }
.diff-added .mdv-glyph { color: #2da44e; } .mdv-badge.diff-added { background: #2da44e; }
.diff-removed .mdv-glyph { color: #cf222e; } .mdv-badge.diff-removed { background: #cf222e; }
.diff-changed .mdv-glyph { color: #bf8700; } .mdv-badge.diff-changed { background: #bf8700; }
.diff-layout-changed .mdv-glyph { color: #0969da; } .mdv-badge.diff-layout-changed { background: #0969da; }
.mdv-loading { display: flex; align-items: center; gap: 8px; padding: 24px; color: var(--fgColor-muted, #656d76); }
.mdv-spinner { width: 16px; height: 16px; border: 2px solid currentColor; border-right-color: transparent; border-radius: 50%; animation: mdv-spin 0.8s linear infinite; }
@keyframes mdv-spin { to { transform: rotate(360deg); } }
.mdv-notice { margin: 40px auto; max-width: 560px; padding: 32px; text-align: center; border: 1px solid var(--borderColor-default, #d0d7de); border-radius: 6px; }
.mdv-notice-icon { font-size: 32px; font-weight: 700; color: var(--fgColor-attention, #9a6700); }
.mdv-notice-actions { display: flex; justify-content: center; gap: 10px; margin-top: 20px; }
.mdv-dialog-backdrop { position: fixed; inset: 0; background: rgba(0, 0, 0, 0.4); z-index: 100; }
.mdv-dialog { position: fixed; top: 5vh; left: 5%; width: 90%; max-height: 90vh; overflow: auto; z-index: 101; padding: 16px; border-radius: 12px; background: var(--bgColor-default, #fff); }
.mdv-dialog-header { display: flex; justify-content: space-between; align-items: center; }
.mdv-changes { width: 100%; border-collapse: collapse; font-size: 13px; }
.mdv-changes th, .mdv-changes td { padding: 6px 8px; border-bottom: 1px solid var(--borderColor-muted, #d8dee4); text-align: left; vertical-align: top; }
.mdv-sortable { cursor: pointer; user-select: none; }
.mdv-attrs { margin: 4px 0 0 16px; font-size: 12px; }
.mdv-pager { display: flex; justify-content: flex-end; align-items: center; gap: 8px; margin-top: 8px; }
"#;

/// Provides its own meta context, so it can be mounted as a separate root.
#[component]
pub fn ViewerStyles() -> impl IntoView {
	provide_meta_context();
	view! { <Style id=STYLE_ID>{CSS}</Style> }
}
