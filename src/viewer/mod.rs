pub mod canvas;
pub mod context;
pub mod document;
pub mod provider;
pub mod zoom;

pub use canvas::{ScrollViewBinding, ViewerCanvas, ViewerElementBinding};
pub use context::{core_instance, ContextValue};
pub use document::{DocumentLoader, LoadCallback, LoadErrorCallback};
pub use provider::ViewerProvider;
pub use zoom::{
    format_zoom_percent, parse_zoom_entry, ZoomBridge, DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP,
};
