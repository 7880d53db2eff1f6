//! Vinculación RAII de superficies: la instancia se engancha a las
//! superficies del anfitrión al construirse y se desengancha al soltarse.

use std::sync::Arc;

use crate::engine::{SurfaceHandle, ViewerEngine};
use crate::error::ContextError;
use crate::viewer::context::{core_instance, ContextValue};

/// Superficie donde el motor pinta las páginas.
pub struct ViewerElementBinding {
    viewer: Arc<dyn ViewerEngine>,
}

impl ViewerElementBinding {
    pub fn new(ctx: &ContextValue, surface: SurfaceHandle) -> Result<Self, ContextError> {
        let (_, viewer) = core_instance(ctx)?;
        viewer.set_viewer_element(Some(surface));
        Ok(Self { viewer })
    }
}

impl Drop for ViewerElementBinding {
    fn drop(&mut self) {
        self.viewer.set_viewer_element(None);
    }
}

/// Superficie contenedora que gestiona el scroll del visor.
#[derive(Debug)]
pub struct ScrollViewBinding {
    viewer: Arc<dyn ViewerEngine>,
}

impl ScrollViewBinding {
    pub fn new(ctx: &ContextValue, surface: SurfaceHandle) -> Result<Self, ContextError> {
        let (_, viewer) = core_instance(ctx)?;
        viewer.set_scroll_view_element(Some(surface));
        Ok(Self { viewer })
    }
}

impl Drop for ScrollViewBinding {
    fn drop(&mut self) {
        self.viewer.set_scroll_view_element(None);
    }
}

/// Lienzo completo: contenedor de scroll por fuera, superficie de pintado
/// por dentro, en ese orden.
pub struct ViewerCanvas {
    _scroll: ScrollViewBinding,
    _viewer: ViewerElementBinding,
}

impl ViewerCanvas {
    pub fn new(
        ctx: &ContextValue,
        scroll_surface: SurfaceHandle,
        viewer_surface: SurfaceHandle,
    ) -> Result<Self, ContextError> {
        let scroll = ScrollViewBinding::new(ctx, scroll_surface)?;
        let viewer = ViewerElementBinding::new(ctx, viewer_surface)?;
        Ok(Self {
            _scroll: scroll,
            _viewer: viewer,
        })
    }
}
