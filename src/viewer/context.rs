//! Propagación de contexto: el par (núcleo, instancia) que un provider pone
//! a disposición de todos sus descendientes.

use std::sync::Arc;

use crate::engine::{EngineCore, ViewerEngine};
use crate::error::ContextError;

/// Valor de contexto. El valor por defecto es el contexto vacío (fuera de
/// cualquier provider), igual que el valor inicial de un contexto de UI.
#[derive(Clone, Default)]
pub struct ContextValue {
    pub(crate) core: Option<Arc<dyn EngineCore>>,
    pub(crate) viewer: Option<Arc<dyn ViewerEngine>>,
}

impl ContextValue {
    pub fn new(core: Arc<dyn EngineCore>, viewer: Arc<dyn ViewerEngine>) -> Self {
        Self {
            core: Some(core),
            viewer: Some(viewer),
        }
    }

    /// Contexto sin provider activo.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Acceso con garantía de no-nulidad al par (núcleo, instancia).
///
/// Falla rápido con un error con nombre en vez de devolver nulos en
/// silencio: así una familia entera de fallos del tipo "llamada sobre
/// undefined" se convierte en un único error accionable en la frontera de
/// acceso. Los consumidores deben re-pedir el par en cada uso, nunca
/// cachearlo a través de cambios de provider.
pub fn core_instance(
    ctx: &ContextValue,
) -> Result<(Arc<dyn EngineCore>, Arc<dyn ViewerEngine>), ContextError> {
    let core = ctx.core.clone().ok_or(ContextError::OutsideProvider)?;
    let viewer = ctx.viewer.clone().ok_or(ContextError::EngineNotReady)?;
    Ok((core, viewer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::{MockCore, MockViewer};
    use crate::scheduler::Scheduler;
    use pretty_assertions::assert_eq;

    #[test]
    fn el_contexto_vacio_falla_con_error_con_nombre() {
        let err = core_instance(&ContextValue::empty()).unwrap_err();
        assert_eq!(err, ContextError::OutsideProvider);
    }

    #[test]
    fn nucleo_presente_pero_instancia_ausente_distingue_el_error() {
        let ctx = ContextValue {
            core: Some(MockCore::new()),
            viewer: None,
        };
        let err = core_instance(&ctx).unwrap_err();
        assert_eq!(err, ContextError::EngineNotReady);
    }

    #[test]
    fn con_provider_activo_devuelve_el_par() {
        let sched = Scheduler::new();
        let ctx = ContextValue::new(MockCore::new(), MockViewer::new(sched));
        assert!(core_instance(&ctx).is_ok());
    }
}
