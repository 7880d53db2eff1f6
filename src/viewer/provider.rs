//! Gestor de la instancia compartida: un provider, una instancia.

use std::sync::{Arc, OnceLock};

use crate::bootstrap::{BootstrapLoader, Resource};
use crate::config::Config;
use crate::engine::{pdfium, EngineCore, ViewerEngine};
use crate::error::BootstrapError;
use crate::scheduler::Scheduler;
use crate::viewer::context::ContextValue;

/// Dueño exclusivo de la instancia del visor dentro de su ámbito.
///
/// Construye la instancia de forma perezosa y exactamente una vez: pedir el
/// contexto dos veces devuelve la misma instancia, nunca construye otra. Al
/// soltarse pide `close_document()` (tragándose el caso benigno de "no había
/// documento") y deja intacto el handle global del motor, que es de proceso
/// y puede reutilizarlo un provider posterior.
pub struct ViewerProvider {
    core: Arc<dyn EngineCore>,
    config: Config,
    scheduler: Scheduler,
    instance: OnceLock<Arc<dyn ViewerEngine>>,
}

impl ViewerProvider {
    /// Provider sobre el motor real. Garantiza el arranque del núcleo (no-op
    /// barato si ya está `Ready`) antes de aceptar el ámbito.
    pub fn new(
        loader: &BootstrapLoader,
        config: Config,
        scheduler: Scheduler,
    ) -> Result<Self, BootstrapError> {
        loader.ensure_loaded(Resource::EngineCore)?;
        let core = pdfium::real_core().ok_or(BootstrapError::InitTimeout {
            resource: Resource::EngineCore,
        })?;
        Ok(Self::with_core(core, config, scheduler))
    }

    /// Provider sobre un núcleo arbitrario (el mock, por ejemplo). La
    /// variante se elige aquí, en composición, no inspeccionando tipos en
    /// tiempo de ejecución.
    pub fn with_core(core: Arc<dyn EngineCore>, config: Config, scheduler: Scheduler) -> Self {
        Self {
            core,
            config,
            scheduler,
            instance: OnceLock::new(),
        }
    }

    /// El par (núcleo, instancia) para los descendientes.
    ///
    /// La primera llamada ejecuta las llamadas de preparación únicas del
    /// motor y construye la instancia; las siguientes son re-entradas que
    /// devuelven la misma.
    pub fn context(&self) -> ContextValue {
        let viewer = self
            .instance
            .get_or_init(|| {
                self.core.set_worker_path(&self.config.worker_path());
                self.core.enable_full_pdf();
                let viewer = self.core.new_viewer(&self.scheduler);
                viewer.enable_annotations();
                viewer
            })
            .clone();
        ContextValue::new(Arc::clone(&self.core), viewer)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}

impl Drop for ViewerProvider {
    fn drop(&mut self) {
        if let Some(viewer) = self.instance.get() {
            if let Err(err) = viewer.close_document() {
                log::warn!("cierre de documento al desmontar el provider ignorado: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockCore;
    use crate::viewer::context::core_instance;
    use pretty_assertions::assert_eq;

    fn provider_mock() -> (ViewerProvider, Arc<MockCore>) {
        let core = MockCore::new();
        let provider = ViewerProvider::with_core(
            Arc::clone(&core) as Arc<dyn EngineCore>,
            Config::default(),
            Scheduler::new(),
        );
        (provider, core)
    }

    #[test]
    fn la_preparacion_se_ejecuta_una_sola_vez() {
        let (provider, core) = provider_mock();

        let _ = provider.context();
        let _ = provider.context();

        assert_eq!(core.worker_paths(), vec![Config::default().worker_path()]);
        assert_eq!(core.full_pdf_calls(), 1);
    }

    #[test]
    fn reentrar_devuelve_la_misma_instancia() {
        let (provider, _core) = provider_mock();

        let (_, first) = core_instance(&provider.context()).unwrap();
        let (_, second) = core_instance(&provider.context()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn la_instancia_nace_con_anotaciones_activadas() {
        let (provider, core) = provider_mock();
        let _ = provider.context();
        assert!(core.last_viewer().unwrap().annotations_enabled());
    }

    #[test]
    fn al_soltarse_cierra_el_documento_y_tolera_que_no_haya() {
        let (provider, core) = provider_mock();
        let _ = provider.context();
        let viewer = core.last_viewer().unwrap();

        drop(provider);
        // Se pidió el cierre exactamente una vez, sin documento cargado.
        assert_eq!(viewer.close_calls(), 1);
    }

    #[test]
    fn un_provider_sin_contexto_pedido_no_construye_nada() {
        let (provider, core) = provider_mock();
        drop(provider);
        assert!(core.last_viewer().is_none());
        assert_eq!(core.full_pdf_calls(), 0);
    }
}
