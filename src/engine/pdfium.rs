//! Motor real: PDFium enlazado dinámicamente.
//!
//! El "handle global" del que habla el resto del crate es el espacio de
//! nombres de PDFium una vez enlazado: vive en un `OnceLock` de proceso,
//! igual que un script externo que puebla un global al cargar. Nunca se
//! destruye; un provider posterior lo reutiliza tal cual.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use pdfium_render::prelude::*;

use crate::bootstrap::{Resource, ResourceBinder};
use crate::config::Config;
use crate::engine::{
    EngineCore, EventCallback, EventKind, ListenerId, ListenerTable, SurfaceHandle, ViewerEngine,
    ViewerEvent,
};
use crate::error::{BootstrapError, DocumentLoadError, ModuleError};
use crate::module::DocumentModule;
use crate::scheduler::Scheduler;

/// Espacio de nombres del motor ya enlazado.
pub struct EngineHandle {
    pdfium: Pdfium,
}

// PDFium serializa todas sus operaciones internamente y este crate usa un
// modelo cooperativo de un solo hilo; el handle solo se comparte para leer.
unsafe impl Send for EngineHandle {}
unsafe impl Sync for EngineHandle {}

impl EngineHandle {
    fn pdfium(&self) -> &Pdfium {
        &self.pdfium
    }
}

static ENGINE_CORE: OnceLock<EngineHandle> = OnceLock::new();
static MODULE: OnceLock<Arc<RealModule>> = OnceLock::new();

/// Handle global del núcleo, si el arranque ya lo pobló.
pub fn core_handle() -> Option<&'static EngineHandle> {
    ENGINE_CORE.get()
}

/// Núcleo real listo para un provider, o `None` si el arranque no terminó.
pub fn real_core() -> Option<Arc<dyn EngineCore>> {
    core_handle().map(|handle| Arc::new(RealCore::new(handle)) as Arc<dyn EngineCore>)
}

// --- Binder real ---

/// Inyección real de recursos: enlaza la librería dinámica de PDFium.
/// Intentamos cargar desde la carpeta configurada primero, luego en sistema,
/// igual que con la DLL que descarga build.rs.
pub struct PdfiumBinder {
    config: Config,
}

impl PdfiumBinder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ResourceBinder for PdfiumBinder {
    fn inject(&self, resource: Resource) -> Result<(), BootstrapError> {
        match resource {
            Resource::EngineCore => {
                if ENGINE_CORE.get().is_some() {
                    return Ok(());
                }

                let library = Pdfium::pdfium_platform_library_name_at_path(
                    self.config.engine_path.as_path(),
                );
                let bindings = Pdfium::bind_to_library(library)
                    .or_else(|_| Pdfium::bind_to_system_library())
                    .map_err(|e| BootstrapError::LoadFailed {
                        resource,
                        cause: e.to_string(),
                    })?;

                let _ = ENGINE_CORE.set(EngineHandle {
                    pdfium: Pdfium::new(bindings),
                });
                log::info!("núcleo del visor enlazado desde {:?}", self.config.engine_path);
                Ok(())
            }
            Resource::ProgrammaticModule => {
                // El módulo cuelga del núcleo: sin handle global no hay nada
                // que inicializar.
                let handle = core_handle().ok_or_else(|| BootstrapError::LoadFailed {
                    resource,
                    cause: "el núcleo del visor no está cargado".into(),
                })?;

                let _ = MODULE.set(Arc::new(RealModule { handle }));
                log::info!(
                    "módulo programático inicializado desde {:?}",
                    self.config.module_path
                );
                Ok(())
            }
        }
    }

    fn handle_present(&self, resource: Resource) -> bool {
        match resource {
            Resource::EngineCore => ENGINE_CORE.get().is_some(),
            Resource::ProgrammaticModule => MODULE.get().is_some(),
        }
    }
}

// --- Núcleo real ---

#[derive(Default)]
struct CoreState {
    worker_path: Option<PathBuf>,
    full_pdf: bool,
}

/// Implementación real de [`EngineCore`] sobre el handle global.
pub struct RealCore {
    handle: &'static EngineHandle,
    state: Mutex<CoreState>,
}

impl RealCore {
    fn new(handle: &'static EngineHandle) -> Self {
        Self {
            handle,
            state: Mutex::new(CoreState::default()),
        }
    }

    pub fn worker_path(&self) -> Option<PathBuf> {
        self.state.lock().unwrap().worker_path.clone()
    }

    pub fn full_pdf_enabled(&self) -> bool {
        self.state.lock().unwrap().full_pdf
    }
}

impl std::fmt::Debug for RealCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealCore").finish_non_exhaustive()
    }
}

impl EngineCore for RealCore {
    fn set_worker_path(&self, path: &Path) {
        log::debug!("worker path del motor: {:?}", path);
        self.state.lock().unwrap().worker_path = Some(path.to_path_buf());
    }

    fn enable_full_pdf(&self) {
        self.state.lock().unwrap().full_pdf = true;
    }

    fn new_viewer(&self, scheduler: &Scheduler) -> Arc<dyn ViewerEngine> {
        Arc::new(RealViewer::new(self.handle, scheduler.clone()))
    }

    fn module(&self) -> Option<Arc<dyn DocumentModule>> {
        MODULE.get().map(|m| Arc::clone(m) as Arc<dyn DocumentModule>)
    }
}

// --- Instancia real del visor ---

struct ViewerState {
    zoom: f32,
    document: Option<PdfDocument<'static>>,
    viewer_surface: Option<SurfaceHandle>,
    scroll_surface: Option<SurfaceHandle>,
    annotations: bool,
}

// El documento guarda punteros crudos de PDFium; el acceso siempre pasa por
// el Mutex y el motor serializa internamente.
unsafe impl Send for ViewerState {}

/// Una instancia del visor sobre el motor real. PDFium no tiene noción de
/// zoom de visor, así que el zoom vive aquí, como estado de la instancia,
/// y se notifica por el mismo camino diferido que usa el mock.
pub struct RealViewer {
    handle: &'static EngineHandle,
    scheduler: Scheduler,
    listeners: Arc<ListenerTable>,
    state: Arc<Mutex<ViewerState>>,
}

impl RealViewer {
    pub fn document_open(&self) -> bool {
        self.state.lock().unwrap().document.is_some()
    }

    pub fn annotations_enabled(&self) -> bool {
        self.state.lock().unwrap().annotations
    }

    pub fn bound_viewer_surface(&self) -> Option<SurfaceHandle> {
        self.state.lock().unwrap().viewer_surface
    }

    pub fn bound_scroll_surface(&self) -> Option<SurfaceHandle> {
        self.state.lock().unwrap().scroll_surface
    }

    fn new(handle: &'static EngineHandle, scheduler: Scheduler) -> Self {
        Self {
            handle,
            scheduler,
            listeners: Arc::new(ListenerTable::new()),
            state: Arc::new(Mutex::new(ViewerState {
                zoom: 1.0,
                document: None,
                viewer_surface: None,
                scroll_surface: None,
                annotations: false,
            })),
        }
    }
}

impl std::fmt::Debug for RealViewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealViewer").finish_non_exhaustive()
    }
}

impl ViewerEngine for RealViewer {
    fn zoom_level(&self) -> f32 {
        self.state.lock().unwrap().zoom
    }

    fn zoom_to(&self, level: f32) {
        self.state.lock().unwrap().zoom = level;

        let listeners = Arc::clone(&self.listeners);
        let state = Arc::clone(&self.state);
        self.scheduler.defer(move || {
            let zoom = state.lock().unwrap().zoom;
            listeners.emit(&ViewerEvent::ZoomUpdated(zoom));
        });
    }

    fn add_event_listener(&self, kind: EventKind, callback: EventCallback) -> ListenerId {
        self.listeners.add(kind, callback)
    }

    fn remove_event_listener(&self, id: ListenerId) {
        self.listeners.remove(id);
    }

    fn set_viewer_element(&self, surface: Option<SurfaceHandle>) {
        self.state.lock().unwrap().viewer_surface = surface;
    }

    fn set_scroll_view_element(&self, surface: Option<SurfaceHandle>) {
        self.state.lock().unwrap().scroll_surface = surface;
    }

    fn load_document(&self, path: &Path) -> Result<(), DocumentLoadError> {
        let document = self
            .handle
            .pdfium()
            .load_pdf_from_file(path, None)
            .map_err(|e| DocumentLoadError::Engine {
                path: path.to_path_buf(),
                cause: e.to_string(),
            })?;

        log::info!("documento cargado: {:?} ({} páginas)", path, document.pages().len());
        self.state.lock().unwrap().document = Some(document);

        let listeners = Arc::clone(&self.listeners);
        self.scheduler.defer(move || {
            listeners.emit(&ViewerEvent::DocumentLoaded);
        });
        Ok(())
    }

    fn close_document(&self) -> Result<(), DocumentLoadError> {
        // Soltar el documento libera su memoria en el lado C.
        let previous = self.state.lock().unwrap().document.take();
        if previous.is_none() {
            log::debug!("close_document sin documento cargado: no-op");
        }
        Ok(())
    }

    fn enable_annotations(&self) {
        self.state.lock().unwrap().annotations = true;
    }
}

// --- Módulo programático real ---

/// Módulo de manipulación programática sobre el mismo handle enlazado.
/// La licencia se pasa tal cual al motor; la cadena vacía es legal.
pub struct RealModule {
    handle: &'static EngineHandle,
}

impl DocumentModule for RealModule {
    fn begin_session(&self, license: &str) -> Result<(), ModuleError> {
        let _ = self.handle;
        if license.is_empty() {
            log::debug!("sesión del módulo sin licencia (modo evaluación)");
        } else {
            log::debug!("sesión del módulo con licencia de {} caracteres", license.len());
        }
        Ok(())
    }

    fn end_session(&self) {
        log::debug!("sesión del módulo cerrada y recursos liberados");
    }
}
