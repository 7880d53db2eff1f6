//! Doble de pruebas del motor: cumple el mismo contrato de capacidades que
//! el motor real sin ninguna dependencia externa. Sirve para tests aislados
//! y para previsualizaciones donde no interesa arrancar el motor de verdad.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::engine::{
    EngineCore, EventCallback, EventKind, ListenerId, ListenerTable, SurfaceHandle, ViewerEngine,
    ViewerEvent,
};
use crate::error::{DocumentLoadError, ModuleError};
use crate::module::DocumentModule;
use crate::scheduler::Scheduler;
use crate::viewer::context::ContextValue;

struct MockInner {
    zoom: f32,
    document: Option<PathBuf>,
    viewer_surface: Option<SurfaceHandle>,
    scroll_surface: Option<SurfaceHandle>,
    annotations: bool,
    load_requests: Vec<PathBuf>,
    close_calls: u32,
    fail_load: Option<String>,
}

/// Visor en memoria. El zoom es una variable local; `zoom_to` programa la
/// notificación en el siguiente tick, igual que el motor real, para que
/// ningún consumidor pueda apoyarse en efectos síncronos que en producción
/// no existen.
pub struct MockViewer {
    scheduler: Scheduler,
    listeners: Arc<ListenerTable>,
    inner: Arc<Mutex<MockInner>>,
}

impl MockViewer {
    pub fn new(scheduler: Scheduler) -> Arc<Self> {
        Self::with_zoom(scheduler, 1.0)
    }

    pub fn with_zoom(scheduler: Scheduler, initial_zoom: f32) -> Arc<Self> {
        Arc::new(Self {
            scheduler,
            listeners: Arc::new(ListenerTable::new()),
            inner: Arc::new(Mutex::new(MockInner {
                zoom: initial_zoom,
                document: None,
                viewer_surface: None,
                scroll_surface: None,
                annotations: false,
                load_requests: Vec::new(),
                close_calls: 0,
                fail_load: None,
            })),
        })
    }

    // --- Mandos e inspección para tests ---

    /// Fuerza que las próximas cargas fallen con esta causa.
    pub fn fail_loads_with(&self, cause: &str) {
        self.inner.lock().unwrap().fail_load = Some(cause.to_string());
    }

    pub fn clear_load_failure(&self) {
        self.inner.lock().unwrap().fail_load = None;
    }

    /// Rutas que llegaron al motor, en orden y contando los fallos.
    pub fn load_requests(&self) -> Vec<PathBuf> {
        self.inner.lock().unwrap().load_requests.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn document_open(&self) -> bool {
        self.inner.lock().unwrap().document.is_some()
    }

    pub fn close_calls(&self) -> u32 {
        self.inner.lock().unwrap().close_calls
    }

    pub fn bound_viewer_surface(&self) -> Option<SurfaceHandle> {
        self.inner.lock().unwrap().viewer_surface
    }

    pub fn bound_scroll_surface(&self) -> Option<SurfaceHandle> {
        self.inner.lock().unwrap().scroll_surface
    }

    pub fn annotations_enabled(&self) -> bool {
        self.inner.lock().unwrap().annotations
    }
}

impl std::fmt::Debug for MockViewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockViewer").finish_non_exhaustive()
    }
}

impl ViewerEngine for MockViewer {
    fn zoom_level(&self) -> f32 {
        self.inner.lock().unwrap().zoom
    }

    fn zoom_to(&self, level: f32) {
        self.inner.lock().unwrap().zoom = level;

        // El valor emitido se lee en el momento del disparo: es el estado
        // real del motor, no el que había al encolar.
        let listeners = Arc::clone(&self.listeners);
        let inner = Arc::clone(&self.inner);
        self.scheduler.defer(move || {
            let zoom = inner.lock().unwrap().zoom;
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
        self.inner.lock().unwrap().viewer_surface = surface;
    }

    fn set_scroll_view_element(&self, surface: Option<SurfaceHandle>) {
        self.inner.lock().unwrap().scroll_surface = surface;
    }

    fn load_document(&self, path: &Path) -> Result<(), DocumentLoadError> {
        let mut inner = self.inner.lock().unwrap();
        inner.load_requests.push(path.to_path_buf());

        if let Some(cause) = inner.fail_load.clone() {
            return Err(DocumentLoadError::Engine {
                path: path.to_path_buf(),
                cause,
            });
        }

        inner.document = Some(path.to_path_buf());
        drop(inner);

        let listeners = Arc::clone(&self.listeners);
        self.scheduler.defer(move || {
            listeners.emit(&ViewerEvent::DocumentLoaded);
        });
        Ok(())
    }

    fn close_document(&self) -> Result<(), DocumentLoadError> {
        // Cerrar sin documento es benigno, no un error.
        let mut inner = self.inner.lock().unwrap();
        inner.close_calls += 1;
        inner.document = None;
        Ok(())
    }

    fn enable_annotations(&self) {
        self.inner.lock().unwrap().annotations = true;
    }
}

// --- Núcleo mock ---

#[derive(Default)]
struct MockCoreInner {
    worker_paths: Vec<PathBuf>,
    full_pdf_calls: u32,
    module: Option<Arc<dyn DocumentModule>>,
    last_viewer: Option<Arc<MockViewer>>,
}

/// Espacio de nombres falso del motor: registra las llamadas de preparación
/// y fabrica visores mock.
#[derive(Default)]
pub struct MockCore {
    inner: Mutex<MockCoreInner>,
}

impl MockCore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn worker_paths(&self) -> Vec<PathBuf> {
        self.inner.lock().unwrap().worker_paths.clone()
    }

    pub fn full_pdf_calls(&self) -> u32 {
        self.inner.lock().unwrap().full_pdf_calls
    }

    /// El último visor fabricado, para poder inspeccionarlo desde los tests.
    pub fn last_viewer(&self) -> Option<Arc<MockViewer>> {
        self.inner.lock().unwrap().last_viewer.clone()
    }

    /// Instala un módulo programático falso (por defecto no hay ninguno,
    /// igual que cuando su arranque todavía no terminó).
    pub fn set_module(&self, module: Arc<dyn DocumentModule>) {
        self.inner.lock().unwrap().module = Some(module);
    }
}

impl std::fmt::Debug for MockCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCore").finish_non_exhaustive()
    }
}

impl EngineCore for MockCore {
    fn set_worker_path(&self, path: &Path) {
        self.inner.lock().unwrap().worker_paths.push(path.to_path_buf());
    }

    fn enable_full_pdf(&self) {
        self.inner.lock().unwrap().full_pdf_calls += 1;
    }

    fn new_viewer(&self, scheduler: &Scheduler) -> Arc<dyn ViewerEngine> {
        let viewer = MockViewer::new(scheduler.clone());
        self.inner.lock().unwrap().last_viewer = Some(Arc::clone(&viewer));
        viewer
    }

    fn module(&self) -> Option<Arc<dyn DocumentModule>> {
        self.inner.lock().unwrap().module.clone()
    }
}

// --- Módulo programático mock ---

#[derive(Default)]
struct MockModuleInner {
    begins: Vec<String>,
    ends: u32,
    fail_begin: bool,
}

#[derive(Default)]
pub struct MockModule {
    inner: Mutex<MockModuleInner>,
}

impl MockModule {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_begin(&self) {
        self.inner.lock().unwrap().fail_begin = true;
    }

    /// Licencias recibidas, en orden.
    pub fn begins(&self) -> Vec<String> {
        self.inner.lock().unwrap().begins.clone()
    }

    pub fn ends(&self) -> u32 {
        self.inner.lock().unwrap().ends
    }
}

impl DocumentModule for MockModule {
    fn begin_session(&self, license: &str) -> Result<(), ModuleError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_begin {
            return Err(ModuleError::Engine("begin_session forzado a fallar".into()));
        }
        inner.begins.push(license.to_string());
        Ok(())
    }

    fn end_session(&self) {
        self.inner.lock().unwrap().ends += 1;
    }
}

// --- Provider mock ---

/// Provider para previsualizaciones y tests: entrega el mismo `ContextValue`
/// que el provider real pero respaldado por el motor en memoria, así los
/// componentes reales funcionan sin cambios.
pub struct MockProvider {
    scheduler: Scheduler,
    core: Arc<MockCore>,
    viewer: Arc<MockViewer>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_zoom(1.0)
    }

    pub fn with_zoom(initial_zoom: f32) -> Self {
        let scheduler = Scheduler::new();
        let core = MockCore::new();
        let viewer = MockViewer::with_zoom(scheduler.clone(), initial_zoom);
        Self {
            scheduler,
            core,
            viewer,
        }
    }

    pub fn context(&self) -> ContextValue {
        ContextValue::new(
            Arc::clone(&self.core) as Arc<dyn EngineCore>,
            Arc::clone(&self.viewer) as Arc<dyn ViewerEngine>,
        )
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn viewer(&self) -> &Arc<MockViewer> {
        &self.viewer
    }

    pub fn core(&self) -> &Arc<MockCore> {
        &self.core
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collector() -> (EventCallback, Arc<Mutex<Vec<ViewerEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let cb: EventCallback = Arc::new(move |ev| sink.lock().unwrap().push(ev.clone()));
        (cb, seen)
    }

    #[test]
    fn la_notificacion_de_zoom_es_diferida() {
        let sched = Scheduler::new();
        let viewer = MockViewer::new(sched.clone());
        let (cb, seen) = collector();
        viewer.add_event_listener(EventKind::ZoomUpdated, cb);

        viewer.zoom_to(2.0);
        // El estado cambia ya, la notificación todavía no.
        assert_eq!(viewer.zoom_level(), 2.0);
        assert!(seen.lock().unwrap().is_empty());

        sched.pump();
        assert_eq!(*seen.lock().unwrap(), vec![ViewerEvent::ZoomUpdated(2.0)]);
    }

    #[test]
    fn dar_de_baja_un_token_desconocido_no_falla() {
        let sched = Scheduler::new();
        let viewer = MockViewer::new(sched.clone());
        let (cb, _) = collector();
        let id = viewer.add_event_listener(EventKind::ZoomUpdated, cb);
        viewer.remove_event_listener(id);
        viewer.remove_event_listener(id); // segunda baja: no-op
        assert_eq!(viewer.listener_count(), 0);
    }

    #[test]
    fn un_listener_dado_de_baja_no_recibe_nada() {
        let sched = Scheduler::new();
        let viewer = MockViewer::new(sched.clone());
        let (cb, seen) = collector();
        let id = viewer.add_event_listener(EventKind::ZoomUpdated, cb);

        viewer.zoom_to(3.0);
        viewer.remove_event_listener(id);
        sched.pump();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn cargar_un_documento_emite_document_loaded_en_el_siguiente_tick() {
        let sched = Scheduler::new();
        let viewer = MockViewer::new(sched.clone());
        let (cb, seen) = collector();
        viewer.add_event_listener(EventKind::DocumentLoaded, cb);

        viewer.load_document(Path::new("/a.pdf")).unwrap();
        assert!(seen.lock().unwrap().is_empty());

        sched.pump();
        assert_eq!(*seen.lock().unwrap(), vec![ViewerEvent::DocumentLoaded]);
        assert!(viewer.document_open());
    }

    #[test]
    fn una_carga_fallida_no_emite_y_devuelve_la_causa() {
        let sched = Scheduler::new();
        let viewer = MockViewer::new(sched.clone());
        let (cb, seen) = collector();
        viewer.add_event_listener(EventKind::DocumentLoaded, cb);
        viewer.fail_loads_with("PDF corrupto");

        let err = viewer.load_document(Path::new("/malo.pdf")).unwrap_err();
        sched.pump();

        assert!(seen.lock().unwrap().is_empty());
        assert!(err.to_string().contains("PDF corrupto"));
        // El intento cuenta como llamada al motor aunque fallara.
        assert_eq!(viewer.load_requests(), vec![PathBuf::from("/malo.pdf")]);
    }

    #[test]
    fn cerrar_sin_documento_es_benigno() {
        let sched = Scheduler::new();
        let viewer = MockViewer::new(sched);
        assert!(viewer.close_document().is_ok());
        assert_eq!(viewer.close_calls(), 1);
    }

    #[test]
    fn las_superficies_se_vinculan_y_desvinculan() {
        let sched = Scheduler::new();
        let viewer = MockViewer::new(sched);

        viewer.set_viewer_element(Some(SurfaceHandle(7)));
        viewer.set_scroll_view_element(Some(SurfaceHandle(8)));
        assert_eq!(viewer.bound_viewer_surface(), Some(SurfaceHandle(7)));
        assert_eq!(viewer.bound_scroll_surface(), Some(SurfaceHandle(8)));

        viewer.set_viewer_element(None);
        assert_eq!(viewer.bound_viewer_surface(), None);
    }
}
