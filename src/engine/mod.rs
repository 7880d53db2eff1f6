pub mod mock;
pub mod pdfium;

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::DocumentLoadError;
use crate::module::DocumentModule;
use crate::scheduler::Scheduler;

/// Familias de eventos que emite una instancia del visor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ZoomUpdated,
    DocumentLoaded,
}

/// Evento con su carga útil. El zoom lleva el valor *real* del motor en el
/// momento de la emisión, no el que pidió el consumidor.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    ZoomUpdated(f32),
    DocumentLoaded,
}

impl ViewerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ViewerEvent::ZoomUpdated(_) => EventKind::ZoomUpdated,
            ViewerEvent::DocumentLoaded => EventKind::DocumentLoaded,
        }
    }
}

/// Token devuelto al registrar un listener. Los closures de Rust no tienen
/// identidad comparable, así que la baja se hace por token; dar de baja un
/// token desconocido es un no-op, nunca un error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Referencia opaca a una superficie de dibujo del anfitrión (una ventana,
/// una textura, un nodo de UI). El puente solo la transporta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceHandle(pub u64);

pub type EventCallback = Arc<dyn Fn(&ViewerEvent) + Send + Sync>;

/// Contrato de capacidades de una instancia del visor.
///
/// Lo cumplen por igual el motor real y el mock; cualquier consumidor
/// escrito contra este trait se comporta idéntico con ambos, salvo el
/// renderizado en sí. Las operaciones que mutan estado notifican a los
/// suscriptores de forma diferida (siguiente tick del [`Scheduler`]), nunca
/// en el mismo turno.
pub trait ViewerEngine: Send + Sync + std::fmt::Debug {
    /// Zoom actual. Sin efectos secundarios.
    fn zoom_level(&self) -> f32;

    /// Aplica el zoom y programa la notificación `ZoomUpdated`.
    fn zoom_to(&self, level: f32);

    fn add_event_listener(&self, kind: EventKind, callback: EventCallback) -> ListenerId;
    fn remove_event_listener(&self, id: ListenerId);

    /// Vincula la superficie donde se pintan las páginas; `None` desvincula.
    fn set_viewer_element(&self, surface: Option<SurfaceHandle>);
    /// Vincula la superficie de scroll; `None` desvincula.
    fn set_scroll_view_element(&self, surface: Option<SurfaceHandle>);

    /// Carga un documento. En éxito emite además `DocumentLoaded` a los
    /// suscriptores; en fallo devuelve la causa del motor.
    fn load_document(&self, path: &Path) -> Result<(), DocumentLoadError>;

    /// Cierra el documento actual. Cerrar sin documento cargado es un no-op.
    fn close_document(&self) -> Result<(), DocumentLoadError>;

    fn enable_annotations(&self);
}

/// Espacio de nombres del motor una vez arrancado: las llamadas de
/// configuración global y la fábrica de instancias del visor.
pub trait EngineCore: Send + Sync + std::fmt::Debug {
    fn set_worker_path(&self, path: &Path);
    fn enable_full_pdf(&self);
    fn new_viewer(&self, scheduler: &Scheduler) -> Arc<dyn ViewerEngine>;

    /// Módulo programático, si su propio arranque ya terminó.
    fn module(&self) -> Option<Arc<dyn DocumentModule>>;
}

// --- Tabla de listeners compartida por ambos motores ---

struct TableInner {
    next_id: u64,
    items: Vec<(ListenerId, EventKind, EventCallback)>,
}

pub(crate) struct ListenerTable {
    inner: Mutex<TableInner>,
}

impl ListenerTable {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(TableInner {
                next_id: 1,
                items: Vec::new(),
            }),
        }
    }

    pub(crate) fn add(&self, kind: EventKind, callback: EventCallback) -> ListenerId {
        let mut inner = self.inner.lock().unwrap();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.items.push((id, kind, callback));
        log::debug!("listener {:?} registrado para {:?}", id, kind);
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) {
        // Baja idempotente: si el token no existe no pasa nada.
        self.inner.lock().unwrap().items.retain(|(item, _, _)| *item != id);
    }

    /// Entrega el evento a los listeners vivos en el momento del disparo.
    /// Se copia la lista antes de invocar para no retener el lock mientras
    /// corre código ajeno.
    pub(crate) fn emit(&self, event: &ViewerEvent) {
        let kind = event.kind();
        let callbacks: Vec<EventCallback> = {
            let inner = self.inner.lock().unwrap();
            inner
                .items
                .iter()
                .filter(|(_, item_kind, _)| *item_kind == kind)
                .map(|(_, _, cb)| Arc::clone(cb))
                .collect()
        };
        for cb in callbacks {
            cb(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }
}
