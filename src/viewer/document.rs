//! Orquestador de carga de documentos: idempotente por ruta, con éxito y
//! fallo señalizados por callback.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::engine::{EventKind, ListenerId, ViewerEngine};
use crate::error::{ContextError, DocumentLoadError};
use crate::viewer::context::{core_instance, ContextValue};

pub type LoadCallback = Arc<dyn Fn() + Send + Sync>;
pub type LoadErrorCallback = Arc<dyn Fn(&DocumentLoadError) + Send + Sync>;

/// Carga documentos en la instancia compartida, como mucho una vez por ruta
/// distinta.
///
/// La ruta se apunta de forma optimista *antes* de llamar al motor: dos
/// `load` seguidos con la misma ruta producen una única invocación aunque el
/// primero todavía esté en vuelo. Tras un fallo la ruta se queda apuntada a
/// propósito: no hay reintento automático y repetir la misma ruta sigue
/// siendo un no-op hasta que el llamante decida forzarlo con un loader
/// nuevo.
pub struct DocumentLoader {
    viewer: Arc<dyn ViewerEngine>,
    listener: Option<ListenerId>,
    loaded_path: Mutex<Option<PathBuf>>,
    on_error: Option<LoadErrorCallback>,
}

impl std::fmt::Debug for DocumentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentLoader")
            .field("listener", &self.listener)
            .field("loaded_path", &self.loaded_path)
            .finish_non_exhaustive()
    }
}

impl DocumentLoader {
    /// Loader sin callbacks: solo deduplicación de cargas.
    pub fn new(ctx: &ContextValue) -> Result<Self, ContextError> {
        Self::with_callbacks(ctx, None, None)
    }

    /// Loader con señalización. `on_load` se engancha al evento
    /// `DocumentLoaded` de la instancia; `on_error` recibe la causa de cada
    /// fallo de carga. La suscripción muere con el loader, de forma
    /// síncrona, para que una notificación diferida de una instancia vieja
    /// no dispare sobre un consumidor ya eliminado.
    pub fn with_callbacks(
        ctx: &ContextValue,
        on_load: Option<LoadCallback>,
        on_error: Option<LoadErrorCallback>,
    ) -> Result<Self, ContextError> {
        let (_, viewer) = core_instance(ctx)?;

        let listener = on_load.map(|callback| {
            viewer.add_event_listener(EventKind::DocumentLoaded, Arc::new(move |_| callback()))
        });

        Ok(Self {
            viewer,
            listener,
            loaded_path: Mutex::new(None),
            on_error,
        })
    }

    /// Pide al motor que cargue `path`. Rutas vacías y recargas de la ruta
    /// ya apuntada son no-ops.
    pub fn load(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return;
        }

        {
            let mut loaded = self.loaded_path.lock().unwrap();
            if loaded.as_deref() == Some(path) {
                log::debug!("recarga redundante de {:?} suprimida", path);
                return;
            }
            *loaded = Some(path.to_path_buf());
        }

        if let Err(err) = self.viewer.load_document(path) {
            log::error!("{err}");
            if let Some(on_error) = &self.on_error {
                on_error(&err);
            }
        }
    }

    /// Última ruta enviada al motor por este loader.
    pub fn loaded_path(&self) -> Option<PathBuf> {
        self.loaded_path.lock().unwrap().clone()
    }
}

impl Drop for DocumentLoader {
    fn drop(&mut self) {
        if let Some(listener) = self.listener {
            self.viewer.remove_event_listener(listener);
        }
    }
}
