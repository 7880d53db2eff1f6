//! Arranque en dos fases del motor externo.
//!
//! Cada recurso (núcleo del visor, módulo programático) tiene su propia
//! máquina de estados de carga, de ámbito de proceso: montar y desmontar
//! consumidores no vuelve a inyectar nada. Las transiciones solo avanzan
//! `NotStarted → Loading → {Ready | Failed}` y los dos finales son
//! terminales.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, OnceLock};
use std::time::Duration;

use crate::error::BootstrapError;

/// Espera de gracia antes de dar por perdido un handle que no aparece:
/// cubre motores que se autoinicializan de forma asíncrona tras la carga.
pub const HANDLE_GRACE: Duration = Duration::from_millis(100);

/// Los dos recursos externos que sabe cargar el puente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    EngineCore,
    ProgrammaticModule,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::EngineCore => write!(f, "núcleo del visor"),
            Resource::ProgrammaticModule => write!(f, "módulo programático"),
        }
    }
}

/// Estado de carga de un recurso.
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapState {
    NotStarted,
    Loading,
    Ready,
    Failed(BootstrapError),
}

#[derive(Default)]
struct RegistryInner {
    states: Mutex<HashMap<Resource, BootstrapState>>,
    cv: Condvar,
}

/// Registro compartido de estados de arranque.
///
/// Es un objeto inyectable y no un flag a nivel de módulo para que los tests
/// puedan crear registros limpios y resetearlos entre casos; la aplicación
/// normal usa [`BootstrapRegistry::global`].
#[derive(Clone, Default)]
pub struct BootstrapRegistry {
    inner: Arc<RegistryInner>,
}

impl BootstrapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// El registro de ámbito de proceso.
    pub fn global() -> Self {
        static GLOBAL: OnceLock<BootstrapRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::new).clone()
    }

    /// Estado actual del recurso.
    pub fn state(&self, resource: Resource) -> BootstrapState {
        self.inner
            .states
            .lock()
            .unwrap()
            .get(&resource)
            .cloned()
            .unwrap_or(BootstrapState::NotStarted)
    }

    /// Olvida todos los estados. Solo tiene sentido entre tests.
    pub fn reset(&self) {
        self.inner.states.lock().unwrap().clear();
        self.inner.cv.notify_all();
    }
}

/// Cómo se materializa la inyección de cada recurso. El binder real enlaza
/// librerías dinámicas; los tests inyectan dobles que cuentan llamadas.
pub trait ResourceBinder: Send + Sync {
    /// Ejecuta el efecto de carga (una vez por recurso y proceso, salvo el
    /// reintento automático del núcleo).
    fn inject(&self, resource: Resource) -> Result<(), BootstrapError>;

    /// ¿Está poblado ya el handle global que deja la carga?
    fn handle_present(&self, resource: Resource) -> bool;
}

/// Cargador con deduplicación: N llamadas concurrentes comparten un único
/// intento en vuelo y observan el mismo estado terminal.
pub struct BootstrapLoader {
    registry: BootstrapRegistry,
    binder: Arc<dyn ResourceBinder>,
}

impl BootstrapLoader {
    pub fn new(registry: BootstrapRegistry, binder: Arc<dyn ResourceBinder>) -> Self {
        Self { registry, binder }
    }

    pub fn registry(&self) -> &BootstrapRegistry {
        &self.registry
    }

    /// Garantiza que el recurso está cargado. Si ya está `Ready` es un no-op
    /// barato; si está `Failed` devuelve el error registrado sin volver a
    /// intentarlo; si hay un intento en vuelo, espera su resultado.
    pub fn ensure_loaded(&self, resource: Resource) -> Result<(), BootstrapError> {
        let mut states = self.registry.inner.states.lock().unwrap();
        loop {
            match states.get(&resource).cloned().unwrap_or(BootstrapState::NotStarted) {
                BootstrapState::Ready => return Ok(()),
                BootstrapState::Failed(err) => return Err(err),
                BootstrapState::Loading => {
                    states = self.registry.inner.cv.wait(states).unwrap();
                }
                BootstrapState::NotStarted => {
                    states.insert(resource, BootstrapState::Loading);
                    break;
                }
            }
        }
        drop(states);

        let outcome = self.attempt(resource);

        let mut states = self.registry.inner.states.lock().unwrap();
        match &outcome {
            Ok(()) => {
                log::info!("bootstrap de '{resource}': Ready");
                states.insert(resource, BootstrapState::Ready);
            }
            Err(err) => {
                log::error!("bootstrap de '{resource}': Failed ({err})");
                states.insert(resource, BootstrapState::Failed(err.clone()));
            }
        }
        self.registry.inner.cv.notify_all();
        outcome
    }

    fn attempt(&self, resource: Resource) -> Result<(), BootstrapError> {
        match self.binder.inject(resource) {
            Ok(()) => {}
            // El núcleo tiene derecho a exactamente un reintento automático.
            Err(first) if resource == Resource::EngineCore => {
                log::warn!("reintentando la carga del núcleo tras fallo: {first}");
                self.binder.inject(resource)?;
            }
            Err(err) => return Err(err),
        }

        // La carga del núcleo puede terminar antes de que el motor haya
        // poblado su handle global: una sola espera acotada y re-chequeo.
        if resource == Resource::EngineCore && !self.binder.handle_present(resource) {
            std::thread::sleep(HANDLE_GRACE);
            if !self.binder.handle_present(resource) {
                return Err(BootstrapError::InitTimeout { resource });
            }
        }
        Ok(())
    }
}
