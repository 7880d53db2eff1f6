use std::path::PathBuf;
use thiserror::Error;

use crate::bootstrap::Resource;

/// Fallos del arranque de un recurso externo (script/librería del motor).
/// Son errores de configuración del anfitrión: se propagan alto y claro.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BootstrapError {
    /// La carga del recurso falló incluso tras el reintento automático.
    #[error("no se pudo cargar el recurso '{resource}': {cause}")]
    LoadFailed { resource: Resource, cause: String },

    /// El recurso cargó pero el handle global nunca apareció, ni siquiera
    /// tras la espera de gracia.
    #[error("el recurso '{resource}' cargó pero no llegó a inicializarse")]
    InitTimeout { resource: Resource },
}

/// Acceso al contexto fuera de tiempo o fuera de lugar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("core_instance debe usarse dentro de un ViewerProvider activo")]
    OutsideProvider,

    #[error("el motor todavía no está inicializado en este provider")]
    EngineNotReady,
}

/// Fallo al cargar o cerrar un documento. Es una condición esperable en
/// tiempo de ejecución (ruta mala, PDF corrupto): se entrega por callback,
/// nunca se lanza hacia el consumidor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentLoadError {
    #[error("el motor rechazó el documento {}: {cause}", .path.display())]
    Engine { path: PathBuf, cause: String },

    #[error("el motor falló al cerrar el documento: {0}")]
    Close(String),
}

/// Errores del módulo programático de manipulación de documentos.
/// "No disponible" es distinto de "el núcleo no está listo": el módulo
/// tiene su propio arranque independiente.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModuleError {
    #[error("el módulo programático no está disponible; cargue su recurso antes de usarlo")]
    Unavailable,

    #[error("fallo dentro del módulo programático: {0}")]
    Engine(String),

    #[error(transparent)]
    Context(#[from] ContextError),
}
