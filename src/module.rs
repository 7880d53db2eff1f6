//! Superficie del módulo programático de manipulación de documentos.
//!
//! El módulo es opcional y tiene su propio arranque, independiente del
//! núcleo: invocarlo antes de tiempo es un error propio y reportable
//! ([`ModuleError::Unavailable`]), nunca una degradación silenciosa.

use std::sync::Arc;

use crate::config::Config;
use crate::error::ModuleError;
use crate::viewer::context::{core_instance, ContextValue};

/// Operaciones de ciclo de vida que expone el módulo. Las operaciones de
/// manipulación en sí son del motor externo y quedan fuera del puente.
pub trait DocumentModule: Send + Sync {
    /// Abre una sesión de trabajo. La licencia se pasa tal cual al motor;
    /// la cadena vacía es legal.
    fn begin_session(&self, license: &str) -> Result<(), ModuleError>;

    /// Cierra la sesión y libera los recursos que retuviera.
    fn end_session(&self);
}

// Guard que garantiza end_session aunque la operación del usuario falle.
struct SessionGuard(Arc<dyn DocumentModule>);

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.0.end_session();
    }
}

/// Ejecuta `operation` dentro de una sesión del módulo con la licencia
/// dada, con limpieza garantizada al salir, falle o no la operación.
pub fn run_with_license<T>(
    ctx: &ContextValue,
    license: &str,
    operation: impl FnOnce() -> Result<T, ModuleError>,
) -> Result<T, ModuleError> {
    let (core, _) = core_instance(ctx)?;
    let module = core.module().ok_or(ModuleError::Unavailable)?;

    module.begin_session(license)?;
    let _guard = SessionGuard(module);
    operation()
}

/// Variante que toma la licencia de la configuración de entorno, el valor
/// por defecto habitual de los consumidores.
pub fn run_with_env_license<T>(
    ctx: &ContextValue,
    operation: impl FnOnce() -> Result<T, ModuleError>,
) -> Result<T, ModuleError> {
    run_with_license(ctx, &Config::from_env().license, operation)
}
