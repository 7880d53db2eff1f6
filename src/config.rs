use std::env;
use std::path::PathBuf;

/// Variable de entorno con la carpeta de los ficheros del motor.
pub const ENV_ENGINE_PATH: &str = "PUENTE_ENGINE_PATH";
/// Variable de entorno con la carpeta del módulo programático.
pub const ENV_MODULE_PATH: &str = "PUENTE_MODULE_PATH";
/// Variable de entorno con la clave de licencia del motor.
pub const ENV_LICENSE: &str = "PUENTE_LICENSE";

/// Carpeta por defecto de los ficheros del motor: el directorio de trabajo,
/// que es donde build.rs deja la librería descargada.
pub const DEFAULT_ENGINE_PATH: &str = "./";

const MODULE_SUBDIR: &str = "module";
const WORKER_SUBDIR: &str = "core";

/// Configuración dirigida por entorno del puente.
///
/// Todo es sobreescribible vía variables de entorno; la ausencia de licencia
/// es legal (cadena vacía) y sus consecuencias dependen del motor.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Carpeta base con los ficheros del motor (la librería dinámica).
    pub engine_path: PathBuf,
    /// Carpeta del módulo programático opcional.
    pub module_path: PathBuf,
    /// Clave de licencia, pasada tal cual al motor. Vacía por defecto.
    pub license: String,
}

impl Config {
    /// Lee la configuración del entorno del proceso.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separado de from_env para poder probarlo sin tocar el entorno global.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let engine_path = lookup(ENV_ENGINE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENGINE_PATH));

        let module_path = lookup(ENV_MODULE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| engine_path.join(MODULE_SUBDIR));

        let license = lookup(ENV_LICENSE).unwrap_or_default();

        Self {
            engine_path,
            module_path,
            license,
        }
    }

    /// Carpeta de workers del motor, derivada de la base igual que hace el
    /// propio motor con sus assets.
    pub fn worker_path(&self) -> PathBuf {
        self.engine_path.join(WORKER_SUBDIR)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn valores_por_defecto() {
        let config = Config::default();
        assert_eq!(config.engine_path, PathBuf::from("./"));
        assert_eq!(config.module_path, PathBuf::from("./module"));
        assert_eq!(config.license, "");
        assert_eq!(config.worker_path(), PathBuf::from("./core"));
    }

    #[test]
    fn el_entorno_sobreescribe_cada_valor() {
        let config = Config::from_lookup(|key| match key {
            ENV_ENGINE_PATH => Some("/opt/visor".into()),
            ENV_LICENSE => Some("demo:clave".into()),
            _ => None,
        });

        assert_eq!(config.engine_path, PathBuf::from("/opt/visor"));
        // Sin sobreescritura propia, el módulo cuelga de la carpeta del motor.
        assert_eq!(config.module_path, PathBuf::from("/opt/visor/module"));
        assert_eq!(config.license, "demo:clave");
        assert_eq!(config.worker_path(), PathBuf::from("/opt/visor/core"));
    }

    #[test]
    fn la_ruta_del_modulo_es_independiente_si_se_define() {
        let config = Config::from_lookup(|key| match key {
            ENV_ENGINE_PATH => Some("/opt/visor".into()),
            ENV_MODULE_PATH => Some("/opt/modulo".into()),
            _ => None,
        });

        assert_eq!(config.module_path, PathBuf::from("/opt/modulo"));
    }
}
