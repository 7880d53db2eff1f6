//! puente — capa puente reactiva sobre un motor visor de PDF externo.
//!
//! El motor (PDFium) es un singleton imperativo de proceso que emite
//! eventos; este crate lo arranca de forma segura, inyecta una única
//! instancia compartida en el árbol de consumidores y traduce su modelo
//! push a lecturas síncronas sin duplicar cargas ni servir estado rancio.
//!
//! Piezas, de abajo arriba:
//! - [`engine`]: el contrato de capacidades y sus dos variantes (real/mock).
//! - [`bootstrap`]: máquina de estados de carga, una por recurso externo.
//! - [`viewer`]: provider, contexto, puente de zoom, carga de documentos y
//!   vinculación de superficies.
//! - [`module`]: el módulo programático opcional de manipulación.

pub mod bootstrap;
pub mod config;
pub mod engine;
pub mod error;
pub mod module;
pub mod scheduler;
pub mod viewer;

pub use bootstrap::{BootstrapLoader, BootstrapRegistry, BootstrapState, Resource, ResourceBinder};
pub use config::Config;
pub use engine::mock::MockProvider;
pub use engine::pdfium::PdfiumBinder;
pub use engine::{
    EngineCore, EventCallback, EventKind, ListenerId, SurfaceHandle, ViewerEngine, ViewerEvent,
};
pub use error::{BootstrapError, ContextError, DocumentLoadError, ModuleError};
pub use module::{run_with_env_license, run_with_license, DocumentModule};
pub use scheduler::Scheduler;
pub use viewer::{
    core_instance, ContextValue, DocumentLoader, ScrollViewBinding, ViewerCanvas,
    ViewerElementBinding, ViewerProvider, ZoomBridge,
};
