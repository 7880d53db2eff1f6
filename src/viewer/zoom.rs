//! Puente de sincronización de zoom: estado imperativo del motor expuesto
//! como lectura reactiva (suscripción + snapshot).

use std::sync::Arc;

use crate::engine::{EventCallback, EventKind, ListenerId, ViewerEngine, ViewerEvent};
use crate::error::ContextError;
use crate::viewer::context::{core_instance, ContextValue};

/// Paso fijo de `zoom_in` / `zoom_out`.
pub const ZOOM_STEP: f32 = 0.25;
pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 10.0;
/// Zoom que se lee cuando no hay instancia viva (entornos de pre-render).
pub const DEFAULT_ZOOM: f32 = 1.0;

/// Lectura y escritura de zoom sobre la instancia compartida.
///
/// El snapshot siempre refleja el valor *real* del motor, nunca uno
/// optimista: si el motor impone sus propios límites, aquí se ve lo que el
/// motor hizo de verdad. Tras un `zoom_to` el snapshot no tiene por qué
/// reflejar el valor nuevo hasta que el motor dispare su notificación
/// diferida; quien necesite el valor post-cambio debe esperar a la
/// siguiente notificación, no asumir consistencia síncrona.
#[derive(Debug)]
pub struct ZoomBridge {
    viewer: Option<Arc<dyn ViewerEngine>>,
    listener: Option<ListenerId>,
}

impl ZoomBridge {
    /// Puente sin instancia: lee [`DEFAULT_ZOOM`] y no falla nunca.
    pub fn detached() -> Self {
        Self {
            viewer: None,
            listener: None,
        }
    }

    /// Puente sobre la instancia del contexto, sin observador.
    pub fn new(ctx: &ContextValue) -> Result<Self, ContextError> {
        let (_, viewer) = core_instance(ctx)?;
        Ok(Self {
            viewer: Some(viewer),
            listener: None,
        })
    }

    /// Puente suscrito: el observador recibe el snapshot fresco con cada
    /// notificación `ZoomUpdated`. La suscripción se da de baja al soltar
    /// el puente, antes de que ninguna notificación pendiente pueda caer
    /// sobre un consumidor ya desmontado.
    pub fn with_observer(
        ctx: &ContextValue,
        observer: impl Fn(f32) + Send + Sync + 'static,
    ) -> Result<Self, ContextError> {
        let (_, viewer) = core_instance(ctx)?;
        let callback: EventCallback = Arc::new(move |event| {
            if let ViewerEvent::ZoomUpdated(zoom) = event {
                observer(*zoom);
            }
        });
        let listener = viewer.add_event_listener(EventKind::ZoomUpdated, callback);
        Ok(Self {
            viewer: Some(viewer),
            listener: Some(listener),
        })
    }

    /// Snapshot síncrono del zoom actual.
    pub fn zoom_level(&self) -> f32 {
        match &self.viewer {
            Some(viewer) => viewer.zoom_level(),
            None => DEFAULT_ZOOM,
        }
    }

    /// Fija el zoom, recortando en silencio a `[MIN_ZOOM, MAX_ZOOM]`; los
    /// valores fuera de rango no son un error.
    pub fn zoom_to(&self, level: f32) {
        if let Some(viewer) = &self.viewer {
            viewer.zoom_to(level.clamp(MIN_ZOOM, MAX_ZOOM));
        }
    }

    /// Un paso de zoom sobre el snapshot actual.
    pub fn zoom_in(&self) {
        self.zoom_to(self.zoom_level() + ZOOM_STEP);
    }

    pub fn zoom_out(&self) {
        self.zoom_to(self.zoom_level() - ZOOM_STEP);
    }
}

impl Drop for ZoomBridge {
    fn drop(&mut self) {
        if let (Some(viewer), Some(listener)) = (&self.viewer, self.listener) {
            viewer.remove_event_listener(listener);
        }
    }
}

// --- Entrada de porcentajes (la lógica de los widgets de zoom) ---

/// Interpreta la entrada de un campo de zoom: admite porcentaje ("150%"),
/// número en porcentaje ("150") o factor decimal ("1.5"). Por encima de 10
/// se trata como porcentaje; si no, como factor.
pub fn parse_zoom_entry(input: &str) -> Option<f32> {
    let trimmed = input.trim();
    let without_percent = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    let value: f32 = without_percent.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if value > 10.0 { value / 100.0 } else { value })
}

/// Formatea un factor de zoom como porcentaje redondeado ("1.5" → "150%").
pub fn format_zoom_percent(zoom: f32) -> String {
    format!("{}%", (zoom * 100.0).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockProvider;
    use std::sync::Mutex;
    use pretty_assertions::assert_eq;

    #[test]
    fn zoom_to_recorta_por_arriba() {
        let provider = MockProvider::new();
        let bridge = ZoomBridge::new(&provider.context()).unwrap();

        bridge.zoom_to(15.0);
        provider.scheduler().pump();
        assert_eq!(bridge.zoom_level(), MAX_ZOOM);
    }

    #[test]
    fn zoom_to_recorta_por_abajo() {
        let provider = MockProvider::new();
        let bridge = ZoomBridge::new(&provider.context()).unwrap();

        bridge.zoom_to(0.0001);
        provider.scheduler().pump();
        assert_eq!(bridge.zoom_level(), MIN_ZOOM);
    }

    #[test]
    fn un_paso_adelante_y_otro_atras_vuelve_al_origen() {
        let provider = MockProvider::with_zoom(1.0);
        let bridge = ZoomBridge::new(&provider.context()).unwrap();

        bridge.zoom_in();
        provider.scheduler().pump();
        assert_eq!(bridge.zoom_level(), 1.25);

        bridge.zoom_out();
        provider.scheduler().pump();
        assert_eq!(bridge.zoom_level(), 1.0);
    }

    #[test]
    fn sin_instancia_viva_se_lee_el_zoom_por_defecto() {
        let bridge = ZoomBridge::detached();
        assert_eq!(bridge.zoom_level(), DEFAULT_ZOOM);
        // Y escribir es inocuo.
        bridge.zoom_to(3.0);
        bridge.zoom_in();
    }

    #[test]
    fn el_observador_recibe_el_snapshot_con_cada_notificacion() {
        let provider = MockProvider::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let bridge = ZoomBridge::with_observer(&provider.context(), move |zoom| {
            sink.lock().unwrap().push(zoom);
        })
        .unwrap();

        bridge.zoom_to(2.0);
        // Nada hasta el siguiente tick: la notificación es diferida.
        assert!(seen.lock().unwrap().is_empty());

        provider.scheduler().pump();
        assert_eq!(*seen.lock().unwrap(), vec![2.0]);
    }

    #[test]
    fn soltar_el_puente_da_de_baja_la_suscripcion() {
        let provider = MockProvider::new();
        let bridge =
            ZoomBridge::with_observer(&provider.context(), |_| {}).unwrap();
        assert_eq!(provider.viewer().listener_count(), 1);

        drop(bridge);
        assert_eq!(provider.viewer().listener_count(), 0);
    }

    #[test]
    fn fuera_de_un_provider_el_puente_falla_con_nombre() {
        let err = ZoomBridge::new(&ContextValue::empty()).unwrap_err();
        assert_eq!(err, ContextError::OutsideProvider);
    }

    #[test]
    fn entrada_de_porcentajes() {
        assert_eq!(parse_zoom_entry("150%"), Some(1.5));
        assert_eq!(parse_zoom_entry(" 150 % "), Some(1.5));
        assert_eq!(parse_zoom_entry("150"), Some(1.5));
        assert_eq!(parse_zoom_entry("1.5"), Some(1.5));
        assert_eq!(parse_zoom_entry("10"), Some(10.0)); // justo en el umbral: factor
        assert_eq!(parse_zoom_entry("abc"), None);
        assert_eq!(parse_zoom_entry(""), None);
    }

    #[test]
    fn formato_de_porcentaje() {
        assert_eq!(format_zoom_percent(1.5), "150%");
        assert_eq!(format_zoom_percent(0.333), "33%");
        assert_eq!(format_zoom_percent(1.0), "100%");
    }
}
