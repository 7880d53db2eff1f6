use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type Job = Box<dyn FnOnce() + Send>;

/// Cola cooperativa de tareas diferidas: el "siguiente tick" del modelo.
///
/// El motor nunca notifica a sus suscriptores en el mismo turno que aplica
/// un cambio; encola la notificación aquí y el anfitrión la drena con
/// `pump()` desde su propio bucle. Los tests la bombean a mano para observar
/// el orden real de entrega.
#[derive(Clone, Default)]
pub struct Scheduler {
    queue: Arc<Mutex<VecDeque<Job>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encola un trabajo para el siguiente tick.
    pub fn defer(&self, job: impl FnOnce() + Send + 'static) {
        self.queue.lock().unwrap().push_back(Box::new(job));
    }

    /// Drena la cola hasta quedar vacía. Un trabajo puede encolar otros;
    /// también se ejecutan antes de volver.
    pub fn pump(&self) {
        loop {
            let job = self.queue.lock().unwrap().pop_front();
            match job {
                Some(job) => job(),
                None => break,
            }
        }
    }

    /// Trabajos pendientes de ejecutar.
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ejecuta_en_orden_fifo() {
        let sched = Scheduler::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let seen = Arc::clone(&seen);
            sched.defer(move || seen.lock().unwrap().push(i));
        }

        assert_eq!(sched.pending(), 3);
        sched.pump();
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn pump_drena_trabajos_encolados_durante_el_propio_pump() {
        let sched = Scheduler::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner_seen = Arc::clone(&seen);
        let inner_sched = sched.clone();
        sched.defer(move || {
            inner_seen.lock().unwrap().push("primero");
            let nested = Arc::clone(&inner_seen);
            inner_sched.defer(move || nested.lock().unwrap().push("anidado"));
        });

        sched.pump();
        assert_eq!(*seen.lock().unwrap(), vec!["primero", "anidado"]);
    }
}
