// ============================================================================
// SESSION WATCHER - Revalidación periódica de la sesión (solo navegador)
// ============================================================================

use gloo_timers::callback::Interval;

/// Mantiene vivo el intervalo; al soltarlo se cancela
pub struct SessionWatcher {
    _interval: Interval,
}

impl SessionWatcher {
    /// `tick` devuelve si la sesión sigue activa
    pub fn start<F>(period_ms: u32, mut tick: F) -> Self
    where
        F: FnMut() -> bool + 'static,
    {
        log::info!("⏱️ Revalidación de sesión cada {} ms", period_ms);
        let interval = Interval::new(period_ms, move || {
            if !tick() {
                log::debug!("Revalidación: sin sesión activa");
            }
        });
        Self {
            _interval: interval,
        }
    }
}
