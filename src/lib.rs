// ============================================================================
// ORDER TRACKING - Núcleo del dashboard de órdenes (Rust + WASM)
// ============================================================================
// Arquitectura:
// - Models: Estructuras compartidas con el backend
// - Services: Firma, autenticación, SOLO comunicación API, gateway
// - State: Sesión, caché de consultas, búsqueda y avisos (Rc<RefCell>)
// - Utils: Puertos de storage/reloj, rutas, formato
// - App: Composición (Dashboard)
// ============================================================================

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod app;

pub use app::Dashboard;
pub use config::CONFIG;
pub use error::{GatewayError, SessionError, StorageError};

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;

    use crate::app::Dashboard;
    use crate::config::CONFIG;
    use crate::models::Lookup;
    use crate::services::{GlooTransport, SessionWatcher};
    use crate::utils::{LocalStorage, SystemClock};

    type BrowserDashboard = Dashboard<LocalStorage, GlooTransport, SystemClock>;

    // Instancia global de la app y su temporizador de revalidación
    thread_local! {
        static APP: RefCell<Option<Rc<BrowserDashboard>>> = RefCell::new(None);
        static WATCHER: RefCell<Option<SessionWatcher>> = RefCell::new(None);
    }

    fn app() -> Option<Rc<BrowserDashboard>> {
        APP.with(|cell| cell.borrow().clone())
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        if CONFIG.is_logging_enabled() {
            wasm_logger::init(wasm_logger::Config::default());
        }
        log::info!("🚀 Order Tracking - entorno {}", CONFIG.environment);

        let dashboard = Rc::new(Dashboard::new(LocalStorage, SystemClock, GlooTransport));
        dashboard.start();

        let ticking = dashboard.clone();
        let watcher = SessionWatcher::start(CONFIG.revalidation_interval_ms, move || {
            ticking.revalidate()
        });

        APP.with(|cell| *cell.borrow_mut() = Some(dashboard));
        WATCHER.with(|cell| *cell.borrow_mut() = Some(watcher));
        Ok(())
    }

    /// Devuelve el rol ("admin" / "driver") si el login fue exitoso
    #[wasm_bindgen]
    pub fn login(username: &str, password: &str) -> Option<String> {
        let data = app()?.login(username, password)?;
        Some(data.role.as_str().to_string())
    }

    #[wasm_bindgen]
    pub fn logout() {
        if let Some(app) = app() {
            app.logout();
        }
    }

    #[wasm_bindgen]
    pub fn current_role() -> Option<String> {
        app()?.role().map(|role| role.as_str().to_string())
    }

    /// Avisos pendientes como JSON (`[{level, message}]`); la cola queda vacía
    #[wasm_bindgen]
    pub fn take_notices() -> String {
        let notices = app().map(|app| app.notices().drain()).unwrap_or_default();
        serde_json::to_string(&notices).unwrap_or_else(|_| "[]".to_string())
    }

    /// Busca un pedido por comprobante y entrega el JSON (o `null`) al callback.
    /// Si mientras tanto se lanzó otra búsqueda, el callback no se llama.
    #[wasm_bindgen]
    pub fn search_item(voucher_id: String, done: js_sys::Function) {
        let Some(app) = app() else {
            log::warn!("⚠️ App no está inicializada");
            return;
        };

        wasm_bindgen_futures::spawn_local(async move {
            let payload = match app.gateway().find_item(&voucher_id).await {
                Ok(Lookup::Superseded) => return,
                Ok(Lookup::Found(item)) => serde_json::to_string(&item).ok(),
                Ok(Lookup::NotFound(_)) | Err(_) => None,
            };
            let arg = payload.map(JsValue::from).unwrap_or(JsValue::NULL);
            if let Err(e) = done.call1(&JsValue::NULL, &arg) {
                web_sys::console::error_1(&e);
            }
        });
    }
}
