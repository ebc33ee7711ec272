// ============================================================================
// SESSION STORE - Ciclo de vida de la sesión firmada persistida
// ============================================================================
// Unauthenticated ──create──▶ Authenticated
// Authenticated ──destroy / tick inválido / restore inválido──▶ Unauthenticated
// Todo corre en el event loop del navegador: no hay locks, pero la limpieza
// es idempotente para que el timer y un logout no la repitan.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::CONFIG;
use crate::error::SessionError;
use crate::models::{
    InvalidReason, RestoreOutcome, Role, SessionCheck, SessionData, SessionStatus, SignedSession,
};
use crate::services::signature::SignatureCodec;
use crate::state::notice_state::NoticeBoard;
use crate::utils::{Clock, StoragePort, SystemClock};

pub const SESSION_INVALID_MESSAGE: &str =
    "Sesión expirada o inválida. Por favor inicie sesión nuevamente.";
pub const SESSION_REVOKED_MESSAGE: &str =
    "Su sesión ha expirado o ha sido modificada. Por favor inicie sesión nuevamente.";
pub const LOGOUT_MESSAGE: &str = "Sesión cerrada";

type TeardownHook = Rc<dyn Fn()>;

pub struct SessionStore<S: StoragePort, C: Clock = SystemClock> {
    storage: S,
    clock: C,
    codec: SignatureCodec,
    storage_key: String,
    status: RefCell<SessionStatus>,
    notices: NoticeBoard,
    teardown_hooks: RefCell<Vec<TeardownHook>>,
}

impl<S: StoragePort, C: Clock> SessionStore<S, C> {
    pub fn new(storage: S, clock: C, codec: SignatureCodec, notices: NoticeBoard) -> Self {
        Self {
            storage,
            clock,
            codec,
            storage_key: CONFIG.session_storage_key.clone(),
            status: RefCell::new(SessionStatus::Unauthenticated),
            notices,
            teardown_hooks: RefCell::new(Vec::new()),
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status.borrow().is_authenticated()
    }

    pub fn current(&self) -> Option<SessionData> {
        match &*self.status.borrow() {
            SessionStatus::Authenticated(data) => Some(data.clone()),
            SessionStatus::Unauthenticated => None,
        }
    }

    /// Registra una limpieza del estado dependiente (órdenes, pedidos,
    /// recolectas, entregas, búsqueda) al cerrar la sesión
    pub fn on_teardown<F>(&self, hook: F)
    where
        F: Fn() + 'static,
    {
        self.teardown_hooks.borrow_mut().push(Rc::new(hook));
    }

    /// Firma y persiste una sesión nueva
    pub fn create(
        &self,
        role: Role,
        username: &str,
        ttl_ms: i64,
    ) -> Result<SessionData, SessionError> {
        let data = SessionData {
            role,
            username: username.to_string(),
            expires_at: self.clock.now_millis().saturating_add(ttl_ms),
        };
        let signature = self.codec.sign(&data)?;
        let record = SignedSession {
            data: data.clone(),
            signature,
        };
        let json = serde_json::to_string(&record).map_err(SessionError::Serialize)?;

        self.storage.set(&self.storage_key, &json)?;
        *self.status.borrow_mut() = SessionStatus::Authenticated(data.clone());

        log::info!(
            "🔐 Sesión creada para {} ({}), expira en {} ms",
            data.username,
            data.role,
            ttl_ms
        );
        Ok(data)
    }

    /// Valida el registro persistido sin cambiar el estado
    pub fn check(&self) -> Result<SessionCheck, SessionError> {
        let Some(raw) = self.storage.get(&self.storage_key)? else {
            return Ok(SessionCheck::Absent);
        };

        let record = match serde_json::from_str::<SignedSession>(&raw) {
            Ok(record) => record,
            Err(e) => {
                log::debug!("Registro de sesión ilegible: {}", e);
                return Ok(SessionCheck::Invalid(InvalidReason::Malformed));
            }
        };

        if !self.codec.verify(&record.data, &record.signature)? {
            return Ok(SessionCheck::Invalid(InvalidReason::Tampered));
        }

        if record.data.is_expired_at(self.clock.now_millis()) {
            return Ok(SessionCheck::Invalid(InvalidReason::Expired));
        }

        Ok(SessionCheck::Valid(record.data))
    }

    /// Al arrancar: recupera la sesión persistida si sigue siendo válida
    pub fn restore(&self) -> RestoreOutcome {
        match self.check() {
            Ok(SessionCheck::Absent) => {
                log::info!("ℹ️ No hay sesión guardada");
                self.end_session(None);
                RestoreOutcome::NoSession
            }
            Ok(SessionCheck::Valid(data)) => {
                log::info!("✅ Sesión restaurada: {} ({})", data.username, data.role);
                *self.status.borrow_mut() = SessionStatus::Authenticated(data.clone());
                RestoreOutcome::Restored(data)
            }
            Ok(SessionCheck::Invalid(reason)) => {
                log_rejection(reason);
                self.end_session(Some(SESSION_INVALID_MESSAGE));
                RestoreOutcome::Invalid
            }
            Err(e) => {
                log::error!("❌ Error validando la sesión guardada: {}", e);
                self.end_session(None);
                RestoreOutcome::Invalid
            }
        }
    }

    /// Revalidación periódica contra lo que hay en storage (no contra memoria),
    /// para detectar expiración o modificaciones concurrentes.
    /// Devuelve si la sesión sigue activa.
    pub fn tick(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }

        match self.check() {
            Ok(SessionCheck::Valid(data)) => {
                // Otra pestaña inició sesión con otra identidad
                let switched = self.current().is_some_and(|shown| {
                    shown.role != data.role || shown.username != data.username
                });
                if switched {
                    log::warn!(
                        "⚠️ La sesión cambió a {} ({}) fuera de esta pestaña",
                        data.username,
                        data.role
                    );
                    self.run_teardown();
                }
                *self.status.borrow_mut() = SessionStatus::Authenticated(data);
                true
            }
            Ok(SessionCheck::Absent) => {
                log::warn!("⚠️ El registro de sesión desapareció del storage");
                self.end_session(Some(SESSION_REVOKED_MESSAGE));
                false
            }
            Ok(SessionCheck::Invalid(reason)) => {
                log_rejection(reason);
                self.end_session(Some(SESSION_REVOKED_MESSAGE));
                false
            }
            Err(e) => {
                log::error!("❌ Error revalidando la sesión: {}", e);
                // Sin storage solo queda la copia en memoria, que también vence
                let expired = self
                    .current()
                    .map_or(true, |data| data.is_expired_at(self.clock.now_millis()));
                if expired {
                    log_rejection(InvalidReason::Expired);
                    self.end_session(Some(SESSION_REVOKED_MESSAGE));
                    return false;
                }
                true
            }
        }
    }

    /// Logout explícito
    pub fn destroy(&self) {
        let was_authenticated = self.is_authenticated();
        self.end_session(None);
        if was_authenticated {
            self.notices.info(LOGOUT_MESSAGE);
        }
    }

    /// Borra el registro y pasa a `Unauthenticated`. Los hooks de limpieza
    /// solo corren en la transición, así llamarlo dos veces es inocuo.
    fn end_session(&self, warning: Option<&str>) {
        if let Err(e) = self.storage.remove(&self.storage_key) {
            log::error!("❌ No se pudo borrar la sesión persistida: {}", e);
        }

        let previous = self.status.replace(SessionStatus::Unauthenticated);
        if previous.is_authenticated() {
            self.run_teardown();
            log::info!("👋 Sesión finalizada, estado dependiente limpiado");
        }

        if let Some(message) = warning {
            self.notices.warning(message);
        }
    }

    fn run_teardown(&self) {
        let hooks: Vec<TeardownHook> = self.teardown_hooks.borrow().clone();
        for hook in hooks {
            hook();
        }
    }
}

fn log_rejection(reason: InvalidReason) {
    match reason {
        InvalidReason::Tampered => {
            log::warn!("⚠️ Firma de sesión inválida - posible manipulación detectada")
        }
        InvalidReason::Expired => log::info!("⏰ Sesión expirada"),
        InvalidReason::Malformed => log::warn!("⚠️ Registro de sesión malformado"),
    }
}
