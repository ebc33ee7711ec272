// ============================================================================
// APP - Dashboard: sesión + autenticación + gateway de entidades
// ============================================================================
// Punto de composición. La vista solo llama a estos métodos y muestra los
// avisos que quedan en el `NoticeBoard`.
// ============================================================================

use crate::config::CONFIG;
use crate::models::{RestoreOutcome, Role, SessionData};
use crate::services::api_client::ApiClient;
use crate::services::authenticator::Authenticator;
use crate::services::gateway::EntityGateway;
use crate::services::signature::SignatureCodec;
use crate::services::transport::Transport;
use crate::state::notice_state::NoticeBoard;
use crate::state::query_cache::QueryCache;
use crate::state::session_store::SessionStore;
use crate::utils::{Clock, StoragePort, SystemClock};

pub const LOGIN_FAILED_MESSAGE: &str = "Usuario o contraseña incorrectos";
const LOGIN_ERROR_MESSAGE: &str = "No se pudo iniciar la sesión";

/// Aplicación principal
pub struct Dashboard<S: StoragePort, T: Transport, C: Clock = SystemClock> {
    session: SessionStore<S, C>,
    authenticator: Authenticator,
    gateway: EntityGateway<T>,
    notices: NoticeBoard,
    session_ttl_ms: i64,
}

impl<S: StoragePort, T: Transport, C: Clock> Dashboard<S, T, C> {
    /// Dashboard con la configuración global (`CONFIG`)
    pub fn new(storage: S, clock: C, transport: T) -> Self {
        let notices = NoticeBoard::new();
        let session = SessionStore::new(
            storage,
            clock,
            SignatureCodec::default(),
            notices.clone(),
        )
        .with_storage_key(CONFIG.session_storage_key.clone());
        let gateway = EntityGateway::new(
            ApiClient::from_config(transport),
            QueryCache::new(),
            notices.clone(),
        );
        Self::from_parts(session, Authenticator::default(), gateway, notices)
    }

    /// Ensambla piezas ya construidas y engancha la limpieza de sesión
    pub fn from_parts(
        session: SessionStore<S, C>,
        authenticator: Authenticator,
        gateway: EntityGateway<T>,
        notices: NoticeBoard,
    ) -> Self {
        let cache = gateway.cache().clone();
        let search = gateway.search().clone();
        session.on_teardown(move || {
            cache.clear();
            search.reset();
        });

        Self {
            session,
            authenticator,
            gateway,
            notices,
            session_ttl_ms: CONFIG.session_ttl_ms,
        }
    }

    pub fn with_session_ttl(mut self, ttl_ms: i64) -> Self {
        self.session_ttl_ms = ttl_ms;
        self
    }

    pub fn session(&self) -> &SessionStore<S, C> {
        &self.session
    }

    pub fn gateway(&self) -> &EntityGateway<T> {
        &self.gateway
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn role(&self) -> Option<Role> {
        self.session.status().role()
    }

    /// Al cargar la página
    pub fn start(&self) -> RestoreOutcome {
        log::info!("🚀 Dashboard de órdenes iniciando");
        self.session.restore()
    }

    pub fn login(&self, username: &str, password: &str) -> Option<SessionData> {
        let Some(identity) = self.authenticator.authenticate(username, password) else {
            log::warn!("⚠️ Login rechazado para {}", username);
            self.notices.error(LOGIN_FAILED_MESSAGE);
            return None;
        };

        // Cambio de usuario sin logout: nada del anterior debe quedar visible
        if self.session.is_authenticated() {
            self.gateway.clear();
        }

        match self
            .session
            .create(identity.role, &identity.username, self.session_ttl_ms)
        {
            Ok(data) => {
                self.notices.success(identity.role.welcome_message());
                Some(data)
            }
            Err(e) => {
                log::error!("❌ No se pudo persistir la sesión: {}", e);
                self.notices.error(LOGIN_ERROR_MESSAGE);
                None
            }
        }
    }

    pub fn logout(&self) {
        self.session.destroy();
    }

    /// Tick del temporizador de revalidación
    pub fn revalidate(&self) -> bool {
        self.session.tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NoticeLevel, NewCollect, NewItem, Product, SignedSession};
    use crate::services::transport::scripted::ScriptedTransport;
    use crate::state::query_cache::{Freshness, QueryKey};
    use crate::state::session_store::{SESSION_INVALID_MESSAGE, SESSION_REVOKED_MESSAGE};
    use crate::utils::{ManualClock, MemoryStorage};
    use futures::executor::block_on;
    use serde_json::json;

    const T0: i64 = 1_700_000_000_000;
    const HOUR: i64 = 60 * 60 * 1000;

    struct Fixture {
        app: Dashboard<MemoryStorage, ScriptedTransport, ManualClock>,
        storage: MemoryStorage,
        clock: ManualClock,
        transport: ScriptedTransport,
    }

    fn fixture() -> Fixture {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(T0);
        let transport = ScriptedTransport::new();
        let app = Dashboard::new(storage.clone(), clock.clone(), transport.clone());
        Fixture {
            app,
            storage,
            clock,
            transport,
        }
    }

    fn stored(storage: &MemoryStorage) -> Option<SignedSession> {
        storage
            .get(&CONFIG.session_storage_key)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    fn seed_pages(f: &Fixture, keys: &[&str]) {
        for _ in keys {
            f.transport.page(json!([]));
        }
        for order in keys {
            let loaded = match *order {
                "all" => block_on(f.app.gateway().all_items()).map(|_| ()),
                id => block_on(f.app.gateway().items_by_order(id)).map(|_| ()),
            };
            loaded.unwrap();
        }
    }

    #[test]
    fn scenario_admin_login_persists_a_verifiable_session() {
        let f = fixture();
        let data = f.app.login("admin", "admin123").unwrap();

        assert_eq!(data.role, Role::Admin);
        assert_eq!(data.expires_at, T0 + CONFIG.session_ttl_ms);
        assert_eq!(f.app.role(), Some(Role::Admin));

        let record = stored(&f.storage).unwrap();
        assert!(SignatureCodec::default()
            .verify(&record.data, &record.signature)
            .unwrap());
        assert_eq!(
            f.app.notices().last().unwrap().message,
            "Bienvenido Administrador"
        );
    }

    #[test]
    fn wrong_credentials_do_not_create_a_session() {
        let f = fixture();
        assert!(f.app.login("driver", "admin123").is_none());
        assert!(stored(&f.storage).is_none());
        assert_eq!(f.app.role(), None);
        assert_eq!(f.app.notices().last().unwrap().message, LOGIN_FAILED_MESSAGE);
    }

    #[test]
    fn scenario_expired_record_is_cleared_with_one_warning() {
        let f = fixture();
        f.app.login("driver", "driver123").unwrap();
        f.app.notices().drain();

        f.clock.advance(CONFIG.session_ttl_ms);
        let restarted = Dashboard::new(f.storage.clone(), f.clock.clone(), f.transport.clone());

        assert_eq!(restarted.start(), RestoreOutcome::Invalid);
        assert_eq!(restarted.role(), None);
        assert!(stored(&f.storage).is_none());
        assert_eq!(restarted.notices().count(NoticeLevel::Warning), 1);
        assert_eq!(
            restarted.notices().last().unwrap().message,
            SESSION_INVALID_MESSAGE
        );
    }

    #[test]
    fn scenario_role_escalation_by_hand_edit_is_detected() {
        let f = fixture();
        f.app.login("driver", "driver123").unwrap();

        let key = &CONFIG.session_storage_key;
        let mut value: serde_json::Value =
            serde_json::from_str(&f.storage.get(key).unwrap().unwrap()).unwrap();
        value["data"]["role"] = json!("admin");
        f.storage.set(key, &value.to_string()).unwrap();

        let restarted = Dashboard::new(f.storage.clone(), f.clock.clone(), f.transport.clone());
        assert_eq!(restarted.start(), RestoreOutcome::Invalid);
        assert_eq!(restarted.role(), None);
        assert!(stored(&f.storage).is_none());
    }

    #[test]
    fn scenario_create_item_invalidates_only_its_scope() {
        let f = fixture();
        f.app.login("admin", "admin123").unwrap();
        seed_pages(&f, &["O1", "O2", "all"]);

        f.transport.data(json!({
            "id": "i-1", "voucherId": "V1", "orderId": "O1",
            "product": "Horcalsa", "quantity": 40, "status": "PENDIENTE"
        }));
        let created = block_on(f.app.gateway().create_item(&NewItem {
            voucher_id: "V1".to_string(),
            order_id: "O1".to_string(),
            product: Product::Horcalsa,
            quantity: 40.0,
            voucher_key: None,
            status: None,
        }))
        .unwrap();
        assert_eq!(created.voucher_id, "V1");

        let cache = f.app.gateway().cache();
        assert_eq!(cache.freshness(&QueryKey::items("O1")), Some(Freshness::Stale));
        assert_eq!(cache.freshness(&QueryKey::all_items()), Some(Freshness::Stale));
        assert_eq!(cache.freshness(&QueryKey::items("O2")), Some(Freshness::Fresh));
    }

    #[test]
    fn scenario_collect_leaves_deliveries_untouched() {
        let f = fixture();
        f.app.login("driver", "driver123").unwrap();
        f.transport.page(json!([]));
        f.transport.page(json!([]));
        f.transport.data(json!({
            "collect": { "voucherId": "V1", "driver": "Luis", "truck": "C-12", "quantity": 5 },
            "item": {
                "id": "i-1", "voucherId": "V1", "orderId": "O1",
                "product": "Horcalsa", "quantity": 40, "collected": 5, "status": "EN RUTA"
            }
        }));

        let gateway = f.app.gateway();
        block_on(gateway.collects("V1")).unwrap();
        block_on(gateway.deliveries("V1")).unwrap();
        block_on(gateway.create_collect(&NewCollect {
            voucher_id: "V1".to_string(),
            driver: "Luis".to_string(),
            truck: "C-12".to_string(),
            quantity: 5.0,
        }))
        .unwrap();

        let cache = gateway.cache();
        assert_eq!(cache.freshness(&QueryKey::collects("V1")), Some(Freshness::Stale));
        assert_eq!(cache.freshness(&QueryKey::deliveries("V1")), Some(Freshness::Fresh));
    }

    #[test]
    fn tampering_during_the_session_clears_dependent_state() {
        let f = fixture();
        f.app.login("driver", "driver123").unwrap();
        seed_pages(&f, &["O1"]);
        assert!(!f.app.gateway().cache().is_empty());

        let key = &CONFIG.session_storage_key;
        let mut value: serde_json::Value =
            serde_json::from_str(&f.storage.get(key).unwrap().unwrap()).unwrap();
        value["data"]["expiresAt"] = json!(T0 + 100 * HOUR);
        f.storage.set(key, &value.to_string()).unwrap();

        assert!(!f.app.revalidate());
        assert_eq!(f.app.role(), None);
        assert!(f.app.gateway().cache().is_empty());
        assert_eq!(
            f.app.notices().last().unwrap().message,
            SESSION_REVOKED_MESSAGE
        );
    }

    #[test]
    fn logout_twice_is_harmless() {
        let f = fixture();
        f.app.login("admin", "admin123").unwrap();
        seed_pages(&f, &["O1"]);

        f.app.logout();
        f.app.logout();

        assert!(stored(&f.storage).is_none());
        assert!(f.app.gateway().cache().is_empty());
        assert_eq!(f.app.notices().count(NoticeLevel::Info), 1);
    }

    #[test]
    fn valid_session_survives_revalidation() {
        let f = fixture();
        f.app.login("admin", "admin123").unwrap();
        f.clock.advance(HOUR);
        assert!(f.app.revalidate());
        assert_eq!(f.app.role(), Some(Role::Admin));
    }
}
