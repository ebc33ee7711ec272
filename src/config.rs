use serde::{Deserialize, Serialize};

pub const DEFAULT_SESSION_STORAGE_KEY: &str = "order_tracking_session";

/// 8 horas
pub const DEFAULT_SESSION_TTL_MS: i64 = 8 * 60 * 60 * 1000;
pub const DEFAULT_REVALIDATION_INTERVAL_MS: u32 = 60 * 1000;
/// 2 MiB
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 2 * 1024 * 1024;

const DEFAULT_SESSION_SECRET: &str = "your-secret-key-change-this-in-production";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_base_url_development: String,
    pub api_base_url_production: String,
    pub environment: String,
    pub enable_logging: bool,
    /// Se pliega en la firma de la sesión; nunca se persiste
    pub session_secret: String,
    pub session_ttl_ms: i64,
    pub revalidation_interval_ms: u32,
    pub session_storage_key: String,
    pub upload_max_bytes: usize,
    pub upload_content_types: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url_development: "http://localhost:8081/api/v1".to_string(),
            api_base_url_production: "http://localhost:8081/api/v1".to_string(),
            environment: "development".to_string(),
            enable_logging: true,
            session_secret: DEFAULT_SESSION_SECRET.to_string(),
            session_ttl_ms: DEFAULT_SESSION_TTL_MS,
            revalidation_interval_ms: DEFAULT_REVALIDATION_INTERVAL_MS,
            session_storage_key: DEFAULT_SESSION_STORAGE_KEY.to_string(),
            upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            upload_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_base_url_development: option_env!("API_BASE_URL_DEVELOPMENT")
                .map(str::to_string)
                .unwrap_or(defaults.api_base_url_development),
            api_base_url_production: option_env!("API_BASE_URL_PRODUCTION")
                .map(str::to_string)
                .unwrap_or(defaults.api_base_url_production),
            environment: option_env!("ENVIRONMENT")
                .map(str::to_string)
                .unwrap_or(defaults.environment),
            enable_logging: option_env!("ENABLE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enable_logging),
            session_secret: option_env!("SESSION_SECRET")
                .map(str::to_string)
                .unwrap_or(defaults.session_secret),
            session_ttl_ms: option_env!("SESSION_TTL_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.session_ttl_ms),
            revalidation_interval_ms: option_env!("REVALIDATION_INTERVAL_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.revalidation_interval_ms),
            session_storage_key: defaults.session_storage_key,
            upload_max_bytes: option_env!("UPLOAD_MAX_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.upload_max_bytes),
            upload_content_types: defaults.upload_content_types,
        }
    }

    /// Obtiene la URL del API según el entorno actual
    pub fn api_base_url(&self) -> &str {
        match self.environment.as_str() {
            "production" => &self.api_base_url_production,
            _ => &self.api_base_url_development,
        }
    }

    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }

    pub fn accepts_content_type(&self, content_type: &str) -> bool {
        self.upload_content_types.iter().any(|t| t == content_type)
    }
}

// Configuración global estática
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}
