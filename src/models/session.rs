use serde::{Deserialize, Serialize};
use std::fmt;

/// Alcance de autorización de la sesión
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Driver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Driver => "driver",
        }
    }

    /// Etiqueta mostrada en la cabecera
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "ADMINISTRADOR",
            Role::Driver => "PILOTO",
        }
    }

    pub fn welcome_message(&self) -> &'static str {
        match self {
            Role::Admin => "Bienvenido Administrador",
            Role::Driver => "Bienvenido Piloto",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Campos firmados de la sesión
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub role: Role,
    pub username: String,
    /// Instante absoluto de expiración (epoch ms)
    #[serde(rename = "expiresAt")]
    pub expires_at: i64,
}

impl SessionData {
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at <= now_ms
    }
}

/// Registro persistido: `{"data":{...},"signature":"<hex>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedSession {
    pub data: SessionData,
    pub signature: String,
}

/// Identidad resuelta por el autenticador
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub role: Role,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Unauthenticated,
    Authenticated(SessionData),
}

impl SessionStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Authenticated(_))
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            SessionStatus::Authenticated(data) => Some(data.role),
            SessionStatus::Unauthenticated => None,
        }
    }
}

/// Causa interna de una sesión rechazada. Solo se registra en el log,
/// el usuario siempre ve el mismo aviso genérico.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    Malformed,
    Tampered,
    Expired,
}

/// Resultado de validar el registro persistido
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCheck {
    Absent,
    Valid(SessionData),
    Invalid(InvalidReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    NoSession,
    Invalid,
    Restored(SessionData),
}
