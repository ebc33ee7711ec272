// ============================================================================
// ERRORES - Taxonomía de fallos del núcleo
// ============================================================================

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("almacenamiento local no disponible")]
    Unavailable,
    #[error("error leyendo la clave {key}")]
    Read { key: String },
    #[error("error guardando la clave {key}")]
    Write { key: String },
    #[error("error eliminando la clave {key}")]
    Remove { key: String },
}

/// Fallo interno del códec de firmas (nunca por datos malformados)
#[derive(Debug, Error)]
#[error("error serializando la carga canónica: {0}")]
pub struct CodecError(#[from] pub serde_json::Error);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("error serializando la sesión: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Error enviando la peticion al servidor: {0}")]
    Network(String),
    #[error("HTTP Error: {status} {status_text}")]
    Http { status: u16, status_text: String },
    #[error("{message}")]
    Api { message: String },
    #[error("respuesta inesperada del servidor: {0}")]
    Decode(String),
    #[error("{reason}")]
    Rejected { reason: String },
    #[error("Error al cargar {file_name}: {reason}")]
    Upload { file_name: String, reason: String },
}

impl GatewayError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
