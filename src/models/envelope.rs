use serde::Deserialize;

/// Sobre común de todas las respuestas del API: `{error, data, message?}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub error: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Resultado de una búsqueda puntual. `NotFound` es informativo, no un error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound(String),
    /// Llegó después de una búsqueda más reciente; no se muestra
    Superseded,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound(_) | Lookup::Superseded => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}
