// ============================================================================
// TRANSPORT - Puerto HTTP (request/response crudos)
// ============================================================================
// El núcleo solo conoce este trait; en el navegador se usa `GlooTransport`,
// en los tests un transporte guionado.
// ============================================================================

use serde_json::Value;
use std::fmt;

use crate::error::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// URL completa (base + ruta + query)
    pub url: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    /// `Value::Null` si el cuerpo venía vacío
    pub body: Value,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Envío de una petición. Un error aquí es siempre de red, nunca de HTTP.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError>;
}

// ============================================================================
// GLOO TRANSPORT (solo navegador)
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use browser::GlooTransport;

#[cfg(target_arch = "wasm32")]
mod browser {
    use gloo_net::http::Request;

    use super::{HttpMethod, HttpRequest, HttpResponse, Transport};
    use crate::error::GatewayError;

    #[derive(Clone, Copy, Default)]
    pub struct GlooTransport;

    impl Transport for GlooTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError> {
            let builder = match request.method {
                HttpMethod::Get => Request::get(&request.url),
                HttpMethod::Post => Request::post(&request.url),
                HttpMethod::Put => Request::put(&request.url),
                HttpMethod::Delete => Request::delete(&request.url),
            }
            .header("Content-Type", "application/json");

            let prepared = match &request.body {
                Some(body) => builder.json(body),
                None => builder.build(),
            }
            .map_err(|e| GatewayError::Network(format!("Request build error: {}", e)))?;

            let response = prepared
                .send()
                .await
                .map_err(|e| GatewayError::Network(e.to_string()))?;

            let status = response.status();
            let status_text = response.status_text();
            let text = response
                .text()
                .await
                .map_err(|e| GatewayError::Network(e.to_string()))?;

            // Un cuerpo que no es JSON se deja como texto; el decodificador decide
            let body = if text.trim().is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
            };

            Ok(HttpResponse {
                status,
                status_text,
                body,
            })
        }
    }
}

// ============================================================================
// TRANSPORTE GUIONADO (tests)
// ============================================================================
