// ============================================================================
// API CLIENT - SOLO COMUNICACIÓN HTTP (Stateless)
// ============================================================================
// NO tiene lógica de negocio: arma la URL, envía y decodifica el sobre
// `{error, data, message?}`. Caché y avisos viven en el gateway.
// ============================================================================

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::CONFIG;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{ApiEnvelope, Lookup};
use crate::services::transport::{HttpMethod, HttpRequest, HttpResponse, Transport};

const DEFAULT_API_ERROR: &str = "Ocurrió un error en el servidor";

/// Cliente API - SOLO comunicación HTTP (stateless)
#[derive(Clone)]
pub struct ApiClient<T: Transport> {
    base_url: String,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// Cliente contra la URL base configurada para el entorno actual
    pub fn from_config(transport: T) -> Self {
        Self::new(CONFIG.api_base_url(), transport)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Envía y decodifica. `NotFound` = sobre exitoso con `message` y sin `data`.
    pub async fn call<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> GatewayResult<Lookup<R>> {
        let request = HttpRequest {
            method,
            url: self.url(path),
            body,
        };
        log::debug!("🌐 {} {}", request.method, request.url);

        let response = self.transport.send(request).await?;
        decode_envelope(response)
    }

    /// Igual que `call`, pero exige `data`
    pub async fn fetch<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> GatewayResult<R> {
        match self.call(method, path, body).await? {
            Lookup::Found(data) => Ok(data),
            Lookup::NotFound(message) => Err(GatewayError::Decode(format!(
                "respuesta sin datos: {}",
                message
            ))),
            Lookup::Superseded => Err(GatewayError::Decode("respuesta descartada".to_string())),
        }
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> GatewayResult<R> {
        self.fetch(HttpMethod::Get, path, None).await
    }

    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> GatewayResult<R> {
        let body = body.map(encode_body).transpose()?;
        self.fetch(HttpMethod::Post, path, body).await
    }

    pub async fn put<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<R> {
        let body = encode_body(body)?;
        self.fetch(HttpMethod::Put, path, Some(body)).await
    }

    /// Las respuestas de borrado no siempre traen `data`; se ignora el cuerpo
    pub async fn delete(&self, path: &str) -> GatewayResult<()> {
        self.call::<Value>(HttpMethod::Delete, path, None).await?;
        Ok(())
    }
}

fn encode_body<B: Serialize>(body: &B) -> GatewayResult<Value> {
    serde_json::to_value(body)
        .map_err(|e| GatewayError::Decode(format!("Serialization error: {}", e)))
}

/// non-2xx → `Http`, `error: true` → `Api`, `message` sin `data` → `NotFound`
pub fn decode_envelope<R: DeserializeOwned>(response: HttpResponse) -> GatewayResult<Lookup<R>> {
    if !response.ok() {
        return Err(GatewayError::Http {
            status: response.status,
            status_text: response.status_text,
        });
    }

    let envelope: ApiEnvelope<Value> = serde_json::from_value(response.body)
        .map_err(|e| GatewayError::Decode(format!("Parse error: {}", e)))?;

    if envelope.error {
        let message = envelope
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_ERROR.to_string());
        return Err(GatewayError::Api { message });
    }

    match (envelope.data, envelope.message) {
        (Some(data), _) => serde_json::from_value(data)
            .map(Lookup::Found)
            .map_err(|e| GatewayError::Decode(format!("Parse error: {}", e))),
        (None, Some(message)) => Ok(Lookup::NotFound(message)),
        // Sin datos ni mensaje: válido solo si `R` acepta null (p.ej. `Option<_>`)
        (None, None) => serde_json::from_value(Value::Null)
            .map(Lookup::Found)
            .map_err(|_| GatewayError::Decode("respuesta sin datos".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transport::scripted::ScriptedTransport;
    use futures::executor::block_on;
    use serde_json::json;

    fn client() -> (ApiClient<ScriptedTransport>, ScriptedTransport) {
        let transport = ScriptedTransport::new();
        (
            ApiClient::new("http://api.test/api/v1/", transport.clone()),
            transport,
        )
    }

    #[test]
    fn builds_urls_from_the_base() {
        let (api, transport) = client();
        transport.data(json!("ok"));
        let value: String = block_on(api.get("/item/V1")).unwrap();
        assert_eq!(value, "ok");
        assert_eq!(
            transport.last(),
            Some((HttpMethod::Get, "http://api.test/api/v1/item/V1".to_string()))
        );
    }

    #[test]
    fn non_2xx_is_an_http_error() {
        let (api, transport) = client();
        transport.reply(500, "Internal Server Error", json!({ "error": false, "data": 1 }));
        let err = block_on(api.get::<i32>("/manager/order")).unwrap_err();
        assert_eq!(
            err,
            GatewayError::Http {
                status: 500,
                status_text: "Internal Server Error".to_string()
            }
        );
    }

    #[test]
    fn error_envelope_is_an_api_error_with_its_message() {
        let (api, transport) = client();
        transport.api_error("El pedido ya existe");
        transport.reply(200, "OK", json!({ "error": true }));

        let err = block_on(api.get::<i32>("/item")).unwrap_err();
        assert_eq!(err.to_string(), "El pedido ya existe");

        let err = block_on(api.get::<i32>("/item")).unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_API_ERROR);
    }

    #[test]
    fn message_without_data_is_not_found() {
        let (api, transport) = client();
        transport.info("No se encontró el pedido");
        let result: Lookup<i32> = block_on(api.call(HttpMethod::Get, "/item/X", None)).unwrap();
        assert_eq!(result, Lookup::NotFound("No se encontró el pedido".to_string()));
    }

    #[test]
    fn fetch_requires_data() {
        let (api, transport) = client();
        transport.info("sin datos");
        assert!(matches!(
            block_on(api.get::<i32>("/manager/order")),
            Err(GatewayError::Decode(_))
        ));
    }

    #[test]
    fn delete_accepts_an_empty_envelope() {
        let (api, transport) = client();
        transport.reply(200, "OK", json!({ "error": false }));
        assert!(block_on(api.delete("/item/V1")).is_ok());
    }

    #[test]
    fn post_sends_the_serialized_body() {
        let (api, transport) = client();
        transport.data(json!({ "id": "O1" }));
        let _: Value = block_on(api.post("/order", Some(&json!({ "a": 1 })))).unwrap();
        assert_eq!(transport.requests()[0].body, Some(json!({ "a": 1 })));
    }

    #[test]
    fn network_failure_propagates() {
        let (api, transport) = client();
        transport.network_down();
        assert!(matches!(
            block_on(api.get::<i32>("/manager/order")),
            Err(GatewayError::Network(_))
        ));
    }
}
