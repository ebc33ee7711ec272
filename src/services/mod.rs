// ============================================================================
// SERVICES MODULE - Firma, autenticación y acceso al API
// ============================================================================

pub mod signature;
pub mod authenticator;
pub mod transport;
pub mod api_client;
pub mod invalidation;
pub mod gateway;
pub mod receipt;
#[cfg(target_arch = "wasm32")]
pub mod session_watcher;

pub use signature::SignatureCodec;
pub use authenticator::{Authenticator, CredentialEntry};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, Transport};
#[cfg(target_arch = "wasm32")]
pub use transport::GlooTransport;
pub use api_client::ApiClient;
pub use invalidation::Mutation;
pub use gateway::EntityGateway;
pub use receipt::DeliveryReceipt;
#[cfg(target_arch = "wasm32")]
pub use session_watcher::SessionWatcher;
