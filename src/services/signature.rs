// ============================================================================
// SIGNATURE CODEC - Firma SHA-256 de los campos de sesión
// ============================================================================
// El secreto se pliega en el digest y nunca se guarda en el registro.
// En un despliegue solo-cliente el secreto viaja en el bundle: esto detecta
// ediciones a mano del storage, no a un atacante que extraiga la constante.
// ============================================================================

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::CONFIG;
use crate::error::CodecError;
use crate::models::SessionData;

/// Longitud en hex de un digest SHA-256
pub const SIGNATURE_HEX_LEN: usize = 64;

/// Carga canónica: el orden de los campos es parte del formato
#[derive(Serialize)]
struct CanonicalPayload<'a> {
    role: &'a str,
    username: &'a str,
    #[serde(rename = "expiresAt")]
    expires_at: i64,
    secret: &'a str,
}

#[derive(Clone)]
pub struct SignatureCodec {
    secret: String,
}

impl SignatureCodec {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn canonical_bytes(&self, data: &SessionData) -> Result<Vec<u8>, CodecError> {
        let payload = CanonicalPayload {
            role: data.role.as_str(),
            username: &data.username,
            expires_at: data.expires_at,
            secret: &self.secret,
        };
        Ok(serde_json::to_vec(&payload)?)
    }

    /// Digest SHA-256 en hex minúscula
    pub fn sign(&self, data: &SessionData) -> Result<String, CodecError> {
        let bytes = self.canonical_bytes(data)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    /// Un digest malformado simplemente no coincide
    pub fn verify(&self, data: &SessionData, signature: &str) -> Result<bool, CodecError> {
        if signature.len() != SIGNATURE_HEX_LEN {
            return Ok(false);
        }
        Ok(self.sign(data)? == signature)
    }
}

impl Default for SignatureCodec {
    fn default() -> Self {
        Self::new(CONFIG.session_secret.clone())
    }
}
