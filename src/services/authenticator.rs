// ============================================================================
// AUTHENTICATOR - Credenciales → rol
// ============================================================================
// La tabla guarda sha256(salt ":" password) en lugar de la contraseña.
// Sigue siendo una verificación del lado del cliente; credenciales emitidas y
// verificadas por el servidor quedan fuera de este núcleo.
// ============================================================================

use sha2::{Digest, Sha256};

use crate::models::{Identity, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialEntry {
    pub username: String,
    pub role: Role,
    salt: String,
    password_hash: String,
}

impl CredentialEntry {
    /// Crea una entrada con una sal nueva
    pub fn new(username: impl Into<String>, role: Role, password: &str) -> Self {
        let salt = uuid::Uuid::new_v4().simple().to_string();
        let password_hash = hash_password(&salt, password);
        Self {
            username: username.into(),
            role,
            salt,
            password_hash,
        }
    }

    /// Entrada con sal y hash ya calculados
    pub fn from_hash(
        username: impl Into<String>,
        role: Role,
        salt: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            role,
            salt: salt.into(),
            password_hash: password_hash.into(),
        }
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && hash_password(&self.salt, password) == self.password_hash
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Comparación sin estado contra una tabla fija de credenciales
#[derive(Debug, Clone)]
pub struct Authenticator {
    entries: Vec<CredentialEntry>,
}

impl Authenticator {
    pub fn new(entries: Vec<CredentialEntry>) -> Self {
        Self { entries }
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Option<Identity> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.matches(username, password))?;

        Some(Identity {
            role: entry.role,
            username: entry.username.clone(),
        })
    }
}

impl Default for Authenticator {
    /// Las dos cuentas del despliegue actual
    fn default() -> Self {
        Self::new(vec![
            CredentialEntry::from_hash(
                "admin",
                Role::Admin,
                "c1f0a9e4-admin",
                "d3bf8d8890f54de72648ad2c21883973300228184a3406868f11ff6a1d4acdc3",
            ),
            CredentialEntry::from_hash(
                "driver",
                Role::Driver,
                "5b7d2e81-driver",
                "74127e4fad9837fcdaf0825527be8523019e670403e29497ba5ce1fc06693b22",
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_accounts_resolve_to_their_roles() {
        let auth = Authenticator::default();

        let admin = auth.authenticate("admin", "admin123").unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.username, "admin");

        let driver = auth.authenticate("driver", "driver123").unwrap();
        assert_eq!(driver.role, Role::Driver);
    }

    #[test]
    fn wrong_password_or_swapped_credentials_fail() {
        let auth = Authenticator::default();
        assert!(auth.authenticate("admin", "driver123").is_none());
        assert!(auth.authenticate("driver", "admin123").is_none());
        assert!(auth.authenticate("admin", "").is_none());
        assert!(auth.authenticate("nobody", "admin123").is_none());
    }

    #[test]
    fn fresh_entries_get_distinct_salts() {
        let a = CredentialEntry::new("ana", Role::Driver, "same");
        let b = CredentialEntry::new("ana", Role::Driver, "same");
        assert_ne!(a.password_hash, b.password_hash);

        let auth = Authenticator::new(vec![a]);
        assert!(auth.authenticate("ana", "same").is_some());
    }
}
