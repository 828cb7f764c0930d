//! Admin credential check.
//!
//! The feedback service does no authorization of its own; everything under
//! `/admin` sits behind an `AdminGate` and a signed session token.

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use async_trait::async_trait;
use rand::rngs::OsRng;
use tracing::{debug, warn};

/// Opaque credential check: true means the caller is the administrator.
#[async_trait]
pub trait AdminGate: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> bool;
}

/// Single admin account from configuration, password stored as an argon2 hash.
/// Without a hash every login is refused.
#[derive(Clone, Debug)]
pub struct ConfiguredAdmin {
    username: String,
    password_hash: Option<String>,
}

impl ConfiguredAdmin {
    pub fn new(username: impl Into<String>, password_hash: &str) -> anyhow::Result<Self> {
        let password_hash = if password_hash.trim().is_empty() {
            warn!("no admin password hash configured; admin login disabled");
            None
        } else {
            PasswordHash::new(password_hash)
                .map_err(|e| anyhow::anyhow!("invalid admin password hash: {e}"))?;
            Some(password_hash.to_string())
        };
        Ok(Self { username: username.into(), password_hash })
    }

    /// Hash a plain password into the PHC string expected in `admin.password_hash`.
    pub fn hash_password(plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?
            .to_string();
        Ok(hash)
    }
}

#[async_trait]
impl AdminGate for ConfiguredAdmin {
    async fn verify(&self, username: &str, password: &str) -> bool {
        let Some(stored) = self.password_hash.as_deref() else { return false };
        if username != self.username {
            debug!("unknown admin username");
            return false;
        }
        match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn verifies_configured_credentials() -> anyhow::Result<()> {
        let hash = ConfiguredAdmin::hash_password("password123")?;
        let gate = ConfiguredAdmin::new("admin", &hash)?;

        assert!(gate.verify("admin", "password123").await);
        assert!(!gate.verify("admin", "password124").await);
        assert!(!gate.verify("root", "password123").await);
        Ok(())
    }

    #[tokio::test]
    async fn missing_hash_refuses_everyone() -> anyhow::Result<()> {
        let gate = ConfiguredAdmin::new("admin", "")?;
        assert!(!gate.verify("admin", "").await);
        Ok(())
    }

    #[test]
    fn malformed_hash_is_rejected_up_front() {
        assert!(ConfiguredAdmin::new("admin", "password123").is_err());
    }
}
