// 🔒 Operator Authentication
// One shared password gates every mutating operation. No accounts, no lockout.

use crate::error::{AuctionError, Result};
use sha2::{Digest, Sha256};

/// Password used when the settings file does not provide one
pub const DEFAULT_PASSWORD: &str = "ABCD2026";

/// SHA-256 hex digest of a password
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct OperatorAuth {
    password_sha256: String,
    authenticated: bool,
}

impl OperatorAuth {
    pub fn new(password_sha256: impl Into<String>) -> Self {
        OperatorAuth {
            password_sha256: password_sha256.into().to_lowercase(),
            authenticated: false,
        }
    }

    pub fn with_password(password: &str) -> Self {
        Self::new(hash_password(password))
    }

    /// Check a password without changing the login state
    pub fn verify(&self, password: &str) -> Result<()> {
        if hash_password(password) == self.password_sha256 {
            Ok(())
        } else {
            Err(AuctionError::AuthenticationFailed)
        }
    }

    pub fn login(&mut self, password: &str) -> Result<()> {
        self.verify(password)?;
        self.authenticated = true;
        Ok(())
    }

    pub fn logout(&mut self) {
        self.authenticated = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn require(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(AuctionError::NotAuthenticated)
        }
    }
}

impl Default for OperatorAuth {
    fn default() -> Self {
        Self::with_password(DEFAULT_PASSWORD)
    }
}
