use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use super::*;

/// PKCE verifier with its S256 challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge {
    verifier: String,
    challenge: String,
}

impl PkceChallenge {
    /// Generates a random 64-character verifier and its challenge.
    pub fn generate() -> AppResult<Self> {
        use std::fmt::Write;

        let mut bytes = [0u8; 32];
        getrandom::fill(&mut bytes).map_err(|error| {
            AppError::Internal(format!("failed to generate code verifier: {error}"))
        })?;

        let verifier = bytes
            .iter()
            .fold(String::with_capacity(64), |mut acc, byte| {
                let _ = write!(acc, "{byte:02x}");
                acc
            });

        Ok(Self::from_verifier(verifier))
    }

    /// Derives the challenge for an existing verifier.
    #[must_use]
    pub fn from_verifier(verifier: String) -> Self {
        let digest = Sha256::digest(verifier.as_bytes());
        let challenge = URL_SAFE_NO_PAD.encode(digest);

        Self {
            verifier,
            challenge,
        }
    }

    /// Returns the secret verifier.
    #[must_use]
    pub fn verifier(&self) -> &str {
        self.verifier.as_str()
    }

    /// Returns the challenge sent to the provider.
    #[must_use]
    pub fn challenge(&self) -> &str {
        self.challenge.as_str()
    }
}
