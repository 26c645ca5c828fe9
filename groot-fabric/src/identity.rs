//! Signing identity
//!
//! The enrolled user whose key signs every proposal and event
//! registration. Keys live in a local key store directory, one
//! `<user_id>.key` file holding the hex-encoded Ed25519 secret key.
//! Enrollment itself is out of scope; `generate`/`persist` exist so the
//! CLI can seed a store.

use std::path::{Path, PathBuf};

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use groot_core::{ChannelError, ChannelResult};

pub struct Identity {
    user_id: String,
    signing_key: SigningKey,
}

// The secret key never reaches logs or error output.
impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

impl Identity {
    /// Generate a fresh identity (tests and `init`).
    pub fn generate(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Load an enrolled user from the key store directory.
    pub fn load(store_path: &Path, user_id: &str) -> ChannelResult<Self> {
        let key_path = store_path.join(format!("{user_id}.key"));
        let encoded = std::fs::read_to_string(&key_path).map_err(|e| {
            ChannelError::Identity(format!("reading {}: {e}", key_path.display()))
        })?;
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| ChannelError::Identity(format!("decoding {}: {e}", key_path.display())))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ChannelError::Identity("signing key must be 32 bytes".to_string()))?;

        Ok(Self {
            user_id: user_id.to_string(),
            signing_key: SigningKey::from_bytes(&bytes),
        })
    }

    /// Write the key into the store directory; returns the key path.
    pub fn persist(&self, store_path: &Path) -> ChannelResult<PathBuf> {
        std::fs::create_dir_all(store_path).map_err(|e| {
            ChannelError::Identity(format!("creating {}: {e}", store_path.display()))
        })?;
        let key_path = store_path.join(format!("{}.key", self.user_id));
        std::fs::write(&key_path, hex::encode(self.signing_key.to_bytes())).map_err(|e| {
            ChannelError::Identity(format!("writing {}: {e}", key_path.display()))
        })?;
        Ok(key_path)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    /// Creator string carried on every signed request.
    pub fn creator(&self) -> String {
        format!("{}:{}", self.user_id, self.public_key_hex())
    }

    /// Sign the SHA-256 digest of `message`, hex encoded.
    pub fn sign(&self, message: &[u8]) -> String {
        let digest = Sha256::digest(message);
        hex::encode(self.signing_key.sign(&digest).to_bytes())
    }

    /// Verify a signature produced by [`sign`](Self::sign).
    pub fn verify(&self, message: &[u8], signature_hex: &str) -> ChannelResult<()> {
        let bytes = hex::decode(signature_hex)
            .map_err(|e| ChannelError::Identity(format!("decoding signature: {e}")))?;
        let signature = Signature::from_slice(&bytes)
            .map_err(|e| ChannelError::Identity(format!("malformed signature: {e}")))?;
        let digest = Sha256::digest(message);
        self.signing_key
            .verifying_key()
            .verify(&digest, &signature)
            .map_err(|e| ChannelError::Identity(format!("signature verification failed: {e}")))
    }
}
