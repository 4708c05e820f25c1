#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo
    )
)]

//! Cryptographic primitives for the corechain miner.
//!
//! This crate is intentionally thin: per the system specification,
//! cryptographic primitive *implementations* (hashing, signing) are an
//! external collaborator's concern. We wrap a real crate (`dcrypt`) the way
//! this crate wraps an existing primitives crate, rather than hand-rolling
//! elliptic-curve or hash-function internals here.

use dcrypt::algorithms::hash::{HashFunction, Sha256};
use dcrypt::algorithms::ByteSerializable;
use dcrypt::api::Signature as SignatureTrait;
use dcrypt::sign::eddsa::{self, Ed25519PublicKey, Ed25519SecretKey};
use thiserror::Error;

/// Errors surfaced by the cryptographic wrapper layer.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The underlying hash computation failed.
    #[error("hash computation failed: {0}")]
    Hash(String),
    /// Key generation, signing, or verification failed.
    #[error("signature operation failed: {0}")]
    Signature(String),
    /// A key or signature had an unexpected byte length.
    #[error("invalid key or signature length: expected {expected}, got {got}")]
    InvalidLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        got: usize,
    },
}

/// Computes the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> Result<[u8; 32], CryptoError> {
    let digest = Sha256::digest(data).map_err(|e| CryptoError::Hash(e.to_string()))?;
    let bytes = digest.to_bytes();
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| CryptoError::InvalidLength {
            expected: 32,
            got: v.len(),
        })
}

/// An Ed25519 keypair used to sign transactions and block headers.
pub struct KeyPair {
    public: Ed25519PublicKey,
    secret: Ed25519SecretKey,
}

impl KeyPair {
    /// Generates a fresh keypair from the OS RNG.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut rng = rand::rngs::OsRng;
        let (public, secret) =
            eddsa::Ed25519::keypair(&mut rng).map_err(|e| CryptoError::Signature(e.to_string()))?;
        Ok(Self { public, secret })
    }

    /// Returns the raw public key bytes.
    pub fn public_bytes(&self) -> Vec<u8> {
        self.public.to_bytes()
    }

    /// Signs `message`, returning the raw signature bytes.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let sig = eddsa::Ed25519::sign(message, &self.secret)
            .map_err(|e| CryptoError::Signature(e.to_string()))?;
        Ok(sig.to_bytes())
    }
}

/// Verifies a raw Ed25519 signature against a message and public key.
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
    let public = Ed25519PublicKey::from_bytes(public_key)
        .map_err(|e| CryptoError::Signature(e.to_string()))?;
    let sig =
        eddsa::Ed25519Signature::from_bytes(signature).map_err(|e| CryptoError::Signature(e.to_string()))?;
    Ok(eddsa::Ed25519::verify(message, &sig, &public).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_deterministic() {
        let a = sha256(b"corechain").expect("hash");
        let b = sha256(b"corechain").expect("hash");
        assert_eq!(a, b);
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let kp = KeyPair::generate().expect("keypair");
        let sig = kp.sign(b"payload").expect("sign");
        assert!(verify(&kp.public_bytes(), b"payload", &sig).expect("verify"));
    }
}
