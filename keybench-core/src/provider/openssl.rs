//! OpenSSL-backed signature provider.
//!
//! RSA descriptors use RSASSA-PKCS1-v1_5 with SHA-256; ECC descriptors
//! use ECDSA with SHA-256 over the named prime curve. Key generation,
//! signing, and verification all run on the blocking pool so harness
//! tasks stay cooperative.

use crate::descriptor::{Algorithm, AlgorithmDescriptor, Curve};
use crate::error::ProviderError;
use crate::provider::{KeyPair, KeyPairInner, SignatureProvider};
use async_trait::async_trait;
use openssl::ec::{EcGroup, EcKey};
use openssl::error::ErrorStack;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::sign::{Signer, Verifier};
use std::sync::Arc;
use tracing::debug;

fn curve_nid(curve: Curve) -> Nid {
    match curve {
        Curve::P256 => Nid::X9_62_PRIME256V1,
        Curve::P384 => Nid::SECP384R1,
        Curve::P521 => Nid::SECP521R1,
    }
}

fn generate(algorithm: Algorithm) -> Result<PKey<Private>, ErrorStack> {
    match algorithm {
        Algorithm::Rsa { modulus_bits } => {
            let rsa = Rsa::generate(modulus_bits)?;
            PKey::from_rsa(rsa)
        }
        Algorithm::Ecc { curve } => {
            let group = EcGroup::from_curve_name(curve_nid(curve))?;
            let key = EcKey::generate(&group)?;
            PKey::from_ec_key(key)
        }
    }
}

/// Production signature backend over the `openssl` crate.
pub struct OpensslProvider;

impl OpensslProvider {
    /// Construct the backend, probing that the linked library supports
    /// the catalog's curves. Absence surfaces here, at wiring time, not
    /// during a run.
    pub fn new() -> Result<Self, ProviderError> {
        for curve in [Curve::P256, Curve::P384, Curve::P521] {
            EcGroup::from_curve_name(curve_nid(curve)).map_err(|e| {
                ProviderError::Unavailable {
                    backend: "openssl".into(),
                    message: format!("curve {curve} not supported: {e}"),
                }
            })?;
        }
        debug!("openssl signature backend initialized");
        Ok(Self)
    }

    fn pkey(keypair: &KeyPair) -> Option<Arc<PKey<Private>>> {
        match &keypair.inner {
            KeyPairInner::Openssl(pkey) => Some(Arc::clone(pkey)),
            KeyPairInner::Mock => None,
        }
    }
}

#[async_trait]
impl SignatureProvider for OpensslProvider {
    async fn generate_keypair(
        &self,
        descriptor: &AlgorithmDescriptor,
    ) -> Result<KeyPair, ProviderError> {
        let descriptor = *descriptor;
        let pkey = tokio::task::spawn_blocking(move || generate(descriptor.algorithm))
            .await
            .map_err(|e| ProviderError::Keygen {
                algorithm: descriptor.id.into(),
                message: e.to_string(),
            })?
            .map_err(|e| ProviderError::Keygen {
                algorithm: descriptor.id.into(),
                message: e.to_string(),
            })?;
        Ok(KeyPair { inner: KeyPairInner::Openssl(Arc::new(pkey)) })
    }

    async fn sign(
        &self,
        descriptor: &AlgorithmDescriptor,
        keypair: &KeyPair,
        message: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        let descriptor = *descriptor;
        let pkey = Self::pkey(keypair).ok_or_else(|| ProviderError::Sign {
            algorithm: descriptor.id.into(),
            message: "key pair was not produced by the openssl backend".into(),
        })?;
        let message = message.to_vec();
        tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ErrorStack> {
            let mut signer = Signer::new(MessageDigest::sha256(), &pkey)?;
            signer.update(&message)?;
            signer.sign_to_vec()
        })
        .await
        .map_err(|e| ProviderError::Sign {
            algorithm: descriptor.id.into(),
            message: e.to_string(),
        })?
        .map_err(|e| ProviderError::Sign {
            algorithm: descriptor.id.into(),
            message: e.to_string(),
        })
    }

    async fn verify(
        &self,
        descriptor: &AlgorithmDescriptor,
        keypair: &KeyPair,
        signature: &[u8],
        message: &[u8],
    ) -> Result<bool, ProviderError> {
        let descriptor = *descriptor;
        let pkey = Self::pkey(keypair).ok_or_else(|| ProviderError::Verify {
            algorithm: descriptor.id.into(),
            message: "key pair was not produced by the openssl backend".into(),
        })?;
        let signature = signature.to_vec();
        let message = message.to_vec();
        tokio::task::spawn_blocking(move || -> Result<bool, ErrorStack> {
            let mut verifier = Verifier::new(MessageDigest::sha256(), &pkey)?;
            verifier.update(&message)?;
            verifier.verify(&signature)
        })
        .await
        .map_err(|e| ProviderError::Verify {
            algorithm: descriptor.id.into(),
            message: e.to_string(),
        })?
        .map_err(|e| ProviderError::Verify {
            algorithm: descriptor.id.into(),
            message: e.to_string(),
        })
    }

    fn name(&self) -> &str {
        "openssl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor;

    #[tokio::test]
    async fn test_p256_sign_verify_roundtrip() {
        let provider = OpensslProvider::new().unwrap();
        let desc = descriptor::find("p256").unwrap();

        let keypair = provider.generate_keypair(&desc).await.unwrap();
        let sig = provider.sign(&desc, &keypair, b"benchmark").await.unwrap();
        let ok = provider.verify(&desc, &keypair, &sig, b"benchmark").await.unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_message() {
        let provider = OpensslProvider::new().unwrap();
        let desc = descriptor::find("p256").unwrap();

        let keypair = provider.generate_keypair(&desc).await.unwrap();
        let sig = provider.sign(&desc, &keypair, b"benchmark").await.unwrap();
        let ok = provider.verify(&desc, &keypair, &sig, b"tampered").await.unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_rsa_sign_verify_roundtrip() {
        let provider = OpensslProvider::new().unwrap();
        let desc = descriptor::find("rsa2048").unwrap();

        let keypair = provider.generate_keypair(&desc).await.unwrap();
        let sig = provider.sign(&desc, &keypair, b"benchmark").await.unwrap();
        // PKCS#1 v1.5 signatures are as long as the modulus.
        assert_eq!(sig.len(), 256);
        let ok = provider.verify(&desc, &keypair, &sig, b"benchmark").await.unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_sign_with_foreign_keypair_fails() {
        let provider = OpensslProvider::new().unwrap();
        let desc = descriptor::find("p256").unwrap();
        let foreign = KeyPair { inner: KeyPairInner::Mock };

        let err = provider.sign(&desc, &foreign, b"benchmark").await.unwrap_err();
        assert!(matches!(err, ProviderError::Sign { .. }));
    }
}
