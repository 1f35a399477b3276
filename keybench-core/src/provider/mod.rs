//! Signature provider abstraction.
//!
//! Defines the `SignatureProvider` trait for backend-agnostic key
//! generation, signing, and verification, plus a mock implementation with
//! scriptable latencies and failures for tests. The production backend
//! lives in [`openssl`].
//!
//! Key pairs and signatures are opaque to callers: the harness only times
//! their production, it never inspects their contents.

pub mod openssl;

use crate::descriptor::AlgorithmDescriptor;
use crate::error::ProviderError;
use crate::harness::Phase;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Trait for signature backends.
///
/// All three operations are asynchronous; implementations must not block
/// the calling task (CPU-heavy work belongs on a blocking pool).
#[async_trait]
pub trait SignatureProvider: Send + Sync {
    /// Generate a fresh key pair for the given algorithm.
    async fn generate_keypair(
        &self,
        descriptor: &AlgorithmDescriptor,
    ) -> Result<KeyPair, ProviderError>;

    /// Sign `message` with the key pair's private key.
    async fn sign(
        &self,
        descriptor: &AlgorithmDescriptor,
        keypair: &KeyPair,
        message: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;

    /// Verify `signature` over `message` with the key pair's public key.
    ///
    /// Returns `Ok(false)` for a well-formed but non-matching signature;
    /// `Err` is reserved for operational failures of the backend itself.
    async fn verify(
        &self,
        descriptor: &AlgorithmDescriptor,
        keypair: &KeyPair,
        signature: &[u8],
        message: &[u8],
    ) -> Result<bool, ProviderError>;

    /// Backend name, for diagnostics.
    fn name(&self) -> &str;
}

/// An opaque key pair handle produced by a provider.
pub struct KeyPair {
    pub(crate) inner: KeyPairInner,
}

pub(crate) enum KeyPairInner {
    Openssl(std::sync::Arc<::openssl::pkey::PKey<::openssl::pkey::Private>>),
    Mock,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner {
            KeyPairInner::Openssl(_) => f.write_str("KeyPair(openssl)"),
            KeyPairInner::Mock => f.write_str("KeyPair(mock)"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Latencies {
    keygen: Duration,
    sign: Duration,
    verify: Duration,
}

impl Latencies {
    fn from_ms(keygen: u64, sign: u64, verify: u64) -> Self {
        Self {
            keygen: Duration::from_millis(keygen),
            sign: Duration::from_millis(sign),
            verify: Duration::from_millis(verify),
        }
    }

    fn for_operation(&self, operation: Phase) -> Duration {
        match operation {
            Phase::Keygen => self.keygen,
            Phase::Sign => self.sign,
            Phase::Verify => self.verify,
        }
    }
}

/// Fail the `at_call`-th invocation (1-based) of the given operation.
/// When `descriptor` is set, only calls for that descriptor are counted.
#[derive(Debug, Clone)]
pub struct ScriptedFailure {
    pub descriptor: Option<String>,
    pub operation: Phase,
    pub at_call: usize,
}

/// A mock signature provider for tests and development.
///
/// Each operation sleeps for a configured duration before returning a
/// dummy artifact, so wall-clock measurements are deterministic under a
/// paused tokio test clock. Latencies can be overridden per descriptor
/// and failures scripted per operation.
pub struct MockProvider {
    default_latencies: Latencies,
    overrides: HashMap<String, Latencies>,
    fail_on: Option<ScriptedFailure>,
    calls: Mutex<HashMap<(String, Phase), usize>>,
}

impl MockProvider {
    /// A provider where every operation completes instantly.
    pub fn new() -> Self {
        Self::with_latencies_ms(0, 0, 0)
    }

    /// A provider with fixed per-operation latencies in milliseconds.
    pub fn with_latencies_ms(keygen: u64, sign: u64, verify: u64) -> Self {
        Self {
            default_latencies: Latencies::from_ms(keygen, sign, verify),
            overrides: HashMap::new(),
            fail_on: None,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Override the latencies for one descriptor id.
    pub fn latencies_for(mut self, id: &str, keygen: u64, sign: u64, verify: u64) -> Self {
        self.overrides.insert(id.to_string(), Latencies::from_ms(keygen, sign, verify));
        self
    }

    /// Script a failure for the `at_call`-th invocation of `operation`,
    /// counted across all descriptors.
    pub fn fail_on(mut self, operation: Phase, at_call: usize) -> Self {
        self.fail_on = Some(ScriptedFailure { descriptor: None, operation, at_call });
        self
    }

    /// Script a failure for the `at_call`-th invocation of `operation`
    /// made with the given descriptor id.
    pub fn fail_on_descriptor(mut self, id: &str, operation: Phase, at_call: usize) -> Self {
        self.fail_on = Some(ScriptedFailure {
            descriptor: Some(id.to_string()),
            operation,
            at_call,
        });
        self
    }

    /// Total invocations seen for `operation`, across all descriptors.
    pub fn calls(&self, operation: Phase) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|((_, op), _)| *op == operation)
            .map(|(_, count)| count)
            .sum()
    }

    fn record_call(&self, id: &str, operation: Phase) -> Result<(), ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        let count = calls.entry((id.to_string(), operation)).or_insert(0);
        *count += 1;
        let descriptor_count = *count;
        let total: usize = calls
            .iter()
            .filter(|((_, op), _)| *op == operation)
            .map(|(_, c)| c)
            .sum();
        drop(calls);

        if let Some(failure) = &self.fail_on {
            if failure.operation != operation {
                return Ok(());
            }
            let observed = match &failure.descriptor {
                Some(scoped) if scoped != id => return Ok(()),
                Some(_) => descriptor_count,
                None => total,
            };
            if observed == failure.at_call {
                let message = format!("scripted failure at call {observed}");
                return Err(match operation {
                    Phase::Keygen => ProviderError::Keygen { algorithm: id.into(), message },
                    Phase::Sign => ProviderError::Sign { algorithm: id.into(), message },
                    Phase::Verify => ProviderError::Verify { algorithm: id.into(), message },
                });
            }
        }
        Ok(())
    }

    fn latency(&self, id: &str, operation: Phase) -> Duration {
        self.overrides
            .get(id)
            .unwrap_or(&self.default_latencies)
            .for_operation(operation)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignatureProvider for MockProvider {
    async fn generate_keypair(
        &self,
        descriptor: &AlgorithmDescriptor,
    ) -> Result<KeyPair, ProviderError> {
        self.record_call(descriptor.id, Phase::Keygen)?;
        tokio::time::sleep(self.latency(descriptor.id, Phase::Keygen)).await;
        Ok(KeyPair { inner: KeyPairInner::Mock })
    }

    async fn sign(
        &self,
        descriptor: &AlgorithmDescriptor,
        _keypair: &KeyPair,
        _message: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        self.record_call(descriptor.id, Phase::Sign)?;
        tokio::time::sleep(self.latency(descriptor.id, Phase::Sign)).await;
        Ok(vec![0xAB; 64])
    }

    async fn verify(
        &self,
        descriptor: &AlgorithmDescriptor,
        _keypair: &KeyPair,
        _signature: &[u8],
        _message: &[u8],
    ) -> Result<bool, ProviderError> {
        self.record_call(descriptor.id, Phase::Verify)?;
        tokio::time::sleep(self.latency(descriptor.id, Phase::Verify)).await;
        Ok(true)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor;

    #[tokio::test]
    async fn test_mock_roundtrip() {
        let provider = MockProvider::new();
        let desc = descriptor::find("p256").unwrap();

        let keypair = provider.generate_keypair(&desc).await.unwrap();
        let sig = provider.sign(&desc, &keypair, b"benchmark").await.unwrap();
        let ok = provider.verify(&desc, &keypair, &sig, b"benchmark").await.unwrap();

        assert!(ok);
        assert_eq!(provider.calls(Phase::Keygen), 1);
        assert_eq!(provider.calls(Phase::Sign), 1);
        assert_eq!(provider.calls(Phase::Verify), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_latency_is_observable() {
        let provider = MockProvider::with_latencies_ms(5, 2, 1);
        let desc = descriptor::find("rsa2048").unwrap();

        let start = tokio::time::Instant::now();
        let keypair = provider.generate_keypair(&desc).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(5));

        let start = tokio::time::Instant::now();
        let sig = provider.sign(&desc, &keypair, b"x").await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(2));

        let start = tokio::time::Instant::now();
        provider.verify(&desc, &keypair, &sig, b"x").await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_per_descriptor_latency_override() {
        let provider = MockProvider::with_latencies_ms(1, 1, 1).latencies_for("rsa2048", 10, 4, 2);
        let rsa = descriptor::find("rsa2048").unwrap();
        let ecc = descriptor::find("p256").unwrap();

        let start = tokio::time::Instant::now();
        provider.generate_keypair(&rsa).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(10));

        let start = tokio::time::Instant::now();
        provider.generate_keypair(&ecc).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_mock_scripted_failure() {
        let provider = MockProvider::new().fail_on(Phase::Sign, 2);
        let desc = descriptor::find("p384").unwrap();

        let keypair = provider.generate_keypair(&desc).await.unwrap();
        assert!(provider.sign(&desc, &keypair, b"m").await.is_ok());
        let err = provider.sign(&desc, &keypair, b"m").await.unwrap_err();
        assert!(matches!(err, ProviderError::Sign { .. }));
        // Subsequent calls succeed again.
        assert!(provider.sign(&desc, &keypair, b"m").await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_descriptor_scoped_failure() {
        let provider = MockProvider::new().fail_on_descriptor("p256", Phase::Keygen, 1);
        let rsa = descriptor::find("rsa2048").unwrap();
        let ecc = descriptor::find("p256").unwrap();

        assert!(provider.generate_keypair(&rsa).await.is_ok());
        let err = provider.generate_keypair(&ecc).await.unwrap_err();
        assert!(matches!(err, ProviderError::Keygen { .. }));
        assert!(provider.generate_keypair(&rsa).await.is_ok());
    }
}
