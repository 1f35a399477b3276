//! Security-efficiency probe.
//!
//! Times one combined keygen + sign + verify round as a whole and scores
//! the algorithm as security bits delivered per millisecond of
//! computation.

use crate::descriptor::AlgorithmDescriptor;
use crate::error::Result;
use crate::provider::SignatureProvider;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};

/// Outcome of one efficiency probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficiencyReport {
    pub descriptor: AlgorithmDescriptor,
    /// Wall-clock time of the combined round, in milliseconds.
    pub elapsed_ms: f64,
    /// NIST security strength equivalent of the algorithm.
    pub security_bits: u32,
    /// Security bits per millisecond; higher is better.
    pub bits_per_ms: f64,
}

/// Run one keygen + sign + verify round and score it.
pub async fn measure(
    provider: &dyn SignatureProvider,
    descriptor: AlgorithmDescriptor,
    message: &[u8],
) -> Result<EfficiencyReport> {
    let start = Instant::now();
    let keypair = provider.generate_keypair(&descriptor).await?;
    let signature = provider.sign(&descriptor, &keypair, message).await?;
    let ok = provider.verify(&descriptor, &keypair, &signature, message).await?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    if !ok {
        warn!(algorithm = descriptor.id, "signature did not verify during efficiency probe");
    }

    let bits_per_ms = descriptor.security_bits as f64 / elapsed_ms;
    info!(
        algorithm = descriptor.id,
        elapsed_ms, bits_per_ms, "efficiency probe completed"
    );

    Ok(EfficiencyReport {
        descriptor,
        elapsed_ms,
        security_bits: descriptor.security_bits,
        bits_per_ms,
    })
}
