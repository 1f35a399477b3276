//! # Keybench Core
//!
//! Core library for the Keybench RSA/ECC signature benchmarking toolkit.
//! Provides the descriptor catalog, the signature provider abstraction
//! with its openssl backend, the benchmark harness, PEM key export, the
//! security-efficiency probe, and configuration.

pub mod config;
pub mod descriptor;
pub mod efficiency;
pub mod error;
pub mod export;
pub mod harness;
pub mod provider;

// Re-export commonly used types at the crate root.
pub use config::{BenchConfig, KeybenchConfig, load_config};
pub use descriptor::{Algorithm, AlgorithmDescriptor, CATALOG, Curve};
pub use efficiency::EfficiencyReport;
pub use error::{ConfigError, KeybenchError, ProviderError, Result};
pub use export::{PemKeyPair, export_pem};
pub use harness::{
    BenchmarkHarness, BenchmarkResult, NoOpSink, Phase, ProgressSink, RunState, RunningAverages,
};
pub use provider::{KeyPair, MockProvider, SignatureProvider, openssl::OpensslProvider};
