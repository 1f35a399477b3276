//! Benchmark harness — drives repeated signature operations, maintains
//! running averages, and streams them to a progress sink.
//!
//! A run executes three phases in fixed order (keygen → sign → verify),
//! each for a configured number of repetitions. The key pair produced by
//! the final keygen repetition is reused for every sign repetition, and
//! the signature from the final sign repetition is reused for every
//! verify repetition. After every single repetition the sink receives the
//! full running-averages triple, which is what lets a front end render a
//! live chart.
//!
//! Compare mode interleaves two single runs cooperatively in one task;
//! there is no synchronization between their phase boundaries, and both
//! sides always run to completion before the outcome is decided.

use crate::descriptor::AlgorithmDescriptor;
use crate::error::Result;
use crate::provider::{KeyPair, SignatureProvider};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Default repetitions per phase.
pub const DEFAULT_ITERATIONS: usize = 20;

/// Default message signed and verified during a run.
pub const DEFAULT_MESSAGE: &[u8] = b"benchmark";

/// One of the three measured operation kinds, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Keygen,
    Sign,
    Verify,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Keygen => write!(f, "keygen"),
            Phase::Sign => write!(f, "sign"),
            Phase::Verify => write!(f, "verify"),
        }
    }
}

/// Observable lifecycle of the most recent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running(Phase),
    Completed,
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Running(phase) => write!(f, "running {phase}"),
            RunState::Completed => write!(f, "completed"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// Arithmetic means, in milliseconds, of the samples collected so far.
/// Phases that have not started yet report 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunningAverages {
    pub keygen: f64,
    pub sign: f64,
    pub verify: f64,
}

/// Final averages for one descriptor after a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkResult {
    pub descriptor: AlgorithmDescriptor,
    pub averages: RunningAverages,
}

/// Receives a running-averages snapshot after every repetition.
///
/// Invoked synchronously from the measuring task, so implementations
/// should return quickly.
pub trait ProgressSink: Send + Sync {
    fn on_sample(&self, averages: RunningAverages);
}

impl<F> ProgressSink for F
where
    F: Fn(RunningAverages) + Send + Sync,
{
    fn on_sample(&self, averages: RunningAverages) {
        self(averages)
    }
}

/// A sink that discards every snapshot.
pub struct NoOpSink;

impl ProgressSink for NoOpSink {
    fn on_sample(&self, _averages: RunningAverages) {}
}

fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[derive(Default)]
struct PhaseSamples {
    keygen: Vec<f64>,
    sign: Vec<f64>,
    verify: Vec<f64>,
}

impl PhaseSamples {
    fn averages(&self) -> RunningAverages {
        RunningAverages {
            keygen: mean(&self.keygen),
            sign: mean(&self.sign),
            verify: mean(&self.verify),
        }
    }
}

/// Drives benchmark runs against an injected signature provider.
///
/// The harness is not re-entrant: at most one run should be in flight at
/// a time. A run started while another is in flight supersedes it — the
/// older run still executes to completion, but its state transitions are
/// discarded via the generation counter.
pub struct BenchmarkHarness {
    provider: Arc<dyn SignatureProvider>,
    iterations: usize,
    message: Vec<u8>,
    state: Mutex<RunState>,
    generation: AtomicU64,
}

impl BenchmarkHarness {
    pub fn new(provider: Arc<dyn SignatureProvider>) -> Self {
        Self {
            provider,
            iterations: DEFAULT_ITERATIONS,
            message: DEFAULT_MESSAGE.to_vec(),
            state: Mutex::new(RunState::Idle),
            generation: AtomicU64::new(0),
        }
    }

    /// Set the repetitions per phase. Values below 1 are clamped to 1.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    /// Set the message signed and verified during runs.
    pub fn with_message(mut self, message: impl Into<Vec<u8>>) -> Self {
        self.message = message.into();
        self
    }

    /// The state of the most recent run.
    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap()
    }

    /// Benchmark a single descriptor.
    ///
    /// Emits exactly `3 * iterations` snapshots to the sink, the first of
    /// them after the first keygen repetition.
    pub async fn run_single(
        &self,
        descriptor: AlgorithmDescriptor,
        sink: &dyn ProgressSink,
    ) -> Result<BenchmarkResult> {
        let generation = self.begin_run();
        info!(
            algorithm = descriptor.id,
            iterations = self.iterations,
            provider = self.provider.name(),
            "benchmark run started"
        );

        let outcome = self.drive(descriptor, generation, sink).await;
        match &outcome {
            Ok(result) => {
                self.finish_if_current(generation, RunState::Completed);
                info!(
                    algorithm = descriptor.id,
                    keygen_ms = result.averages.keygen,
                    sign_ms = result.averages.sign,
                    verify_ms = result.averages.verify,
                    "benchmark run completed"
                );
            }
            Err(err) => {
                self.finish_if_current(generation, RunState::Failed);
                error!(algorithm = descriptor.id, error = %err, "benchmark run failed");
            }
        }
        outcome
    }

    /// Benchmark two descriptors concurrently, streaming each side's
    /// progress to its own sink.
    ///
    /// The two sides interleave cooperatively with no synchronization
    /// between their phase boundaries. Both always run to completion; if
    /// either side failed, the whole compare run is reported failed (side
    /// A's error takes precedence when both fail).
    pub async fn run_compare(
        &self,
        descriptor_a: AlgorithmDescriptor,
        descriptor_b: AlgorithmDescriptor,
        sink_a: &dyn ProgressSink,
        sink_b: &dyn ProgressSink,
    ) -> Result<(BenchmarkResult, BenchmarkResult)> {
        let generation = self.begin_run();
        info!(
            side_a = descriptor_a.id,
            side_b = descriptor_b.id,
            iterations = self.iterations,
            "compare run started"
        );

        let (outcome_a, outcome_b) = tokio::join!(
            self.drive(descriptor_a, generation, sink_a),
            self.drive(descriptor_b, generation, sink_b),
        );

        match (outcome_a, outcome_b) {
            (Ok(result_a), Ok(result_b)) => {
                self.finish_if_current(generation, RunState::Completed);
                info!(side_a = descriptor_a.id, side_b = descriptor_b.id, "compare run completed");
                Ok((result_a, result_b))
            }
            (Err(err), _) | (Ok(_), Err(err)) => {
                self.finish_if_current(generation, RunState::Failed);
                error!(error = %err, "compare run failed");
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        descriptor: AlgorithmDescriptor,
        generation: u64,
        sink: &dyn ProgressSink,
    ) -> Result<BenchmarkResult> {
        let iterations = self.iterations.max(1);
        let mut samples = PhaseSamples::default();

        self.set_phase_if_current(generation, Phase::Keygen);
        debug!(algorithm = descriptor.id, "keygen phase started");
        let mut keypair: Option<KeyPair> = None;
        for _ in 0..iterations {
            let start = Instant::now();
            let generated = self.provider.generate_keypair(&descriptor).await?;
            samples.keygen.push(elapsed_ms(start));
            keypair = Some(generated);
            sink.on_sample(samples.averages());
        }
        let keypair = keypair.expect("at least one keygen repetition");

        self.set_phase_if_current(generation, Phase::Sign);
        debug!(algorithm = descriptor.id, "sign phase started");
        let mut signature: Option<Vec<u8>> = None;
        for _ in 0..iterations {
            let start = Instant::now();
            let signed = self.provider.sign(&descriptor, &keypair, &self.message).await?;
            samples.sign.push(elapsed_ms(start));
            signature = Some(signed);
            sink.on_sample(samples.averages());
        }
        let signature = signature.expect("at least one sign repetition");

        self.set_phase_if_current(generation, Phase::Verify);
        debug!(algorithm = descriptor.id, "verify phase started");
        for _ in 0..iterations {
            let start = Instant::now();
            let ok = self
                .provider
                .verify(&descriptor, &keypair, &signature, &self.message)
                .await?;
            samples.verify.push(elapsed_ms(start));
            if !ok {
                warn!(algorithm = descriptor.id, "signature did not verify during benchmark");
            }
            sink.on_sample(samples.averages());
        }

        Ok(BenchmarkResult {
            descriptor,
            averages: samples.averages(),
        })
    }

    fn begin_run(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.state.lock().unwrap() = RunState::Running(Phase::Keygen);
        generation
    }

    fn set_phase_if_current(&self, generation: u64, phase: Phase) {
        if self.generation.load(Ordering::SeqCst) == generation {
            *self.state.lock().unwrap() = RunState::Running(phase);
        }
    }

    fn finish_if_current(&self, generation: u64, state: RunState) {
        if self.generation.load(Ordering::SeqCst) == generation {
            *self.state.lock().unwrap() = state;
        } else {
            debug!(generation, "discarding terminal state of superseded run");
        }
    }
}
