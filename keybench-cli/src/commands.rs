//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crate::render;
use anyhow::{anyhow, bail};
use keybench_core::provider::openssl::OpensslProvider;
use keybench_core::{
    AlgorithmDescriptor, BenchmarkHarness, CATALOG, KeybenchConfig, RunningAverages,
    SignatureProvider, descriptor, efficiency, export_pem, load_config,
};
use std::path::Path;
use std::sync::Arc;

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    iterations: Option<usize>,
) -> anyhow::Result<()> {
    let mut config = load_config(Some(workspace), None)
        .map_err(|e| anyhow!("Configuration error: {e}"))?;
    if let Some(iterations) = iterations {
        if iterations == 0 {
            bail!("iterations must be at least 1");
        }
        config.bench.iterations = iterations;
    }

    match command {
        Commands::List => handle_list(),
        Commands::Run { id } => handle_run(&id, &config).await,
        Commands::Compare { a, b } => handle_compare(&a, &b, &config).await,
        Commands::Keygen { id, out } => handle_keygen(&id, out.as_deref()).await,
        Commands::Efficiency { id } => handle_efficiency(&id, &config).await,
        Commands::Config { action } => handle_config(action, workspace, &config),
    }
}

fn resolve(id: &str) -> anyhow::Result<AlgorithmDescriptor> {
    descriptor::find(id)
        .ok_or_else(|| anyhow!("Unknown algorithm id: {id}. Try `keybench list`."))
}

fn handle_list() -> anyhow::Result<()> {
    println!("{:<10} {:<10} {:<8} {:>14}", "ID", "LABEL", "FAMILY", "SECURITY BITS");
    for descriptor in CATALOG {
        println!(
            "{:<10} {:<10} {:<8} {:>14}",
            descriptor.id,
            descriptor.label,
            descriptor.algorithm.family_name(),
            descriptor.security_bits
        );
    }
    Ok(())
}

async fn handle_run(id: &str, config: &KeybenchConfig) -> anyhow::Result<()> {
    let descriptor = resolve(id)?;
    let provider = Arc::new(OpensslProvider::new()?);
    let harness = BenchmarkHarness::new(provider)
        .with_iterations(config.bench.iterations)
        .with_message(config.bench.message.as_bytes());

    let chart = render::LiveChart::single(descriptor);
    let sink = |averages: RunningAverages| chart.update_a(averages);
    let outcome = harness.run_single(descriptor, &sink).await;
    chart.finish();

    let result = outcome?;
    render::print_single_summary(&result);
    Ok(())
}

async fn handle_compare(a: &str, b: &str, config: &KeybenchConfig) -> anyhow::Result<()> {
    let descriptor_a = resolve(a)?;
    let descriptor_b = resolve(b)?;
    let provider = Arc::new(OpensslProvider::new()?);
    let harness = BenchmarkHarness::new(provider)
        .with_iterations(config.bench.iterations)
        .with_message(config.bench.message.as_bytes());

    let chart = render::LiveChart::compare(descriptor_a, descriptor_b);
    let sink_a = |averages: RunningAverages| chart.update_a(averages);
    let sink_b = |averages: RunningAverages| chart.update_b(averages);
    let outcome = harness
        .run_compare(descriptor_a, descriptor_b, &sink_a, &sink_b)
        .await;
    chart.finish();

    let (result_a, result_b) = outcome?;
    render::print_compare_summary(&result_a, &result_b);
    Ok(())
}

async fn handle_keygen(id: &str, out: Option<&Path>) -> anyhow::Result<()> {
    let descriptor = resolve(id)?;
    let provider = OpensslProvider::new()?;
    let keypair = provider.generate_keypair(&descriptor).await?;
    let pem = export_pem(&keypair)?;

    match out {
        Some(dir) => {
            let (public_path, private_path) = pem.write_to_dir(dir, descriptor.id)?;
            println!("Wrote {}", public_path.display());
            println!("Wrote {}", private_path.display());
        }
        None => {
            println!("{}", pem.public_pem.trim_end());
            println!("{}", pem.private_pem.trim_end());
        }
    }
    println!();
    println!(
        "Keys are generated in memory. Real systems need secure storage, rotation, and review."
    );
    Ok(())
}

async fn handle_efficiency(id: &str, config: &KeybenchConfig) -> anyhow::Result<()> {
    let descriptor = resolve(id)?;
    let provider = OpensslProvider::new()?;
    let report =
        efficiency::measure(&provider, descriptor, config.efficiency.message.as_bytes()).await?;
    render::print_efficiency_summary(&report);
    Ok(())
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config: &KeybenchConfig,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_dir = workspace.join(".keybench");
            std::fs::create_dir_all(&config_dir)?;
            let config_path = config_dir.join("config.toml");
            if config_path.exists() {
                bail!("Configuration file already exists: {}", config_path.display());
            }
            let rendered = keybench_core::config::to_toml_string(&KeybenchConfig::default())?;
            std::fs::write(&config_path, rendered)?;
            println!("Wrote {}", config_path.display());
        }
        ConfigAction::Show => {
            println!("{}", keybench_core::config::to_toml_string(config)?);
        }
    }
    Ok(())
}
