use anyhow::Context;
use tracesweep_app::config::SweepConfig;
use tracesweep_app::run_host_sweep;
use tracesweep_app::sweep::{system_info, SpecialFolders};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    println!("Trace Sweep\n");
    println!("Scanning for suspicious artifacts...\n");

    let folders = SpecialFolders::discover();
    let config = SweepConfig::for_host(&folders).with_env_overrides();
    tracing::debug!("Resolved configuration:\n{}", config.summary());

    let boot = system_info::query().await;
    let report_path = config.report_path.clone();

    let stats = tokio::task::spawn_blocking(move || run_host_sweep(&config, &folders, &boot))
        .await
        .context("Sweep task panicked")?
        .with_context(|| format!("Failed to write report {}", report_path.display()))?;

    tracing::info!("{}", stats.summary_line());
    println!("\nScan completed. Results saved to: {}", report_path.display());
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
