use anyhow::{Context, Result};
use clap::Parser;
use hookprof::{cli::Cli, config::ProfilerConfig, console};
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber that renders report lines
///
/// Reports are logged at WARN, so the default filter keeps them visible;
/// `--debug` adds lifecycle detail.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = match &args.config {
        Some(path) => ProfilerConfig::from_toml(path)?,
        None => ProfilerConfig::default(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start runtime")?;

    let result = runtime.block_on(console::run(config, args.format, args.seed));
    // A pending stdin read would otherwise hold up shutdown after `quit`
    runtime.shutdown_background();
    result
}
