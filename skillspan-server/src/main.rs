use anyhow::Result;
use clap::Parser;
use skillspan_server::{logging, Overrides, ServerConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "skillspan-server")]
#[command(about = "Run untrusted code submissions in a scoped sandbox")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "SKILLSPAN_CONFIG")]
    config: Option<PathBuf>,

    /// Listen host
    #[arg(long, env = "SKILLSPAN_HOST")]
    host: Option<String>,

    /// Listen port
    #[arg(short, long, env = "SKILLSPAN_PORT")]
    port: Option<u16>,

    /// Per-run wall-clock limit in milliseconds
    #[arg(long = "timeout-ms", env = "SKILLSPAN_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Executions allowed to run at once
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ServerConfig::load(cli.config.as_deref())?.apply(Overrides {
        host: cli.host,
        port: cli.port,
        timeout: cli.timeout_ms.map(Duration::from_millis),
        max_concurrent_executions: cli.max_concurrent,
        log_file: cli.log_file,
        verbose: cli.verbose,
    })?;

    let _guard = logging::init_tracing(&config.logging)?;

    skillspan_server::run(config).await
}
