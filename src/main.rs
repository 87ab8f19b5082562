use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cascade_hooks_sscce::{config, run};

/// Reproduction: child after-delete hooks are skipped when the parent's
/// cascading delete removes the child rows.
#[derive(Parser)]
#[command(name = "sscce")]
#[command(about = "Cascade-delete lifecycle-hook reproduction")]
struct Cli {
    /// Database DSN override (default: sqlite::memory:)
    #[arg(long)]
    dsn: Option<String>,

    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut cfg = config::load().context("failed to load configuration")?;
    if let Some(dsn) = cli.dsn {
        cfg.dsn = dsn;
    }

    let outcome = run(cfg).await.context("scenario failed to run")?;

    info!(
        expected_destroy_hook_calls = outcome.expected_destroy_hook_calls(),
        observed_destroy_hook_calls = outcome.destroy_hook_calls,
        "scenario complete"
    );

    anyhow::ensure!(
        outcome.sync_hook_calls == 1,
        "after-bulk-sync hook fired {} times, expected 1",
        outcome.sync_hook_calls
    );
    anyhow::ensure!(
        outcome.cascade_delete_held(),
        "cascade delete left {} child rows behind",
        outcome.children_after_destroy
    );
    anyhow::ensure!(
        outcome.hooks_fired_per_child(),
        "after-delete hook fired {} times for {} cascade-deleted children; \
         rows removed by ON DELETE CASCADE bypass lifecycle-hook dispatch",
        outcome.destroy_hook_calls,
        outcome.expected_destroy_hook_calls()
    );

    Ok(())
}
