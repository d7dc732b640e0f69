use std::process::ExitCode;

use bids_fixup::{resolve_config, run, Cli};
use clap::Parser;
use fixup::CancelFlag;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_UNCLEAN: u8 = 1;
const EXIT_FATAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging. Logs go to stderr so that --json output stays parseable.
    let default_filter = if cli.verbose {
        "bids_fixup=debug,fixup=debug,bids_types=debug"
    } else {
        "bids_fixup=info,fixup=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = resolve_config(&cli)?;
    tracing::info!(
        "Dataset root {} (task '{}', dry run: {})",
        cli.root.display(),
        config.task,
        cli.dry_run
    );

    // --- Graceful Shutdown ---
    // Ctrl-C stops the run after the subject currently being copied.
    let cancel = CancelFlag::new();
    let signal_flag = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Shutdown signal received. Finishing current subject...");
            signal_flag.cancel();
        }
    });

    let json = cli.json;
    let report = tokio::task::spawn_blocking(move || run(&cli, &config, cancel)).await??;
    signal_task.abort();

    println!("{}", report.render(json)?);

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_UNCLEAN)
    })
}
