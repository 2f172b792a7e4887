// Entry point: a browser dashboard for weekly retail sales.
//
// `salesboard serve` (the default) starts the HTTP server; every selector
// change is a fresh GET that recomputes all aggregates from the loaded table.
// `salesboard summary` prints the same aggregates to the terminal.
mod aggregate;
mod charts;
mod config;
mod filter;
mod loader;
mod output;
mod render;
mod server;
mod types;
mod util;

use aggregate::Dashboard;
use anyhow::{Context, Result};
use clap::Parser;
use config::{Cli, Command, DashboardConfig, ServeArgs, SummaryArgs};
use filter::Filter;
use server::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(args: ServeArgs) -> Result<()> {
    let state = Arc::new(AppState::new(DashboardConfig::from(&args)));

    if let Some(path) = &args.data {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        state
            .load(&name, &bytes)
            .with_context(|| format!("loading {}", path.display()))?;
    }

    let router = server::create_router(state, args.max_upload_mb.saturating_mul(1024 * 1024));
    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    tracing::info!("dashboard listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("server error")
}

fn summary(args: SummaryArgs) -> Result<()> {
    let bytes = std::fs::read(&args.path).with_context(|| format!("reading {}", args.path.display()))?;
    let table = loader::load_cached(&bytes).with_context(|| format!("loading {}", args.path.display()))?;

    let filter = Filter {
        store: args.store.parse().context("invalid --store")?,
        year: args.year.parse().context("invalid --year")?,
        week: args.week.parse().context("invalid --week")?,
    };
    let view = filter.apply(&table.records);
    println!("{}", output::summary_text(&Dashboard::compute(&view)));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    match Cli::parse().into_command() {
        Command::Serve(args) => serve(args).await,
        Command::Summary(args) => summary(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::SAMPLE;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn summary_args(path: &std::path::Path, store: &str) -> SummaryArgs {
        SummaryArgs {
            path: path.to_path_buf(),
            store: store.to_string(),
            year: "ALL".to_string(),
            week: "ALL".to_string(),
        }
    }

    #[test]
    fn summary_runs_on_a_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();
        assert!(summary(summary_args(file.path(), "2")).is_ok());
    }

    #[test]
    fn summary_rejects_bad_selector() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();
        let err = summary(summary_args(file.path(), "two")).unwrap_err();
        assert!(err.to_string().contains("invalid --store"));
    }

    #[test]
    fn summary_reports_missing_file() {
        let err = summary(summary_args(std::path::Path::new("/nonexistent/sales.csv"), "ALL")).unwrap_err();
        assert!(err.to_string().contains("reading /nonexistent/sales.csv"));
    }
}
