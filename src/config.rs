use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "salesboard",
    version,
    about = "Weekly retail sales dashboard",
    long_about = "Upload a CSV of weekly store sales and explore it in the browser:\n\
                  totals, top stores, sales by type and holiday, weekly trend and\n\
                  per-store / per-month charts, filtered by store, year and week.\n\
                  \n\
                  Examples:\n\
                    salesboard                               # Serve on 127.0.0.1:8501\n\
                    salesboard serve --data sales.csv        # Preload a file\n\
                    salesboard summary sales.csv --year 2011 # Print tables to the terminal"
)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeArgs,
}

impl Cli {
    /// Resolve the bare invocation to `serve` with top-level flags.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

pub const DEFAULT_ECHARTS_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the dashboard over HTTP (default)
    Serve(ServeArgs),
    /// Print the dashboard tables for a CSV file
    Summary(SummaryArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "SALESBOARD_BIND", default_value = "127.0.0.1:8501")]
    pub bind: SocketAddr,

    /// Chart grid used in dashboard mode
    #[arg(long, env = "SALESBOARD_LAYOUT", value_enum, default_value_t = Layout::TwoColumn)]
    pub layout: Layout,

    /// Maximum number of raw rows rendered in the data table
    #[arg(long, env = "SALESBOARD_MAX_TABLE_ROWS", default_value_t = 1000)]
    pub max_table_rows: usize,

    /// Maximum accepted upload size in megabytes
    #[arg(long, env = "SALESBOARD_MAX_UPLOAD_MB", default_value_t = 200)]
    pub max_upload_mb: usize,

    /// Script URL for the ECharts library
    #[arg(long, env = "SALESBOARD_ECHARTS_URL", default_value = DEFAULT_ECHARTS_URL)]
    pub echarts_url: String,

    /// CSV file to load at startup
    #[arg(long, env = "SALESBOARD_DATA")]
    pub data: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    /// CSV file to summarize
    pub path: PathBuf,

    /// Store number or ALL
    #[arg(long, default_value = "ALL")]
    pub store: String,

    /// Year or ALL
    #[arg(long, default_value = "ALL")]
    pub year: String,

    /// Week number or ALL
    #[arg(long, default_value = "ALL")]
    pub week: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Donuts side by side, remaining charts full width
    #[default]
    TwoColumn,
    /// Donuts and trend in one row, bar charts in a second row
    ThreeColumn,
}

/// Settings the page renderer needs.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub layout: Layout,
    pub max_table_rows: usize,
    pub echarts_url: String,
}

impl From<&ServeArgs> for DashboardConfig {
    fn from(args: &ServeArgs) -> Self {
        DashboardConfig {
            layout: args.layout,
            max_table_rows: args.max_table_rows,
            echarts_url: args.echarts_url.clone(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            layout: Layout::TwoColumn,
            max_table_rows: 1000,
            echarts_url: DEFAULT_ECHARTS_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["salesboard", "--layout", "three-column"]).unwrap();
        match cli.into_command() {
            Command::Serve(args) => {
                assert_eq!(args.layout, Layout::ThreeColumn);
                assert_eq!(args.max_upload_mb, 200);
                assert!(args.data.is_none());
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "salesboard",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--layout",
            "three-column",
            "--max-table-rows",
            "50",
        ])
        .unwrap();
        match cli.into_command() {
            Command::Serve(args) => {
                assert_eq!(args.bind.port(), 9000);
                assert_eq!(args.layout, Layout::ThreeColumn);
                assert_eq!(args.max_table_rows, 50);
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn parses_summary_filters() {
        let cli = Cli::try_parse_from(["salesboard", "summary", "sales.csv", "--store", "4"]).unwrap();
        match cli.into_command() {
            Command::Summary(args) => {
                assert_eq!(args.path, PathBuf::from("sales.csv"));
                assert_eq!(args.store, "4");
                assert_eq!(args.year, "ALL");
            }
            other => panic!("expected summary, got {other:?}"),
        }
    }
}
