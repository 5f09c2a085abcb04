/// chartdex - rhythm game chart library indexer
use chartdex_cli::{pack_folder, AppConfig};
use chartdex_core::{ChartCatalog, ChartRecord, ScanProgress};
use chartdex_metadata::DefaultChartParser;
use chartdex_scanner::{ChartScanner, ScanOptions};
use chartdex_storage::SqliteCatalog;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chartdex")]
#[command(about = "Index rhythm game chart libraries", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Catalog database URL (overrides the configuration)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan library paths and sync the catalog
    Scan {
        /// Library roots; defaults to `library_paths` from the configuration
        paths: Vec<PathBuf>,
    },
    /// Re-ingest one chart folder or .sng file
    Rescan {
        path: PathBuf,
    },
    /// Print a catalogued chart as JSON
    Show {
        /// Chart ID or path
        chart: String,
    },
    /// Package a chart folder into a .sng container
    Pack {
        dir: PathBuf,
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chartdex=info,chartdex_scanner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    config.validate()?;

    match cli.command {
        Commands::Scan { paths } => scan(&config, paths).await,
        Commands::Rescan { path } => rescan(&config, path).await,
        Commands::Show { chart } => show(&config, &chart).await,
        Commands::Pack { dir, output } => {
            let bytes = pack_folder(&dir, &output)?;
            println!("Wrote {} ({} bytes)", output.display(), bytes);
            Ok(())
        }
    }
}

async fn open_catalog(config: &AppConfig) -> anyhow::Result<Arc<SqliteCatalog>> {
    let catalog = chartdex_storage::open_catalog(&config.database_url).await?;
    tracing::info!("Catalog opened at {}", config.database_url);
    Ok(Arc::new(catalog))
}

fn scanner(config: &AppConfig, catalog: Arc<SqliteCatalog>) -> ChartScanner {
    ChartScanner::with_options(
        catalog,
        Arc::new(DefaultChartParser::new()),
        ScanOptions {
            max_depth: config.max_depth,
            ..ScanOptions::default()
        },
    )
}

async fn scan(config: &AppConfig, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let paths = if paths.is_empty() {
        config.library_paths.clone()
    } else {
        paths
    };
    if paths.is_empty() {
        anyhow::bail!("No library paths given (pass paths or set library_paths)");
    }

    let catalog = open_catalog(config).await?;
    let scanner = Arc::new(scanner(config, catalog));

    let (tx, mut rx) = mpsc::channel::<ScanProgress>(32);
    let printer = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            if progress.total > 0 {
                eprintln!(
                    "[{:>5.1}%] {}: {}",
                    progress.percentage(),
                    progress.phase.as_str(),
                    progress.message
                );
            } else {
                eprintln!("{}: {}", progress.phase.as_str(), progress.message);
            }
        }
    });

    let cancel = {
        let scanner = scanner.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Cancelling scan...");
                scanner.cancel_scan();
            }
        })
    };

    let result = scanner.scan_library_paths(&paths, Some(tx)).await;
    cancel.abort();
    let _ = printer.await;
    let result = result?;

    println!(
        "Added {}, updated {}, removed {} in {:.1}s",
        result.added,
        result.updated,
        result.removed,
        result.duration.as_secs_f64()
    );
    for issue in &result.errors {
        println!("  error: {}: {}", issue.path, issue.message);
    }

    Ok(())
}

async fn rescan(config: &AppConfig, path: PathBuf) -> anyhow::Result<()> {
    let catalog = open_catalog(config).await?;
    let scanner = scanner(config, catalog);

    match scanner.rescan_chart(&path).await? {
        Some(record) => print_record(&record)?,
        None => anyhow::bail!("{} is not a chart folder or .sng file", path.display()),
    }

    Ok(())
}

async fn show(config: &AppConfig, chart: &str) -> anyhow::Result<()> {
    let catalog = open_catalog(config).await?;

    let record = match chart.parse::<i64>() {
        Ok(id) => catalog.get_chart(id).await?,
        Err(_) => catalog.get_chart_by_path(chart).await?,
    };

    match record {
        Some(record) => print_record(&record),
        None => anyhow::bail!("Chart not found: {}", chart),
    }
}

fn print_record(record: &ChartRecord) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}
