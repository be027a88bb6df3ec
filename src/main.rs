//! listing-enricher: parse search pages, dedupe ads, enrich them from their detail pages.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use listing_enricher::{
    dedupe_by_link, enrich, parse_search_files, read_csv, write_csv, BatchStatus, EnrichConfig,
    StaticSession,
};

#[derive(Parser)]
#[command(
    name = "listing-enricher",
    about = "Build a CSV of vehicle ads and enrich it from each ad's detail page",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract ads from saved search-result pages.
    Parse {
        /// HTML files to read, in order.
        #[arg(required = true)]
        html: Vec<PathBuf>,

        #[arg(short, long, default_value = "ads_data.csv")]
        output: PathBuf,
    },

    /// Keep the first row for each link.
    Dedupe {
        input: PathBuf,

        #[arg(short, long, default_value = "ads_data_unique.csv")]
        output: PathBuf,
    },

    /// Visit each row's link and add detail fields.
    Enrich {
        input: PathBuf,

        #[arg(short, long, default_value = "ads_data_with_details.csv")]
        output: PathBuf,

        /// JSON file overriding selectors, fields and waits.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> listing_enricher::Result<()> {
    match command {
        Commands::Parse { html, output } => {
            let rows = parse_search_files(&html);
            write_csv(&output, &rows)?;
        }
        Commands::Dedupe { input, output } => {
            let rows = read_csv(&input)?;
            let before = rows.len();
            let unique = dedupe_by_link(rows);
            info!(before, after = unique.len(), "removed duplicate links");
            write_csv(&output, &unique)?;
        }
        Commands::Enrich {
            input,
            output,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let rows = read_csv(&input)?;

            let mut session = StaticSession::new(&config.user_agent, config.timeout_secs);
            let outcome = enrich(&mut session, rows, &config);
            if outcome.status() == BatchStatus::NothingEnriched {
                warn!(
                    output = %output.display(),
                    "no row was enriched, writing the table unchanged"
                );
            }
            write_csv(&output, &outcome.rows)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> listing_enricher::Result<EnrichConfig> {
    let config = match path {
        Some(path) => {
            info!(config = %path.display(), "loading config");
            EnrichConfig::from_path(path)?
        }
        None => EnrichConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
