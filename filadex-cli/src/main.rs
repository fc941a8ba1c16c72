//! filadex CLI
//!
//! Fetches manufacturer material catalogs, writes per-vendor artifacts, and
//! merges them into one versioned database document.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use futures::future;
use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};

use filadex_core::Material;
use filadex_db::{DbError, MergeOptions, Vendor, merge, write_materials_module, write_vendor_list};
use filadex_scraper::bambu::{self, BambuClient, DEFAULT_SETTINGS_VERSION};
use filadex_scraper::{CredentialSource, Credentials, CrealityClient, ScrapeError, TigerTagClient};

#[derive(Parser)]
#[command(name = "filadex")]
#[command(about = "Fetch and merge 3D-printing material catalogs", long_about = None)]
struct Cli {
    /// Directory for vendor artifacts and the merged document
    #[arg(short, long, global = true, default_value = "db")]
    out_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch Bambu Lab marketplace materials
    Bambu {
        /// Slicer version whose public settings are listed
        #[arg(long, default_value = DEFAULT_SETTINGS_VERSION)]
        version: String,
    },

    /// Fetch the Creality firmware material database
    Creality,

    /// Fetch the TigerTag catalog
    Tigertag,

    /// Merge all vendor artifacts into the combined document
    Merge {
        /// Skip the version bump and date stamp
        #[arg(long)]
        no_version: bool,

        /// Also generate a Rust module embedding the Bambu material table
        #[arg(long)]
        codegen: Option<PathBuf>,
    },

    /// Fetch every vendor, then merge
    All {
        /// Skip the version bump and date stamp
        #[arg(long)]
        no_version: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".if_supports_color(Stderr, |t| t.red()));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Commands::Bambu { version } => fetch_bambu(&cli.out_dir, version).await,
        Commands::Creality => fetch_creality(&cli.out_dir).await,
        Commands::Tigertag => fetch_tigertag(&cli.out_dir).await,
        Commands::Merge {
            no_version,
            codegen,
        } => run_merge(&cli.out_dir, !*no_version, codegen.as_deref()),
        Commands::All { no_version } => {
            fetch_bambu(&cli.out_dir, DEFAULT_SETTINGS_VERSION).await?;
            fetch_creality(&cli.out_dir).await?;
            fetch_tigertag(&cli.out_dir).await?;
            run_merge(&cli.out_dir, !*no_version, None)
        }
    }
}

async fn fetch_bambu(out_dir: &Path, version: &str) -> Result<(), CliError> {
    let client = BambuClient::new()?;
    let summaries = client.get_setting_list(version).await?;

    let bar = ProgressBar::new(summaries.len() as u64);
    bar.set_message("Fetching Bambu Lab materials");
    let client_ref = &client;
    let bar_ref = &bar;
    let results = future::join_all(summaries.iter().map(|summary| async move {
        let result = client_ref.fetch_material(summary).await;
        bar_ref.inc(1);
        result
    }))
    .await;
    bar.finish_and_clear();

    let materials = bambu::fold_materials(results);
    let path = write_vendor_list(Vendor::Bambu, out_dir, &materials)?;
    print_vendor_summary(Vendor::Bambu, materials.len(), &path);
    Ok(())
}

async fn fetch_creality(out_dir: &Path) -> Result<(), CliError> {
    let local_copy = out_dir.join("material_database.json");
    let materials = CrealityClient::new()?.fetch_materials(&local_copy).await?;
    let path = write_vendor_list(Vendor::Creality, out_dir, &materials)?;
    print_vendor_summary(Vendor::Creality, materials.len(), &path);
    Ok(())
}

async fn fetch_tigertag(out_dir: &Path) -> Result<(), CliError> {
    let creds = Credentials::load()?;
    if Credentials::token_source() == CredentialSource::Missing {
        log::debug!("No TigerTag token configured; fetching unauthenticated");
    }

    let client = TigerTagClient::new(creds)?;
    let document = client.fetch_catalog().await?;
    let count = document.len();
    let path = write_vendor_list(Vendor::TigerTag, out_dir, &document)?;
    print_vendor_summary(Vendor::TigerTag, count, &path);
    Ok(())
}

fn run_merge(out_dir: &Path, versioned: bool, codegen: Option<&Path>) -> Result<(), CliError> {
    let outcome = merge(&MergeOptions {
        out_dir: out_dir.to_path_buf(),
        versioned,
    })?;

    match outcome.version {
        Some(version) => println!(
            "{} {} vendors -> {} (version {version})",
            "merge:".if_supports_color(Stdout, |t| t.green()),
            outcome.vendor_count,
            outcome.path.display(),
        ),
        None => println!(
            "{} {} vendors -> {}",
            "merge:".if_supports_color(Stdout, |t| t.green()),
            outcome.vendor_count,
            outcome.path.display(),
        ),
    }

    if let Some(module_path) = codegen {
        let materials = read_bambu_materials(out_dir)?;
        write_materials_module(module_path, &materials)?;
        println!(
            "{} {} materials -> {}",
            "codegen:".if_supports_color(Stdout, |t| t.green()),
            materials.len(),
            module_path.display(),
        );
    }

    Ok(())
}

fn read_bambu_materials(out_dir: &Path) -> Result<Vec<Material>, CliError> {
    let path = Vendor::Bambu.artifact_path(out_dir);
    let contents = std::fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn print_vendor_summary(vendor: Vendor, count: usize, path: &Path) {
    println!(
        "{} {count} entries -> {}",
        format!("{vendor}:").if_supports_color(Stdout, |t| t.green()),
        path.display(),
    );
}
