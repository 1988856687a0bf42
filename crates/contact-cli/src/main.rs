mod config;
mod render;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use contact_core::ContactRow;
use contact_index::ContactListAdapter;
use contact_storage::ContactStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contacts")]
#[command(about = "Deduplicated, alphabet-indexed contact lists", long_about = None)]
struct Cli {
    /// SQLite database holding contact data rows
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Config file (defaults to $CONTACTS_CONFIG_PATH or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Do not print alphabet headers
    #[arg(long, global = true, default_value_t = false)]
    no_headers: bool,
    /// Index every letter A-Z even when no contact falls under it
    #[arg(long, global = true, default_value_t = false)]
    full_alphabet: bool,
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import contact rows from a JSON array
    Import {
        file: PathBuf,
        /// Remove existing rows first
        #[arg(long, default_value_t = false)]
        replace: bool,
    },
    /// Print the deduplicated list with section headers
    List,
    /// Print each section label with its first position
    Sections,
    /// Print every stored row, duplicates included
    Dump {
        #[arg(long, default_value_t = false)]
        debug: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = config::config_path(cli.config.as_deref());
    let mut settings = config::load_config(&config_path)
        .with_context(|| format!("Failed to read config {}", config_path.display()))?;
    if cli.no_headers {
        settings.alphabet_headers = false;
    }
    if cli.full_alphabet {
        settings.full_alphabet = true;
    }
    let db_path = settings.database_path(cli.db.as_deref());

    match cli.command {
        Commands::Import { file, replace } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let rows: Vec<ContactRow> =
                serde_json::from_str(&content).context("Failed to parse contact rows")?;

            let mut store = create_store(&db_path)?;
            let inserted = if replace {
                store.replace_rows(&rows)
            } else {
                store.insert_rows(&rows)
            }
            .context("Failed to store contact rows")?;
            info!(rows = inserted, db = %db_path.display(), "imported contact rows");
            println!("Imported {inserted} rows into {}", db_path.display());
        }
        Commands::List => {
            let adapter = load_adapter(&db_path, &settings)?;
            if adapter.is_empty() {
                println!("No contacts.");
                return Ok(());
            }
            for line in render::render_list(&adapter)? {
                println!("{line}");
            }
        }
        Commands::Sections => {
            let adapter = load_adapter(&db_path, &settings)?;
            for line in render::render_sections(&adapter)? {
                println!("{line}");
            }
        }
        Commands::Dump { debug } => {
            let store = open_existing_store(&db_path)?;
            let rows = store.rows().context("Failed to load contact rows")?;
            for line in render::render_dump(&rows, debug) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already installed");
    }
}

fn create_store(path: &Path) -> Result<ContactStore> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    ContactStore::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

fn open_existing_store(path: &Path) -> Result<ContactStore> {
    if !path.exists() {
        bail!(
            "No contact database at {}; run `contacts import` first",
            path.display()
        );
    }
    ContactStore::open_existing(path)
        .with_context(|| format!("Failed to open {}", path.display()))
}

fn load_adapter(db_path: &Path, settings: &config::ContactsConfig) -> Result<ContactListAdapter> {
    let store = open_existing_store(db_path)?;
    let mut adapter = ContactListAdapter::new(None, settings.adapter_config());
    adapter
        .load_from(&store)
        .context("Failed to load contact rows")?;
    Ok(adapter)
}
