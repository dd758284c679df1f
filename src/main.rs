//! mkcorpus: streaming corpus construction from MediaWiki dumps

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mkcorpus::{
    config::Config,
    corpus::CorpusBuilder,
    ingest::{DumpFormat, IngestRunner},
    store::{RecordStore, TableKind},
};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "mkcorpus")]
#[command(about = "Build a bag-of-words corpus from a MediaWiki XML dump")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Data directory
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a dump and store its records
    Ingest {
        /// Path to the dump file (.xml or .xml.bz2)
        dump: PathBuf,

        /// Quiet mode (no progress output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Build the vocabulary and corpus artifacts from stored records
    BuildCorpus {
        /// Quiet mode (no status output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Ingest a dump, then build the corpus artifacts
    Run {
        /// Path to the dump file (.xml or .xml.bz2)
        dump: PathBuf,

        /// Quiet mode (no progress output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show record store and artifact statistics
    Stats,

    /// Initialize a new mkcorpus configuration
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load or create config
    let mut config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    // Override data dir if specified
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    // Setup logging
    let log_level = match cli.verbose {
        0 => config.logging.level.as_tracing_level(),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Ingest { dump, quiet } => ingest_dump(config, dump, quiet),
        Commands::BuildCorpus { quiet } => build_corpus(config, quiet),
        Commands::Run { dump, quiet } => {
            ingest_dump(config.clone(), dump, quiet)?;
            build_corpus(config, quiet)
        }
        Commands::Stats => show_stats(config),
        Commands::Init { path } => init_config(path),
    }
}

fn ingest_dump(config: Config, dump: PathBuf, quiet: bool) -> Result<()> {
    if !dump.exists() {
        anyhow::bail!("Dump file not found: {}", dump.display());
    }

    info!(
        "Ingesting from: {} (format: {:?})",
        dump.display(),
        DumpFormat::detect(&dump)
    );

    std::fs::create_dir_all(&config.data_dir).context("Failed to create data directory")?;
    let db_path = config.db_path();

    let runner = IngestRunner::new(config.ingest.clone()).with_quiet(quiet);
    let counts = runner
        .run(&dump, &db_path)
        .with_context(|| format!("Failed to ingest {}", dump.display()))?;

    info!(
        "Ingest complete: {} pages stored in {}",
        counts.total,
        db_path.display()
    );
    Ok(())
}

fn build_corpus(config: Config, quiet: bool) -> Result<()> {
    let db_path = config.db_path();
    if !db_path.exists() {
        anyhow::bail!(
            "Record store not found: {}. Run ingest first",
            db_path.display()
        );
    }

    let builder = CorpusBuilder::new(config.corpus.clone()).with_quiet(quiet);
    let stats = builder
        .build(&db_path, &config.data_dir)
        .context("Failed to build corpus artifacts")?;

    println!("\nCorpus Artifacts");
    println!("================");
    println!("Documents:  {}", stats.num_docs);
    println!("Terms:      {}", stats.num_terms);
    println!("Entries:    {}", stats.num_nnz);
    println!(
        "Dictionary: {}",
        config.data_dir.join(&config.corpus.dictionary_json).display()
    );
    println!(
        "Listing:    {}",
        config.data_dir.join(&config.corpus.dictionary_text).display()
    );
    println!(
        "Corpus:     {}",
        config.data_dir.join(&config.corpus.corpus_file).display()
    );
    Ok(())
}

fn show_stats(config: Config) -> Result<()> {
    let db_path = config.db_path();
    if !db_path.exists() {
        anyhow::bail!("Record store not found: {}", db_path.display());
    }

    let store = RecordStore::open(&db_path).context("Failed to open record store")?;

    println!("\nRecord Store Statistics");
    println!("=======================");
    println!("Database:  {}", db_path.display());
    for table in [TableKind::Article, TableKind::Redirect, TableKind::Template] {
        println!("{:<9}  {}", table.name(), store.count(table)?);
    }

    for name in [
        &config.corpus.dictionary_json,
        &config.corpus.dictionary_text,
        &config.corpus.corpus_file,
    ] {
        let path = config.data_dir.join(name);
        if path.exists() {
            let metadata = std::fs::metadata(&path)?;
            println!("{}: {} bytes", name, metadata.len());
        }
    }

    Ok(())
}

fn init_config(path: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&path)?;
    let config_path = path.join("config.toml");
    if config_path.exists() {
        anyhow::bail!("Config already exists: {}", config_path.display());
    }

    let defaults = Config::default();
    let toml_content = format!(
        r#"# mkcorpus configuration

data_dir = ".mkcorpus"
db_name = "{}"

[ingest]
seed = {}
status_interval = {}
estimated_articles = {}

[corpus]
dictionary_json = "{}"
dictionary_text = "{}"
corpus_file = "{}"
status_interval = {}

[logging]
level = "info"
format = "text"
"#,
        defaults.db_name,
        defaults.ingest.seed,
        defaults.ingest.status_interval,
        defaults.ingest.estimated_articles,
        defaults.corpus.dictionary_json,
        defaults.corpus.dictionary_text,
        defaults.corpus.corpus_file,
        defaults.corpus.status_interval,
    );

    std::fs::write(&config_path, toml_content).context("Failed to write config file")?;

    println!("Created configuration: {}", config_path.display());
    println!("Edit data_dir, then run 'mkcorpus ingest <dump>' to get started");
    Ok(())
}
