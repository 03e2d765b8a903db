use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use worldstore_objects::{Identified, ObjectId, ObjectKind};
use worldstore_persist::{ObjectStore, backing_path};

#[derive(Parser)]
#[command(name = "worldstore", about = "CLI tool for worldstore databases")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Create the seed world if the database does not exist yet
    Init {
        /// Database base name; `.yaml` is appended
        base: PathBuf,
    },
    /// Load the database and report what it holds
    Validate { base: PathBuf },
    /// List stored objects, one per line
    List {
        base: PathBuf,
        /// Only show objects of this kind
        #[arg(short, long)]
        kind: Option<ObjectKind>,
    },
    /// Print a single object
    Show {
        base: PathBuf,
        id: u64,
        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
    /// Delete an object and save the database
    Remove { base: PathBuf, id: u64 },
    /// Print the id the next new object would receive
    NextId { base: PathBuf },
    /// Rewrite the database in id order via a temp file and rename
    Compact { base: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    run(cli.command, &mut std::io::stdout().lock())
}

fn run(command: Commands, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Commands::Info => {
            writeln!(out, "worldstore v{}", env!("CARGO_PKG_VERSION"))?;
            writeln!(out, "objects: {}", worldstore_objects::crate_info())?;
            writeln!(out, "persist: {}", worldstore_persist::crate_info())?;
            let kinds: Vec<_> = ObjectKind::ALL.iter().map(|k| k.tag()).collect();
            writeln!(out, "permitted kinds: {}", kinds.join(", "))?;
        }
        Commands::Init { base } => {
            let existed = backing_path(&base).exists();
            let store = open(&base)?;
            if existed {
                writeln!(out, "{} already exists ({} objects)", store.path().display(), store.len())?;
            } else {
                writeln!(out, "Created {} with {} seed objects", store.path().display(), store.len())?;
            }
        }
        Commands::Validate { base } => {
            let store = open(&base)?;
            let stats = store.stats();
            writeln!(out, "{}: OK", store.path().display())?;
            writeln!(out, "objects: {}", stats.total)?;
            for (kind, count) in &stats.by_kind {
                writeln!(out, "  {kind}: {count}")?;
            }
            match stats.high_water_id {
                Some(id) => writeln!(out, "highest id: {}", id.0)?,
                None => writeln!(out, "highest id: none")?,
            }
        }
        Commands::List { base, kind } => {
            let store = open(&base)?;
            for obj in store.each().filter(|o| kind.is_none_or(|k| o.kind() == k)) {
                writeln!(out, "{:>6}  {:<8} {}", obj.id().0, obj.kind(), obj.name())?;
            }
        }
        Commands::Show { base, id, json } => {
            let store = open(&base)?;
            let obj = store
                .get(ObjectId(id))
                .with_context(|| format!("no object with id {id}"))?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(obj)?)?;
            } else {
                write!(out, "{}", serde_yaml::to_string(obj)?)?;
            }
        }
        Commands::Remove { base, id } => {
            let mut store = open(&base)?;
            match store.delete(ObjectId(id)) {
                Some(obj) => {
                    store.save()?;
                    writeln!(out, "Removed {} {} ({})", obj.kind(), ObjectId(id), obj.name())?;
                }
                None => writeln!(out, "No object {}; nothing to remove", ObjectId(id))?,
            }
        }
        Commands::NextId { base } => {
            let mut store = open(&base)?;
            writeln!(out, "{}", store.allocate_id()?.0)?;
        }
        Commands::Compact { base } => {
            let store = open(&base)?;
            store.save_atomic()?;
            writeln!(out, "Rewrote {} ({} objects)", store.path().display(), store.len())?;
        }
    }

    Ok(())
}

fn open(base: &Path) -> anyhow::Result<ObjectStore> {
    tracing::debug!(base = %base.display(), "opening database");
    ObjectStore::open(base).with_context(|| format!("opening database {}", base.display()))
}
