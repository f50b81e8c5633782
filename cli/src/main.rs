use std::io::{self, StdinLock, StdoutLock, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use stockroom_service::{
    Adjustment, InventoryService, OutputMode, PromptPolicy, Prompter, SearchBy, ServiceError,
};
use stockroom_sqlite::{
    DatabaseConfig, Migration, SqliteItemRepository, latest_version, set_busy_timeout,
};
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::{Config, Overrides};

type CliService =
    InventoryService<SqliteItemRepository, StdinLock<'static>, Box<dyn Write>, StdoutLock<'static>>;

#[derive(Debug, Parser)]
#[command(name = "stockroom")]
#[command(about = "Track inventory items by stock-keeping unit")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Database file path (default: stockroom.db).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Print items as JSON, one object per line.
    #[arg(long, global = true)]
    json: bool,
    /// Extra attempts allowed after a blank answer to a required prompt.
    #[arg(long, global = true)]
    retries: Option<u32>,
    /// Time budget in seconds for each storage call.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Log level written to stderr (off, error, warn, info, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            db: self.db.clone(),
            timeout_secs: self.timeout_secs,
            retries: self.retries,
            log_level: self.log_level.clone(),
            config: self.config.clone(),
        }
    }

    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store a new item.
    Store,
    /// Search items by SKU, or by name, category, or brand.
    Search(SearchArgs),
    /// Edit every field of an item.
    Update,
    /// Delete an item by SKU.
    Delete,
    /// Increase an item's stock count.
    Add,
    /// Decrease an item's stock count.
    Subtract,
    /// Database schema operations.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args)]
#[group(multiple = false)]
struct SearchArgs {
    /// Search by item name.
    #[arg(short, long)]
    name: bool,
    /// Search by category.
    #[arg(short, long)]
    category: bool,
    /// Search by brand.
    #[arg(short, long)]
    brand: bool,
}

impl SearchArgs {
    fn search_by(&self) -> SearchBy {
        if self.name {
            SearchBy::Name
        } else if self.category {
            SearchBy::Category
        } else if self.brand {
            SearchBy::Brand
        } else {
            SearchBy::Sku
        }
    }
}

#[derive(Debug, Args)]
struct MigrateArgs {
    #[command(subcommand)]
    operation: MigrateOperation,
}

#[derive(Debug, Subcommand)]
enum MigrateOperation {
    /// Apply pending schema migrations.
    Up,
    /// Drop the inventory tables.
    Down,
    /// Show applied and pending migrations.
    Status,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        eprintln!("error: failed to load .env file: {err}");
        std::process::exit(1);
    }

    let config = match Config::from_env(&cli.global.overrides()) {
        Ok(config) => config,
        Err(errors) => {
            eprintln!(
                "error: invalid configuration: {}",
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            std::process::exit(1);
        }
    };
    init_logging(config.log_level);
    debug!(?config, "configuration resolved");

    let mode = cli.global.output_mode();
    let result = match cli.command {
        Command::Store => run_service(&config, mode, |s| s.create().map(drop)),
        Command::Search(args) => {
            run_service(&config, mode, |s| s.search(args.search_by()).map(drop))
        }
        Command::Update => run_service(&config, mode, |s| s.update().map(drop)),
        Command::Delete => run_service(&config, mode, |s| s.delete().map(drop)),
        Command::Add => run_service(&config, mode, |s| s.adjust(Adjustment::Add).map(drop)),
        Command::Subtract => {
            run_service(&config, mode, |s| s.adjust(Adjustment::Subtract).map(drop))
        }
        Command::Migrate(args) => run_migrate(&config, args),
    };

    if let Err(err) = result {
        debug!(error = %err, "command failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(level: LevelFilter) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(level),
        )
        .init();
}

fn run_service(
    config: &Config,
    mode: OutputMode,
    operation: impl FnOnce(&mut CliService) -> Result<(), ServiceError>,
) -> Result<(), String> {
    let db = DatabaseConfig::new(config.db_path.clone()).with_timeout(config.timeout);
    let repository = SqliteItemRepository::open(&db)
        .map_err(|e| format!("Failed to open database '{}': {e}", config.db_path.display()))?;

    // JSON keeps stdout parseable; prompts move to stderr.
    let prompts: Box<dyn Write> = match mode {
        OutputMode::Text => Box::new(io::stdout().lock()),
        OutputMode::Json => Box::new(io::stderr().lock()),
    };
    let prompter =
        Prompter::with_policy(io::stdin().lock(), prompts, PromptPolicy::new(config.retries));
    let mut service =
        InventoryService::new(repository, prompter, io::stdout().lock()).with_output_mode(mode);
    operation(&mut service).map_err(|e| e.to_string())
}

fn run_migrate(config: &Config, args: MigrateArgs) -> Result<(), String> {
    match args.operation {
        MigrateOperation::Up => run_migrate_up(config),
        MigrateOperation::Down => run_migrate_down(config),
        MigrateOperation::Status => run_migrate_status(config),
    }
}

fn run_migrate_up(config: &Config) -> Result<(), String> {
    let mut migration = open_migration(config)?;
    let applied = migration
        .up()
        .map_err(|e| format!("Migration up failed: {e}"))?;
    println!(
        "Migration up complete. Applied {} migration(s) to '{}'.",
        applied.len(),
        config.db_path.display()
    );
    Ok(())
}

fn run_migrate_down(config: &Config) -> Result<(), String> {
    let mut migration = open_migration(config)?;
    migration
        .down()
        .map_err(|e| format!("Migration down failed: {e}"))?;
    println!(
        "Migration down complete. Tables dropped from '{}'.",
        config.db_path.display()
    );
    Ok(())
}

fn run_migrate_status(config: &Config) -> Result<(), String> {
    let migration = open_migration(config)?;
    let status = migration
        .status()
        .map_err(|e| format!("Failed to get migration status: {e}"))?;
    println!("Migration Status:");
    println!(
        "  Schema version: {} (latest {})",
        status.current_version(),
        latest_version()
    );
    println!("  Pending migrations: {}", status.pending);
    match status.item_count {
        Some(count) => println!("  Item count: {count}"),
        None => println!("  Item table: missing"),
    }
    for applied in &status.applied {
        println!(
            "  Applied {} {} at {}",
            applied.version,
            applied.name,
            applied.applied_at.to_rfc3339()
        );
    }
    Ok(())
}

fn open_migration(config: &Config) -> Result<Migration, String> {
    let conn = open_connection(&config.db_path)?;
    set_busy_timeout(&conn, config.timeout)
        .map_err(|e| format!("Failed to configure database: {e}"))?;
    Migration::new(conn).map_err(|e| format!("Failed to initialize migration: {e}"))
}

fn open_connection(path: &Path) -> Result<rusqlite::Connection, String> {
    rusqlite::Connection::open(path)
        .map_err(|e| format!("Failed to open database '{}': {e}", path.display()))
}
