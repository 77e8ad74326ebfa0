use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use modelgen::codegen::{self, CodeGenConfig, Language};
use modelgen::config::{self, DbConfig};
use modelgen::introspect::TableFilter;
use modelgen::output::{
    AlwaysOverwrite, ConflictResolver, InteractivePrompt, NeverOverwrite, OverwritePolicy,
};
use modelgen::schema::{is_valid_identifier, Schema};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum CliLanguage {
    /// Go structs with json tags
    #[default]
    Go,
    /// Rust structs deriving serde traits
    Rust,
}

impl From<CliLanguage> for Language {
    fn from(language: CliLanguage) -> Self {
        match language {
            CliLanguage::Go => Language::Go,
            CliLanguage::Rust => Language::Rust,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
enum CliOverwrite {
    /// Ask before replacing an existing file
    #[default]
    Prompt,
    /// Replace existing files without asking
    Always,
    /// Keep existing files
    Never,
}

#[derive(Parser, Debug)]
#[command(name = "modelgen")]
#[command(version, about = "Generate model files from a MySQL schema", long_about = None)]
struct Cli {
    /// MySQL connection string (falls back to DATABASE_URL)
    #[arg(short = 'd', long = "dsn")]
    dsn: Option<String>,

    /// Output directory
    #[arg(short = 'o', long = "out")]
    out: PathBuf,

    /// Package (Go) or module path (Rust) of the generated code
    #[arg(short = 'p', long = "package", default_value = "model")]
    package: String,

    /// Comma-separated list of tables to generate (default: all)
    #[arg(short = 't', long = "table", value_delimiter = ',')]
    tables: Option<Vec<String>>,

    /// Comma-separated list of tables to skip
    #[arg(long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// Target language for generated code
    #[arg(short = 'l', long, value_enum, default_value_t = CliLanguage::Go)]
    language: CliLanguage,

    /// What to do with files that already exist
    #[arg(long, value_enum, default_value_t = CliOverwrite::Prompt)]
    overwrite: CliOverwrite,

    /// Show what would be generated without writing files
    #[arg(long)]
    dry_run: bool,

    /// Path to .env file for connection config
    #[arg(long, default_value = "./.env")]
    env_file: PathBuf,

    /// Verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = run() {
        error!(error = ?e, "Fatal error");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("modelgen v{}", env!("CARGO_PKG_VERSION"));
    info!(
        output = ?cli.out,
        package = ?cli.package,
        language = ?cli.language,
        overwrite = ?cli.overwrite,
        dry_run = cli.dry_run,
        "Starting code generation"
    );

    // Load configuration
    let dsn = match config::resolve_dsn(cli.dsn.clone(), &cli.env_file)? {
        Some(dsn) => dsn,
        None => Cli::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "a connection string is required: pass --dsn or set DATABASE_URL",
            )
            .exit(),
    };
    let db_config = DbConfig::parse(&dsn).context("Failed to parse connection string")?;
    debug!(connection = ?db_config.redacted(), "Loaded configuration");

    if !cli.package.split("::").all(is_valid_identifier) {
        bail!("Invalid package name '{}'", cli.package);
    }

    if !cli.dry_run {
        config::prepare_output_dir(&cli.out).context("Failed to prepare output directory")?;
    }

    // Build table filter
    let filter = TableFilter {
        include: cli.tables,
        exclude: cli.exclude,
    };

    if !filter.is_empty() {
        debug!(filter = ?filter, "Table filter configured");
    }

    // Introspect database
    let schema = introspect_database(&db_config, &filter)?;

    if schema.tables.is_empty() {
        warn!("No tables found after filtering");
    }

    // Log table names at debug level
    for table in &schema.tables {
        debug!(table = ?table.name, columns = ?table.columns.len(), "Table");
    }

    let generator = Language::from(cli.language).generator(&cli.package);
    let codegen_config = CodeGenConfig::new(cli.out).with_dry_run(cli.dry_run);
    debug!(codegen_config = ?codegen_config, "Code generation config");

    let mut resolver: Box<dyn ConflictResolver> = match cli.overwrite {
        CliOverwrite::Prompt => Box::new(InteractivePrompt::stdio()),
        CliOverwrite::Always => Box::new(AlwaysOverwrite),
        CliOverwrite::Never => Box::new(NeverOverwrite),
    };
    let mut policy = OverwritePolicy::new(resolver.as_mut());

    let summary = codegen::generate(&schema, generator.as_ref(), &codegen_config, &mut policy)
        .context("Code generation failed")?;

    info!(
        written = summary.written.len(),
        skipped = summary.skipped.len(),
        planned = summary.planned.len(),
        "Done"
    );

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[cfg(feature = "mysql")]
fn introspect_database(config: &DbConfig, filter: &TableFilter) -> Result<Schema> {
    use modelgen::introspect::Introspector;
    use modelgen::MySqlIntrospector;

    let mut conn = MySqlIntrospector::connect(config).with_context(|| {
        format!("Failed to connect to MySQL at {}", config.redacted())
    })?;

    info!("Connected to database");

    let mut introspector = MySqlIntrospector::new(&mut conn);
    let schema = introspector
        .introspect(&config.database, filter)
        .context("Failed to introspect schema")?;

    Ok(schema)
}

#[cfg(not(feature = "mysql"))]
fn introspect_database(_config: &DbConfig, _filter: &TableFilter) -> Result<Schema> {
    bail!("MySQL support not enabled. Rebuild with --features mysql")
}
