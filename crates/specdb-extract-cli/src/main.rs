//! specdb-extract CLI - Extract test specification/results databases to XML.

use clap::{Parser, Subcommand};
use specdb_extract::{
    write_xml, Config, Engine, ExtractError, Materializer, SchemaKind, TypedConnection,
};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "specdb-extract")]
#[command(about = "Extract a test specification or results database to XML")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Materialize the configured schema and write the XML document
    Extract {
        /// Override the configured schema: specification or results
        #[arg(long)]
        schema: Option<String>,

        /// Override the configured engine: postgres or h2
        #[arg(long)]
        engine: Option<String>,

        /// Write the XML document here instead of the configured output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print row counts for every table of the configured schema
    Count,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ExtractError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = Config::from_path(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Extract {
            schema,
            engine,
            output,
        } => {
            // Apply overrides
            if let Some(name) = schema {
                config.extract.schema = parse_schema(&name)?;
            }
            if let Some(name) = engine {
                config.extract.engine = parse_engine(&name)?;
            }
            if let Some(path) = output {
                config.extract.output = Some(path);
            }

            let schema = config.extract.schema.definition();
            let engine = config.extract.engine;

            let mut connection = TypedConnection::new(config.database);
            connection.connect().await?;

            let start = std::time::Instant::now();
            let outcome = Materializer::new(&connection, engine, schema).run().await?;
            connection.disconnect()?;

            // Every miss was already warned individually during the run.
            if !outcome.misses.is_empty() {
                warn!(
                    skipped = outcome.misses.len(),
                    "some references did not resolve"
                );
            }

            match config.extract.output {
                Some(ref path) => {
                    let mut file = std::fs::File::create(path)?;
                    write_xml(&mut file, &outcome.tree, schema.root)?;
                    file.flush()?;
                    println!("Extraction completed!");
                    println!("  Schema: {}", schema.name);
                    println!("  Nodes: {}", outcome.tree.len());
                    println!("  Skipped references: {}", outcome.misses.len());
                    println!("  Output: {}", path.display());
                    println!("  Duration: {:.2}s", start.elapsed().as_secs_f64());
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut out = stdout.lock();
                    write_xml(&mut out, &outcome.tree, schema.root)?;
                    out.flush()?;
                }
            }
        }

        Commands::Count => {
            let schema = config.extract.schema.definition();
            let engine = config.extract.engine;

            let mut connection = TypedConnection::new(config.database);
            connection.connect().await?;

            let mut total: i64 = 0;
            for spec in schema.tables {
                let table = engine.identifier(spec.table);
                let rows = connection.count(&table).await?;
                println!("  {:<55} {:>10}", spec.table, rows);
                total += rows;
            }
            println!("  {:<55} {:>10}", "total", total);

            connection.disconnect()?;
        }
    }

    Ok(())
}

fn parse_schema(name: &str) -> Result<SchemaKind, ExtractError> {
    match name.to_lowercase().as_str() {
        "specification" => Ok(SchemaKind::Specification),
        "results" => Ok(SchemaKind::Results),
        other => Err(ExtractError::Config(format!("unknown schema: {}", other))),
    }
}

fn parse_engine(name: &str) -> Result<Engine, ExtractError> {
    match name.to_lowercase().as_str() {
        "postgres" => Ok(Engine::Postgres),
        "h2" => Ok(Engine::H2),
        other => Err(ExtractError::Config(format!("unknown engine: {}", other))),
    }
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so the XML document can stream to stdout.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
