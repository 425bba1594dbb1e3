use aidbox_provider::aidbox::ApiClient;
use aidbox_provider::config::{Config, Settings};
use aidbox_provider::provider::{lifecycle, provider_schema, Outcome, ResourceFile};
use aidbox_provider::VERSION;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Declarative resource management for Aidbox and multibox
#[derive(Parser, Debug)]
#[command(name = "aidbox-provider", version = VERSION, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Aidbox URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Client id to authenticate with
    #[arg(long, global = true)]
    client_id: Option<String>,

    /// Client secret to authenticate with
    #[arg(long, global = true)]
    client_secret: Option<String>,

    /// Talk to a multibox server (credentials must be the superuser's)
    #[arg(long, global = true)]
    multibox: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Output format
    #[arg(long, value_enum, default_value = "json", global = true)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the provider schema, or the schema of one resource or data source
    Schema {
        #[arg(long = "type")]
        type_name: Option<String>,
    },
    /// Validate the configuration in a resource file
    Validate { file: PathBuf },
    /// Show the changes applying a resource file would make
    Plan { file: PathBuf },
    /// Apply a resource file and record the resulting state in it
    Apply { file: PathBuf },
    /// Read resources back from the server and record their state
    Refresh {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete the resource recorded in a resource file
    Destroy { file: PathBuf },
    /// Import an existing resource
    Import {
        #[arg(value_name = "TYPE")]
        type_name: String,
        id: String,
        #[arg(long, default_value = "")]
        box_id: String,
        /// Write a resource file holding the imported state
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Read a data source
    Data {
        #[arg(value_name = "TYPE")]
        type_name: String,
        id: String,
        #[arg(long, default_value = "")]
        box_id: String,
    },
    /// Fetch any supported resource by path, e.g. AccessPolicy/allow-all
    Get {
        path: String,
        #[arg(long, default_value = "")]
        box_id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

/// Log to a file under the config directory
///
/// A valid `RUST_LOG` filter takes precedence over `--log-level`, so
/// per-module filters such as `aidbox_provider::aidbox=trace` work. Without
/// it, `--log-level off` disables logging and no file is created.
fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = match (EnvFilter::try_from_default_env(), level.to_tracing_level()) {
        (Ok(filter), _) => filter,
        (Err(_), Some(tracing_level)) => EnvFilter::new(tracing_level.as_str()),
        (Err(_), None) => return Ok(None),
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.with_max_level(Level::TRACE))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("aidbox-provider {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("aidbox-provider").join("aidbox-provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".aidbox-provider").join("aidbox-provider.log");
    }
    PathBuf::from("aidbox-provider.log")
}

fn print<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

/// Print an outcome; diagnostics go to stderr
fn report(outcome: &Outcome, format: OutputFormat) -> Result<()> {
    for diagnostic in &outcome.diagnostics {
        eprintln!("{}", diagnostic);
    }
    print(outcome, format)?;
    if outcome.has_errors() {
        bail!("Operation failed");
    }
    Ok(())
}

fn connect(args: &Args) -> Result<ApiClient> {
    let cli = Config {
        url: args.url.clone(),
        client_id: args.client_id.clone(),
        client_secret: args.client_secret.clone(),
        is_multibox: args.multibox.then_some(true),
    };
    Settings::load(cli, args.config.as_deref())?.client()
}

async fn refresh_file(client: &ApiClient, path: &Path) -> Result<Outcome> {
    let mut file = ResourceFile::load(path)?;
    let Some(prior) = file.state.clone() else {
        bail!("{} has no recorded state", path.display());
    };
    let outcome = lifecycle::refresh(client, &file.type_name, &prior).await?;
    if !outcome.has_errors() {
        if outcome.state.is_none() {
            tracing::warn!("{} no longer exists on the server", path.display());
        }
        file.record(outcome.state.clone());
        file.save(path)?;
    }
    Ok(outcome)
}

async fn run(args: Args) -> Result<()> {
    let format = args.format;
    match &args.command {
        Command::Schema { type_name } => {
            let schema = provider_schema();
            match type_name {
                None => print(&schema, format),
                Some(name) => {
                    let found = schema
                        .resources
                        .get(name)
                        .or_else(|| schema.data_sources.get(name))
                        .with_context(|| format!("Unknown resource or data source type {}", name))?;
                    print(found, format)
                }
            }
        }
        Command::Validate { file } => {
            let file = ResourceFile::load(file)?;
            let diagnostics = lifecycle::validate(&file.type_name, &file.config)?;
            let outcome = Outcome {
                action: None,
                changes: Vec::new(),
                state: None,
                diagnostics,
            };
            report(&outcome, format)
        }
        Command::Plan { file } => {
            let file = ResourceFile::load(file)?;
            let outcome = lifecycle::plan(&file.type_name, file.state.as_ref(), &file.config)?;
            report(&outcome, format)
        }
        Command::Apply { file: path } => {
            let client = connect(&args)?;
            let mut file = ResourceFile::load(path)?;
            let outcome = lifecycle::apply(&client, &file.type_name, file.state.as_ref(), &file.config).await?;
            file.record(outcome.state.clone());
            file.save(path)?;
            report(&outcome, format)
        }
        Command::Refresh { files } => {
            let client = connect(&args)?;
            let results = join_all(files.iter().map(|path| refresh_file(&client, path))).await;

            let mut outcomes = Map::new();
            let mut failed = false;
            for (path, result) in files.iter().zip(results) {
                let value = match result {
                    Ok(outcome) => {
                        for diagnostic in &outcome.diagnostics {
                            eprintln!("{}: {}", path.display(), diagnostic);
                        }
                        failed |= outcome.has_errors();
                        serde_json::to_value(&outcome)?
                    }
                    Err(e) => {
                        eprintln!("{}: Error: {:#}", path.display(), e);
                        failed = true;
                        Value::Null
                    }
                };
                outcomes.insert(path.display().to_string(), value);
            }
            print(&outcomes, format)?;
            if failed {
                bail!("Refresh failed");
            }
            Ok(())
        }
        Command::Destroy { file: path } => {
            let client = connect(&args)?;
            let mut file = ResourceFile::load(path)?;
            let Some(prior) = file.state.clone() else {
                tracing::info!("{} has no recorded state, nothing to destroy", path.display());
                return Ok(());
            };
            let outcome = lifecycle::destroy(&client, &file.type_name, &prior).await?;
            file.record(outcome.state.clone());
            file.save(path)?;
            report(&outcome, format)
        }
        Command::Import {
            type_name,
            id,
            box_id,
            out,
        } => {
            let client = connect(&args)?;
            let outcome = lifecycle::import(&client, type_name, id, box_id).await?;
            if let (Some(path), Some(state)) = (out, &outcome.state) {
                let file = ResourceFile {
                    type_name: type_name.clone(),
                    config: Map::new(),
                    state: Some(state.clone()),
                };
                file.save(path)?;
            }
            report(&outcome, format)
        }
        Command::Data { type_name, id, box_id } => {
            let client = connect(&args)?;
            let mut config = Map::new();
            config.insert("id".to_string(), Value::String(id.clone()));
            if !box_id.is_empty() {
                config.insert("box_id".to_string(), Value::String(box_id.clone()));
            }
            let outcome = lifecycle::read_data_source(&client, type_name, &config).await?;
            report(&outcome, format)
        }
        Command::Get { path, box_id } => {
            let client = connect(&args)?;
            let resource = client.get_any(path, box_id).await?;
            print(&resource.to_json()?, format)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let result = run(args).await;
    if let Err(err) = &result {
        tracing::error!("{:#}", err);
    }
    result
}
