//! er-report - sanitize error context and record error reports.
//!
//! Command payloads are written to stdout as JSON; logs go to stderr.

use clap::{Args, Parser, Subcommand};
use er_redact::{ContextMap, ContextValue, RequestSnapshot, Sanitizer};
use er_report::logging::{event_names, init_logging, LogConfig, LogFormat};
use er_report::{
    load_config, ConfigOptions, ErrorReporter, ExitCode, JsonlReportStore, LogNotifier,
    ReportError, ReportStore, ResolvedConfig, Result,
};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

/// Sanitize error context and record error reports
#[derive(Parser)]
#[command(name = "er-report")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to a reporting config file
    #[arg(long, global = true, env = "ERROR_REPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Redact the access token in a URL
    RedactUrl {
        url: String,
    },

    /// Redact sensitive values in a query string
    RedactQuery {
        query: String,
    },

    /// Summarize a request snapshot (JSON) into sanitized environment data
    Sanitize {
        /// Snapshot file; reads stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Record an error report in a store file
    Log(LogArgs),

    /// List distinct report categories in a store file
    Categories {
        /// Store file (JSON lines)
        #[arg(long)]
        store: PathBuf,
    },
}

#[derive(Args, Debug)]
struct LogArgs {
    /// Store file (JSON lines); created if missing
    #[arg(long)]
    store: PathBuf,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    message: Option<String>,

    #[arg(long)]
    subject: Option<String>,

    /// URL the error happened on
    #[arg(long)]
    url: Option<String>,

    /// Extra context as KEY=VALUE (repeatable)
    #[arg(long = "data", value_parser = parse_key_value)]
    data: Vec<(String, String)>,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let level = LogConfig::level_from_verbosity(cli.global.verbose, cli.global.quiet);
    init_logging(&LogConfig::from_env(cli.global.log_format, level));

    let outcome = load(&cli.global).and_then(|resolved| run(&cli.command, &resolved));
    match outcome {
        Ok(()) => ExitCode::Ok.into(),
        Err(e) => output_error(&e).into(),
    }
}

fn load(global: &GlobalOpts) -> Result<ResolvedConfig> {
    let resolved = load_config(&ConfigOptions {
        config_path: global.config.clone(),
        config_dir: None,
    })?;
    tracing::debug!(
        event = event_names::CONFIG_LOADED,
        path = ?resolved.path,
        hash = resolved.hash.as_deref().unwrap_or("default"),
        "configuration loaded"
    );
    Ok(resolved)
}

fn run(command: &Commands, resolved: &ResolvedConfig) -> Result<()> {
    let sanitizer = Sanitizer::new(resolved.config.redaction_policy())?;

    match command {
        Commands::RedactUrl { url } => print_json(&sanitizer.redact_url(url)),
        Commands::RedactQuery { query } => print_json(&sanitizer.redact_query_string(query)),
        Commands::Sanitize { input } => {
            let snapshot = read_snapshot(input.as_ref())?;
            print_json(&sanitizer.extract_useful_env(&snapshot))
        }
        Commands::Log(args) => {
            let store = Arc::new(JsonlReportStore::open(&args.store)?);
            let reporter =
                ErrorReporter::from_config(&resolved.config, store, Arc::new(LogNotifier))?;
            let report = reporter.log_error(args.category.as_deref(), &log_data(args))?;
            print_json(&report)
        }
        Commands::Categories { store } => {
            let store = JsonlReportStore::open(store)?;
            print_json(&store.categories()?)
        }
    }
}

fn log_data(args: &LogArgs) -> ContextMap {
    let mut data: ContextMap = args
        .data
        .iter()
        .map(|(k, v)| (k.clone(), ContextValue::from(v.as_str())))
        .collect();
    let fields = [
        ("message", &args.message),
        ("subject", &args.subject),
        ("url", &args.url),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            data.insert(key.to_string(), ContextValue::from(value.as_str()));
        }
    }
    data
}

fn read_snapshot(input: Option<&PathBuf>) -> Result<RequestSnapshot> {
    let raw = match input {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_slice(&raw)?)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Write an error response to stderr and pick the exit code.
fn output_error(error: &ReportError) -> ExitCode {
    let code = ExitCode::for_error(error);
    let response = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "status": "error",
        "error": {
            "code": code.code_name(),
            "message": error.to_string(),
        }
    });
    eprintln!("{}", response);
    code
}
