use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use sigtap_loader::detect::{encoding_for_label, parse_delimiter, EncodingStrategy};
use sigtap_loader::ingestion::ReadOptions;
use sigtap_loader::loader::{
    CompositeObserver, FileObserver, LoadObserver, LoadOptions, Loader, RunSummary,
    TracingObserver, DEFAULT_BATCH_SIZE,
};
use sigtap_loader::naming::Competency;
use sigtap_loader::storage::{ensure_database, DatabaseConfig, MemorySink, MySqlSink};

const EXIT_INPUT_NOT_FOUND: u8 = 2;
const EXIT_DATABASE: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Load SIGTAP folders and files (TXT/CSV/DBF/ZIP) into MySQL"
)]
struct Args {
    /// Root folder of competency directories, or a single TXT/CSV/ZIP/DBF file.
    #[arg(short, long)]
    input: PathBuf,

    #[arg(long, env = "MYSQL_HOST", default_value = "localhost")]
    host: String,
    #[arg(long, env = "MYSQL_PORT", default_value_t = 3306)]
    port: u16,
    #[arg(long, env = "MYSQL_USER", default_value = "root")]
    user: String,
    #[arg(long, env = "MYSQL_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,
    #[arg(long, env = "MYSQL_DATABASE", default_value = "SIgtap")]
    database: String,

    /// Field delimiter for TXT/CSV files (`|`, `;`, `,`, `\t` or `tab`); detected when omitted.
    #[arg(long)]
    delimiter: Option<String>,
    /// Text encoding label (e.g. `latin1`, `utf-8`); detected when omitted.
    #[arg(long)]
    encoding: Option<String>,
    /// Detect encodings by trying UTF-8 then Latin-1 instead of statistically.
    #[arg(long)]
    simple_encoding_detection: bool,
    /// Competency (AAAAMM) applied to every file instead of detecting it from paths.
    #[arg(long)]
    competencia: Option<String>,

    /// Drop and recreate each table before its first write.
    #[arg(long)]
    recreate: bool,
    /// Rows per insert batch.
    #[arg(long, visible_alias = "batch-size", default_value_t = DEFAULT_BATCH_SIZE)]
    chunksize: usize,
    /// Resolve files and print plans without touching the database.
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    json: bool,
    /// Append per-file events to this log file.
    #[arg(long)]
    event_log: Option<PathBuf>,
    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn load_options(&self) -> Result<LoadOptions> {
        let delimiter = self
            .delimiter
            .as_deref()
            .map(|d| parse_delimiter(d).ok_or_else(|| anyhow!("invalid delimiter {d:?}")))
            .transpose()?;
        let encoding = self
            .encoding
            .as_deref()
            .map(|e| encoding_for_label(e).ok_or_else(|| anyhow!("unknown encoding {e:?}")))
            .transpose()?;
        let competency_override = self
            .competencia
            .as_deref()
            .map(|c| Competency::parse(c).ok_or_else(|| anyhow!("invalid competencia {c:?}, expected AAAAMM")))
            .transpose()?;

        let mut observers: Vec<Arc<dyn LoadObserver>> = vec![Arc::new(TracingObserver)];
        if let Some(path) = &self.event_log {
            observers.push(Arc::new(FileObserver::new(path)));
        }

        Ok(LoadOptions {
            read: ReadOptions {
                delimiter,
                encoding,
                encoding_strategy: if self.simple_encoding_detection {
                    EncodingStrategy::Fallback
                } else {
                    EncodingStrategy::Statistical
                },
            },
            recreate: self.recreate,
            batch_size: self.chunksize,
            dry_run: self.dry_run,
            competency_override,
            observer: Some(Arc::new(CompositeObserver::new(observers))),
            ..Default::default()
        })
    }

    fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(env).with_writer(std::io::stderr).init();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let input = args
        .input
        .canonicalize()
        .unwrap_or_else(|_| args.input.clone());
    if !input.exists() {
        error!(path = %input.display(), "input path not found");
        return Ok(ExitCode::from(EXIT_INPUT_NOT_FOUND));
    }
    let options = args.load_options()?;

    let summary = if args.dry_run {
        Loader::new(MemorySink::new(), options).run(&input)?
    } else {
        let config = args.database_config();
        let sink = match ensure_database(&config).and_then(|()| MySqlSink::connect(&config)) {
            Ok(sink) => sink,
            Err(e) => {
                error!(database = %config.database, host = %config.host, error = %e, "database bootstrap failed");
                return Ok(ExitCode::from(EXIT_DATABASE));
            }
        };
        Loader::new(sink, options).run(&input)?
    };

    report(&summary, args.json)?;
    Ok(ExitCode::SUCCESS)
}

fn report(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(summary).context("serializing run summary")?;
        println!("{out}");
        return Ok(());
    }
    for (table, rows) in &summary.tables {
        info!(table = %table, rows, "table loaded");
    }
    info!(
        files_loaded = summary.files_loaded,
        files_failed = summary.files_failed,
        files_skipped = summary.files_skipped,
        total_rows = summary.total_rows,
        "done"
    );
    Ok(())
}
