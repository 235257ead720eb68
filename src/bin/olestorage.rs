//! Olestorage command-line tool
//!
//! Dumps, lists and extracts the contents of structured storage files.

use clap::{Parser, Subcommand};
use olestorage::ole::{NameMatching, OleStorage, OpenOptions};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt};

/// Streams tried in order when `extract` is given no stream path
const DEFAULT_STREAMS: [&str; 2] = ["Workbook", "Book"];

/// Failures reported by the tool.
#[derive(Error, Debug)]
enum CliError {
    /// The container could not be read
    #[error(transparent)]
    Storage(#[from] olestorage::Error),

    /// Writing output failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// None of the requested streams exist
    #[error("No stream named {tried} in {file}")]
    StreamNotFound { tried: String, file: String },
}

type CliResult<T> = std::result::Result<T, CliError>;

/// Structured storage inspector
#[derive(Parser, Debug)]
#[command(name = "olestorage")]
#[command(about = "Inspect OLE2 structured storage files")]
#[command(version)]
struct Args {
    /// Match entry names ignoring ASCII case
    #[arg(long, global = true)]
    case_insensitive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print header fields, table sizes and every directory entry
    Dump {
        /// Container file
        file: PathBuf,
    },

    /// Print the path of every stream
    Ls {
        /// Container file
        file: PathBuf,
    },

    /// Write one stream to a file
    Extract {
        /// Container file
        file: PathBuf,

        /// Stream path, storages separated by '/'
        stream: Option<String>,

        /// Output file (defaults to the stream name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();
    let matching = if args.case_insensitive {
        NameMatching::CaseInsensitive
    } else {
        NameMatching::Exact
    };
    let options = OpenOptions::new().with_name_matching(matching);

    let outcome = match args.command {
        Commands::Dump { file } => dump(&file, options),
        Commands::Ls { file } => list(&file, options),
        Commands::Extract {
            file,
            stream,
            output,
        } => extract(&file, stream.as_deref(), output, options),
    };

    if let Err(e) = outcome {
        tracing::error!("{}", e);
        eprintln!("olestorage: {}", e);
        std::process::exit(1);
    }
}

fn open(path: &Path, options: OpenOptions) -> CliResult<OleStorage<BufReader<File>>> {
    Ok(OleStorage::open_path_with_options(path, options)?)
}

fn dump(path: &Path, options: OpenOptions) -> CliResult<()> {
    let file = open(path, options)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    file.dump(&mut out)?;
    Ok(())
}

fn list(path: &Path, options: OpenOptions) -> CliResult<()> {
    let file = open(path, options)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for stream in file.list_streams()? {
        writeln!(out, "{}", stream.join("/"))?;
    }
    Ok(())
}

fn extract(
    path: &Path,
    stream: Option<&str>,
    output: Option<PathBuf>,
    options: OpenOptions,
) -> CliResult<()> {
    let file = open(path, options)?;
    let candidates: Vec<Vec<&str>> = match stream {
        Some(stream) => vec![stream.split('/').filter(|part| !part.is_empty()).collect()],
        None => DEFAULT_STREAMS.iter().map(|&name| vec![name]).collect(),
    };

    for candidate in &candidates {
        let Some(data) = file.read_stream(candidate)? else {
            tracing::debug!(stream = %candidate.join("/"), "stream not found");
            continue;
        };
        let name = candidate.last().copied().unwrap_or("stream");
        let output = output.unwrap_or_else(|| PathBuf::from(sanitize(name)));
        std::fs::write(&output, &data)?;
        tracing::info!(bytes = data.len(), output = %output.display(), "extracted stream");
        return Ok(());
    }

    let tried: Vec<String> = candidates.iter().map(|c| c.join("/")).collect();
    Err(CliError::StreamNotFound {
        tried: tried.join(" or "),
        file: path.display().to_string(),
    })
}

/// Control characters (as in "\u{5}SummaryInformation") are not kept in
/// file names.
fn sanitize(name: &str) -> String {
    name.chars().filter(|ch| !ch.is_control()).collect()
}
