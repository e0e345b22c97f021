//! tmirror - Parallel tree mirror
//!
//! Command-line front end for the treemirror library.

use clap::{ArgAction, Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::Level;
use treemirror::{DigestMode, Error as MirrorError, MirrorBuilder, MirrorStats};

/// tmirror - Mirror a directory tree in parallel
///
/// Copies new files, rewrites changed ones and keeps permission bits in line
/// with the source. Hidden entries are skipped; nothing is ever deleted from
/// DEST. Both directories must already exist.
#[derive(Parser, Debug)]
#[command(name = "tmirror", version, about, long_about = None)]
struct Args {
    /// Source directory
    source: PathBuf,

    /// Destination directory
    dest: PathBuf,

    /// Number of directory workers running at once
    #[arg(short = 'j', long, default_value = "16")]
    jobs: usize,

    /// How much of each file the change fingerprint covers
    #[arg(long, value_enum, default_value = "full")]
    digest: DigestArg,

    /// Read/write block size in bytes
    #[arg(long, default_value = "8192")]
    block_size: usize,

    /// Skip fsync after writing files
    ///
    /// Faster, but less durable: a write error the filesystem only reports
    /// on sync (NFS, quotas) goes unnoticed.
    #[arg(long)]
    no_sync: bool,

    /// Fail directories nested deeper than N below SOURCE
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,

    /// Quiet mode (no progress spinner, errors only)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Verbose output (-v per-file decisions, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DigestArg {
    /// Fingerprint the whole file
    Full,
    /// Fingerprint only the first few bytes
    Prefix,
}

impl From<DigestArg> for DigestMode {
    fn from(d: DigestArg) -> Self {
        match d {
            DigestArg::Full => DigestMode::Full,
            DigestArg::Prefix => DigestMode::Prefix,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputMode {
    Human,
    Json,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error("failed to serialize JSON output: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Mirror(e) if e.is_invalid_root() => 2,
            Self::Mirror(e) if e.is_no_space() => 3,
            _ => 1,
        }
    }

    fn print(&self) {
        eprintln!("ERROR: {self}");
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            eprintln!("  caused by: {err}");
            cause = err.source();
        }
        if matches!(self, Self::Mirror(e) if e.is_no_space()) {
            eprintln!("Destination device is full; free space and re-run to finish the mirror.");
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(&args);

    if let Err(error) = run(&args) {
        if args.output == OutputMode::Json {
            let value = json!({
                "status": "error",
                "error": error.to_string(),
                "path": match &error {
                    CliError::Mirror(e) => e.path().map(|p| p.display().to_string()),
                    CliError::JsonSerialize(_) => None,
                },
            });
            println!("{value}");
        }
        error.print();
        std::process::exit(error.exit_code());
    }
}

fn init_logging(args: &Args) {
    let level = if args.quiet {
        Level::ERROR
    } else {
        match args.verbose {
            0 | 1 => Level::WARN,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .finish();

    // Only fails if a subscriber is already installed
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Per-file and per-worker errors are printed even in quiet mode.
fn report_error(msg: &str) {
    eprintln!("ERROR: {msg}");
}

fn build_mirror(args: &Args) -> MirrorBuilder {
    let mut mirror = MirrorBuilder::new(&args.source, &args.dest)
        .parallel(args.jobs)
        .digest(args.digest.into())
        .block_size(args.block_size)
        .on_warning(report_error);

    if args.no_sync {
        mirror = mirror.no_fsync();
    }
    if let Some(depth) = args.max_depth {
        mirror = mirror.max_depth(depth);
    }
    if args.verbose == 1 && !args.quiet {
        mirror = mirror.verbose(|msg| eprintln!("{msg}"));
    }
    mirror
}

fn run(args: &Args) -> CliResult<()> {
    let mirror = build_mirror(args);
    tracing::debug!(options = ?mirror.options(), "effective options");

    let pb = if args.output == OutputMode::Human && !args.quiet {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner().template("{spinner:.green} {msg}");
        if let Ok(style) = style {
            pb.set_style(style);
            pb.enable_steady_tick(Duration::from_millis(100));
            pb.set_message(format!(
                "Mirroring {} -> {}...",
                args.source.display(),
                args.dest.display()
            ));
            Some(pb)
        } else {
            None
        }
    } else {
        None
    };

    let result = mirror.run();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let stats = result?;
    match args.output {
        OutputMode::Human => print_stats(&stats, args.verbose > 0),
        OutputMode::Json => {
            let value = json!({
                "status": "ok",
                "stats": serde_json::to_value(&stats)?,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}

fn print_stats(stats: &MirrorStats, verbose: bool) {
    if verbose {
        println!("Mirror completed in {:?}", stats.duration);
        println!("  Files created:      {}", stats.files_created);
        println!("  Files overwritten:  {}", stats.files_overwritten);
        println!("  Files unchanged:    {}", stats.files_unchanged);
        println!("  Files inaccessible: {}", stats.files_inaccessible);
        println!("  Dirs created:       {}", stats.dirs_created);
        println!("  Permissions synced: {}", stats.permissions_synced);
        println!("  Workers:            {}", stats.workers);
        println!("  Total size:         {}", format_bytes(stats.bytes_copied));
        return;
    }

    if stats.files_copied() == 0 && stats.dirs_created == 0 && stats.permissions_synced == 0 {
        println!(
            "Nothing to do ({} files up to date)",
            stats.files_unchanged
        );
        return;
    }

    let mut parts = vec![];
    if stats.files_created > 0 {
        parts.push(format!("{} created", stats.files_created));
    }
    if stats.files_overwritten > 0 {
        parts.push(format!("{} overwritten", stats.files_overwritten));
    }
    if stats.dirs_created > 0 {
        parts.push(format!("{} dirs", stats.dirs_created));
    }
    if stats.permissions_synced > 0 {
        parts.push(format!("{} modes synced", stats.permissions_synced));
    }
    println!(
        "Mirrored {} ({})",
        parts.join(", "),
        format_bytes(stats.bytes_copied)
    );
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
