use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dirscout::{
    config::{default_thread_count, split_list},
    run_search, ErrorPolicy, SearchConfig, SearchError,
};
use std::io::{self, BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit status for invocations rejected before searching
const USAGE_EXIT: u8 = 2;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Literal term to search for (required)
    #[arg(short = 't', long, alias = "searchTerm")]
    term: Option<String>,

    /// Base directory to start from [default: current directory]
    #[arg(short = 'b', long, alias = "baseDir")]
    base: Option<PathBuf>,

    /// Name(s) of directories to ignore (comma-separated)
    #[arg(long = "ignore-dir", alias = "ignoreDir", value_name = "NAMES")]
    ignore_dir: Option<String>,

    /// File extensions to ignore (comma-separated)
    #[arg(long = "ignore-ext", alias = "ignoreExt", value_name = "EXTS")]
    ignore_ext: Option<String>,

    /// Number of worker threads [default: CPU cores]
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Abort on the first unreadable directory or file instead of skipping it
    #[arg(long)]
    fail_fast: bool,

    /// Show only statistics, not matches
    #[arg(short, long)]
    stats: bool,

    /// Additional configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn to_search_config(&self) -> SearchConfig {
        let mut config = SearchConfig::default();
        if let Some(term) = &self.term {
            config.term = term.clone();
        }
        if let Some(base) = &self.base {
            config.root_path = base.clone();
        }
        if let Some(dirs) = &self.ignore_dir {
            config.ignored_dirs = split_list(dirs);
        }
        if let Some(exts) = &self.ignore_ext {
            config.ignored_extensions = split_list(exts);
        }
        config.thread_count = self.threads.unwrap_or_else(default_thread_count);
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if self.fail_fast {
            config.error_policy = ErrorPolicy::FailFast;
        }
        config.stats_only = self.stats;
        config
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = SearchConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?
        .merge_with_cli(cli.to_search_config());
    // An explicit -j wins even when it equals the default
    if let Some(threads) = cli.threads {
        config.thread_count = threads;
    }

    init_tracing(&config.log_level);

    if cli.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    if let Err(err @ SearchError::Usage(_)) = config.validate() {
        eprintln!("{} {}", "error:".red().bold(), err);
        return Ok(ExitCode::from(USAGE_EXIT));
    }

    let handle = run_search(&config)?;

    let mut total_matches = 0usize;
    let mut files_with_matches = 0usize;
    {
        let mut out = BufWriter::new(io::stdout().lock());
        for file_result in handle.results() {
            total_matches += file_result.matches.len();
            files_with_matches += 1;
            if config.stats_only {
                continue;
            }
            let path = file_result.path();
            for m in &file_result.matches {
                writeln!(out, "{}:{} - {}", path.display(), m.line_number, m.snippet)?;
            }
        }
        out.flush()?;
    }

    // The stream has closed, so every worker is done walking
    let elapsed = whole_millis(handle.elapsed());
    let summary = handle.finish()?;

    for failure in &summary.failures {
        eprintln!("{} {}", "warning:".yellow().bold(), failure);
    }

    if config.stats_only {
        println!(
            "Found {} matches in {} files",
            total_matches, files_with_matches
        );
    }
    println!(
        "{}",
        format!(
            "Took {} to traverse {} directories and {} files",
            humantime::format_duration(elapsed),
            summary.directories_visited,
            summary.files_scanned
        )
        .green()
    );

    if summary.has_failures() {
        eprintln!(
            "{} {} entries could not be read",
            "error:".red().bold(),
            summary.failures.len()
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Drops sub-millisecond precision so the printed duration stays readable
fn whole_millis(elapsed: Duration) -> Duration {
    Duration::from_millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_millis() {
        assert_eq!(
            whole_millis(Duration::from_micros(12_345_678)),
            Duration::from_millis(12_345)
        );
        assert_eq!(whole_millis(Duration::MAX), Duration::from_millis(u64::MAX));
    }
}
