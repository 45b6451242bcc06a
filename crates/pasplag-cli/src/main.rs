//! CLI binary for pasplag: compare Pascal sources for plagiarism.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pasplag_core::config::{DetectOptions, PasplagConfig};
use pasplag_engine::Engine;
use pasplag_lexer::SourceFile;
use std::path::{Path, PathBuf};

/// Source extensions picked up by batch directory discovery.
const PASCAL_EXTENSIONS: [&str; 4] = ["pas", "pp", "dpr", "inc"];

#[derive(Parser)]
#[command(name = "pasplag", about = "Winnowing-based Pascal plagiarism detector")]
struct Cli {
    /// Directory holding pasplag.toml (defaults to the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two source files and print the detection report as JSON
    Compare {
        file1: PathBuf,
        file2: PathBuf,

        /// Decision threshold on overall similarity (adaptive if omitted)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Minimum shared k-grams per reported fragment
        #[arg(long)]
        min_occurrences: Option<usize>,

        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Compare every pair among the given files/directories
    Batch {
        /// Files or directories to scan for Pascal sources
        paths: Vec<PathBuf>,

        /// Decision threshold on overall similarity (batch-adaptive if omitted)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Keep only the top N pairs in the report
        #[arg(long)]
        limit: Option<usize>,

        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Dump the normalised token stream of a file (debug aid)
    Tokens { file: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_root = match &cli.config {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    let config = PasplagConfig::load(&config_root)?;
    let engine = Engine::new(config.engine)?;

    match cli.command {
        Commands::Compare {
            file1,
            file2,
            threshold,
            min_occurrences,
            compact,
        } => cmd_compare(
            &engine,
            &config,
            &file1,
            &file2,
            DetectOptions {
                threshold,
                min_occurrences,
            },
            compact,
        ),
        Commands::Batch {
            paths,
            threshold,
            limit,
            compact,
        } => cmd_batch(
            &engine,
            &config,
            &paths,
            DetectOptions {
                threshold,
                min_occurrences: None,
            },
            limit,
            compact,
        ),
        Commands::Tokens { file } => cmd_tokens(&config, &file),
    }
}

fn cmd_compare(
    engine: &Engine,
    config: &PasplagConfig,
    file1: &Path,
    file2: &Path,
    opts: DetectOptions,
    compact: bool,
) -> Result<()> {
    let left = read_source(file1, config.limits.max_file_bytes)?;
    let right = read_source(file2, config.limits.max_file_bytes)?;

    let result = engine.detect(&left, &right, &opts);
    print_json(&result, compact)
}

fn cmd_batch(
    engine: &Engine,
    config: &PasplagConfig,
    paths: &[PathBuf],
    opts: DetectOptions,
    limit: Option<usize>,
    compact: bool,
) -> Result<()> {
    if paths.is_empty() {
        bail!("batch needs at least one file or directory");
    }

    let files = collect_sources(paths, config.limits.max_file_bytes)?;
    if files.len() < 2 {
        bail!("batch needs at least two readable Pascal sources, found {}", files.len());
    }
    eprintln!("Comparing {} files...", files.len());

    let mut batch = engine.detect_batch(&files, &opts);
    if let Some(limit) = limit {
        batch.results.truncate(limit);
    }
    print_json(&batch, compact)
}

fn cmd_tokens(config: &PasplagConfig, file: &Path) -> Result<()> {
    let source = read_source(file, config.limits.max_file_bytes)?;
    let tokenized = pasplag_lexer::tokenize(&source.name, &source.text)
        .with_context(|| format!("failed to tokenize {}", file.display()))?;

    for (i, token) in tokenized.tokens().iter().enumerate() {
        let r = token.region;
        println!(
            "{i:4}  {:<12} {}:{}-{}:{}",
            token.value, r.start_row, r.start_col, r.end_row, r.end_col
        );
    }
    eprintln!("{} tokens over {} lines", tokenized.len(), tokenized.line_count());
    Ok(())
}

/// Read one source file, refusing anything over the configured size cap.
fn read_source(path: &Path, max_bytes: u64) -> Result<SourceFile> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?;
    if metadata.len() > max_bytes {
        bail!(
            "{} is {} bytes, over the {} byte cap",
            path.display(),
            metadata.len(),
            max_bytes
        );
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(SourceFile::new(path.display().to_string(), text))
}

/// Expand files and directories into the sorted list of Pascal sources.
/// Oversized or unreadable files are skipped with a warning.
fn collect_sources(paths: &[PathBuf], max_bytes: u64) -> Result<Vec<SourceFile>> {
    let mut discovered: Vec<PathBuf> = Vec::new();
    for path in paths {
        if path.is_dir() {
            let walker = ignore::WalkBuilder::new(path).hidden(true).build();
            for entry in walker.flatten() {
                let p = entry.path();
                if p.is_file() && has_pascal_extension(p) {
                    discovered.push(p.to_path_buf());
                }
            }
        } else {
            discovered.push(path.clone());
        }
    }
    discovered.sort();
    discovered.dedup();

    let mut files = Vec::new();
    for path in discovered {
        match read_source(&path, max_bytes) {
            Ok(source) => files.push(source),
            Err(err) => tracing::warn!(file = %path.display(), error = %err, "skipping file"),
        }
    }
    Ok(files)
}

fn has_pascal_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            PASCAL_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

fn print_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_extension_matching() {
        assert!(has_pascal_extension(Path::new("a.pas")));
        assert!(has_pascal_extension(Path::new("a.PAS")));
        assert!(has_pascal_extension(Path::new("unit.pp")));
        assert!(has_pascal_extension(Path::new("proj.dpr")));
        assert!(!has_pascal_extension(Path::new("notes.txt")));
        assert!(!has_pascal_extension(Path::new("pas")));
    }
}
