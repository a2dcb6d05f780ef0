//! `utl` CLI — validate, pretty-print, minify and summarize JSON from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Validate (stdin)
//! echo '{"name":"Alice"}' | utl check
//!
//! # Pretty-print a file with 2-space indentation
//! utl fmt -i data.json --indent 2
//!
//! # Minify from file to file
//! utl minify -i data.json -o data.min.json
//!
//! # Value counts, depth and sizes, using 4 worker threads
//! utl stats -i data.json --threads 4
//! ```
//!
//! Diagnostics go to stderr; set `RUST_LOG=debug` for more.

mod stats;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;
use utl_json::{parser::DEFAULT_MAX_DEPTH, serializer::DEFAULT_INDENT, ParseOptions, SerializeOptions, Value};
use utl_parallel::ThreadPool;

use crate::stats::{Report, Stats};

#[derive(Parser)]
#[command(name = "utl", version, about = "JSON validation, formatting and statistics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Maximum nesting depth accepted by the parser
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the input is valid JSON
    Check {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Pretty-print JSON
    Fmt {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Spaces per nesting level
        #[arg(long, default_value_t = DEFAULT_INDENT)]
        indent: usize,
    },
    /// Strip all insignificant whitespace
    Minify {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show value counts, nesting depth and serialized sizes
    Stats {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Worker threads (defaults to the number of CPUs)
        #[arg(long)]
        threads: Option<usize>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let options = ParseOptions {
        max_depth: cli.max_depth,
    };

    match cli.command {
        Commands::Check { input } => {
            parse_input(input.as_deref(), options)?;
            println!("ok");
        }
        Commands::Fmt {
            input,
            output,
            indent,
        } => {
            let (value, _) = parse_input(input.as_deref(), options)?;
            let text = value.to_string_with(SerializeOptions::pretty().with_indent(indent));
            write_output(output.as_deref(), &text)?;
        }
        Commands::Minify { input, output } => {
            let (value, _) = parse_input(input.as_deref(), options)?;
            let text = value.to_string_with(SerializeOptions::minimized());
            write_output(output.as_deref(), &text)?;
        }
        Commands::Stats { input, threads } => {
            let (value, input_bytes) = parse_input(input.as_deref(), options)?;
            let pool = match threads {
                Some(n) => ThreadPool::new(n),
                None => ThreadPool::default(),
            };
            let sizes = Report::new(&value, input_bytes, Stats::default());
            let stats = Stats::of_document(value, &pool).context("Failed to summarize document")?;
            println!("{}", Report { stats, ..sizes });
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`), so stdout carries only output.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Read and parse the input, returning the document and the input size in bytes.
fn parse_input(path: Option<&str>, options: ParseOptions) -> Result<(Value, usize)> {
    let text = read_input(path)?;
    let source = path.unwrap_or("<stdin>");
    let value = utl_json::parse_with(&text, options)
        .with_context(|| format!("Invalid JSON in {source}"))?;
    tracing::debug!(source, bytes = text.len(), kind = %value.kind(), "parsed input");
    Ok((value, text.len()))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

/// Write to `path`, or to stdout with a trailing newline.
fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
