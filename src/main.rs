//! hept-parse: Heptagon parser command line interface
//!
//! Usage:
//!   hept-parse [OPTIONS] <input-file>
//!   hept-parse --help
//!
//! Examples:
//!   hept-parse counter.ept                     # Check syntax, print the AST
//!   hept-parse --emit=json counter.ept         # AST as JSON
//!   hept-parse --emit=pretty -o out.ept in.ept # Normalized source
//!   hept-parse --recover lib.ept               # Report every broken definition

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use heptagon_syntax::frontend::{self, print_source_file, SpanIndex};
use heptagon_syntax::utils::errors::{Diagnostic, SyntaxError};
use heptagon_syntax::utils::location::SourceMap;
use heptagon_syntax::ParserConfig;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// hept-parse - Heptagon syntax checker and AST dumper
#[derive(Parser, Debug)]
#[command(name = "hept-parse")]
#[command(author = "Heptagon Syntax Contributors")]
#[command(version)]
#[command(about = "Parse Heptagon source files", long_about = None)]
struct Cli {
    /// Input file (.ept)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// What to emit
    #[arg(long, default_value = "ast")]
    emit: EmitKind,

    /// Report every failing definition instead of stopping at the first
    #[arg(long)]
    recover: bool,

    /// Maximum number of errors reported with --recover
    #[arg(long, default_value_t = 32)]
    max_errors: usize,

    /// Maximum statement/expression nesting
    #[arg(long, default_value_t = 128)]
    max_depth: usize,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress warnings)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmitKind {
    /// Abstract Syntax Tree (debug format)
    Ast,
    /// Abstract Syntax Tree as JSON
    Json,
    /// Re-printed source
    Pretty,
    /// Token stream
    Tokens,
    /// Flat span index
    Spans,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    info!("hept-parse v{}", heptagon_syntax::VERSION);
    debug!("Input file: {:?}", cli.input);

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input file: {:?}", cli.input))?;
    let file_name = cli.input.display().to_string();

    let output = match cli.emit {
        EmitKind::Tokens => emit_tokens(&file_name, &source)?,
        emit => emit_ast(&file_name, &source, emit, &build_config(&cli))?,
    };

    write_output(cli.output.as_deref(), &output)
}

fn emit_tokens(file_name: &str, source: &str) -> Result<String> {
    let tokens = frontend::tokenize(source)
        .map_err(|e| report(file_name, source, &[SyntaxError::from(e)]))?;
    debug!("Lexed {} tokens", tokens.len());
    Ok(tokens
        .iter()
        .map(|t| format!("{}\t{}", t.span, t))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn emit_ast(file_name: &str, source: &str, emit: EmitKind, config: &ParserConfig) -> Result<String> {
    debug!("Parser config: {:?}", config);

    info!("Parsing...");
    let file = heptagon_syntax::parse_with_config(source, config)
        .map_err(|errors| report(file_name, source, &errors))?;
    info!("Parsed {} definitions", file.definitions.len());

    let output = match emit {
        EmitKind::Json => serde_json::to_string_pretty(&file).context("Failed to serialize AST")?,
        EmitKind::Pretty => print_source_file(&file),
        EmitKind::Spans => {
            let source_map = SourceMap::new(source);
            SpanIndex::build(&file)
                .entries()
                .iter()
                .map(|e| {
                    let text = source_map.span_text(&e.span).unwrap_or_default();
                    let first_line = text.lines().next().unwrap_or_default();
                    format!("{}{} @ {}  {}", "  ".repeat(e.depth), e.label, e.span, first_line)
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        EmitKind::Ast | EmitKind::Tokens => format!("{:#?}", file),
    };
    Ok(output)
}

fn build_config(cli: &Cli) -> ParserConfig {
    ParserConfig {
        recover: cli.recover,
        max_errors: cli.max_errors.max(1),
        max_depth: cli.max_depth,
    }
}

/// Print diagnostics to stderr and produce the final error.
fn report(file_name: &str, source: &str, errors: &[SyntaxError]) -> anyhow::Error {
    let source_map = SourceMap::new(source);
    for error in errors {
        eprintln!("{}", Diagnostic::from(error).render(file_name, &source_map));
    }
    match errors.len() {
        1 => anyhow::anyhow!("1 syntax error in {}", file_name),
        n => anyhow::anyhow!("{} syntax errors in {}", n, file_name),
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content)
                .with_context(|| format!("Failed to write output file: {:?}", p))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
