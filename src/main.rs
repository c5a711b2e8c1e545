use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rvdispatch::{DispatcherConfig, Errors, Extension, Extensions, Table, Target};

/// Exit code for failures outside the compiler itself (reading tables, writing output).
const EXIT_IO: u8 = 4;

/// Exit code for a bad command line (`EX_USAGE`).
const EXIT_USAGE: u8 = 64;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate a RISC-V instruction dispatcher for the RV32I base ISA plus extensions."
)]
struct Args {
    /// Enable the 'C' extension
    #[arg(short = 'c', overrides_with = "compressed")]
    compressed: bool,

    /// Enable the 'F' extension
    #[arg(short = 'f', overrides_with = "float")]
    float: bool,

    /// Enable the 'M' extension
    #[arg(short = 'm', overrides_with = "muldiv")]
    muldiv: bool,

    /// Replace a built-in opcode table with a file, e.g. `--table m=rv32m.opcodes`
    #[arg(long = "table", value_name = "EXT=PATH", value_parser = parse_table_override)]
    tables: Vec<(Extension, PathBuf)>,

    /// Log progress to stderr; repeat for more detail. RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Target language for code generation (c++ or rust)
    language: Target,
}

impl Args {
    fn extensions(&self) -> Extensions {
        let mut extensions = Extensions::I;
        extensions.set(Extensions::C, self.compressed);
        extensions.set(Extensions::F, self.float);
        extensions.set(Extensions::M, self.muldiv);
        extensions
    }
}

fn parse_table_override(s: &str) -> Result<(Extension, PathBuf), String> {
    let (ext, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected EXT=PATH, got '{}'", s))?;

    let mut letters = ext.chars();
    let ext = match (letters.next(), letters.next()) {
        (Some(letter), None) => Extension::from_letter(letter),
        _ => None,
    }
    .ok_or_else(|| format!("unknown extension '{}' (expected one of i, m, f, c)", ext))?;

    if path.is_empty() {
        return Err("missing table path".to_string());
    }
    Ok((ext, PathBuf::from(path)))
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "rvdispatch=debug",
        _ => "rvdispatch=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_tables(args: &Args, extensions: Extensions) -> Result<Vec<Table>> {
    for (ext, path) in &args.tables {
        if !extensions.contains(Extensions::from(*ext)) {
            warn!(extension = %ext, path = %path.display(), "table override for a disabled extension is ignored");
        }
    }

    extensions
        .enabled()
        .map(|ext| {
            match args.tables.iter().rev().find(|(e, _)| *e == ext) {
                Some((_, path)) => {
                    info!(extension = %ext, path = %path.display(), "using table override");
                    Table::from_path(ext, path)
                        .with_context(|| format!("failed to read opcode table {}", path.display()))
                }
                None => Ok(Table::builtin(ext)),
            }
        })
        .collect()
}

fn run(args: &Args) -> Result<String> {
    let extensions = args.extensions();
    let invocation = std::env::args().collect::<Vec<_>>().join(" ");
    let config = DispatcherConfig::new(extensions, args.language).with_invocation(invocation);

    let tables = load_tables(args, config.extensions)?;
    let code = rvdispatch::generate(&tables, &config)?;
    Ok(code)
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // --help and --version print to stdout and exit 0.
            if !err.use_stderr() {
                err.exit();
            }
            let _ = err.print();
            return ExitCode::from(EXIT_USAGE);
        }
    };
    init_logging(args.verbose);

    let code = match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            let status = err
                .downcast_ref::<Errors>()
                .map(Errors::exit_code)
                .unwrap_or(EXIT_IO);
            return ExitCode::from(status);
        }
    };

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout.write_all(code.as_bytes()).and_then(|_| stdout.flush()) {
        eprintln!("error: failed to write output: {}", err);
        return ExitCode::from(EXIT_IO);
    }

    ExitCode::SUCCESS
}
