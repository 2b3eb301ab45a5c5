//! sable: Run Sable scripts from the command line.
//!
//! Usage:
//!   sable [options] FILE
//!
//! Compiles the file, reports diagnostics and evaluates the program. The bound
//! tree, the lowered tree and per-method control flow graphs can be dumped
//! along the way.

use clap::Parser as ClapParser;
use sable_compiler::{graph_file_name, Compilation, CompilationOptions};
use sable_evaluator::EvaluationResult;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "sable", about = "sable - A small statically typed scripting language", version)]
struct Cli {
    /// Sable source file to run.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Print the bound program.
    #[arg(long)]
    print: bool,

    /// With --print, show the lowered label/goto form instead.
    #[arg(long)]
    lowered: bool,

    /// Write one Graphviz file per method into this directory.
    #[arg(long = "cfg-dir", value_name = "DIR")]
    cfg_dir: Option<PathBuf>,

    /// Check the program without evaluating it.
    #[arg(long = "no-run")]
    no_run: bool,

    /// Lower methods on a single thread.
    #[arg(long)]
    sequential: bool,

    /// Enable colored diagnostics.
    #[arg(long, default_value_t = true)]
    pretty: bool,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let start = Instant::now();
    let options = CompilationOptions {
        parallel_lowering: !cli.sequential,
        ..CompilationOptions::default()
    };

    let compilation = match Compilation::load(&cli.file, options) {
        Ok(compilation) => compilation,
        Err(e) => {
            print_error(&format!("{}: {}", cli.file.display(), e));
            return 1;
        }
    };
    tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "compilation finished");

    let use_color = cli.pretty && atty_is_terminal();
    let diagnostics = compilation.diagnostics();
    for diag in diagnostics.diagnostics() {
        print_diagnostic(&compilation, diag, use_color);
    }

    if cli.print {
        println!("{}", compilation.print_program(cli.lowered));
    }

    if let Some(dir) = &cli.cfg_dir {
        if let Err(e) = write_graphs(&compilation, dir) {
            print_error(&format!("Failed to write control flow graphs: {}", e));
            return 1;
        }
    }

    if diagnostics.has_errors() {
        let count = diagnostics.error_count();
        let summary = format!("Found {} error{}.", count, if count == 1 { "" } else { "s" });
        if use_color {
            eprintln!("\n{}{}{}", RED, summary, RESET);
        } else {
            eprintln!("\n{}", summary);
        }
        return 2;
    }

    if cli.no_run {
        return 0;
    }

    match compilation.evaluate() {
        EvaluationResult::Value { value, .. } => {
            if !value.is_void() {
                println!("{}", value);
            }
            0
        }
        EvaluationResult::Diagnostics(errors) => {
            for diag in errors.diagnostics() {
                print_diagnostic(&compilation, diag, use_color);
            }
            3
        }
    }
}

fn write_graphs(compilation: &Compilation, dir: &std::path::Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    compilation.write_control_flow_graphs(|method| {
        let path = dir.join(graph_file_name(method));
        tracing::debug!(path = %path.display(), "writing control flow graph");
        File::create(path).map(BufWriter::new)
    })
}

fn print_diagnostic(compilation: &Compilation, diag: &sable_diagnostics::Diagnostic, use_color: bool) {
    let text = compilation.format_diagnostic(diag);
    if !use_color {
        eprintln!("{}", text);
        return;
    }
    let color = if diag.is_error() { RED } else { YELLOW };
    match text.split_once(": ") {
        Some((location, rest)) => eprintln!("{}{}{}: {}{}{}{}", CYAN, location, RESET, BOLD, color, rest, RESET),
        None => eprintln!("{}{}{}{}", BOLD, color, text, RESET),
    }
}

fn print_error(msg: &str) {
    if atty_is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

fn atty_is_terminal() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        true
    }
}
