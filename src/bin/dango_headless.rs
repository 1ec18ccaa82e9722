//! Headless terminal runner
//!
//! Feeds a byte script through the emulator and prints the resulting
//! grid, for automation and golden testing. Input comes from a file or
//! stdin; output is plain text or a JSON snapshot. A selection range
//! can be applied to exercise text extraction from the command line.

use std::io::{self, Read};
use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dango_terminal::core::{DEFAULT_COLS, DEFAULT_ROWS};
use dango_terminal::Terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut rows = DEFAULT_ROWS;
    let mut cols = DEFAULT_COLS;
    let mut input_file: Option<String> = None;
    let mut format = OutputFormat::Text;
    let mut selection: Option<(usize, usize, usize, usize)> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-r" | "--rows" => {
                i += 1;
                rows = parse_or(&args, i, DEFAULT_ROWS);
            }
            "-c" | "--cols" => {
                i += 1;
                cols = parse_or(&args, i, DEFAULT_COLS);
            }
            "-f" | "--file" => {
                i += 1;
                input_file = args.get(i).cloned();
            }
            "-j" | "--json" => format = OutputFormat::Json,
            "-t" | "--text" => format = OutputFormat::Text,
            "--select" => {
                i += 1;
                match args.get(i).and_then(|s| parse_selection(s)) {
                    Some(range) => selection = Some(range),
                    None => {
                        eprintln!("--select wants r0,c0,r1,c1");
                        return ExitCode::FAILURE;
                    }
                }
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            other => {
                if input_file.is_none() && !other.starts_with('-') {
                    input_file = Some(other.to_string());
                } else {
                    eprintln!("unknown argument '{}'", other);
                    return ExitCode::FAILURE;
                }
            }
        }
        i += 1;
    }

    let script = match &input_file {
        Some(path) => match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("error reading '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            let mut data = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut data) {
                eprintln!("error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            data
        }
    };

    let mut terminal = Terminal::new(rows, cols);
    terminal.process(&script);

    if let Some((r0, c0, r1, c1)) = selection {
        let state = terminal.state_mut();
        state.begin_selection(r0, c0);
        state.update_selection(r1, c1);
    }

    match format {
        OutputFormat::Text => {
            print!("{}", terminal.snapshot().to_text());
            if let Some(text) = terminal.state().selection_text() {
                println!("--- selection ---");
                println!("{}", text);
            }
        }
        OutputFormat::Json => match terminal.snapshot().to_json() {
            Ok(json) => {
                println!("{}", json);
                if let Some(text) = terminal.state().selection_text() {
                    eprintln!("selection: {:?}", text);
                }
            }
            Err(e) => {
                eprintln!("error serializing snapshot: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

fn parse_or(args: &[String], i: usize, default: usize) -> usize {
    args.get(i)
        .and_then(|s| s.parse().ok())
        .filter(|&n| n > 0)
        .unwrap_or(default)
}

/// Parse `r0,c0,r1,c1` into selection endpoints
fn parse_selection(s: &str) -> Option<(usize, usize, usize, usize)> {
    let mut parts = s.split(',').map(|p| p.trim().parse::<usize>());
    let r0 = parts.next()?.ok()?;
    let c0 = parts.next()?.ok()?;
    let r1 = parts.next()?.ok()?;
    let c1 = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((r0, c0, r1, c1))
}

fn print_help() {
    println!("dango-headless - run a byte script through the terminal emulator");
    println!();
    println!("USAGE:");
    println!("    dango-headless [OPTIONS] [FILE]");
    println!();
    println!("OPTIONS:");
    println!("    -r, --rows <N>             grid rows (default 24)");
    println!("    -c, --cols <N>             grid columns (default 80)");
    println!("    -f, --file <FILE>          read the script from FILE (default stdin)");
    println!("    -t, --text                 print the grid as plain text (default)");
    println!("    -j, --json                 print the grid as a JSON snapshot");
    println!("    --select <r0,c0,r1,c1>     apply a selection and print its text");
    println!("    -h, --help                 show this help");
}
