use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Target};
use log::{error, info, Level, LevelFilter};

use sievesat::config::SolverConfig;
use sievesat::dimacs::DimacsParser;
use sievesat::pipeline::{solve_formula, Outcome};

const SAT_EXIT_CODE: i32 = 0;
const UNSAT_EXIT_CODE: i32 = 1;
const ERROR_EXIT_CODE: i32 = 2;

/// Per-instance deadline used by the benchmark driver.
const BENCHMARK_TIMEOUT: Duration = Duration::from_secs(1000);

#[derive(Parser)]
#[command(name = "sievesat", version, about = "CNF satisfiability solver")]
struct Options {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a DIMACS CNF file
    Solve {
        /// The input file
        input: PathBuf,
        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Solve every .cnf file in a directory and append results to a log
    Benchmark {
        /// Directory with .cnf files
        dir: PathBuf,
        /// File the results are appended to
        log_file: PathBuf,
    },
}

fn main() {
    init_logging();

    let options = Options::parse();

    let result = match options.command {
        Command::Solve { input, timeout } => solve(&input, timeout.map(Duration::from_secs)),
        Command::Benchmark { dir, log_file } => benchmark(&dir, &log_file),
    };

    match result {
        Ok(exit_code) => exit(exit_code),
        Err(err) => {
            error!("{:#}", err);
            exit(ERROR_EXIT_CODE);
        }
    }
}

/// Log as DIMACS comment lines on stdout.
fn init_logging() {
    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(|buf, record| {
            if record.level() == Level::Info {
                writeln!(buf, "c {}", record.args())
            } else {
                writeln!(buf, "c {}: {}", record.level(), record.args())
            }
        })
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = std::env::var("SIEVESAT_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn solve(input: &Path, timeout: Option<Duration>) -> Result<i32> {
    info!("reading file '{}'", input.display());
    let file = fs::File::open(input)
        .with_context(|| format!("failed to open '{}'", input.display()))?;
    let formula = DimacsParser::parse(file)
        .with_context(|| format!("failed to parse '{}'", input.display()))?;

    match solve_formula(&formula, &SolverConfig::default(), timeout) {
        Outcome::Sat(model) => {
            println!("SAT");
            let mut line = String::new();
            for lit in model {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(&lit.to_dimacs().to_string());
            }
            println!("{}", line);
            Ok(SAT_EXIT_CODE)
        }
        Outcome::Unsat => {
            println!("UNSAT");
            Ok(UNSAT_EXIT_CODE)
        }
        Outcome::Unknown => {
            println!("UNKNOWN");
            Ok(SAT_EXIT_CODE)
        }
    }
}

fn benchmark(dir: &Path, log_file: &Path) -> Result<i32> {
    let mut log = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file '{}'", log_file.display()))?;

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory '{}'", dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().map_or(false, |ext| ext == "cnf"))
        .collect();
    entries.sort();

    for path in entries {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("solving {}", filename);

        let formula = match fs::File::open(&path)
            .map_err(anyhow::Error::from)
            .and_then(|file| Ok(DimacsParser::parse(file)?))
        {
            Ok(formula) => formula,
            Err(err) => {
                error!("skipping {}: {:#}", filename, err);
                continue;
            }
        };

        let start = Instant::now();
        let outcome = solve_formula(&formula, &SolverConfig::default(), Some(BENCHMARK_TIMEOUT));
        let elapsed = start.elapsed();

        let result = match outcome {
            Outcome::Sat(_) => "SAT",
            Outcome::Unsat => "UNSAT",
            Outcome::Unknown => "TIMEOUT",
        };

        writeln!(
            log,
            "{} ... {}, time: {} seconds",
            filename,
            result,
            elapsed.as_secs()
        )?;
    }

    Ok(SAT_EXIT_CODE)
}
