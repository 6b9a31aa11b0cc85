use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use checkout_lines::output::{format_table, write_all};
use checkout_lines::{Aggregation, Experiment, SimError, SimulationConfig};
use clap::Parser;
use env_logger::Builder;
use log::{LevelFilter, info};

/// Compare one shared checkout line against a line per register
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of trials per arrival interval (prompted for when omitted)
    #[arg(short, long)]
    trials: Option<usize>,

    /// TOML experiment configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    /// pool-all-trials, last-trial-only or mean-of-trial-means
    #[arg(long)]
    aggregation: Option<Aggregation>,

    /// Worker threads for running trials
    #[arg(long)]
    threads: Option<usize>,

    /// Directory for sweep.csv and comparison.json
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

fn prompt_trials() -> Result<usize, SimError> {
    print!("Number of trials to be tested: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    line.trim()
        .parse()
        .map_err(|e| SimError::InvalidConfiguration(format!("'{}': {}", line.trim(), e)))
}

fn run(args: Args) -> Result<(), SimError> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_path(path)?,
        None => SimulationConfig::default(),
    };
    config.trials = match (args.trials, &args.config) {
        (Some(trials), _) => trials,
        (None, Some(_)) => config.trials,
        (None, None) => prompt_trials()?,
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(aggregation) = args.aggregation {
        config.aggregation = aggregation;
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }

    let experiment = Experiment::new(config)?;
    let config = experiment.config();
    info!(
        "{} registers, {} trials per interval, horizon {}, aggregation {}",
        config.registers, config.trials, config.horizon, config.aggregation
    );

    let comparison = experiment.compare()?;

    println!("Average wait times (mean wait before service)");
    print!("{}", format_table(&comparison));

    if let Some(dir) = &args.output {
        write_all(config, &comparison, dir)?;
        println!("\nResults written to {}", dir.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
