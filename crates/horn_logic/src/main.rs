//! Horn Logic - command-line front end
//!
//! Reads an exchange record from a file or generates a benchmark, runs the chosen
//! strategies and prints a report.

use std::path::PathBuf;

use clap::Parser;
use horn_logic::generator::DEFAULT_SEED;
use horn_logic::{
    EngineConfig, Error, ExchangeRecord, Family, InferenceMode, Reasoner, Result, RunReport,
};

/// Forward and backward chaining over propositional Horn rules
#[derive(Parser, Debug)]
#[command(name = "horn-logic")]
#[command(version)]
#[command(about = "Decide whether a question follows from facts under Horn rules")]
#[command(long_about = None)]
struct Args {
    /// Exchange record (JSON) to evaluate
    #[arg(short, long, conflicts_with = "family")]
    input: Option<PathBuf>,

    /// Benchmark family to generate instead of reading a record
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
    family: Option<u8>,

    /// Width parameter of the generated benchmark
    #[arg(short, default_value_t = 10)]
    k: usize,

    /// Depth parameter of the generated benchmark
    #[arg(short, default_value_t = 10)]
    n: usize,

    /// Use the worst-case rule ordering (family 3 only)
    #[arg(long, requires = "family")]
    worst: bool,

    /// Seed for the family 3 shuffle
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Strategy to run: forward, backward or both
    #[arg(short, long, default_value = "both")]
    mode: InferenceMode,

    /// Bound on the nesting of backward goals (unbounded by default)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Run this many times and report mean durations
    #[arg(short, long, default_value_t = 1)]
    repeat: u32,

    /// Write the evaluated record to this file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let record = load_record(&args)?;
    if let Some(path) = &args.save {
        record.save(path)?;
        log::info!("Record written to {}", path.display());
    }

    let mut graph = record.link()?;
    log::info!(
        "Linked {} rules over {} variables",
        graph.rule_count(),
        graph.variable_count()
    );

    let config = EngineConfig::default()
        .with_mode(args.mode)
        .with_max_depth(args.max_depth);
    let mut reasoner = Reasoner::new(config);

    if args.repeat > 1 {
        let timing = reasoner.time(&mut graph, args.repeat)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&timing)?);
        } else {
            println!("question {}: {}", record.question, verdict(timing.answer));
            if let Some(mean) = timing.forward_mean {
                println!("  forward  mean {:?} over {} runs", mean, timing.repeats);
            }
            if let Some(mean) = timing.backward_mean {
                println!("  backward mean {:?} over {} runs", mean, timing.repeats);
            }
        }
        return Ok(());
    }

    let report = reasoner.run(&mut graph)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn load_record(args: &Args) -> Result<ExchangeRecord> {
    match (&args.input, args.family) {
        (Some(path), _) => ExchangeRecord::from_path(path),
        (None, Some(number)) => {
            let family = Family::from_number(number)?;
            log::info!("Generating {} with k={} n={}", family, args.k, args.n);
            family.generate(args.k, args.n, args.seed, args.worst)
        }
        (None, None) => Err(Error::MalformedInput(
            "either --input or --family is required".to_string(),
        )),
    }
}

fn verdict(proved: bool) -> &'static str {
    if proved {
        "derivable"
    } else {
        "not derivable"
    }
}

fn print_report(report: &RunReport) {
    println!("question {}: {}", report.question, verdict(report.answer()));
    if let Some(outcome) = report.forward {
        println!("  forward  {} in {:?}", outcome.proved, outcome.elapsed);
    }
    if let Some(outcome) = report.backward {
        println!("  backward {} in {:?}", outcome.proved, outcome.elapsed);
    }
    let stats = &report.stats;
    if report.mode.runs_forward() {
        println!(
            "  forward:  {} variables expanded, {} rules fired",
            stats.variables_expanded, stats.rules_fired
        );
    }
    if report.mode.runs_backward() {
        println!(
            "  backward: {} goals, {} rules tried, {} wakeups, {} cycles closed, depth {}",
            stats.goals_explored, stats.rules_evaluated, stats.wakeups, stats.flushes, stats.deepest
        );
    }
}
