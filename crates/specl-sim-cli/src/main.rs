//! Command-line interface for the Specl random simulator.

mod models;

use clap::{Parser, Subcommand};
use miette::Diagnostic;
use specl_sim::{
    LivenessViolation, Model, SimConfig, SimError, SimulationReport, Simulator, State,
    Termination, Value, Violation,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("unknown model '{name}'")]
    #[diagnostic(
        code(specl_sim::unknown_model),
        help("run `specl-sim list` to see the bundled models")
    )]
    UnknownModel { name: String },

    #[error("simulation error: {source}")]
    #[diagnostic(code(specl_sim::simulation_error))]
    Simulation {
        #[from]
        source: SimError,
    },

    #[error("{message}")]
    Other { message: String },
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "specl-sim", version)]
#[command(about = "Random behavior simulator for Specl state machines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate random behaviors of a bundled model
    Run {
        /// Model to simulate (see `list`)
        #[arg(short, long, value_name = "MODEL")]
        model: String,

        /// Constant assignments (name=value)
        #[arg(short, long, value_name = "CONST=VALUE")]
        constant: Vec<String>,

        /// Number of behaviors to generate (0 = unlimited)
        #[arg(long, default_value = "1000")]
        traces: u64,

        /// Maximum number of states per behavior (0 = unlimited)
        #[arg(long, default_value = "100")]
        depth: usize,

        /// Random seed (default: random)
        #[arg(long)]
        seed: Option<u64>,

        /// Random stream position to start from, as reported with a violation
        #[arg(long, default_value = "0")]
        aril: u64,

        /// Keep simulating after a violation
        #[arg(long = "continue")]
        continue_on_violation: bool,

        /// Disable deadlock checking
        #[arg(long)]
        no_deadlock: bool,

        /// Report action coverage
        #[arg(long)]
        coverage: bool,

        /// Seconds between progress reports
        #[arg(long, default_value = "60")]
        progress_interval: u64,

        /// Seconds between coverage reports
        #[arg(long, default_value = "60")]
        coverage_interval: u64,

        /// Write behavior N to <PREFIX>N
        #[arg(long, value_name = "PREFIX")]
        trace_output: Option<PathBuf>,

        /// Require every behavior to reach a state where NAME = VALUE
        #[arg(long, value_name = "NAME=VALUE")]
        eventually: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the bundled models
    List,
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .build(),
        )
    }))
    .ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if matches!(&cli.command, Commands::Run { verbose: true, .. }) {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run {
            model,
            constant,
            traces,
            depth,
            seed,
            aril,
            continue_on_violation,
            no_deadlock,
            coverage,
            progress_interval,
            coverage_interval,
            trace_output,
            eventually,
            json,
            verbose: _,
        } => {
            let config = SimConfig {
                num_traces: traces,
                trace_depth: depth,
                seed: seed.unwrap_or_else(rand::random),
                aril,
                continue_on_violation,
                check_deadlock: !no_deadlock,
                coverage,
                progress_interval: Duration::from_secs(progress_interval),
                coverage_interval: Duration::from_secs(coverage_interval),
                trace_output,
                progress: None,
            };
            cmd_run(&model, &constant, config, eventually.as_deref(), json)
        }
        Commands::List => {
            cmd_list();
            Ok(0)
        }
    };

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(1);
        }
    }
}

fn cmd_list() {
    for info in models::MODELS {
        let consts = info
            .constants
            .iter()
            .map(|(name, default)| format!("{}={}", name, default))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{:<14} {}  [{}]", info.name, info.description, consts);
    }
}

/// Run a simulation; returns the process exit code.
fn cmd_run(
    model_name: &str,
    constants: &[String],
    config: SimConfig,
    eventually: Option<&str>,
    json: bool,
) -> CliResult<i32> {
    let info = models::find(model_name).ok_or_else(|| CliError::UnknownModel {
        name: model_name.to_string(),
    })?;
    let consts = models::parse_constants(info, constants)?;
    let model = models::build(info, &consts)?;
    let var_names = model.var_names().to_vec();

    info!(model = info.name, "simulating...");
    let start = Instant::now();
    let mut sim = match eventually {
        Some(goal) => {
            let liveness = eventually_check(goal, &var_names)?;
            Simulator::with_liveness(model, config, liveness)
        }
        None => Simulator::new(model, config),
    };
    let report = match sim.run() {
        Ok(report) => report,
        Err(e) => {
            let summary = sim.summary();
            println!();
            println!("Result: ERROR");
            println!("  States generated: {}", summary.states_generated);
            println!("  Behaviors: {}", summary.traces);
            println!("  Seed: {}  Aril: {}", summary.seed, summary.aril);
            return Err(e.into());
        }
    };
    let elapsed = start.elapsed();

    if json {
        print_json(&report, &var_names)?;
    } else {
        print_report(&report, &var_names, elapsed);
    }

    Ok(match report.termination {
        Termination::Completed if report.violations.is_empty() => 0,
        Termination::Cancelled => 2,
        _ => 1,
    })
}

/// Liveness check requiring `NAME=VALUE` to hold somewhere in every behavior.
fn eventually_check(
    goal: &str,
    var_names: &[String],
) -> CliResult<impl FnMut(&[State]) -> Result<(), LivenessViolation>> {
    let (name, value) = goal.split_once('=').ok_or_else(|| CliError::Other {
        message: format!("invalid property '{}', expected NAME=VALUE", goal),
    })?;
    let name = name.trim().to_string();
    let idx = var_names
        .iter()
        .position(|v| *v == name)
        .ok_or_else(|| CliError::Other {
            message: format!("unknown variable '{}'", name),
        })?;
    let value: i64 = value.trim().parse().map_err(|_| CliError::Other {
        message: format!("cannot parse value '{}'", value.trim()),
    })?;
    let target = Value::int(value);

    Ok(move |trace: &[State]| {
        if trace.iter().any(|s| s.vars[idx] == target) {
            Ok(())
        } else {
            Err(LivenessViolation {
                property: format!("<>({} = {})", name, value),
                message: format!("behavior of {} states never satisfies it", trace.len()),
            })
        }
    })
}

fn print_report(report: &SimulationReport, var_names: &[String], elapsed: Duration) {
    let summary = &report.summary;
    println!();
    match &report.termination {
        Termination::Completed if report.violations.is_empty() => println!("Result: OK"),
        Termination::Completed | Termination::Violation => {
            println!("Result: VIOLATION ({} found)", report.violations.len());
            for violation in &report.violations {
                print_violation(violation, var_names);
            }
        }
        Termination::Liveness(v) => {
            println!("Result: TEMPORAL PROPERTY VIOLATION");
            println!("  {}", v);
            for violation in &report.violations {
                print_violation(violation, var_names);
            }
        }
        Termination::Cancelled => println!("Result: CANCELLED"),
    }
    println!("  States generated: {}", summary.states_generated);
    println!("  Behaviors: {}", summary.traces);
    println!("  Seed: {}  Aril: {}", summary.seed, summary.aril);
    println!("  Time: {:.2}s", elapsed.as_secs_f64());
    if elapsed.as_secs_f64() > 0.0 {
        println!(
            "  States/sec: {:.0}",
            summary.states_generated as f64 / elapsed.as_secs_f64()
        );
    }
    if let Some(coverage) = &report.coverage {
        println!("  Coverage:");
        for entry in coverage {
            println!("    {}: {}", entry.location, entry.count);
        }
    }
}

fn print_violation(violation: &Violation, var_names: &[String]) {
    println!(
        "  {} (behavior {}, aril {})",
        violation.kind, violation.trace_num, violation.aril
    );
    println!("  Trace ({} states):", violation.trace.len());
    for (i, state) in violation.trace.iter().enumerate() {
        println!("    {}: {}", i, format_state_with_names(state, var_names));
    }
}

fn print_json(report: &SimulationReport, var_names: &[String]) -> CliResult<()> {
    let violations: Vec<_> = report
        .violations
        .iter()
        .map(|v| {
            serde_json::json!({
                "kind": v.kind.to_string(),
                "behavior": v.trace_num,
                "aril": v.aril,
                "trace": v.trace
                    .iter()
                    .map(|s| format_state_with_names(s, var_names))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    let termination = match &report.termination {
        Termination::Completed => "completed".to_string(),
        Termination::Violation => "violation".to_string(),
        Termination::Liveness(v) => v.to_string(),
        Termination::Cancelled => "cancelled".to_string(),
    };
    let out = serde_json::json!({
        "ok": report.is_ok(),
        "termination": termination,
        "summary": report.summary,
        "violations": violations,
        "coverage": report.coverage,
    });
    let text = serde_json::to_string_pretty(&out).map_err(|e| CliError::Other {
        message: e.to_string(),
    })?;
    println!("{}", text);
    Ok(())
}

/// Format a state with variable names for readable trace output.
fn format_state_with_names(state: &State, var_names: &[String]) -> String {
    state
        .vars
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let name = var_names.get(i).map(|s| s.as_str()).unwrap_or("?");
            format!("{}={}", name, v)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
