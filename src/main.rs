// src/main.rs

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use strum::IntoEnumIterator;
use tracing::Level;
use winplan::{
    plans::{self, Plan},
    report::{ActionOutcome, Report},
    runner::PlanRunner,
};

#[derive(Parser)]
#[command(
    name = "winplan",
    version,
    about = "Declarative, idempotent Windows configuration applier"
)]
struct Cli {
    /// Verbose diagnostics.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in plans.
    List,
    /// Survey which actions would run, without changing anything.
    Check {
        /// Plan names, as shown by `list`.
        #[arg(required = true)]
        plans: Vec<String>,
    },
    /// Execute plans in the given order.
    Run {
        /// Plan names, as shown by `list`.
        #[arg(required = true)]
        plans: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_target(false)
        .init();

    match cli.command {
        Commands::List => list_plans(),
        Commands::Check { plans: names } => match resolve(&names) {
            Ok(resolved) => check_plans(&resolved),
            Err(code) => code,
        },
        Commands::Run { plans: names } => match resolve(&names) {
            Ok(resolved) => run_plans(&resolved),
            Err(code) => code,
        },
    }
}

fn list_plans() -> ExitCode {
    for (name, factory) in plans::builtin_plans() {
        let plan = factory();
        println!("{:<24} {}", name, plan.description());
    }
    ExitCode::SUCCESS
}

fn resolve(names: &[String]) -> Result<Vec<Plan>, ExitCode> {
    let mut resolved = Vec::new();
    for name in names {
        match plans::find(name) {
            Some(plan) => resolved.push(plan),
            None => {
                eprintln!("unknown plan '{}'; `winplan list` shows what is available", name);
                return Err(ExitCode::from(2));
            }
        }
    }
    Ok(resolved)
}

fn check_plans(resolved: &[Plan]) -> ExitCode {
    #[cfg(windows)]
    if !winplan::utils::windows::is_elevated() {
        eprintln!("warning: not elevated, some probes may come up empty");
    }

    for plan in resolved {
        println!("{}: {}", plan.name(), plan.description());
        for action in plan.actions() {
            match action.is_satisfied() {
                Ok(true) => println!("  satisfied   {}", action.name()),
                Ok(false) => println!("  would run   {}", action.name()),
                Err(e) => println!("  probe error {} ({})", action.name(), e),
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_plans(resolved: &[Plan]) -> ExitCode {
    // Everything below mutates machine-wide state; refusing here is the
    // only path that exits without producing a report.
    #[cfg(windows)]
    if !winplan::utils::windows::is_elevated() {
        eprintln!("winplan must be run from an elevated shell");
        return ExitCode::from(2);
    }

    let runner = PlanRunner::new();
    let mut all_succeeded = true;
    for plan in resolved {
        let report = runner.execute(plan);
        render(&report);
        all_succeeded &= report.success();
    }

    if all_succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn render(report: &Report) {
    println!("{} [{}]", report.plan(), report.status());
    for record in report.records() {
        match &record.detail {
            Some(detail) => println!(
                "  {:<18} {} ({})",
                record.outcome.to_string(),
                record.action,
                detail
            ),
            None => println!("  {:<18} {}", record.outcome.to_string(), record.action),
        }
    }
    let summary = ActionOutcome::iter()
        .map(|outcome| format!("{} {}", report.count(outcome), outcome))
        .collect::<Vec<_>>()
        .join(", ");
    println!("  {}", summary);
}
