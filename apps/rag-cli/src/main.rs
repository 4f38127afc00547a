use clap::{Parser, Subcommand};
use rag_app::{
    AppResult, DetectionReport, RunReport, Session, Severity, StepReport, load_scenario, to_json,
};
use rag_detect::DeadlockNotice;
use rag_graph::AllocationSummary;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rag-cli")]
#[command(about = "Resource allocation graph simulator - deadlock detection for processes and resources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and structure
    Validate {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
    },
    /// Apply a scenario and report every step
    Run {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply a scenario and report the final deadlock status
    Detect {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply a scenario and print the process and resource tables
    Summary {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Print the tables as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run {
            scenario_path,
            json,
        } => cmd_run(&scenario_path, json),
        Commands::Detect {
            scenario_path,
            json,
        } => cmd_detect(&scenario_path, json),
        Commands::Summary {
            scenario_path,
            json,
        } => cmd_summary(&scenario_path, json),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = load_scenario(scenario_path)?;
    println!("✓ Scenario is valid");
    println!(
        "  {} processes, {} resources, {} steps",
        scenario.processes.len(),
        scenario.resources.len(),
        scenario.steps.len()
    );
    Ok(())
}

fn run_scenario(scenario_path: &Path) -> AppResult<RunReport> {
    debug!(path = %scenario_path.display(), "loading scenario");
    let scenario = load_scenario(scenario_path)?;
    Session::run(&scenario)
}

fn cmd_run(scenario_path: &Path, json: bool) -> AppResult<()> {
    let report = run_scenario(scenario_path)?;
    if json {
        println!("{}", to_json(&report)?);
        return Ok(());
    }

    if let Some(name) = &report.name {
        println!("Scenario: {name}");
    }
    for step in &report.steps {
        print_step(step);
        if let Some(notice) = &step.notice {
            print_notice(notice);
        }
    }
    println!();
    print_detection(&report.detection);
    println!();
    print_summary(&report.summary);
    Ok(())
}

fn cmd_detect(scenario_path: &Path, json: bool) -> AppResult<()> {
    let report = run_scenario(scenario_path)?;
    if json {
        println!("{}", to_json(&report.detection)?);
    } else {
        print_detection(&report.detection);
    }
    Ok(())
}

fn cmd_summary(scenario_path: &Path, json: bool) -> AppResult<()> {
    let report = run_scenario(scenario_path)?;
    if json {
        println!("{}", to_json(&report.summary)?);
    } else {
        print_summary(&report.summary);
    }
    Ok(())
}

fn print_step(step: &StepReport) {
    let marker = match step.outcome.severity {
        Severity::Success => "✓",
        Severity::Warning => "!",
        Severity::Error => "✗",
    };
    println!(
        "{marker} {:>3}. {:<32} {}",
        step.index,
        step.step.to_string(),
        step.outcome.message
    );
}

fn print_notice(notice: &DeadlockNotice) {
    println!();
    println!("  Deadlock detected (episode {}): {}", notice.episode, notice.cycle);
    for line in notice.explanation.to_string().lines() {
        println!("    {line}");
    }
    println!();
}

fn print_detection(detection: &DetectionReport) {
    match (&detection.deadlock, &detection.explanation) {
        (Some(cycle), Some(explanation)) => {
            println!("Deadlock found: {cycle}");
            println!();
            print!("{explanation}");
        }
        (Some(cycle), None) => println!("Deadlock found: {cycle}"),
        (None, _) => println!("No deadlock detected."),
    }
}

fn print_summary(summary: &AllocationSummary) {
    if summary.processes.is_empty() && summary.resources.is_empty() {
        println!("Graph is empty. Add processes and resources first.");
        return;
    }

    println!(
        "{:<12} {:<24} {:<24} {}",
        "Process", "Allocated Resources", "Requested Resources", "State"
    );
    for row in &summary.processes {
        println!(
            "{:<12} {:<24} {:<24} {}",
            row.name,
            join_or_none(&row.allocated),
            join_or_none(&row.requested),
            row.status
        );
    }

    println!();
    println!("{:<12} {:<16} {}", "Resource", "Allocated/Total", "State");
    for row in &summary.resources {
        println!("{:<12} {:<16} {}", row.name, row.usage(), row.status);
    }
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}
