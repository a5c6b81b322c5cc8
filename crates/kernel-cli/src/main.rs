use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use contracts::{check_engine_version, RunConfig, VersionCompatibility, CANONICAL_SCENARIO_ID};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "kernel-cli",
    version,
    about = "Run the admission kernel and export or inspect its trace artifact"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario to completion and write the artifact JSON
    Simulate {
        #[arg(long, default_value = CANONICAL_SCENARIO_ID)]
        scenario_id: String,

        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        seed: i64,

        #[arg(long, env = "KERNEL_ARTIFACT_OUT", default_value = "artifacts/run.json")]
        out: PathBuf,
    },
    /// Summarize and validate a previously exported artifact
    Inspect {
        path: PathBuf,

        /// Print the summary as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Simulate {
            scenario_id,
            seed,
            out,
        } => simulate(RunConfig::new(scenario_id, seed), &out),
        Command::Inspect { path, json } => inspect(&path, json),
    };
    if let Err(err) = outcome {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn simulate(config: RunConfig, out: &Path) -> Result<()> {
    let artifact = kernel_core::run(&config)?;
    let text = kernel_core::to_json(&artifact)?;

    if let Some(dir) = out.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    }
    fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))?;

    println!(
        "wrote {} (replay_id={})",
        out.display(),
        artifact.metadata.replay_id
    );
    Ok(())
}

fn inspect(path: &Path, json: bool) -> Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let artifact = kernel_core::from_json(&text)
        .with_context(|| format!("failed to decode artifact {}", path.display()))?;

    if let advisory @ VersionCompatibility::Advisory { .. } =
        check_engine_version(&artifact.metadata)
    {
        warn!("{advisory}");
    }

    let summary = kernel_core::summarize(&artifact);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }

    let violations = kernel_core::validate_trace(&artifact);
    for violation in &violations {
        eprintln!("violation: {violation}");
    }
    if !violations.is_empty() {
        bail!("{} trace violation(s) in {}", violations.len(), path.display());
    }
    Ok(())
}
