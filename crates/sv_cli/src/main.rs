// crates/sv_cli/src/main.rs
//
// Wires up exit codes, logging, CLI parsing and the two subcommands:
// `validate` (report the first or every format violation) and `score`
// (validate a concept submission, then print its F1 scores).

#![forbid(unsafe_code)]

mod args; // sibling module in this crate

mod exitcodes {
    /// Submission is valid (or was scored).
    pub const OK: i32 = 0;
    /// Submission violates the format; the message is on stdout.
    pub const FORMAT: i32 = 1;
    /// Validation could not run (bad flags, missing files, unreadable ground truth).
    pub const INTERNAL: i32 = 1;
}

use std::process::ExitCode;

use anyhow::Context;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Command, ScorePlan, ValidatePlan};
use sv_pipeline::{run_scoring, run_validation, ScoreRequest, ValidationRequest};
use sv_report::{build_model, render_score_text, render_text, ReportModel};

fn main() -> ExitCode {
    let cli = match parse_cli() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("subcheck: error: {e}");
            return ExitCode::from(exitcodes::INTERNAL as u8);
        }
    };
    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Command::Validate(a) => a.resolve().map_err(anyhow::Error::from).and_then(|plan| validate(&plan, cli.verbose > 0)),
        Command::Score(a) => a.resolve().map_err(anyhow::Error::from).and_then(|plan| score(&plan)),
    };

    let rc = match result {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("subcheck: error: {e:?}");
            exitcodes::INTERNAL
        }
    };
    ExitCode::from(rc as u8)
}

/// `RUST_LOG` unless overridden by `-v` / `--quiet`; always to stderr.
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = match (quiet, verbose) {
        (true, _) => EnvFilter::new("error"),
        (false, 0) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        (false, 1) => EnvFilter::new("debug"),
        (false, _) => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn validate(plan: &ValidatePlan, summary: bool) -> anyhow::Result<i32> {
    debug!(?plan, "resolved validate plan");
    let req = ValidationRequest {
        schema: plan.schema,
        submission: plan.submission.clone(),
        ground_truth: plan.ground_truth.clone(),
        mode: plan.mode,
    };
    let run = run_validation(&req).with_context(|| format!("validating {}", plan.submission.display()))?;
    let model = build_model(&run, plan.split, plan.mode);
    print!("{}", render_text(&model, summary));

    if let Some(path) = &plan.report {
        write_report(&model, path)?;
    }
    Ok(if run.is_valid() { exitcodes::OK } else { exitcodes::FORMAT })
}

fn score(plan: &ScorePlan) -> anyhow::Result<i32> {
    debug!(?plan, "resolved score plan");
    let req = ScoreRequest {
        submission: plan.submission.clone(),
        primary_ground_truth: plan.primary_gt.clone(),
        secondary_ground_truth: plan.secondary_gt.clone(),
    };
    let run = run_scoring(&req).with_context(|| format!("scoring {}", plan.submission.display()))?;
    print!("{}", render_score_text(&run));
    Ok(if run.outcome.is_valid() { exitcodes::OK } else { exitcodes::FORMAT })
}

// Always accept the concrete model type; gate body by feature.
fn write_report(model: &ReportModel, path: &std::path::Path) -> anyhow::Result<()> {
    #[cfg(feature = "report-json")]
    {
        let bytes = sv_report::render_json(model).context("rendering report")?;
        sv_io::canonical_json::write_bytes_atomic(&bytes, path)
            .with_context(|| format!("writing report {}", path.display()))?;
        debug!(path = %path.display(), "report written");
        Ok(())
    }
    #[cfg(not(feature = "report-json"))]
    {
        let _ = model;
        anyhow::bail!("json report not enabled (build with feature `report-json`): {}", path.display())
    }
}
