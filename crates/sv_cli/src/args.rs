// crates/sv_cli/src/args.rs
//
// Offline CLI argument surface (types, merging with an optional manifest,
// path checks, normalization).
//
// Rules:
// - No networked paths (reject any scheme:// like http/https/file)
// - `--ground-truth` and `--manifest` are mutually exclusive
// - Flags win over manifest values; manifest values win over defaults
// - Default ground truth comes from `<data-root>/<dataset>/...`

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use clap::{ArgAction, Args, Parser, Subcommand};
use sv_core::schema::{Split, SubmissionSchema};
use sv_io::layout::{default_ground_truth, DEFAULT_DATA_ROOT};
use sv_io::manifest::{load_manifest, ResolvedManifest};
use sv_pipeline::Mode;

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "subcheck",
    version,
    disable_help_subcommand = true,
    about = "Offline validator for image captioning and concept detection submissions"
)]
pub struct Cli {
    /// Raise log verbosity on stderr (-v debug, -vv trace). Overrides RUST_LOG.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors on stderr.
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Check a submission file against the ground-truth ID order.
    Validate(ValidateArgs),
    /// Validate a concept submission, then print its F1 scores.
    Score(ScoreArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ValidateArgs {
    /// Submission layout: caption | concept.
    #[arg(long)]
    pub schema: Option<SubmissionSchema>,

    /// Submission CSV path.
    #[arg(long)]
    pub submission: Option<PathBuf>,

    /// Dataset split used for the default ground-truth paths [default: valid].
    #[arg(long)]
    pub dataset: Option<Split>,

    /// Directory holding `<split>/captions.csv` etc. [default: data].
    #[arg(long)]
    pub data_root: Option<PathBuf>,

    /// Explicit ground-truth file(s), in priority order.
    #[arg(long = "ground-truth", action = ArgAction::Append, conflicts_with = "manifest")]
    pub ground_truth: Vec<PathBuf>,

    /// JSON manifest naming schema, split, data root, ground truth, submission.
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Report every violation instead of stopping at the first.
    #[arg(long)]
    pub all_errors: bool,

    /// Write a canonical JSON report to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ScoreArgs {
    /// Concept submission CSV path.
    #[arg(long)]
    pub submission: PathBuf,

    /// Dataset split used for the default ground-truth paths.
    #[arg(long, default_value = "valid")]
    pub dataset: Split,

    /// Directory holding `<split>/concepts.csv` and `<split>/concepts_manual.csv`.
    #[arg(long, default_value = DEFAULT_DATA_ROOT)]
    pub data_root: PathBuf,

    /// Primary ground truth [default: <data-root>/<dataset>/concepts.csv].
    #[arg(long)]
    pub primary_gt: Option<PathBuf>,

    /// Secondary ground truth [default: <data-root>/<dataset>/concepts_manual.csv].
    #[arg(long)]
    pub secondary_gt: Option<PathBuf>,
}

/// Fully resolved `validate` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatePlan {
    pub schema: SubmissionSchema,
    /// `None` when ground truth was named explicitly.
    pub split: Option<Split>,
    pub submission: PathBuf,
    pub ground_truth: Vec<PathBuf>,
    pub mode: Mode,
    pub report: Option<PathBuf>,
}

/// Fully resolved `score` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorePlan {
    pub submission: PathBuf,
    pub primary_gt: PathBuf,
    pub secondary_gt: PathBuf,
}

/// Errors surfaced by argument parsing/validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    Missing(&'static str),
    NonLocalPath(String),
    NotFound(String),
    Manifest(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            Missing(s) => write!(f, "missing required flag: {s} (or set it in --manifest)"),
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
            Manifest(m) => write!(f, "manifest: {m}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

/// Ensure a provided path string is local (no scheme); path existence is checked later.
#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

/// Ensure a path is local (no scheme) and exists as a regular file.
fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Best-effort normalization to an absolute path.
/// If canonicalize fails (e.g., path doesn't exist yet), produce an absolute path relative to CWD.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Cli, CliError> {
    let cli = Cli::parse();
    match &cli.command {
        Command::Validate(a) => {
            let paths = [a.submission.as_deref(), a.data_root.as_deref(), a.manifest.as_deref(), a.report.as_deref()];
            for p in paths.into_iter().flatten().chain(a.ground_truth.iter().map(PathBuf::as_path)) {
                ensure_local_path(p)?;
            }
        }
        Command::Score(a) => {
            let paths = [Some(a.submission.as_path()), Some(a.data_root.as_path()), a.primary_gt.as_deref(), a.secondary_gt.as_deref()];
            for p in paths.into_iter().flatten() {
                ensure_local_path(p)?;
            }
        }
    }
    Ok(cli)
}

impl ValidateArgs {
    /// Merge flags with the manifest (if any) and the default layout.
    pub fn resolve(&self) -> Result<ValidatePlan, CliError> {
        let manifest = match &self.manifest {
            Some(p) => {
                ensure_local_exists(p, "--manifest")?;
                load_manifest(p).map_err(|e| CliError::Manifest(e.to_string()))?
            }
            None => ResolvedManifest::default(),
        };
        self.merge(manifest)
    }

    fn merge(&self, man: ResolvedManifest) -> Result<ValidatePlan, CliError> {
        let schema = self.schema.or(man.schema).ok_or(CliError::Missing("--schema"))?;
        let submission = self
            .submission
            .clone()
            .or(man.submission)
            .ok_or(CliError::Missing("--submission"))?;
        ensure_local_exists(&submission, "--submission")?;

        let explicit_gt = if self.ground_truth.is_empty() { man.ground_truth } else { Some(self.ground_truth.clone()) };
        let (split, ground_truth) = match explicit_gt {
            Some(paths) => (None, paths),
            None => {
                let split = self.dataset.or(man.split).unwrap_or_default();
                let root = self
                    .data_root
                    .clone()
                    .or(man.data_root)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_ROOT));
                (Some(split), default_ground_truth(schema, split, &root))
            }
        };
        for p in &ground_truth {
            ensure_local_path(p)?;
        }

        Ok(ValidatePlan {
            schema,
            split,
            submission: normalize_path(&submission),
            ground_truth,
            mode: if self.all_errors { Mode::Collect } else { Mode::FailFast },
            report: self.report.clone(),
        })
    }
}

impl ScoreArgs {
    pub fn resolve(&self) -> Result<ScorePlan, CliError> {
        ensure_local_exists(&self.submission, "--submission")?;
        let defaults = default_ground_truth(SubmissionSchema::Concept, self.dataset, &self.data_root);
        let pick = |flag: &Option<PathBuf>, idx: usize| -> Result<PathBuf, CliError> {
            flag.clone()
                .or_else(|| defaults.get(idx).cloned())
                .ok_or(CliError::Missing("--primary-gt/--secondary-gt"))
        };
        Ok(ScorePlan {
            submission: normalize_path(&self.submission),
            primary_gt: pick(&self.primary_gt, 0)?,
            secondary_gt: pick(&self.secondary_gt, 1)?,
        })
    }
}
