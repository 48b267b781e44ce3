use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use envguard_core::{
    EnvSnapshot, ValidateOptions, format_violations, render_env_example, render_markdown, validate,
};
use envguard_source::{LintPolicy, LoadedSchema, ProjectConfig, SchemaLocator, load_schema};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for `check`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CheckFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "envguard", version)]
#[command(about = "Validate environment variables against a schema and generate docs")]
struct Cli {
    /// Enable debug logging (RUST_LOG is honoured otherwise).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate ENVIRONMENT.md and .env.example from the schema.
    Generate(GenerateArgs),
    /// Validate the current environment against the schema.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Schema file (default: search the working directory).
    #[arg(short, long)]
    schema: Option<PathBuf>,
    /// Working directory for schema search and relative paths.
    #[arg(long)]
    cwd: Option<PathBuf>,
    /// Reject schemas with any lint issue, not just fatal ones.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// Markdown output file (default: ENVIRONMENT.md).
    #[arg(long)]
    docs_output: Option<PathBuf>,
    /// Example env output file (default: .env.example).
    #[arg(long)]
    example_output: Option<PathBuf>,
    /// Markdown document title.
    #[arg(long)]
    title: Option<String>,
    /// Include comment lines in the example file.
    #[arg(long, overrides_with = "no_comments")]
    comments: bool,
    /// Omit comment lines from the example file.
    #[arg(long, overrides_with = "comments")]
    no_comments: bool,
    /// Split the example file into Required and Optional sections.
    #[arg(long, overrides_with = "no_group_by_required")]
    group_by_required: bool,
    /// Keep the example file in declaration order.
    #[arg(long, overrides_with = "group_by_required")]
    no_group_by_required: bool,
    /// Do not write the Markdown document.
    #[arg(long)]
    skip_docs: bool,
    /// Do not write the example env file.
    #[arg(long)]
    skip_example: bool,
}

#[derive(Debug, Args)]
struct CheckArgs {
    #[command(flatten)]
    schema: SchemaArgs,
    /// Dotenv file layered over the environment (repeatable, later wins).
    #[arg(long = "env-file")]
    env_files: Vec<PathBuf>,
    /// Ignore the process environment; only use --env-file values.
    #[arg(long)]
    no_process_env: bool,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: CheckFormat,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ---------------------------------------------------------------------------
// Shared setup
// ---------------------------------------------------------------------------

/// Working directory plus the project config found in it.
struct Project {
    cwd: PathBuf,
    config: ProjectConfig,
}

impl Project {
    fn open(args: &SchemaArgs) -> Result<Self, String> {
        let cwd = match &args.cwd {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()
                .map_err(|err| format!("Failed to resolve working directory: {err}"))?,
        };
        let config = ProjectConfig::discover(&cwd)
            .map_err(|err| err.to_string())?
            .unwrap_or_default();
        debug!(cwd = %cwd.display(), ?config, "project opened");
        Ok(Self { cwd, config })
    }

    fn load_schema(&self, args: &SchemaArgs) -> Result<LoadedSchema, String> {
        let mut locator = SchemaLocator::new(&self.cwd);
        if let Some(path) = args.schema.as_ref().or(self.config.schema.as_ref()) {
            locator = locator.with_explicit(path);
        }
        let policy = if args.strict || self.config.strict {
            LintPolicy::Strict
        } else {
            LintPolicy::Permissive
        };
        load_schema(&locator, policy).map_err(|err| err.to_string())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.cwd.join(path)
    }
}

// ---------------------------------------------------------------------------
// generate command
// ---------------------------------------------------------------------------

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let project = Project::open(&args.schema)?;
    let loaded = project.load_schema(&args.schema)?;

    let mut markdown_options = project.config.markdown_options();
    if let Some(title) = args.title {
        markdown_options.title = title;
    }
    let mut example_options = project.config.env_example_options();
    if let Some(include) = flag_override(args.comments, args.no_comments) {
        example_options.include_comments = include;
    }
    if let Some(grouped) = flag_override(args.group_by_required, args.no_group_by_required) {
        example_options.group_by_required = grouped;
    }

    let mut artifacts = Vec::new();
    if !args.skip_docs {
        let path = project.resolve(
            &args
                .docs_output
                .unwrap_or_else(|| project.config.docs_output()),
        );
        artifacts.push((path, render_markdown(&loaded.schema, &markdown_options)));
    }
    if !args.skip_example {
        let path = project.resolve(
            &args
                .example_output
                .unwrap_or_else(|| project.config.example_output()),
        );
        artifacts.push((path, render_env_example(&loaded.schema, &example_options)));
    }

    for (path, _) in &artifacts {
        create_parent_dir(path)?;
    }
    for (path, contents) in &artifacts {
        fs::write(path, contents)
            .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
        println!("Generated {}", path.display());
    }

    Ok(())
}

/// `--flag` / `--no-flag` pair; `None` leaves the configured value.
fn flag_override(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn create_parent_dir(path: &Path) -> Result<(), String> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })
        }
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// check command
// ---------------------------------------------------------------------------

fn run_check(args: CheckArgs) -> Result<(), String> {
    let project = Project::open(&args.schema)?;
    let loaded = project.load_schema(&args.schema)?;

    let mut snapshot = if args.no_process_env {
        EnvSnapshot::new()
    } else {
        EnvSnapshot::from_process()
    };
    for file in &args.env_files {
        let path = project.resolve(file);
        let parsed = EnvSnapshot::from_dotenv_file(&path)
            .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
        debug!(path = %path.display(), variables = parsed.len(), "layered env file");
        snapshot.extend(parsed);
    }

    let outcome = validate(&loaded.schema, &snapshot, ValidateOptions::non_throwing())
        .map_err(|err| err.to_string())?;

    match args.format {
        CheckFormat::Text => {
            if outcome.valid {
                println!(
                    "✓ Environment is valid ({} variable(s) checked)",
                    loaded.schema.len()
                );
            } else {
                eprint!("{}", format_violations(&outcome.violations));
            }
        }
        CheckFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome)
                .map_err(|err| format!("Failed to serialize outcome: {err}"))?;
            println!("{json}");
        }
    }

    if !outcome.valid {
        return Err(format!(
            "{} environment variable(s) failed validation",
            outcome.violations.len()
        ));
    }
    Ok(())
}
