//! merlint CLI - diagram linter with auto-fix

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use merlint::codes;
use merlint::config::{ColorMode, Config, OutputFormat};
use merlint::engine::{summarize, Engine};
use merlint::fix::{FixLevel, FixRegistry};
use merlint::fixer::{FixMode, FixResult, Fixer};
use merlint::output::{formatter_for, OutputFormatter};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "merlint",
    version,
    about = "Diagram Linter",
    long_about = "Lint and auto-fix flowchart, pie and sequence diagram sources."
)]
struct Cli {
    /// Files, directories or glob patterns to lint
    files: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Report style checks as errors
    #[arg(long)]
    strict: bool,

    /// Auto-fix issues where possible (dry-run by default, use with --write to apply)
    #[arg(long)]
    fix: bool,

    /// Write fixes to files (requires --fix)
    #[arg(long, requires = "fix")]
    write: bool,

    /// Which fixes to apply
    #[arg(long, value_enum)]
    level: Option<Level>,

    /// Show diff of changes instead of applying fixes
    #[arg(long, conflicts_with = "write")]
    diff: bool,

    /// Disable specific codes (comma-separated)
    #[arg(long, value_delimiter = ',')]
    disable: Option<Vec<String>>,

    /// Ignore codes by prefix (e.g., 'PIE_' ignores all pie codes)
    #[arg(long, value_delimiter = ',')]
    ignore: Option<Vec<String>>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// List diagnostic codes and exit
    #[arg(long)]
    list_codes: bool,

    /// Exit with 0 even if problems are found
    #[arg(long)]
    exit_zero: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Compact,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::Compact => OutputFormat::Compact,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Level {
    Safe,
    All,
}

impl From<Level> for FixLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Safe => FixLevel::Safe,
            Level::All => FixLevel::All,
        }
    }
}

fn list_codes() {
    let registry = FixRegistry::builtin();
    println!("{}", "Diagnostic codes".bold());
    println!();
    for &(code, description) in codes::ALL {
        let fix = match registry.get(code) {
            Some(strategy) => {
                format!("fix: {}, {}", strategy.describe(), strategy.min_level()).green()
            }
            None => "no fix".normal(),
        };
        println!("  {} [{}]", format!("{:<28}", code).cyan(), fix);
        println!("      {}", description);
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_default().context("Failed to load config")?,
    };

    config.merge_cli(
        cli.format.map(OutputFormat::from),
        cli.strict,
        cli.level.map(FixLevel::from),
        cli.jobs,
        cli.disable.clone().unwrap_or_default(),
        cli.ignore.clone().unwrap_or_default(),
    );
    Ok(config)
}

fn use_color(cli: &Cli, config: &Config) -> bool {
    if cli.no_color {
        return false;
    }
    match config.output.color {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal(),
    }
}

fn report_fixes(fixer: &Fixer, result: &FixResult, formatter: &dyn OutputFormatter) {
    if fixer.mode() == FixMode::Diff {
        print!("{}", fixer.format_diffs(result));
    }

    for file in &result.files {
        for diag in &file.remaining {
            println!("{}", formatter.format_diagnostic(&file.path, diag).trim_end());
        }
    }

    let verb = if fixer.is_dry_run() { "Would fix" } else { "Fixed" };
    eprintln!(
        "{} {} file(s) with {} edit(s); {} remaining",
        verb,
        result.files_modified,
        result.edits_applied,
        summarize(result.remaining_errors, result.remaining_warnings)
    );
    for error in &result.errors {
        eprintln!("{}: {}", "error".red().bold(), error);
    }
}

fn run(cli: Cli) -> Result<i32> {
    if cli.list_codes {
        list_codes();
        return Ok(0);
    }

    let config = load_config(&cli)?;
    let colored = use_color(&cli, &config);
    colored::control::set_override(colored);

    let engine = Engine::new(config);
    let files = engine.discover_files(&cli.files)?;
    if files.is_empty() {
        bail!("No input files");
    }
    log::info!("Linting {} file(s)", files.len());

    let formatter = formatter_for(engine.config().output.format, colored);

    if cli.fix || cli.diff {
        let mode = if cli.diff {
            FixMode::Diff
        } else if cli.write {
            FixMode::Write
        } else {
            FixMode::DryRun
        };
        let fixer = Fixer::new(&engine).with_mode(mode);
        let result = fixer.fix_files(&files);
        report_fixes(&fixer, &result, formatter.as_ref());
        return Ok(result.exit_code());
    }

    let result = engine.lint(&files);
    print!("{}", formatter.format(&result));
    if engine.config().output.format == OutputFormat::Json {
        println!();
    }
    Ok(result.exit_code())
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let exit_zero = cli.exit_zero;
    let code = match run(cli) {
        Ok(_) if exit_zero => 0,
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            2
        }
    };

    std::process::exit(code);
}
