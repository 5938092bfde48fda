use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use stylefix::{
    atomic_write, catalog, check_source, discover, fix_source, init_tracing, Config, Diagnostic,
    FileReport, Outcome, RuleSettings,
};
use tracing::debug;
use walkdir::WalkDir;

/// Extension of the files picked up when walking directories.
const SOURCE_EXTENSION: &str = "php";

#[derive(Parser)]
#[command(name = "stylefix")]
#[command(about = "Token-level style checker with automatic fixes", long_about = None)]
#[command(version)]
struct Cli {
    /// Log engine decisions to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report style violations
    Check {
        /// Files or directories to check
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Configuration file (otherwise stylefix.toml, then ~/.stylefix.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Fix violations in place
    Fix {
        /// Files or directories to fix
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Configuration file (otherwise stylefix.toml, then ~/.stylefix.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List available rules
    Rules,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct FileEntry<'a> {
    path: String,
    #[serde(flatten)]
    report: &'a FileReport,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check {
            paths,
            config,
            format,
        } => cmd_check(&paths, config, format),

        Commands::Fix {
            paths,
            dry_run,
            diff,
            config,
        } => cmd_fix(&paths, dry_run, diff, config),

        Commands::Rules => cmd_rules(),
    }
}

/// Load the configuration from `--config`, the working directory or home.
fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    let cwd = env::current_dir()?;
    let (config, source) = discover(explicit.as_deref(), &cwd)?;
    match source {
        Some(path) => debug!(path = %path.display(), "configuration loaded"),
        None => debug!("no configuration file, using defaults"),
    }
    Ok(config)
}

/// Expand `paths` into the source files to process, sorted.
///
/// Files given explicitly are taken whatever their extension; directories
/// are walked for `.php` files, skipping hidden entries.
fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.exists() {
            anyhow::bail!("Path does not exist: {}", path.display());
        }

        let walker = WalkDir::new(path).into_iter().filter_entry(|entry| {
            entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
        });
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|s| s.to_str()) == Some(SOURCE_EXTENSION)
            {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn print_diagnostic(file: &Path, diagnostic: &Diagnostic) {
    let location = format!("{}:{}:{}", file.display(), diagnostic.line, diagnostic.column);
    let (marker, suffix) = match diagnostic.outcome {
        Outcome::Fixed => ("✓".green(), " (fixed)".dimmed()),
        Outcome::InternalError => ("!".magenta(), " (internal)".dimmed()),
        Outcome::ReportedOnly if diagnostic.fixable => ("✗".red(), " (fixable)".dimmed()),
        Outcome::ReportedOnly => ("✗".red(), "".normal()),
    };
    println!(
        "{} {} {} {}{}",
        marker,
        location,
        diagnostic.rule.cyan(),
        diagnostic.message,
        suffix
    );
}

fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (fixed)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_check(paths: &[PathBuf], config: Option<PathBuf>, format: Format) -> Result<()> {
    let config = load_config(config)?;
    let files = collect_files(paths)?;

    let mut reports = Vec::new();
    let mut total_failed = 0;
    for file in &files {
        let source = match fs::read_to_string(file) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                total_failed += 1;
                continue;
            }
        };
        match check_source(&source, &config) {
            Ok(report) => reports.push((file, report)),
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                total_failed += 1;
            }
        }
    }

    let total_violations: usize = reports.iter().map(|(_, r)| r.violations().count()).sum();
    let total_fixable: usize = reports.iter().map(|(_, r)| r.fixable_count()).sum();
    let total_internal: usize = reports.iter().map(|(_, r)| r.internal_errors().count()).sum();

    match format {
        Format::Json => {
            let entries: Vec<FileEntry> = reports
                .iter()
                .map(|(file, report)| FileEntry {
                    path: file.display().to_string(),
                    report,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Format::Text => {
            for (file, report) in &reports {
                for diagnostic in &report.diagnostics {
                    print_diagnostic(file, diagnostic);
                }
            }

            println!();
            println!("{}", "Summary:".bold());
            println!("  {} files checked", files.len());
            println!("  {} violations", format!("{}", total_violations).red());
            println!("  {} fixable", format!("{}", total_fixable).yellow());
            println!("  {} internal errors", format!("{}", total_internal).magenta());
            println!("  {} failed", format!("{}", total_failed).red());
        }
    }

    if total_violations + total_internal + total_failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_fix(paths: &[PathBuf], dry_run: bool, show_diff: bool, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let files = collect_files(paths)?;

    if dry_run {
        println!("{}", "[DRY RUN - files are left untouched]".cyan());
    }

    let mut total_files_fixed = 0;
    let mut total_fixes = 0;
    let mut total_remaining = 0;
    let mut total_internal = 0;
    let mut total_failed = 0;

    for file in &files {
        let source = match fs::read_to_string(file) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                total_failed += 1;
                continue;
            }
        };
        let outcome = match fix_source(&source, &config) {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                total_failed += 1;
                continue;
            }
        };

        if outcome.is_changed(&source) {
            if !dry_run {
                if let Err(e) = atomic_write(file, outcome.text.as_bytes()) {
                    eprintln!("{} {}: Write failed - {}", "✗".red(), file.display(), e);
                    total_failed += 1;
                    continue;
                }
            }
            let verb = if dry_run { "Would apply" } else { "Applied" };
            println!(
                "{} {}: {} {} fixes in {} passes",
                "✓".green(),
                file.display(),
                verb,
                outcome.fixes_applied,
                outcome.passes
            );
            total_files_fixed += 1;
            total_fixes += outcome.fixes_applied;

            if show_diff {
                display_diff(file, &source, &outcome.text);
            }
        }

        for diagnostic in &outcome.report.diagnostics {
            print_diagnostic(file, diagnostic);
        }
        total_remaining += outcome.report.violations().count();
        total_internal += outcome.report.internal_errors().count();
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} files fixed", format!("{}", total_files_fixed).green());
    println!("  {} fixes applied", format!("{}", total_fixes).green());
    println!("  {} remaining", format!("{}", total_remaining).yellow());
    println!("  {} internal errors", format!("{}", total_internal).magenta());
    println!("  {} failed", format!("{}", total_failed).red());

    if total_remaining + total_internal + total_failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_rules() -> Result<()> {
    for rule in catalog(&RuleSettings::default()) {
        let mode = if rule.fixable() {
            "fix".green()
        } else {
            "report".yellow()
        };
        println!("{:<42} {:<7} {}", rule.code().cyan(), mode, rule.description());

        let kinds: Vec<String> = rule
            .interested_kinds()
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("    {}", format!("on: {}", kinds.join(", ")).dimmed());
    }
    Ok(())
}
