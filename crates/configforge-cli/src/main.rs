use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use configforge_core::{root_cause, Config, Diagnostic, Error, Report, Severity};
use configforge_data::{DataDb, LoadOptions};
use configforge_define::Db;
use configforge_engine::{CompiledDb, Pipeline, PipelineOutput, TypeCatalog};

/// configforge - compile spreadsheet config tables against a schema
#[derive(Parser)]
#[command(name = "configforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: configforge.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Complete the schema against the data, compile and verify everything
    Resolve {
        /// Also output markdown report
        #[arg(short, long)]
        markdown: Option<PathBuf>,

        /// Do not write the completed schema back
        #[arg(long)]
        dry_run: bool,
    },

    /// Compile and verify against the schema as written
    Check {
        /// Also output markdown report
        #[arg(short, long)]
        markdown: Option<PathBuf>,
    },

    /// Write per-consumer schema views
    Extract {
        /// Own tag to extract (default: every view in the config)
        #[arg(long)]
        own: Option<String>,

        /// Output file, required with --own
        #[arg(short, long, requires = "own")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("configforge.toml").exists() {
        Config::from_file(Path::new("configforge.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };
    tracing::debug!(root = %config.project_root.display(), "configuration loaded");

    let result = match cli.command {
        Commands::Resolve { markdown, dry_run } => resolve_command(&config, markdown.as_deref(), dry_run, cli.verbose),
        Commands::Check { markdown } => check_command(&config, markdown.as_deref(), cli.verbose),
        Commands::Extract { own, output } => extract_command(&config, own.as_deref(), output.as_deref(), cli.verbose),
    };

    if let Err(err) = &result {
        if let Some(err) = err.downcast_ref::<Error>() {
            print_fatal(err);
            std::process::exit(2);
        }
    }
    result
}

/// Load the raw data and the persisted schema
fn load_inputs(config: &Config, verbose: bool) -> Result<(DataDb, Db)> {
    let data_dir = config.resolve_path(&config.data.dir);
    if verbose {
        eprintln!("{} {}", "Loading data from:".cyan(), data_dir.display());
    }
    let data = DataDb::load(&data_dir, &LoadOptions::from(&config.data)).map_err(Error::from)?;

    let define_path = config.resolve_path(&config.define_file);
    if verbose {
        eprintln!("{} {}", "Loading schema from:".cyan(), define_path.display());
    }
    let db = Db::from_file(&define_path)?;
    Ok((data, db))
}

/// Resolve command - complete the schema and compile all tables
fn resolve_command(config: &Config, markdown: Option<&Path>, dry_run: bool, verbose: bool) -> Result<()> {
    let (data, mut db) = load_inputs(config, verbose)?;
    if verbose {
        eprintln!("{} {} table(s)", "Resolving".cyan(), data.len());
    }

    let mut diagnostics = Vec::new();
    let outcome = Pipeline::from_config(&config.data).run(&mut db, &TypeCatalog::default(), &data, &mut diagnostics);

    let mut report = build_report(config, diagnostics);
    let clean = match &outcome {
        Ok(output) => {
            fill_resolve_summary(&mut report, output);
            output.summary.failed.is_empty()
        }
        Err(_) => false,
    };

    // Failed tables are missing from `db`; saving would drop their metadata
    let define_path = config.resolve_path(&config.define_file);
    if clean && !dry_run {
        db.save_to_file(&define_path)?;
        if verbose {
            eprintln!("{} {}", "Schema saved to:".green(), define_path.display());
        }
    } else if !clean {
        eprintln!("{}", "Schema not saved: resolution was incomplete".yellow());
    }

    finish(config, &report, markdown, verbose, outcome.err())
}

/// Check command - compile against the schema without completing it
fn check_command(config: &Config, markdown: Option<&Path>, verbose: bool) -> Result<()> {
    let (data, db) = load_inputs(config, verbose)?;
    if verbose {
        eprintln!("{}", "Checking tables against the schema...".cyan());
    }

    let mut diagnostics = Vec::new();
    let outcome = Pipeline::from_config(&config.data).check(&db, &data, &mut diagnostics);

    let mut report = build_report(config, diagnostics);
    if let Ok((_, compiled)) = &outcome {
        fill_compile_summary(&mut report, compiled);
    }
    finish(config, &report, markdown, verbose, outcome.err())
}

/// Extract command - write schema views by own tag
fn extract_command(config: &Config, own: Option<&str>, output: Option<&Path>, verbose: bool) -> Result<()> {
    let define_path = config.resolve_path(&config.define_file);
    let db = Db::from_file(&define_path)?;

    let views: Vec<(String, PathBuf)> = match (own, output) {
        (Some(own), Some(output)) => vec![(own.to_string(), output.to_path_buf())],
        (Some(own), None) => {
            let view = config
                .views
                .iter()
                .find(|v| v.own == own)
                .with_context(|| format!("no view for own tag '{}' in config; pass --output", own))?;
            vec![(own.to_string(), config.resolve_path(&view.output))]
        }
        (None, _) => config
            .views
            .iter()
            .map(|v| (v.own.clone(), config.resolve_path(&v.output)))
            .collect(),
    };

    if views.is_empty() {
        eprintln!("{}", "No views configured, nothing to extract".yellow());
        return Ok(());
    }

    for (own, path) in views {
        tracing::info!(own = %own, output = %path.display(), "extracting view");
        let view = db.extract(&own);
        // a view must stand on its own
        TypeCatalog::resolve(&view)?;
        view.save_to_file(&path)?;
        if verbose {
            eprintln!(
                "{} {} ({} bean(s), {} table(s)) -> {}",
                "Extracted".green(),
                own,
                view.beans.len(),
                view.tables.len(),
                path.display()
            );
        }
    }
    Ok(())
}

/// Apply severity overrides and collect into a report
fn build_report(config: &Config, diagnostics: Vec<Diagnostic>) -> Report {
    let diagnostics = diagnostics
        .into_iter()
        .map(|mut diag| {
            diag.severity = config.severity.get_severity(diag.code, diag.severity);
            diag
        })
        .collect();
    Report::from_diagnostics(diagnostics)
}

fn fill_compile_summary(report: &mut Report, compiled: &CompiledDb) {
    report.summary.tables_compiled = compiled.tables.len();
    report.summary.tables_excluded = compiled.excluded.len();
}

/// Tables that failed resolution never reach compilation, so they count as
/// excluded too
fn fill_resolve_summary(report: &mut Report, output: &PipelineOutput) {
    fill_compile_summary(report, &output.compiled);
    report.summary.tables_excluded += output.summary.failed.len();
    report.summary.discovered = output.summary.discovered.clone();
    report.summary.deleted = output.summary.deleted.clone();
}

/// Save reports, print the summary and pick the exit status
fn finish(
    config: &Config,
    report: &Report,
    markdown: Option<&Path>,
    verbose: bool,
    fatal: Option<Error>,
) -> Result<()> {
    let report_path = config.resolve_path(&config.report_file);
    report.save_to_file(&report_path)?;
    if verbose {
        eprintln!("{} {}", "Report saved to:".green(), report_path.display());
    }

    if let Some(md_path) = markdown {
        std::fs::write(md_path, generate_markdown_report(report))?;
        if verbose {
            eprintln!("{} {}", "Markdown report saved to:".green(), md_path.display());
        }
    }

    print_report_summary(report);

    match fatal {
        // violations are already listed in the report
        Some(Error::ConstraintViolation(_)) => std::process::exit(1),
        Some(err) => Err(err.into()),
        None if report.has_errors() => std::process::exit(1),
        None => Ok(()),
    }
}

/// Print an aborting error with its deepest cause and a fix hint
fn print_fatal(err: &Error) {
    eprintln!("{} {}", "error:".red().bold(), err);
    let cause = root_cause(err);
    if cause != err.to_string() {
        eprintln!("  {} {}", "caused by:".bold(), cause);
    }
    if let Some(hint) = err.hint() {
        eprintln!("  {} {}", "hint:".cyan(), hint);
    }
}

/// Print report summary to stdout
fn print_report_summary(report: &Report) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Config Table Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Tables compiled: {}", report.summary.tables_compiled);
    if report.summary.tables_excluded > 0 {
        println!("  Tables excluded: {}", report.summary.tables_excluded.to_string().red().bold());
    }
    for name in &report.summary.discovered {
        println!("  {} {}", "+".green(), name);
    }
    for name in &report.summary.deleted {
        println!("  {} {}", "-".red(), name);
    }
    println!("  Total diagnostics: {}", report.summary.total);

    if report.summary.errors > 0 {
        println!("  Errors:   {}", report.summary.errors.to_string().red().bold());
    } else {
        println!("  Errors:   {}", report.summary.errors.to_string().green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", report.summary.warnings.to_string().yellow());
    } else {
        println!("  Warnings: {}", report.summary.warnings.to_string().green());
    }

    println!("  Info:     {}", report.summary.info);
    println!();

    if report.diagnostics.is_empty() {
        println!("{}", "✓ No issues found!".green().bold());
    } else {
        println!("{}", "Diagnostics:".bold());
        for diag in &report.diagnostics {
            let severity_str = match diag.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Warn => "WARN".yellow().bold(),
                Severity::Info => "INFO".cyan(),
            };

            println!("  [{}] {}: {}", severity_str, diag.code, diag.message);
            if let Some(loc) = &diag.location {
                println!("    at {}", loc);
            }
            if let Some(cause) = diag.cause.as_ref().filter(|c| **c != diag.message) {
                println!("    Cause: {}", cause);
            }
            if let Some(hint) = &diag.hint {
                println!("    Hint:  {}", hint);
            }
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

/// Generate markdown report
fn generate_markdown_report(report: &Report) -> String {
    let mut md = String::new();

    md.push_str("# Config Table Report\n\n");
    md.push_str(&format!("**Version:** {}\n\n", report.version));
    md.push_str(&format!("**Timestamp:** {}\n\n", report.timestamp));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Tables compiled: {}\n", report.summary.tables_compiled));
    md.push_str(&format!("- Tables excluded: {}\n", report.summary.tables_excluded));
    if !report.summary.discovered.is_empty() {
        md.push_str(&format!("- New tables: {}\n", report.summary.discovered.join(", ")));
    }
    if !report.summary.deleted.is_empty() {
        md.push_str(&format!("- Deleted tables: {}\n", report.summary.deleted.join(", ")));
    }
    md.push_str(&format!("- Errors: {}\n", report.summary.errors));
    md.push_str(&format!("- Warnings: {}\n", report.summary.warnings));
    md.push_str(&format!("- Info: {}\n", report.summary.info));
    md.push('\n');

    if report.diagnostics.is_empty() {
        md.push_str("✅ **No issues found!**\n");
    } else {
        md.push_str("## Diagnostics\n\n");

        for diag in &report.diagnostics {
            let severity_emoji = match diag.severity {
                Severity::Error => "❌",
                Severity::Warn => "⚠️",
                Severity::Info => "ℹ️",
            };

            md.push_str(&format!("### {} {} - {}\n\n", severity_emoji, diag.severity, diag.code));
            md.push_str(&format!("{}\n\n", diag.message));

            if let Some(loc) = &diag.location {
                md.push_str(&format!("**Location:** `{}`\n\n", loc));
            }
            if let Some(hint) = &diag.hint {
                md.push_str(&format!("**Hint:** {}\n\n", hint));
            }
        }
    }

    md
}
