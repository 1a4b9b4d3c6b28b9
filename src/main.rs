use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use reclaim::cleaner::{ActionRegistry, CleanupEngine, StagingTrash, TrashBin};
use reclaim::cli::args::{Cli, Commands, ConfigAction, OutputFormat};
use reclaim::cli::output;
use reclaim::common::config::Config;
use reclaim::common::errors::CleanupError;
use reclaim::common::{format, CancelToken};
use reclaim::model::{apply_cleanup_decision, category, CleanupProgress, CleanupSummary, Finding};
use reclaim::safety::rules::eq_ignore_case;
use reclaim::safety::SafetyPolicy;
use reclaim::scanner::{self, Discoverer, ScanResults};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let _log_guard = init_logging(&cli)?;

    let cancel = CancelToken::new();
    install_interrupt_handler(&cancel).context("failed to install Ctrl-C handler")?;

    let config = Config::load()?;
    let format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Scan { detailed } => cmd_scan(&cli, &config, format, detailed, &cancel),

        Commands::Clean {
            all: _,
            ref category,
            ref path,
            permanent,
            yes,
            dry_run,
        } => cmd_clean(
            &cli,
            &config,
            format,
            CleanRequest {
                categories: category,
                paths: path,
                permanent,
                yes,
                dry_run,
            },
            &cancel,
        ),

        Commands::Categories => cmd_categories(&config, format),
        Commands::Trash => cmd_trash(format),
        Commands::Config { ref action } => cmd_config(action, &config),
    }
}

/// First Ctrl-C cancels the token; a second one exits with status 130.
/// The conditional hook must be registered first so it sees the flag unset
/// on the first signal.
fn install_interrupt_handler(cancel: &CancelToken) -> std::io::Result<()> {
    use signal_hook::consts::SIGINT;
    signal_hook::flag::register_conditional_shutdown(SIGINT, 130, cancel.flag())?;
    signal_hook::flag::register(SIGINT, cancel.flag())?;
    Ok(())
}

// ─── Logging ──────────────────────────────────────────────────────────────────

/// Stderr logging, plus a daily file when `--log-dir` is given.
/// The returned guard flushes the file writer on drop.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = if cli.verbose {
        EnvFilter::new("reclaim=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time()
        .compact();

    let Some(dir) = &cli.log_dir else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "reclaim.log"));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Ok(Some(guard))
}

// ─── Shared ───────────────────────────────────────────────────────────────────

fn staging_trash() -> Arc<dyn TrashBin> {
    Arc::new(StagingTrash::new(Config::trash_dir()))
}

/// Discoverers for the requested categories, or every enabled one
fn select_discoverers(config: &Config, trash: Arc<dyn TrashBin>, only: &[String]) -> Result<Vec<Box<dyn Discoverer>>> {
    for id in only {
        if category::find(id).is_none() {
            anyhow::bail!("Unknown category: {} (see `reclaim categories`)", id);
        }
    }

    Ok(scanner::default_discoverers(trash)
        .into_iter()
        .filter(|d| {
            if only.is_empty() {
                config.is_category_enabled(d.category())
            } else {
                only.iter().any(|id| id.eq_ignore_ascii_case(d.category().id))
            }
        })
        .collect())
}

fn run_scan(
    discoverers: &[Box<dyn Discoverer>],
    policy: &mut SafetyPolicy,
    cancel: &CancelToken,
    show_progress: bool,
) -> Result<ScanResults> {
    policy.reset_for_scan();

    let spinner = output::scan_spinner(show_progress);
    let results = scanner::run_scan(discoverers, policy, cancel);
    spinner.finish_and_clear();

    results.context("Scan did not complete")
}

// ─── Scan ─────────────────────────────────────────────────────────────────────

fn cmd_scan(cli: &Cli, config: &Config, format: OutputFormat, detailed: bool, cancel: &CancelToken) -> Result<()> {
    let discoverers = select_discoverers(config, staging_trash(), &[])?;
    let mut policy = SafetyPolicy::from_config(&config.safety);
    let show_progress = !cli.quiet && format == OutputFormat::Human;

    let results = run_scan(&discoverers, &mut policy, cancel, show_progress)?;

    match format {
        OutputFormat::Human => output::print_scan_results(&results, detailed),
        OutputFormat::Json => output::print_scan_json(&results),
        OutputFormat::Quiet => output::print_scan_quiet(&results),
    }

    Ok(())
}

// ─── Clean ────────────────────────────────────────────────────────────────────

struct CleanRequest<'a> {
    categories: &'a [String],
    paths: &'a [std::path::PathBuf],
    permanent: bool,
    yes: bool,
    dry_run: bool,
}

fn cmd_clean(cli: &Cli, config: &Config, format: OutputFormat, request: CleanRequest<'_>, cancel: &CancelToken) -> Result<()> {
    let trash = staging_trash();
    let discoverers = select_discoverers(config, Arc::clone(&trash), request.categories)?;
    let mut policy = SafetyPolicy::from_config(&config.safety);
    let human = format == OutputFormat::Human;
    let show_progress = !cli.quiet && human;

    let results = run_scan(&discoverers, &mut policy, cancel, show_progress)?;

    let use_trash = config.cleanup.use_trash && !request.permanent;
    let findings: Vec<Finding> = results
        .findings
        .iter()
        .map(|f| apply_cleanup_decision(f, use_trash))
        .collect();

    let selected: Vec<Finding> = findings
        .iter()
        .filter(|f| request.paths.is_empty() || request.paths.iter().any(|p| matches_path(f, p)))
        .cloned()
        .collect();

    if selected.is_empty() {
        match format {
            OutputFormat::Human => println!("  {} Nothing to clean!", "✨"),
            OutputFormat::Json => output::print_findings_json(&[]),
            OutputFormat::Quiet => output::print_findings_quiet(&[]),
        }
        return Ok(());
    }

    if request.dry_run {
        match format {
            OutputFormat::Human => output::print_clean_preview(&selected),
            OutputFormat::Json => output::print_findings_json(&selected),
            OutputFormat::Quiet => output::print_findings_quiet(&selected),
        }
        return Ok(());
    }

    if !request.yes {
        let bytes: u64 = selected.iter().map(|f| f.size_bytes).sum();
        let mode_label = if use_trash { "Move to trash" } else { "PERMANENTLY DELETE" };
        print!(
            "\n  {} {} {} ({})? [y/N] ",
            "❓",
            mode_label,
            format::format_count(selected.len()),
            format::format_size(bytes)
        );
        use std::io::Write;
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("  {} Cancelled", "✗".red());
            return Ok(());
        }
    }

    let mut engine = CleanupEngine::new(ActionRegistry::standard(trash));
    if let Some(workers) = config.cleanup.max_workers {
        engine = engine.with_worker_limit(workers);
    }

    let ids: Vec<String> = selected.iter().map(|f| f.id.clone()).collect();
    let pb = output::cleanup_progress_bar(ids.len(), show_progress);
    let mut sink = |p: CleanupProgress| {
        pb.set_length(p.total as u64);
        pb.set_position(p.processed as u64);
        pb.set_message(format!("{} reclaimed, {} skipped", p.deleted, p.skipped));
    };

    let result = engine.execute(&findings, &ids, &policy, cancel, &mut sink);
    pb.finish_and_clear();

    let (outcomes, canceled) = match result {
        Ok(outcomes) => (outcomes, false),
        Err(CleanupError::Canceled(partial)) => (partial.outcomes, true),
        Err(e) => return Err(e).context("Cleanup failed"),
    };

    let summary = CleanupSummary::from_outcomes(&outcomes, &findings);
    match format {
        OutputFormat::Human => output::print_clean_report(&summary, &outcomes, canceled),
        OutputFormat::Json => output::print_clean_json(&summary, &outcomes, canceled),
        OutputFormat::Quiet => output::print_clean_quiet(&summary),
    }

    if canceled {
        anyhow::bail!("Cleanup canceled");
    }
    Ok(())
}

fn matches_path(finding: &Finding, wanted: &Path) -> bool {
    let wanted = wanted.to_string_lossy();
    finding
        .path_str()
        .is_some_and(|p| eq_ignore_case(p.trim_end_matches(['/', '\\']), wanted.trim_end_matches(['/', '\\'])))
}

// ─── Categories ───────────────────────────────────────────────────────────────

fn cmd_categories(config: &Config, format: OutputFormat) -> Result<()> {
    let rows: Vec<_> = category::ALL
        .iter()
        .map(|c| (c, config.is_category_enabled(c)))
        .collect();

    match format {
        OutputFormat::Human => output::print_categories(&rows),
        OutputFormat::Json => {
            let json: Vec<_> = rows
                .iter()
                .map(|(c, enabled)| {
                    serde_json::json!({
                        "id": c.id,
                        "name": c.name,
                        "description": c.description,
                        "risk": c.risk,
                        "enabled": enabled,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Quiet => {
            for (c, enabled) in &rows {
                println!("{}  {}", c.id, if *enabled { "on" } else { "off" });
            }
        }
    }
    Ok(())
}

// ─── Trash ────────────────────────────────────────────────────────────────────

fn cmd_trash(format: OutputFormat) -> Result<()> {
    let trash = staging_trash();
    let usage: Vec<_> = trash
        .drives()
        .into_iter()
        .map(|drive| {
            let result = trash.query(Some(drive.as_str())).map_err(|e| e.to_string());
            (drive, result)
        })
        .collect();

    match format {
        OutputFormat::Human => output::print_trash_usage(&usage),
        OutputFormat::Json => {
            let json: Vec<_> = usage
                .iter()
                .map(|(drive, result)| match result {
                    Ok(u) => serde_json::json!({ "drive": drive, "bytes": u.bytes, "items": u.items }),
                    Err(e) => serde_json::json!({ "drive": drive, "error": e }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Quiet => {
            for (drive, result) in &usage {
                if let Ok(u) = result {
                    println!("{}  {}  {}", drive, u.bytes, u.items);
                }
            }
        }
    }
    Ok(())
}

// ─── Config ───────────────────────────────────────────────────────────────────

fn cmd_config(action: &ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Init => {
            Config::init_dirs()?;
            config.save()?;
            println!(
                "  {} reclaim initialized at {}",
                "✓".green(),
                format::format_path(&Config::data_dir())
            );
            println!("  Created: config.toml, trash/, logs/");
            Ok(())
        }
        ConfigAction::Show => {
            println!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
            Ok(())
        }
    }
}
