//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the interrupt handler,
//! resolves tracker ids and runs the batch over the entry table.

use anyhow::{bail, Context, Result};
use clap::CommandFactory;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;

use reorg_move::config::{create_template_config, load_settings, CONFIG_ENV};
use reorg_move::output as out;
use reorg_move::{
    default_config_path, shutdown, table, ActivityLog, BatchProcessor, BatchSettings, LogLevel,
    Settings, TicketTarget, TrelloClient, TrelloConfig,
};

use crate::cli::{Args, Command};
use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    if args.print_config {
        print_config_location(&args);
        return Ok(());
    }

    match args.command.clone() {
        None => {
            Args::command().print_help()?;
            Ok(())
        }
        Some(Command::Init {
            table,
            working_dir,
            force,
        }) => run_init(&args, &table, working_dir, force),
        Some(Command::Process {
            table,
            working_dir,
            dry_run,
            ..
        }) => run_process(&args, &table, working_dir, dry_run),
    }
}

fn print_config_location(args: &Args) {
    if let Some(p) = &args.config {
        out::print_info(&format!("Using --config (explicit):\n  {}\n", p.display()));
        return;
    }
    if let Ok(cfg_env) = env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {cfg_env}\n"));
        out::print_info(&format!("To override, unset {CONFIG_ENV} or pass --config."));
        return;
    }
    match default_config_path() {
        Some(p) => {
            out::print_info(&format!("Default reorg_move config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Run `process` to create a template.");
            }
        }
        None => out::print_error("Could not determine a default config path"),
    }
}

fn working_dir_or_cwd(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(d) => Ok(d),
        None => env::current_dir().context("determine current directory"),
    }
}

fn run_init(args: &Args, table_path: &Path, working_dir: Option<PathBuf>, force: bool) -> Result<()> {
    let level = args.effective_log_level().unwrap_or_default();
    let _guard = init_tracing(&level, None, args.json)?;

    if table_path.exists() && !force {
        bail!(
            "Table '{}' already exists; pass --force to replace it",
            table_path.display()
        );
    }
    let dir = working_dir_or_cwd(working_dir)?;
    let entries = table::blank_entries(&dir)?;
    table::write_entries(table_path, &entries)?;
    out::print_success(&format!(
        "Wrote {} entries from '{}' to '{}'",
        entries.len(),
        dir.display(),
        table_path.display()
    ));
    Ok(())
}

/// Locate and load the config. `Ok(None)` means a template was just written.
fn load_or_init(args: &Args) -> Result<Option<(PathBuf, Settings)>> {
    let explicit = args.config.is_some() || env::var_os(CONFIG_ENV).is_some();
    let path = match &args.config {
        Some(p) => p.clone(),
        None => default_config_path().context("could not determine a config path")?,
    };

    if !path.exists() {
        if explicit {
            bail!("Config file not found: {}", path.display());
        }
        create_template_config(&path)?;
        out::print_success(&format!(
            "A template reorg_move config was written to: {}",
            path.display()
        ));
        out::print_info("Fill in `reorg_directory` and the <tracker> credentials and names, then re-run this command.");
        return Ok(None);
    }

    let settings = load_settings(&path)?;
    Ok(Some((path, settings)))
}

fn run_process(
    args: &Args,
    table_path: &Path,
    working_dir: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let Some((config_path, mut settings)) = load_or_init(args)? else {
        return Ok(());
    };
    args.apply_overrides(&mut settings);

    let guard = init_tracing(&settings.log_level, settings.log_file.as_deref(), args.json)
        .inspect_err(|e| out::print_error(&format!("Failed to initialize logging: {e}")))?;

    // Dropping the guard on interrupt flushes the file appender.
    let guard_slot: Arc<Mutex<Option<WorkerGuard>>> = Arc::new(Mutex::new(guard));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; finishing the current entry...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })
        .context("install interrupt handler")?;
    }

    debug!(config = %config_path.display(), ?args, "Starting reorg_move");
    let result = process_table(settings, &config_path, table_path, working_dir, dry_run);
    if let Err(e) = &result {
        error!(error = %format!("{e:#}"), "Run failed");
    }

    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    result
}

fn process_table(
    mut settings: Settings,
    config_path: &Path,
    table_path: &Path,
    working_dir: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    settings.validate()?;

    let client = TrelloClient::new(TrelloConfig {
        api_base: settings.tracker.api_base.clone(),
        api_key: settings.tracker.api_key.clone(),
        token: settings.tracker.token.clone(),
        ..Default::default()
    })?;

    if dry_run {
        settings.resolve_tracker_ids(&client)?;
    } else {
        settings.resolve_and_persist(&client, config_path)?;
    }
    info!(
        "Settings loaded. Reorganization directory: {}{}",
        settings.reorg_directory.display(),
        std::path::MAIN_SEPARATOR
    );

    let entries = table::read_entries(table_path)?;
    let working_dir = working_dir_or_cwd(working_dir)?;

    let mut batch = BatchSettings::new(
        working_dir,
        settings.reorg_directory.clone(),
        ActivityLog::new(&settings.change_log, &settings.error_log),
    );
    batch.require_cat2 = settings.require_cat2;
    batch.dry_run = dry_run;
    batch.ticket = TicketTarget {
        list_id: settings.tracker.list_id.clone().unwrap_or_default(),
        member_ids: settings.tracker.member_ids.clone().unwrap_or_default(),
    };

    let report = BatchProcessor::new(&batch, &client).process(&entries);

    if !dry_run {
        table::write_entries(table_path, &report.retained)?;
    }
    if settings.log_level != LogLevel::Quiet {
        out::print_report(&report);
    }
    Ok(())
}
