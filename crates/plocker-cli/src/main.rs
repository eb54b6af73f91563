//! Plugin update locker CLI.
//!
//! Provides the `plocker` binary, which locks installed vault plugins against
//! host auto-updates by swapping their manifest version for a sentinel, and
//! unlocks them by restoring the captured version.
//!
//! Exit codes: 0 = success, 1 = usage or I/O error, 2 = the toggle did not
//! fully apply (a warning was printed).

mod config;

use std::io::{self, BufRead, Write};
use std::process;
use std::thread;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use plocker_core::PluginId;
use plocker_service::{AuditStatus, PanelView, SettingsPanel, ToggleReport};
use plocker_storage::ManifestCatalog;

use crate::config::{LockerConfig, VaultController};

/// Lock vault plugins against automatic updates.
#[derive(Parser)]
#[command(name = "plocker", version, about = "Lock vault plugins against automatic updates")]
struct Cli {
    #[command(flatten)]
    config: LockerConfig,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List installed plugins with their lock state.
    List {
        /// Case-insensitive filter on the plugin name.
        #[arg(short, long, default_value = "")]
        search: String,

        /// Print rows as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print whether a plugin is locked.
    Status { plugin: PluginId },
    /// Flip a plugin's lock state.
    Toggle { plugin: PluginId },
    /// Lock a plugin; does nothing if it is already locked.
    Lock { plugin: PluginId },
    /// Unlock a plugin; does nothing if it is not locked.
    Unlock { plugin: PluginId },
    /// Compare every lock record against the manifest on disk.
    Check {
        /// Print the audit as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Interactive panel: `/text` searches, a row number toggles, `q` quits.
    Browse,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::List { search, json } => run_list(&cli.config, &search, json),
        Commands::Status { plugin } => run_status(&cli.config, &plugin),
        Commands::Toggle { plugin } => run_toggle(&cli.config, &plugin, None),
        Commands::Lock { plugin } => run_toggle(&cli.config, &plugin, Some(true)),
        Commands::Unlock { plugin } => run_toggle(&cli.config, &plugin, Some(false)),
        Commands::Check { json } => run_check(&cli.config, json),
        Commands::Browse => run_browse(&cli.config),
    };
    process::exit(exit_code);
}

fn open_panel(config: &LockerConfig, controller: &VaultController) -> Result<SettingsPanel, i32> {
    let catalog = ManifestCatalog::new(controller.files(), controller.layout());
    SettingsPanel::open(&catalog, &config.self_id).map_err(|e| {
        eprintln!("Error: failed to list plugins: {}", e);
        1
    })
}

fn run_list(config: &LockerConfig, search: &str, json: bool) -> i32 {
    let controller = config.open_controller();
    let mut panel = match open_panel(config, &controller) {
        Ok(panel) => panel,
        Err(code) => return code,
    };
    panel.set_query(search);
    let view = panel.render(controller.registry());

    if json {
        match serde_json::to_string_pretty(view.rows()) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: failed to serialize rows: {}", e);
                return 1;
            }
        }
    } else {
        print_view(&view);
    }
    0
}

fn run_status(config: &LockerConfig, plugin: &PluginId) -> i32 {
    let controller = config.open_controller();
    match controller.registry().get(plugin) {
        Some(record) => println!(
            "{}: locked (manifest version {}, original {})",
            plugin,
            record.updated_version,
            record.original_version.as_deref().unwrap_or("unknown")
        ),
        None => println!("{}: unlocked", plugin),
    }
    0
}

/// Toggles `plugin`, or, with `want_locked`, toggles only if its state differs.
fn run_toggle(config: &LockerConfig, plugin: &PluginId, want_locked: Option<bool>) -> i32 {
    let mut controller = config.open_controller();
    if let Some(want) = want_locked {
        if controller.is_locked(plugin) == want {
            println!(
                "{}: already {}",
                plugin,
                if want { "locked" } else { "unlocked" }
            );
            return 0;
        }
    }
    report_toggle(&controller.toggle_lock(plugin))
}

fn report_toggle(report: &ToggleReport) -> i32 {
    let state = if report.is_locked() { "locked" } else { "unlocked" };
    match report.warning() {
        Some(warning) => {
            eprintln!("Warning: {}", warning);
            println!("{}: {}", report.plugin_id, state);
            2
        }
        None => {
            println!("{}: {}", report.plugin_id, state);
            0
        }
    }
}

fn run_check(config: &LockerConfig, json: bool) -> i32 {
    let controller = config.open_controller();
    let audit = controller.audit();

    if json {
        match serde_json::to_string_pretty(&audit) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: failed to serialize audit: {}", e);
                return 1;
            }
        }
    } else if audit.is_empty() {
        println!("No locked plugins");
    } else {
        for entry in &audit {
            let status = match &entry.status {
                AuditStatus::Consistent => "ok".to_string(),
                AuditStatus::Drifted { on_disk } => format!(
                    "manifest declares {}, expected {}",
                    on_disk, entry.record.updated_version
                ),
                AuditStatus::Unreadable { reason } => format!("manifest unreadable: {}", reason),
            };
            println!("{}: {}", entry.record.plugin_id, status);
        }
    }

    let consistent = audit
        .iter()
        .all(|entry| entry.status == AuditStatus::Consistent);
    if consistent {
        0
    } else {
        2
    }
}

fn run_browse(config: &LockerConfig) -> i32 {
    let mut controller = config.open_controller();
    let mut panel = match open_panel(config, &controller) {
        Ok(panel) => panel,
        Err(code) => return code,
    };
    let mut view = panel.render(controller.registry());
    print_view(&view);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("Error: failed to read input: {}", e);
                return 1;
            }
        };
        let input = line.trim();

        if input == "q" {
            break;
        } else if let Some(text) = input.strip_prefix('/') {
            panel.input_search(text, Instant::now());
            // Held input is applied once its quiet window has passed.
            if let Some(deadline) = panel.search_deadline() {
                thread::sleep(deadline.saturating_duration_since(Instant::now()));
                panel.poll_search(Instant::now());
            }
            view = panel.render(controller.registry());
        } else if let Ok(number) = input.parse::<usize>() {
            let Some(row) = number.checked_sub(1).and_then(|i| view.rows().get(i)) else {
                eprintln!("No row {}", number);
                continue;
            };
            let id = row.id.clone();
            let (report, next) = panel.toggle(&mut controller, &id);
            if let Some(warning) = report.warning() {
                eprintln!("Warning: {}", warning);
            }
            view = next;
        } else if !input.is_empty() {
            eprintln!("Commands: /text to search, a row number to toggle, q to quit");
            continue;
        }
        print_view(&view);
    }
    0
}

fn print_view(view: &PanelView) {
    let mut out = io::stdout().lock();
    let result = match view {
        PanelView::Empty { message } => writeln!(out, "{}", message),
        PanelView::Rows { rows } => rows.iter().enumerate().try_for_each(|(i, row)| {
            let mark = if row.locked { "x" } else { " " };
            write!(out, "{:>3}. [{}] {} ({})", i + 1, mark, row.name, row.id)?;
            if let Some(author) = &row.author {
                write!(out, " by {}", author)?;
            }
            if row.is_desktop_only {
                write!(out, " [desktop only]")?;
            }
            writeln!(out)?;
            writeln!(out, "       {}", row.description)
        }),
    };
    if let Err(e) = result {
        tracing::warn!("Failed to write to stdout: {}", e);
    }
}
