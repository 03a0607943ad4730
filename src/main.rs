// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Desktop Organizer: purpose-based desktop tidying
//!
//! Sorts desktop items into category folders, or arranges their icons in
//! category blocks on a grid.

use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use desktop_organizer::config::AppConfig;
use desktop_organizer::history::History;
use desktop_organizer::layout::positioner::PlanPositioner;
use desktop_organizer::layout::render_ascii;
use desktop_organizer::organizer::{ClassifiedItem, Organizer};
use desktop_organizer::{OrganizerError, Result};

/// Desktop Organizer CLI
#[derive(Parser, Debug)]
#[command(name = "desktop-organizer")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "Organize desktop items by purpose", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Desktop folder to organize (overrides config)
    #[arg(short, long, global = true)]
    desktop: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Also append log output to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Output format for classification results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Only list desktop items with their categories
    List,

    /// Organize the desktop
    Organize {
        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,

        /// Make changes even if the config asks for a dry run
        #[arg(long, conflicts_with = "dry_run")]
        apply: bool,

        /// Skip creating a backup
        #[arg(long)]
        no_backup: bool,

        /// Skip the confirmation prompt
        #[arg(long)]
        no_confirm: bool,

        /// Arrange icons on the grid instead of moving items into folders
        #[arg(long)]
        grid: bool,

        /// Position folders on the grid too
        #[arg(long, conflicts_with = "no_folders")]
        include_folders: bool,

        /// Leave folders where they are when arranging the grid
        #[arg(long)]
        no_folders: bool,
    },

    /// Show the grid positions the current desktop would get
    Layout,

    /// History and undo operations
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// List recent moves
    List {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },

    /// Move recently organized items back
    Undo {
        /// Number of moves to undo (0 for all)
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Dry run (show what would be undone)
        #[arg(long)]
        dry_run: bool,
    },

    /// Clear all history
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration file
    Validate,
}

/// Flags of the organize command
#[derive(Debug, Default)]
struct OrganizeOptions {
    dry_run: bool,
    apply: bool,
    no_backup: bool,
    no_confirm: bool,
    grid: bool,
    include_folders: bool,
    no_folders: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Flushes the log file when main returns
    let _log_guard = init_tracing(&cli)?;

    if !cli.quiet {
        info!("Desktop Organizer v1.0.0");
    }

    // Load configuration
    let mut config = AppConfig::load(&cli.config);
    if let Some(ref desktop) = cli.desktop {
        config.desktop_path = Some(desktop.clone());
    }

    let outcome = match cli.command {
        Some(Commands::List) => run_list(config, &cli.format),
        Some(Commands::Organize { dry_run, apply, no_backup, no_confirm, grid, include_folders, no_folders }) => {
            let options = OrganizeOptions { dry_run, apply, no_backup, no_confirm, grid, include_folders, no_folders };
            run_organize(config, options, &cli.format)
        }
        Some(Commands::Layout) => run_layout(config),
        Some(Commands::History { action }) => run_history_command(config, action),
        Some(Commands::Config { action }) => run_config_command(config, action, &cli.config),
        None => run_organize(config, OrganizeOptions::default(), &cli.format),
    };

    match outcome {
        Err(OrganizerError::Cancelled) => {
            println!("Organization cancelled.");
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            Err(e)
        }
        Ok(()) => Ok(()),
    }
}

/// Initialize tracing: stderr always, plus an optional plain-text log file
fn init_tracing(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    let (file_layer, guard) = match cli.log_file {
        Some(ref path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Print each item with its category
fn print_classification(items: &[ClassifiedItem], format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }

    println!("\nClassification Results:");
    println!("{:=<50}", "");
    for entry in items {
        let marker = if entry.item.is_folder { "📁" } else { "📄" };
        println!("{} {} -> {}", marker, entry.item.name, entry.category);
    }
    Ok(())
}

/// Ask a yes/no question on stdin
fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// List desktop items without organizing
fn run_list(config: AppConfig, format: &str) -> Result<()> {
    let organizer = Organizer::new(config)?;
    let items = organizer.classify_desktop()?;

    if format == "text" {
        println!("\nFound {} items on desktop:", items.len());
    }
    print_classification(&items, format)
}

/// Run an organize pass over the desktop
fn run_organize(mut config: AppConfig, options: OrganizeOptions, format: &str) -> Result<()> {
    if options.dry_run {
        config.dry_run = true;
    }
    if options.apply {
        config.dry_run = false;
    }
    if options.no_backup {
        config.create_backup = false;
    }
    if options.no_confirm {
        config.ask_confirmation = false;
    }
    if options.grid {
        config.grid_layout.enabled = true;
    }
    if options.include_folders {
        config.grid_layout.include_folders = true;
    }
    if options.no_folders {
        config.grid_layout.include_folders = false;
    }

    info!("Starting desktop organization");
    let organizer = Organizer::new(config)?;
    let items = organizer.classify_desktop()?;
    if items.is_empty() {
        info!("No items found to organize");
        return Ok(());
    }

    print_classification(&items, format)?;

    let config = organizer.config();
    if config.ask_confirmation {
        let categories: BTreeSet<&str> = items.iter().map(|i| i.category.as_str()).collect();
        println!("\nThis will organize {} items into {} categories.", items.len(), categories.len());
        if config.dry_run {
            println!("This is a DRY RUN - no actual changes will be made.");
        }
        if !confirm("\nProceed with organization? (y/N): ")? {
            return Err(OrganizerError::Cancelled);
        }
    }

    if config.grid_layout.enabled {
        let names: Vec<String> = organizer
            .scan()?
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        let mut positioner = PlanPositioner::new(names, Some(config.layout_file.clone()));
        let report = organizer.arrange(&items, &mut positioner)?;

        let action = if report.dry_run { "Would arrange" } else { "Arranged" };
        println!("\n{} {}/{} items on the grid.", action, report.placed.len(), items.len());
        for name in &report.unresolved {
            println!("  No desktop icon found for: {}", name);
        }
        for name in &report.failed {
            println!("  Could not position: {}", name);
        }
    } else {
        let report = organizer.organize(&items)?;
        if let Some(ref backup) = report.backup {
            println!("Backup created: {}", backup.display());
        }

        let action = if report.dry_run { "Would organize" } else { "Organized" };
        println!("\n{} {}/{} items successfully!", action, report.succeeded, report.total);
    }

    Ok(())
}

/// Print the grid layout for the current desktop
fn run_layout(config: AppConfig) -> Result<()> {
    let organizer = Organizer::new(config)?;
    let items = organizer.classify_desktop()?;
    let plan = organizer.plan_layout(&items);

    let grid = &organizer.config().grid_layout;
    println!("Grid Layout Positioning");
    println!("{:=<50}", "");
    println!("Cell Size: {}x{}", grid.cell_width, grid.cell_height);
    println!("Start Position: ({}, {})", grid.start_x, grid.start_y);
    println!("Max Columns: {}", grid.max_columns_per_category);

    let mut categories: Vec<&str> = Vec::new();
    for placed in &plan {
        if !categories.contains(&placed.category.as_str()) {
            categories.push(&placed.category);
        }
    }

    for category in categories {
        println!("\n{}:", category);
        println!("{:-<width$}", "", width = category.chars().count() + 1);
        for placed in plan.iter().filter(|p| p.category == category) {
            println!("  {:<20} -> ({:>4}, {:>4})", placed.name, placed.x, placed.y);
        }
    }

    println!("\nVisual Grid Layout (approximate):");
    println!("{:=<50}", "");
    println!("{}", render_ascii(&plan));

    Ok(())
}

/// Run history commands
fn run_history_command(config: AppConfig, action: HistoryCommands) -> Result<()> {
    let history = History::new(config.history_file);

    match action {
        HistoryCommands::List { count } => {
            let entries = history.get_recent(count)?;
            println!("Recent history ({} entries):", entries.len());
            for entry in entries {
                let status = if entry.undone { "[UNDONE]" } else { "" };
                println!("  {} {} -> {} {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.original_path.display(),
                    entry.new_path.display(),
                    status
                );
            }
        }
        HistoryCommands::Undo { count, dry_run } => {
            let report = history.undo(count, dry_run)?;
            if report.undone.is_empty() && report.skipped.is_empty() {
                println!("No moves to undo");
                return Ok(());
            }

            let verb = if dry_run { "Would undo" } else { "Undone" };
            for entry in &report.undone {
                println!("{}: {} -> {}", verb, entry.new_path.display(), entry.original_path.display());
            }
            for (entry, reason) in &report.skipped {
                println!("Skipped: {} ({})", entry.new_path.display(), reason);
            }
        }
        HistoryCommands::Clear { force } => {
            if !force {
                eprintln!("Use --force to confirm clearing history");
                return Ok(());
            }
            history.clear()?;
            println!("History cleared");
        }
    }

    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output, force } => {
            if output.exists() && !force {
                return Err(OrganizerError::Config(format!(
                    "{} already exists. Use --force to overwrite", output.display()
                )));
            }
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            if !config_path.exists() {
                warn!("No config file at {:?}; defaults are in effect", config_path);
                return Ok(());
            }
            let config = AppConfig::load_strict(config_path)?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Desktop: {}", config.desktop().display());
            println!("  Categories: {}", config.categories.names().join(", "));
            println!("  Grid order: {}", config.grid_layout.category_order.join(", "));
            println!("  Dry run: {}", config.dry_run);
        }
    }

    Ok(())
}
