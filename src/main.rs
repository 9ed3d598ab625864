// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use bmi_tracker::{
    logging, BmiRecord, CliOverrides, Config, HeightUnit, HistoryStats, HistoryStore,
    LoadOutcome, Measurement, WeightUnit, VERSION,
};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bmi-tracker", version, about = "Calculate BMI and keep a history of results")]
struct Args {
    /// History file to use instead of the configured one
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "bmi_tracker=trace"
    #[arg(long = "log-level", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate BMI and append it to history
    Calc {
        /// Body weight
        #[arg(allow_negative_numbers = true)]
        weight: String,

        /// Body height
        #[arg(allow_negative_numbers = true)]
        height: String,

        /// kg or lbs (defaults to the configured unit)
        #[arg(short = 'w', long = "weight-unit")]
        weight_unit: Option<WeightUnit>,

        /// cm or inches (defaults to the configured unit)
        #[arg(short = 'u', long = "height-unit")]
        height_unit: Option<HeightUnit>,

        /// Show the result without saving it
        #[arg(long = "no-save")]
        no_save: bool,
    },

    /// List past calculations, oldest first
    History {
        /// Only show the most recent N entries
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show average, lowest and highest BMI
    Stats,

    /// Delete all history
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Write history to a CSV file
    Export {
        /// Destination CSV path
        path: PathBuf,
    },

    /// Interactive terminal UI (default)
    Ui,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&CliOverrides {
        history_file: args.history.clone(),
        log_level: args.log_level.clone(),
    })?;

    // Logging is best effort; the tool works without it
    let _log_guard = match logging::init(&config.log_dir, &config.log_level) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("⚠️  Logging disabled: {:#}", err);
            None
        }
    };

    info!(version = VERSION, history = %config.history_file.display(), "starting");

    let mut store = HistoryStore::open(&config.history_file);
    if let LoadOutcome::Corrupt { moved_to } = store.load_outcome() {
        eprintln!("⚠️  History file was unreadable, starting with empty history");
        if let Some(path) = moved_to {
            eprintln!("   Old file kept at {}", path.display());
        }
    }

    match args.command.unwrap_or(Command::Ui) {
        Command::Calc {
            weight,
            height,
            weight_unit,
            height_unit,
            no_save,
        } => run_calc(
            &mut store,
            &weight,
            weight_unit.unwrap_or(config.weight_unit),
            &height,
            height_unit.unwrap_or(config.height_unit),
            no_save,
        ),
        Command::History { limit } => run_history(&store, limit),
        Command::Stats => run_stats(&store),
        Command::Clear { yes } => run_clear(&mut store, yes),
        Command::Export { path } => run_export(&store, &path),
        Command::Ui => run_ui_mode(store, &config),
    }
}

fn run_calc(
    store: &mut HistoryStore,
    weight: &str,
    weight_unit: WeightUnit,
    height: &str,
    height_unit: HeightUnit,
    no_save: bool,
) -> Result<()> {
    let measurement = Measurement::parse(weight, weight_unit, height, height_unit)
        .context("Please enter valid positive numbers for weight and height")?;
    let record = BmiRecord::now(&measurement);
    let category = record.category();

    println!("BMI:      {:.1}", record.bmi());
    println!("Category: {}", category);
    println!();
    println!("Health Recommendations:");
    for rec in category.recommendations() {
        println!("  • {}", rec);
    }

    if no_save {
        return Ok(());
    }

    store.append(record)?;
    println!();
    println!("✓ Saved to {} ({} records)", store.path().display(), store.len());
    Ok(())
}

fn run_history(store: &HistoryStore, limit: Option<usize>) -> Result<()> {
    if store.is_empty() {
        println!("No data available");
        return Ok(());
    }

    let records = store.records();
    let skip = limit.map_or(0, |n| records.len().saturating_sub(n));

    println!(
        "{:<18} {:>12} {:>12} {:>7}  {}",
        "Date", "Weight", "Height", "BMI", "Category"
    );
    println!("{}", "─".repeat(70));
    for record in &records[skip..] {
        println!(
            "{:<18} {:>12} {:>12} {:>7.1}  {}",
            record.display_timestamp(),
            record.display_weight(),
            record.display_height(),
            record.bmi(),
            record.category()
        );
    }

    Ok(())
}

fn run_stats(store: &HistoryStore) -> Result<()> {
    let stats = match HistoryStats::from_records(store.records()) {
        Some(stats) => stats,
        None => {
            println!("No data available");
            return Ok(());
        }
    };

    println!("Average BMI:   {:.1}", stats.average);
    println!("Lowest BMI:    {:.1}", stats.min);
    println!("Highest BMI:   {:.1}", stats.max);
    println!("Total Records: {}", stats.count);
    println!("Change:        {:+.1} (first {:.1} → latest {:.1})", stats.change, stats.first, stats.latest);
    if let Some(category) = stats.dominant_category() {
        println!("Most common:   {} ({} range)", category, category.band().label());
    }
    println!();
    for (category, count) in &stats.by_category {
        println!("  {:<20} {:>4}", category.label(), count);
    }

    Ok(())
}

fn run_clear(store: &mut HistoryStore, yes: bool) -> Result<()> {
    if store.is_empty() {
        println!("History is already empty");
        return Ok(());
    }

    if !yes && !confirm(&format!("Clear all {} history entries?", store.len()))? {
        println!("Cancelled");
        return Ok(());
    }

    store.clear()?;
    println!("✓ History cleared successfully");
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn run_export(store: &HistoryStore, path: &Path) -> Result<()> {
    let rows = store.export_csv(path)?;
    println!("✓ Exported {} records to {}", rows, path.display());
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(store: HistoryStore, config: &Config) -> Result<()> {
    let mut app = ui::App::new(store, config.weight_unit, config.height_unit);
    ui::run_ui(&mut app)?;
    info!("ui closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_store: HistoryStore, _config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the calc / history / stats subcommands");
    std::process::exit(1);
}
