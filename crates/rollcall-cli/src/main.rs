use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rollcall_ledger::{Ledger, MarkOutcome};
use tracing_subscriber::EnvFilter;

mod config;
mod exchange;
mod recognize;

#[derive(Parser)]
#[command(name = "rollcall", about = "Photo-based attendance from face embeddings")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize known faces in one photo and mark attendance
    Recognize {
        /// Face scan exported by the detector/embedder tool (JSON)
        #[arg(short, long)]
        faces: PathBuf,
        /// Reference embeddings exported for the faces directory (JSON)
        #[arg(short, long)]
        roster: PathBuf,
        /// The photo itself; used for pixel bounds when given
        #[arg(short, long)]
        image: Option<PathBuf>,
        /// Match threshold (cosine distance; lower is stricter)
        #[arg(short, long)]
        threshold: Option<f32>,
    },
    /// Inspect or append attendance records
    Attendance {
        #[command(subcommand)]
        command: AttendanceCommands,
    },
}

#[derive(Subcommand)]
enum AttendanceCommands {
    /// List records, optionally for a single day (YYYY-MM-DD)
    List {
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Mark one person present by hand
    Mark {
        name: String,
        #[arg(short = 'C', long, default_value_t = 1.0)]
        confidence: f32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Recognize { faces, roster, image, threshold } => {
            recognize::run(&cfg, &faces, &roster, image.as_deref(), threshold)
        }
        Commands::Attendance { command } => match command {
            AttendanceCommands::List { date } => attendance_list(&cfg, date),
            AttendanceCommands::Mark { name, confidence } => {
                attendance_mark(&cfg, &name, confidence)
            }
        },
    }
}

fn attendance_list(cfg: &config::Config, date: Option<NaiveDate>) -> Result<()> {
    let ledger = Ledger::open(&cfg.ledger)
        .with_context(|| format!("opening ledger {}", cfg.ledger.display()))?;
    let records = match date {
        Some(date) => ledger.records_for(date)?,
        None => ledger.records()?,
    };

    if records.is_empty() {
        println!("No attendance records.");
        return Ok(());
    }
    println!("{:<20} {:<12} {:<10} Confidence", "Name", "Date", "Time");
    for record in records {
        println!(
            "{:<20} {:<12} {:<10} {:.4}",
            record.name,
            record.date.to_string(),
            record.time.to_string(),
            record.confidence
        );
    }
    Ok(())
}

fn attendance_mark(cfg: &config::Config, name: &str, confidence: f32) -> Result<()> {
    let mut ledger = Ledger::open(&cfg.ledger)
        .with_context(|| format!("opening ledger {}", cfg.ledger.display()))?;
    match ledger.mark(name, confidence, Local::now().naive_local())? {
        MarkOutcome::Marked => println!("Marked {name} present."),
        MarkOutcome::AlreadyMarked => println!("{name} is already marked today."),
    }
    Ok(())
}
