//! captionize CLI - caption classification for NLM/JATS XML

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use captionize::{CaptionRecord, DocumentStore};

#[derive(Parser)]
#[command(name = "captionize")]
#[command(version)]
#[command(
    about = "Classify table and figure captions and link in-text cross-references",
    long_about = None
)]
struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Write the detected (id, title) pairs as JSON
    #[arg(long, global = true, value_name = "FILE")]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify table captions and link table references
    Tables {
        /// Input XML file (rewritten in place)
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Classify graphic captions (both heuristics) and link figure references
    Graphics {
        /// Input XML file (rewritten in place)
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Classify tables, then graphics
    All {
        /// Input XML file (rewritten in place)
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if cli.debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    let result = match &cli.command {
        Commands::Tables { input } => cmd_run(input, Mode::Tables, cli.report.as_deref()),
        Commands::Graphics { input } => cmd_run(input, Mode::Graphics, cli.report.as_deref()),
        Commands::All { input } => cmd_run(input, Mode::All, cli.report.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

#[derive(Copy, Clone)]
enum Mode {
    Tables,
    Graphics,
    All,
}

fn cmd_run(
    input: &Path,
    mode: Mode,
    report: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = DocumentStore::new(input);

    let records = match mode {
        Mode::Tables => captionize::run_tables(&store)?,
        Mode::Graphics => captionize::run_graphics(&store)?,
        Mode::All => captionize::run_all(&store)?,
    };

    print_summary(&records);

    if let Some(path) = report {
        let json = serde_json::to_string_pretty(&records)?;
        fs::write(path, json)?;
        println!("{} {}", "Report saved to".green(), path.display());
    }

    Ok(())
}

fn print_summary(records: &[CaptionRecord]) {
    if records.is_empty() {
        println!("{}", "No captions classified".yellow());
        return;
    }

    println!(
        "{} {} caption(s)",
        "Classified".green().bold(),
        records.len()
    );
    for record in records {
        println!("  {} {} -> {}", "├─".dimmed(), record.title, record.id);
    }
}
