//! Revolver Survival math generator
//!
//! Usage:
//!   rv-gen generate [--config FILE] [--out DIR] [--parallel]
//!   rv-gen modes [--config FILE] [--json]
//!   rv-gen verify [--config FILE] [--out DIR]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use rv_books::{BookGenerator, OutputLayout, VerificationReport};
use rv_math::{GameConfig, ModeTable};

#[derive(Parser)]
#[command(name = "rv-gen", about = "Revolver Survival math file generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write lookup tables, event books and the index
    Generate {
        /// Game configuration (JSON or YAML); built-in defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output root (publish_files/ and books/ are created under it)
        #[arg(short, long, default_value = "library")]
        out: PathBuf,
        /// Emit modes in parallel
        #[arg(short, long)]
        parallel: bool,
    },
    /// Print the mode table
    Modes {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read back published tables and check them
    Verify {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, default_value = "library")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            out,
            parallel,
        } => generate(config.as_deref(), &out, parallel),
        Commands::Modes { config, json } => print_modes(config.as_deref(), json),
        Commands::Verify { config, out } => verify(config.as_deref(), &out),
    }
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => {
            let config = GameConfig::default();
            config.validate().context("Built-in config is invalid")?;
            Ok(config)
        }
    }
}

fn generate(config: Option<&Path>, out: &Path, parallel: bool) -> Result<()> {
    let config = load_config(config)?;
    let modes = ModeTable::build(&config).context("Failed to build mode table")?;

    let run = BookGenerator::new(&config, &modes, OutputLayout::under(out))
        .context("Failed to set up book compression")?
        .with_parallel(parallel)
        .run()
        .with_context(|| format!("Generation into {} failed", out.display()))?;

    println!();
    println!("{} v{}: {} modes", config.game, config.version, run.manifests.len());
    for manifest in &run.manifests {
        println!(
            "  {:<16} {:>8} rows  {:>8} wins  {}  {}",
            manifest.name, manifest.rows, manifest.win_rows, manifest.weights, manifest.events
        );
    }
    println!("Index: {}", run.index_path.display());

    Ok(())
}

fn print_modes(config: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config)?;
    let modes = ModeTable::build(&config).context("Failed to build mode table")?;

    if json {
        let list: Vec<_> = modes.iter().collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!("{} v{}", config.game, config.version);
    println!(
        "House edge {:.2}%, {} chambers, {} simulations per mode",
        config.house_edge * 100.0,
        config.total_slots,
        config.simulations
    );
    println!();
    println!(
        "{:<16} {:>9} {:>11} {:>8} {:>9}  {:>7}",
        "Mode", "Survival", "Multiplier", "RTP", "Rounding", "Weights"
    );
    for mode in modes.iter() {
        println!(
            "{:<16} {:>9} {:>10.2}x {:>7.2}% {:>9}  {:>3}:{}",
            mode.name(),
            mode.survival_percent(),
            mode.multiplier(),
            mode.rtp() * 100.0,
            format!("{:?}", mode.rounding),
            mode.win_weight_ratio(),
            mode.loss_weight_ratio()
        );
    }
    println!();
    println!("RTP spread: {:.4}%", modes.rtp_spread() * 100.0);

    Ok(())
}

fn verify(config: Option<&Path>, out: &Path) -> Result<()> {
    let config = load_config(config)?;
    let modes = ModeTable::build(&config).context("Failed to build mode table")?;
    let layout = OutputLayout::under(out);

    let report = VerificationReport::run(&config, &modes, &layout)
        .with_context(|| format!("Failed to read tables under {}", layout.publish_dir().display()))?;

    let path = layout.verification_path();
    report
        .write(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    for mode in &report.modes {
        println!(
            "  {:<16} {}  survival {:.6} (expected {:.6})  RTP {:.4}%",
            mode.name,
            if mode.passed() { "ok  " } else { "FAIL" },
            mode.realized_survival,
            mode.expected_survival,
            mode.realized_rtp * 100.0
        );
    }
    println!("RTP spread: {:.4}%", report.rtp_spread * 100.0);
    println!("Report: {}", path.display());

    if !report.passed() {
        bail!("Verification failed:\n  {}", report.failures().join("\n  "));
    }

    Ok(())
}
