/// Lazer Player - headless playback controller host
use anyhow::Context;
use clap::Parser;
use lazer_core::BeatmapSetId;
use lazer_player::{Command, Manifest, PlayerConfig, Session};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lazer-player")]
#[command(about = "Drive the Lazer Player music controller from line commands", long_about = None)]
struct Cli {
    /// Beatmap set manifest (TOML)
    #[arg(short, long)]
    manifest: PathBuf,

    /// Configuration file path
    #[arg(short, long, env = "LAZER_CONFIG")]
    config: Option<PathBuf>,

    /// Beatmap set to start on
    #[arg(short, long)]
    select: Option<i64>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazer_player=info,lazer_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let config = PlayerConfig::load(cli.config.as_deref())?;
    let library = Manifest::load(&cli.manifest)?.into_library()?;
    let mut session = Session::new(config.playback, &library, cli.select.map(BeatmapSetId::new))
        .context("Failed to start playback session")?;

    let mut stdout = io::stdout().lock();
    for line in session.drain_output() {
        writeln!(stdout, "{}", line)?;
    }

    info!("Ready, reading commands from stdin");

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => {
                for output in session.execute(command) {
                    writeln!(stdout, "{}", output)?;
                }
            }
            Err(e) => {
                warn!("Rejected command {:?}: {}", line, e);
                writeln!(stdout, "error: {}", e)?;
            }
        }
        stdout.flush()?;
    }

    Ok(())
}
