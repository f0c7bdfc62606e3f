/// Cadenza - terminal media player
use cadenza_console::{session, ConsoleConfig};
use cadenza_playback::format_time;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadenza")]
#[command(about = "Cadenza terminal player", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive playback session
    Play {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Playback speed multiplier of the simulated engine
        #[arg(short, long)]
        speed: Option<f64>,

        /// Print transport events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// List the configured playlist
    Playlist {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Format a number of seconds as mm:ss
    Format {
        #[arg(allow_negative_numbers = true)]
        seconds: f64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they do not interleave with the player output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadenza=info,cadenza_console=info,cadenza_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            config,
            speed,
            json,
        } => {
            let mut config = ConsoleConfig::load(config.as_deref())?;
            if let Some(speed) = speed {
                config.session.speed = speed;
            }
            if json {
                config.session.json_events = true;
            }
            config.validate()?;
            session::run(config).await?;
        }
        Commands::Playlist { config } => {
            list_playlist(&ConsoleConfig::load(config.as_deref())?);
        }
        Commands::Format { seconds } => {
            println!("{}", format_time(seconds));
        }
    }

    Ok(())
}

fn list_playlist(config: &ConsoleConfig) {
    if config.tracks.is_empty() {
        println!("No tracks configured");
        return;
    }
    for (number, entry) in config.tracks.iter().enumerate() {
        let length = entry
            .duration
            .map_or_else(|| "--:--".to_string(), format_time);
        println!(
            "{:>2}. {} - {} [{}]",
            number + 1,
            entry.title,
            entry.artist,
            length
        );
    }
}
