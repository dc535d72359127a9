/// Chant - terminal player for the chant catalog
use chant_cli::{commands, CliConfig};
use chant_core::TrackId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chant")]
#[command(about = "Browse and play the chant catalog", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./chant.toml when present)
    #[arg(short, long, global = true, env = "CHANT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List songs in the catalog
    List {
        /// Filter by title, artist, album or composer
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Play a song
    Play {
        /// Song id
        song_id: String,
        /// Start position in seconds
        #[arg(long, value_parser = parse_seconds)]
        at: Option<Duration>,
    },
    /// Continue the last listened song
    Resume,
    /// Print a share link for a song
    Share {
        /// Song id
        song_id: String,
        /// Position in seconds to include in the link
        #[arg(long, value_parser = parse_seconds)]
        at: Option<Duration>,
    },
    /// Play the song a share link points at
    Open {
        /// Share link
        url: String,
    },
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("invalid number of seconds: {value}"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("seconds must be a non-negative number: {value}"));
    }
    Ok(Duration::from_secs_f64(seconds))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chant_cli=info,chant_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::List { search } => {
            config.validate()?;
            commands::list(&config, search.as_deref()).await?;
        }
        Commands::Play { song_id, at } => {
            config.validate()?;
            commands::play(&config, &TrackId::new(song_id), at).await?;
        }
        Commands::Resume => {
            config.validate()?;
            commands::resume(&config).await?;
        }
        Commands::Share { song_id, at } => {
            commands::share(&config, &TrackId::new(song_id), at)?;
        }
        Commands::Open { url } => {
            config.validate()?;
            commands::open(&config, &url).await?;
        }
    }

    Ok(())
}
