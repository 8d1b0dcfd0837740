mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use keener_rank::{api, Config, PreferenceMethod};

#[derive(Parser)]
#[command(name = "keener")]
#[command(about = "Keener direct and nonlinear rankings from season game results")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank a season with both methods
    Rank {
        /// League CSV: date,home,away,home-score,away-score,win
        #[arg(short, long)]
        games: PathBuf,
        /// Teams CSV with an `abbr` column
        #[arg(short, long)]
        teams: PathBuf,
        /// Preference matrix construction: "all" or "distribute"
        #[arg(short, long)]
        method: Option<String>,
        #[arg(long)]
        max_iter: Option<usize>,
        #[arg(long)]
        tol: Option<f64>,
        /// Save CSV and LaTeX tables to this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Save to the configured output directory
        #[arg(long)]
        save: bool,
    },
    /// Print the scores, games, wins and preference matrices
    Matrices {
        #[arg(short, long)]
        games: PathBuf,
        #[arg(short, long)]
        teams: PathBuf,
        #[arg(short, long)]
        method: Option<String>,
    },
    /// Start the API server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Rank {
            games,
            teams,
            method,
            max_iter,
            tol,
            output_dir,
            save,
        } => {
            if let Some(method) = method {
                config.method = method.parse::<PreferenceMethod>()?;
            }
            if let Some(max_iter) = max_iter {
                config.nonlinear.max_iter = max_iter;
            }
            if let Some(tol) = tol {
                config.nonlinear.tol = tol;
            }
            config.validate()?;

            let save_to = output_dir.or_else(|| save.then(|| config.output_dir.clone()));
            tracing::info!("Ranking season from {}", games.display());
            cli::rank_season(&games, &teams, &config, save_to)?;
        }
        Commands::Matrices {
            games,
            teams,
            method,
        } => {
            let method = match method {
                Some(raw) => raw.parse::<PreferenceMethod>()?,
                None => config.method,
            };
            cli::show_matrices(&games, &teams, method)?;
        }
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            tracing::info!("Starting Keener ranking API server on port {}", config.port);
            api::serve(config).await?;
        }
    }

    Ok(())
}
