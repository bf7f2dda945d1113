use clap::Parser;
use verse_ingest::commands::{
    execute_command,
    utils::{client_config, create_client, get_credentials},
    Commands,
};

/// Spotify artist ingestion
#[derive(Parser)]
#[command(
    name = "verse-ingest",
    about = "Ingest artists from the Spotify search API",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    /// Retries after a rate-limited request (0 disables retrying)
    #[arg(long, global = true, default_value = "3")]
    max_retries: u32,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let credentials = match get_credentials() {
        Ok(creds) => creds,
        Err(e) => {
            eprintln!("❌ Error: {e}");
            eprintln!();
            eprintln!("Please set the following environment variables:");
            eprintln!("  SPOTIFY_CLIENT_ID=your_client_id");
            eprintln!("  SPOTIFY_CLIENT_SECRET=your_client_secret");
            eprintln!();
            eprintln!("or provide a ready-made token:");
            eprintln!("  SPOTIFY_ACCESS_TOKEN=your_token");
            std::process::exit(1);
        }
    };

    log::debug!("Using credentials: {credentials:?}");
    let client = create_client(credentials, client_config(args.max_retries));

    if let Err(e) = execute_command(args.command, &client).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
