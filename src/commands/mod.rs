pub mod ingest;
pub mod search;
pub mod utils;

use crate::SpotifyClientImpl;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest artists for a list of search terms
    ///
    /// Every term is searched, result pages are followed up to --max-pages,
    /// and each artist not already stored is appended to the output file.
    ///
    /// Usage examples:
    /// # Ingest artists matching two terms
    /// verse-ingest ingest radiohead "boards of canada"
    ///
    /// # Sweep the alphabet, following genres of every new artist
    /// verse-ingest ingest --alphabet --expand-genres
    ///
    /// # Single page per term into a custom file, ignoring earlier runs
    /// verse-ingest ingest a b c --max-pages 1 --output artists.jsonl --fresh
    Ingest {
        /// Search terms to seed the worklist with
        terms: Vec<String>,

        /// Also seed the worklist with the letters a-z
        #[arg(long)]
        alphabet: bool,

        /// Maximum result pages fetched per term
        #[arg(long, default_value = "20")]
        max_pages: u32,

        /// Queue a genre search for every genre of each new artist
        #[arg(long)]
        expand_genres: bool,

        /// Output file (defaults to the XDG data directory)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Do not seed the visited-set from artists already in the output file
        #[arg(long)]
        fresh: bool,
    },

    /// Run a single artist search and print the results
    ///
    /// Usage examples:
    /// verse-ingest search "aphex twin"
    /// verse-ingest search 'genre:"shoegaze"' --offset 50
    Search {
        /// Search query
        query: String,

        /// Result offset to start from
        #[arg(long, default_value = "0")]
        offset: u32,
    },
}

pub async fn execute_command(
    command: Commands,
    client: &SpotifyClientImpl,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Ingest {
            terms,
            alphabet,
            max_pages,
            expand_genres,
            output,
            fresh,
        } => {
            let options = ingest::IngestOptions {
                terms,
                alphabet,
                max_pages,
                expand_genres,
                output,
                fresh,
            };
            ingest::handle_ingest_command(client, options).await
        }
        Commands::Search { query, offset } => {
            search::handle_search_command(client, &query, offset).await
        }
    }
}
