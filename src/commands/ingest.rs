use crate::commands::utils::build_worklist;
use crate::{
    ArtistStorage, IngestConfig, JsonLinesStorage, SearchIngestionStrategy, SpotifyClientImpl,
};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub terms: Vec<String>,
    pub alphabet: bool,
    pub max_pages: u32,
    pub expand_genres: bool,
    pub output: Option<PathBuf>,
    pub fresh: bool,
}

/// Handle the ingest command: run the search strategy into a JSONL file
pub async fn handle_ingest_command(
    client: &SpotifyClientImpl,
    options: IngestOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut to_process = build_worklist(&options.terms, options.alphabet);
    if to_process.is_empty() {
        return Err("Nothing to ingest: pass search terms or --alphabet".into());
    }

    let mut storage = match options.output {
        Some(path) => JsonLinesStorage::new(path),
        None => JsonLinesStorage::open_default()?,
    };

    let mut visited_ids = if options.fresh {
        HashSet::new()
    } else {
        storage.load_artist_ids().await?
    };

    println!(
        "📥 Ingesting {} terms into {} ({} artists already known)",
        to_process.len(),
        storage.path().display(),
        visited_ids.len()
    );

    let config = IngestConfig::default()
        .with_max_pages(options.max_pages.max(1))
        .with_genre_expansion(options.expand_genres);

    let mut strategy =
        SearchIngestionStrategy::new(client, &mut storage, &mut visited_ids, &mut to_process)
            .with_config(config);

    let result = strategy.run().await;
    let stats = strategy.stats().clone();
    drop(strategy);

    match result {
        Ok(()) => {
            println!("✅ Done: {stats}");
            Ok(())
        }
        Err(e) => {
            println!("⚠️  Stopped after: {stats}");
            println!("   {} terms were left unprocessed", to_process.len());
            Err(e.into())
        }
    }
}
