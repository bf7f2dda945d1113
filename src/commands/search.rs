use crate::{Artist, SpotifyClient, SpotifyClientImpl};

/// Handle the search command: one page of artist results
pub async fn handle_search_command(
    client: &SpotifyClientImpl,
    query: &str,
    offset: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Searching artists for '{query}'...");

    let page = client.search_artists(query, offset).await?;
    let results = page.artists;

    if results.items.is_empty() {
        println!("No artists found");
        return Ok(());
    }

    let (first, last) = result_window(results.offset, results.items.len());
    println!();
    for (number, item) in (first..).zip(results.items) {
        let artist = Artist::from(item);
        println!("{number:>4}. {artist}  (popularity {})", artist.popularity);
    }

    println!();
    println!("Showing {first}-{last} of {} results", results.total);
    if let (Some(_), Ok(next_offset)) = (results.next, u32::try_from(last)) {
        println!("More results: --offset {next_offset}");
    }

    Ok(())
}

/// 1-based numbers of the first and last result on a page.
fn result_window(offset: u32, shown: usize) -> (u64, u64) {
    let start = u64::from(offset);
    (start + 1, start + shown as u64)
}
