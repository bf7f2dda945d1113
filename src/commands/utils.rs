use crate::{ClientConfig, SpotifyClientImpl, SpotifyCredentials};
use std::collections::{HashSet, VecDeque};
use std::env;

/// Get Spotify credentials from environment variables.
///
/// `SPOTIFY_CLIENT_ID` + `SPOTIFY_CLIENT_SECRET` select the client-credentials
/// flow; otherwise `SPOTIFY_ACCESS_TOKEN` is used as a pre-issued token.
pub fn get_credentials() -> Result<SpotifyCredentials, Box<dyn std::error::Error>> {
    credentials_from(
        env::var("SPOTIFY_CLIENT_ID").ok(),
        env::var("SPOTIFY_CLIENT_SECRET").ok(),
        env::var("SPOTIFY_ACCESS_TOKEN").ok(),
    )
}

fn credentials_from(
    client_id: Option<String>,
    client_secret: Option<String>,
    access_token: Option<String>,
) -> Result<SpotifyCredentials, Box<dyn std::error::Error>> {
    match (client_id, client_secret, access_token) {
        (Some(id), Some(secret), _) if !id.is_empty() && !secret.is_empty() => {
            Ok(SpotifyCredentials::client_credentials(id, secret))
        }
        (_, _, Some(token)) if !token.is_empty() => Ok(SpotifyCredentials::access_token(token)),
        _ => Err(
            "SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET or SPOTIFY_ACCESS_TOKEN must be set".into(),
        ),
    }
}

/// Client settings for the CLI; `max_retries` of 0 turns rate-limit retries off
pub fn client_config(max_retries: u32) -> ClientConfig {
    ClientConfig::new().with_max_retries(max_retries)
}

/// Create the HTTP-backed client used by the CLI
pub fn create_client(credentials: SpotifyCredentials, config: ClientConfig) -> SpotifyClientImpl {
    let http_client = http_client::native::NativeClient::new();
    SpotifyClientImpl::with_config(Box::new(http_client), credentials, config)
}

/// Build the initial worklist: explicit terms first, then a-z if requested.
///
/// Blank and repeated terms are dropped, keeping first occurrence order.
pub fn build_worklist(terms: &[String], alphabet: bool) -> VecDeque<String> {
    let letters = alphabet
        .then(|| ('a'..='z').map(|c| c.to_string()).collect::<Vec<_>>())
        .unwrap_or_default();

    let mut seen = HashSet::new();
    terms
        .iter()
        .map(|t| t.trim().to_string())
        .chain(letters)
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}
