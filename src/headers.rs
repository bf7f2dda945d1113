use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_client::Request;

const USER_AGENT: &str = concat!("verse-ingest/", env!("CARGO_PKG_VERSION"));

/// Add headers every Spotify request carries
pub fn add_common_headers(request: &mut Request) {
    let _ = request.insert_header("User-Agent", USER_AGENT);
    let _ = request.insert_header("Accept", "application/json");
}

/// Add headers for an authenticated Web API request
pub fn add_api_headers(request: &mut Request, access_token: &str) {
    add_common_headers(request);
    let _ = request.insert_header("Authorization", format!("Bearer {access_token}"));
}

/// Add headers for the client-credentials token request
pub fn add_token_headers(request: &mut Request, client_id: &str, client_secret: &str) {
    add_common_headers(request);
    let _ = request.insert_header(
        "Authorization",
        format!("Basic {}", basic_credentials(client_id, client_secret)),
    );
    let _ = request.insert_header("Content-Type", "application/x-www-form-urlencoded");
}

/// Base64 `id:secret` pair for HTTP Basic auth
pub fn basic_credentials(client_id: &str, client_secret: &str) -> String {
    STANDARD.encode(format!("{client_id}:{client_secret}"))
}
