//! Small shared helpers.

use reqwest::Response;

/// Read at most `cap` bytes of a response body. Chunks are pulled off the
/// wire incrementally and reading stops at the first chunk that crosses the
/// cap, so an oversized reply is never fully buffered.
pub async fn read_body_capped(
    mut response: Response,
    cap: usize,
) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let remaining = cap - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
