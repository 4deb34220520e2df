//! HTTP response handlers.

use anyhow::{Result, anyhow};
use std::{fs, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::utils::mime::types::PLAIN;

/// Respond with a file. `no_cache` marks files served straight from a
/// source directory.
pub fn respond_file(request: Request, path: &Path, no_cache: bool) -> Result<()> {
    let content_type = crate::utils::mime::from_path(path);
    let mut headers = vec![header("Content-Type", content_type)?];
    if no_cache {
        headers.push(header("Cache-Control", "no-cache")?);
    }

    if is_head_request(&request) {
        return send(request, 200, headers, Vec::new());
    }

    // Check for Range header (video/audio seeking)
    if let Some(range) = get_range_header(&request) {
        return respond_range(request, path, headers, &range);
    }

    let body = fs::read(path).map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
    send(request, 200, headers, body)
}

/// Handle Range request for media files (video/audio seeking).
fn respond_range(
    request: Request,
    path: &Path,
    mut headers: Vec<Header>,
    range: &str,
) -> Result<()> {
    use std::io::{Read, Seek, SeekFrom};

    let file_size = fs::metadata(path)?.len();
    let range = range.strip_prefix("bytes=").unwrap_or(range);
    let Some((start, end)) = parse_range(range, file_size) else {
        headers.push(header("Content-Range", &format!("bytes */{file_size}"))?);
        return send(request, 416, headers, Vec::new());
    };

    let length = end - start + 1;

    // Stream the requested range
    let mut file = fs::File::open(path)?;
    file.seek(SeekFrom::Start(start))?;
    let reader = file.take(length);

    headers.push(header(
        "Content-Range",
        &format!("bytes {start}-{end}/{file_size}"),
    )?);
    headers.push(header("Accept-Ranges", "bytes")?);
    let response = Response::new(
        StatusCode(206),
        headers,
        reader,
        usize::try_from(length).ok(),
        None,
    );

    request.respond(response)?;
    Ok(())
}

/// Parse Range header value "start-end" into inclusive (start, end) bytes.
///
/// `None` when the range cannot be satisfied.
fn parse_range(range: &str, file_size: u64) -> Option<(u64, u64)> {
    let last = file_size.checked_sub(1)?;
    let (s, e) = range.trim().split_once('-')?;
    let (s, e) = (s.trim(), e.trim());

    let (start, end) = match (s.is_empty(), e.is_empty()) {
        // "0-499"
        (false, false) => (s.parse().ok()?, e.parse::<u64>().ok()?.min(last)),
        // "500-"
        (false, true) => (s.parse().ok()?, last),
        // "-500": last 500 bytes
        (true, false) => (file_size.saturating_sub(e.parse().ok()?), last),
        (true, true) => return None,
    };

    (start <= end).then_some((start, end))
}

/// Extract Range header from request.
fn get_range_header(request: &Request) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case("range"))
        .map(|h| h.value.to_string())
}

pub fn respond_not_found(request: Request) -> Result<()> {
    let headers = vec![header("Content-Type", PLAIN)?];
    let body = if is_head_request(&request) {
        Vec::new()
    } else {
        b"404 Not Found".to_vec()
    };
    send(request, 404, headers, body)
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    let headers = vec![header("Content-Type", PLAIN)?];
    send(request, 503, headers, b"503 Service Unavailable".to_vec())
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send(request: Request, status: u16, headers: Vec<Header>, body: Vec<u8>) -> Result<()> {
    let response = headers
        .into_iter()
        .fold(Response::from_data(body), |response, h| response.with_header(h))
        .with_status_code(StatusCode(status));
    request.respond(response)?;
    Ok(())
}

fn header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header `{key}: {value}`"))
}
