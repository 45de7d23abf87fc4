//! HTTP response handlers.
//!
//! Every rendered response is sent with `Cache-Control: no-store`; full
//! documents additionally carry the rolling render key so an intermediary
//! LRU cache can never hand back a stale shell.

use crate::core::{BuildMode, UrlPath};
use crate::document;
use crate::site::Site;
use anyhow::Result;
use tiny_http::{Header, Method, Request, Response, StatusCode};

const HTML: &str = "text/html; charset=utf-8";
const JSON: &str = "application/json";

/// Render key header on full-document responses.
const RENDER_KEY_HEADER: &str = "X-Sprig-Render";

/// Respond with a fully assembled HTML document.
pub fn respond_document(request: Request, site: &Site, url: &UrlPath, mode: BuildMode) -> Result<()> {
    let doc = document::render_document(site, url, mode);

    if is_head_request(&request) {
        return send_head(request, doc.status, HTML, Some(doc.render_key));
    }
    send_body(
        request,
        doc.status,
        HTML,
        doc.html.into_bytes(),
        Some(doc.render_key),
    )
}

/// Respond with the JSON fragment pair for a client navigation.
pub fn respond_fragment(request: Request, site: &Site, url: &UrlPath, mode: BuildMode) -> Result<()> {
    let fragment = document::render_fragment(site, url, mode);
    let body = serde_json::to_vec(&fragment)?;

    if is_head_request(&request) {
        return send_head(request, 200, JSON, None);
    }
    send_body(request, 200, JSON, body, None)
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    let response = Response::from_data(b"503 Service Unavailable".to_vec())
        .with_status_code(StatusCode(503))
        .with_header(make_header("Content-Type", "text/plain"));
    request.respond(response)?;
    Ok(())
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(
    request: Request,
    status: u16,
    content_type: &'static str,
    render_key: Option<u64>,
) -> Result<()> {
    let mut response = Response::empty(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("Cache-Control", "no-store"));
    if let Some(key) = render_key {
        response = response.with_header(render_key_header(key));
    }
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
    render_key: Option<u64>,
) -> Result<()> {
    let mut response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type))
        .with_header(make_header("Cache-Control", "no-store"));
    if let Some(key) = render_key {
        response = response.with_header(render_key_header(key));
    }
    request.respond(response)?;
    Ok(())
}

fn render_key_header(key: u64) -> Header {
    Header::from_bytes(RENDER_KEY_HEADER, key.to_string().as_bytes()).unwrap()
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}
