//! Static file server for a module root.
//!
//! Serves the manifest store and the raw archives over HTTP/1.1 so clients
//! can fetch `/.manifests/manifest.json`, `/.manifests/<name>.json` and
//! `/<name>.zip`. Only regular files under the root are reachable; request
//! paths go through [`SafePath::validate`] like archive entries do.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::Method;
use hyper::Request;
use hyper::Response;
use hyper::StatusCode;
use hyper::body::Incoming;
use hyper::header::CONTENT_LENGTH;
use hyper::header::CONTENT_TYPE;
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::Result;
use crate::ServeConfig;
use crate::types::DestDir;
use crate::types::SafePath;

/// Binds `config.addr` and serves `config.root` until the process exits.
///
/// # Errors
///
/// Returns [`KawaError::Io`](crate::KawaError::Io) if the root is not a
/// directory, the address cannot be bound, or the runtime cannot start.
///
/// # Examples
///
/// ```no_run
/// use kawa_core::ServeConfig;
/// use kawa_core::server::serve;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// serve(&ServeConfig::default())?;
/// # Ok(())
/// # }
/// ```
pub fn serve(config: &ServeConfig) -> Result<()> {
    let listener = std::net::TcpListener::bind(config.addr)?;
    serve_listener(listener, &config.root)
}

/// Serves `root` on an already bound listener until the process exits.
///
/// Runs a single-threaded runtime; each connection is a task on that
/// thread.
///
/// # Errors
///
/// Returns [`KawaError::Io`](crate::KawaError::Io) if the root is not a
/// directory or the runtime cannot start.
pub fn serve_listener(listener: std::net::TcpListener, root: &Path) -> Result<()> {
    let root = Arc::new(DestDir::new(root)?);
    listener.set_nonblocking(true)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()?;
    runtime.block_on(accept_loop(listener, root))
}

async fn accept_loop(listener: std::net::TcpListener, root: Arc<DestDir>) -> Result<()> {
    let listener = TcpListener::from_std(listener)?;
    let addr = listener.local_addr()?;
    info!(
        %addr,
        root = %root.as_path().display(),
        "serving modules"
    );

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let root = Arc::clone(&root);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    let service = service_fn(move |req| handle(Arc::clone(&root), req, peer));
                    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                        debug!(%peer, error = %e, "connection error");
                    }
                });
            }
            Err(e) => warn!(error = %e, "failed to accept connection"),
        }
    }
}

async fn handle(
    root: Arc<DestDir>,
    req: Request<Incoming>,
    peer: SocketAddr,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if method != Method::GET && method != Method::HEAD {
        debug!(%peer, %method, %path, "method not allowed");
        return Ok(status_response(StatusCode::METHOD_NOT_ALLOWED));
    }

    let lookup = {
        let path = path.clone();
        tokio::task::spawn_blocking(move || read_file(&root, &path)).await
    };
    let response = match lookup {
        Ok(Some((file, content))) => {
            let mut response = if method == Method::HEAD {
                let mut response = Response::new(Full::new(Bytes::new()));
                response
                    .headers_mut()
                    .insert(CONTENT_LENGTH, HeaderValue::from(content.len()));
                response
            } else {
                Response::new(Full::new(Bytes::from(content)))
            };
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type(&file)));
            response
        }
        Ok(None) => status_response(StatusCode::NOT_FOUND),
        Err(e) => {
            warn!(%path, error = %e, "file lookup task failed");
            status_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    };

    debug!(%peer, %method, %path, status = response.status().as_u16(), "request");
    Ok(response)
}

/// Resolves a request path under `root` and reads the file.
///
/// Returns `None` for anything that is not a regular file inside the root.
fn read_file(root: &DestDir, request_path: &str) -> Option<(PathBuf, Vec<u8>)> {
    let file = resolve(root, request_path)?;
    let content = std::fs::read(&file).ok()?;
    Some((file, content))
}

/// Maps a request path onto a regular file under `root`.
#[must_use]
pub fn resolve(root: &DestDir, request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode(request_path)?;
    let relative = decoded.trim_start_matches('/');
    let safe = SafePath::validate(Path::new(relative), root).ok()?;
    if safe.is_root() {
        return None;
    }
    let file = root.join(&safe);
    file.is_file().then_some(file)
}

/// Decodes `%XX` escapes. Returns `None` for malformed escapes or
/// non-UTF-8 results.
fn percent_decode(path: &str) -> Option<String> {
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn content_type(file: &Path) -> &'static str {
    match file.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => "application/json",
        Some(ext) if ext.eq_ignore_ascii_case("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

fn status_response(status: StatusCode) -> Response<Full<Bytes>> {
    let reason = status.canonical_reason().unwrap_or("error");
    let mut response = Response::new(Full::new(Bytes::from(format!("{reason}\n"))));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}
