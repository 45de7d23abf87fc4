//! HTTP server for rendered documents and navigation fragments.

mod lifecycle;
mod response;

use crate::{
    config::{Config, cfg},
    core::UrlPath,
    debug, log,
    site::Site,
};
use anyhow::Result;
use crossbeam::channel;
use std::net::SocketAddr;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    site: Arc<Site>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server without starting the request loop
///
/// Binding first lets the caller finish wiring (or fail fast on a busy
/// port range) before requests are accepted
pub fn bind_server(site: Arc<Site>) -> Result<BoundServer> {
    let config = cfg();
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        addr,
        site,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Get the bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the request loop (blocking).
    pub fn run(self) -> Result<()> {
        run_request_loop(&self.server, &self.site);

        // The loop only exits after the Ctrl+C handler unblocks the
        // server; give the handler's signal a moment to arrive before
        // tearing down the worker pool.
        let _ = self
            .shutdown_rx
            .recv_timeout(std::time::Duration::from_millis(500));
        Ok(())
    }
}

fn run_request_loop(server: &Server, site: &Arc<Site>) {
    let config = cfg();
    // Use thread pool to handle requests concurrently
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        let config = Arc::clone(&config);
        let site = Arc::clone(site);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &site, &config) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, site: &Site, config: &Config) -> Result<()> {
    // Early exit if shutdown requested
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let url = UrlPath::from_browser(request.url());
    debug!("serve"; "{}", url);

    let mode = config.render.mode;
    if url.is_fragment_request() {
        response::respond_fragment(request, site, &url, mode)
    } else {
        response::respond_document(request, site, &url, mode)
    }
}
