//! Local landing page for the sign-in redirect.
//!
//! Configure the backend to redirect to `http://127.0.0.1:<port>/dashboard`.
//! The listener answers the request carrying `?token=` with a `303 See Other`
//! to the same location minus the token, so the browser's visible URL no
//! longer holds the credential, and hands the full landing URL to the caller.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::auth::capture_credential;

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("port {0} is already in use; set callback_port in config.toml")]
    PortInUse(u16),
    #[error("sign-in failed: {0}")]
    Provider(String),
    #[error("sign-in cancelled")]
    Cancelled,
}

async fn write_response(
    stream: &mut TcpStream,
    status: &str,
    extra_headers: &str,
    body: &str,
) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 {status}\r\n\
         Content-Type: text/html; charset=utf-8\r\n\
         {extra_headers}\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await
}

const SIGNED_IN_PAGE: &str = "<html><body><h2>Signed in.</h2>\
    <p>You can close this tab and return to the terminal.</p></body></html>";

const FAILED_PAGE: &str = "<html><body><h2>Sign-in failed.</h2></body></html>";

/// How long an accepted connection may stay silent before it is dropped.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

const BIND_RETRIES: u32 = 10;
const BIND_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Parse the request target of an HTTP request head into a URL on `origin`.
fn landing_url(request: &str, origin: &str) -> Option<Url> {
    let request_line = request.lines().next()?;
    let target = request_line.split_whitespace().nth(1)?;
    Url::parse(origin).ok()?.join(target).ok()
}

/// Answer one request. `Some` ends the sign-in wait.
async fn serve_connection(
    stream: &mut TcpStream,
    origin: &str,
) -> std::io::Result<Option<Result<Url, CallbackError>>> {
    let mut buf = vec![0u8; 8192];
    let n = timeout(READ_TIMEOUT, stream.read(&mut buf))
        .await
        .map_err(|_| std::io::Error::from(std::io::ErrorKind::TimedOut))??;
    let request = String::from_utf8_lossy(&buf[..n]);

    let Some(landing) = landing_url(&request, origin) else {
        write_response(stream, "400 Bad Request", "", "").await?;
        return Ok(None);
    };

    let params: HashMap<String, String> = landing.query_pairs().into_owned().collect();
    if let Some(error) = params.get("error") {
        write_response(stream, "200 OK", "", FAILED_PAGE).await?;
        return Ok(Some(Err(CallbackError::Provider(error.clone()))));
    }

    match capture_credential(&landing) {
        Some((_, stripped)) => {
            let location = format!(
                "Location: {}{}\r\n",
                stripped.path(),
                stripped.query().map(|q| format!("?{q}")).unwrap_or_default()
            );
            write_response(stream, "303 See Other", &location, "").await?;
            Ok(Some(Ok(landing)))
        }
        None => {
            write_response(stream, "200 OK", "", SIGNED_IN_PAGE).await?;
            Ok(None)
        }
    }
}

/// Bind the landing port, waiting briefly for a superseded listener to let go.
async fn bind(port: u16) -> Result<TcpListener, CallbackError> {
    let mut attempts = 0;
    loop {
        match TcpListener::bind(("127.0.0.1", port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                attempts += 1;
                if attempts > BIND_RETRIES {
                    return Err(CallbackError::PortInUse(port));
                }
                tokio::time::sleep(BIND_RETRY_DELAY).await;
            }
            Err(e) => return Err(CallbackError::Io(e)),
        }
    }
}

/// Serve the landing redirect until a request carries a token.
///
/// Each connection is handled on its own task, so a silent or broken socket
/// never holds up the next one. Requests without a token (the post-redirect
/// reload, favicons) are answered and ignored. Cancelling `cancel` stops the
/// listener and every open connection.
pub async fn await_landing(port: u16, cancel: CancellationToken) -> Result<Url, CallbackError> {
    let listener = bind(port).await?;
    let origin = format!("http://127.0.0.1:{port}");
    tracing::info!(%origin, "waiting for sign-in redirect");

    let connections = cancel.child_token();
    let _stop_connections = connections.clone().drop_guard();
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Err(CallbackError::Cancelled),
            Some(outcome) = outcome_rx.recv() => return outcome,
            accepted = listener.accept() => {
                let (mut stream, peer) = accepted?;
                let origin = origin.clone();
                let outcome_tx = outcome_tx.clone();
                let stop = connections.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = stop.cancelled() => {}
                        served = serve_connection(&mut stream, &origin) => match served {
                            Ok(Some(outcome)) => {
                                let _ = outcome_tx.send(outcome);
                            }
                            Ok(None) => {}
                            Err(e) => tracing::debug!(%peer, "sign-in connection dropped: {e}"),
                        },
                    }
                });
            }
        }
    }
}
