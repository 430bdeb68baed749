//! TCP front end speaking the line protocol.
//!
//! One tokio task per connection. Each task reads a request line, hands it to
//! the [`RequestRouter`] (which completes synchronously without awaiting) and
//! writes the response line back, so no ring or store lock is ever held
//! across an `.await`.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use router::{ProtocolError, RequestRouter, Response};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

/// Per-connection limits.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Connections with no complete request for this long are closed.
    pub idle_timeout: Duration,
    /// Longest request line accepted, excluding the line terminator.
    pub max_line_len: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

/// Accept connections on `listener` until `shutdown` completes.
///
/// Connections already accepted keep running on their own tasks.
pub async fn serve<F>(
    listener: TcpListener,
    router: Arc<RequestRouter>,
    settings: ServerSettings,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested, no longer accepting connections");
                return Ok(());
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, addr)) => {
                        debug!(%addr, "connection accepted");
                        let router = Arc::clone(&router);
                        let settings = settings.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, addr, router, settings).await {
                                warn!(%addr, error = %e, "connection failed");
                            }
                            debug!(%addr, "connection closed");
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "error accepting connection");
                    }
                }
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    router: Arc<RequestRouter>,
    settings: ServerSettings,
) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = Vec::with_capacity(256);
    // Room for the longest accepted line plus "\r\n".
    let read_limit = settings.max_line_len as u64 + 2;

    loop {
        line.clear();
        let mut limited = (&mut reader).take(read_limit);
        let n = match timeout(settings.idle_timeout, limited.read_until(b'\n', &mut line)).await {
            Ok(result) => result?,
            Err(_) => {
                debug!(%addr, "idle timeout");
                return Ok(());
            }
        };
        if n == 0 {
            return Ok(());
        }

        let body = trim_line_ending(&line);
        let response = if body.len() > settings.max_line_len {
            warn!(%addr, limit = settings.max_line_len, "request line too long, closing");
            Response::Protocol(ProtocolError::LineTooLong)
        } else {
            match std::str::from_utf8(body) {
                Ok(text) => router.handle_line(text),
                Err(_) => Response::Protocol(ProtocolError::InvalidEncoding),
            }
        };
        if response.is_error() {
            debug!(%addr, reply = %response, "request rejected");
        }
        writer.write_all(&response.to_line()).await?;

        if response.closes_connection() {
            writer.shutdown().await?;
            return Ok(());
        }
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
