//! Line-protocol client.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

/// One open connection to a cache server.
///
/// Requests are answered in order, one response line per request line.
pub struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    pub async fn connect(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
        })
    }

    /// Send one request line and wait for its response line.
    pub async fn request(&mut self, line: &str) -> io::Result<String> {
        let line = line.trim_end_matches(['\r', '\n']);
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;

        let mut reply = String::new();
        if self.reader.read_line(&mut reply).await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            ));
        }
        Ok(reply.trim_end_matches(['\r', '\n']).to_string())
    }

    pub async fn store(&mut self, key: &str, value: &str) -> io::Result<String> {
        self.request(&format!("STORE {} {}", key, value)).await
    }

    pub async fn retrieve(&mut self, key: &str) -> io::Result<String> {
        self.request(&format!("RETRIEVE {}", key)).await
    }

    pub async fn delete(&mut self, key: &str) -> io::Result<String> {
        self.request(&format!("DELETE {}", key)).await
    }
}
