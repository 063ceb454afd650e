//! beanstalkd adapter.
//!
//! Only the requests the interactive front end issues are implemented:
//! `use`, `put`, `list-tubes`, `stats-tube` and `quit`. The client is generic
//! over its byte stream so it can run over TCP in production and over an
//! in-memory pipe in tests.
//!
//! Changing the tube does not talk to the server immediately. The `use`
//! request is sent right before the next `put`, so a rejected tube name is
//! reported by that `put`.

use super::{QueueOperations, TubeStats};
use crate::error::QueueError;
use crate::settings::Settings;
use async_trait::async_trait;
use serde_yaml::Value;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufStream,
};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Default beanstalkd port.
pub const DEFAULT_PORT: u16 = 11300;

/// Largest `OK <bytes>` body accepted from the server. Anything longer is
/// treated as a corrupt reply instead of being allocated.
pub const MAX_BODY_LEN: usize = 16 * 1024 * 1024;

/// Replies that mean the server refused a request, as opposed to a reply we
/// do not understand.
const ERROR_REPLIES: [&str; 9] = [
    "OUT_OF_MEMORY",
    "INTERNAL_ERROR",
    "BAD_FORMAT",
    "UNKNOWN_COMMAND",
    "EXPECTED_CRLF",
    "JOB_TOO_BIG",
    "DRAINING",
    "NOT_FOUND",
    "BURIED",
];

pub struct BeanstalkClient<S = TcpStream> {
    stream: BufStream<S>,
    settings: Settings,
    // Tube the server currently has selected for this connection.
    used_tube: String,
}

impl BeanstalkClient<TcpStream> {
    pub async fn connect(host: &str, port: u16) -> Result<Self, QueueError> {
        let address = format!("{}:{}", host, port);
        let stream = TcpStream::connect(&address).await?;
        info!("Connected to beanstalkd at {}", address);
        Ok(Self::new(stream))
    }
}

impl<S> BeanstalkClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already connected stream. The server starts out using the
    /// `default` tube, so the settings start from their defaults too.
    pub fn new(stream: S) -> Self {
        let settings = Settings::default();
        Self {
            stream: BufStream::new(stream),
            used_tube: settings.tube().to_string(),
            settings,
        }
    }

    /// Settings the next `put` will be sent with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    async fn send(&mut self, request: &str, body: Option<&[u8]>) -> Result<(), QueueError> {
        debug!(request, "Sending beanstalkd request");
        self.stream.write_all(request.as_bytes()).await?;
        self.stream.write_all(b"\r\n").await?;
        if let Some(body) = body {
            self.stream.write_all(body).await?;
            self.stream.write_all(b"\r\n").await?;
        }
        self.stream.flush().await?;
        Ok(())
    }

    async fn read_reply(&mut self) -> Result<String, QueueError> {
        let mut line = String::new();
        if self.stream.read_line(&mut line).await? == 0 {
            return Err(QueueError::Closed);
        }
        let reply = line.trim_end_matches(['\r', '\n']).to_string();
        debug!(reply = %reply, "Received beanstalkd reply");
        Ok(reply)
    }

    /// Read `framed` bytes (body plus trailing CRLF) and return the body.
    async fn read_body(&mut self, framed: usize) -> Result<Vec<u8>, QueueError> {
        let mut body = vec![0u8; framed];
        self.stream
            .read_exact(&mut body)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::UnexpectedEof => QueueError::Closed,
                _ => QueueError::Io(e),
            })?;
        body.truncate(framed.saturating_sub(2));
        Ok(body)
    }

    /// Send a request whose successful reply is `OK <bytes>` followed by a
    /// YAML document, and decode that document.
    async fn fetch_yaml(&mut self, command: &str, request: &str) -> Result<Value, QueueError> {
        self.send(request, None).await?;
        let reply = self.read_reply().await?;

        let len = reply
            .strip_prefix("OK ")
            .and_then(|len| len.trim().parse::<usize>().ok())
            .ok_or_else(|| reply_error(command, &reply))?;
        let framed = len
            .checked_add(2)
            .filter(|_| len <= MAX_BODY_LEN)
            .ok_or_else(|| {
                warn!(command, len, "Refusing oversized reply body");
                QueueError::UnexpectedReply {
                    command: command.to_string(),
                    reply: reply.clone(),
                }
            })?;
        let body = self.read_body(framed).await?;

        serde_yaml::from_slice(&body).map_err(|source| QueueError::MalformedBody {
            command: command.to_string(),
            source,
        })
    }

    async fn ensure_tube(&mut self) -> Result<(), QueueError> {
        if self.used_tube == self.settings.tube() {
            return Ok(());
        }

        let tube = self.settings.tube().to_string();
        self.send(&format!("use {}", tube), None).await?;
        let reply = self.read_reply().await?;
        match reply.strip_prefix("USING ") {
            Some(name) if name == tube => {
                self.used_tube = tube;
                Ok(())
            }
            _ => Err(reply_error("use", &reply)),
        }
    }
}

#[async_trait]
impl<S> QueueOperations for BeanstalkClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn put(&mut self, payload: &[u8]) -> Result<String, QueueError> {
        self.ensure_tube().await?;

        let request = format!(
            "put {} {} {} {}",
            self.settings.priority(),
            self.settings.delay(),
            self.settings.ttr(),
            payload.len()
        );
        self.send(&request, Some(payload)).await?;

        let reply = self.read_reply().await?;
        match reply.strip_prefix("INSERTED ") {
            Some(id) if id.trim().parse::<u64>().is_ok() => Ok(format!("INSERTED {}", id.trim())),
            _ => Err(reply_error("put", &reply)),
        }
    }

    async fn tube_names(&mut self) -> Result<Vec<String>, QueueError> {
        let document = self.fetch_yaml("list-tubes", "list-tubes").await?;
        match document {
            Value::Sequence(items) => Ok(items.iter().map(scalar_to_string).collect()),
            Value::Null => Ok(Vec::new()),
            other => Err(QueueError::UnexpectedReply {
                command: "list-tubes".to_string(),
                reply: scalar_to_string(&other),
            }),
        }
    }

    async fn stats_tube(&mut self, tube: &str) -> Result<TubeStats, QueueError> {
        let document = self
            .fetch_yaml("stats-tube", &format!("stats-tube {}", tube))
            .await?;

        let mapping = match document {
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(QueueError::UnexpectedReply {
                    command: "stats-tube".to_string(),
                    reply: scalar_to_string(&other),
                });
            }
        };

        let mut stats = TubeStats::new(tube);
        for (key, value) in &mapping {
            stats = stats.with_field(scalar_to_string(key), scalar_to_string(value));
        }
        Ok(stats)
    }

    fn set_tube(&mut self, tube: &str) {
        self.settings.set_tube(tube);
    }

    fn set_delay(&mut self, seconds: u32) {
        self.settings.set_delay(seconds);
    }

    fn set_priority(&mut self, priority: u32) {
        self.settings.set_priority(priority);
    }

    fn set_ttr(&mut self, seconds: u32) {
        self.settings.set_ttr(seconds);
    }

    async fn close(&mut self) -> Result<(), QueueError> {
        self.send("quit", None).await?;
        self.stream.shutdown().await?;
        info!("Closed beanstalkd connection");
        Ok(())
    }
}

fn reply_error(command: &str, reply: &str) -> QueueError {
    let word = reply.split(' ').next().unwrap_or_default();
    if ERROR_REPLIES.contains(&word) {
        QueueError::Rejected {
            command: command.to_string(),
            reply: reply.to_string(),
        }
    } else {
        QueueError::UnexpectedReply {
            command: command.to_string(),
            reply: reply.to_string(),
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
