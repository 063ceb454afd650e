//! The interactive loop.
//!
//! A [`Session`] owns the queue backend and the effective [`Settings`]. Each
//! input line is handed to a [`CommandParser`] that borrows both, and the
//! outcome is written back before the next prompt.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};
use tubeline::{CommandParser, QueueOperations, Settings};

use crate::config::Config;
use crate::utils::display::{render_banner, render_error, render_outcome};

pub struct Session<Q> {
    queue: Q,
    settings: Settings,
    address: String,
}

impl<Q> Session<Q>
where
    Q: QueueOperations,
{
    /// Build a session and push the configured settings to the backend.
    pub fn new(config: &Config, mut queue: Q) -> Self {
        let settings = config.initial_settings();
        queue.set_tube(settings.tube());
        queue.set_priority(settings.priority());
        queue.set_ttr(settings.ttr());
        queue.set_delay(settings.delay());

        Self {
            queue,
            settings,
            address: config.address(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Prompt, read and execute lines until `input` is exhausted, then close
    /// the backend.
    pub async fn run<R, W>(&mut self, mut input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            let prompt = render_banner(&self.address, &self.settings) + "Command:\n";
            output.write_all(prompt.as_bytes()).await?;
            output.flush().await?;

            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            // Payloads are sent byte for byte, so a line that is not UTF-8 is
            // refused rather than repaired.
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "Rejected line with invalid UTF-8");
                    let message = format!("input is not valid UTF-8: {}", e);
                    output
                        .write_all(format!("{}\n", render_error(&message)).as_bytes())
                        .await?;
                    continue;
                }
            };

            let outcome = CommandParser::new(&mut self.queue)
                .parse(line, &mut self.settings)
                .await;
            if let Err(e) = &outcome {
                debug!(kind = ?e.kind(), "Command rejected");
            }

            output
                .write_all(format!("{}\n", render_outcome(&outcome)).as_bytes())
                .await?;
        }

        info!("End of input, closing session");
        self.queue.close().await?;
        output.write_all(b"connection closed\n").await?;
        output.flush().await?;
        Ok(())
    }
}
