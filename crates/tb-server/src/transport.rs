//! Line-oriented transport loop.
//!
//! Reads one JSON command per line, dispatches it, and writes one JSON
//! response per line, flushing after each so the peer never waits on a
//! buffer. Requests are served strictly in arrival order on a single task.
//! Blank lines are skipped without a response; unparseable lines are
//! answered with a `ParseError` envelope carrying a `null` id, and the loop
//! keeps going. EOF on the reader ends the loop normally.
//!
//! All diagnostics go to the tracing subscriber; the writer carries protocol
//! lines only.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, trace, warn};

use tb_types::{BridgeError, BridgeResult};

use crate::dispatch::Dispatcher;
use crate::protocol::{CommandRequest, ResponseEnvelope};

pub struct Transport<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> Transport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Serve commands until the reader reaches EOF.
    ///
    /// # Errors
    ///
    /// Only transport-level failures end the loop early: a read error on the
    /// input or a write error on the output. Command failures are reported
    /// to the peer and never propagate here.
    pub async fn run(mut self, dispatcher: &Dispatcher) -> BridgeResult<()> {
        info!("command transport started");
        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line).await {
                Ok(0) => {
                    debug!("input closed, shutting down");
                    break;
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    trace!(line = %trimmed, "incoming line");

                    let response = match serde_json::from_str::<CommandRequest>(trimmed) {
                        Ok(request) => {
                            debug!(id = %request.id, method = %request.method, "command received");
                            dispatcher.dispatch(request).await
                        }
                        Err(parse_error) => {
                            warn!("unparseable input line: {parse_error}");
                            ResponseEnvelope::error(
                                None,
                                &BridgeError::Parse(parse_error.to_string()),
                            )
                        }
                    };
                    if let Some(body) = &response.error {
                        debug!(code = %body.code, "command failed");
                    }
                    self.write_response(&response).await?;
                }
                Err(read_error) => {
                    error!("failed to read input: {read_error}");
                    return Err(read_error.into());
                }
            }
        }
        Ok(())
    }

    async fn write_response(&mut self, response: &ResponseEnvelope) -> BridgeResult<()> {
        let serialized = serde_json::to_string(response)?;
        self.writer.write_all(serialized.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}
