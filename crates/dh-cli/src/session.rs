//! Drives a [`Plugin`] from newline-delimited JSON and writes each outbound
//! message as one JSON line.

use anyhow::{Context, Result};
use dh_core::host::{AssetRegistry, Canvas, FontLoader};
use dh_core::message::{Inbound, Outbound};
use dh_engine::Plugin;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Counters for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub handled: usize,
    pub rejected: usize,
    pub posted: usize,
}

/// Read messages until end of input or until the plugin closes.
///
/// A line that is not a message envelope is logged and skipped; only I/O
/// failures end the session early.
pub async fn run<C, F, A, R, W>(
    plugin: &mut Plugin<C, F, A>,
    input: R,
    output: &mut W,
) -> Result<SessionSummary>
where
    C: Canvas,
    F: FontLoader,
    A: AssetRegistry,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = SessionSummary::default();
    summary.posted += post(output, &plugin.start()).await?;

    let mut lines = input.lines();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await.context("reading input")? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let message = match Inbound::from_json(line) {
            Ok(message) => message,
            Err(e) => {
                log::error!("line {line_no}: {e}");
                summary.rejected += 1;
                continue;
            }
        };

        let out = plugin.handle(message).await;
        summary.handled += 1;
        summary.posted += post(output, &out).await?;

        if plugin.is_closed() {
            log::info!("plugin closed at line {line_no}");
            break;
        }
    }

    output.flush().await.context("flushing output")?;
    Ok(summary)
}

async fn post<W: AsyncWrite + Unpin>(output: &mut W, messages: &[Outbound]) -> Result<usize> {
    for message in messages {
        let mut line = serde_json::to_string(message).context("encoding outbound message")?;
        line.push('\n');
        output
            .write_all(line.as_bytes())
            .await
            .context("writing output")?;
    }
    Ok(messages.len())
}
