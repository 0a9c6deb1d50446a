use crate::cli::QuickCheckArgs;
use crate::config::Config;
use crate::fs::default_fs;
use crate::host::{CommandSink, DocumentSnapshot, NodeTree};
use crate::protocol::{ClientEvent, ServerEvent};
use crate::session::QuickCheckSession;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;

use super::CommandContext;

pub fn cmd_quick_check(args: QuickCheckArgs) -> i32 {
    let ctx = match CommandContext::new(&args.document, &args.thresholds, default_fs()) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    let CommandContext {
        mut document,
        config,
        runtime,
        ..
    } = ctx;

    runtime.block_on(run_session(
        &mut document,
        config,
        tokio::io::stdin(),
        tokio::io::stdout(),
    ))
}

/// Read one JSON event per line from `input` and answer with one JSON
/// message per line on `output`, until `input` closes.
///
/// Host commands queued by an event are applied to `document` before the
/// next event is read.
pub async fn run_session<R, W>(
    document: &mut DocumentSnapshot,
    config: Config,
    input: R,
    mut output: W,
) -> i32
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (sink, mut commands) = CommandSink::channel();
    let mut session = QuickCheckSession::new(config).with_commands(sink);
    let mut lines = LinesStream::new(BufReader::new(input).lines());

    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "failed to read event stream");
                return 1;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let mut responses = Vec::new();
        match serde_json::from_str::<ClientEvent>(&line) {
            Ok(event) => {
                if let ClientEvent::SelectionChanged { nodes } = &event {
                    let selected = nodes.iter().filter_map(|id| document.find(id)).collect();
                    document.set_selection(selected);
                }
                responses.extend(session.dispatch(&*document, event).await);
            }
            Err(e) => responses.push(ServerEvent::error(format!("Invalid event: {}", e))),
        }

        while let Ok(command) = commands.try_recv() {
            if let Err(e) = document.apply(&command) {
                tracing::warn!(node_id = command.node_id(), error = %e, "host command failed");
                responses.push(ServerEvent::error(e.to_string()));
            }
        }

        for response in &responses {
            if let Err(e) = write_message(&mut output, response).await {
                tracing::error!(error = %e, "failed to write response");
                return 1;
            }
        }
    }

    0
}

async fn write_message<W: AsyncWrite + Unpin>(
    output: &mut W,
    message: &ServerEvent,
) -> std::io::Result<()> {
    let mut json = serde_json::to_string(message).map_err(std::io::Error::other)?;
    json.push('\n');
    output.write_all(json.as_bytes()).await?;
    output.flush().await
}
