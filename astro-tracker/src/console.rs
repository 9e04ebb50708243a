//! Line-oriented command console over the tracker handle.

use astro_common::SatelliteId;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;

use crate::tracker::TrackerHandle;

const HELP: &str = "Commands:
  toggle        start or pause automatic tracking
  select <id>   bind a satellite to the map
  status        show tracking state and latest positions
  help          show this message
  quit          stop the tracker and exit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Toggle,
    Select(SatelliteId),
    Status,
    Help,
    Quit,
    Empty,
    /// Recognized command with a bad argument
    Invalid(String),
    Unknown(String),
}

impl ConsoleCommand {
    /// Parse one input line. A leading `/` or `\` is accepted and ignored;
    /// command names are case-insensitive.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let trimmed = trimmed.strip_prefix(['/', '\\']).unwrap_or(trimmed);

        let mut parts = trimmed.split_whitespace();
        let Some(name) = parts.next() else {
            return ConsoleCommand::Empty;
        };

        match name.to_lowercase().as_str() {
            "toggle" | "t" => ConsoleCommand::Toggle,
            "select" | "s" => match parts.next() {
                Some(arg) => match arg.parse::<SatelliteId>() {
                    Ok(id) => ConsoleCommand::Select(id),
                    Err(e) => ConsoleCommand::Invalid(e),
                },
                None => ConsoleCommand::Invalid("select needs a satellite id".to_string()),
            },
            "status" | "st" => ConsoleCommand::Status,
            "help" | "h" | "?" => ConsoleCommand::Help,
            "quit" | "exit" | "q" => ConsoleCommand::Quit,
            _ => ConsoleCommand::Unknown(trimmed.to_string()),
        }
    }
}

/// Read commands until `quit` or end of input.
///
/// Returns `true` when the user asked to quit.
pub async fn run_console<R, W>(handle: TrackerHandle, input: R, mut output: W) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    use tokio::io::AsyncBufReadExt;

    let mut lines = LinesStream::new(input.lines());
    output.write_all(b"Type 'help' for commands.\n").await?;
    output.flush().await?;

    while let Some(line) = lines.next().await {
        let line = line?;
        let reply = match ConsoleCommand::parse(&line) {
            ConsoleCommand::Toggle => match handle.toggle_tracking().await {
                Ok(true) => "Tracking active.\n".to_string(),
                Ok(false) => "Tracking paused.\n".to_string(),
                Err(e) => refused(e),
            },
            ConsoleCommand::Select(id) => match handle.select_satellite(id).await {
                Ok(()) => format!("Selected satellite {}.\n", id),
                Err(e) => refused(e),
            },
            ConsoleCommand::Status => match handle.status().await {
                Ok(status) => status.to_string(),
                Err(e) => refused(e),
            },
            ConsoleCommand::Help => HELP.to_string(),
            ConsoleCommand::Quit => return Ok(true),
            ConsoleCommand::Empty => continue,
            ConsoleCommand::Invalid(reason) => format!("Invalid command: {}\n", reason),
            ConsoleCommand::Unknown(text) => {
                format!("Unknown command '{}'. Type 'help' for commands.\n", text)
            }
        };
        output.write_all(reply.as_bytes()).await?;
        output.flush().await?;
    }

    tracing::info!("Console input closed");
    Ok(false)
}

fn refused(error: crate::error::TrackerError) -> String {
    tracing::warn!("Command refused: {}", error);
    format!("Refused: {}\n", error)
}
