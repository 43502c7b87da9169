//! Keyboard commands typed on stdin.

use std::io::BufRead;
use std::sync::Arc;

use lib_coldchain::ingestors::{DeliveryLoader, TelemetryPoller};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    /// Load the history of one delivery and select it.
    Detail(String),
    ClearDetail,
    /// Re-fetch the active delivery list.
    Deliveries,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let head = parts.next()?;
        let command = match head.to_ascii_lowercase().as_str() {
            "r" | "refresh" => Command::Refresh,
            "d" | "detail" => match parts.next() {
                Some(id) => Command::Detail(id.to_string()),
                None => Command::Unknown(line.trim().to_string()),
            },
            "c" | "close" => Command::ClearDetail,
            "l" | "list" => Command::Deliveries,
            "q" | "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(line.trim().to_string()),
        };
        Some(command)
    }
}

/// Reads stdin on a plain thread so a pending read never holds up runtime
/// shutdown. The thread ends on EOF or once the receiver is dropped.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

pub async fn run(poller: Arc<TelemetryPoller>, loader: DeliveryLoader, cancel: CancellationToken) {
    let mut lines = spawn_stdin_reader();
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.recv() => match line {
                Some(line) => line,
                None => break,
            },
        };
        let Some(command) = Command::parse(&line) else { continue };
        if !execute(command, &poller, &loader, &cancel).await {
            break;
        }
    }
}

/// Returns `false` once the loop should stop.
async fn execute(
    command: Command,
    poller: &TelemetryPoller,
    loader: &DeliveryLoader,
    cancel: &CancellationToken,
) -> bool {
    match command {
        Command::Refresh => poller.refresh_now(),
        Command::Detail(id) => match loader.load_detail(&id).await {
            Ok(Some(_)) => info!(delivery = %id, "delivery selected"),
            Ok(None) => info!(delivery = %id, "delivery has no data"),
            Err(e) => warn!(delivery = %id, error = %e, "delivery detail failed"),
        },
        Command::ClearDetail => loader.clear_selection(),
        Command::Deliveries => {
            if let Err(e) = loader.load_active().await {
                warn!(error = %e, "active deliveries failed");
            }
        }
        Command::Quit => {
            info!("quit requested");
            cancel.cancel();
            return false;
        }
        Command::Unknown(text) => warn!(command = %text, "unknown command"),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("r"), Some(Command::Refresh));
        assert_eq!(Command::parse("  D  DEL-7 "), Some(Command::Detail("DEL-7".into())));
        assert_eq!(Command::parse("c"), Some(Command::ClearDetail));
        assert_eq!(Command::parse("list"), Some(Command::Deliveries));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
        assert_eq!(Command::parse("   "), None);
        assert_eq!(Command::parse("d"), Some(Command::Unknown("d".into())));
        assert_eq!(Command::parse("zz top"), Some(Command::Unknown("zz top".into())));
    }
}
