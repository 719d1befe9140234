// src/console.rs

//! Line-oriented stdin console standing in for the host UI.
//!
//! Each line is one command. State changes go through the runtime channel;
//! `uncheck` instead clears the shared [`EnabledFlag`] directly, the way a
//! host checkbox would, and the runtime notices on its next tick.

use std::fmt;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::engine::{ControlEvent, EnabledFlag, WatchStatus};
use crate::errors::Result;

const HELP: &str = "commands: toggle | enable | disable | status | uncheck | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Toggle,
    Enable,
    Disable,
    Status,
    Uncheck,
    Quit,
    Help,
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "toggle" | "t" => Ok(ConsoleCommand::Toggle),
            "enable" | "on" => Ok(ConsoleCommand::Enable),
            "disable" | "off" => Ok(ConsoleCommand::Disable),
            "status" | "s" => Ok(ConsoleCommand::Status),
            "uncheck" => Ok(ConsoleCommand::Uncheck),
            "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
            "help" | "?" => Ok(ConsoleCommand::Help),
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

impl fmt::Display for ConsoleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConsoleCommand::Toggle => "toggle",
            ConsoleCommand::Enable => "enable",
            ConsoleCommand::Disable => "disable",
            ConsoleCommand::Status => "status",
            ConsoleCommand::Uncheck => "uncheck",
            ConsoleCommand::Quit => "quit",
            ConsoleCommand::Help => "help",
        };
        f.write_str(s)
    }
}

/// Read commands from `input` until EOF or `quit`, writing replies to
/// `output`.
///
/// EOF only ends the console; the runtime keeps going until Ctrl-C. `quit`
/// asks the runtime to shut down.
pub async fn run_console<R, W>(
    input: R,
    output: &mut W,
    tx: mpsc::Sender<ControlEvent>,
    flag: EnabledFlag,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<ConsoleCommand>() {
            Ok(c) => c,
            Err(msg) => {
                write_line(output, &format!("{msg}; {HELP}")).await?;
                continue;
            }
        };
        debug!(%command, "console command");

        let event = match command {
            ConsoleCommand::Toggle => Some(ControlEvent::Toggle),
            ConsoleCommand::Enable => Some(ControlEvent::Start),
            ConsoleCommand::Disable => Some(ControlEvent::Stop),
            ConsoleCommand::Quit => {
                let _ = tx.send(ControlEvent::Shutdown).await;
                return Ok(());
            }
            ConsoleCommand::Uncheck => {
                flag.set(false);
                write_line(output, "enabled flag cleared").await?;
                continue;
            }
            ConsoleCommand::Help => {
                write_line(output, HELP).await?;
                continue;
            }
            ConsoleCommand::Status => None,
        };

        if let Some(event) = event {
            if tx.send(event).await.is_err() {
                break;
            }
        }

        match query_status(&tx).await {
            Some(status) => write_line(output, &status_line(status)).await?,
            None => break,
        }
    }

    debug!("console input closed");
    Ok(())
}

/// Ask the runtime for its status. `None` once the runtime is gone.
pub async fn query_status(tx: &mpsc::Sender<ControlEvent>) -> Option<WatchStatus> {
    let (reply_tx, reply_rx) = oneshot::channel();
    if tx.send(ControlEvent::Query(reply_tx)).await.is_err() {
        warn!("runtime is gone; cannot query status");
        return None;
    }
    reply_rx.await.ok()
}

/// e.g. `auto-reload enabled [Disable]`
pub fn status_line(status: WatchStatus) -> String {
    format!("auto-reload {status} [{}]", status.toggle_label())
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::task::JoinHandle;

    use super::*;

    /// Records events and answers queries like a runtime whose status
    /// follows toggle/start/stop.
    fn fake_runtime(
        mut rx: mpsc::Receiver<ControlEvent>,
    ) -> (Arc<Mutex<Vec<String>>>, JoinHandle<()>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let task = tokio::spawn(async move {
            let mut status = WatchStatus::Disabled;
            while let Some(event) = rx.recv().await {
                match event {
                    ControlEvent::Toggle => {
                        status = if status.is_enabled() {
                            WatchStatus::Disabled
                        } else {
                            WatchStatus::Enabled
                        };
                        log.lock().unwrap().push("toggle".to_string());
                    }
                    ControlEvent::Start => {
                        status = WatchStatus::Enabled;
                        log.lock().unwrap().push("start".to_string());
                    }
                    ControlEvent::Stop => {
                        status = WatchStatus::Disabled;
                        log.lock().unwrap().push("stop".to_string());
                    }
                    ControlEvent::Query(reply) => {
                        let _ = reply.send(status);
                    }
                    ControlEvent::Shutdown => {
                        log.lock().unwrap().push("shutdown".to_string());
                        break;
                    }
                    ControlEvent::Tick => {}
                }
            }
        });
        (seen, task)
    }

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!("toggle".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Toggle));
        assert_eq!(" ON ".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Enable));
        assert_eq!("q".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Quit));
        assert!("reboot".parse::<ConsoleCommand>().is_err());
    }

    #[test]
    fn status_line_shows_label() {
        assert_eq!(status_line(WatchStatus::Disabled), "auto-reload disabled [Enable]");
        assert_eq!(status_line(WatchStatus::Enabled), "auto-reload enabled [Disable]");
    }

    #[tokio::test]
    async fn toggles_and_quits() {
        let (tx, rx) = mpsc::channel(8);
        let (seen, task) = fake_runtime(rx);
        let input: &[u8] = b"toggle\n\nstatus\ntoggle\nquit\ntoggle\n";
        let mut out = Vec::new();

        run_console(input, &mut out, tx, EnabledFlag::new())
            .await
            .unwrap();
        task.await.unwrap();

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "auto-reload enabled [Disable]",
                "auto-reload enabled [Disable]",
                "auto-reload disabled [Enable]",
            ]
        );
        assert_eq!(*seen.lock().unwrap(), vec!["toggle", "toggle", "shutdown"]);
    }

    #[tokio::test]
    async fn uncheck_clears_the_flag_without_an_event() {
        let (tx, rx) = mpsc::channel(8);
        let (seen, _task) = fake_runtime(rx);
        let flag = EnabledFlag::new();
        flag.set(true);
        let input: &[u8] = b"uncheck\n";
        let mut out = Vec::new();

        run_console(input, &mut out, tx, flag.clone()).await.unwrap();

        assert!(!flag.get());
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(String::from_utf8(out).unwrap(), "enabled flag cleared\n");
    }

    #[tokio::test]
    async fn unknown_command_prints_help() {
        let (tx, rx) = mpsc::channel(8);
        let (_seen, _task) = fake_runtime(rx);
        let input: &[u8] = b"dance\n";
        let mut out = Vec::new();

        run_console(input, &mut out, tx, EnabledFlag::new())
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("unknown command 'dance'"));
        assert!(out.contains("toggle | enable"));
    }
}
