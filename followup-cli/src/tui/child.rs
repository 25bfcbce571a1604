//! Driver child process: spawn it and relay its output to the UI loop

use std::process::Stdio;

use futures::future::join_all;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::{DATA_DIR_ENV, DataDir};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildEvent {
    /// One line of stdout or stderr
    Line(String),
    /// Exit code, `None` when killed by a signal
    Exited(Option<i32>),
    SpawnFailed(String),
}

/// `<current exe> run` with the data directory handed over through the environment
pub fn driver_command(data_dir: &DataDir) -> std::io::Result<Command> {
    let exe = std::env::current_exe()?;
    let mut command = Command::new(exe);
    command.arg("run").env(DATA_DIR_ENV, data_dir.root());
    Ok(command)
}

/// Spawn `command` and forward its output line by line.
///
/// Sends `SpawnFailed` when the process can't start, otherwise every line
/// followed by exactly one `Exited` once both streams are drained.
pub fn spawn(mut command: Command, tx: UnboundedSender<ChildEvent>) {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            log::error!("Failed to start driver: {}", e);
            let _ = tx.send(ChildEvent::SpawnFailed(e.to_string()));
            return;
        }
    };

    let stdout = child.stdout.take().map(|out| tokio::spawn(forward_lines(out, tx.clone())));
    let stderr = child.stderr.take().map(|err| tokio::spawn(forward_lines(err, tx.clone())));

    tokio::spawn(async move {
        join_all([stdout, stderr].into_iter().flatten()).await;

        let code = match child.wait().await {
            Ok(status) => status.code(),
            Err(e) => {
                log::error!("Failed to wait for driver: {}", e);
                None
            }
        };
        let _ = tx.send(ChildEvent::Exited(code));
    });
}

async fn forward_lines(stream: impl AsyncRead + Unpin, tx: UnboundedSender<ChildEvent>) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(ChildEvent::Line(line)).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                log::warn!("Driver output unreadable: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    async fn collect(mut rx: mpsc::UnboundedReceiver<ChildEvent>) -> Vec<ChildEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            let done = matches!(event, ChildEvent::Exited(_) | ChildEvent::SpawnFailed(_));
            events.push(event);
            if done {
                break;
            }
        }
        events
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_relays_both_streams_then_exit() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut command = Command::new("sh");
        command.arg("-c").arg("echo out; echo err 1>&2; exit 3");

        spawn(command, tx);
        let events = collect(rx).await;

        assert_eq!(events.last(), Some(&ChildEvent::Exited(Some(3))));
        assert!(events.contains(&ChildEvent::Line("out".into())));
        assert!(events.contains(&ChildEvent::Line("err".into())));
        assert_eq!(events.len(), 3);
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let (tx, rx) = mpsc::unbounded_channel();
        spawn(Command::new("definitely-not-a-followup-binary"), tx);

        let events = collect(rx).await;
        assert!(matches!(events.as_slice(), [ChildEvent::SpawnFailed(_)]));
    }

    #[test]
    fn test_driver_command_sets_data_dir() {
        let data_dir = DataDir::at("/tmp/followup-data");
        let command = driver_command(&data_dir).unwrap();
        let std_command = command.as_std();

        let args: Vec<_> = std_command.get_args().collect();
        assert_eq!(args, vec!["run"]);
        let env: Vec<_> = std_command.get_envs().collect();
        assert!(env.iter().any(|(k, v)| *k == DATA_DIR_ENV
            && v.map(|v| v == "/tmp/followup-data").unwrap_or(false)));
    }
}
