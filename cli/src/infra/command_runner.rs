//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` executes manifest commands with tokio, capturing
//! stdout and stderr. No timeout is applied — manifest commands are the
//! instance's actual workload and run as long as they need. `kill_on_drop`
//! ensures a dropped run does not orphan the child.

use std::process::{Output, Stdio};

use anyhow::{Context, Result};
use flotilla_common::CommandSpec;
use tokio::io::AsyncReadExt;

use crate::application::ports::CommandRunner;

/// Production `CommandRunner` backed by `tokio::process`.
pub struct TokioCommandRunner;

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, command: &CommandSpec) -> Result<Output> {
        let line = command.display_line();
        tracing::info!("issuing command '{line}'");

        let mut child = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {}", command.program))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        // Drain both pipes while waiting: a child that fills one pipe buffer
        // would otherwise block before it can exit.
        let (status, stdout, stderr) = tokio::join!(
            child.wait(),
            async {
                let mut buf = Vec::new();
                if let Some(ref mut h) = stdout_handle {
                    let _ = h.read_to_end(&mut buf).await;
                }
                buf
            },
            async {
                let mut buf = Vec::new();
                if let Some(ref mut h) = stderr_handle {
                    let _ = h.read_to_end(&mut buf).await;
                }
                buf
            },
        );

        let status = status.with_context(|| format!("waiting for {}", command.program))?;
        tracing::info!("command '{line}' finished with {status}");
        Ok(Output {
            status,
            stdout,
            stderr,
        })
    }
}
