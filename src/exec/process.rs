// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! Process runner
//!
//! Spawns one external command with the given stdio endpoints and waits
//! for its termination status.

use std::io;
use tokio::process::Command;

use super::{Executor, ExitOutcome, StdinSource, StdoutSink};
use crate::errors::{FlowError, FlowResult};
use crate::flow::Node;

/// Exit code reported when the program cannot be found (shell convention)
const EXIT_NOT_FOUND: i32 = 127;

/// Exit code reported when the program is not executable
const EXIT_NOT_EXECUTABLE: i32 = 126;

/// Run a node's command to completion.
///
/// A program that cannot be launched is reported as a failing exit
/// outcome, never as success; only the OS refusing process creation
/// itself is an error.
pub(crate) async fn run(
    executor: &Executor<'_>,
    node: &Node,
    stdin: StdinSource,
    stdout: StdoutSink,
) -> FlowResult<ExitOutcome> {
    let argv = node.argv();
    let Some((program, args)) = argv.split_first() else {
        return Err(FlowError::EmptyCommand { node: node.name.clone() });
    };

    // The command (and with it the parent's copies of the stdio
    // descriptors) must drop before we block on wait: a retained write
    // end would keep the downstream reader from ever seeing EOF.
    let mut child = {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(stdin.into_stdio())
            .stdout(stdout.into_stdio());

        match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(node = %node.name, program = %program, "program not found");
                return Ok(ExitOutcome::Exited(EXIT_NOT_FOUND));
            }
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                tracing::warn!(node = %node.name, program = %program, "program not executable");
                return Ok(ExitOutcome::Exited(EXIT_NOT_EXECUTABLE));
            }
            Err(e) => {
                return Err(FlowError::Spawn {
                    program: program.clone(),
                    error: e.to_string(),
                });
            }
        }
    };

    executor.ledger.record_spawn();

    let status = child.wait().await.map_err(|e| FlowError::Wait {
        program: program.clone(),
        error: e.to_string(),
    })?;
    executor.ledger.record_reap();

    let outcome = ExitOutcome::from_status(status);
    tracing::debug!(node = %node.name, %outcome, "process exited");
    Ok(outcome)
}
