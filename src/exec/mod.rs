// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! Flow execution
//!
//! The executor materializes a resolved element into a tree of OS
//! processes wired via OS pipes and runs it to completion. Dispatch is
//! uniform over the [`Element`] sum type: nodes spawn a process, pipes
//! wire two concurrently executing branches, concatenates run their parts
//! strictly in order. Pipe endpoints are owned handles whose drop closes
//! them on every exit path, so no stray descriptor copy can keep a reader
//! from seeing EOF.

mod concat;
mod pipe;
mod process;

use std::io::{PipeReader, PipeWriter};
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::BoxFuture;

use crate::errors::{FlowError, FlowResult};
use crate::flow::{Element, FlowGraph};

/// Termination status of an executed element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal exit with the given code
    Exited(i32),

    /// Terminated by the given signal
    Signaled(i32),
}

impl ExitOutcome {
    /// The all-success outcome
    pub const SUCCESS: ExitOutcome = ExitOutcome::Exited(0);

    /// Whether this outcome counts as success
    pub fn success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }

    /// Combine two outcomes: the first failure wins
    pub fn and(self, other: ExitOutcome) -> ExitOutcome {
        if self.success() {
            other
        } else {
            self
        }
    }

    /// Classify an OS exit status
    pub fn from_status(status: std::process::ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;

        match status.code() {
            Some(code) => Self::Exited(code),
            None => Self::Signaled(status.signal().unwrap_or(0)),
        }
    }
}

impl std::fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit code {}", code),
            Self::Signaled(sig) => write!(f, "signal {}", sig),
        }
    }
}

/// Where an element's stdin comes from
#[derive(Debug)]
pub enum StdinSource {
    /// Inherit the orchestrator's stdin
    Inherit,

    /// No input (immediate EOF)
    Null,

    /// Read end of an OS pipe
    Piped(PipeReader),
}

impl StdinSource {
    /// Duplicate this source for another consumer of the same stream
    pub fn try_clone(&self) -> FlowResult<Self> {
        Ok(match self {
            Self::Inherit => Self::Inherit,
            Self::Null => Self::Null,
            Self::Piped(reader) => Self::Piped(reader.try_clone().map_err(|e| {
                FlowError::PipeCreation { error: e.to_string() }
            })?),
        })
    }

    fn into_stdio(self) -> Stdio {
        match self {
            Self::Inherit => Stdio::inherit(),
            Self::Null => Stdio::null(),
            Self::Piped(reader) => Stdio::from(reader),
        }
    }
}

/// Where an element's stdout goes
#[derive(Debug)]
pub enum StdoutSink {
    /// Inherit the orchestrator's stdout
    Inherit,

    /// Discard output
    Null,

    /// Write end of an OS pipe
    Piped(PipeWriter),
}

impl StdoutSink {
    /// Duplicate this sink for another producer onto the same stream
    pub fn try_clone(&self) -> FlowResult<Self> {
        Ok(match self {
            Self::Inherit => Self::Inherit,
            Self::Null => Self::Null,
            Self::Piped(writer) => Self::Piped(writer.try_clone().map_err(|e| {
                FlowError::PipeCreation { error: e.to_string() }
            })?),
        })
    }

    fn into_stdio(self) -> Stdio {
        match self {
            Self::Inherit => Stdio::inherit(),
            Self::Null => Stdio::null(),
            Self::Piped(writer) => Stdio::from(writer),
        }
    }
}

/// Spawn/reap accounting for one executor
///
/// Every spawned process must be reaped exactly once before the top-level
/// call returns; the two counters back that invariant.
#[derive(Debug, Default)]
struct Ledger {
    spawned: AtomicUsize,
    reaped: AtomicUsize,
}

impl Ledger {
    fn record_spawn(&self) {
        self.spawned.fetch_add(1, Ordering::Relaxed);
    }

    fn record_reap(&self) {
        self.reaped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Result of a top-level action run
#[derive(Debug)]
pub struct ExecutionReport {
    /// Aggregate termination outcome of the whole tree
    pub outcome: ExitOutcome,

    /// Processes spawned during the run
    pub spawned: usize,

    /// Processes reaped during the run
    pub reaped: usize,
}

impl ExecutionReport {
    /// Whether every spawned process was reaped
    pub fn balanced(&self) -> bool {
        self.spawned == self.reaped
    }
}

/// Recursive flow executor
///
/// Borrows an immutable flow graph; one executor may run any number of
/// actions against it.
pub struct Executor<'g> {
    graph: &'g FlowGraph,
    ledger: Ledger,
}

impl<'g> Executor<'g> {
    /// Create an executor over a flow graph
    pub fn new(graph: &'g FlowGraph) -> Self {
        Self {
            graph,
            ledger: Ledger::default(),
        }
    }

    /// The graph this executor runs against
    pub fn graph(&self) -> &'g FlowGraph {
        self.graph
    }

    /// Resolve and execute an action with inherited stdio
    pub async fn run_action(&self, action: &str) -> FlowResult<ExecutionReport> {
        let element = self.graph.resolve(action)?;

        tracing::info!(action, kind = element.kind().label(), "running action");
        let outcome = self
            .execute(element, StdinSource::Inherit, StdoutSink::Inherit)
            .await?;

        let report = ExecutionReport {
            outcome,
            spawned: self.ledger.spawned.load(Ordering::Relaxed),
            reaped: self.ledger.reaped.load(Ordering::Relaxed),
        };
        tracing::info!(
            action,
            outcome = %report.outcome,
            spawned = report.spawned,
            reaped = report.reaped,
            "action finished"
        );
        Ok(report)
    }

    /// Execute a resolved element with the given stdio endpoints.
    ///
    /// The single recursive entry point: pipes and concatenates are defined
    /// purely in terms of recursive calls on their referenced elements.
    pub fn execute<'a>(
        &'a self,
        element: Element<'a>,
        stdin: StdinSource,
        stdout: StdoutSink,
    ) -> BoxFuture<'a, FlowResult<ExitOutcome>> {
        Box::pin(async move {
            tracing::debug!(
                element = element.name(),
                kind = element.kind().label(),
                "executing"
            );
            match element {
                Element::Node(node) => process::run(self, node, stdin, stdout).await,
                Element::Pipe(p) => pipe::wire(self, p, stdin, stdout).await,
                Element::Concatenate(c) => concat::run_sequential(self, c, stdin, stdout).await,
            }
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Execute an action with stdin closed and stdout captured, returning
    /// the report and the bytes the tree wrote downstream.
    pub async fn run_captured(graph: &FlowGraph, action: &str) -> (ExecutionReport, String) {
        let executor = Executor::new(graph);
        let element = graph.resolve(action).expect("action must resolve");

        let (mut reader, writer) = std::io::pipe().expect("pipe");
        let read_task = tokio::task::spawn_blocking(move || {
            use std::io::Read;
            let mut buf = String::new();
            reader.read_to_string(&mut buf).expect("read");
            buf
        });

        let outcome = executor
            .execute(element, StdinSource::Null, StdoutSink::Piped(writer))
            .await
            .expect("execute");
        let output = read_task.await.expect("reader task");

        let report = ExecutionReport {
            outcome,
            spawned: executor.ledger.spawned.load(Ordering::Relaxed),
            reaped: executor.ledger.reaped.load(Ordering::Relaxed),
        };
        (report, output)
    }
}
