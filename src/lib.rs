// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! # procflow - Process Pipeline Executor
//!
//! `procflow` materializes declaratively defined process pipelines into
//! trees of OS processes wired via pipes, and runs them to completion.
//!
//! ## Features
//!
//! - **Declarative flows** - Nodes, pipes, and concatenates in a plain
//!   line-oriented flow file
//! - **Recursive wiring** - Pipe and concatenate elements nest arbitrarily
//! - **Deterministic concatenation** - Parts run strictly in order; their
//!   outputs never interleave
//! - **Clean descriptor lifecycle** - Pipe endpoints are owned handles,
//!   closed on every exit path; every spawned process is reaped
//!
//! ## Quick Start
//!
//! ```bash
//! # Execute an action from a flow file
//! procflow run flow.txt report
//!
//! # Check a flow for structural problems
//! procflow validate flow.txt
//!
//! # Render the flow as a diagram
//! procflow graph flow.txt --format mermaid
//! ```

pub mod cli;
pub mod errors;
pub mod exec;
pub mod flow;

// Re-export commonly used types
pub use errors::{FlowError, FlowResult};
pub use exec::{ExecutionReport, Executor, ExitOutcome};
pub use flow::{Element, FlowGraph};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
