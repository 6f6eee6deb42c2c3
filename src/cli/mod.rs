// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for procflow.

pub mod graph;
pub mod run;
pub mod validate;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Declarative process-pipeline executor
///
/// Runs actions from a flow file: nodes spawn external commands, pipes
/// connect one element's output to another's input, concatenates join
/// outputs in strict order.
#[derive(Parser, Debug)]
#[clap(
    name = "procflow",
    version,
    about = "Declarative process-pipeline executor for nodes, pipes, and concatenation",
    long_about = None,
    after_help = "Examples:\n\
        procflow run flow.txt report       Execute the action named 'report'\n\
        procflow validate flow.txt         Check the flow for structural problems\n\
        procflow graph flow.txt -f dot     Render the flow as a DOT diagram\n\n\
        See 'procflow <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute an action from a flow file
    Run {
        /// Flow file
        flow: PathBuf,

        /// Action name to execute
        action: String,
    },

    /// Validate a flow file
    Validate {
        /// Flow file to validate
        flow: PathBuf,
    },

    /// Show the flow's element reference graph
    Graph {
        /// Flow file
        flow: PathBuf,

        /// Output format
        #[clap(short, long, value_enum, default_value = "text")]
        format: GraphFormat,
    },
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
    Json,
}
