// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! Run command - execute an action from a flow file

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;
use std::time::Instant;

use crate::exec::Executor;
use crate::flow::FlowGraph;

/// Run an action
pub async fn run(flow_path: PathBuf, action: String, verbose: bool) -> Result<()> {
    // Check flow file exists
    if !flow_path.exists() {
        return Err(miette::miette!(
            "Flow file not found: {}",
            flow_path.display()
        ));
    }

    // Load flow graph
    let graph = FlowGraph::from_file(&flow_path)?;

    if verbose {
        eprintln!(
            "Loaded {} element{} from {}",
            graph.len(),
            if graph.len() == 1 { "" } else { "s" },
            flow_path.display()
        );
    }

    // Execute; the action's own output goes straight to our stdout, so
    // status lines stay on stderr.
    let start = Instant::now();
    let executor = Executor::new(&graph);
    let report = executor.run_action(&action).await?;
    let duration = start.elapsed();

    if report.outcome.success() {
        if verbose {
            eprintln!(
                "  {} {} ({:.2}s, {} process{} spawned)",
                "✓".green(),
                action.bold(),
                duration.as_secs_f64(),
                report.spawned,
                if report.spawned == 1 { "" } else { "es" }
            );
        }
        Ok(())
    } else {
        eprintln!(
            "  {} {} failed with {}",
            "✗".red(),
            action.bold(),
            report.outcome
        );
        Err(miette::miette!(
            "Action '{}' failed with {}",
            action,
            report.outcome
        ))
    }
}
