// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! Graph command - visualize the flow's element references

use miette::Result;
use std::path::PathBuf;

use super::GraphFormat;
use crate::flow::{FlowGraph, RefGraph};

/// Run the graph command
pub async fn run(flow_path: PathBuf, format: GraphFormat, _verbose: bool) -> Result<()> {
    // Check flow file exists
    if !flow_path.exists() {
        return Err(miette::miette!(
            "Flow file not found: {}",
            flow_path.display()
        ));
    }

    // Load flow graph
    let graph = FlowGraph::from_file(&flow_path)?;

    // Output in requested format
    let output = match format {
        GraphFormat::Json => serde_json::to_string_pretty(&graph)
            .map_err(|e| miette::miette!("Failed to serialize flow: {}", e))?,
        _ => {
            let refs = RefGraph::build(&graph)?;
            match format {
                GraphFormat::Text => refs.to_text(&graph),
                GraphFormat::Dot => refs.to_dot(),
                GraphFormat::Mermaid => refs.to_mermaid(),
                GraphFormat::Json => unreachable!(),
            }
        }
    };

    println!("{}", output);

    Ok(())
}
