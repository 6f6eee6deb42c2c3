// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! Validate command - check a flow file for structural problems

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::flow::{describe, FlowGraph, FlowValidator};

/// Run the validate command
pub async fn run(flow_path: PathBuf, verbose: bool) -> Result<()> {
    println!("{}", "Validating flow...".bold());
    println!();

    // Check flow file exists
    if !flow_path.exists() {
        return Err(miette::miette!(
            "Flow file not found: {}",
            flow_path.display()
        ));
    }

    // Load flow graph
    let graph = match FlowGraph::from_file(&flow_path) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("  {} Failed to parse flow file", "✗".red());
            eprintln!();
            return Err(e.into());
        }
    };

    println!("  {} Flow file parses", "✓".green());

    // Validate structure
    let validation = FlowValidator::validate(&graph);

    if !validation.errors.is_empty() {
        println!();
        println!("{}:", "Errors".red().bold());
        for error in &validation.errors {
            println!("  {} {}", "✗".red(), error);
        }
    }

    if !validation.warnings.is_empty() {
        println!();
        println!("{}:", "Warnings".yellow().bold());
        for warning in &validation.warnings {
            println!("  {} {}", "⚠".yellow(), warning);
        }
    }

    if verbose {
        println!();
        println!("{}:", "Flow summary".bold());
        println!("  Elements: {}", graph.len());
        for (name, _) in graph.element_names() {
            if let Ok(element) = graph.resolve(name) {
                println!("    - {}", describe(&element));
            }
        }
    }

    println!();

    if !validation.is_valid() {
        Err(miette::miette!("Flow validation failed"))
    } else if validation.has_warnings() {
        println!("{}", "Flow is valid but has warnings.".yellow().bold());
        Ok(())
    } else {
        println!("{}", "Flow is valid!".green().bold());
        Ok(())
    }
}
