// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! Flow validation
//!
//! Structural checks over a loaded flow graph, run before execution by the
//! `validate` command. Dangling references are *errors* here even though
//! `run` resolves lazily: a flow that cannot execute any of its actions is
//! worth flagging before anything spawns.

use std::collections::HashSet;

use crate::errors::FlowError;
use crate::flow::{Element, FlowGraph, RefGraph};

/// Flow validator
pub struct FlowValidator;

/// Result of validating a flow
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Errors that make the flow unexecutable
    pub errors: Vec<String>,

    /// Warnings that do not block execution
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn new() -> Self {
        Self::default()
    }

    /// Whether the flow passed with no errors
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether any warnings were recorded
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

impl FlowValidator {
    /// Validate a flow graph
    pub fn validate(flow: &FlowGraph) -> ValidationResult {
        let mut result = ValidationResult::new();

        if flow.is_empty() {
            result.add_error("Flow file declares no elements");
        }

        Self::check_ambiguous_names(flow, &mut result);

        for node in flow.nodes.values() {
            let argv = node.argv();
            if argv.is_empty() {
                result.add_error(format!("Node '{}': command is empty", node.name));
            } else if which::which(&argv[0]).is_err() {
                result.add_warning(format!(
                    "Node '{}': program '{}' not found on PATH",
                    node.name, argv[0]
                ));
            }
        }

        for pipe in flow.pipes.values() {
            Self::check_reference(flow, &pipe.name, "from", &pipe.from, &mut result);
            Self::check_reference(flow, &pipe.name, "to", &pipe.to, &mut result);
        }

        for concat in flow.concatenates.values() {
            for (i, part) in concat.parts.iter().enumerate() {
                let role = format!("part_{}", i);
                Self::check_reference(flow, &concat.name, &role, part, &mut result);
            }
        }

        // Cycle detection; dangling and ambiguous references were already
        // reported individually above.
        match RefGraph::build(flow) {
            Ok(_) => {}
            Err(FlowError::CircularReference { elements }) => {
                result.add_error(format!("Circular reference: {}", elements.join(" → ")));
            }
            Err(FlowError::ElementNotFound { .. }) | Err(FlowError::AmbiguousElement { .. }) => {}
            Err(e) => result.add_error(format!("Reference graph error: {}", e)),
        }

        result
    }

    /// Names declared in more than one of the three maps
    fn check_ambiguous_names(flow: &FlowGraph, result: &mut ValidationResult) {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut reported: HashSet<&str> = HashSet::new();

        for (name, _) in flow.element_names() {
            if !seen.insert(name) && reported.insert(name) {
                if let Err(err) = flow.resolve(name) {
                    result.add_error(err.to_string());
                }
            }
        }
    }

    fn check_reference(
        flow: &FlowGraph,
        owner: &str,
        role: &str,
        target: &str,
        result: &mut ValidationResult,
    ) {
        match flow.resolve(target) {
            Ok(_) => {}
            Err(FlowError::ElementNotFound { .. }) => {
                result.add_error(format!(
                    "'{}' references unknown element '{}' as {}",
                    owner, target, role
                ));
            }
            Err(err) => {
                result.add_error(format!("'{}' ({} reference): {}", owner, role, err));
            }
        }
    }
}

/// Summary line for an element, used by the verbose validate listing
pub fn describe(element: &Element<'_>) -> String {
    let label = element.kind().label();
    match element {
        Element::Node(n) => format!("{} ({}): {}", n.name, label, n.command),
        Element::Pipe(p) => format!("{} ({}): {} | {}", p.name, label, p.from, p.to),
        Element::Concatenate(c) => {
            format!("{} ({}): {}", c.name, label, c.parts.join(" + "))
        }
    }
}
