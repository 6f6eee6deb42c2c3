// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! Reference graph over flow elements
//!
//! Builds the directed graph of name references (pipe endpoints and
//! concatenate parts) so that cycles — which would recurse forever at
//! execution time — and dangling references can be reported before a run,
//! and so the `graph` command can render the flow.

use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::errors::{FlowError, FlowResult};
use crate::flow::{ElementKind, FlowGraph};

/// Directed graph of element references
pub struct RefGraph {
    graph: DiGraph<String, &'static str>,
    name_to_index: HashMap<String, NodeIndex>,
    kinds: HashMap<String, ElementKind>,
}

impl RefGraph {
    /// Build the reference graph for a flow.
    ///
    /// Fails on a dangling or ambiguous reference and on reference cycles.
    pub fn build(flow: &FlowGraph) -> FlowResult<Self> {
        let mut graph = DiGraph::new();
        let mut name_to_index = HashMap::new();
        let mut kinds = HashMap::new();

        for (name, kind) in flow.element_names() {
            let index = graph.add_node(name.to_string());
            name_to_index.insert(name.to_string(), index);
            kinds.insert(name.to_string(), kind);
        }

        let mut add_edge = |graph: &mut DiGraph<String, &'static str>,
                            from_name: &str,
                            to_name: &str,
                            label: &'static str|
         -> FlowResult<()> {
            let to_index = name_to_index.get(to_name).ok_or_else(|| {
                FlowError::ElementNotFound { name: to_name.to_string() }
            })?;
            graph.add_edge(name_to_index[from_name], *to_index, label);
            Ok(())
        };

        for pipe in flow.pipes.values() {
            // Referencing an ambiguous name is already an integrity error.
            flow.resolve(&pipe.from)?;
            flow.resolve(&pipe.to)?;
            add_edge(&mut graph, &pipe.name, &pipe.from, "from")?;
            add_edge(&mut graph, &pipe.name, &pipe.to, "to")?;
        }

        for concat in flow.concatenates.values() {
            for part in &concat.parts {
                flow.resolve(part)?;
                add_edge(&mut graph, &concat.name, part, "part")?;
            }
        }

        let built = Self {
            graph,
            name_to_index,
            kinds,
        };
        built.validate_acyclic()?;

        Ok(built)
    }

    /// Validate that the reference graph has no cycles
    fn validate_acyclic(&self) -> FlowResult<()> {
        match toposort(&self.graph, None) {
            Ok(_) => Ok(()),
            Err(_) => Err(FlowError::CircularReference {
                elements: self.cycle_members(),
            }),
        }
    }

    /// Names of elements participating in reference cycles
    fn cycle_members(&self) -> Vec<String> {
        let mut members: Vec<String> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1
                    || scc
                        .first()
                        .is_some_and(|&n| self.graph.contains_edge(n, n))
            })
            .flatten()
            .map(|n| self.graph[n].clone())
            .collect();
        members.sort();
        members
    }

    /// Names an element references, in edge order
    pub fn references(&self, name: &str) -> Option<Vec<String>> {
        let node = self.name_to_index.get(name)?;
        Some(
            self.graph
                .neighbors_directed(*node, petgraph::Direction::Outgoing)
                .map(|n| self.graph[n].clone())
                .collect(),
        )
    }

    /// Render as an indented text listing
    pub fn to_text(&self, flow: &FlowGraph) -> String {
        let mut out = String::new();

        for (name, kind) in flow.element_names() {
            out.push_str(&format!("{} ({})\n", name, kind.label()));
            match kind {
                ElementKind::Node => {
                    out.push_str(&format!("    command: {}\n", flow.nodes[name].command));
                }
                ElementKind::Pipe => {
                    let pipe = &flow.pipes[name];
                    out.push_str(&format!("    from: {}\n    to: {}\n", pipe.from, pipe.to));
                }
                ElementKind::Concatenate => {
                    for (i, part) in flow.concatenates[name].parts.iter().enumerate() {
                        out.push_str(&format!("    part_{}: {}\n", i, part));
                    }
                }
            }
        }

        out
    }

    /// Generate a DOT diagram of the reference graph
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph flow {\n    rankdir=LR;\n");

        for (name, index) in &self.name_to_index {
            let shape = match self.kinds[name] {
                ElementKind::Node => "box",
                ElementKind::Pipe => "diamond",
                ElementKind::Concatenate => "folder",
            };
            out.push_str(&format!("    \"{}\" [shape={}];\n", self.graph[*index], shape));
        }

        for edge in self.graph.edge_indices() {
            let (from, to) = self.graph.edge_endpoints(edge).unwrap();
            out.push_str(&format!(
                "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                self.graph[from], self.graph[to], self.graph[edge]
            ));
        }

        out.push_str("}\n");
        out
    }

    /// Generate a Mermaid diagram of the reference graph
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph TD\n");

        for (name, _) in &self.name_to_index {
            out.push_str(&format!("    {}[{}]\n", name, name));
        }

        for edge in self.graph.edge_indices() {
            let (from, to) = self.graph.edge_endpoints(edge).unwrap();
            out.push_str(&format!(
                "    {} -->|{}| {}\n",
                self.graph[from], self.graph[edge], self.graph[to]
            ));
        }

        out
    }
}
