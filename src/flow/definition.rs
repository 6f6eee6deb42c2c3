// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! Flow graph definition structures
//!
//! A flow graph holds three name-keyed maps: nodes (external commands),
//! pipes (stdout-to-stdin connections), and concatenates (ordered joins).
//! The graph is built once by the loader and never mutated afterwards;
//! any number of executor runs may borrow it.

use serde::Serialize;
use std::collections::HashMap;

use crate::errors::{FlowError, FlowResult};
use crate::flow::tokenize;

/// A leaf element wrapping one external command
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    /// Node name (unique across the whole graph)
    pub name: String,

    /// The raw command line as written in the flow file
    pub command: String,
}

impl Node {
    /// Tokenized argument list for this node's command
    pub fn argv(&self) -> Vec<String> {
        tokenize(&self.command)
    }
}

/// An element connecting one element's stdout to another's stdin
#[derive(Debug, Clone, Serialize)]
pub struct Pipe {
    /// Pipe name
    pub name: String,

    /// Name of the element whose output feeds the pipe
    pub from: String,

    /// Name of the element that reads from the pipe
    pub to: String,
}

/// An element that runs its parts in strict order, joining their output
#[derive(Debug, Clone, Serialize)]
pub struct Concatenate {
    /// Concatenate name
    pub name: String,

    /// Part names in execution order (length equals the declared count)
    pub parts: Vec<String>,
}

/// The kind of element a name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
    Node,
    Pipe,
    Concatenate,
}

impl ElementKind {
    /// Lowercase label as used in flow files and error messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Pipe => "pipe",
            Self::Concatenate => "concatenate",
        }
    }
}

/// A resolved element, borrowed from the flow graph.
///
/// This is the unit the executor dispatches on; pipe and concatenate
/// execution is defined purely in terms of recursive execution of the
/// elements their references resolve to.
#[derive(Debug, Clone, Copy)]
pub enum Element<'g> {
    Node(&'g Node),
    Pipe(&'g Pipe),
    Concatenate(&'g Concatenate),
}

impl Element<'_> {
    /// The element's declared name
    pub fn name(&self) -> &str {
        match self {
            Self::Node(n) => &n.name,
            Self::Pipe(p) => &p.name,
            Self::Concatenate(c) => &c.name,
        }
    }

    /// The element's kind
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Node(_) => ElementKind::Node,
            Self::Pipe(_) => ElementKind::Pipe,
            Self::Concatenate(_) => ElementKind::Concatenate,
        }
    }
}

/// The immutable in-memory collection of all declared elements
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowGraph {
    /// Nodes by name
    pub nodes: HashMap<String, Node>,

    /// Pipes by name
    pub pipes: HashMap<String, Pipe>,

    /// Concatenates by name
    pub concatenates: HashMap<String, Concatenate>,
}

impl FlowGraph {
    /// Resolve a name to the element it denotes.
    ///
    /// A name present in none of the three maps is `ElementNotFound`; a
    /// name present in more than one is `AmbiguousElement` rather than
    /// being resolved by any priority order.
    pub fn resolve(&self, name: &str) -> FlowResult<Element<'_>> {
        let mut kinds: Vec<&'static str> = Vec::new();
        let mut found: Option<Element<'_>> = None;

        if let Some(node) = self.nodes.get(name) {
            kinds.push(ElementKind::Node.label());
            found = Some(Element::Node(node));
        }
        if let Some(pipe) = self.pipes.get(name) {
            kinds.push(ElementKind::Pipe.label());
            found = Some(Element::Pipe(pipe));
        }
        if let Some(concat) = self.concatenates.get(name) {
            kinds.push(ElementKind::Concatenate.label());
            found = Some(Element::Concatenate(concat));
        }

        match (found, kinds.len()) {
            (Some(element), 1) => Ok(element),
            (None, _) => Err(FlowError::ElementNotFound { name: name.to_string() }),
            (_, _) => Err(FlowError::ambiguous(name, &kinds)),
        }
    }

    /// All declared element names, with their kinds
    pub fn element_names(&self) -> Vec<(&str, ElementKind)> {
        let mut names: Vec<(&str, ElementKind)> = self
            .nodes
            .keys()
            .map(|n| (n.as_str(), ElementKind::Node))
            .chain(self.pipes.keys().map(|n| (n.as_str(), ElementKind::Pipe)))
            .chain(
                self.concatenates
                    .keys()
                    .map(|n| (n.as_str(), ElementKind::Concatenate)),
            )
            .collect();
        names.sort();
        names
    }

    /// Total number of declared elements
    pub fn len(&self) -> usize {
        self.nodes.len() + self.pipes.len() + self.concatenates.len()
    }

    /// Whether the graph declares no elements at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
