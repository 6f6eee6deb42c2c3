// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! Flow-file loader
//!
//! Parses the line-oriented `key=value` flow format into a [`FlowGraph`]:
//!
//! ```text
//! node=<name>          command=<command-line>            (commits the node)
//! pipe=<name>          from=<name>  to=<name>           (commits on to=)
//! concatenate=<name>   parts=<n>    part_0= .. part_n-1 (last index commits)
//! ```
//!
//! Lines with unrecognized keys are ignored. Known keys appearing outside
//! their stanza, part indices out of range or out of order, and stanzas
//! left unfinished are load errors.

use std::path::Path;

use crate::errors::{FlowError, FlowResult};
use crate::flow::{Concatenate, FlowGraph, Node, Pipe};

/// In-progress stanza state between an opening line and its commit
enum OpenStanza {
    Node {
        name: String,
    },
    Pipe {
        name: String,
        from: Option<String>,
    },
    Concatenate {
        name: String,
        parts: Option<usize>,
        filled: Vec<String>,
    },
}

impl OpenStanza {
    fn kind(&self) -> &'static str {
        match self {
            Self::Node { .. } => "node",
            Self::Pipe { .. } => "pipe",
            Self::Concatenate { .. } => "concatenate",
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Node { name } => name,
            Self::Pipe { name, .. } => name,
            Self::Concatenate { name, .. } => name,
        }
    }
}

impl FlowGraph {
    /// Load a flow graph from a file on disk
    pub fn from_file(path: &Path) -> FlowResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| FlowError::FlowFileRead {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_str(&content)
    }

    /// Parse a flow graph from flow-file text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> FlowResult<Self> {
        let mut graph = FlowGraph::default();
        let mut open: Option<OpenStanza> = None;

        for (idx, raw_line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let Some((key, value)) = raw_line.split_once('=') else {
                continue;
            };

            match key {
                "node" | "pipe" | "concatenate" => {
                    // A new stanza may only open once the previous one has
                    // committed.
                    if let Some(ref unfinished) = open {
                        return Err(FlowError::UnterminatedStanza {
                            stanza: unfinished.kind().to_string(),
                            name: unfinished.name().to_string(),
                        });
                    }
                    open = Some(match key {
                        "node" => OpenStanza::Node { name: value.to_string() },
                        "pipe" => OpenStanza::Pipe {
                            name: value.to_string(),
                            from: None,
                        },
                        _ => OpenStanza::Concatenate {
                            name: value.to_string(),
                            parts: None,
                            filled: Vec::new(),
                        },
                    });
                }

                "command" => match open.take() {
                    Some(OpenStanza::Node { name }) => {
                        graph.nodes.insert(
                            name.clone(),
                            Node {
                                name,
                                command: value.to_string(),
                            },
                        );
                    }
                    _ => return Err(stray(line_no, "command", "node")),
                },

                "from" => match open {
                    Some(OpenStanza::Pipe { ref mut from, .. }) => {
                        *from = Some(value.to_string());
                    }
                    _ => return Err(stray(line_no, "from", "pipe")),
                },

                "to" => match open.take() {
                    Some(OpenStanza::Pipe { name, from: Some(from) }) => {
                        graph.pipes.insert(
                            name.clone(),
                            Pipe {
                                name,
                                from,
                                to: value.to_string(),
                            },
                        );
                    }
                    Some(OpenStanza::Pipe { name, from: None }) => {
                        return Err(FlowError::MissingDirective {
                            line: line_no,
                            stanza: "pipe".to_string(),
                            name,
                            key: "from".to_string(),
                        });
                    }
                    _ => return Err(stray(line_no, "to", "pipe")),
                },

                "parts" => match open {
                    Some(OpenStanza::Concatenate {
                        ref name,
                        ref mut parts,
                        ..
                    }) => {
                        let count: usize = value.parse().unwrap_or(0);
                        if count == 0 {
                            return Err(FlowError::InvalidPartCount {
                                line: line_no,
                                concatenate: name.clone(),
                                value: value.to_string(),
                            });
                        }
                        *parts = Some(count);
                    }
                    _ => return Err(stray(line_no, "parts", "concatenate")),
                },

                _ => {
                    let Some(index_str) = key.strip_prefix("part_") else {
                        // Unrecognized keys are ignored.
                        continue;
                    };
                    let Ok(index) = index_str.parse::<usize>() else {
                        continue;
                    };

                    let complete = match open {
                        Some(OpenStanza::Concatenate {
                            ref name,
                            parts: Some(parts),
                            ref mut filled,
                        }) => {
                            if index >= parts {
                                return Err(FlowError::PartIndexOutOfRange {
                                    line: line_no,
                                    concatenate: name.clone(),
                                    index,
                                    parts,
                                });
                            }
                            if index != filled.len() {
                                return Err(FlowError::DuplicatePart {
                                    line: line_no,
                                    concatenate: name.clone(),
                                    index,
                                });
                            }
                            filled.push(value.to_string());
                            filled.len() == parts
                        }
                        Some(OpenStanza::Concatenate {
                            ref name,
                            parts: None,
                            ..
                        }) => {
                            return Err(FlowError::MissingDirective {
                                line: line_no,
                                stanza: "concatenate".to_string(),
                                name: name.clone(),
                                key: "parts".to_string(),
                            });
                        }
                        _ => return Err(stray(line_no, key, "concatenate")),
                    };

                    if complete {
                        if let Some(OpenStanza::Concatenate { name, filled, .. }) = open.take() {
                            graph
                                .concatenates
                                .insert(name.clone(), Concatenate { name, parts: filled });
                        }
                    }
                }
            }
        }

        if let Some(unfinished) = open {
            return Err(FlowError::UnterminatedStanza {
                stanza: unfinished.kind().to_string(),
                name: unfinished.name().to_string(),
            });
        }

        Ok(graph)
    }
}

fn stray(line: usize, key: &str, stanza: &str) -> FlowError {
    FlowError::StrayDirective {
        line,
        key: key.to_string(),
        stanza: stanza.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_node_stanza() {
        let graph = FlowGraph::from_str("node=hello\ncommand=echo hello\n").unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes["hello"].command, "echo hello");
    }

    #[test]
    fn test_parse_pipe_stanza() {
        let graph = FlowGraph::from_str("pipe=wire\nfrom=a\nto=b\n").unwrap();
        let pipe = &graph.pipes["wire"];
        assert_eq!(pipe.from, "a");
        assert_eq!(pipe.to, "b");
    }

    #[test]
    fn test_parse_concatenate_stanza() {
        let text = "concatenate=joined\nparts=2\npart_0=a\npart_1=b\n";
        let graph = FlowGraph::from_str(text).unwrap();
        assert_eq!(graph.concatenates["joined"].parts, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_full_flow() {
        let text = "node=list\n\
                    command=ls\n\
                    node=count\n\
                    command=wc -l\n\
                    pipe=list_count\n\
                    from=list\n\
                    to=count\n\
                    concatenate=all\n\
                    parts=2\n\
                    part_0=list\n\
                    part_1=list_count\n";
        let graph = FlowGraph::from_str(text).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.pipes.len(), 1);
        assert_eq!(graph.concatenates.len(), 1);
    }

    #[test]
    fn test_unrecognized_lines_ignored() {
        let text = "# a comment\nnode=hello\nnickname=greeter\ncommand=echo hi\n\n";
        let graph = FlowGraph::from_str(text).unwrap();
        assert_eq!(graph.nodes.len(), 1);
    }

    #[test]
    fn test_multi_digit_part_indices() {
        let mut text = String::from("concatenate=big\nparts=12\n");
        for i in 0..12 {
            text.push_str(&format!("part_{}=n{}\n", i, i));
        }
        let graph = FlowGraph::from_str(&text).unwrap();
        assert_eq!(graph.concatenates["big"].parts.len(), 12);
        assert_eq!(graph.concatenates["big"].parts[11], "n11");
    }

    #[test]
    fn test_part_index_out_of_range() {
        let text = "concatenate=c\nparts=2\npart_0=a\npart_5=b\n";
        assert!(matches!(
            FlowGraph::from_str(text),
            Err(FlowError::PartIndexOutOfRange { index: 5, parts: 2, .. })
        ));
    }

    #[test]
    fn test_out_of_order_part_index() {
        let text = "concatenate=c\nparts=2\npart_1=b\n";
        assert!(matches!(
            FlowGraph::from_str(text),
            Err(FlowError::DuplicatePart { index: 1, .. })
        ));
    }

    #[test]
    fn test_stray_command_line() {
        assert!(matches!(
            FlowGraph::from_str("command=echo hi\n"),
            Err(FlowError::StrayDirective { line: 1, .. })
        ));
    }

    #[test]
    fn test_pipe_missing_from() {
        assert!(matches!(
            FlowGraph::from_str("pipe=wire\nto=b\n"),
            Err(FlowError::MissingDirective { .. })
        ));
    }

    #[test]
    fn test_unterminated_stanza_at_eof() {
        assert!(matches!(
            FlowGraph::from_str("node=hello\n"),
            Err(FlowError::UnterminatedStanza { .. })
        ));
    }

    #[test]
    fn test_stanza_interrupted_by_new_stanza() {
        assert!(matches!(
            FlowGraph::from_str("node=a\nnode=b\ncommand=ls\n"),
            Err(FlowError::UnterminatedStanza { .. })
        ));
    }

    #[test]
    fn test_invalid_parts_count() {
        assert!(matches!(
            FlowGraph::from_str("concatenate=c\nparts=zero\n"),
            Err(FlowError::InvalidPartCount { .. })
        ));
        assert!(matches!(
            FlowGraph::from_str("concatenate=c\nparts=0\n"),
            Err(FlowError::InvalidPartCount { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "node=hi\ncommand=echo hi\n").unwrap();
        let graph = FlowGraph::from_file(file.path()).unwrap();
        assert_eq!(graph.nodes.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            FlowGraph::from_file(Path::new("/nonexistent/flow.txt")),
            Err(FlowError::FlowFileRead { .. })
        ));
    }
}
