// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! Error types for flow loading and execution
//!
//! Structural errors (unresolvable names, empty commands) abort only the
//! sub-tree that hit them; resource errors (the OS refusing to create a
//! process or a pipe) abort the whole invocation. `FlowError::is_fatal`
//! encodes that split for the executor.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for procflow operations
pub type FlowResult<T> = Result<T, FlowError>;

/// Main error type for procflow
#[derive(Error, Debug, Diagnostic)]
pub enum FlowError {
    // ─────────────────────────────────────────────────────────────────────────
    // Graph integrity
    // ─────────────────────────────────────────────────────────────────────────
    #[error("No element named '{name}'")]
    #[diagnostic(
        code(procflow::element_not_found),
        help("Check that the flow file declares a node, pipe, or concatenate called '{name}'")
    )]
    ElementNotFound { name: String },

    #[error("Name '{name}' is ambiguous: declared as {kinds}")]
    #[diagnostic(
        code(procflow::ambiguous_element),
        help("Every node, pipe, and concatenate must have a unique name")
    )]
    AmbiguousElement { name: String, kinds: String },

    #[error("Node '{node}' has an empty command")]
    #[diagnostic(
        code(procflow::empty_command),
        help("A node's command line must contain at least a program name")
    )]
    EmptyCommand { node: String },

    #[error("Circular reference detected")]
    #[diagnostic(
        code(procflow::circular_reference),
        help("Review pipe and concatenate references to remove the cycle")
    )]
    CircularReference { elements: Vec<String> },

    // ─────────────────────────────────────────────────────────────────────────
    // Flow file loading
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read flow file '{path}': {error}")]
    #[diagnostic(code(procflow::flow_file_read))]
    FlowFileRead { path: PathBuf, error: String },

    #[error("Line {line}: '{key}=' outside of a {stanza} stanza")]
    #[diagnostic(
        code(procflow::stray_directive),
        help("'{key}=' is only valid after an opening '{stanza}=<name>' line")
    )]
    StrayDirective {
        line: usize,
        key: String,
        stanza: String,
    },

    #[error("Line {line}: invalid parts count '{value}' for concatenate '{concatenate}'")]
    #[diagnostic(code(procflow::invalid_part_count))]
    InvalidPartCount {
        line: usize,
        concatenate: String,
        value: String,
    },

    #[error(
        "Line {line}: part index {index} out of range for concatenate '{concatenate}' ({parts} parts)"
    )]
    #[diagnostic(
        code(procflow::part_index_out_of_range),
        help("Part indices must run from 0 to parts-1 in increasing order")
    )]
    PartIndexOutOfRange {
        line: usize,
        concatenate: String,
        index: usize,
        parts: usize,
    },

    #[error("Line {line}: duplicate or out-of-order part index {index} for concatenate '{concatenate}'")]
    #[diagnostic(code(procflow::duplicate_part))]
    DuplicatePart {
        line: usize,
        concatenate: String,
        index: usize,
    },

    #[error("The {stanza} stanza '{name}' is never completed")]
    #[diagnostic(
        code(procflow::unterminated_stanza),
        help("Each stanza must reach its committing line before the next stanza or end of file")
    )]
    UnterminatedStanza { stanza: String, name: String },

    #[error("Line {line}: {stanza} '{name}' is missing '{key}=' at this point")]
    #[diagnostic(code(procflow::missing_directive))]
    MissingDirective {
        line: usize,
        stanza: String,
        name: String,
        key: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Execution resources
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to spawn '{program}': {error}")]
    #[diagnostic(code(procflow::spawn_failed))]
    Spawn { program: String, error: String },

    #[error("Failed to create a pipe: {error}")]
    #[diagnostic(
        code(procflow::pipe_creation_failed),
        help("The OS refused to allocate a pipe; check the open-descriptor limit")
    )]
    PipeCreation { error: String },

    #[error("Failed to wait for '{program}': {error}")]
    #[diagnostic(code(procflow::wait_failed))]
    Wait { program: String, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(procflow::io_error))]
    Io { message: String },
}

impl From<std::io::Error> for FlowError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl FlowError {
    /// Whether this error must abort the entire invocation.
    ///
    /// Resource errors mean process or pipe creation itself is unreliable;
    /// no partial continuation is safe after one. Everything else is scoped
    /// to the sub-tree that produced it, so sibling concatenate parts still
    /// run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Spawn { .. } | Self::PipeCreation { .. } | Self::Wait { .. } | Self::Io { .. }
        )
    }

    /// Create an ambiguity error from the kinds a name resolved to
    pub fn ambiguous(name: &str, kinds: &[&str]) -> Self {
        Self::AmbiguousElement {
            name: name.to_string(),
            kinds: kinds.join(" and "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_errors_are_not_fatal() {
        assert!(!FlowError::ElementNotFound { name: "x".into() }.is_fatal());
        assert!(!FlowError::EmptyCommand { node: "x".into() }.is_fatal());
        assert!(!FlowError::ambiguous("x", &["node", "pipe"]).is_fatal());
    }

    #[test]
    fn test_resource_errors_are_fatal() {
        let err = FlowError::Spawn {
            program: "cat".into(),
            error: "EAGAIN".into(),
        };
        assert!(err.is_fatal());
        assert!(FlowError::PipeCreation { error: "EMFILE".into() }.is_fatal());
    }

    #[test]
    fn test_ambiguous_message_lists_kinds() {
        let err = FlowError::ambiguous("dup", &["node", "concatenate"]);
        assert_eq!(
            err.to_string(),
            "Name 'dup' is ambiguous: declared as node and concatenate"
        );
    }
}
