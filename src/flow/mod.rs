// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! Flow graph definitions and loading
//!
//! This module defines the core data structures for procflow graphs
//! (nodes, pipes, concatenates), the flow-file loader, the command
//! tokenizer, and structural validation.

mod dag;
mod definition;
mod loader;
mod tokenize;
mod validation;

pub use dag::RefGraph;
pub use definition::*;
pub use tokenize::tokenize;
pub use validation::{describe, FlowValidator, ValidationResult};
