// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 procflow contributors

//! Command-string tokenizer
//!
//! Splits a node's command line into an argument list. Tokens are
//! whitespace-separated; a token opened by a single quote runs to the
//! matching close quote (whitespace included) and has exactly that outer
//! pair stripped. There is no interior escaping and no nested quoting.

/// Split a command string into an argument list.
///
/// An empty (or all-whitespace) command yields an empty argv, which the
/// process runner rejects before attempting a spawn.
pub fn tokenize(command: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = command.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        if chars[i] == '\'' {
            // Quoted token: runs to the matching close quote, whitespace
            // included. An unmatched open quote is kept as an ordinary
            // character.
            if let Some(close) = chars[i + 1..].iter().position(|&c| c == '\'') {
                tokens.push(chars[i + 1..i + 1 + close].iter().collect());
                i += close + 2;
                continue;
            }
        }

        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() {
            i += 1;
        }
        tokens.push(chars[start..i].iter().collect());
    }

    tokens
}
