//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that abort the static trace pass
///
/// Whatever was fully parsed before the fault stays in the graph.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed record at line {line}: expected {expected}, found {found}")]
    MalformedRecord {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid {radix} number '{token}' at line {line}")]
    InvalidNumber {
        line: usize,
        token: String,
        radix: &'static str,
    },

    #[error("Unexpected end of input at line {line} while reading {context}")]
    UnexpectedEof { line: usize, context: String },

    #[error("Failed to read trace file: {0}")]
    Io(#[from] std::io::Error),
}

/// What kind of id a dynamic event failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Block,
    Instruction,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Block => write!(f, "block"),
            ReferenceKind::Instruction => write!(f, "instruction"),
        }
    }
}

/// Recoverable problems found in the dynamic trace
///
/// These never stop the pass: the event is skipped and parsing continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DynamicTraceError {
    #[error("Unknown {kind} id {id:x} at line {line}")]
    UnknownReference {
        line: usize,
        kind: ReferenceKind,
        id: u64,
    },

    #[error("Malformed event at line {line}: {reason}")]
    MalformedEvent { line: usize, reason: String },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
