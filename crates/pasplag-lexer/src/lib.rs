//! Normalising Pascal tokenizer.
//!
//! Lexes Pascal-family source into an ordered stream of normalised token
//! values, each carrying its source region. Identifiers collapse to `IDENT`,
//! literals to `NUM`/`STR`, keywords keep their lowercased lexeme, so trivial
//! renames do not change the stream while structure is preserved.

pub mod lexer;
pub mod token;

pub use lexer::tokenize;
pub use token::{Region, Token, TokenizedFile};

/// A source file at the request boundary. Immutable after load.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}
