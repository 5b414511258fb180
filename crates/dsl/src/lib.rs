//! Cyclic DSL
//!
//! Lexer and parser for the cyclic field-operation notation.
//! Turns a single command string into a typed [`Request`] for the runtime.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{PhaseName, Request};
pub use lexer::{lex, LexError, Token};
pub use parser::{parse, ParseError};
