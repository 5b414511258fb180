//! Cyclic Runtime
//!
//! Owns the field registry and executes parsed commands against it:
//! parse → resolve → snapshot → apply → check invariant → commit.

pub mod conservation;
pub mod error;
pub mod field;
pub mod interpreter;
pub mod ops;
pub mod registry;
pub mod types;

pub use conservation::InvariantClass;
pub use error::{Error, Result};
pub use field::FieldState;
pub use interpreter::{Interpreter, ScriptEvent};
pub use registry::FieldRegistry;
pub use types::*;
