//! Lisp data types.
//!
//! Values are immutable and shared by reference count:
//! - i64 integers, booleans, and interned symbols are plain copies
//! - text and lists are `Rc` slices, shared between the syntax tree and anything evaluated from it
//! - procedures hold an `Rc` to their defining environment,
//!   which keeps that environment alive after the call that created it returns.
//!
//! Reference cycles (a procedure bound in the environment it closes over) are not reclaimed.
//! Such procedures are typically top-level definitions that live as long as their session anyway.

mod env;
mod objects;
mod render;
mod symbols;

pub use env::Env;
pub use objects::*;
pub use symbols::Symbol;
