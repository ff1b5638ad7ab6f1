//! A small Lisp: a tokenizer, a reader, and a tree-walking evaluator
//! over chained lexical environments.
//!
//! ```
//! use lisplet::{Interpreter, Value};
//!
//! let interp = Interpreter::new().unwrap();
//! let session = interp.session();
//! let got = interp.run("(def sq (fn (x) (* x x))) (sq 12)", &session).unwrap();
//! assert_eq!(got, Value::Integer(144));
//! ```

pub mod data;
pub mod error;
pub mod eval;
pub mod host;
pub mod reader;
pub mod session;

pub use data::{Env, Procedure, Symbol, Value};
pub use error::{Error, Result};
pub use eval::{Evaluator, Handler, Keywords};
pub use session::{Interpreter, Session};

/// Parse the program text with the standard keywords.
pub fn parse(src: &str) -> Result<Value> {
    reader::parse_program(&Keywords::standard(), src)
}
