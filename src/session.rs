//! The root environment and sessions over it.

use std::ops::Deref;
use std::rc::Rc;

use crate::data::{Env, Value};
use crate::error::{Error, Result};
use crate::eval::{Evaluator, Keywords, Output};
use crate::reader::parse_program;

/// The standard library of procedures.
/// This gets evaluated into the root environment when an interpreter is created.
pub const STDLIB: &str = include_str!("eval/stdlib.l");

/// An evaluator plus a root environment, bootstrapped from a library program.
///
/// The root is only written during bootstrap; afterwards it is frozen,
/// and a `def` evaluated directly against it fails.
/// Programs run in sessions: empty environments whose parent is the root.
pub struct Interpreter {
    evaluator: Evaluator,
    root: Rc<Env>,
}

impl Interpreter {
    /// The standard keywords and library, printing to standard output.
    pub fn new() -> Result<Self> {
        Interpreter::with_evaluator(Evaluator::new(Keywords::standard()), STDLIB)
    }

    /// The standard keywords and library, printing to `output`.
    pub fn with_output(output: Output) -> Result<Self> {
        Interpreter::with_evaluator(Evaluator::with_output(Keywords::standard(), output), STDLIB)
    }

    /// Bootstrap a root environment by evaluating `library` with the evaluator.
    pub fn with_evaluator(evaluator: Evaluator, library: &str) -> Result<Self> {
        let root = Env::root();
        let tree = parse_program(evaluator.keywords(), library)
            .map_err(|e| e.annotate("in standard library"))?;
        evaluator
            .evaluate(&tree, &root)
            .map_err(|e| e.annotate("in standard library"))?;
        root.freeze();
        tracing::debug!("bootstrapped root environment with {} bindings", root.len());
        Ok(Interpreter { evaluator, root })
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// The root environment, holding the library's bindings. It is frozen.
    pub fn root(&self) -> &Rc<Env> {
        &self.root
    }

    /// A fresh top-level environment.
    pub fn session(&self) -> Session {
        Session(Env::child(&self.root))
    }

    /// Parse the program text with this interpreter's keywords.
    pub fn parse(&self, src: &str) -> Result<Value> {
        parse_program(self.evaluator.keywords(), src)
    }

    pub fn evaluate(&self, node: &Value, env: &Rc<Env>) -> Result<Value> {
        self.evaluator.evaluate(node, env)
    }

    /// Parse and evaluate a program in the environment.
    ///
    /// Nothing is evaluated unless the whole program parses.
    pub fn run(&self, src: &str, env: &Rc<Env>) -> Result<Value> {
        let tree = self.parse(src)?;
        self.evaluate(&tree, env)
    }

    /// Run the program in the session; the session must be one of this interpreter's.
    pub fn run_in_session(&self, src: &str, session: &Rc<Env>) -> Result<Value> {
        match session.parent() {
            Some(parent) if Rc::ptr_eq(parent, &self.root) => self.run(src, session),
            _ => Err(Error::Name(
                "environment is not a session of this interpreter".to_owned(),
            )),
        }
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        // Library procedures close over the root, and the root binds them.
        self.root.clear();
    }
}

/// A top-level environment whose parent is an interpreter's root.
///
/// Dereferences to the environment, so `&session` can be passed wherever an `&Rc<Env>` is taken.
/// Dropping the session drops its bindings: procedures defined in it close over it,
/// so they would otherwise keep it alive forever.
/// A procedure that outlives its session can no longer see the session's names.
pub struct Session(Rc<Env>);

impl Session {
    pub fn env(&self) -> &Rc<Env> {
        &self.0
    }
}

impl Deref for Session {
    type Target = Rc<Env>;

    fn deref(&self) -> &Rc<Env> {
        &self.0
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.0.clear();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Session").field(&self.0.names()).finish()
    }
}
