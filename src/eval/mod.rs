//! Lisp evaluator.
//!
//! A direct tree-walker: `evaluate` recurses on sub-forms,
//! and calls to procedures recurse through `invoke` on the procedure body.
//!
//! The evaluator knows nothing about any particular special form.
//! Keywords are looked up in a [`Keywords`] table given at construction,
//! and their handlers decide which of their arguments to evaluate, and when.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::data::{Env, Procedure, Symbol, Value};
use crate::error::{Error, Result};

mod builtins;

pub use builtins::{BUILTINS, GROUPING};

/// A keyword handler.
///
/// Receives the evaluator (to evaluate sub-forms), the current environment,
/// and the unevaluated arguments of the form.
pub type Handler = fn(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value>;

/// Where `print` output goes.
pub type Output = Rc<RefCell<dyn Write>>;

/// A table of reserved keywords and their handlers.
#[derive(Clone)]
pub struct Keywords {
    grouping: String,
    handlers: HashMap<Symbol, Handler>,
}

impl Keywords {
    /// An empty table.
    ///
    /// `grouping` names the keyword that wraps a whole program;
    /// the table should register a handler for it that evaluates a sequence of forms.
    pub fn new(grouping: impl Into<String>) -> Self {
        Keywords {
            grouping: grouping.into(),
            handlers: HashMap::new(),
        }
    }

    /// The standard keywords: binding forms, conditionals, arithmetic, and printing.
    pub fn standard() -> Self {
        BUILTINS
            .iter()
            .fold(Keywords::new(GROUPING), |kw, (name, handler)| {
                kw.with(name, *handler)
            })
    }

    /// Add (or replace) a keyword.
    pub fn with(mut self, name: &str, handler: Handler) -> Self {
        self.insert(name, handler);
        self
    }

    pub fn insert(&mut self, name: &str, handler: Handler) {
        self.handlers.insert(Symbol::new(name), handler);
    }

    pub fn grouping(&self) -> &str {
        &self.grouping
    }

    pub fn get(&self, symbol: Symbol) -> Option<Handler> {
        self.handlers.get(&symbol).copied()
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.handlers.contains_key(&symbol)
    }

    /// Whether the name is a keyword, without interning it.
    pub fn contains_name(&self, name: &str) -> bool {
        Symbol::existing(name).is_some_and(|s| self.contains(s))
    }

    /// Keyword names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().map(|s| s.name()).collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for Keywords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keywords")
            .field("grouping", &self.grouping)
            .field("names", &self.names())
            .finish()
    }
}

impl Default for Keywords {
    fn default() -> Self {
        Keywords::standard()
    }
}

/// Evaluates expressions against environments.
pub struct Evaluator {
    keywords: Keywords,
    output: Output,
}

impl Evaluator {
    /// An evaluator printing to standard output.
    pub fn new(keywords: Keywords) -> Self {
        Evaluator::with_output(keywords, Rc::new(RefCell::new(std::io::stdout())))
    }

    pub fn with_output(keywords: Keywords, output: Output) -> Self {
        Evaluator { keywords, output }
    }

    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    /// The sink for program output.
    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Evaluate the expression in the environment.
    pub fn evaluate(&self, node: &Value, env: &Rc<Env>) -> Result<Value> {
        match node {
            Value::List(items) => {
                let Some((head, args)) = items.split_first() else {
                    return Err(not_callable(node));
                };
                match head {
                    Value::Symbol(symbol) => {
                        if let Some(handler) = self.keywords.get(*symbol) {
                            tracing::trace!("dispatching keyword {symbol}");
                            return handler(self, env, args);
                        }
                        let proc = match env.get(*symbol) {
                            Some(Value::Procedure(proc)) => proc,
                            Some(v) => {
                                return Err(Error::Type(format!(
                                    "symbol: {symbol} is not a proc; it is a {}",
                                    v.type_name()
                                )))
                            }
                            None => {
                                return Err(Error::Name(format!(
                                    "proc not found for symbol: {symbol}"
                                )))
                            }
                        };
                        self.invoke(&proc, args, env)
                    }
                    Value::List(_) => match self.evaluate(head, env)? {
                        Value::Procedure(proc) => self.invoke(&proc, args, env),
                        v => Err(Error::Type(format!(
                            "call head {head} evaluated to a {}, not a proc",
                            v.type_name()
                        ))),
                    },
                    _ => Err(not_callable(node)),
                }
            }
            Value::Symbol(symbol) => env
                .get(*symbol)
                .ok_or_else(|| Error::Name(format!("value not found for symbol: {symbol}"))),
            v => Ok(v.clone()),
        }
    }

    /// Evaluate each expression in order, returning the last value (or nil, if there are none).
    pub fn evaluate_body(&self, body: &[Value], env: &Rc<Env>) -> Result<Value> {
        let mut result = Value::Nil;
        for expr in body {
            result = self.evaluate(expr, env)?;
        }
        Ok(result)
    }

    /// Call the procedure.
    ///
    /// Arguments are evaluated left-to-right in the caller's environment,
    /// and bound in a new environment extending the procedure's defining environment.
    pub fn invoke(&self, proc: &Procedure, args: &[Value], caller: &Rc<Env>) -> Result<Value> {
        if proc.arity() != args.len() {
            return Err(Error::Arity(format!(
                "invalid arg count: procedure takes {} arguments, got {}",
                proc.arity(),
                args.len()
            )));
        }

        let scope = Env::child(proc.env());
        for (param, arg) in proc.params().iter().zip(args) {
            let value = self.evaluate(arg, caller)?;
            scope.define(*param, value)?;
        }
        tracing::trace!("invoking procedure with {} arguments", args.len());
        let result = self.evaluate(proc.body(), &scope);
        release_scope(&scope, &result);
        result
    }
}

/// Break reference cycles through a scope that has finished evaluating.
///
/// Only a returned procedure can still reach the scope; if there is none,
/// the bindings (and any procedure `def`'d there, closing over the scope) are dropped.
pub(crate) fn release_scope(scope: &Env, result: &Result<Value>) {
    match result {
        Ok(v) if v.captures(scope) => {
            tracing::trace!("scope outlives its evaluation: captured by the result");
        }
        _ => scope.clear(),
    }
}

fn not_callable(node: &Value) -> Error {
    Error::Type(format!(
        "first element of a call must be a symbol or a procedure-valued expression: {node}"
    ))
}

#[cfg(test)]
mod stdlib_test;
