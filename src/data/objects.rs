use std::rc::Rc;

use super::{Env, Symbol};

pub type Integer = i64;

/// Enum for a Lisp value.
///
/// The reader produces only atoms and lists;
/// `Procedure` and `Nil` appear only as results of evaluation.
#[derive(Debug, Clone)]
pub enum Value {
    /// The result of a form that produces nothing useful, e.g. `print`.
    Nil,
    Integer(Integer),
    /// Text, with escapes already decoded.
    Text(Rc<str>),
    Boolean(bool),
    Symbol(Symbol),
    List(Rc<[Value]>),
    Procedure(Rc<Procedure>),
}

/// A user-defined procedure: parameters, a body, and the environment it closes over.
pub struct Procedure {
    params: Vec<Symbol>,
    body: Value,
    env: Rc<Env>,
}

impl Procedure {
    pub fn new(params: Vec<Symbol>, body: Value, env: Rc<Env>) -> Self {
        Procedure { params, body, env }
    }

    pub fn params(&self) -> &[Symbol] {
        &self.params
    }

    /// Number of arguments the procedure must be called with.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// The defining environment.
    pub fn env(&self) -> &Rc<Env> {
        &self.env
    }
}

// The captured environment may (through a binding) contain this procedure,
// so Debug stops at the procedure boundary.
impl std::fmt::Debug for Procedure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Procedure")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            // Procedures have identity, not structure.
            (Value::Procedure(a), Value::Procedure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    pub fn text(s: &str) -> Self {
        Value::Text(s.into())
    }

    pub fn symbol(name: &str) -> Self {
        Value::Symbol(Symbol::new(name))
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    /// Short name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Integer(_) => "integer",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Procedure(_) => "procedure",
        }
    }

    /// Whether the value holds a procedure closing over `env`, or over a scope inside it.
    pub fn captures(&self, env: &Env) -> bool {
        match self {
            Value::Procedure(proc) => proc.env().extends(env),
            Value::List(items) => items.iter().any(|v| v.captures(env)),
            _ => false,
        }
    }

    #[inline]
    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Value::Symbol(s) => Some(*s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Integer> for Value {
    fn from(value: Integer) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::text(value)
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Value::Symbol(value)
    }
}

impl From<Procedure> for Value {
    fn from(value: Procedure) -> Self {
        Value::Procedure(Rc::new(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value.into())
    }
}
