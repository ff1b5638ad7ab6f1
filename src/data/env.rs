//! Chained lexical environments.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::{Symbol, Value};
use crate::error::{Error, Result};

/// A set of bindings, plus the environment it extends.
///
/// Bindings are only ever added to the environment itself;
/// a parent is read through, never written through.
/// Environments are shared by `Rc`: a procedure keeps its defining environment alive
/// for as long as the procedure is reachable.
///
/// A procedure bound in the environment it captures makes a reference cycle.
/// Whoever owns the scope breaks it with [`Env::clear`] once the scope is done:
/// calls and `let` when their result doesn't capture the scope,
/// sessions when they are dropped, the root when its interpreter is dropped.
#[derive(Default)]
pub struct Env {
    bindings: RefCell<HashMap<Symbol, Value>>,
    parent: Option<Rc<Env>>,
    frozen: Cell<bool>,
}

impl Env {
    /// A new environment with no parent.
    pub fn root() -> Rc<Env> {
        Rc::new(Env::default())
    }

    /// A new, empty environment extending `parent`.
    pub fn child(parent: &Rc<Env>) -> Rc<Env> {
        Rc::new(Env {
            bindings: Default::default(),
            parent: Some(parent.clone()),
            frozen: Cell::new(false),
        })
    }

    pub fn parent(&self) -> Option<&Rc<Env>> {
        self.parent.as_ref()
    }

    /// Bind (or rebind) the symbol in this environment.
    ///
    /// Fails if the environment is frozen.
    pub fn define(&self, symbol: Symbol, value: Value) -> Result<()> {
        if self.frozen.get() {
            return Err(Error::Name(format!(
                "cannot define {symbol}: environment is read-only"
            )));
        }
        self.bindings.borrow_mut().insert(symbol, value);
        Ok(())
    }

    /// Reject any further `define` in this environment. Children are unaffected.
    pub fn freeze(&self) {
        self.frozen.set(true);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    /// Drop every binding in this environment itself, frozen or not.
    pub fn clear(&self) {
        // Take the map out first: dropping a procedure may drop another environment,
        // and nothing should run while the bindings are borrowed.
        let bindings = std::mem::take(&mut *self.bindings.borrow_mut());
        drop(bindings);
    }

    /// Whether this environment is `ancestor`, or extends it (at any depth).
    pub fn extends(&self, ancestor: &Env) -> bool {
        let mut cur = Some(self);
        while let Some(env) = cur {
            if std::ptr::eq(env, ancestor) {
                return true;
            }
            cur = env.parent.as_deref();
        }
        false
    }

    /// Find the innermost binding for the symbol, walking out through parents.
    pub fn get(&self, symbol: Symbol) -> Option<Value> {
        let mut cur = Some(self);
        while let Some(env) = cur {
            if let Some(v) = env.bindings.borrow().get(&symbol) {
                return Some(v.clone());
            }
            cur = env.parent.as_deref();
        }
        None
    }

    /// Whether the symbol is bound in this environment itself, ignoring parents.
    pub fn contains_local(&self, symbol: Symbol) -> bool {
        self.bindings.borrow().contains_key(&symbol)
    }

    /// Number of bindings in this environment itself.
    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }

    /// Names bound in this environment itself, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.borrow().keys().map(|s| s.name()).collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("names", &self.names())
            .field("frozen", &self.frozen.get())
            .field("parent", &self.parent)
            .finish()
    }
}
