//! Interned symbol names.
//!
//! Symbols are interned in a per-thread table, so a `Symbol` is a small `Copy` key
//! and equality is a key comparison. Interned names are never freed.

use std::cell::RefCell;

use string_interner::{DefaultStringInterner, DefaultSymbol};

thread_local! {
    static SYMBOLS: RefCell<DefaultStringInterner> = RefCell::new(DefaultStringInterner::default());
}

/// An identifier: a name for a binding, or the head of a special form.
///
/// Two symbols are equal iff their names are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(DefaultSymbol);

impl Symbol {
    /// Intern the name, returning its symbol.
    pub fn new(name: &str) -> Self {
        SYMBOLS.with(|symbols| Symbol(symbols.borrow_mut().get_or_intern(name)))
    }

    /// Look up the symbol for a name, without interning it.
    ///
    /// A name that has never been interned can't be bound anywhere, so callers can use
    /// this for membership checks without growing the table.
    pub fn existing(name: &str) -> Option<Self> {
        SYMBOLS.with(|symbols| symbols.borrow().get(name).map(Symbol))
    }

    /// Run `f` over the symbol's name.
    pub fn with_name<T>(self, f: impl FnOnce(&str) -> T) -> T {
        SYMBOLS.with(|symbols| {
            let symbols = symbols.borrow();
            // Symbols are only minted by this table, so resolution always succeeds.
            f(symbols.resolve(self.0).unwrap_or_default())
        })
    }

    /// The symbol's name, as an owned string.
    pub fn name(self) -> String {
        self.with_name(str::to_owned)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol::new(value)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with_name(|name| f.write_str(name))
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with_name(|name| write!(f, "Symbol({name})"))
    }
}
