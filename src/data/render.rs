//! Rendering values as text.
//!
//! `Display` is the form `print` writes: text without quotes.
//! `Value::repr` renders text as a quoted, escaped literal,
//! so atoms and lists render as source the reader accepts back.

use super::Value;

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            v => write_value(f, v),
        }
    }
}

impl Value {
    /// Render the value as a literal, quoting and escaping text.
    pub fn repr(&self) -> String {
        struct Repr<'a>(&'a Value);
        impl std::fmt::Display for Repr<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write_value(f, self.0)
            }
        }
        Repr(self).to_string()
    }
}

fn write_value(f: &mut std::fmt::Formatter<'_>, value: &Value) -> std::fmt::Result {
    match value {
        Value::Nil => f.write_str("nil"),
        Value::Integer(i) => write!(f, "{i}"),
        Value::Text(s) => write_text(f, s),
        Value::Boolean(b) => write!(f, "{b}"),
        Value::Symbol(s) => write!(f, "{s}"),
        Value::List(items) => {
            f.write_str("(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write_value(f, item)?;
            }
            f.write_str(")")
        }
        Value::Procedure(p) => {
            f.write_str("<fn (")?;
            for (i, param) in p.params().iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{param}")?;
            }
            f.write_str(")>")
        }
    }
}

fn write_text(f: &mut std::fmt::Formatter<'_>, s: &str) -> std::fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str(r"\\")?,
            '"' => f.write_str(r#"\""#)?,
            '\n' => f.write_str(r"\n")?,
            '\t' => f.write_str(r"\t")?,
            c if (c as u32) < 0x20 || c as u32 == 0x7f => write!(f, r"\x{:02x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}
