use std::rc::Rc;

use crate::data::{Env, Integer, Procedure, Symbol, Value};
use crate::error::{Error, Result};
use crate::eval::{release_scope, Evaluator, Handler};

/// The keyword that wraps a whole program.
pub const GROUPING: &str = "do";

/// The standard keywords.
///
/// These are dispatched before any environment lookup,
/// so they can't be shadowed or rebound by a program.
/// Each handler gets its arguments unevaluated; forms like `if`, `and`, `fn`
/// evaluate only what they need.
pub const BUILTINS: &[(&str, Handler)] = &[
    // First: the forms.
    ("def", builtin_def),
    ("do", builtin_do),
    ("fn", builtin_fn),
    ("let", builtin_let),
    ("if", builtin_if),
    ("or", builtin_or),
    ("and", builtin_and),
    ("not", builtin_not),
    ("print", builtin_print),
    // Second: operators over evaluated arguments.
    ("+", builtin_add),
    ("-", builtin_sub),
    ("*", builtin_mul),
    ("/", builtin_div),
    ("<", builtin_lt),
    (">", builtin_gt),
    ("=", builtin_eq),
];

/// Get exactly N (unevaluated) arguments to a keyword.
fn get_args<'a, const N: usize>(name: &str, args: &'a [Value]) -> Result<&'a [Value; N]> {
    args.try_into().map_err(|_| {
        Error::Arity(format!(
            "{name} takes {N} arguments, got {}: {}",
            args.len(),
            Value::list(args.iter().cloned())
        ))
    })
}

fn get_symbol(name: &str, what: &str, v: &Value) -> Result<Symbol> {
    v.as_symbol()
        .ok_or_else(|| Error::Type(format!("{name}: {what} must be a symbol, got {v}")))
}

fn eval_bool(eval: &Evaluator, env: &Rc<Env>, name: &str, expr: &Value) -> Result<bool> {
    match eval.evaluate(expr, env)? {
        Value::Boolean(b) => Ok(b),
        v => Err(Error::Type(format!(
            "{name}: expected a boolean, got {} {}",
            v.type_name(),
            v.repr()
        ))),
    }
}

fn eval_integers(
    eval: &Evaluator,
    env: &Rc<Env>,
    name: &str,
    args: &[Value],
) -> Result<Vec<Integer>> {
    args.iter()
        .map(|expr| match eval.evaluate(expr, env)? {
            Value::Integer(i) => Ok(i),
            v => Err(Error::Type(format!(
                "{name}: expected an integer, got {} {}",
                v.type_name(),
                v.repr()
            ))),
        })
        .collect()
}

fn overflow(name: &str) -> Error {
    Error::Arithmetic(format!("{name}: integer overflow"))
}

/// `(def name expr)`: bind in the current environment, and return the value.
fn builtin_def(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    let [name, expr] = get_args::<2>("def", args)?;
    let symbol = get_symbol("def", "binding name", name)?;
    if eval.keywords().contains(symbol) {
        return Err(Error::Type(format!(
            "def: cannot bind reserved keyword {symbol}"
        )));
    }
    let value = eval.evaluate(expr, env)?;
    env.define(symbol, value.clone())?;
    Ok(value)
}

/// `(do expr...)`: evaluate each in turn, in this environment.
fn builtin_do(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    // No nested environment: a `def` inside `do` binds in the enclosing scope.
    eval.evaluate_body(args, env)
}

/// `(fn (params...) body)`: a procedure closing over the current environment.
fn builtin_fn(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    let [params, body] = get_args::<2>("fn", args)?;
    let params = params
        .as_list()
        .ok_or_else(|| Error::Type(format!("fn: parameters must be a list, got {params}")))?;

    let mut symbols: Vec<Symbol> = Vec::with_capacity(params.len());
    for param in params {
        let symbol = get_symbol("fn", "parameter", param)?;
        if eval.keywords().contains(symbol) {
            return Err(Error::Type(format!(
                "fn: reserved keyword {symbol} cannot be a parameter"
            )));
        }
        if symbols.contains(&symbol) {
            return Err(Error::Type(format!("fn: duplicate parameter {symbol}")));
        }
        symbols.push(symbol);
    }

    Ok(Procedure::new(symbols, body.clone(), env.clone()).into())
}

/// `(let ((name expr)...) body)`: evaluate the body with extra bindings.
///
/// Bindings are made in order, in the new scope, so later ones can refer to earlier ones.
fn builtin_let(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    let [bindings, body] = get_args::<2>("let", args)?;
    let bindings = bindings
        .as_list()
        .ok_or_else(|| Error::Type(format!("let: bindings must be a list, got {bindings}")))?;

    let scope = Env::child(env);
    let result = let_bindings(eval, &scope, bindings).and_then(|()| eval.evaluate(body, &scope));
    release_scope(&scope, &result);
    result
}

fn let_bindings(eval: &Evaluator, scope: &Rc<Env>, bindings: &[Value]) -> Result<()> {
    for binding in bindings {
        let [name, expr] = binding
            .as_list()
            .ok_or_else(|| Error::Type(format!("let: binding must be a list, got {binding}")))
            .and_then(|b| get_args::<2>("let binding", b))?;
        let symbol = get_symbol("let", "binding name", name)?;
        if eval.keywords().contains(symbol) {
            return Err(Error::Type(format!(
                "let: cannot bind reserved keyword {symbol}"
            )));
        }
        let value = eval.evaluate(expr, scope)?;
        scope.define(symbol, value)?;
    }
    Ok(())
}

/// `(if predicate then [else])`
fn builtin_if(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    let (predicate, pos, neg) = match args {
        [predicate, pos] => (predicate, pos, None),
        [predicate, pos, neg] => (predicate, pos, Some(neg)),
        _ => {
            return Err(Error::Arity(format!(
                "if takes a predicate, a positive case, and an optional negative case; got {} arguments",
                args.len()
            )))
        }
    };
    if eval_bool(eval, env, "if", predicate)? {
        eval.evaluate(pos, env)
    } else if let Some(neg) = neg {
        eval.evaluate(neg, env)
    } else {
        Ok(Value::Nil)
    }
}

/// `(or b...)`: true at the first true argument; later arguments are not evaluated.
fn builtin_or(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    for arg in args {
        if eval_bool(eval, env, "or", arg)? {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

/// `(and b...)`: false at the first false argument; later arguments are not evaluated.
fn builtin_and(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    for arg in args {
        if !eval_bool(eval, env, "and", arg)? {
            return Ok(Value::Boolean(false));
        }
    }
    Ok(Value::Boolean(true))
}

fn builtin_not(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    let [arg] = get_args::<1>("not", args)?;
    Ok(Value::Boolean(!eval_bool(eval, env, "not", arg)?))
}

/// `(print expr...)`: write the values, space-separated, on one line.
fn builtin_print(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    // Evaluate everything before writing anything,
    // so an error in a later argument doesn't leave half a line.
    let values = args
        .iter()
        .map(|arg| eval.evaluate(arg, env))
        .collect::<Result<Vec<_>>>()?;
    let line = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = eval.output().borrow_mut();
    writeln!(out, "{line}")?;
    out.flush()?;
    Ok(Value::Nil)
}

/// `(+ ...)`: sum of integers, or concatenation of text.
fn builtin_add(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    let values = args
        .iter()
        .map(|arg| eval.evaluate(arg, env))
        .collect::<Result<Vec<_>>>()?;

    if matches!(values.first(), Some(Value::Text(_))) {
        let mut s = String::new();
        for v in &values {
            match v {
                Value::Text(t) => s.push_str(t),
                v => {
                    return Err(Error::Type(format!(
                        "incompatible arguments: cannot add {} {} to text",
                        v.type_name(),
                        v.repr()
                    )))
                }
            }
        }
        return Ok(Value::text(&s));
    }

    let mut sum: Integer = 0;
    for v in &values {
        match v {
            Value::Integer(i) => sum = sum.checked_add(*i).ok_or_else(|| overflow("+"))?,
            v => {
                return Err(Error::Type(format!(
                    "incompatible arguments: cannot add {} {} to integer",
                    v.type_name(),
                    v.repr()
                )))
            }
        }
    }
    Ok(Value::Integer(sum))
}

/// `(- x)` negates; `(- x y...)` subtracts from left to right.
fn builtin_sub(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    let values = eval_integers(eval, env, "-", args)?;
    let result = match values.as_slice() {
        [] => return Err(Error::Arity("- takes at least 1 argument, got 0".to_owned())),
        [x] => x.checked_neg().ok_or_else(|| overflow("-"))?,
        [first, rest @ ..] => rest.iter().try_fold(*first, |acc, x| {
            acc.checked_sub(*x).ok_or_else(|| overflow("-"))
        })?,
    };
    Ok(Value::Integer(result))
}

fn builtin_mul(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    let values = eval_integers(eval, env, "*", args)?;
    let product = values.iter().try_fold(1 as Integer, |acc, x| {
        acc.checked_mul(*x).ok_or_else(|| overflow("*"))
    })?;
    Ok(Value::Integer(product))
}

/// `(/ x y...)`: truncating division, left to right.
fn builtin_div(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    if args.len() < 2 {
        return Err(Error::Arity(format!(
            "/ takes at least 2 arguments, got {}",
            args.len()
        )));
    }
    let values = eval_integers(eval, env, "/", args)?;
    let result = values[1..].iter().try_fold(values[0], |acc, x| {
        if *x == 0 {
            return Err(Error::Arithmetic(format!("/: division by zero: {acc} / 0")));
        }
        acc.checked_div(*x).ok_or_else(|| overflow("/"))
    })?;
    Ok(Value::Integer(result))
}

fn compare(
    eval: &Evaluator,
    env: &Rc<Env>,
    args: &[Value],
    name: &str,
    op: fn(&Integer, &Integer) -> bool,
) -> Result<Value> {
    let exprs = get_args::<2>(name, args)?;
    let values = eval_integers(eval, env, name, exprs)?;
    Ok(Value::Boolean(op(&values[0], &values[1])))
}

fn builtin_lt(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    compare(eval, env, args, "<", Integer::lt)
}

fn builtin_gt(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    compare(eval, env, args, ">", Integer::gt)
}

/// `(= a b)`: structural equality for data, identity for procedures.
fn builtin_eq(eval: &Evaluator, env: &Rc<Env>, args: &[Value]) -> Result<Value> {
    let [a, b] = get_args::<2>("=", args)?;
    let a = eval.evaluate(a, env)?;
    let b = eval.evaluate(b, env)?;
    Ok(Value::Boolean(a == b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Keywords;
    use crate::reader::parse_program;
    use std::cell::RefCell;

    /// Evaluate the program in a fresh environment, with the standard keywords;
    /// return the result and anything printed.
    fn run(src: &str) -> (Result<Value>, String) {
        let buf = Rc::new(RefCell::new(Vec::<u8>::new()));
        let keywords = Keywords::standard();
        let eval = Evaluator::with_output(keywords.clone(), buf.clone());
        let result =
            parse_program(&keywords, src).and_then(|tree| eval.evaluate(&tree, &Env::root()));
        let printed = String::from_utf8(buf.borrow().clone()).unwrap();
        (result, printed)
    }

    fn eval_ok(src: &str) -> Value {
        match run(src) {
            (Ok(v), _) => v,
            (Err(e), _) => panic!("unexpected error for {src}: {e}"),
        }
    }

    #[test]
    fn get_args_checks_count() {
        let args = [Value::Integer(1), Value::Integer(2)];
        assert!(get_args::<2>("x", &args).is_ok());
        match get_args::<3>("x", &args) {
            Err(Error::Arity(e)) => assert!(e.contains("x takes 3 arguments, got 2"), "{e}"),
            v => panic!("unexpected result: {v:?}"),
        }
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval_ok("(+ 1 2)"), Value::Integer(3));
        assert_eq!(eval_ok("(+)"), Value::Integer(0));
        assert_eq!(eval_ok("(- 5)"), Value::Integer(-5));
        assert_eq!(eval_ok("(- 10 3 2)"), Value::Integer(5));
        assert_eq!(eval_ok("(* 2 3 4)"), Value::Integer(24));
        assert_eq!(eval_ok("(/ 20 3)"), Value::Integer(6));
        assert_eq!(eval_ok("(/ -7 2)"), Value::Integer(-3));
        assert_eq!(eval_ok("(+ \"ab\" \"cd\")"), Value::text("abcd"));
    }

    #[test]
    fn arithmetic_errors() {
        match run("(/ 1 0)").0 {
            Err(Error::Arithmetic(e)) => assert!(e.contains("division by zero"), "{e}"),
            v => panic!("unexpected result: {v:?}"),
        }
        match run("(* 9223372036854775807 2)").0 {
            Err(Error::Arithmetic(e)) => assert!(e.contains("overflow"), "{e}"),
            v => panic!("unexpected result: {v:?}"),
        }
        match run("(+ 1 \"a\")").0 {
            Err(Error::Type(_)) => (),
            v => panic!("unexpected result: {v:?}"),
        }
        match run("(< 1 2 3)").0 {
            Err(Error::Arity(_)) => (),
            v => panic!("unexpected result: {v:?}"),
        }
    }

    #[test]
    fn comparisons() {
        assert_eq!(eval_ok("(< 1 2)"), Value::Boolean(true));
        assert_eq!(eval_ok("(> 1 2)"), Value::Boolean(false));
        assert_eq!(eval_ok("(= \"a\" \"a\")"), Value::Boolean(true));
        assert_eq!(eval_ok("(= 1 \"1\")"), Value::Boolean(false));
    }

    #[test]
    fn def_binds_and_returns() {
        assert_eq!(eval_ok("(def a 7) (def b a) b"), Value::Integer(7));
        assert_eq!(eval_ok("(def a 7)"), Value::Integer(7));
    }

    #[test]
    fn def_requires_symbol() {
        match run("(def 1 39)").0 {
            Err(Error::Type(_)) => (),
            v => panic!("unexpected eval result: {v:?}"),
        }
        match run("(def print 39)").0 {
            Err(Error::Type(e)) => assert!(e.contains("reserved keyword"), "{e}"),
            v => panic!("unexpected eval result: {v:?}"),
        }
    }

    #[test]
    fn def_body_is_expression() {
        for src in ["(def a)", "(def a 1 2 3)"] {
            match run(src).0 {
                Err(Error::Arity(_)) => (),
                v => panic!("unexpected eval result for {src}: {v:?}"),
            }
        }
    }

    #[test]
    fn do_returns_last() {
        assert_eq!(eval_ok("(do 1 2 3 4)"), Value::Integer(4));
        assert_eq!(eval_ok("(do)"), Value::Nil);
    }

    #[test]
    fn invoke_fn() {
        assert_eq!(eval_ok("(def id (fn (x) x)) (id 7)"), Value::Integer(7));
        assert_eq!(eval_ok("((fn (a b) (- a b)) 10 4)"), Value::Integer(6));
    }

    #[test]
    fn fn_checks_parameters() {
        for src in ["(fn x x)", "(fn (1) 1)", "(fn (a a) a)", "(fn (if) 1)", "(fn (a))"] {
            match run(src).0 {
                Err(Error::Type(_)) | Err(Error::Arity(_)) => (),
                v => panic!("unexpected eval result for {src}: {v:?}"),
            }
        }
    }

    #[test]
    fn let_is_sequential_and_scoped() {
        assert_eq!(eval_ok("(let ((a 2) (b (* a 10))) (+ a b))"), Value::Integer(22));
        match run("(let ((a 1)) a) a").0 {
            Err(Error::Name(e)) => assert!(e.contains("a"), "{e}"),
            v => panic!("unexpected eval result: {v:?}"),
        }
    }

    #[test]
    fn conditionals() {
        assert_eq!(eval_ok("(if (< 1 2) \"yes\" \"no\")"), Value::text("yes"));
        assert_eq!(eval_ok("(if false 1)"), Value::Nil);
        match run("(if 1 2 3)").0 {
            Err(Error::Type(e)) => assert!(e.contains("expected a boolean"), "{e}"),
            v => panic!("unexpected eval result: {v:?}"),
        }
    }

    #[test]
    fn boolean_forms_short_circuit() {
        // The unbound name after the deciding argument is never evaluated.
        assert_eq!(eval_ok("(or false true nope)"), Value::Boolean(true));
        assert_eq!(eval_ok("(and true false nope)"), Value::Boolean(false));
        assert_eq!(eval_ok("(and)"), Value::Boolean(true));
        assert_eq!(eval_ok("(or)"), Value::Boolean(false));
        assert_eq!(eval_ok("(not false)"), Value::Boolean(true));
    }

    #[test]
    fn print_writes_line() {
        let (result, printed) = run("(print \"x =\" 1 true (fn (a b) a))");
        assert_eq!(result, Ok(Value::Nil));
        assert_eq!(printed, "x = 1 true <fn (a b)>\n");
    }

    #[test]
    fn output_before_error_remains() {
        let (result, printed) = run("(print \"first\") (print undefined_name) (print \"never\")");
        match result {
            Err(Error::Name(_)) => (),
            v => panic!("unexpected eval result: {v:?}"),
        }
        assert_eq!(printed, "first\n");
    }
}
