//! Tests for the standard library, and whole programs using it.
use std::cell::RefCell;
use std::rc::Rc;

use crate::data::Value;
use crate::error::Error;
use crate::session::Interpreter;

/// A new interpreter capturing its output.
fn interpreter() -> (Interpreter, Rc<RefCell<Vec<u8>>>) {
    let buf = Rc::new(RefCell::new(Vec::new()));
    let interp = Interpreter::with_output(buf.clone()).unwrap();
    (interp, buf)
}

fn eval(src: &str) -> Result<Value, Error> {
    let (interp, _) = interpreter();
    interp.run(src, &interp.session())
}

#[test]
fn library_procedures() -> Result<(), Error> {
    assert_eq!(eval("(inc 41)")?, Value::Integer(42));
    assert_eq!(eval("(dec 0)")?, Value::Integer(-1));
    assert_eq!(eval("(abs -7)")?, Value::Integer(7));
    assert_eq!(eval("(max 3 9)")?, Value::Integer(9));
    assert_eq!(eval("(min 3 9)")?, Value::Integer(3));
    assert_eq!(eval("(square (neg 4))")?, Value::Integer(16));
    assert_eq!(eval("(identity \"same\")")?, Value::text("same"));
    Ok(())
}

#[test]
fn mutual_recursion() -> Result<(), Error> {
    assert_eq!(eval("(even 10)")?, Value::Boolean(true));
    assert_eq!(eval("(odd 7)")?, Value::Boolean(true));
    assert_eq!(eval("(even -3)")?, Value::Boolean(false));
    Ok(())
}

#[test]
fn compose_returns_closure() -> Result<(), Error> {
    assert_eq!(eval("((compose inc square) 3)")?, Value::Integer(10));
    assert_eq!(
        eval("(def inc_then_square (compose square inc)) (inc_then_square 3)")?,
        Value::Integer(16)
    );
    Ok(())
}

#[test]
fn recursive_definition() -> Result<(), Error> {
    let got = eval(
        r#"
        (def fact (fn (n) (if (< n 2) 1 (* n (fact (dec n))))))
        (fact 10)
        "#,
    )?;
    assert_eq!(got, Value::Integer(3628800));
    Ok(())
}

#[test]
fn closure_outlives_let() -> Result<(), Error> {
    // `base` is only bound inside the let; the procedure still finds it later.
    let got = eval(
        r#"
        (def add_base (let ((base 100)) (fn (x) (+ x base))))
        (add_base 5)
        "#,
    )?;
    assert_eq!(got, Value::Integer(105));

    match eval("(def add_base (let ((base 100)) (fn (x) (+ x base)))) base") {
        Err(Error::Name(e)) => assert!(e.contains("base"), "{e}"),
        v => panic!("unexpected result: {v:?}"),
    }
    Ok(())
}

#[test]
fn closure_outlives_call() -> Result<(), Error> {
    let got = eval(
        r#"
        (def make_adder (fn (n) (fn (x) (+ x n))))
        (def add5 (make_adder 5))
        (def add7 (make_adder 7))
        (+ (add5 1) (add7 1))
        "#,
    )?;
    assert_eq!(got, Value::Integer(14));
    Ok(())
}

#[test]
fn scoping_is_lexical() -> Result<(), Error> {
    // `show` sees the session's y, not the y bound by its caller.
    let got = eval(
        r#"
        (def y "outer")
        (def show (fn () y))
        (def call_with_y (fn (y) (show)))
        (call_with_y "caller")
        "#,
    )?;
    assert_eq!(got, Value::text("outer"));
    Ok(())
}

#[test]
fn def_inside_procedure_is_local() {
    match eval("(def f (fn (x) (do (def hidden x) hidden))) (f 1) hidden") {
        Err(Error::Name(e)) => assert!(e.contains("hidden"), "{e}"),
        v => panic!("unexpected result: {v:?}"),
    }
}

#[test]
fn arity_errors_never_truncate_or_pad() {
    for src in ["(inc)", "(inc 1 2)", "(max 1)", "((fn (a b) a) 1 2 3)"] {
        match eval(src) {
            Err(Error::Arity(_)) => (),
            v => panic!("unexpected result for {src}: {v:?}"),
        }
    }
}

#[test]
fn unbound_name_has_no_side_effect() {
    let (interp, buf) = interpreter();
    let session = interp.session();
    match interp.run("(print undefined_name)", &session) {
        Err(Error::Name(e)) => assert!(e.contains("undefined_name"), "{e}"),
        v => panic!("unexpected result: {v:?}"),
    }
    assert!(buf.borrow().is_empty());
    assert!(session.is_empty());
}

#[test]
fn program_output() -> Result<(), Error> {
    let (interp, buf) = interpreter();
    interp.run(
        r#"
        ; greet everyone, comma separated
        (def greet (fn (name) (print "hello," name)))
        (greet "world"), (greet "\x41da")
        (print (+ 1 2) (< 1 2) "tab:\there")
        "#,
        &interp.session(),
    )?;
    let printed = String::from_utf8(buf.borrow().clone()).unwrap();
    assert_eq!(printed, "hello, world\nhello, Ada\n3 true tab:\there\n");
    Ok(())
}

#[test]
fn split_runs_share_session() -> Result<(), Error> {
    let (interp, _) = interpreter();
    let session = interp.session();
    interp.run("(def id (fn (x) x))", &session)?;
    assert_eq!(interp.run("(id 7)", &session)?, Value::Integer(7));
    Ok(())
}
