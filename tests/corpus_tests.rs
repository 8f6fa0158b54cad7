// Regression corpus: each program checks itself with ASSERT and prints OK

use std::fs;
use std::path::Path;
use subc::compile::run_source;

fn run_corpus(name: &str) {
    let path = Path::new("tests/corpus").join(name);
    let source = fs::read_to_string(&path).expect("Failed to read corpus file");

    let (status, output) = match run_source(&source) {
        Ok(result) => result,
        Err(e) => panic!("{} failed: {}", name, e),
    };

    assert_eq!(status, 0, "{} returned non-zero", name);
    assert_eq!(output, "OK\n", "{} output", name);
}

#[test]
fn test_arith_corpus() {
    run_corpus("arith.c");
}

#[test]
fn test_control_corpus() {
    run_corpus("control.c");
}

#[test]
fn test_pointer_corpus() {
    run_corpus("pointer.c");
}

#[test]
fn test_struct_corpus() {
    run_corpus("struct.c");
}

#[test]
fn test_variable_corpus() {
    run_corpus("variable.c");
}

#[test]
fn test_corpus_functions_callable_individually() {
    let source = fs::read_to_string("tests/corpus/pointer.c").unwrap();
    let mut interpreter = subc::compile::load(&source).unwrap();

    let expected = [(1, 3), (3, 5), (7, 7), (9, 5), (17, 1), (21, 5), (26, 5), (32, 5)];
    for (n, value) in expected {
        let name = format!("t{}", n);
        let result = interpreter.call(&name, &[]).unwrap();
        assert_eq!(result.as_int(), Some(value), "{}", name);
    }
    assert!(interpreter.console().is_empty());
}
