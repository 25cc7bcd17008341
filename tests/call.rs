mod common;

#[test]
fn calling_a_boolean_is_a_runtime_error() {
    let result = common::run("true();");
    assert!(result.had_runtime_error);
}

#[test]
fn calling_nil_is_a_runtime_error() {
    let result = common::run("nil();");
    assert!(result.had_runtime_error);
}

#[test]
fn calling_a_number_is_a_runtime_error() {
    let result = common::run("123();");
    assert!(result.had_runtime_error);
}

#[test]
fn calling_a_string_is_a_runtime_error() {
    let result = common::run("\"str\"();");
    assert!(result.had_runtime_error);
}

#[test]
fn calling_an_instance_is_a_runtime_error() {
    let result = common::run("class Foo {} var foo = Foo(); foo();");
    assert!(result.had_runtime_error);
}

#[test]
fn calling_with_the_wrong_number_of_arguments_is_a_runtime_error() {
    let result = common::run("fun f(a, b) { return a + b; } f(1);");
    assert!(result.had_runtime_error);
}

#[test]
fn arguments_evaluate_left_to_right_before_the_call() {
    common::assert_prints(
        r#"
        fun pair(a, b) { print a; print b; }
        pair(1, 2);
        "#,
        &["1", "2"],
    );
}
