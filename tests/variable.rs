mod common;

#[test]
fn a_local_variable_cannot_collide_with_a_parameter_of_the_same_function() {
    let result = common::run("fun f(a) { var a = \"value\"; }");
    assert!(result.had_error);
}

#[test]
fn redeclaring_a_local_variable_in_the_same_scope_is_a_static_error() {
    let result = common::run("{ var a = \"first\"; var a = \"second\"; }");
    assert!(result.had_error);
}

#[test]
fn two_parameters_with_the_same_name_is_a_static_error() {
    let result = common::run("fun f(arg, arg) {}");
    assert!(result.had_error);
}

#[test]
fn a_function_body_resolves_against_the_scope_at_its_declaration_point() {
    common::assert_prints(
        r#"
        var a = "outer";
        {
            fun f() { print a; }
            f();
            var a = "inner";
            f();
        }
        "#,
        &["outer", "outer"],
    );
}

#[test]
fn a_variable_declared_in_the_middle_of_a_block_is_visible_for_the_rest_of_it() {
    common::assert_prints(
        r#"
        var a = "a";
        print a;
        var b = a + " b";
        print b;
        var c = a + " c";
        print c;
        var d = b + " d";
        print d;
        "#,
        &["a", "a b", "a c", "a b d"],
    );
}

#[test]
fn a_nested_block_sees_the_enclosing_scope_variable() {
    common::assert_prints(
        r#"
        var outer = "outer";
        {
            print outer;
        }
        "#,
        &["outer"],
    );
}

#[test]
fn a_local_declared_inside_a_method_body_is_visible_there() {
    common::assert_prints(
        r#"
        class Foo {
            method() {
                var local = "variable";
                print local;
            }
        }
        Foo().method();
        "#,
        &["variable"],
    );
}

#[test]
fn redeclaring_a_global_with_var_is_allowed() {
    common::assert_prints(
        r#"
        var a = "first";
        var a;
        print a;
        "#,
        &["nil"],
    );
}

#[test]
fn reassigning_a_global_with_var_replaces_its_value() {
    common::assert_prints(
        r#"
        var a = 1;
        var a = 2;
        print a;
        "#,
        &["2"],
    );
}

#[test]
fn separate_blocks_can_each_declare_their_own_variable_with_the_same_name() {
    common::assert_prints(
        r#"
        {
            var a = "first";
            print a;
        }
        {
            var a = "second";
            print a;
        }
        "#,
        &["first", "second"],
    );
}

#[test]
fn a_local_can_shadow_an_outer_local_in_a_nested_block() {
    common::assert_prints(
        r#"
        var a = "outer";
        {
            print a;
            var a = "inner";
            print a;
        }
        "#,
        &["outer", "inner"],
    );
}

#[test]
fn a_local_can_shadow_a_global_with_the_same_name() {
    common::assert_prints(
        r#"
        var a = "global";
        {
            var a = "shadow";
            print a;
        }
        print a;
        "#,
        &["shadow", "global"],
    );
}

#[test]
fn a_local_can_shadow_another_local_in_an_enclosing_block() {
    common::assert_prints(
        r#"
        {
            var a = "local";
            {
                var a = "shadow";
                print a;
            }
            print a;
        }
        "#,
        &["shadow", "local"],
    );
}

#[test]
fn reading_an_undefined_global_variable_is_a_runtime_error() {
    let result = common::run("print notDefined;");
    assert!(result.had_runtime_error);
}

#[test]
fn reading_an_undefined_local_variable_is_a_runtime_error() {
    let result = common::run("{ print notDefined; }");
    assert!(result.had_runtime_error);
}

#[test]
fn an_uninitialized_variable_declaration_defaults_to_nil() {
    common::assert_prints("var a; print a;", &["nil"]);
}

#[test]
fn an_undefined_variable_in_unreachable_code_is_never_evaluated() {
    common::assert_prints(
        r#"
        if (false) { print notDefined; }
        print "ok";
        "#,
        &["ok"],
    );
}

#[test]
fn false_cannot_be_used_as_a_variable_name() {
    let result = common::run("var false = 1;");
    assert!(result.had_error);
}

#[test]
fn a_variable_initializer_may_reference_an_already_defined_global_of_the_same_name() {
    common::assert_prints(
        r#"
        var a = "value";
        var a = a;
        print a;
        "#,
        &["value"],
    );
}

#[test]
fn a_local_initializer_cannot_reference_its_own_not_yet_defined_name() {
    let result = common::run("{ var a = \"outer\"; { var a = a; } }");
    assert!(result.had_error);
}

#[test]
fn nil_cannot_be_used_as_a_variable_name() {
    let result = common::run("var nil = 1;");
    assert!(result.had_error);
}

#[test]
fn this_cannot_be_used_as_a_variable_name() {
    let result = common::run("var this = 1;");
    assert!(result.had_error);
}
