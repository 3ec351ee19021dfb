#[test]
fn storemod_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/storemod_error_pass.rs");
    t.pass("tests/ui/storemod_error_context.rs");
    t.compile_fail("tests/ui/storemod_error_no_context.rs");
    t.compile_fail("tests/ui/storemod_error_bad_context_type.rs");
}
