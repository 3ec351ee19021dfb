#[test]
fn store_module_ui() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/ui/store_module_duplicate.rs");
    t.compile_fail("tests/ui/store_module_signature.rs");
    t.compile_fail("tests/ui/store_module_borrowed_param.rs");
    t.compile_fail("tests/ui/store_module_misplaced_marker.rs");
}
