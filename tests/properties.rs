// Behavior guarantees of the weaving passes, driven through the public API.

use native_weaver::annotations::{self, AnnotatedFragment};
use native_weaver::document::{Document, FunctionKind, GeneratedFunction};
use native_weaver::passes::{self, OffloadOutcome};
use native_weaver::Conventions;

fn script(body: &str) -> String {
    format!(
        "GenericValue& gml_Script_p( CInstance* pSelf, CInstance* pOther, GenericValue& _result, int _count,  GenericValue** _args  )\n{{{}}}\n",
        body
    )
}

fn script_doc(body: &str) -> Document {
    let f = GeneratedFunction::new("gml_Script_p", FunctionKind::ScriptCall);
    Document::parse(&script(body), f, &Conventions::default()).expect("signature present")
}

fn frag(source_line: usize, code: &str) -> AnnotatedFragment {
    AnnotatedFragment {
        source_line,
        code: code.to_string(),
    }
}

#[test]
fn test_fragment_between_markers_joins_lower_one() {
    let conv = Conventions::default();
    let mut doc = script_doc("\nMARK(10);\nten();\nMARK(20);\ntwenty();\nreturn _result;\n");
    passes::weave(&mut doc, &[frag(15, "fifteen();")], &conv).unwrap();
    assert_eq!(
        doc.body(),
        "\nMARK(10);\nten();\nfifteen();\nMARK(20);\ntwenty();\nreturn _result;\n"
    );
}

#[test]
fn test_fragment_before_first_marker_goes_before_return() {
    let conv = Conventions::default();
    let mut doc = script_doc("\nMARK(5);\nfive();\nreturn _result;\n");
    passes::weave(&mut doc, &[frag(1, "one();")], &conv).unwrap();
    assert_eq!(doc.body(), "\nMARK(5);\nfive();\none();\nreturn _result;\n");
}

#[test]
fn test_overwrite_discards_generated_statements() {
    let conv = Conventions::default();
    let f = GeneratedFunction::new("gml_Object_o_Step_0", FunctionKind::EventHandler);
    let text = "void gml_Object_o_Step_0( CInstance* pSelf, CInstance* pOther )\n{\nMARK(1);\nold();\n}\n";
    let mut doc = Document::parse(text, f, &conv).unwrap();

    let source = "/*cpp -overwrite\nfoo();\n*/\nx = 1;\n/*cpp bar(); */\n";
    let ann = annotations::scan(source, &conv).unwrap();
    passes::weave(&mut doc, &ann.fragments, &conv).unwrap();
    assert_eq!(doc.body().trim(), "foo();\nbar();");
}

#[test]
fn test_static_const_request_folds_initializer() {
    let conv = Conventions::default();
    let mut doc = script_doc("GenericValue local_count; local_count = 3 + 4;");
    let requests = annotations::scan_declarations("static const int_t count = 3 + 4;");
    let report = passes::specialize(&mut doc, &requests, &conv);
    assert_eq!(report.applied, vec!["count"]);
    assert_eq!(doc.body(), "static const int local_count = 3 + 4;");
}

#[test]
fn test_each_reference_gets_its_own_temporary() {
    let conv = Conventions::default();
    let mut doc = script_doc(
        "\nGenericValue local_v;\na(&/* local */local_v);\nb(&/* local */local_v);\nreturn _result;\n",
    );
    let requests = annotations::scan_declarations("double_t v = 0;");
    let report = passes::specialize(&mut doc, &requests, &conv);
    assert_eq!(report.temporaries, 2);
    assert_eq!(
        doc.body(),
        "\ndouble local_v;\nGenericValue __ref0__(local_v);\na(&__ref0__);\nGenericValue __ref1__(local_v);\nb(&__ref1__);\nreturn _result;\n"
    );
}

#[test]
fn test_bool_wrapper_only_unwrapped_for_bool() {
    let conv = Conventions::default();
    let body = "\nGenericValue local_x;\nGenericValue local_n;\nif (BOOL_WRAP(local_x)) go();\nif (BOOL_WRAP(local_n)) go();\n";
    let mut doc = script_doc(body);
    let requests = annotations::scan_declarations("bool_t x = true;\nint_t n = 2;");
    passes::specialize(&mut doc, &requests, &conv);
    assert!(doc.body().contains("if (local_x) go();"));
    assert!(doc.body().contains("if (BOOL_WRAP(local_n)) go();"));
}

#[test]
fn test_unknown_declaration_is_not_an_error() {
    let conv = Conventions::default();
    let body = "\nMARK(1);\nreturn _result;\n";
    let mut doc = script_doc(body);
    let requests = annotations::scan_declarations("int_t optimized_away = 1;");
    let report = passes::specialize(&mut doc, &requests, &conv);
    assert_eq!(report.not_applied, vec!["optimized_away"]);
    assert_eq!(doc.body(), body);
}

#[test]
fn test_async_without_directive_is_byte_identical() {
    let conv = Conventions::default();
    let text = script("\nMARK(1);\nwork();\nreturn _result;\n");
    let ann = annotations::scan("work();\n", &conv).unwrap();
    let mut doc = script_doc("\nMARK(1);\nwork();\nreturn _result;\n");
    assert_eq!(
        passes::offload(&mut doc, ann.run_async, &conv),
        OffloadOutcome::NotRequested
    );
    assert_eq!(doc.render(), text);
}

#[test]
fn test_async_twice_equals_async_once() {
    let conv = Conventions::default();
    let f = GeneratedFunction::new("gml_Script_p", FunctionKind::ScriptCall);

    let mut doc = script_doc("\nMARK(1);\nwork();\nreturn _result;\n");
    passes::offload(&mut doc, true, &conv);
    let once = doc.render();

    let mut again = Document::parse(&once, f, &conv).unwrap();
    assert_eq!(
        passes::offload(&mut again, true, &conv),
        OffloadOutcome::AlreadyTransformed
    );
    assert_eq!(again.render(), once);
}
