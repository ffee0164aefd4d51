use micalint::analyze_source;

#[test]
fn syntax_error_stops_analysis() {
    let err = analyze_source("func f( {\n}\n").unwrap_err();
    assert!(err.to_string().contains("syntax error"));
}

#[test]
fn unexpected_character_is_a_syntax_error() {
    let err = analyze_source("func f() {\n\t@\n}\n").unwrap_err();
    assert!(err.to_string().contains("unexpected character"));
}

#[test]
fn unknown_parameter_type_is_reported() {
    let err = analyze_source("func f(x Zap) {\n}\n").unwrap_err();
    assert!(err.to_string().contains("unknown type Zap"));
}

#[test]
fn undefined_identifier_is_reported() {
    let err = analyze_source("func f() {\n\tprint(q)\n}\n").unwrap_err();
    assert!(err.to_string().contains("undefined: q"));
}

#[test]
fn recursive_interface_is_reported() {
    let src = "type A interface {\n\tB\n}\ntype B interface {\n\tA\n}\n";
    let err = analyze_source(src).unwrap_err();
    assert!(err.to_string().contains("invalid recursive type"));
}

#[test]
fn duplicate_declaration_is_reported() {
    let err = analyze_source("type A int\ntype A bool\n").unwrap_err();
    assert!(err.to_string().contains("redeclared"));
}

#[test]
fn calling_a_variable_is_reported() {
    let err = analyze_source("func f(x int) {\n\tx()\n}\n").unwrap_err();
    assert!(err.to_string().contains("cannot call non-function"));
}

#[test]
fn clean_file_yields_no_findings() {
    let src = "type Router interface {\n\tuse(h int)\n}\nfunc serve(r Router) {\n\tr.use(1)\n}\n";
    assert!(analyze_source(src).unwrap().is_empty());
}
