use std::path::Path;

use micalint::{analyze_file, analyze_source};

fn suggestions(src: &str) -> Vec<String> {
    analyze_source(src)
        .unwrap()
        .into_iter()
        .map(|d| d.suggestion)
        .collect()
}

const ROUTER: &str = "type Router interface {\n\tuse(h int)\n\tgroup(f func(Router))\n}\n";

#[test]
fn outer_router_reference_is_flagged() {
    let src = format!(
        "{ROUTER}\nfunc serve(r1 Router) {{\n\tr1.group(func(r2 Router) {{\n\t\tr1.use(0)\n\t}})\n}}\n"
    );
    assert_eq!(suggestions(&src), vec!["r2"]);
}

#[test]
fn using_the_closure_parameter_is_clean() {
    let src = format!(
        "{ROUTER}\nfunc serve(r1 Router) {{\n\tr1.group(func(r2 Router) {{\n\t\tr2.use(0)\n\t}})\n}}\n"
    );
    assert!(suggestions(&src).is_empty());
}

#[test]
fn identical_names_cannot_be_confused() {
    let src = format!(
        "{ROUTER}\nfunc serve(r Router) {{\n\tr.group(func(r Router) {{\n\t\tr.use(0)\n\t}})\n}}\n"
    );
    assert!(suggestions(&src).is_empty());
}

#[test]
fn narrower_interface_outer_is_flagged_against_wider_param() {
    let src = "\
type DB interface {
	query(x int) bool
}

type TX interface {
	DB
	commit(s string)
}

extern func run(f func(TX))

func work(db DB) {
	run(func(tx TX) {
		db.query(1)
	})
}
";
    assert_eq!(suggestions(src), vec!["tx"]);
}

#[test]
fn wider_interface_outer_is_not_similar_to_narrower_param() {
    let src = "\
type DB interface {
	query(x int) bool
}

type TX interface {
	DB
	commit(s string)
}

extern func run(f func(DB))
extern func keep(tx TX)

func work(tx TX) {
	run(func(db DB) {
		keep(tx)
	})
}
";
    assert!(suggestions(src).is_empty());
}

#[test]
fn pointer_outer_matches_pointer_param() {
    let src = "\
type T struct {
	n int
}

extern func apply(f func(*T))
extern func use(t *T)

func touch(t1 *T) {
	apply(func(t2 *T) {
		use(t1)
	})
}
";
    assert_eq!(suggestions(src), vec!["t2"]);
}

#[test]
fn pointer_outer_does_not_match_value_param() {
    let src = "\
type T struct {
	n int
}

extern func applyv(f func(T))
extern func use(t *T)

func touch(t1 *T) {
	applyv(func(t2 T) {
		use(t1)
	})
}
";
    assert!(suggestions(src).is_empty());
}

#[test]
fn empty_interface_param_never_matches() {
    let src = "\
extern func each(f func(interface {}))
extern func log(s string)

func emit(s string) {
	each(func(e interface {}) {
		log(s)
	})
}
";
    assert!(suggestions(src).is_empty());
}

#[test]
fn empty_interface_outer_never_matches_either() {
    let src = "\
extern func each(f func(interface {}))
extern func log(v interface {})

func emit(v interface {}) {
	each(func(e interface {}) {
		log(v)
	})
}
";
    assert!(suggestions(src).is_empty());
}

#[test]
fn basic_typed_params_never_match() {
    let src = "\
extern func times(f func(int))

func count(n1 int) {
	times(func(n2 int) {
		print(n1)
	})
}
";
    assert!(suggestions(src).is_empty());
}

#[test]
fn named_structs_with_equal_shape_match() {
    let src = "\
type A struct {
	n int
}

type B struct {
	n int
}

extern func apply(f func(B))
extern func use(a A)

func mix(a A) {
	apply(func(b B) {
		use(a)
	})
}
";
    assert_eq!(suggestions(src), vec!["b"]);
}

#[test]
fn nested_closures_accumulate_relations() {
    let src = format!(
        "{ROUTER}\nfunc serve(r1 Router) {{\n\tr1.group(func(r2 Router) {{\n\t\tr2.group(func(r3 Router) {{\n\t\t\tr1.use(0)\n\t\t\tr2.use(1)\n\t\t}})\n\t}})\n}}\n"
    );
    assert_eq!(suggestions(&src), vec!["r2", "r3", "r3"]);
}

#[test]
fn sibling_closures_do_not_leak_relations() {
    let src = format!(
        "{ROUTER}\nfunc serve(r Router) {{\n\tr.group(func(a Router) {{\n\t\tr.use(0)\n\t}})\n\tr.group(func(b Router) {{\n\t\tr.use(1)\n\t}})\n}}\n"
    );
    assert_eq!(suggestions(&src), vec!["a", "b"]);
}

#[test]
fn findings_are_deterministic() {
    let src = format!(
        "{ROUTER}\nfunc serve(r1 Router) {{\n\tr1.group(func(r2 Router) {{\n\t\tr1.use(0)\n\t\tr1.use(1)\n\t}})\n}}\n"
    );
    let first = analyze_source(&src).unwrap();
    let second = analyze_source(&src).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn testdata_shadow_file_reports_position() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/shadow.mica");
    let reports = analyze_file(&path).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].line, 8);
    assert_eq!(reports[0].col, 3);
    assert_eq!(reports[0].suggestion, "r2");
}

#[test]
fn testdata_clean_file_is_clean() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/clean.mica");
    assert!(analyze_file(&path).unwrap().is_empty());
}
