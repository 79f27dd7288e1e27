//! Incremental update tests for `Compiler::update_files`.

use rstest::rstest;
use trialdsl::hir::model::DatasetMilestone;
use trialdsl::{Compiler, CompilerOptions, DefType};

use crate::helpers::diagnostic_helpers::{assert_no_diagnostics, codes, compile, not_found};
use crate::helpers::source_fixtures::*;

/// Apply `batches` of indices into `files`, one `update_files` call each.
fn compile_in_batches(files: &[(&str, &str)], batches: &[Vec<usize>]) -> Compiler {
    let mut compiler = Compiler::new(CompilerOptions::default());
    for batch in batches {
        compiler.update_files(batch.iter().map(|&i| (files[i].0, Some(files[i].1))));
    }
    compiler
}

#[rstest]
#[case(vec![vec![0, 1, 2, 3, 4, 5, 6]])]
#[case(vec![vec![6, 5, 4, 3, 2, 1, 0]])]
#[case(vec![vec![0], vec![1], vec![2], vec![3], vec![4], vec![5], vec![6]])]
#[case(vec![vec![6], vec![5], vec![4], vec![3], vec![2], vec![1], vec![0]])]
#[case(vec![vec![4, 6], vec![0, 1, 2], vec![3, 5]])]
fn test_order_independence(#[case] batches: Vec<Vec<usize>>) {
    let files = project();
    let reference = compile(&files);
    let compiler = compile_in_batches(&files, &batches);
    assert_eq!(compiler.result(), reference.result());
    assert_eq!(compiler.diagnostics(), reference.diagnostics());
    assert_no_diagnostics(&compiler);
}

#[test]
fn test_stale_on_failure() {
    let mut compiler = compile(&project());
    let before = compiler.result();

    compiler.update_files([("vitals.trial", Some("domain \"Vital Signs\" @abbr(\"VS\") {"))]);
    assert_eq!(codes(&compiler), ["parse_failure"]);
    assert_eq!(compiler.result(), before);
    assert_eq!(compiler.result().dataset("VS").unwrap().mappings.len(), 4);

    compiler.update_files([("vitals.trial", Some(VITALS_DOMAIN))]);
    assert_no_diagnostics(&compiler);
}

#[test]
fn test_parse_failure_before_any_success_contributes_nothing() {
    let compiler = compile(&[("a", STUDY), ("b", "milestone A {")]);
    assert_eq!(codes(&compiler), ["parse_failure"]);
    assert!(compiler.result().milestones.is_empty());
}

#[test]
fn test_self_healing_forward_reference() {
    let mut compiler = compile(&[
        ("study", STUDY),
        ("lab", r#"domain "Laboratory" @abbr("LB") { dataset LB @milestone(t"BAR") {} }"#),
    ]);
    assert_eq!(not_found(&compiler, DefType::Milestone, "BAR").len(), 1);

    compiler.update_files([("bar", Some(r#"milestone BAR { at: t"d0" }"#))]);
    assert!(not_found(&compiler, DefType::Milestone, "BAR").is_empty());
    assert_no_diagnostics(&compiler);
    assert_eq!(compiler.result().dataset("LB").unwrap().milestones, vec![
        DatasetMilestone {
            name: Some("BAR".into()),
            day: Some(0),
            hour: None,
        }
    ]);
}

#[test]
fn test_forward_chain_across_files_settles() {
    let compiler = compile(&[
        ("a", r#"milestone V3 { at: t"> V2" }"#),
        ("b", r#"milestone V2 { at: t"> V1" }"#),
        ("c", r#"milestone V1 { at: t"> BASE" }"#),
        ("d", r#"milestone BASE { at: t"d0" }"#),
        ("e", STUDY),
    ]);
    assert_no_diagnostics(&compiler);
    assert_eq!(compiler.result().milestones.len(), 4);
}

#[test]
fn test_healing_keeps_first_definition_in_file_order() {
    let compiler = compile(&[
        (
            "a",
            r#"
            study { id: "A", name: "First" }
            milestone V2 { at: t"> V1" }
            milestone M { at: t"d0" }
            domain "Findings" @abbr("FA") { dataset FA {} }
            "#,
        ),
        (
            "b",
            r#"
            study { id: "B", name: "Second" }
            milestone V1 { at: t"d0" }
            milestone M { at: t"d1" }
            domain "Findings" @abbr("FB") { dataset FB {} }
            "#,
        ),
    ]);
    let result = compiler.result();
    assert_eq!(result.study.as_ref().and_then(|s| s.id.as_deref()), Some("A"));
    assert_eq!(result.domains["Findings"].abbr.as_deref(), Some("FA"));
    assert_eq!(result.domains["Findings"].datasets.keys().collect::<Vec<_>>(), ["FA", "FB"]);
    assert_eq!(result.milestones.keys().collect::<Vec<_>>(), ["V2", "M", "V1"]);
    assert_eq!(result.milestones["M"].fixed_day().map(|(day, _)| day), Some(0));

    let feed: Vec<_> = compiler
        .diagnostics()
        .iter()
        .map(|d| (d.file.as_ref().map(|f| f.as_str().to_string()), d.code()))
        .collect();
    assert_eq!(feed, [(Some("b".to_string()), "duplicate_definition")]);
}

#[test]
fn test_healing_matches_a_single_ordered_build() {
    let files = [
        ("a", r#"study { id: "A", name: "First" } milestone V2 { at: t"> V1" }"#),
        ("b", r#"study { id: "B", name: "Second" } milestone V1 { at: t"d0" }"#),
    ];
    let healed = compile(&files);
    let staged = compile_in_batches(&files, &[vec![1], vec![0]]);
    assert_eq!(healed.result(), staged.result());
    assert_eq!(healed.diagnostics(), staged.diagnostics());
    assert_no_diagnostics(&healed);
}

#[test]
fn test_idempotence() {
    let mut compiler = compile(&project());
    let result = compiler.result();
    let diagnostics = compiler.diagnostics();

    compiler.update_files(Vec::<(&str, Option<&str>)>::new());
    assert_eq!(compiler.result(), result);
    assert_eq!(compiler.diagnostics(), diagnostics);

    let mut broken = compile(&[("a", r#"interface I { A: Nope }"#)]);
    let diagnostics = broken.diagnostics();
    broken.update_files(Vec::<(&str, Option<&str>)>::new());
    assert_eq!(broken.diagnostics(), diagnostics);
}

#[test]
fn test_deleting_a_file_removes_its_contribution() {
    let mut compiler = compile(&project());
    compiler.update_files([("mappings.trial", None::<&str>)]);
    assert_no_diagnostics(&compiler);
    assert!(compiler.result().dataset("VS").unwrap().mappings.is_empty());

    compiler.update_files([("study.trial", None::<&str>)]);
    assert_eq!(codes(&compiler), ["missing_study_def"]);
    assert!(compiler.result().study.is_none());
}

#[test]
fn test_deleting_a_dependency_reports_not_found() {
    let mut compiler = compile(&project());
    compiler.update_files([("interfaces.trial", None::<&str>)]);
    assert_eq!(not_found(&compiler, DefType::Interface, "Timing").len(), 1);
    let result = compiler.result();
    let vs = result.dataset("VS").unwrap();
    assert!(vs.column("VISIT").is_none());
}

#[test]
fn test_replacing_a_file_replaces_its_definitions() {
    let mut compiler = compile(&[("study", STUDY), ("time", MILESTONES)]);
    compiler.update_files([("time", Some(r#"milestone C { at: t"d14" }"#))]);
    let milestones = compiler.result().milestones;
    assert_eq!(milestones.keys().collect::<Vec<_>>(), ["C"]);
}
