//! Diagnostic tests: codes, locations and the serialized shape.

use rstest::rstest;
use serde_json::json;
use trialdsl::{DefType, DiagnosticKind, Scope};

use crate::helpers::diagnostic_helpers::{codes, compile, not_found};
use crate::helpers::source_fixtures::*;

#[test]
fn test_study_singleton() {
    let compiler = compile(&[]);
    let diagnostics = compiler.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].scope, Scope::Global);
    assert_eq!(diagnostics[0].loc, None);
    assert_eq!(diagnostics[0].file, None);

    let compiler = compile(&[("a", STUDY), ("b", r#"study { id: "OTHER", name: "Other" }"#)]);
    assert!(compiler.diagnostics().is_empty());
    assert_eq!(compiler.result().study.unwrap().id.as_deref(), Some("CDISC01"));

    let compiler = compile(&[("a", "\n\nstudy {}")]);
    let diagnostics = compiler.diagnostics();
    let names: Vec<_> = diagnostics
        .iter()
        .map(|d| match &d.kind {
            DiagnosticKind::MissingAttribute { name } => name.as_str(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(names, ["id", "name"]);
    assert!(diagnostics.iter().all(|d| d.loc.unwrap().line == 3));
}

#[rstest]
#[case(r#"study { id: "S", name: "N", phase: "II" }"#, "extra_attribute")]
#[case(r#"study { id: "S", id: "T", name: "N" }"#, "duplicate_attribute")]
#[case(r#"study { id: 1, name: "N" }"#, "invalid_type")]
#[case(r#"study { id: "S", name: "N" } milestone M { at: "d0" }"#, "invalid_type")]
#[case(r#"study { id: "S", name: "N" } milestone M { at: t"d0 ->" }"#, "invalid_type")]
#[case(r#"study { id: "S", name: "N" } milestone M { at: t"d0", at: t"d1" }"#, "duplicate_attribute")]
#[case(r#"study { id: "S", name: "N" } codelist C { "X" }"#, "missing_directive")]
#[case(r#"study { id: "S", name: "N" } codelist C { "X" @desc("x") @label("x") }"#, "unexpected_directive")]
#[case(r#"study { id: "S", name: "N" } interface I { A: String @label("a") }"#, "missing_directive")]
#[case(r#"study { id: "S", name: "N" } interface I { A: String @label("a", "b") @desc("a") }"#, "incorrect_number_of_args")]
#[case(r#"study { id: "S", name: "N" } interface I { A: String @label("a") @desc("a") @sequence @subject.id }"#, "unexpected_directive")]
#[case(r#"study { id: "S", name: "N" } milestone M { at: t"d0" } milestone M { at: t"d1" }"#, "duplicate_definition")]
fn test_single_local_diagnostic(#[case] source: &str, #[case] code: &str) {
    let compiler = compile(&[("file", source)]);
    assert_eq!(codes(&compiler), [code]);
    assert_eq!(compiler.diagnostics()[0].scope, Scope::Local);
}

#[test]
fn test_milestone_shape_errors_name_actual_type() {
    let compiler = compile(&[("a", STUDY), ("b", r#"milestone M { at: t"d0 -> d3" }"#)]);
    let diagnostics = compiler.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].kind,
        DiagnosticKind::invalid_type("time_range", "study_day|relative")
    );
    assert!(compiler.result().milestones.is_empty());
}

#[test]
fn test_unresolved_relative_milestone_is_kept() {
    let compiler = compile(&[("a", STUDY), ("b", r#"milestone V1 { at: t"> NOPE" }"#)]);
    assert_eq!(not_found(&compiler, DefType::Milestone, "NOPE").len(), 1);
    assert!(compiler.result().milestones.contains_key("V1"));
}

#[test]
fn test_parse_failure_message_points_at_token() {
    let compiler = compile(&[("a", STUDY), ("broken", "study {\n  id \"S1\"\n}")]);
    let diagnostics = compiler.diagnostics();
    assert_eq!(codes(&compiler), ["parse_failure"]);
    let loc = diagnostics[0].loc.unwrap();
    assert_eq!((loc.line, loc.col, loc.end_col), (2, 6, 10));
    let lines: Vec<_> = diagnostics[0].message.lines().collect();
    assert_eq!(lines[1], "  id \"S1\"");
    assert_eq!(lines[2], "     ^");
}

#[test]
fn test_parse_failure_caret_after_multibyte_text() {
    let source = "study {\n  name: \"Études\" id \"S1\"\n}";
    let compiler = compile(&[("a", STUDY), ("broken", source)]);
    let diagnostics = compiler.diagnostics();
    assert_eq!(codes(&compiler), ["parse_failure"]);
    let loc = diagnostics[0].loc.unwrap();
    assert_eq!((loc.line, loc.col, loc.end_col), (2, 22, 26));
    let lines: Vec<_> = diagnostics[0].message.lines().collect();
    assert_eq!(lines[2], format!("{}^", " ".repeat(20)));
    assert_eq!(lines[1].chars().nth(20), Some('"'));
}

#[test]
fn test_not_found_serialized_shape() {
    let compiler = compile(&[
        ("a", STUDY),
        ("b", r#"domain "DM" @abbr("DM") { dataset DM @milestone(t"BAR") {} }"#),
    ]);
    let diagnostics = not_found(&compiler, DefType::Milestone, "BAR");
    let value = serde_json::to_value(&diagnostics[0]).unwrap();
    assert_eq!(value["code"], "not_found");
    assert_eq!(value["scope"], "local");
    assert_eq!(value["file"], "b");
    assert_eq!(value["defType"], "milestone");
    assert_eq!(value["name"], "BAR");
    assert_eq!(value["suggestion"], "milestone BAR { at: t\"d0\" }");
    assert_eq!(value["loc"]["line"], 1);
    assert!(value["loc"].get("endCol").is_some());
}

#[test]
fn test_global_serialized_shape() {
    let diagnostics = compile(&[]).diagnostics();
    let value = serde_json::to_value(&diagnostics[0]).unwrap();
    assert_eq!(
        value,
        json!({
            "scope": "global",
            "file": null,
            "loc": null,
            "message": "no study definition found",
            "code": "missing_study_def",
        })
    );
}

#[test]
fn test_diagnostics_feed_order() {
    let compiler = compile(&[
        ("b", r#"interface I { A: Nope @label("a") @desc("a") }"#),
        ("a", r#"interface J { A: Nope @label("a") @desc("a") }"#),
    ]);
    let feed: Vec<_> = compiler
        .diagnostics()
        .iter()
        .map(|d| (d.file.as_ref().map(|f| f.as_str().to_string()), d.code()))
        .collect();
    assert_eq!(feed, [
        (None, "missing_study_def"),
        (Some("a".to_string()), "not_found"),
        (Some("b".to_string()), "not_found"),
    ]);
}
