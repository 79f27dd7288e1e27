//! Parsing tests over the public `parse_file` entry point.

use rstest::rstest;
use trialdsl::parse_file;
use trialdsl::parser::{AstNode, Item};

use crate::helpers::diagnostic_helpers::{assert_no_diagnostics, compile};
use crate::helpers::source_fixtures::*;

#[rstest]
#[case(STUDY, 1)]
#[case(MILESTONES, 2)]
#[case(SEX_CODELIST, 1)]
#[case(TIMING_INTERFACE, 1)]
#[case(VITALS_DOMAIN, 1)]
#[case(VITALS_MAPPING, 1)]
fn test_fixtures_parse(#[case] source: &str, #[case] items: usize) {
    let file = parse_file(source).unwrap();
    assert_eq!(file.source_file().items().count(), items);
}

#[test]
fn test_comments_are_trivia() {
    let source = "// header\nstudy { /* inline */ id: \"S\", name: \"N\" }\n";
    let file = parse_file(source).unwrap();
    let item = file.source_file().items().next().unwrap();
    assert!(matches!(item, Item::Study(_)));
    assert_eq!(file.location(item.range()).line, 2);
}

#[rstest]
#[case("/* header */\n")]
#[case("/**/\n")]
#[case("/**\n * Study header\n **/\n")]
fn test_block_comment_header_compiles_cleanly(#[case] header: &str) {
    let source = format!("{header}{STUDY}");
    assert!(parse_file(&source).is_ok());
    assert_no_diagnostics(&compile(&[("study.trial", &source)]));
}

#[test]
fn test_dataset_header_shape() {
    let file = parse_file(VITALS_DOMAIN).unwrap();
    let Some(Item::Domain(domain)) = file.source_file().items().next() else {
        panic!("expected a domain");
    };
    assert_eq!(domain.name().unwrap().text(), "Vital Signs");
    let dataset = domain.datasets().next().unwrap();
    let implements: Vec<_> = dataset.implements().iter().map(|n| n.text()).collect();
    assert_eq!(implements, ["Timing"]);
    let directives: Vec<_> = dataset.directives().map(|d| d.name()).collect();
    assert_eq!(directives, ["milestone"]);
    assert_eq!(dataset.columns().count(), 2);
}

#[test]
fn test_raw_code_spans_lines() {
    let source = "map dataset VS {\n  VSORRES: sql(\"raw\") `select *\nfrom vitals`\n}";
    let file = parse_file(source).unwrap();
    let Some(Item::Mapping(mapping)) = file.source_file().items().next() else {
        panic!("expected a mapping");
    };
    let column = mapping.column_mappings().next().unwrap();
    assert_eq!(column.source().as_deref(), Some("raw"));
    assert_eq!(column.code().as_deref(), Some("select *\nfrom vitals"));
}

#[test]
fn test_first_error_is_reported() {
    let err = parse_file("study { id: \"S\" }\nmilestone { at: t\"d0\" }").unwrap_err();
    assert_eq!((err.line, err.col), (2, 11));
    assert_eq!(err.token, "{");
    assert!(err.to_string().starts_with("2:11: "));
}

#[test]
fn test_error_at_end_of_input_has_empty_token() {
    let err = parse_file("interface Timing {").unwrap_err();
    assert_eq!(err.token, "");
    assert_eq!(err.line, 1);
}
