//! Code completion tests against a compiled project.
//!
//! The document being edited is usually incomplete, so it is passed to
//! `completion_items` directly rather than compiled.

use trialdsl::keywords::{COLUMN_DIRECTIVES, DATASET_DIRECTIVES, ITEM_KEYWORDS};
use trialdsl::{Compiler, CompletionKind};

use crate::helpers::diagnostic_helpers::compile;
use crate::helpers::source_fixtures::project;

/// Complete at the position marked by `$` in `marked`.
fn complete(compiler: &Compiler, marked: &str) -> Vec<String> {
    let cursor = marked.find('$').unwrap();
    let before = &marked[..cursor];
    let line = before.matches('\n').count() as u32 + 1;
    let col = (cursor - before.rfind('\n').map_or(0, |i| i + 1)) as u32 + 1;
    let source = marked.replace('$', "");
    compiler
        .completion_items(line, col, &source)
        .iter()
        .map(|item| item.label.to_string())
        .collect()
}

#[test]
fn test_top_level_keywords() {
    let compiler = compile(&project());
    assert_eq!(complete(&compiler, "$"), ITEM_KEYWORDS);
    assert_eq!(complete(&compiler, "study { id: \"S\" }\n\ndo$"), ITEM_KEYWORDS);
}

#[test]
fn test_map_header() {
    let compiler = compile(&project());
    assert_eq!(complete(&compiler, "map $"), ["dataset"]);
    assert_eq!(complete(&compiler, "map dataset $"), ["DM", "VS"]);
    assert_eq!(complete(&compiler, "map dataset VS $"), ["with"]);
    assert_eq!(complete(&compiler, "map dataset VS with V $"), ["as"]);
}

#[test]
fn test_map_block_offers_unmapped_columns() {
    let compiler = compile(&project());
    let items = complete(&compiler, "map dataset VS {\n  VSTESTCD: literal \"x\"\n  $\n}");
    assert_eq!(items, ["VISIT", "VISITDY", "VSORRES"]);
}

#[test]
fn test_attribute_keys() {
    let compiler = compile(&project());
    assert_eq!(complete(&compiler, "study { $"), ["id", "name"]);
    assert_eq!(complete(&compiler, "study { name: \"N\"\n  $"), ["id"]);
    assert_eq!(complete(&compiler, "milestone M { $"), ["at"]);
    assert!(complete(&compiler, "milestone M { at: t\"d0\" $").is_empty());
}

#[test]
fn test_domain_and_dataset_positions() {
    let compiler = compile(&project());
    let domain = "domain \"Findings\" @abbr(\"FA\") {\n  ";
    assert_eq!(complete(&compiler, &format!("{domain}$")), ["dataset"]);
    assert_eq!(complete(&compiler, &format!("{domain}dataset FA $")), ["implements"]);
    assert_eq!(complete(&compiler, &format!("{domain}dataset FA implements $")), ["Timing"]);
    assert_eq!(complete(&compiler, &format!("{domain}dataset FA @$")), DATASET_DIRECTIVES);
    assert_eq!(complete(&compiler, "domain \"Findings\" @$"), ["abbr"]);
}

#[test]
fn test_column_positions() {
    let compiler = compile(&project());
    let items = complete(&compiler, "interface Sex {\n  SEX: String | $\n}");
    assert_eq!(items, ["String", "Boolean", "Integer", "Float", "Null", "SEX"]);
    let items = complete(&compiler, "interface Sex {\n  SEX: SEX @lab$\n}");
    assert_eq!(items, COLUMN_DIRECTIVES);
    assert_eq!(complete(&compiler, "codelist C {\n  \"X\" @$"), ["desc"]);
}

#[test]
fn test_items_carry_kinds() {
    let compiler = compile(&project());
    let items = compiler.completion_items(1, 15, "interface I { ");
    assert!(items.is_empty());
    let items = compiler.completion_items(1, 18, "interface I { A: ");
    assert!(items.iter().any(|i| i.kind == CompletionKind::ScalarType));
    assert!(items.iter().any(|i| i.kind == CompletionKind::Codelist && &*i.label == "SEX"));
}

#[test]
fn test_no_completion_inside_comment() {
    let compiler = compile(&project());
    assert!(complete(&compiler, "// map $").is_empty());
}

#[test]
fn test_out_of_range_position_clamps_to_line_end() {
    let compiler = compile(&project());
    let items: Vec<_> = compiler
        .completion_items(1, u32::MAX, "map ")
        .iter()
        .map(|item| item.label.to_string())
        .collect();
    assert_eq!(items, ["dataset"]);
    assert_eq!(compiler.completion_items(u32::MAX, u32::MAX, "").len(), ITEM_KEYWORDS.len());
}
