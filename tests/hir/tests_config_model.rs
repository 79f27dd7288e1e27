//! Config model tests over complete compilations.

use trialdsl::hir::model::{
    ColumnRole, ColumnType, DatasetMilestone, Milestone, MappingLogic, RelativePosition,
    RelativeTo, Window,
};

use crate::helpers::diagnostic_helpers::{assert_no_diagnostics, codes, compile};
use crate::helpers::source_fixtures::*;

fn named(name: &str, day: i64) -> DatasetMilestone {
    DatasetMilestone {
        name: Some(name.into()),
        day: Some(day),
        hour: None,
    }
}

fn unnamed(day: i64) -> DatasetMilestone {
    DatasetMilestone {
        name: None,
        day: Some(day),
        hour: None,
    }
}

#[test]
fn test_project_compiles_clean() {
    let compiler = compile(&project());
    assert_no_diagnostics(&compiler);

    let result = compiler.result();
    let study = result.study.as_ref().unwrap();
    assert_eq!(study.id.as_deref(), Some("CDISC01"));
    assert_eq!(study.name.as_deref(), Some("Pilot Study"));
    assert_eq!(result.codelists["SEX"].items.len(), 2);
    assert_eq!(result.domains.len(), 2);
}

#[test]
fn test_time_range_expansion() {
    let compiler = compile(&[
        ("study", STUDY),
        ("time", MILESTONES),
        (
            "lab",
            r#"domain "Laboratory" @abbr("LB") { dataset LB @milestone(t"A -> B") {} }"#,
        ),
    ]);
    assert_no_diagnostics(&compiler);

    let mut expected = vec![named("A", 0)];
    expected.extend((1..=6).map(unnamed));
    expected.push(named("B", 7));
    assert_eq!(compiler.result().dataset("LB").unwrap().milestones, expected);
}

#[test]
fn test_milestone_windows_and_relative_targets() {
    let compiler = compile(&[
        ("study", STUDY),
        (
            "time",
            r#"
            milestone SCREENING { at: t"d-14 +-3" }
            milestone BASELINE { at: t"> SCREENING" }
            milestone FOLLOWUP { at: t">= d30" }
            "#,
        ),
    ]);
    assert_no_diagnostics(&compiler);

    let milestones = compiler.result().milestones;
    assert_eq!(milestones["SCREENING"], Milestone::Absolute {
        name: "SCREENING".into(),
        day: -14,
        window: Window { before: -3, after: 3 },
    });
    assert_eq!(milestones["BASELINE"], Milestone::Relative {
        name: "BASELINE".into(),
        position: RelativePosition::After,
        relative_to: RelativeTo::Reference {
            name: "SCREENING".into()
        },
    });
    assert!(matches!(
        milestones["FOLLOWUP"],
        Milestone::Relative {
            relative_to: RelativeTo::Anonymous { day: 30, .. },
            ..
        }
    ));
}

#[test]
fn test_column_types_and_roles() {
    let compiler = compile(&project());
    let result = compiler.result();

    let dm = result.dataset("DM").unwrap();
    let sex = dm.column("SEX").unwrap();
    assert_eq!(sex.types, vec![ColumnType::Codelist("SEX".into())]);
    assert_eq!(sex.label.as_deref(), Some("Sex"));
    assert_eq!(dm.column("AGE").unwrap().types, vec![
        ColumnType::Scalar("Integer".into()),
        ColumnType::Scalar("Null".into()),
    ]);

    let vs = result.dataset("VS").unwrap();
    let names: Vec<_> = vs.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["VISIT", "VISITDY", "VSTESTCD", "VSORRES"]);
    assert_eq!(vs.column("VISIT").unwrap().role, Some(ColumnRole::MilestoneName));
}

#[test]
fn test_unknown_column_type_is_omitted() {
    let compiler = compile(&[
        ("study", STUDY),
        (
            "dm",
            r#"domain "DM" @abbr("DM") { dataset DM { RACE: RACE | Null @label("Race") @desc("Race") } }"#,
        ),
    ]);
    assert_eq!(codes(&compiler), ["not_found"]);
    let result = compiler.result();
    let types = &result.dataset("DM").unwrap().column("RACE").unwrap().types;
    assert_eq!(types, &vec![ColumnType::Scalar("Null".into())]);
}

#[test]
fn test_mapping_variable_cross_product() {
    let compiler = compile(&project());
    let result = compiler.result();
    let mappings = &result.dataset("VS").unwrap().mappings;
    assert_eq!(mappings.len(), 4);

    let rendered: Vec<_> = mappings
        .iter()
        .map(|m| (m.variables["V"].as_str(), m.columns["VSTESTCD"].code.as_str()))
        .collect();
    assert_eq!(rendered, [("p", "p"), ("p", "p"), ("q", "q"), ("q", "q")]);
    for mapping in mappings {
        let value = &mapping.variables["V"];
        assert!(mapping.columns["VSORRES"].code.starts_with(&format!("select {value} from")));
    }
    assert_eq!(
        mappings[3].columns["VSORRES"].code,
        "select q from vitals where day = 7"
    );
}

#[test]
fn test_role_columns_are_auto_filled() {
    let compiler = compile(&project());
    let result = compiler.result();
    let mapping = &result.dataset("VS").unwrap().mappings[1];
    assert_eq!(mapping.columns["VISIT"], MappingLogic {
        source: None,
        language: "literal".into(),
        code: "B".into(),
    });
    assert_eq!(mapping.columns["VISITDY"].code, "7");
}

#[test]
fn test_domains_merge_across_files() {
    let compiler = compile(&[
        ("study", STUDY),
        ("a", r#"domain "Findings" @abbr("FA") { dataset FA {} }"#),
        ("b", r#"domain "Findings" @abbr("FB") { dataset FB {} }"#),
    ]);
    assert_no_diagnostics(&compiler);
    let result = compiler.result();
    let domain = &result.domains["Findings"];
    assert_eq!(domain.abbr.as_deref(), Some("FA"));
    assert_eq!(domain.datasets.keys().collect::<Vec<_>>(), ["FA", "FB"]);
}

#[test]
fn test_hour_milestones_flow_into_mappings() {
    let compiler = compile(&[
        ("study", STUDY),
        (
            "pk",
            r#"
            domain "Pharmacokinetics" @abbr("PC") {
                dataset PC @milestone(t"d1 h4, d1 h8") {
                    PCDY: Integer @label("Day") @desc("Planned study day") @milestone.study_day
                    PCTPTNUM: Integer @label("Hour") @desc("Planned hour") @milestone.hour
                    PCTPT: String @label("Timepoint") @desc("Planned timepoint")
                }
            }
            map dataset PC {
                PCTPT: literal "h{{MILESTONE.HOUR}}"
            }
            "#,
        ),
    ]);
    assert_no_diagnostics(&compiler);
    let result = compiler.result();
    let dataset = result.dataset("PC").unwrap();
    let hours: Vec<_> = dataset.milestones.iter().map(|m| (m.day, m.hour)).collect();
    assert_eq!(hours, [(Some(1), Some(4)), (Some(1), Some(8))]);

    let rendered: Vec<_> = dataset
        .mappings
        .iter()
        .map(|m| {
            (
                m.columns["PCTPT"].code.as_str(),
                m.columns["PCTPTNUM"].code.as_str(),
                m.columns["PCDY"].code.as_str(),
            )
        })
        .collect();
    assert_eq!(rendered, [("h4", "4", "1"), ("h8", "8", "1")]);
    assert_eq!(dataset.mappings[0].columns["PCTPTNUM"].language, "literal");
}
