//! Common source fixtures for tests.

pub const STUDY: &str = r#"study { id: "CDISC01", name: "Pilot Study" }"#;

pub const MILESTONES: &str = r#"
milestone A { at: t"d0" }
milestone B { at: t"d7" }
"#;

pub const SEX_CODELIST: &str = r#"
codelist SEX {
    "M" @desc("Male")
    "F" @desc("Female")
}
"#;

pub const TIMING_INTERFACE: &str = r#"
interface Timing {
    VISIT: String @label("Visit") @desc("Visit name") @milestone.name
    VISITDY: Integer @label("Visit Day") @desc("Planned study day") @milestone.study_day
}
"#;

/// Vital signs collected at milestones `A` and `B`.
pub const VITALS_DOMAIN: &str = r#"
domain "Vital Signs" @abbr("VS") {
    dataset VS implements Timing @milestone(t"A, B") {
        VSTESTCD: String @label("Test Code") @desc("Vital signs test code")
        VSORRES: String @label("Result") @desc("Result as collected")
    }
}
"#;

pub const VITALS_MAPPING: &str = r#"
map dataset VS with V as ("p", "q") {
    VSTESTCD: literal "{{V}}"
    VSORRES: sql("raw.vitals") `select {{ V }} from vitals where day = {{MILESTONE.STUDY_DAY}}`
}
"#;

pub const DEMOGRAPHICS_DOMAIN: &str = r#"
domain "Demographics" @abbr("DM") {
    dataset DM {
        SEX: SEX @label("Sex") @desc("Sex of the subject")
        AGE: Integer | Null @label("Age") @desc("Age in years")
    }
}
"#;

/// A complete, error-free project split over several files.
pub fn project() -> Vec<(&'static str, &'static str)> {
    vec![
        ("study.trial", STUDY),
        ("milestones.trial", MILESTONES),
        ("codelists.trial", SEX_CODELIST),
        ("interfaces.trial", TIMING_INTERFACE),
        ("vitals.trial", VITALS_DOMAIN),
        ("demographics.trial", DEMOGRAPHICS_DOMAIN),
        ("mappings.trial", VITALS_MAPPING),
    ]
}
