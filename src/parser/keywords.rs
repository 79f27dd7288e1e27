//! Keyword and directive tables shared by the parser, semantic passes and completion.

/// Keywords that start a top-level item
pub const ITEM_KEYWORDS: &[&str] = &["study", "milestone", "codelist", "interface", "domain", "map"];

/// All reserved words
pub const KEYWORDS: &[&str] = &[
    "study",
    "milestone",
    "codelist",
    "interface",
    "domain",
    "dataset",
    "implements",
    "map",
    "with",
    "as",
    "true",
    "false",
];

pub const STUDY_ATTRIBUTES: &[&str] = &["id", "name"];
pub const MILESTONE_ATTRIBUTES: &[&str] = &["at"];

pub const LABEL: &str = "label";
pub const DESC: &str = "desc";
pub const ABBR: &str = "abbr";
pub const MILESTONE: &str = "milestone";

/// Column role directives; at most one applies to a column
pub const ROLE_DIRECTIVES: &[&str] = &[
    "milestone.study_day",
    "milestone.hour",
    "milestone.name",
    "subject.id",
    "subject.uuid",
    "sequence",
];

pub const COLUMN_DIRECTIVES: &[&str] = &[
    LABEL,
    DESC,
    "milestone.study_day",
    "milestone.hour",
    "milestone.name",
    "subject.id",
    "subject.uuid",
    "sequence",
];
pub const DATASET_DIRECTIVES: &[&str] = &[MILESTONE];
pub const DOMAIN_DIRECTIVES: &[&str] = &[ABBR];
pub const MEMBER_DIRECTIVES: &[&str] = &[DESC];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}
