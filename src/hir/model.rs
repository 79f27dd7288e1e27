//! The resolved configuration model.
//!
//! [`CompilationResult`] is the only externally observable compiled artifact.
//! Maps are keyed by name and keep declaration order; equality ignores order.

use indexmap::IndexMap;
use serde::Serialize;
use smol_str::SmolStr;

pub use crate::parser::time::{RelativePosition, Window};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Study {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A named point in study time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Milestone {
    Absolute {
        name: SmolStr,
        day: i64,
        window: Window,
    },
    Relative {
        name: SmolStr,
        position: RelativePosition,
        #[serde(rename = "relativeTo")]
        relative_to: RelativeTo,
    },
}

impl Milestone {
    pub fn name(&self) -> &SmolStr {
        match self {
            Milestone::Absolute { name, .. } | Milestone::Relative { name, .. } => name,
        }
    }

    /// Day and window, for milestones fixed to a study day
    pub fn fixed_day(&self) -> Option<(i64, Window)> {
        match self {
            Milestone::Absolute { day, window, .. } => Some((*day, *window)),
            Milestone::Relative { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelativeTo {
    Reference { name: SmolStr },
    Anonymous { day: i64, window: Window },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodelistItem {
    pub value: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Codelist {
    pub name: SmolStr,
    pub items: Vec<CodelistItem>,
}

/// One member of a column's `A | B` type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ColumnType {
    Scalar(SmolStr),
    Codelist(SmolStr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnRole {
    #[serde(rename = "milestone.study_day")]
    MilestoneStudyDay,
    #[serde(rename = "milestone.hour")]
    MilestoneHour,
    #[serde(rename = "milestone.name")]
    MilestoneName,
    #[serde(rename = "subject.id")]
    SubjectId,
    #[serde(rename = "subject.uuid")]
    SubjectUuid,
    #[serde(rename = "sequence")]
    Sequence,
}

impl ColumnRole {
    pub fn from_directive(name: &str) -> Option<Self> {
        Some(match name {
            "milestone.study_day" => ColumnRole::MilestoneStudyDay,
            "milestone.hour" => ColumnRole::MilestoneHour,
            "milestone.name" => ColumnRole::MilestoneName,
            "subject.id" => ColumnRole::SubjectId,
            "subject.uuid" => ColumnRole::SubjectUuid,
            "sequence" => ColumnRole::Sequence,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: SmolStr,
    pub label: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub types: Vec<ColumnType>,
    pub role: Option<ColumnRole>,
}

/// A reusable column list. Not part of the public result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: SmolStr,
    pub columns: Vec<Column>,
}

/// A concrete time point a dataset is collected at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DatasetMilestone {
    pub name: Option<SmolStr>,
    pub day: Option<i64>,
    pub hour: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingLogic {
    pub source: Option<String>,
    pub language: SmolStr,
    pub code: String,
}

/// One resolved mapping instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetMapping {
    /// Interpolation variables this instance was rendered with
    pub variables: IndexMap<SmolStr, String>,
    pub columns: IndexMap<SmolStr, MappingLogic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub name: SmolStr,
    pub columns: Vec<Column>,
    pub milestones: Vec<DatasetMilestone>,
    pub mappings: Vec<DatasetMapping>,
}

impl Dataset {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Domain {
    pub name: SmolStr,
    pub abbr: Option<String>,
    pub datasets: IndexMap<SmolStr, Dataset>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompilationResult {
    pub study: Option<Study>,
    pub milestones: IndexMap<SmolStr, Milestone>,
    pub codelists: IndexMap<SmolStr, Codelist>,
    pub domains: IndexMap<SmolStr, Domain>,
}

impl CompilationResult {
    /// Find a dataset by its global name
    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.domains.values().find_map(|d| d.datasets.get(name))
    }
}
