//! Phase 4: dataset mappings.
//!
//! Each `map dataset` block is rendered once per (variable value, dataset
//! milestone) pair. `{{NAME}}` placeholders in code blocks are replaced by
//! the pair's variables, and role columns the author left unmapped are filled
//! with literals.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::Emitter;
use crate::hir::diagnostics::{DefType, DiagnosticKind};
use crate::hir::model::{ColumnRole, DatasetMapping, DatasetMilestone, MappingLogic};
use crate::hir::store::ConfigEvent;
use crate::hir::visitor::ItemVisitor;
use crate::parser::{self, AstNode};

pub const MILESTONE_NAME: &str = "MILESTONE.NAME";
pub const MILESTONE_STUDY_DAY: &str = "MILESTONE.STUDY_DAY";
pub const MILESTONE_HOUR: &str = "MILESTONE.HOUR";

pub(super) struct MappingPhase<'a, 's>(pub(super) Emitter<'a, 's>);

/// Replace `{{ NAME }}` placeholders; unknown names are left as written.
pub fn interpolate(code: &str, variables: &IndexMap<SmolStr, String>) -> String {
    let mut out = String::with_capacity(code.len());
    let mut rest = code;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        let end = start + 2 + len;
        out.push_str(&rest[..start]);
        match variables.get(rest[start + 2..end].trim()) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..end + 2]),
        }
        rest = &rest[end + 2..];
    }
    out.push_str(rest);
    out
}

fn milestone_variables(milestone: &DatasetMilestone) -> Vec<(&'static str, String)> {
    let mut vars = Vec::new();
    if let Some(name) = &milestone.name {
        vars.push((MILESTONE_NAME, name.to_string()));
    }
    if let Some(day) = milestone.day {
        vars.push((MILESTONE_STUDY_DAY, day.to_string()));
    }
    if let Some(hour) = milestone.hour {
        vars.push((MILESTONE_HOUR, hour.to_string()));
    }
    vars
}

fn role_variable(role: ColumnRole) -> Option<&'static str> {
    match role {
        ColumnRole::MilestoneName => Some(MILESTONE_NAME),
        ColumnRole::MilestoneStudyDay => Some(MILESTONE_STUDY_DAY),
        ColumnRole::MilestoneHour => Some(MILESTONE_HOUR),
        _ => None,
    }
}

impl ItemVisitor for MappingPhase<'_, '_> {
    fn visit_mapping(&mut self, mapping: &parser::Mapping) {
        let Some(target) = mapping.target() else {
            return;
        };
        let dataset_name = target.text();
        let Some(dataset) = self.0.state().dataset(&dataset_name).cloned() else {
            self.0.report(
                target.range(),
                DiagnosticKind::not_found(DefType::Dataset, dataset_name.as_str()),
            );
            return;
        };

        let mut templates: IndexMap<SmolStr, MappingLogic> = IndexMap::new();
        for column_mapping in mapping.column_mappings() {
            let Some(column) = column_mapping.column() else {
                continue;
            };
            let column_name = column.text();
            if dataset.column(&column_name).is_none() {
                self.0.report(
                    column.range(),
                    DiagnosticKind::not_found(DefType::Column, column_name.as_str()),
                );
                continue;
            }
            if templates.contains_key(&column_name) {
                self.0.report(
                    column.range(),
                    DiagnosticKind::DuplicateAttribute {
                        name: column_name.to_string(),
                    },
                );
                continue;
            }
            let (Some(language), Some(code)) = (column_mapping.language(), column_mapping.code())
            else {
                continue;
            };
            templates.insert(column_name, MappingLogic {
                source: column_mapping.source(),
                language,
                code,
            });
        }

        let variable = mapping
            .variable()
            .and_then(|v| Some((v.name()?.text(), v.values())));
        let values: Vec<Option<(SmolStr, String)>> = match variable {
            Some((name, values)) => values
                .into_iter()
                .map(|value| Some((name.clone(), value)))
                .collect(),
            None => vec![None],
        };
        let milestones: Vec<Option<&DatasetMilestone>> = if dataset.milestones.is_empty() {
            vec![None]
        } else {
            dataset.milestones.iter().map(Some).collect()
        };

        let mut rendered = Vec::with_capacity(values.len() * milestones.len());
        for value in &values {
            for milestone in &milestones {
                let mut variables = IndexMap::new();
                if let Some((name, value)) = value {
                    variables.insert(name.clone(), value.clone());
                }
                if let Some(milestone) = milestone {
                    for (name, value) in milestone_variables(milestone) {
                        variables.insert(SmolStr::new(name), value);
                    }
                }

                let mut columns: IndexMap<SmolStr, MappingLogic> = templates
                    .iter()
                    .map(|(name, logic)| {
                        (name.clone(), MappingLogic {
                            source: logic.source.clone(),
                            language: logic.language.clone(),
                            code: interpolate(&logic.code, &variables),
                        })
                    })
                    .collect();
                for column in &dataset.columns {
                    if columns.contains_key(&column.name) {
                        continue;
                    }
                    let Some(value) = column
                        .role
                        .and_then(role_variable)
                        .and_then(|var| variables.get(var))
                    else {
                        continue;
                    };
                    columns.insert(column.name.clone(), MappingLogic {
                        source: None,
                        language: SmolStr::new_static("literal"),
                        code: value.clone(),
                    });
                }
                rendered.push(DatasetMapping { variables, columns });
            }
        }

        self.0.emit(ConfigEvent::Mappings {
            dataset: dataset_name,
            mappings: rendered,
        });
    }
}
