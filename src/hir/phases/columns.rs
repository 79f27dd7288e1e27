//! Column declarations, shared by interfaces and datasets.

use super::Emitter;
use crate::hir::diagnostics::{DefType, DiagnosticKind};
use crate::hir::model::{Column, ColumnRole, ColumnType};
use crate::parser::keywords::{DESC, LABEL};
use crate::parser::{self, AstNode};

fn codelist_stub(name: &str) -> String {
    format!("codelist {name} {{ \"VALUE\" @desc(\"Description\") }}")
}

impl Emitter<'_, '_> {
    /// Append resolved columns to `out`, reporting names already present.
    pub(super) fn collect_columns(
        &mut self,
        columns: impl Iterator<Item = parser::Column>,
        out: &mut Vec<Column>,
    ) {
        for column in columns {
            let Some(resolved) = self.build_column(&column) else {
                continue;
            };
            if out.iter().any(|c| c.name == resolved.name) {
                self.report(
                    column.range(),
                    DiagnosticKind::DuplicateDefinition {
                        def_type: DefType::Column,
                        name: resolved.name.to_string(),
                    },
                );
                continue;
            }
            out.push(resolved);
        }
    }

    fn build_column(&mut self, column: &parser::Column) -> Option<Column> {
        let name_node = column.name()?;
        let mut out = Column {
            name: name_node.text(),
            label: None,
            description: None,
            types: Vec::new(),
            role: None,
        };

        for type_ref in column.type_names() {
            let name = type_ref.text();
            if self.cx.options.is_scalar_type(&name) {
                out.types.push(ColumnType::Scalar(name));
            } else if self.state().codelists.contains_key(&name) {
                out.types.push(ColumnType::Codelist(name));
            } else {
                let diagnostic = self
                    .cx
                    .diagnostic(
                        type_ref.range(),
                        DiagnosticKind::not_found(DefType::Codelist, name.as_str()),
                    )
                    .with_suggestion(codelist_stub(&name));
                self.emit(crate::hir::store::ConfigEvent::Diagnostic(diagnostic));
            }
        }

        for directive in column.directives() {
            let name = directive.name();
            let slot = match name.as_str() {
                LABEL => &mut out.label,
                DESC => &mut out.description,
                other => {
                    match ColumnRole::from_directive(other) {
                        Some(_) if out.role.is_some() => self.report(
                            directive.range(),
                            DiagnosticKind::UnexpectedDirective {
                                directive: name.to_string(),
                            },
                        ),
                        Some(role) => {
                            if self.directive_args(&directive, 0).is_some() {
                                out.role = Some(role);
                            }
                        }
                        None => self.report(
                            directive.range(),
                            DiagnosticKind::UnexpectedDirective {
                                directive: name.to_string(),
                            },
                        ),
                    }
                    continue;
                }
            };
            if slot.is_some() {
                self.report(
                    directive.range(),
                    DiagnosticKind::DuplicateAttribute {
                        name: name.to_string(),
                    },
                );
                continue;
            }
            *slot = Some(self.string_arg(&directive).unwrap_or_default());
        }

        for (value, directive) in [(&out.label, LABEL), (&out.description, DESC)] {
            if value.is_none() {
                self.report(
                    name_node.range(),
                    DiagnosticKind::MissingDirective {
                        directive: directive.to_string(),
                    },
                );
            }
        }
        Some(out)
    }
}
