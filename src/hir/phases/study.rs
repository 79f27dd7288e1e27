//! Phase 1: study, milestones and codelists.

use rowan::TextRange;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::Emitter;
use crate::hir::diagnostics::{DefType, DiagnosticKind};
use crate::hir::model::{self, CodelistItem, Milestone, RelativeTo};
use crate::hir::store::ConfigEvent;
use crate::hir::time::{MILESTONE_AT_SHAPE, resolve_milestone};
use crate::hir::visitor::ItemVisitor;
use crate::parser::keywords::{DESC, MILESTONE_ATTRIBUTES, STUDY_ATTRIBUTES};
use crate::parser::time::parse_time;
use crate::parser::{Attribute, AstNode, Codelist, Literal, Study, Value};

pub(super) struct StudyPhase<'a, 's> {
    emitter: Emitter<'a, 's>,
    /// Relative milestone targets, checked once the whole file is in
    references: Vec<(SmolStr, TextRange)>,
}

impl<'a, 's> StudyPhase<'a, 's> {
    pub(super) fn new(emitter: Emitter<'a, 's>) -> Self {
        Self {
            emitter,
            references: Vec::new(),
        }
    }

    pub(super) fn finish(mut self) {
        for (target, range) in std::mem::take(&mut self.references) {
            if self.emitter.milestone_known(&target) {
                continue;
            }
            let diagnostic = self
                .emitter
                .cx
                .diagnostic(range, DiagnosticKind::not_found(DefType::Milestone, target.as_str()))
                .with_suggestion(milestone_stub(&target));
            self.emitter.emit(ConfigEvent::Diagnostic(diagnostic));
        }
    }

    /// Validate keys against an allowed set, returning each accepted
    /// attribute once, in source order.
    fn accepted_attributes(
        &mut self,
        attributes: impl Iterator<Item = Attribute>,
        allowed: &[&str],
    ) -> Vec<(SmolStr, Option<Value>)> {
        let mut seen = FxHashSet::default();
        let mut accepted = Vec::new();
        for attribute in attributes {
            let Some(key) = attribute.key() else {
                continue;
            };
            let name = key.text();
            if !allowed.contains(&name.as_str()) {
                self.emitter.report(
                    key.range(),
                    DiagnosticKind::ExtraAttribute {
                        name: name.to_string(),
                    },
                );
            } else if !seen.insert(name.clone()) {
                self.emitter.report(
                    key.range(),
                    DiagnosticKind::DuplicateAttribute {
                        name: name.to_string(),
                    },
                );
            } else {
                accepted.push((name, attribute.value()));
            }
        }
        accepted
    }

    fn report_missing(&mut self, accepted: &[(SmolStr, Option<Value>)], required: &[&str], range: TextRange) {
        for &name in required {
            if !accepted.iter().any(|(key, _)| key == name) {
                self.emitter.report(
                    range,
                    DiagnosticKind::MissingAttribute {
                        name: name.to_string(),
                    },
                );
            }
        }
    }
}

pub(crate) fn milestone_stub(name: &str) -> String {
    format!("milestone {name} {{ at: t\"d0\" }}")
}

impl ItemVisitor for StudyPhase<'_, '_> {
    fn visit_study(&mut self, study: &Study) {
        let accepted = self.accepted_attributes(study.attributes(), STUDY_ATTRIBUTES);
        self.report_missing(&accepted, STUDY_ATTRIBUTES, study.keyword_range());

        let mut out = model::Study::default();
        for (key, value) in accepted {
            let Some(value) = value else {
                continue;
            };
            let text = match value.literal() {
                Some(Literal::String(text)) => text,
                Some(other) => {
                    self.emitter.report(
                        value.range(),
                        DiagnosticKind::invalid_type(other.type_name(), "string"),
                    );
                    continue;
                }
                None => continue,
            };
            match key.as_str() {
                "id" => out.id = Some(text),
                _ => out.name = Some(text),
            }
        }
        self.emitter.emit(ConfigEvent::Study(out));
    }

    fn visit_milestone(&mut self, milestone: &crate::parser::Milestone) {
        let Some(name_node) = milestone.name() else {
            return;
        };
        let name = name_node.text();
        if self.emitter.state().milestones.contains_key(&name) {
            self.emitter.report(
                name_node.range(),
                DiagnosticKind::DuplicateDefinition {
                    def_type: DefType::Milestone,
                    name: name.to_string(),
                },
            );
            return;
        }

        let accepted = self.accepted_attributes(milestone.attributes(), MILESTONE_ATTRIBUTES);
        self.report_missing(&accepted, MILESTONE_ATTRIBUTES, name_node.range());
        let Some((_, Some(value))) = accepted.into_iter().next() else {
            return;
        };

        let body = match value.literal() {
            Some(Literal::Time(body)) => body,
            Some(other) => {
                self.emitter.report(
                    value.range(),
                    DiagnosticKind::invalid_type(other.type_name(), "time"),
                );
                return;
            }
            None => return,
        };
        let exprs = match parse_time(&body) {
            Ok(exprs) => exprs,
            Err(_) => {
                self.emitter.report(
                    value.range(),
                    DiagnosticKind::invalid_type("time_syntax", "time"),
                );
                return;
            }
        };
        match resolve_milestone(&name, &exprs) {
            Ok(resolved) => {
                if let Milestone::Relative {
                    relative_to: RelativeTo::Reference { name: target },
                    ..
                } = &resolved
                {
                    self.references.push((target.clone(), value.range()));
                }
                self.emitter.emit(ConfigEvent::Milestone(resolved));
            }
            Err(actual) => self.emitter.report(
                value.range(),
                DiagnosticKind::invalid_type(actual, MILESTONE_AT_SHAPE),
            ),
        }
    }

    fn visit_codelist(&mut self, codelist: &Codelist) {
        let Some(name_node) = codelist.name() else {
            return;
        };
        let name = name_node.text();
        if self.emitter.state().codelists.contains_key(&name) {
            self.emitter.report(
                name_node.range(),
                DiagnosticKind::DuplicateDefinition {
                    def_type: DefType::Codelist,
                    name: name.to_string(),
                },
            );
            return;
        }

        let mut items = Vec::new();
        for member in codelist.members() {
            let mut description = None;
            for directive in member.directives() {
                if directive.name() != DESC {
                    self.emitter.report(
                        directive.range(),
                        DiagnosticKind::UnexpectedDirective {
                            directive: directive.name().to_string(),
                        },
                    );
                    continue;
                }
                if description.is_some() {
                    self.emitter.report(
                        directive.range(),
                        DiagnosticKind::DuplicateAttribute {
                            name: DESC.to_string(),
                        },
                    );
                    continue;
                }
                description = Some(self.emitter.string_arg(&directive).unwrap_or_default());
            }
            if description.is_none() {
                self.emitter.report(
                    member.range(),
                    DiagnosticKind::MissingDirective {
                        directive: DESC.to_string(),
                    },
                );
            }
            items.push(CodelistItem {
                value: member.value(),
                description: description.unwrap_or_default(),
            });
        }
        self.emitter
            .emit(ConfigEvent::Codelist(model::Codelist { name, items }));
    }
}
