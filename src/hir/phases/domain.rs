//! Phase 3: domains and their datasets.

use super::Emitter;
use super::study::milestone_stub;
use crate::hir::diagnostics::{DefType, DiagnosticKind};
use crate::hir::model::Dataset;
use crate::hir::store::ConfigEvent;
use crate::hir::time::{Expansion, TimeProblem, TimeResolver, check_range_endpoints};
use crate::hir::visitor::ItemVisitor;
use crate::parser::keywords::{ABBR, MILESTONE};
use crate::parser::time::parse_time;
use crate::parser::{self, AstNode, Literal};

pub(super) struct DomainPhase<'a, 's>(pub(super) Emitter<'a, 's>);

impl DomainPhase<'_, '_> {
    fn expand_milestones(&mut self, directive: &parser::Directive, out: &mut Expansion) {
        let Some(args) = self.0.directive_args(directive, 1) else {
            return;
        };
        let Some(value) = args.into_iter().next() else {
            return;
        };
        let body = match value.literal() {
            Some(Literal::Time(body)) => body,
            Some(other) => {
                self.0.report(
                    value.range(),
                    DiagnosticKind::invalid_type(other.type_name(), "time"),
                );
                return;
            }
            None => return,
        };
        let Ok(exprs) = parse_time(&body) else {
            self.0.report(
                value.range(),
                DiagnosticKind::invalid_type("time_syntax", "time"),
            );
            return;
        };

        let mut expansion = Expansion::default();
        let milestones = &self.0.state().milestones;
        TimeResolver::new(milestones).expand(&exprs, &mut expansion);
        expansion
            .problems
            .extend(check_range_endpoints(&exprs, milestones));

        for problem in std::mem::take(&mut expansion.problems) {
            let diagnostic = match problem {
                TimeProblem::MilestoneNotFound(name) => self
                    .0
                    .cx
                    .diagnostic(
                        value.range(),
                        DiagnosticKind::not_found(DefType::Milestone, name.as_str()),
                    )
                    .with_suggestion(milestone_stub(&name)),
                TimeProblem::InvalidType { actual, expected } => self
                    .0
                    .cx
                    .diagnostic(value.range(), DiagnosticKind::invalid_type(actual, expected)),
            };
            self.0.emit(ConfigEvent::Diagnostic(diagnostic));
        }
        for entry in expansion.milestones {
            out.push(entry);
        }
    }
}

impl ItemVisitor for DomainPhase<'_, '_> {
    fn visit_domain(&mut self, domain: &parser::Domain) {
        let Some(name_node) = domain.name() else {
            return;
        };
        let mut abbr = None;
        for directive in domain.directives() {
            if directive.name() != ABBR {
                self.0.report(
                    directive.range(),
                    DiagnosticKind::UnexpectedDirective {
                        directive: directive.name().to_string(),
                    },
                );
            } else if abbr.is_some() {
                self.0.report(
                    directive.range(),
                    DiagnosticKind::DuplicateAttribute {
                        name: ABBR.to_string(),
                    },
                );
            } else {
                abbr = Some(self.0.string_arg(&directive));
            }
        }
        if abbr.is_none() {
            self.0.report(
                name_node.range(),
                DiagnosticKind::MissingDirective {
                    directive: ABBR.to_string(),
                },
            );
        }
        self.0.emit(ConfigEvent::Domain {
            name: name_node.text(),
            abbr: abbr.flatten(),
        });

        for dataset in domain.datasets() {
            self.visit_dataset(domain, &dataset);
        }
    }

    fn visit_dataset(&mut self, domain: &parser::Domain, dataset: &parser::Dataset) {
        let (Some(domain_name), Some(name_node)) = (domain.name(), dataset.name()) else {
            return;
        };
        let name = name_node.text();
        if self.0.state().dataset(&name).is_some() {
            self.0.report(
                name_node.range(),
                DiagnosticKind::DuplicateDefinition {
                    def_type: DefType::Dataset,
                    name: name.to_string(),
                },
            );
            return;
        }

        let mut columns = Vec::new();
        for interface_ref in dataset.implements() {
            let interface_name = interface_ref.text();
            let interface_columns = self
                .0
                .state()
                .interfaces
                .get(&interface_name)
                .map(|i| i.columns.clone());
            match interface_columns {
                Some(interface_columns) => {
                    for column in interface_columns {
                        if columns.iter().any(|c: &crate::hir::model::Column| c.name == column.name) {
                            self.0.report(
                                interface_ref.range(),
                                DiagnosticKind::DuplicateDefinition {
                                    def_type: DefType::Column,
                                    name: column.name.to_string(),
                                },
                            );
                        } else {
                            columns.push(column);
                        }
                    }
                }
                None => self.0.report(
                    interface_ref.range(),
                    DiagnosticKind::not_found(DefType::Interface, interface_name.as_str()),
                ),
            }
        }
        self.0.collect_columns(dataset.columns(), &mut columns);

        let mut milestones = Expansion::default();
        for directive in dataset.directives() {
            if directive.name() == MILESTONE {
                self.expand_milestones(&directive, &mut milestones);
            } else {
                self.0.report(
                    directive.range(),
                    DiagnosticKind::UnexpectedDirective {
                        directive: directive.name().to_string(),
                    },
                );
            }
        }

        self.0.emit(ConfigEvent::Dataset {
            domain: domain_name.text(),
            dataset: Dataset {
                name,
                columns,
                milestones: milestones.milestones,
                mappings: Vec::new(),
            },
        });
    }
}
