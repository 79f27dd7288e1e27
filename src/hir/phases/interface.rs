//! Phase 2: interfaces.

use super::Emitter;
use crate::hir::diagnostics::{DefType, DiagnosticKind};
use crate::hir::model::Interface;
use crate::hir::store::ConfigEvent;
use crate::hir::visitor::ItemVisitor;
use crate::parser::{self, AstNode};

pub(super) struct InterfacePhase<'a, 's>(pub(super) Emitter<'a, 's>);

impl ItemVisitor for InterfacePhase<'_, '_> {
    fn visit_interface(&mut self, interface: &parser::Interface) {
        let Some(name_node) = interface.name() else {
            return;
        };
        let name = name_node.text();
        if self.0.state().interfaces.contains_key(&name) {
            self.0.report(
                name_node.range(),
                DiagnosticKind::DuplicateDefinition {
                    def_type: DefType::Interface,
                    name: name.to_string(),
                },
            );
            return;
        }
        let mut columns = Vec::new();
        self.0.collect_columns(interface.columns(), &mut columns);
        self.0.emit(ConfigEvent::Interface(Interface { name, columns }));
    }
}
