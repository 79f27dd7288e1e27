//! Phased config builder.
//!
//! Four passes populate the config model, each over every live file and
//! each able to resolve names produced by the passes before it:
//!
//! ```text
//! 1. study, milestones, codelists
//! 2. interfaces
//! 3. domains and datasets        (needs 1 + 2)
//! 4. dataset mappings            (needs 3)
//! ```
//!
//! A phase is an [`ItemVisitor`](super::visitor::ItemVisitor) built for one
//! file. It reads resolved names through a [`ConfigSink`] and emits
//! [`ConfigEvent`]s; a local problem becomes a diagnostic and the phase keeps going.

mod columns;
mod domain;
mod interface;
mod mapping;
mod study;

use rowan::TextRange;
use tracing::trace;

use super::diagnostics::{Diagnostic, DiagnosticKind};
use super::store::{ConfigEvent, ConfigSink, ConfigState};
use super::visitor::walk_file;
use crate::base::FileName;
use crate::config::CompilerOptions;
use crate::parser::{AstNode, Directive, Literal, Value};
use crate::syntax::SyntaxFile;

/// The four builder passes, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    StudyMilestonesCodelists,
    Interfaces,
    Datasets,
    Mappings,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::StudyMilestonesCodelists,
        Phase::Interfaces,
        Phase::Datasets,
        Phase::Mappings,
    ];
}

/// The file a phase is currently building, passed explicitly to each pass.
#[derive(Clone, Copy)]
pub struct FileContext<'a> {
    pub file: &'a FileName,
    pub syntax: &'a SyntaxFile,
    pub options: &'a CompilerOptions,
    /// Config from the previous round over the same files. Milestone
    /// references to files later in the order resolve against it.
    pub lookahead: Option<&'a ConfigState>,
}

impl<'a> FileContext<'a> {
    pub fn new(file: &'a FileName, syntax: &'a SyntaxFile, options: &'a CompilerOptions) -> Self {
        Self {
            file,
            syntax,
            options,
            lookahead: None,
        }
    }

    pub fn with_lookahead(mut self, lookahead: Option<&'a ConfigState>) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn diagnostic(&self, range: TextRange, kind: DiagnosticKind) -> Diagnostic {
        Diagnostic::local(self.file.clone(), self.syntax.location(range), kind)
    }
}

/// Run one phase over one file.
pub fn run_phase(phase: Phase, cx: FileContext<'_>, sink: &mut dyn ConfigSink) {
    trace!(?phase, file = %cx.file, "running phase");
    let tree = cx.syntax.source_file();
    let emitter = Emitter { cx, sink };
    match phase {
        Phase::StudyMilestonesCodelists => {
            let mut phase = study::StudyPhase::new(emitter);
            walk_file(&mut phase, &tree);
            phase.finish();
        }
        Phase::Interfaces => walk_file(&mut interface::InterfacePhase(emitter), &tree),
        Phase::Datasets => walk_file(&mut domain::DomainPhase(emitter), &tree),
        Phase::Mappings => walk_file(&mut mapping::MappingPhase(emitter), &tree),
    }
}

/// Shared plumbing of every phase: file context plus the sink.
pub(crate) struct Emitter<'a, 's> {
    cx: FileContext<'a>,
    sink: &'s mut dyn ConfigSink,
}

impl Emitter<'_, '_> {
    fn state(&self) -> &ConfigState {
        self.sink.state()
    }

    /// Whether a milestone is defined so far, or was in the previous round.
    fn milestone_known(&self, name: &str) -> bool {
        self.state().milestones.contains_key(name)
            || self
                .cx
                .lookahead
                .is_some_and(|previous| previous.milestones.contains_key(name))
    }

    fn emit(&mut self, event: ConfigEvent) {
        self.sink.emit(event);
    }

    fn report(&mut self, range: TextRange, kind: DiagnosticKind) {
        let diagnostic = self.cx.diagnostic(range, kind);
        self.sink.emit(ConfigEvent::Diagnostic(diagnostic));
    }

    /// Check a directive's arity, reporting a mismatch.
    fn directive_args(&mut self, directive: &Directive, expected: usize) -> Option<Vec<Value>> {
        let args = directive.args().unwrap_or_default();
        if args.len() != expected {
            self.report(
                directive.range(),
                DiagnosticKind::IncorrectNumberOfArgs {
                    directive: directive.name().to_string(),
                    expected,
                    actual: args.len(),
                },
            );
            return None;
        }
        Some(args)
    }

    /// The single string argument of a directive like `@label("...")`.
    fn string_arg(&mut self, directive: &Directive) -> Option<String> {
        let args = self.directive_args(directive, 1)?;
        let value = args.into_iter().next()?;
        match value.literal() {
            Some(Literal::String(text)) => Some(text),
            Some(other) => {
                self.report(
                    value.range(),
                    DiagnosticKind::invalid_type(other.type_name(), "string"),
                );
                None
            }
            None => None,
        }
    }
}
