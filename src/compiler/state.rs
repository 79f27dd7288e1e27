//! Compiler state as a pure fold over an action log.
//!
//! Removing a file's contribution means refolding the log without that
//! file's entries; there is no targeted "remove entity" operation.

use std::collections::BTreeMap;

use crate::base::FileName;
use crate::hir::{ConfigEvent, ConfigState, Diagnostic, FileDefs};
use crate::syntax::SyntaxFile;

/// One step of compilation, attributed to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The file parsed; its tree replaces any earlier one.
    Parsed(SyntaxFile),
    /// The latest source failed to parse. Earlier trees stay in effect.
    ParseFailed(Diagnostic),
    /// Definition index entries of the file's current tree.
    Defined(FileDefs),
    /// Output of a builder phase.
    Config(ConfigEvent),
}

impl Action {
    /// Inputs survive rebuilds; derived config actions are regenerated every round.
    pub fn is_input(&self) -> bool {
        !matches!(self, Action::Config(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub file: FileName,
    pub action: Action,
}

impl LogEntry {
    pub fn new(file: FileName, action: Action) -> Self {
        Self { file, action }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerState {
    /// Last successful tree of every live file
    pub files: BTreeMap<FileName, SyntaxFile>,
    pub parse_failures: BTreeMap<FileName, Diagnostic>,
    pub defs: BTreeMap<FileName, FileDefs>,
    pub config: ConfigState,
}

impl CompilerState {
    pub fn apply(mut self, entry: &LogEntry) -> Self {
        match &entry.action {
            Action::Parsed(syntax) => {
                self.files.insert(entry.file.clone(), syntax.clone());
            }
            Action::ParseFailed(diagnostic) => {
                self.parse_failures
                    .insert(entry.file.clone(), diagnostic.clone());
            }
            Action::Defined(defs) => {
                self.defs.insert(entry.file.clone(), defs.clone());
            }
            Action::Config(event) => {
                self.config = std::mem::take(&mut self.config).apply(event);
            }
        }
        self
    }

    pub fn replay<'a>(log: impl IntoIterator<Item = &'a LogEntry>) -> Self {
        log.into_iter().fold(Self::default(), Self::apply)
    }
}
