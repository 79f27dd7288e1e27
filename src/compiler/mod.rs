//! Compiler — incremental, multi-file orchestration.
//!
//! The `Compiler` owns all state and rebuilds the config model whenever
//! files change. Every round rederives config from the full live file set,
//! so the result does not depend on the order files arrive in.
//!
//! ## Usage
//!
//! ```
//! use trialdsl::{Compiler, CompilerOptions};
//!
//! let mut compiler = Compiler::new(CompilerOptions::default());
//! compiler.update_files([
//!     ("study.trial", Some(r#"study { id: "S1", name: "Trial" }"#)),
//!     ("time.trial", Some(r#"milestone BASELINE { at: t"d0" }"#)),
//! ]);
//! assert!(compiler.diagnostics().is_empty());
//! assert!(compiler.result().milestones.contains_key("BASELINE"));
//! ```

mod state;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

pub use state::{Action, CompilerState, LogEntry};

use crate::base::FileName;
use crate::config::CompilerOptions;
use crate::hir::{
    CompilationResult, ConfigEvent, ConfigSink, ConfigState, DefinitionIndex, Diagnostic,
    DiagnosticKind, FileContext, FileDefs, Phase, run_phase,
};
use crate::ide::{CompletionItem, completions};
use crate::syntax::parse_file;

/// Owns the authoritative state: sources, the action log and its fold.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
    /// Deleted files keep their key with `None`
    sources: BTreeMap<FileName, Option<String>>,
    log: Vec<LogEntry>,
    state: CompilerState,
}

/// Applies phase output to the state and records it in the log.
struct Recorder<'a> {
    file: FileName,
    state: &'a mut CompilerState,
    log: &'a mut Vec<LogEntry>,
}

impl ConfigSink for Recorder<'_> {
    fn state(&self) -> &ConfigState {
        &self.state.config
    }

    fn emit(&mut self, event: ConfigEvent) {
        let entry = LogEntry::new(self.file.clone(), Action::Config(event));
        *self.state = std::mem::take(self.state).apply(&entry);
        self.log.push(entry);
    }
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Current source of every known file; deleted files map to `None`.
    pub fn sources(&self) -> &BTreeMap<FileName, Option<String>> {
        &self.sources
    }

    /// Apply a batch of file changes. A `None` source deletes the file.
    ///
    /// A file that fails to parse reports `parse_failure` and keeps
    /// contributing whatever its last successful parse produced.
    pub fn update_files<I, K, S>(&mut self, delta: I)
    where
        I: IntoIterator<Item = (K, Option<S>)>,
        K: Into<FileName>,
        S: Into<String>,
    {
        let mut changed = 0;
        for (file, source) in delta {
            changed += 1;
            let file = file.into();
            let source = source.map(Into::into);
            self.apply_source(&file, source.as_deref());
            self.sources.insert(file, source);
        }
        debug!(
            changed,
            live = self.live_file_count(),
            "updating files"
        );

        self.log.retain(|entry| entry.action.is_input());
        self.state = CompilerState::replay(&self.log);
        self.derive(None);
        self.self_heal();

        debug!(
            diagnostics = self.state.config.diagnostics.len() + self.state.parse_failures.len(),
            actions = self.log.len(),
            "update finished"
        );
    }

    fn apply_source(&mut self, file: &FileName, source: Option<&str>) {
        let Some(source) = source else {
            self.log.retain(|entry| &entry.file != file);
            return;
        };
        match parse_file(source) {
            Ok(syntax) => {
                self.log.retain(|entry| &entry.file != file);
                let defs = FileDefs::collect(&syntax.source_file());
                self.log
                    .push(LogEntry::new(file.clone(), Action::Parsed(syntax)));
                self.log
                    .push(LogEntry::new(file.clone(), Action::Defined(defs)));
            }
            Err(error) => {
                debug!(file = %file, %error, "parse failed");
                self.log.retain(|entry| {
                    &entry.file != file || !matches!(entry.action, Action::ParseFailed(_))
                });
                let diagnostic = Diagnostic::parse_failure(file.clone(), source, &error);
                self.log
                    .push(LogEntry::new(file.clone(), Action::ParseFailed(diagnostic)));
            }
        }
    }

    /// Run every phase over every parsed file, in phase order then file order.
    fn derive(&mut self, lookahead: Option<&ConfigState>) {
        let syntax: Vec<_> = self
            .state
            .files
            .iter()
            .map(|(file, syntax)| (file.clone(), syntax.clone()))
            .collect();
        for phase in Phase::ALL {
            for (file, syntax) in &syntax {
                let mut recorder = Recorder {
                    file: file.clone(),
                    state: &mut self.state,
                    log: &mut self.log,
                };
                let cx = FileContext::new(file, syntax, &self.options).with_lookahead(lookahead);
                run_phase(phase, cx, &mut recorder);
            }
        }
    }

    /// Files with a `not_found` whose target now exists in the definition index.
    fn healable_files(&self) -> BTreeSet<FileName> {
        let index = DefinitionIndex::new(&self.state.defs);
        self.state
            .config
            .diagnostics
            .iter()
            .filter(|d| match &d.kind {
                DiagnosticKind::NotFound { def_type, name, .. } => index.contains(*def_type, name),
                _ => false,
            })
            .filter_map(|d| d.file.clone())
            .collect()
    }

    /// Rederive while some `not_found` names a definition that exists,
    /// until nothing changes. Each round rebuilds every file in file order so
    /// first-definition-wins stays file ordered, resolving milestone
    /// references against the previous round's config. Bounded by the number
    /// of live files.
    fn self_heal(&mut self) {
        let bound = self.state.files.len();
        let mut previous = BTreeSet::new();
        for round in 0..bound {
            let healable = self.healable_files();
            if healable.is_empty() || healable == previous {
                return;
            }
            debug!(round, files = ?healable, "self-heal");
            let lookahead = self.state.config.clone();
            self.log.retain(|entry| entry.action.is_input());
            self.state = CompilerState::replay(&self.log);
            self.derive(Some(&lookahead));
            previous = healable;
        }
        let remaining = self.healable_files();
        if !remaining.is_empty() && remaining != previous {
            warn!(bound, files = ?remaining, "self-heal stopped at round limit");
        }
    }

    fn live_file_count(&self) -> usize {
        self.sources.values().filter(|s| s.is_some()).count()
    }

    /// All current diagnostics: the global one first, then local ones by
    /// file, position and code.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = self
            .state
            .parse_failures
            .values()
            .chain(&self.state.config.diagnostics)
            .cloned()
            .collect();
        if DefinitionIndex::new(&self.state.defs).study_count() == 0 {
            diagnostics.push(Diagnostic::global(DiagnosticKind::MissingStudyDef));
        }
        diagnostics.sort_by(Diagnostic::feed_order);
        diagnostics
    }

    pub fn result(&self) -> CompilationResult {
        self.state.config.to_result()
    }

    /// Valid next keywords or names at a 1-based cursor position in `source`.
    pub fn completion_items(&self, line: u32, col: u32, source: &str) -> Vec<CompletionItem> {
        completions(&self.state.config, &self.options, source, line, col)
    }

    pub fn state(&self) -> &CompilerState {
        &self.state
    }
}
