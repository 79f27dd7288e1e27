//! Definition index: named top-level declarations per file.
//!
//! Extraction is purely syntactic and never resolves a reference. The index
//! answers one question for the compiler: does a definition that could not be
//! found earlier exist now?

use std::collections::BTreeMap;

use rowan::TextRange;
use smol_str::SmolStr;

use super::diagnostics::DefType;
use super::visitor::{ItemVisitor, walk_file};
use crate::base::FileName;
use crate::parser::{AstNode, Codelist, Dataset, Domain, Interface, Milestone, SourceFile, Study};

/// A named declaration and where it sits in its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: SmolStr,
    pub range: TextRange,
}

/// Declarations introduced by one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDefs {
    pub studies: Vec<TextRange>,
    pub milestones: Vec<Definition>,
    pub codelists: Vec<Definition>,
    pub interfaces: Vec<Definition>,
    pub datasets: Vec<Definition>,
}

impl FileDefs {
    pub fn collect(file: &SourceFile) -> Self {
        let mut defs = Self::default();
        walk_file(&mut defs, file);
        defs
    }

    pub fn of_kind(&self, def_type: DefType) -> &[Definition] {
        match def_type {
            DefType::Milestone => &self.milestones,
            DefType::Codelist => &self.codelists,
            DefType::Interface => &self.interfaces,
            DefType::Dataset => &self.datasets,
            DefType::Study | DefType::Column => &[],
        }
    }
}

fn definition(name: Option<crate::parser::Name>, range: TextRange) -> Option<Definition> {
    let name = name?.text();
    (!name.is_empty()).then_some(Definition { name, range })
}

impl ItemVisitor for FileDefs {
    fn visit_study(&mut self, study: &Study) {
        self.studies.push(study.range());
    }

    fn visit_milestone(&mut self, milestone: &Milestone) {
        self.milestones
            .extend(definition(milestone.name(), milestone.range()));
    }

    fn visit_codelist(&mut self, codelist: &Codelist) {
        self.codelists
            .extend(definition(codelist.name(), codelist.range()));
    }

    fn visit_interface(&mut self, interface: &Interface) {
        self.interfaces
            .extend(definition(interface.name(), interface.range()));
    }

    fn visit_dataset(&mut self, _domain: &Domain, dataset: &Dataset) {
        self.datasets
            .extend(definition(dataset.name(), dataset.range()));
    }
}

/// The live definition index across all files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionIndex<'a> {
    files: Vec<&'a FileDefs>,
}

impl<'a> DefinitionIndex<'a> {
    pub fn new(defs: &'a BTreeMap<FileName, FileDefs>) -> Self {
        Self {
            files: defs.values().collect(),
        }
    }

    pub fn study_count(&self) -> usize {
        self.files.iter().map(|d| d.studies.len()).sum()
    }

    pub fn contains(&self, def_type: DefType, name: &str) -> bool {
        self.files
            .iter()
            .any(|d| d.of_kind(def_type).iter().any(|def| def.name == name))
    }
}
