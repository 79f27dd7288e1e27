//! Config facts produced by the builder phases and the state they fold into.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::diagnostics::Diagnostic;
use super::model::{
    Codelist, CompilationResult, Dataset, DatasetMapping, Domain, Interface, Milestone, Study,
};

/// A single fact emitted by a builder phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    Study(Study),
    Milestone(Milestone),
    Codelist(Codelist),
    Interface(Interface),
    Domain { name: SmolStr, abbr: Option<String> },
    Dataset { domain: SmolStr, dataset: Dataset },
    /// Mapping instances for a dataset, kept apart from the dataset itself
    Mappings {
        dataset: SmolStr,
        mappings: Vec<DatasetMapping>,
    },
    Diagnostic(Diagnostic),
}

/// Everything the config phases have resolved so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigState {
    pub study: Option<Study>,
    pub milestones: IndexMap<SmolStr, Milestone>,
    pub codelists: IndexMap<SmolStr, Codelist>,
    pub interfaces: IndexMap<SmolStr, Interface>,
    pub domains: IndexMap<SmolStr, Domain>,
    /// Dataset name to owning domain
    dataset_domains: FxHashMap<SmolStr, SmolStr>,
    pub mappings: IndexMap<SmolStr, Vec<DatasetMapping>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ConfigState {
    /// Fold one event into the state. The first definition of a name wins.
    pub fn apply(mut self, event: &ConfigEvent) -> Self {
        match event {
            ConfigEvent::Study(study) => {
                if self.study.is_none() {
                    self.study = Some(study.clone());
                }
            }
            ConfigEvent::Milestone(milestone) => {
                self.milestones
                    .entry(milestone.name().clone())
                    .or_insert_with(|| milestone.clone());
            }
            ConfigEvent::Codelist(codelist) => {
                self.codelists
                    .entry(codelist.name.clone())
                    .or_insert_with(|| codelist.clone());
            }
            ConfigEvent::Interface(interface) => {
                self.interfaces
                    .entry(interface.name.clone())
                    .or_insert_with(|| interface.clone());
            }
            ConfigEvent::Domain { name, abbr } => {
                let domain = self.domains.entry(name.clone()).or_insert_with(|| Domain {
                    name: name.clone(),
                    abbr: None,
                    datasets: IndexMap::new(),
                });
                if domain.abbr.is_none() {
                    domain.abbr = abbr.clone();
                }
            }
            ConfigEvent::Dataset { domain, dataset } => {
                if !self.dataset_domains.contains_key(&dataset.name) {
                    if let Some(owner) = self.domains.get_mut(domain) {
                        owner.datasets.insert(dataset.name.clone(), dataset.clone());
                        self.dataset_domains
                            .insert(dataset.name.clone(), domain.clone());
                    }
                }
            }
            ConfigEvent::Mappings { dataset, mappings } => {
                self.mappings
                    .entry(dataset.clone())
                    .or_default()
                    .extend(mappings.iter().cloned());
            }
            ConfigEvent::Diagnostic(diagnostic) => self.diagnostics.push(diagnostic.clone()),
        }
        self
    }

    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        let domain = self.dataset_domains.get(name)?;
        self.domains.get(domain)?.datasets.get(name)
    }

    /// Assemble the public result, attaching mappings to their datasets.
    pub fn to_result(&self) -> CompilationResult {
        let mut domains = self.domains.clone();
        for domain in domains.values_mut() {
            for dataset in domain.datasets.values_mut() {
                if let Some(mappings) = self.mappings.get(&dataset.name) {
                    dataset.mappings = mappings.clone();
                }
            }
        }
        CompilationResult {
            study: self.study.clone(),
            milestones: self.milestones.clone(),
            codelists: self.codelists.clone(),
            domains,
        }
    }
}

/// Where builder phases read resolved names from and send their output.
pub trait ConfigSink {
    fn state(&self) -> &ConfigState;
    fn emit(&mut self, event: ConfigEvent);
}

impl ConfigSink for ConfigState {
    fn state(&self) -> &ConfigState {
        self
    }

    fn emit(&mut self, event: ConfigEvent) {
        *self = std::mem::take(self).apply(&event);
    }
}
