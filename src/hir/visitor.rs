//! Visitor over the typed AST.
//!
//! Implementors override the node kinds they care about; every other kind
//! falls through to a default that walks into its children or does nothing.

use crate::parser::{Codelist, Dataset, Domain, Interface, Item, Mapping, Milestone, SourceFile, Study};

pub trait ItemVisitor {
    fn visit_study(&mut self, _study: &Study) {}

    fn visit_milestone(&mut self, _milestone: &Milestone) {}

    fn visit_codelist(&mut self, _codelist: &Codelist) {}

    fn visit_interface(&mut self, _interface: &Interface) {}

    fn visit_domain(&mut self, domain: &Domain) {
        for dataset in domain.datasets() {
            self.visit_dataset(domain, &dataset);
        }
    }

    fn visit_dataset(&mut self, _domain: &Domain, _dataset: &Dataset) {}

    fn visit_mapping(&mut self, _mapping: &Mapping) {}
}

/// Dispatch every top-level item of a file in source order.
pub fn walk_file<V: ItemVisitor + ?Sized>(visitor: &mut V, file: &SourceFile) {
    for item in file.items() {
        walk_item(visitor, &item);
    }
}

pub fn walk_item<V: ItemVisitor + ?Sized>(visitor: &mut V, item: &Item) {
    match item {
        Item::Study(n) => visitor.visit_study(n),
        Item::Milestone(n) => visitor.visit_milestone(n),
        Item::Codelist(n) => visitor.visit_codelist(n),
        Item::Interface(n) => visitor.visit_interface(n),
        Item::Domain(n) => visitor.visit_domain(n),
        Item::Mapping(n) => visitor.visit_mapping(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[derive(Default)]
    struct Counter {
        datasets: Vec<String>,
        mappings: usize,
    }

    impl ItemVisitor for Counter {
        fn visit_dataset(&mut self, _domain: &Domain, dataset: &Dataset) {
            if let Some(name) = dataset.name() {
                self.datasets.push(name.text().to_string());
            }
        }

        fn visit_mapping(&mut self, _mapping: &Mapping) {
            self.mappings += 1;
        }
    }

    #[test]
    fn test_default_domain_visit_reaches_datasets() {
        let parse = parse(
            r#"
            domain "Demographics" @abbr("DM") { dataset DM {} dataset SUPPDM {} }
            map dataset DM {}
            "#,
        );
        let mut counter = Counter::default();
        walk_file(&mut counter, &parse.tree());
        assert_eq!(counter.datasets, ["DM", "SUPPDM"]);
        assert_eq!(counter.mappings, 1);
    }
}
