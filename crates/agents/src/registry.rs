// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static name -> constructor registry for agents.
//!
//! Names are hierarchical; the prefix identifies the phase family. The
//! table is built once at startup, so an unknown name is a configuration
//! error, not a runtime surprise.

use crate::Agent;
use std::collections::BTreeMap;
use std::sync::Arc;

type Constructor = Box<dyn Fn() -> Arc<dyn Agent> + Send + Sync>;

/// Lookup table from agent name to constructor.
pub struct AgentRegistry {
    table: BTreeMap<&'static str, Constructor>,
}

impl AgentRegistry {
    pub fn empty() -> Self {
        Self { table: BTreeMap::new() }
    }

    /// Registry with every built-in agent.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();

        registry.register("discovery.access_gatekeeper", || {
            Arc::new(crate::discovery::AccessGatekeeper)
        });
        registry.register("discovery.site_mapper", || Arc::new(crate::discovery::SiteMapper));
        registry.register("discovery.link_crawler", || Arc::new(crate::discovery::LinkCrawler));
        registry.register("discovery.page_classifier", || {
            Arc::new(crate::discovery::PageClassifier)
        });

        registry.register("extraction.html_parser", || Arc::new(crate::extraction::HtmlParser));
        registry.register("extraction.event_extractor", || {
            Arc::new(crate::extraction::EventExtractor)
        });
        registry.register("extraction.event_participant_extractor", || {
            Arc::new(crate::extraction::ParticipantExtractor)
        });

        registry.register("enrichment.firmographic", || {
            Arc::new(crate::enrichment::Firmographic)
        });
        registry.register("enrichment.tech_stack", || Arc::new(crate::enrichment::TechStack));
        registry.register("enrichment.contact_finder", || {
            Arc::new(crate::enrichment::ContactFinder)
        });

        registry.register("validation.dedupe", || Arc::new(crate::validation::Dedupe));
        registry.register("validation.crossref", || Arc::new(crate::validation::CrossRef));
        registry.register("validation.scorer", || Arc::new(crate::validation::Scorer));
        registry.register("validation.entity_resolver", || {
            Arc::new(crate::validation::EntityResolver)
        });

        registry.register("intelligence.competitor_signal_miner", || {
            Arc::new(crate::intelligence::SignalMiner)
        });
        registry.register("intelligence.relationship_graph_builder", || {
            Arc::new(crate::intelligence::GraphBuilder)
        });

        registry.register("export.export_activation", || Arc::new(crate::export::ExportActivation));
        registry.register("monitoring.source_monitor", || {
            Arc::new(crate::monitoring::SourceMonitor)
        });

        registry
    }

    pub fn register(
        &mut self,
        name: &'static str,
        constructor: impl Fn() -> Arc<dyn Agent> + Send + Sync + 'static,
    ) {
        self.table.insert(name, Box::new(constructor));
    }

    /// Instantiate an agent by name. `None` means configuration error.
    pub fn create(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.table.get(name).map(|constructor| constructor())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.table.keys().copied().collect()
    }

    /// Names belonging to one phase family (`discovery`, `extraction`, ...).
    pub fn family(&self, prefix: &str) -> Vec<&'static str> {
        self.table
            .keys()
            .filter(|name| name.split('.').next() == Some(prefix))
            .copied()
            .collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
