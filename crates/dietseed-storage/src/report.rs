//! Outcome of a bulk load.

use dietseed_dataset::EntityKind;
use serde::Serialize;

use crate::Engine;

/// One relationship that could not be created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeFailure {
    /// 1-based position in the relationship list.
    pub index: usize,
    pub relationship: String,
    pub statement: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub engine: Engine,
    /// Records inserted per kind, in load order.
    pub inserted: Vec<(EntityKind, usize)>,
    /// Relationship statements issued (graph store only).
    pub relationships_attempted: usize,
    /// Edges created (graph store only).
    pub edges_created: usize,
    pub edge_failures: Vec<EdgeFailure>,
}

impl LoadReport {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            inserted: Vec::new(),
            relationships_attempted: 0,
            edges_created: 0,
            edge_failures: Vec::new(),
        }
    }

    pub fn records_inserted(&self) -> usize {
        self.inserted.iter().map(|(_, n)| n).sum()
    }

    pub fn inserted_for(&self, kind: EntityKind) -> Option<usize> {
        self.inserted
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, n)| *n)
    }

    /// True when every relationship statement created its edges.
    pub fn is_complete(&self) -> bool {
        self.edge_failures.is_empty()
    }
}
