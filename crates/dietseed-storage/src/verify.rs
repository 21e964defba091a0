//! Post-load checks: stored counts against the dataset, plus one
//! relationship check per store.

use dietseed_dataset::{Dataset, EntityKind, RelKind};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::config::SeedConfig;
use crate::cypher;
use crate::document::{self, DocumentStore, MongoStore};
use crate::error::StoreError;
use crate::graph::{GraphStore, Neo4jStore};
use crate::Engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Expectation {
    Exactly(u64),
    AtLeastOne,
}

impl Expectation {
    pub fn accepts(self, actual: u64) -> bool {
        match self {
            Expectation::Exactly(n) => actual == n,
            Expectation::AtLeastOne => actual > 0,
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Exactly(n) => write!(f, "= {n}"),
            Expectation::AtLeastOne => f.write_str("> 0"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Check {
    pub engine: Engine,
    pub name: String,
    pub expected: Expectation,
    pub actual: u64,
    pub passed: bool,
}

impl Check {
    fn new(engine: Engine, name: impl Into<String>, expected: Expectation, actual: u64) -> Self {
        Self {
            engine,
            name: name.into(),
            expected,
            actual,
            passed: expected.accepts(actual),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerifyReport {
    pub checks: Vec<Check>,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        !self.checks.is_empty() && self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

fn as_count(engine: Engine, raw: i64) -> Result<u64, StoreError> {
    u64::try_from(raw).map_err(|_| StoreError::UnexpectedResult {
        engine,
        message: format!("negative count {raw}"),
    })
}

/// Node counts per label, edge counts per type, and the
/// nutritionist-to-patient TREATS paths.
pub async fn check_graph(
    store: &dyn GraphStore,
    dataset: &Dataset,
) -> Result<Vec<Check>, StoreError> {
    let mut checks = Vec::new();
    for kind in EntityKind::ALL {
        let actual = store.fetch_i64(&cypher::count_nodes(kind), "count").await?;
        checks.push(Check::new(
            Engine::Graph,
            format!("{} nodes", kind.label()),
            Expectation::Exactly(dataset.count(kind) as u64),
            as_count(Engine::Graph, actual)?,
        ));
    }

    for rel in RelKind::ALL {
        let actual = store
            .fetch_i64(&cypher::count_relationships(rel), "count")
            .await?;
        checks.push(Check::new(
            Engine::Graph,
            format!("{} edges", rel.rel_type()),
            Expectation::Exactly(dataset.edge_count(rel) as u64),
            as_count(Engine::Graph, actual)?,
        ));
    }

    let treats = store
        .fetch_i64(
            &cypher::count_edges(EntityKind::Nutritionist, "TREATS", EntityKind::Patient),
            "count",
        )
        .await?;
    checks.push(Check::new(
        Engine::Graph,
        "Nutritionist-[TREATS]->Patient paths",
        Expectation::AtLeastOne,
        as_count(Engine::Graph, treats)?,
    ));
    Ok(checks)
}

/// Document counts per collection and the plans whose `patient_id`
/// resolves through `$lookup`.
pub async fn check_documents(
    store: &dyn DocumentStore,
    dataset: &Dataset,
) -> Result<Vec<Check>, StoreError> {
    let mut checks = Vec::new();
    for kind in EntityKind::ALL {
        let actual = store.count(kind.collection()).await?;
        checks.push(Check::new(
            Engine::Document,
            format!("{} documents", kind.collection()),
            Expectation::Exactly(dataset.count(kind) as u64),
            actual,
        ));
    }

    let joined = store
        .aggregate_count(
            EntityKind::DietPlan.collection(),
            document::plans_with_patient_pipeline(),
        )
        .await?;
    checks.push(Check::new(
        Engine::Document,
        "dietPlans joined to patients",
        Expectation::AtLeastOne,
        joined,
    ));
    Ok(checks)
}

/// Verify both stores, releasing each connection before returning.
pub async fn verify(config: &SeedConfig, dataset: &Dataset) -> Result<VerifyReport, StoreError> {
    let timeout: Duration = config.operation_timeout;
    let mut report = VerifyReport::default();

    let graph = Neo4jStore::connect(&config.graph, timeout).await?;
    let graph_checks = check_graph(&graph, dataset).await;
    graph.close();
    report.checks.extend(graph_checks?);

    let docs = MongoStore::connect(&config.document, timeout).await?;
    let doc_checks = check_documents(&docs, dataset).await;
    docs.close().await;
    report.checks.extend(doc_checks?);

    for check in report.failures() {
        tracing::warn!(
            store = %check.engine,
            check = %check.name,
            expected = %check.expected,
            actual = check.actual,
            "verification check failed"
        );
    }
    Ok(report)
}
