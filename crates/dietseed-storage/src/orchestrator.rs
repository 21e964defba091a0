//! Probe both stores, then load both, then summarize.

use async_trait::async_trait;
use dietseed_dataset::Dataset;
use std::time::Duration;

use crate::config::{DocumentConfig, GraphConfig, SeedConfig};
use crate::error::{LoadError, SeedError};
use crate::report::LoadReport;
use crate::retry::{RetryExhausted, RetryPolicy};
use crate::{document, graph, Engine, Selection};

/// Readiness and loading for one store.
#[async_trait]
pub trait Seeder: Send + Sync {
    fn engine(&self) -> Engine;

    async fn wait_ready(&self) -> Result<(), RetryExhausted>;

    async fn load(&self, dataset: &Dataset) -> Result<LoadReport, LoadError>;
}

pub struct Neo4jSeeder {
    config: GraphConfig,
    policy: RetryPolicy,
    timeout: Duration,
}

impl Neo4jSeeder {
    pub fn from_config(config: &SeedConfig) -> Self {
        Self {
            config: config.graph.clone(),
            policy: config.readiness,
            timeout: config.operation_timeout,
        }
    }
}

#[async_trait]
impl Seeder for Neo4jSeeder {
    fn engine(&self) -> Engine {
        Engine::Graph
    }

    async fn wait_ready(&self) -> Result<(), RetryExhausted> {
        graph::wait_until_ready(&self.config, &self.policy, self.timeout).await
    }

    async fn load(&self, dataset: &Dataset) -> Result<LoadReport, LoadError> {
        graph::connect_and_load(&self.config, self.timeout, dataset).await
    }
}

pub struct MongoSeeder {
    config: DocumentConfig,
    policy: RetryPolicy,
    timeout: Duration,
}

impl MongoSeeder {
    pub fn from_config(config: &SeedConfig) -> Self {
        Self {
            config: config.document.clone(),
            policy: config.readiness,
            timeout: config.operation_timeout,
        }
    }
}

#[async_trait]
impl Seeder for MongoSeeder {
    fn engine(&self) -> Engine {
        Engine::Document
    }

    async fn wait_ready(&self) -> Result<(), RetryExhausted> {
        document::wait_until_ready(&self.config, &self.policy, self.timeout).await
    }

    async fn load(&self, dataset: &Dataset) -> Result<LoadReport, LoadError> {
        document::connect_and_load(&self.config, self.timeout, dataset).await
    }
}

/// How one store's load ended.
#[derive(Debug)]
pub struct EngineOutcome {
    pub engine: Engine,
    pub result: Result<LoadReport, LoadError>,
}

impl EngineOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub outcomes: Vec<EngineOutcome>,
}

impl SeedSummary {
    /// True when every store loaded. Relationship failures inside a load
    /// do not count against it.
    pub fn is_success(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(EngineOutcome::succeeded)
    }

    pub fn outcome(&self, engine: Engine) -> Option<&EngineOutcome> {
        self.outcomes.iter().find(|o| o.engine == engine)
    }
}

pub struct Orchestrator {
    seeders: Vec<Box<dyn Seeder>>,
}

impl Orchestrator {
    pub fn new(seeders: Vec<Box<dyn Seeder>>) -> Self {
        Self { seeders }
    }

    /// Seeders for the selected stores, graph first.
    pub fn from_config(config: &SeedConfig, selection: Selection) -> Self {
        let seeders = selection
            .engines()
            .into_iter()
            .map(|engine| -> Box<dyn Seeder> {
                match engine {
                    Engine::Graph => Box::new(Neo4jSeeder::from_config(config)),
                    Engine::Document => Box::new(MongoSeeder::from_config(config)),
                }
            })
            .collect();
        Self::new(seeders)
    }

    pub fn engines(&self) -> Vec<Engine> {
        self.seeders.iter().map(|s| s.engine()).collect()
    }

    /// Wait for every store in turn; the first one that never becomes ready
    /// ends the check.
    pub async fn wait_ready(&self) -> Result<(), SeedError> {
        for seeder in &self.seeders {
            let engine = seeder.engine();
            tracing::info!(store = %engine, "waiting for store");
            seeder
                .wait_ready()
                .await
                .map_err(|exhausted| SeedError::NotReady {
                    engine,
                    attempts: exhausted.attempts,
                    last_error: exhausted.last_error,
                })?;
        }
        Ok(())
    }

    /// Readiness for every store, without stopping at the first failure.
    pub async fn probe_each(&self) -> Vec<(Engine, Result<(), RetryExhausted>)> {
        let mut results = Vec::with_capacity(self.seeders.len());
        for seeder in &self.seeders {
            results.push((seeder.engine(), seeder.wait_ready().await));
        }
        results
    }

    /// Probe every store, abort if any is unreachable, then load each one.
    ///
    /// A failed load does not stop the next store from loading; the summary
    /// carries every outcome.
    pub async fn run(&self, dataset: &Dataset) -> Result<SeedSummary, SeedError> {
        if let Err(err) = self.wait_ready().await {
            tracing::error!(error = %err, "aborting before any load");
            return Err(err);
        }

        let mut summary = SeedSummary::default();
        for seeder in &self.seeders {
            let engine = seeder.engine();
            tracing::info!(store = %engine, "loading");
            let result = seeder.load(dataset).await;
            match &result {
                Ok(report) => tracing::info!(
                    store = %engine,
                    records = report.records_inserted(),
                    edges = report.edges_created,
                    edge_failures = report.edge_failures.len(),
                    "load finished"
                ),
                Err(err) => tracing::error!(store = %engine, error = %err, "load failed"),
            }
            summary.outcomes.push(EngineOutcome { engine, result });
        }
        Ok(summary)
    }
}
