//! Graph store: Neo4j connection, readiness probe and bulk loader.

use async_trait::async_trait;
use dietseed_dataset::{Dataset, EntityKind};
use std::future::Future;
use std::time::Duration;

use crate::config::GraphConfig;
use crate::cypher;
use crate::error::{LoadError, StoreError};
use crate::report::{EdgeFailure, LoadReport};
use crate::retry::{retry_until, RetryExhausted, RetryPolicy};
use crate::Engine;

/// Relationship progress is logged every this many statements.
pub const PROGRESS_EVERY: usize = 10;

/// The subset of a Cypher session the loader and verifier need.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Run a statement, discarding any rows.
    async fn run(&self, statement: &str) -> Result<(), StoreError>;

    /// Run a statement and read an integer column from its first row.
    async fn fetch_i64(&self, statement: &str, column: &str) -> Result<i64, StoreError>;
}

// ============================================================================
// Neo4j
// ============================================================================

pub struct Neo4jStore {
    graph: neo4rs::Graph,
    timeout: Duration,
}

impl Neo4jStore {
    pub async fn connect(config: &GraphConfig, timeout: Duration) -> Result<Self, StoreError> {
        let graph = with_timeout(
            timeout,
            neo4rs::Graph::new(
                config.uri.as_str(),
                config.user.as_str(),
                config.password.as_str(),
            ),
        )
        .await?
        .map_err(|e| StoreError::connect(Engine::Graph, e))?;
        Ok(Self { graph, timeout })
    }

    /// Release the connection pool.
    pub fn close(self) {
        drop(self.graph);
    }
}

async fn with_timeout<F: Future>(after: Duration, fut: F) -> Result<F::Output, StoreError> {
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| StoreError::Timeout {
            engine: Engine::Graph,
            after,
        })
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn run(&self, statement: &str) -> Result<(), StoreError> {
        with_timeout(self.timeout, self.graph.run(neo4rs::query(statement)))
            .await?
            .map_err(|e| StoreError::request(Engine::Graph, e))
    }

    async fn fetch_i64(&self, statement: &str, column: &str) -> Result<i64, StoreError> {
        let fetch = async {
            let mut rows = self
                .graph
                .execute(neo4rs::query(statement))
                .await
                .map_err(|e| StoreError::request(Engine::Graph, e))?;
            let row = rows
                .next()
                .await
                .map_err(|e| StoreError::request(Engine::Graph, e))?
                .ok_or_else(|| StoreError::UnexpectedResult {
                    engine: Engine::Graph,
                    message: "query returned no rows".to_string(),
                })?;
            row.get::<i64>(column)
                .map_err(|e| StoreError::UnexpectedResult {
                    engine: Engine::Graph,
                    message: format!("column `{column}`: {e}"),
                })
        };
        with_timeout(self.timeout, fetch).await?
    }
}

// ============================================================================
// Readiness
// ============================================================================

/// One liveness round-trip on a fresh connection, closed before returning.
pub async fn probe_once(config: &GraphConfig, timeout: Duration) -> Result<i64, StoreError> {
    let store = Neo4jStore::connect(config, timeout).await?;
    let num = store.fetch_i64(cypher::LIVENESS, "num").await;
    store.close();
    num
}

/// Poll the graph store until `RETURN 1` answers 1.
pub async fn wait_until_ready(
    config: &GraphConfig,
    policy: &RetryPolicy,
    timeout: Duration,
) -> Result<(), RetryExhausted> {
    retry_until(
        policy,
        "Neo4j",
        |_| probe_once(config, timeout),
        |num| *num == 1,
    )
    .await?;
    tracing::info!(uri = %config.uri, "Neo4j connection established");
    Ok(())
}

// ============================================================================
// Bulk load
// ============================================================================

/// Wipe the graph, create every node kind in one statement each, then create
/// relationships one statement at a time.
///
/// Node failures abort the load. Relationship failures, including
/// statements whose endpoints did not match, are logged and collected in
/// the report.
pub async fn load(store: &dyn GraphStore, dataset: &Dataset) -> Result<LoadReport, LoadError> {
    let mut report = LoadReport::new(Engine::Graph);

    store.run(cypher::WIPE).await.map_err(LoadError::Wipe)?;
    tracing::info!("graph store cleared");

    for kind in EntityKind::ALL {
        let Some(statement) = cypher::create_nodes(dataset, kind) else {
            continue;
        };
        store
            .run(&statement)
            .await
            .map_err(|source| LoadError::Insert { kind, source })?;
        let count = dataset.count(kind);
        tracing::info!(kind = %kind, count, "nodes created");
        report.inserted.push((kind, count));
    }

    let total = dataset.relationships.len();
    for (i, rel) in dataset.relationships.iter().enumerate() {
        let index = i + 1;
        let statement = cypher::create_relationship(rel);
        report.relationships_attempted += 1;

        let outcome = match store.fetch_i64(&statement, "created").await {
            Ok(created) if created > 0 => Ok(()),
            Ok(_) => Err("endpoint nodes not found".to_string()),
            Err(err) => Err(err.to_string()),
        };

        match outcome {
            Ok(()) => report.edges_created += rel.edges().len(),
            Err(error) => {
                tracing::error!(
                    index,
                    relationship = %rel,
                    statement = %statement,
                    error = %error,
                    "failed to create relationship #{index}"
                );
                report.edge_failures.push(EdgeFailure {
                    index,
                    relationship: rel.describe(),
                    statement,
                    error,
                });
            }
        }

        if index % PROGRESS_EVERY == 0 {
            tracing::info!("created {index} of {total} relationships...");
        }
    }

    tracing::info!(
        attempted = report.relationships_attempted,
        failed = report.edge_failures.len(),
        edges = report.edges_created,
        "relationships done"
    );
    Ok(report)
}

/// Connect, load and release the connection on every path.
pub async fn connect_and_load(
    config: &GraphConfig,
    timeout: Duration,
    dataset: &Dataset,
) -> Result<LoadReport, LoadError> {
    let store = Neo4jStore::connect(config, timeout).await?;
    let result = load(&store, dataset).await;
    store.close();
    result
}
