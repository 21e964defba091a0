//! In-memory stand-ins for the stores and the container runtime.

use async_trait::async_trait;
use bson::{Bson, Document};
use dietseed_dataset::Dataset;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cypher;
use crate::document::DocumentStore;
use crate::dump::ContainerRuntime;
use crate::error::{DumpError, LoadError, StoreError};
use crate::graph::GraphStore;
use crate::orchestrator::Seeder;
use crate::report::LoadReport;
use crate::retry::{retry, RetryExhausted, RetryPolicy};
use crate::Engine;

fn between<'a>(text: &'a str, start: &str, stops: &[char]) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let rest = &text[from..];
    let end = rest.find(|c| stops.contains(&c)).unwrap_or(rest.len());
    Some(&rest[..end])
}

// ============================================================================
// Graph
// ============================================================================

#[derive(Default)]
struct GraphState {
    statements: Vec<String>,
    nodes: BTreeMap<String, i64>,
    edges: BTreeMap<String, i64>,
    ids: BTreeSet<String>,
}

fn node_key(pattern: &str) -> Option<String> {
    let label = between(pattern, ":", &[' ', ')'])?;
    let id = between(pattern, "{id: ", &[',', '}'])?;
    Some(format!("{label} {id}"))
}

/// Interprets just enough of the rendered Cypher to keep node and edge
/// counts per label and type.
#[derive(Default)]
pub struct FakeGraph {
    state: Mutex<GraphState>,
    fail_on: Option<String>,
    unmatched_on: Option<String>,
}

impl FakeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements containing `needle` fail with a request error.
    pub fn failing_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_on = Some(needle.into());
        self
    }

    /// Relationship statements containing `needle` match no endpoints.
    pub fn unmatched_on(mut self, needle: impl Into<String>) -> Self {
        self.unmatched_on = Some(needle.into());
        self
    }

    pub fn statements(&self) -> Vec<String> {
        self.state.lock().unwrap().statements.clone()
    }

    pub fn node_count(&self, label: &str) -> i64 {
        self.state.lock().unwrap().nodes.get(label).copied().unwrap_or(0)
    }

    pub fn edge_count(&self, rel_type: &str) -> i64 {
        self.state.lock().unwrap().edges.get(rel_type).copied().unwrap_or(0)
    }

    fn record(&self, statement: &str) -> Result<(), StoreError> {
        self.state
            .lock()
            .unwrap()
            .statements
            .push(statement.to_string());
        match &self.fail_on {
            Some(needle) if statement.contains(needle.as_str()) => {
                Err(StoreError::request(Engine::Graph, "Neo.ClientError.Statement.SyntaxError"))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl GraphStore for FakeGraph {
    async fn run(&self, statement: &str) -> Result<(), StoreError> {
        self.record(statement)?;
        let mut state = self.state.lock().unwrap();
        if statement == cypher::WIPE {
            state.nodes.clear();
            state.edges.clear();
            state.ids.clear();
            return Ok(());
        }
        for line in statement.lines() {
            if let Some(label) = between(line, ":", &[' ', ')']) {
                if line.starts_with("CREATE (") {
                    *state.nodes.entry(label.to_string()).or_default() += 1;
                    if let Some(key) = node_key(line) {
                        state.ids.insert(key);
                    }
                }
            }
        }
        Ok(())
    }

    async fn fetch_i64(&self, statement: &str, column: &str) -> Result<i64, StoreError> {
        self.record(statement)?;
        let mut state = self.state.lock().unwrap();

        if statement == cypher::LIVENESS {
            return Ok(1);
        }
        if let Some(create) = statement.lines().find(|l| l.starts_with("CREATE ")) {
            assert_eq!(column, "created");
            if matches!(&self.unmatched_on, Some(n) if statement.contains(n.as_str())) {
                return Ok(0);
            }
            // MATCH yields no row when any endpoint is missing.
            let matched = statement
                .lines()
                .find(|l| l.starts_with("MATCH "))
                .map(|m| {
                    m.split("), (")
                        .all(|p| node_key(p).is_some_and(|k| state.ids.contains(&k)))
                })
                .unwrap_or(true);
            if !matched {
                return Ok(0);
            }
            let mut rest = create;
            while let Some(rel_type) = between(rest, "-[:", &[' ', ']']) {
                *state.edges.entry(rel_type.to_string()).or_default() += 1;
                let at = rest.find("-[:").unwrap_or(0) + 3;
                rest = &rest[at..];
            }
            return Ok(1);
        }
        if let Some(rel_type) = between(statement, "[r:", &[']']) {
            return Ok(state.edges.get(rel_type).copied().unwrap_or(0));
        }
        if let Some(label) = between(statement, "(n:", &[')']) {
            return Ok(state.nodes.get(label).copied().unwrap_or(0));
        }
        Err(StoreError::UnexpectedResult {
            engine: Engine::Graph,
            message: format!("fake cannot answer `{statement}`"),
        })
    }
}

// ============================================================================
// Documents
// ============================================================================

#[derive(Default)]
pub struct FakeDocuments {
    collections: Mutex<BTreeMap<String, Vec<Document>>>,
    calls: Mutex<Vec<String>>,
    fail_insert: Option<String>,
}

impl FakeDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts into `collection` fail.
    pub fn failing_insert(mut self, collection: impl Into<String>) -> Self {
        self.fail_insert = Some(collection.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn seed_collection(&self, collection: &str, docs: Vec<Document>) {
        self.collections
            .lock()
            .unwrap()
            .insert(collection.to_string(), docs);
    }

    fn call(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DocumentStore for FakeDocuments {
    async fn drop_all(&self) -> Result<usize, StoreError> {
        self.call("drop_all".to_string());
        let mut collections = self.collections.lock().unwrap();
        let dropped = collections.len();
        collections.clear();
        Ok(dropped)
    }

    async fn insert_many(
        &self,
        collection: &str,
        docs: Vec<Document>,
    ) -> Result<usize, StoreError> {
        self.call(format!("insert_many {collection}"));
        if self.fail_insert.as_deref() == Some(collection) {
            return Err(StoreError::request(
                Engine::Document,
                "E11000 duplicate key error",
            ));
        }
        let count = docs.len();
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .extend(docs);
        Ok(count)
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        self.call(format!("count {collection}"));
        Ok(self.documents(collection).len() as u64)
    }

    /// Understands a leading `$lookup` whose matches must be non-empty.
    async fn aggregate_count(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<u64, StoreError> {
        self.call(format!("aggregate {collection}"));
        let docs = self.documents(collection);
        let Some(lookup) = pipeline.iter().find_map(|s| s.get_document("$lookup").ok()) else {
            return Ok(docs.len() as u64);
        };
        let field = |key: &str| lookup.get_str(key).unwrap_or_default().to_string();
        let (from, local, foreign) = (field("from"), field("localField"), field("foreignField"));
        let targets: Vec<Bson> = self
            .documents(&from)
            .iter()
            .filter_map(|d| d.get(&foreign).cloned())
            .collect();
        Ok(docs
            .iter()
            .filter(|d| d.get(&local).is_some_and(|v| targets.contains(v)))
            .count() as u64)
    }
}

// ============================================================================
// Container runtime
// ============================================================================

#[derive(Default)]
pub struct FakeRuntime {
    running: Vec<String>,
    failing_exec: Vec<String>,
    failing_copy: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeRuntime {
    pub fn running(containers: &[&str]) -> Self {
        Self {
            running: containers.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_exec(mut self, container: &str) -> Self {
        self.failing_exec.push(container.to_string());
        self
    }

    pub fn failing_copy(mut self, container: &str) -> Self {
        self.failing_copy.push(container.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn call(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn is_running(&self, container: &str) -> Result<bool, DumpError> {
        self.call(format!("ps {container}"));
        Ok(self.running.iter().any(|c| c == container))
    }

    async fn exec(&self, container: &str, command: &[String]) -> Result<(), DumpError> {
        let line = format!("exec {container} {}", command.join(" "));
        self.call(line.clone());
        if self.failing_exec.iter().any(|c| c == container) {
            return Err(DumpError::CommandFailed {
                command: line,
                status: "exit status: 1".to_string(),
                stderr: "database is in use".to_string(),
            });
        }
        Ok(())
    }

    /// Creates a file for `.dump` sources and a directory otherwise.
    async fn copy_out(
        &self,
        container: &str,
        source: &str,
        destination: &Path,
    ) -> Result<(), DumpError> {
        let line = format!("cp {container}:{source} {}", destination.display());
        self.call(line.clone());
        if self.failing_copy.iter().any(|c| c == container) {
            return Err(DumpError::CommandFailed {
                command: line,
                status: "exit status: 1".to_string(),
                stderr: "no such file or directory".to_string(),
            });
        }
        let created = if source.ends_with(".dump") {
            std::fs::write(destination, b"dump")
        } else {
            std::fs::create_dir_all(destination)
        };
        created.map_err(|source| DumpError::OutputDir {
            path: destination.to_path_buf(),
            source,
        })
    }
}

// ============================================================================
// Seeder
// ============================================================================

/// A seeder whose readiness and load outcome are fixed up front.
pub struct FakeSeeder {
    engine: Engine,
    ready: bool,
    fail_load: bool,
    pub probes: Arc<AtomicU32>,
    pub loads: Arc<AtomicU32>,
}

impl FakeSeeder {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            ready: true,
            fail_load: false,
            probes: Arc::new(AtomicU32::new(0)),
            loads: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn unreachable(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }
}

#[async_trait]
impl Seeder for FakeSeeder {
    fn engine(&self) -> Engine {
        self.engine
    }

    async fn wait_ready(&self) -> Result<(), RetryExhausted> {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        retry(&policy, self.engine.product(), |_| {
            self.probes.fetch_add(1, Ordering::SeqCst);
            let ready = self.ready;
            async move {
                if ready {
                    Ok(())
                } else {
                    Err("connection refused")
                }
            }
        })
        .await
    }

    async fn load(&self, dataset: &Dataset) -> Result<LoadReport, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_load {
            return Err(LoadError::Wipe(StoreError::request(
                self.engine,
                "not authorized",
            )));
        }
        let mut report = LoadReport::new(self.engine);
        for kind in dietseed_dataset::EntityKind::ALL {
            report.inserted.push((kind, dataset.count(kind)));
        }
        Ok(report)
    }
}
