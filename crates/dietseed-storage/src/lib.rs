//! Dietseed storage layer
//!
//! Seeds the graph store (Neo4j) and the document store (MongoDB) with the
//! same dataset and exports their contents:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        ORCHESTRATOR                           │
//! ├───────────────────────────────────────────────────────────────┤
//! │                                                               │
//! │   probe ──► Neo4j ready? ──► probe ──► MongoDB ready?         │
//! │                                              │                │
//! │                 ┌────────────────────────────┘                │
//! │                 ▼                                             │
//! │   ┌──────────────────────┐      ┌──────────────────────┐      │
//! │   │  graph loader        │      │  document loader     │      │
//! │   │  wipe, nodes, edges  │      │  drop, insert_many   │      │
//! │   └──────────────────────┘      └──────────────────────┘      │
//! │                 │                          │                  │
//! │                 └──────────► summary ◄─────┘                  │
//! │                                                               │
//! └───────────────────────────────────────────────────────────────┘
//!
//!   dump exporter:  docker ps ──► docker exec <dump> ──► docker cp
//! ```
//!
//! ## Failure policy
//!
//! - **Readiness**: bounded retries, then the run aborts before any write
//! - **Records**: an insert failure aborts that store's load
//! - **Relationships**: a failing edge is logged and counted, loading continues
//! - **Dumps**: a failing target does not stop the other one

pub mod config;
pub mod cypher;
pub mod document;
pub mod dump;
pub mod error;
pub mod graph;
pub mod orchestrator;
pub mod report;
pub mod retry;
pub mod verify;

#[cfg(test)]
mod testing;

pub use config::{DocumentConfig, DumpConfig, GraphConfig, SeedConfig};
pub use document::{DocumentStore, MongoStore};
pub use dump::{ContainerRuntime, DockerCli, DumpArtifact, DumpExporter};
pub use error::{ConfigError, DumpError, LoadError, SeedError, StoreError};
pub use graph::{GraphStore, Neo4jStore};
pub use orchestrator::{EngineOutcome, MongoSeeder, Neo4jSeeder, Orchestrator, SeedSummary, Seeder};
pub use report::{EdgeFailure, LoadReport};
pub use retry::{retry, retry_until, RetryExhausted, RetryPolicy};
pub use verify::{Check, Expectation, VerifyReport};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Graph,
    Document,
}

impl Engine {
    pub const ALL: [Engine; 2] = [Engine::Graph, Engine::Document];

    /// Product name, as shown in logs and summaries.
    pub fn product(self) -> &'static str {
        match self {
            Engine::Graph => "Neo4j",
            Engine::Document => "MongoDB",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.product())
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graph" | "neo4j" => Ok(Engine::Graph),
            "document" | "doc" | "mongo" | "mongodb" => Ok(Engine::Document),
            other => Err(format!("unknown store `{other}` (expected graph or document)")),
        }
    }
}

/// Which stores a command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    Graph,
    Document,
    #[default]
    Both,
}

impl Selection {
    pub fn engines(self) -> Vec<Engine> {
        match self {
            Selection::Graph => vec![Engine::Graph],
            Selection::Document => vec![Engine::Document],
            Selection::Both => Engine::ALL.to_vec(),
        }
    }
}

impl FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" | "all" => Ok(Selection::Both),
            other => match other.parse::<Engine>() {
                Ok(Engine::Graph) => Ok(Selection::Graph),
                Ok(Engine::Document) => Ok(Selection::Document),
                Err(_) => Err(format!(
                    "unknown selection `{other}` (expected graph, document or both)"
                )),
            },
        }
    }
}

impl From<Engine> for Selection {
    fn from(engine: Engine) -> Self {
        match engine {
            Engine::Graph => Selection::Graph,
            Engine::Document => Selection::Document,
        }
    }
}
