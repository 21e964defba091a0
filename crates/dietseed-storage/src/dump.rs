//! Export store contents with the stores' own dump tools.
//!
//! Each export checks the container is running, runs the dump inside it and
//! copies the artifact to `<destination>/neo4j` or `<destination>/mongodb`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use crate::config::{DocumentConfig, DumpConfig};
use crate::error::DumpError;
use crate::{Engine, Selection};

/// Where the graph dump tool writes inside its container.
pub const NEO4J_IMPORT_DIR: &str = "/var/lib/neo4j/import";
/// Name of the graph dump for the default `neo4j` database.
pub const NEO4J_DUMP_FILE: &str = "neo4j.dump";
/// Parent directory for document dumps inside the container.
pub const MONGO_DUMP_ROOT: &str = "/data/db";

/// Timestamp format used in artifact names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// The three container-runtime operations an export needs.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn is_running(&self, container: &str) -> Result<bool, DumpError>;

    async fn exec(&self, container: &str, command: &[String]) -> Result<(), DumpError>;

    /// Copy `source` (a path inside the container) to `destination` on the host.
    async fn copy_out(
        &self,
        container: &str,
        source: &str,
        destination: &Path,
    ) -> Result<(), DumpError>;
}

// ============================================================================
// Docker
// ============================================================================

/// Runs the `docker` executable (or a compatible one).
pub struct DockerCli {
    program: String,
    timeout: Duration,
}

impl DockerCli {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &DumpConfig) -> Self {
        Self::new(config.runtime.clone(), config.command_timeout)
    }

    async fn run(&self, args: &[String]) -> Result<Output, DumpError> {
        let command = display_command(&self.program, args);
        tracing::debug!(command = %command, "running container command");

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(args).kill_on_drop(true);
        let out = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| DumpError::Timeout {
                command: command.clone(),
                after: self.timeout,
            })?
            .map_err(|source| DumpError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !out.status.success() {
            return Err(DumpError::CommandFailed {
                command,
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn is_running(&self, container: &str) -> Result<bool, DumpError> {
        let args = strings(&["ps", "-q", "-f", &format!("name={container}")]);
        let out = self.run(&args).await?;
        Ok(!String::from_utf8_lossy(&out.stdout).trim().is_empty())
    }

    async fn exec(&self, container: &str, command: &[String]) -> Result<(), DumpError> {
        let mut args = strings(&["exec", container]);
        args.extend(command.iter().cloned());
        self.run(&args).await.map(|_| ())
    }

    async fn copy_out(
        &self,
        container: &str,
        source: &str,
        destination: &Path,
    ) -> Result<(), DumpError> {
        let args = vec![
            "cp".to_string(),
            format!("{container}:{source}"),
            destination.display().to_string(),
        ];
        self.run(&args).await.map(|_| ())
    }
}

fn strings(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Render a command line for logs and errors with passwords masked.
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut out = program.to_string();
    let mut mask_next = false;
    for arg in args {
        out.push(' ');
        if mask_next {
            out.push_str("****");
        } else {
            out.push_str(arg);
        }
        mask_next = arg == "--password";
    }
    out
}

// ============================================================================
// Exporter
// ============================================================================

/// A dump copied to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpArtifact {
    pub engine: Engine,
    pub path: PathBuf,
    pub timestamp: String,
}

pub struct DumpExporter<R> {
    runtime: R,
    dump: DumpConfig,
    document: DocumentConfig,
}

impl DumpExporter<DockerCli> {
    pub fn docker(dump: &DumpConfig, document: &DocumentConfig) -> Self {
        Self::new(DockerCli::from_config(dump), dump.clone(), document.clone())
    }
}

impl<R: ContainerRuntime> DumpExporter<R> {
    pub fn new(runtime: R, dump: DumpConfig, document: DocumentConfig) -> Self {
        Self {
            runtime,
            dump,
            document,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Export one store into `destination`, stamped with the local time.
    pub async fn export(
        &self,
        target: Engine,
        destination: &Path,
    ) -> Result<DumpArtifact, DumpError> {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.export_at(target, destination, &timestamp).await
    }

    /// [`export`](Self::export) with a fixed timestamp.
    pub async fn export_at(
        &self,
        target: Engine,
        destination: &Path,
        timestamp: &str,
    ) -> Result<DumpArtifact, DumpError> {
        let container = self.container(target);
        if !self.runtime.is_running(container).await? {
            return Err(DumpError::NotRunning {
                container: container.to_string(),
            });
        }

        let out_dir = destination.join(subdir(target));
        tokio::fs::create_dir_all(&out_dir)
            .await
            .map_err(|source| DumpError::OutputDir {
                path: out_dir.clone(),
                source,
            })?;

        let (command, source, name) = match target {
            Engine::Graph => (
                graph_dump_command(),
                format!("{NEO4J_IMPORT_DIR}/{NEO4J_DUMP_FILE}"),
                format!("neo4j_dump_{timestamp}.dump"),
            ),
            Engine::Document => {
                let name = format!("mongodb_dump_{timestamp}");
                let inner = format!("{MONGO_DUMP_ROOT}/{name}");
                (document_dump_command(&self.document, &inner)?, inner, name)
            }
        };

        tracing::info!(store = %target, container, "running dump");
        self.runtime.exec(container, &command).await?;

        let path = out_dir.join(name);
        self.runtime.copy_out(container, &source, &path).await?;
        tracing::info!(store = %target, path = %path.display(), "dump exported");

        Ok(DumpArtifact {
            engine: target,
            path,
            timestamp: timestamp.to_string(),
        })
    }

    /// Export every selected store. A failing target is logged and reported
    /// without stopping the others.
    pub async fn export_all(
        &self,
        selection: Selection,
        destination: &Path,
    ) -> Vec<(Engine, Result<DumpArtifact, DumpError>)> {
        let mut results = Vec::new();
        for engine in selection.engines() {
            let result = self.export(engine, destination).await;
            if let Err(err) = &result {
                tracing::error!(store = %engine, error = %err, "dump failed");
            }
            results.push((engine, result));
        }
        results
    }

    fn container(&self, target: Engine) -> &str {
        match target {
            Engine::Graph => &self.dump.graph_container,
            Engine::Document => &self.dump.document_container,
        }
    }
}

fn subdir(target: Engine) -> &'static str {
    match target {
        Engine::Graph => "neo4j",
        Engine::Document => "mongodb",
    }
}

/// `neo4j-admin database dump` into the import directory. The file name is
/// fixed by the tool, so an earlier dump there is replaced.
pub fn graph_dump_command() -> Vec<String> {
    strings(&[
        "neo4j-admin",
        "database",
        "dump",
        "neo4j",
        &format!("--to-path={NEO4J_IMPORT_DIR}"),
        "--overwrite-destination=true",
    ])
}

/// `mongodump` for the configured database, authenticating with the
/// credentials embedded in the connection URI when present.
pub fn document_dump_command(
    config: &DocumentConfig,
    out_path: &str,
) -> Result<Vec<String>, DumpError> {
    let uri = url::Url::parse(&config.uri).map_err(|e| DumpError::InvalidUri(e.to_string()))?;

    let mut command = vec!["mongodump".to_string()];
    if !uri.username().is_empty() {
        command.push("--username".to_string());
        command.push(uri.username().to_string());
        if let Some(password) = uri.password() {
            command.push("--password".to_string());
            command.push(password.to_string());
        }
        command.push("--authenticationDatabase".to_string());
        command.push("admin".to_string());
    }
    command.push("--db".to_string());
    command.push(config.database.clone());
    command.push(format!("--out={out_path}"));
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRuntime;

    fn exporter(runtime: FakeRuntime) -> DumpExporter<FakeRuntime> {
        DumpExporter::new(runtime, DumpConfig::default(), DocumentConfig::default())
    }

    #[test]
    fn test_document_command_uses_uri_credentials() {
        let cmd = document_dump_command(&DocumentConfig::default(), "/data/db/mongodb_dump_x")
            .unwrap();
        assert_eq!(
            cmd,
            strings(&[
                "mongodump",
                "--username",
                "admin",
                "--password",
                "senha123",
                "--authenticationDatabase",
                "admin",
                "--db",
                "diet_app",
                "--out=/data/db/mongodb_dump_x",
            ])
        );
    }

    #[test]
    fn test_document_command_without_credentials() {
        let config = DocumentConfig {
            uri: "mongodb://localhost:27017/".to_string(),
            ..DocumentConfig::default()
        };
        let cmd = document_dump_command(&config, "/out").unwrap();
        assert!(!cmd.contains(&"--username".to_string()));
        assert_eq!(cmd.last().map(String::as_str), Some("--out=/out"));
    }

    #[test]
    fn test_display_masks_password() {
        let args = strings(&["exec", "c", "mongodump", "--password", "senha123", "--db", "x"]);
        let shown = display_command("docker", &args);
        assert!(!shown.contains("senha123"));
        assert!(shown.contains("--password **** --db x"));
    }

    #[tokio::test]
    async fn test_graph_export_paths() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = exporter(FakeRuntime::running(&["diet_app_neo4j"]));

        let artifact = exporter
            .export_at(Engine::Graph, dir.path(), "20240101_120000")
            .await
            .unwrap();

        assert_eq!(
            artifact.path,
            dir.path().join("neo4j").join("neo4j_dump_20240101_120000.dump")
        );
        assert!(artifact.path.exists());

        let calls = exporter.runtime().calls();
        assert_eq!(
            calls[1],
            "exec diet_app_neo4j neo4j-admin database dump neo4j \
             --to-path=/var/lib/neo4j/import --overwrite-destination=true"
        );
        assert!(calls[2].starts_with("cp diet_app_neo4j:/var/lib/neo4j/import/neo4j.dump "));
    }

    #[tokio::test]
    async fn test_not_running_skips_dump() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = exporter(FakeRuntime::running(&[]));

        let err = exporter
            .export_at(Engine::Document, dir.path(), "ts")
            .await
            .unwrap_err();
        assert!(matches!(err, DumpError::NotRunning { ref container } if container == "diet_app_mongodb"));
        assert_eq!(exporter.runtime().calls().len(), 1);
        assert!(!dir.path().join("mongodb").exists());
    }

    #[tokio::test]
    async fn test_one_failed_target_does_not_stop_the_other() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = FakeRuntime::running(&["diet_app_neo4j", "diet_app_mongodb"])
            .failing_exec("diet_app_neo4j");
        let exporter = exporter(runtime);

        let results = exporter.export_all(Selection::Both, dir.path()).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, Engine::Graph);
        assert!(matches!(results[0].1, Err(DumpError::CommandFailed { .. })));

        let (engine, document) = &results[1];
        assert_eq!(*engine, Engine::Document);
        let artifact = document.as_ref().unwrap();
        assert!(artifact.path.starts_with(dir.path().join("mongodb")));
        assert!(artifact
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("mongodb_dump_"));
    }

    #[tokio::test]
    async fn test_repeated_graph_export_overwrites_container_dump() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = exporter(FakeRuntime::running(&["diet_app_neo4j"]));

        let first = exporter
            .export_at(Engine::Graph, dir.path(), "20240101_120000")
            .await
            .unwrap();
        let second = exporter
            .export_at(Engine::Graph, dir.path(), "20240101_130000")
            .await
            .unwrap();
        assert_ne!(first.path, second.path);
        assert!(first.path.exists() && second.path.exists());

        let execs: Vec<String> = exporter
            .runtime()
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("exec "))
            .collect();
        let expected = format!(
            "exec diet_app_neo4j {}",
            graph_dump_command().join(" ")
        );
        assert_eq!(execs, vec![expected.clone(), expected]);
        assert!(execs[0].ends_with("--overwrite-destination=true"));
    }

    #[tokio::test]
    async fn test_failed_copy_aborts_only_that_target() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = FakeRuntime::running(&["diet_app_neo4j", "diet_app_mongodb"])
            .failing_copy("diet_app_neo4j");
        let exporter = exporter(runtime);

        let results = exporter.export_all(Selection::Both, dir.path()).await;
        assert_eq!(results.len(), 2);
        match &results[0] {
            (Engine::Graph, Err(DumpError::CommandFailed { command, .. })) => {
                assert!(command.starts_with("cp diet_app_neo4j:"));
            }
            other => panic!("unexpected graph result: {other:?}"),
        }
        let no_graph_files = std::fs::read_dir(dir.path().join("neo4j"))
            .unwrap()
            .next()
            .is_none();
        assert!(no_graph_files);

        let (engine, document) = &results[1];
        assert_eq!(*engine, Engine::Document);
        assert!(document.as_ref().unwrap().path.exists());
    }
}
