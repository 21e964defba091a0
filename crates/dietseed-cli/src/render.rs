//! Human-readable tables for seeding, verification and dumps.

use colored::Colorize;
use dietseed_storage::dump::DumpArtifact;
use dietseed_storage::{DumpError, Engine, SeedSummary, VerifyReport};
use std::fmt::Write;

fn status(ok: bool) -> String {
    if ok {
        format!("{:<8}", "ok").green().bold().to_string()
    } else {
        format!("{:<8}", "FAILED").red().bold().to_string()
    }
}

/// One row per store, followed by any relationship failures.
pub fn summary(seeded: &SeedSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Seeding summary".bold());
    let _ = writeln!(
        out,
        "  {:<10}{:<8}{:>9}{:>8}{:>15}",
        "store", "status", "records", "edges", "edge failures"
    );

    for outcome in &seeded.outcomes {
        match &outcome.result {
            Ok(report) => {
                let edges = match outcome.engine {
                    Engine::Graph => report.edges_created.to_string(),
                    Engine::Document => "-".to_string(),
                };
                let _ = writeln!(
                    out,
                    "  {:<10}{}{:>9}{:>8}{:>15}",
                    outcome.engine.to_string(),
                    status(true),
                    report.records_inserted(),
                    edges,
                    report.edge_failures.len()
                );
            }
            Err(err) => {
                let _ = writeln!(
                    out,
                    "  {:<10}{}  {}",
                    outcome.engine.to_string(),
                    status(false),
                    err
                );
            }
        }
    }

    for outcome in &seeded.outcomes {
        let Ok(report) = &outcome.result else {
            continue;
        };
        for failure in &report.edge_failures {
            let _ = writeln!(
                out,
                "  {} #{} {}: {}",
                "→".yellow(),
                failure.index,
                failure.relationship,
                failure.error
            );
        }
    }
    out
}

pub fn checks(report: &VerifyReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Verification".bold());
    for check in &report.checks {
        let _ = writeln!(
            out,
            "  {}{:<10}{:<40} expected {:<6} got {}",
            status(check.passed),
            check.engine.to_string(),
            check.name,
            check.expected.to_string(),
            check.actual
        );
    }
    out
}

pub fn dumps(results: &[(Engine, Result<DumpArtifact, DumpError>)]) -> String {
    let mut out = String::new();
    for (engine, result) in results {
        match result {
            Ok(artifact) => {
                let _ = writeln!(
                    out,
                    "{} {:<8} {}",
                    "wrote".green().bold(),
                    engine.to_string(),
                    artifact.path.display().to_string().bold()
                );
            }
            Err(err) => {
                let _ = writeln!(
                    out,
                    "{} {:<8} {}",
                    "failed".red().bold(),
                    engine.to_string(),
                    err
                );
            }
        }
    }
    out
}
