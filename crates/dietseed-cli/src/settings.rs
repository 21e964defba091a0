//! Effective configuration: defaults, then `--config`, then environment,
//! then command-line flags.

use anyhow::{Context, Result};
use dietseed_storage::SeedConfig;
use std::path::Path;
use std::time::Duration;

/// Flags that override single config fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub max_retries: Option<u32>,
    pub retry_interval_secs: Option<u64>,
}

pub fn load(file: Option<&Path>, overrides: Overrides) -> Result<SeedConfig> {
    layer(file, |key| std::env::var(key).ok(), overrides)
}

pub fn layer<F>(file: Option<&Path>, lookup: F, overrides: Overrides) -> Result<SeedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match file {
        Some(path) => SeedConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SeedConfig::default(),
    };
    config
        .apply_lookup(lookup)
        .context("reading environment overrides")?;

    if let Some(n) = overrides.max_retries {
        config.readiness.max_attempts = n;
    }
    if let Some(secs) = overrides.retry_interval_secs {
        config.readiness.delay = Duration::from_secs(secs);
    }
    config.validate()?;
    Ok(config)
}

/// Copy of `config` safe to print: passwords replaced with `****`.
pub fn redacted(config: &SeedConfig) -> SeedConfig {
    let mut shown = config.clone();
    if !shown.graph.password.is_empty() {
        shown.graph.password = "****".to_string();
    }
    if let Ok(mut uri) = url::Url::parse(&shown.document.uri) {
        if uri.password().is_some() && uri.set_password(Some("****")).is_ok() {
            shown.document.uri = uri.to_string();
        }
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_flags_override_environment() {
        let config = layer(
            None,
            env(&[("DIETSEED_MAX_RETRIES", "4"), ("MONGO_DB", "other")]),
            Overrides {
                max_retries: Some(2),
                retry_interval_secs: Some(1),
            },
        )
        .unwrap();

        assert_eq!(config.readiness.max_attempts, 2);
        assert_eq!(config.readiness.delay, Duration::from_secs(1));
        assert_eq!(config.document.database, "other");
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(
            &path,
            r#"{"graph": {"uri": "bolt://file:7687"}, "document": {"database": "from_file"}}"#,
        )
        .unwrap();

        let config = layer(
            Some(&path),
            env(&[("NEO4J_URI", "bolt://env:7687")]),
            Overrides::default(),
        )
        .unwrap();

        assert_eq!(config.graph.uri, "bolt://env:7687");
        assert_eq!(config.document.database, "from_file");
        assert_eq!(config.graph.user, "neo4j");
    }

    #[test]
    fn test_zero_retries_flag_rejected() {
        let err = layer(
            None,
            env(&[]),
            Overrides {
                max_retries: Some(0),
                retry_interval_secs: None,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_flag_repairs_invalid_environment_value() {
        let config = layer(
            None,
            env(&[("DIETSEED_MAX_RETRIES", "0")]),
            Overrides {
                max_retries: Some(5),
                retry_interval_secs: None,
            },
        )
        .unwrap();
        assert_eq!(config.readiness.max_attempts, 5);
    }

    #[test]
    fn test_redacted_hides_passwords() {
        let shown = redacted(&SeedConfig::default());
        assert_eq!(shown.graph.password, "****");
        assert!(shown.document.uri.contains("admin:****@"));
        assert!(!shown.document.uri.contains("senha123"));
    }
}
