use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

/// Which of the two request handlers this process serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Basic routing, CORS and JSON echo
    Echo,
    /// Demo CRUD operations over the key-value store
    Kv,
}

impl FromStr for HandlerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "echo" => Ok(HandlerKind::Echo),
            "kv" => Ok(HandlerKind::Kv),
            other => Err(anyhow!(
                "WORKER_HANDLER must be one of: echo, kv, got '{}'",
                other
            )),
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerKind::Echo => f.write_str("echo"),
            HandlerKind::Kv => f.write_str("kv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannerConfig {
    pub emulator_host: Option<String>,
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl SpannerConfig {
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}

/// Storage behind the key-value binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvBackend {
    Memory,
    Spanner(SpannerConfig),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub handler: HandlerKind,
    pub environment: Option<String>,
    pub kv_backend: KvBackend,
    pub service_port: u16,
    pub service_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let handler = lookup("WORKER_HANDLER")
            .unwrap_or_else(|| "echo".to_string())
            .parse::<HandlerKind>()?;

        let environment = lookup("ENVIRONMENT").filter(|value| !value.is_empty());

        let kv_backend = match lookup("KV_BACKEND").as_deref().unwrap_or("memory") {
            "memory" => KvBackend::Memory,
            "spanner" => KvBackend::Spanner(SpannerConfig {
                emulator_host: lookup("SPANNER_EMULATOR_HOST"),
                project: lookup("SPANNER_PROJECT")
                    .context("SPANNER_PROJECT environment variable is required")?,
                instance: lookup("SPANNER_INSTANCE")
                    .context("SPANNER_INSTANCE environment variable is required")?,
                database: lookup("SPANNER_DATABASE")
                    .context("SPANNER_DATABASE environment variable is required")?,
            }),
            other => {
                return Err(anyhow!(
                    "KV_BACKEND must be one of: memory, spanner, got '{}'",
                    other
                ))
            }
        };

        let service_port = lookup("SERVICE_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = lookup("SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        Ok(Config {
            handler,
            environment,
            kv_backend,
            service_port,
            service_host,
        })
    }

    /// Environment name echoed back by `GET /api/data`
    pub fn environment_name(&self) -> &str {
        self.environment.as_deref().unwrap_or("development")
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Handler: {}", self.handler);
        tracing::info!("  Environment: {}", self.environment_name());
        match &self.kv_backend {
            KvBackend::Memory => tracing::info!("  KV backend: in-memory"),
            KvBackend::Spanner(spanner) => {
                tracing::info!("  KV backend: spanner ({})", spanner.database_path());
                tracing::info!(
                    "  Spanner emulator: {}",
                    spanner
                        .emulator_host
                        .as_deref()
                        .unwrap_or("disabled (using production)")
                );
            }
        }
        tracing::info!("  Service listening on: {}:{}", self.service_host, self.service_port);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_config_with_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.handler, HandlerKind::Echo);
        assert_eq!(config.environment, None);
        assert_eq!(config.environment_name(), "development");
        assert_eq!(config.kv_backend, KvBackend::Memory);
        assert_eq!(config.service_port, 3000);
        assert_eq!(config.service_host, "0.0.0.0");
    }

    #[test]
    fn test_config_with_all_vars() {
        let config = config_from(&[
            ("WORKER_HANDLER", "kv"),
            ("ENVIRONMENT", "production"),
            ("KV_BACKEND", "spanner"),
            ("SPANNER_EMULATOR_HOST", "localhost:9010"),
            ("SPANNER_PROJECT", "test-project"),
            ("SPANNER_INSTANCE", "test-instance"),
            ("SPANNER_DATABASE", "test-database"),
            ("SERVICE_PORT", "8080"),
            ("SERVICE_HOST", "127.0.0.1"),
        ])
        .unwrap();

        assert_eq!(config.handler, HandlerKind::Kv);
        assert_eq!(config.environment_name(), "production");
        assert_eq!(
            config.kv_backend,
            KvBackend::Spanner(SpannerConfig {
                emulator_host: Some("localhost:9010".to_string()),
                project: "test-project".to_string(),
                instance: "test-instance".to_string(),
                database: "test-database".to_string(),
            })
        );
        assert_eq!(config.service_port, 8080);
        assert_eq!(config.service_host, "127.0.0.1");
    }

    #[test]
    fn test_empty_environment_falls_back() {
        let config = config_from(&[("ENVIRONMENT", "")]).unwrap();
        assert_eq!(config.environment, None);
        assert_eq!(config.environment_name(), "development");
    }

    #[test]
    fn test_unknown_handler() {
        let error = config_from(&[("WORKER_HANDLER", "graphql")]).unwrap_err();
        assert!(error.to_string().contains("WORKER_HANDLER"));
    }

    #[test]
    fn test_unknown_backend() {
        let error = config_from(&[("KV_BACKEND", "redis")]).unwrap_err();
        assert!(error.to_string().contains("KV_BACKEND"));
    }

    #[test]
    fn test_spanner_backend_missing_required_var() {
        let error = config_from(&[
            ("KV_BACKEND", "spanner"),
            ("SPANNER_PROJECT", "test-project"),
            ("SPANNER_INSTANCE", "test-instance"),
        ])
        .unwrap_err();
        assert!(error.to_string().contains("SPANNER_DATABASE"));
    }

    #[test]
    fn test_invalid_port() {
        let error = config_from(&[("SERVICE_PORT", "not-a-number")]).unwrap_err();
        assert!(error.to_string().contains("SERVICE_PORT"));
    }

    #[test]
    fn test_port_out_of_range() {
        assert!(config_from(&[("SERVICE_PORT", "99999")]).is_err());
    }

    #[test]
    fn test_database_path() {
        let spanner = SpannerConfig {
            emulator_host: None,
            project: "p".to_string(),
            instance: "i".to_string(),
            database: "d".to_string(),
        };
        assert_eq!(spanner.database_path(), "projects/p/instances/i/databases/d");
    }
}
