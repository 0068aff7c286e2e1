use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use gcloud_gax::grpc::Code;
use gcloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseDdlRequest, GetDatabaseRequest, UpdateDatabaseDdlRequest,
};
use gcloud_googleapis::spanner::admin::instance::v1::{
    CreateInstanceRequest, GetInstanceRequest, Instance,
};
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::client::{Client, ClientConfig};
use gcloud_spanner::key::Key;
use gcloud_spanner::mutation::{delete, insert_or_update};
use gcloud_spanner::statement::Statement;
use gcloud_spanner::value::CommitTimestamp;
use std::sync::Arc;

use super::{KeyInfo, KvStore, ListOptions};
use crate::config::SpannerConfig;

const TABLE: &str = "kv_namespace";

const CREATE_TABLE_DDL: &str = "CREATE TABLE kv_namespace (
    name STRING(MAX) NOT NULL,
    value STRING(MAX) NOT NULL,
    updated_at TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp=true),
) PRIMARY KEY (name)";

/// Key-value namespace stored in a Cloud Spanner table
///
/// Each key is one row of `kv_namespace`. Writes are single-row mutations
/// applied independently, so a multi-key operation that fails halfway leaves
/// the earlier writes in place.
#[derive(Clone)]
pub struct SpannerStore {
    inner: Arc<Client>,
}

impl SpannerStore {
    /// Connect to the configured database, provisioning it first if needed
    ///
    /// `ClientConfig::default()` picks up `SPANNER_EMULATOR_HOST` from the
    /// process environment, so the emulator is used whenever that is set.
    pub async fn from_config(config: &SpannerConfig) -> Result<Self> {
        Provisioner::connect(config).await?.run().await?;

        let database_path = config.database_path();
        match &config.emulator_host {
            Some(host) => tracing::info!("Connecting to Spanner emulator at: {}", host),
            None => tracing::info!("Connecting to production Spanner"),
        }

        let client = Client::new(&database_path, ClientConfig::default())
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!("Connected to Spanner database: {}", database_path);

        Ok(Self {
            inner: Arc::new(client),
        })
    }
}

#[async_trait]
impl KvStore for SpannerStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut statement = Statement::new("SELECT value FROM kv_namespace WHERE name = @name");
        statement.add_param("name", &key.to_string());

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut rows = tx
            .query(statement)
            .await
            .with_context(|| format!("Failed to read key '{}' from Spanner", key))?;

        match rows.next().await? {
            Some(row) => Ok(Some(row.column_by_name::<String>("value")?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let name = key.to_string();
        let mutation = insert_or_update(
            TABLE,
            &["name", "value", "updated_at"],
            &[&name, &value, &CommitTimestamp::new()],
        );

        self.inner
            .apply(vec![mutation])
            .await
            .with_context(|| format!("Failed to write key '{}' to Spanner", key))?;

        tracing::debug!("Stored key: {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let name = key.to_string();
        let mutation = delete(TABLE, Key::new(&name));

        self.inner
            .apply(vec![mutation])
            .await
            .with_context(|| format!("Failed to delete key '{}' from Spanner", key))?;

        tracing::debug!("Deleted key: {}", key);
        Ok(())
    }

    async fn list(&self, options: &ListOptions) -> Result<Vec<KeyInfo>> {
        let mut statement = Statement::new(list_sql(options));
        if let Some(prefix) = &options.prefix {
            statement.add_param("prefix", prefix);
        }

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut rows = tx
            .query(statement)
            .await
            .context("Failed to list keys from Spanner")?;

        let mut keys = Vec::new();
        while let Some(row) = rows.next().await? {
            keys.push(KeyInfo {
                name: row.column_by_name("name")?,
            });
        }

        tracing::debug!("Listed {} keys (prefix: {:?})", keys.len(), options.prefix);
        Ok(keys)
    }
}

fn list_sql(options: &ListOptions) -> String {
    let filter = if options.prefix.is_some() {
        " WHERE STARTS_WITH(name, @prefix)"
    } else {
        ""
    };
    format!(
        "SELECT name FROM {}{} ORDER BY name LIMIT {}",
        TABLE, filter, options.limit
    )
}

/// Creates the instance, database and table on first use
///
/// Meant for zero-setup runs against the emulator; each step is a no-op
/// when the resource already exists.
struct Provisioner<'a> {
    admin: AdminClient,
    config: &'a SpannerConfig,
    project_path: String,
    instance_path: String,
    database_path: String,
}

impl<'a> Provisioner<'a> {
    async fn connect(config: &'a SpannerConfig) -> Result<Self> {
        let admin = AdminClient::new(AdminClientConfig::default())
            .await
            .context("Failed to create Spanner admin client")?;

        let project_path = format!("projects/{}", config.project);
        let instance_path = format!("{}/instances/{}", project_path, config.instance);

        Ok(Self {
            admin,
            config,
            database_path: config.database_path(),
            project_path,
            instance_path,
        })
    }

    async fn run(&self) -> Result<()> {
        tracing::info!("Checking Spanner resources for {}", self.database_path);
        self.ensure_instance().await?;
        self.ensure_database().await?;
        self.ensure_table().await?;
        Ok(())
    }

    async fn ensure_instance(&self) -> Result<()> {
        let request = GetInstanceRequest {
            name: self.instance_path.clone(),
            field_mask: None,
        };

        match self.admin.instance().get_instance(request, None).await {
            Ok(_) => return Ok(()),
            Err(status) if status.code() == Code::NotFound => {}
            Err(status) => {
                return Err(anyhow!(
                    "Failed to check instance existence: {}",
                    status.message()
                ))
            }
        }

        tracing::info!("Creating Spanner instance: {}", self.instance_path);

        let instance_config = match self.config.emulator_host {
            Some(_) => format!("{}/instanceConfigs/emulator-config", self.project_path),
            None => format!("{}/instanceConfigs/regional-us-central1", self.project_path),
        };

        let request = CreateInstanceRequest {
            parent: self.project_path.clone(),
            instance_id: self.config.instance.clone(),
            instance: Some(Instance {
                name: self.instance_path.clone(),
                config: instance_config,
                display_name: format!("{} instance", self.config.instance),
                node_count: 1,
                ..Default::default()
            }),
        };

        self.admin
            .instance()
            .create_instance(request, None)
            .await
            .context("Failed to start instance creation")?
            .wait(None)
            .await
            .context("Failed to create instance")?;

        Ok(())
    }

    async fn ensure_database(&self) -> Result<()> {
        let request = GetDatabaseRequest {
            name: self.database_path.clone(),
        };

        match self.admin.database().get_database(request, None).await {
            Ok(_) => return Ok(()),
            Err(status) if status.code() == Code::NotFound => {}
            Err(status) => {
                return Err(anyhow!(
                    "Failed to check database existence: {}",
                    status.message()
                ))
            }
        }

        tracing::info!("Creating Spanner database: {}", self.database_path);

        let request = CreateDatabaseRequest {
            parent: self.instance_path.clone(),
            create_statement: format!("CREATE DATABASE `{}`", self.config.database),
            extra_statements: vec![],
            encryption_config: None,
            database_dialect: 1, // GoogleSQL
            proto_descriptors: vec![],
        };

        self.admin
            .database()
            .create_database(request, None)
            .await
            .context("Failed to start database creation")?
            .wait(None)
            .await
            .context("Failed to create database")?;

        Ok(())
    }

    async fn ensure_table(&self) -> Result<()> {
        let request = GetDatabaseDdlRequest {
            database: self.database_path.clone(),
        };

        let ddl = self
            .admin
            .database()
            .get_database_ddl(request, None)
            .await
            .context("Failed to get database DDL")?
            .into_inner();

        if ddl.statements.iter().any(|stmt| declares_table(stmt)) {
            return Ok(());
        }

        tracing::info!("Creating table '{}'", TABLE);

        let request = UpdateDatabaseDdlRequest {
            database: self.database_path.clone(),
            statements: vec![CREATE_TABLE_DDL.to_string()],
            operation_id: String::new(),
            proto_descriptors: vec![],
            throughput_mode: false,
        };

        self.admin
            .database()
            .update_database_ddl(request, None)
            .await
            .context("Failed to start table creation")?
            .wait(None)
            .await
            .context("Failed to create table")?;

        Ok(())
    }
}

fn declares_table(statement: &str) -> bool {
    statement.contains("CREATE TABLE kv_namespace") || statement.contains("CREATE TABLE `kv_namespace`")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emulator_config(instance: &str) -> SpannerConfig {
        unsafe {
            std::env::set_var("SPANNER_EMULATOR_HOST", "localhost:9010");
        }

        SpannerConfig {
            emulator_host: Some("localhost:9010".to_string()),
            project: "test-project".to_string(),
            instance: instance.to_string(),
            database: format!("{}-db", instance),
        }
    }

    #[test]
    fn test_store_is_clonable_and_shareable() {
        fn assert_clone<T: Clone>() {}
        fn assert_send_sync<T: Send + Sync>() {}
        assert_clone::<SpannerStore>();
        assert_send_sync::<SpannerStore>();
    }

    #[test]
    fn test_list_sql_without_prefix() {
        let sql = list_sql(&ListOptions::default());
        assert_eq!(sql, "SELECT name FROM kv_namespace ORDER BY name LIMIT 1000");
    }

    #[test]
    fn test_list_sql_with_prefix() {
        let options = ListOptions {
            prefix: Some("user".to_string()),
            limit: 10,
        };
        assert_eq!(
            list_sql(&options),
            "SELECT name FROM kv_namespace WHERE STARTS_WITH(name, @prefix) ORDER BY name LIMIT 10"
        );
    }

    #[test]
    fn test_declares_table() {
        assert!(declares_table(CREATE_TABLE_DDL));
        assert!(declares_table("CREATE TABLE `kv_namespace` (name STRING(MAX))"));
        assert!(!declares_table("CREATE TABLE kv_store (id STRING(36))"));
    }

    #[tokio::test]
    #[ignore = "requires a Spanner emulator on localhost:9010"]
    async fn test_provisioning_is_idempotent() {
        let config = emulator_config("kv-provision-test");

        SpannerStore::from_config(&config).await.unwrap();
        SpannerStore::from_config(&config).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Spanner emulator on localhost:9010"]
    async fn test_put_get_delete() {
        let store = SpannerStore::from_config(&emulator_config("kv-crud-test"))
            .await
            .unwrap();

        store.put("users", r#"[{"id":"1"}]"#.to_string()).await.unwrap();
        assert_eq!(
            store.get("users").await.unwrap(),
            Some(r#"[{"id":"1"}]"#.to_string())
        );

        store.delete("users").await.unwrap();
        assert_eq!(store.get("users").await.unwrap(), None);

        // Deleting again must not fail
        store.delete("users").await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Spanner emulator on localhost:9010"]
    async fn test_list_with_prefix() {
        let store = SpannerStore::from_config(&emulator_config("kv-list-test"))
            .await
            .unwrap();

        for key in ["list-a", "list-b", "list-c", "other"] {
            store.put(key, "null".to_string()).await.unwrap();
        }

        let options = ListOptions {
            prefix: Some("list-".to_string()),
            limit: 2,
        };
        let keys = store.list(&options).await.unwrap();
        let names: Vec<_> = keys.into_iter().map(|k| k.name).collect();
        assert_eq!(names, vec!["list-a", "list-b"]);
    }
}
