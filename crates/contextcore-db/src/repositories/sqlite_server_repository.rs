//! `SQLite` implementation of the MCP server repository.
//!
//! Structured fields (args, environment, headers, watched paths, user
//! config) are stored as JSON text columns. `NULL` means "not set"; an
//! empty collection is stored as `[]` / `{}`.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;
use tracing::debug;

use contextcore_core::{
    IdGenerator, ListOrder, NewServerDefinition, RecordList, ServerConfig, ServerDefinition,
    ServerRepository, StoreError,
};

use super::row_mappers::{ColumnValue, boolean, encoded, optional_text, parsed, text};
use super::table;
use crate::schema::MCP_SERVERS;

/// `SQLite` implementation of the MCP server repository.
pub struct SqliteServerRepository {
    pool: SqlitePool,
    ids: Arc<dyn IdGenerator>,
}

impl SqliteServerRepository {
    /// Create a repository with a custom id source.
    pub fn with_id_generator(pool: SqlitePool, ids: Arc<dyn IdGenerator>) -> Self {
        Self { pool, ids }
    }
}

/// Column values for a server, in registry order.
fn server_values(server: &ServerDefinition) -> Result<Vec<ColumnValue>, StoreError> {
    let config = &server.config;
    Ok(vec![
        ColumnValue::text(&server.id),
        ColumnValue::text(&server.name),
        ColumnValue::text(server.transport.as_str()),
        ColumnValue::optional(config.command.as_ref()),
        ColumnValue::encoded(config.args.as_ref(), "args")?,
        ColumnValue::optional(config.url.as_ref()),
        ColumnValue::encoded(config.environment.as_ref(), "environment")?,
        ColumnValue::encoded(config.headers.as_ref(), "headers")?,
        ColumnValue::encoded(config.watched_paths.as_ref(), "watched_paths")?,
        ColumnValue::optional(config.working_directory.as_ref()),
        ColumnValue::Bool(config.auto_reload_enabled),
        ColumnValue::encoded(config.user_config.as_ref(), "dxt_user_config")?,
        ColumnValue::optional(config.metadata_url.as_ref()),
    ])
}

/// Convert a `mcp_servers` row to a domain `ServerDefinition`.
fn row_to_server(row: &SqliteRow) -> Result<ServerDefinition, StoreError> {
    Ok(ServerDefinition {
        id: text(row, "id")?,
        name: text(row, "name")?,
        transport: parsed(row, "transport")?,
        config: ServerConfig {
            command: optional_text(row, "command")?,
            args: encoded(row, "args")?,
            url: optional_text(row, "url")?,
            environment: encoded(row, "environment")?,
            headers: encoded(row, "headers")?,
            watched_paths: encoded(row, "watched_paths")?,
            working_directory: optional_text(row, "working_directory_path")?,
            auto_reload_enabled: boolean(row, "auto_reload_enabled")?,
            user_config: encoded(row, "dxt_user_config")?,
            metadata_url: optional_text(row, "mcp_metadata_url")?,
        },
    })
}

#[async_trait]
impl ServerRepository for SqliteServerRepository {
    async fn create(&self, server: NewServerDefinition) -> Result<ServerDefinition, StoreError> {
        let id = server
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| self.ids.generate());
        let server = server.into_definition(id);

        // Encode everything before touching the database.
        let values = server_values(&server)?;
        table::upsert(&self.pool, &MCP_SERVERS, values).await?;

        debug!(id = %server.id, name = %server.name, "saved MCP server");
        Ok(server)
    }

    async fn get(&self, id: &str) -> Result<ServerDefinition, StoreError> {
        let row = table::fetch_one_by(&self.pool, &MCP_SERVERS, "id", id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        row_to_server(&row)
    }

    async fn get_by_name(&self, name: &str) -> Result<ServerDefinition, StoreError> {
        let row = table::fetch_one_by(&self.pool, &MCP_SERVERS, "name", name)
            .await?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        row_to_server(&row)
    }

    async fn list(&self, order: ListOrder) -> Result<RecordList<ServerDefinition>, StoreError> {
        table::fetch_all(&self.pool, &MCP_SERVERS, order, row_to_server).await
    }

    async fn update(&self, server: &ServerDefinition) -> Result<(), StoreError> {
        let values = server_values(server)?;
        table::update(&self.pool, &MCP_SERVERS, &server.id, values).await?;

        debug!(id = %server.id, "updated MCP server");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        table::delete(&self.pool, &MCP_SERVERS, id).await?;

        debug!(id = %id, "deleted MCP server");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use contextcore_core::{SequentialIdGenerator, TransportKind, UserConfigValues};
    use serde_json::json;

    async fn repo() -> (SqliteServerRepository, SqlitePool) {
        let pool = setup_test_database().await.unwrap();
        let repo = SqliteServerRepository::with_id_generator(
            pool.clone(),
            Arc::new(SequentialIdGenerator::new("srv")),
        );
        (repo, pool)
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_round_trips_all_fields() {
        let (repo, _pool) = repo().await;

        let mut user_config = UserConfigValues::new();
        user_config.insert("api_key".into(), json!("secret"));
        user_config.insert("limits".into(), json!({"max": 10, "tags": ["a", "b"]}));

        let new_server = NewServerDefinition::stdio(
            "filesystem",
            "npx",
            vec!["-y".into(), "@modelcontextprotocol/server-filesystem".into()],
        )
        .with_env("API_KEY", "secret123")
        .with_header("X-Trace", "1")
        .with_watched_path("/tmp/watch")
        .with_working_directory("/tmp")
        .with_auto_reload(true)
        .with_user_config(user_config)
        .with_metadata_url("https://example.com/meta.json");

        let created = repo.create(new_server.clone()).await.unwrap();
        assert_eq!(created.id, "srv-1");

        let fetched = repo.get("srv-1").await.unwrap();
        assert_eq!(fetched, new_server.into_definition("srv-1".into()));
    }

    #[tokio::test]
    async fn test_unset_and_empty_args_are_distinguishable() {
        let (repo, _pool) = repo().await;

        let mut unset = NewServerDefinition::stdio("unset", "cmd", vec![]);
        unset.config.args = None;
        let empty = NewServerDefinition::stdio("empty", "cmd", vec![]);

        let unset = repo.create(unset).await.unwrap();
        let empty = repo.create(empty).await.unwrap();

        assert_eq!(repo.get(&unset.id).await.unwrap().config.args, None);
        assert_eq!(repo.get(&empty.id).await.unwrap().config.args, Some(vec![]));
    }

    #[tokio::test]
    async fn test_create_with_existing_id_replaces_row() {
        let (repo, _pool) = repo().await;

        let first = NewServerDefinition::stdio("first", "cmd", vec!["a".into()])
            .with_id("fixed")
            .with_env("KEY", "value");
        let second = NewServerDefinition::remote("second", TransportKind::Sse, "http://x/sse")
            .with_id("fixed");

        repo.create(first).await.unwrap();
        repo.create(second).await.unwrap();

        let list = repo.list(ListOrder::Insertion).await.unwrap();
        assert_eq!(list.records.len(), 1);

        let stored = &list.records[0];
        assert_eq!(stored.name, "second");
        assert_eq!(stored.transport, TransportKind::Sse);
        assert_eq!(stored.config.command, None);
        assert_eq!(stored.config.environment, None);
    }

    #[tokio::test]
    async fn test_blank_supplied_id_is_generated() {
        let (repo, _pool) = repo().await;

        let created = repo
            .create(NewServerDefinition::stdio("s", "cmd", vec![]).with_id("  "))
            .await
            .unwrap();
        assert_eq!(created.id, "srv-1");
    }

    #[tokio::test]
    async fn test_get_by_name() {
        let (repo, _pool) = repo().await;

        repo.create(NewServerDefinition::stdio("my-mcp", "node", vec!["server.js".into()]))
            .await
            .unwrap();

        let fetched = repo.get_by_name("my-mcp").await.unwrap();
        assert_eq!(fetched.config.command.as_deref(), Some("node"));
        assert!(matches!(
            repo.get_by_name("missing").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_orders() {
        let (repo, _pool) = repo().await;

        repo.create(NewServerDefinition::stdio("zeta", "cmd", vec![]))
            .await
            .unwrap();
        repo.create(NewServerDefinition::stdio("alpha", "cmd", vec![]))
            .await
            .unwrap();

        let inserted = repo.list(ListOrder::Insertion).await.unwrap();
        let names: Vec<_> = inserted.records.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha"]);

        let by_name = repo.list(ListOrder::Name).await.unwrap();
        let names: Vec<_> = by_name.records.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_update_replaces_columns() {
        let (repo, _pool) = repo().await;

        let mut server = repo
            .create(NewServerDefinition::stdio("updatable", "old-cmd", vec![]).with_env("KEY", "old"))
            .await
            .unwrap();

        server.config.command = Some("new-cmd".into());
        server.config.environment = Some([("KEY".to_string(), "new".to_string())].into());
        server.config.auto_reload_enabled = true;
        repo.update(&server).await.unwrap();

        assert_eq!(repo.get(&server.id).await.unwrap(), server);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (repo, _pool) = repo().await;

        let ghost = NewServerDefinition::stdio("ghost", "cmd", vec![]).into_definition("nope".into());
        assert!(matches!(
            repo.update(&ghost).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(repo.list(ListOrder::Insertion).await.unwrap().records.is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (repo, _pool) = repo().await;

        let server = repo
            .create(NewServerDefinition::stdio("deletable", "cmd", vec![]))
            .await
            .unwrap();

        repo.delete(&server.id).await.unwrap();
        repo.delete(&server.id).await.unwrap();
        repo.delete("never-existed").await.unwrap();

        assert!(matches!(
            repo.get(&server.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_row_is_reported_without_hiding_others() {
        let (repo, pool) = repo().await;

        let good = repo
            .create(NewServerDefinition::stdio("good", "cmd", vec![]))
            .await
            .unwrap();
        let bad = repo
            .create(NewServerDefinition::stdio("bad", "cmd", vec![]))
            .await
            .unwrap();

        sqlx::query("UPDATE mcp_servers SET headers = '{\"broken\": ' WHERE id = ?")
            .bind(&bad.id)
            .execute(&pool)
            .await
            .unwrap();

        let list = repo.list(ListOrder::Insertion).await.unwrap();
        assert_eq!(list.records, vec![good]);
        assert!(!list.is_complete());
        assert_eq!(list.failures.len(), 1);
        assert_eq!(list.failures[0].id, bad.id);
        assert!(matches!(list.failures[0].error, StoreError::Decode(_)));

        assert!(matches!(repo.get(&bad.id).await, Err(StoreError::Decode(_))));
    }

    #[tokio::test]
    async fn test_unknown_transport_is_decode_error() {
        let (repo, pool) = repo().await;

        let server = repo
            .create(NewServerDefinition::stdio("future", "cmd", vec![]))
            .await
            .unwrap();
        sqlx::query("UPDATE mcp_servers SET transport = 'websocket' WHERE id = ?")
            .bind(&server.id)
            .execute(&pool)
            .await
            .unwrap();

        let err = repo.get(&server.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(ref e) if e.column == "transport"));
    }

    #[tokio::test]
    async fn test_failed_update_leaves_previous_row_intact() {
        let (repo, pool) = repo().await;

        let original = repo
            .create(
                NewServerDefinition::stdio("stable", "cmd", vec!["a".into()])
                    .with_env("KEY", "value"),
            )
            .await
            .unwrap();

        // Simulated storage fault partway through the write.
        sqlx::query(
            "CREATE TRIGGER fail_write BEFORE UPDATE ON mcp_servers \
             WHEN NEW.name = 'boom' BEGIN SELECT RAISE(ABORT, 'disk I/O error'); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let mut changed = original.clone();
        changed.name = "boom".into();
        changed.config.args = Some(vec!["b".into(), "c".into()]);
        changed.config.environment = None;

        assert!(matches!(
            repo.update(&changed).await,
            Err(StoreError::Storage(_))
        ));
        assert_eq!(repo.get(&original.id).await.unwrap(), original);
    }

    #[test]
    fn test_server_values_match_registry() {
        let server = NewServerDefinition::stdio("s", "cmd", vec![]).into_definition("id".into());
        let values = server_values(&server).unwrap();
        assert_eq!(values.len(), MCP_SERVERS.columns.len());
        assert_eq!(values[2], ColumnValue::text("stdio"));
        assert_eq!(values[4], ColumnValue::Text(Some("[]".into())));
        assert_eq!(values[6], ColumnValue::Text(None));
    }

    mod round_trip {
        use super::*;
        use contextcore_core::{ServerConfig, StringList, StringMap};
        use proptest::prelude::*;
        use serde_json::Value;

        fn string_list() -> impl Strategy<Value = StringList> {
            prop::collection::vec("\\PC*", 0..6)
        }

        fn string_map() -> impl Strategy<Value = StringMap> {
            prop::collection::btree_map("\\PC*", "\\PC*", 0..6)
        }

        fn config_value() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(Value::from),
                any::<f64>()
                    .prop_filter("finite", |f| f.is_finite())
                    .prop_map(Value::from),
                "\\PC*".prop_map(Value::String),
            ];
            leaf.prop_recursive(3, 32, 6, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                    prop::collection::btree_map("\\PC*", inner, 0..6)
                        .prop_map(|map| Value::Object(map.into_iter().collect())),
                ]
            })
        }

        fn transport() -> impl Strategy<Value = TransportKind> {
            prop::sample::select(TransportKind::ALL.to_vec())
        }

        prop_compose! {
            fn server_config()(
                command in prop::option::of("\\PC*"),
                args in prop::option::of(string_list()),
                url in prop::option::of("\\PC*"),
                environment in prop::option::of(string_map()),
                headers in prop::option::of(string_map()),
                watched_paths in prop::option::of(string_list()),
                working_directory in prop::option::of("\\PC*"),
                auto_reload_enabled in any::<bool>(),
                user_config in prop::option::of(prop::collection::btree_map("\\PC*", config_value(), 0..6)),
                metadata_url in prop::option::of("\\PC*"),
            ) -> ServerConfig {
                ServerConfig {
                    command,
                    args,
                    url,
                    environment,
                    headers,
                    watched_paths,
                    working_directory,
                    auto_reload_enabled,
                    user_config,
                    metadata_url,
                }
            }
        }

        prop_compose! {
            fn new_server()(
                name in "\\PC*",
                transport in transport(),
                config in server_config(),
            ) -> NewServerDefinition {
                NewServerDefinition { id: None, name, transport, config }
            }
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn stored_servers_read_back_unchanged(server in new_server()) {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();

                let (created, fetched) = runtime.block_on(async {
                    let (repo, _pool) = repo().await;
                    let created = repo.create(server.clone()).await.unwrap();
                    let fetched = repo.get(&created.id).await.unwrap();
                    (created, fetched)
                });

                prop_assert_eq!(&fetched, &created);
                prop_assert_eq!(fetched, server.into_definition(created.id.clone()));
            }
        }
    }
}
