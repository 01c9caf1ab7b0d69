//! `SQLite` implementation of the global environment repository.
//!
//! Keys are not unique at the storage layer; duplicate keys resolve with
//! "last write wins" in insertion order through
//! [`GlobalEnvironmentRepository::resolved`].

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;
use tracing::debug;

use contextcore_core::{
    GlobalEnvironmentRepository, GlobalEnvironmentVariable, IdGenerator, ListOrder,
    NewGlobalEnvironmentVariable, RecordList, StoreError,
};

use super::row_mappers::{ColumnValue, text};
use super::table;
use crate::schema::GLOBAL_ENVIRONMENT;

/// `SQLite` implementation of the global environment repository.
pub struct SqliteGlobalEnvironmentRepository {
    pool: SqlitePool,
    ids: Arc<dyn IdGenerator>,
}

impl SqliteGlobalEnvironmentRepository {
    pub fn with_id_generator(pool: SqlitePool, ids: Arc<dyn IdGenerator>) -> Self {
        Self { pool, ids }
    }
}

fn variable_values(variable: &GlobalEnvironmentVariable) -> Vec<ColumnValue> {
    vec![
        ColumnValue::text(&variable.id),
        ColumnValue::text(&variable.key),
        ColumnValue::text(&variable.value),
    ]
}

fn row_to_variable(row: &SqliteRow) -> Result<GlobalEnvironmentVariable, StoreError> {
    Ok(GlobalEnvironmentVariable {
        id: text(row, "id")?,
        key: text(row, "key")?,
        value: text(row, "value")?,
    })
}

#[async_trait]
impl GlobalEnvironmentRepository for SqliteGlobalEnvironmentRepository {
    async fn create(
        &self,
        variable: NewGlobalEnvironmentVariable,
    ) -> Result<GlobalEnvironmentVariable, StoreError> {
        let id = variable
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| self.ids.generate());
        let variable = variable.into_variable(id);

        table::upsert(&self.pool, &GLOBAL_ENVIRONMENT, variable_values(&variable)).await?;

        debug!(id = %variable.id, key = %variable.key, "saved global environment variable");
        Ok(variable)
    }

    async fn get(&self, id: &str) -> Result<GlobalEnvironmentVariable, StoreError> {
        let row = table::fetch_one_by(&self.pool, &GLOBAL_ENVIRONMENT, "id", id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        row_to_variable(&row)
    }

    async fn list(
        &self,
        order: ListOrder,
    ) -> Result<RecordList<GlobalEnvironmentVariable>, StoreError> {
        table::fetch_all(&self.pool, &GLOBAL_ENVIRONMENT, order, row_to_variable).await
    }

    async fn update(&self, variable: &GlobalEnvironmentVariable) -> Result<(), StoreError> {
        table::update(
            &self.pool,
            &GLOBAL_ENVIRONMENT,
            &variable.id,
            variable_values(variable),
        )
        .await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        table::delete(&self.pool, &GLOBAL_ENVIRONMENT, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use contextcore_core::SequentialIdGenerator;

    async fn repo() -> SqliteGlobalEnvironmentRepository {
        let pool = setup_test_database().await.unwrap();
        SqliteGlobalEnvironmentRepository::with_id_generator(
            pool,
            Arc::new(SequentialIdGenerator::new("env")),
        )
    }

    #[tokio::test]
    async fn test_duplicate_keys_are_stored_and_last_write_wins() {
        let repo = repo().await;

        repo.create(NewGlobalEnvironmentVariable::new("PATH", "/usr/bin"))
            .await
            .unwrap();
        repo.create(NewGlobalEnvironmentVariable::new("HOME", "/home/me"))
            .await
            .unwrap();
        repo.create(NewGlobalEnvironmentVariable::new("PATH", "/opt/bin"))
            .await
            .unwrap();

        let all = repo.list(ListOrder::Insertion).await.unwrap();
        assert_eq!(all.records.len(), 3);

        let resolved = repo.resolved().await.unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved["PATH"], "/opt/bin");
    }

    #[tokio::test]
    async fn test_upsert_keeps_insertion_position() {
        let repo = repo().await;

        let first = repo
            .create(NewGlobalEnvironmentVariable::new("TOKEN", "a"))
            .await
            .unwrap();
        repo.create(NewGlobalEnvironmentVariable::new("TOKEN", "b"))
            .await
            .unwrap();

        // Rewriting the first entry does not move it after the second.
        repo.create(NewGlobalEnvironmentVariable::from(GlobalEnvironmentVariable {
            value: "c".into(),
            ..first
        }))
        .await
        .unwrap();

        assert_eq!(repo.resolved().await.unwrap()["TOKEN"], "b");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = repo().await;

        let mut variable = repo
            .create(NewGlobalEnvironmentVariable::new("LOG", "info"))
            .await
            .unwrap();
        variable.value = "debug".into();
        repo.update(&variable).await.unwrap();
        assert_eq!(repo.get(&variable.id).await.unwrap().value, "debug");

        repo.delete(&variable.id).await.unwrap();
        assert!(repo.resolved().await.unwrap().is_empty());
    }
}
