//! `SQLite` implementation of the root repository.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;
use tracing::debug;

use contextcore_core::{
    IdGenerator, ListOrder, NewRoot, RecordList, Root, RootRepository, StoreError,
};

use super::row_mappers::{ColumnValue, text};
use super::table;
use crate::schema::MCP_ROOTS;

/// `SQLite` implementation of the root repository.
pub struct SqliteRootRepository {
    pool: SqlitePool,
    ids: Arc<dyn IdGenerator>,
}

impl SqliteRootRepository {
    pub fn with_id_generator(pool: SqlitePool, ids: Arc<dyn IdGenerator>) -> Self {
        Self { pool, ids }
    }
}

fn root_values(root: &Root) -> Vec<ColumnValue> {
    vec![
        ColumnValue::text(&root.id),
        ColumnValue::text(&root.name),
        ColumnValue::text(&root.uri),
    ]
}

fn row_to_root(row: &SqliteRow) -> Result<Root, StoreError> {
    Ok(Root {
        id: text(row, "id")?,
        name: text(row, "name")?,
        uri: text(row, "uri")?,
    })
}

#[async_trait]
impl RootRepository for SqliteRootRepository {
    async fn create(&self, root: NewRoot) -> Result<Root, StoreError> {
        let id = root
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| self.ids.generate());
        let root = root.into_root(id);

        table::upsert(&self.pool, &MCP_ROOTS, root_values(&root)).await?;

        debug!(id = %root.id, uri = %root.uri, "saved root");
        Ok(root)
    }

    async fn get(&self, id: &str) -> Result<Root, StoreError> {
        let row = table::fetch_one_by(&self.pool, &MCP_ROOTS, "id", id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        row_to_root(&row)
    }

    async fn list(&self, order: ListOrder) -> Result<RecordList<Root>, StoreError> {
        table::fetch_all(&self.pool, &MCP_ROOTS, order, row_to_root).await
    }

    async fn update(&self, root: &Root) -> Result<(), StoreError> {
        table::update(&self.pool, &MCP_ROOTS, &root.id, root_values(root)).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        table::delete(&self.pool, &MCP_ROOTS, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use contextcore_core::SequentialIdGenerator;

    async fn repo() -> SqliteRootRepository {
        let pool = setup_test_database().await.unwrap();
        SqliteRootRepository::with_id_generator(pool, Arc::new(SequentialIdGenerator::new("root")))
    }

    #[tokio::test]
    async fn test_root_crud() {
        let repo = repo().await;

        let mut root = repo
            .create(NewRoot::new("Projects", "file:///Users/me/Projects"))
            .await
            .unwrap();
        assert_eq!(root.id, "root-1");
        assert_eq!(repo.get("root-1").await.unwrap(), root);

        root.uri = "file:///srv/projects".into();
        repo.update(&root).await.unwrap();
        assert_eq!(repo.get("root-1").await.unwrap().uri, "file:///srv/projects");

        repo.delete("root-1").await.unwrap();
        repo.delete("root-1").await.unwrap();
        assert!(matches!(repo.get("root-1").await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_root_upsert_by_id() {
        let repo = repo().await;

        repo.create(NewRoot::new("old", "file:///old").with_id("r"))
            .await
            .unwrap();
        repo.create(NewRoot::new("new", "file:///new").with_id("r"))
            .await
            .unwrap();

        let roots = repo.list(ListOrder::Name).await.unwrap().into_complete().unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "new");
    }
}
