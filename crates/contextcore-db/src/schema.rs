//! Schema registry.
//!
//! The column layout of every table at the *current* migration version, in
//! physical column order. Repositories build their SQL and bind their values
//! from these definitions; the migration list in [`crate::migrations`] must
//! produce exactly this shape (checked by tests against `PRAGMA table_info`).

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Plain text.
    Text,
    /// Boolean stored as `0`/`1`.
    Boolean,
    /// Structured value encoded as JSON text.
    Encoded,
}

/// One column of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

const fn required(name: &'static str, ty: ColumnType) -> Column {
    Column {
        name,
        ty,
        nullable: false,
    }
}

const fn optional(name: &'static str, ty: ColumnType) -> Column {
    Column {
        name,
        ty,
        nullable: true,
    }
}

/// A table and its columns. The first column is the text primary key `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// Column used for [`ListOrder::Name`](contextcore_core::ListOrder::Name).
    pub name_column: &'static str,
}

pub const MCP_SERVERS: TableSchema = TableSchema {
    name: "mcp_servers",
    columns: &[
        required("id", ColumnType::Text),
        required("name", ColumnType::Text),
        required("transport", ColumnType::Text),
        optional("command", ColumnType::Text),
        optional("args", ColumnType::Encoded),
        optional("url", ColumnType::Text),
        optional("environment", ColumnType::Encoded),
        optional("headers", ColumnType::Encoded),
        optional("watched_paths", ColumnType::Encoded),
        optional("working_directory_path", ColumnType::Text),
        required("auto_reload_enabled", ColumnType::Boolean),
        optional("dxt_user_config", ColumnType::Encoded),
        optional("mcp_metadata_url", ColumnType::Text),
    ],
    name_column: "name",
};

pub const MCP_ROOTS: TableSchema = TableSchema {
    name: "mcp_roots",
    columns: &[
        required("id", ColumnType::Text),
        required("name", ColumnType::Text),
        required("uri", ColumnType::Text),
    ],
    name_column: "name",
};

pub const GLOBAL_ENVIRONMENT: TableSchema = TableSchema {
    name: "global_environment",
    columns: &[
        required("id", ColumnType::Text),
        required("key", ColumnType::Text),
        required("value", ColumnType::Text),
    ],
    name_column: "key",
};

/// Every table owned by the store.
pub const TABLES: [TableSchema; 3] = [MCP_SERVERS, MCP_ROOTS, GLOBAL_ENVIRONMENT];

impl TableSchema {
    /// Comma-separated column list, in physical order.
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// `SELECT <all columns> FROM <table>` with an optional suffix.
    pub fn select_sql(&self, suffix: &str) -> String {
        format!("SELECT {} FROM {} {suffix}", self.column_list(), self.name)
            .trim_end()
            .to_string()
    }

    /// Insert every column, replacing all non-id columns when the id exists.
    ///
    /// `ON CONFLICT DO UPDATE` keeps the row's rowid, so insertion order is
    /// stable across upserts.
    pub fn upsert_sql(&self) -> String {
        let placeholders = vec!["?"; self.columns.len()].join(", ");
        let assignments = self
            .columns
            .iter()
            .skip(1)
            .map(|c| format!("{0} = excluded.{0}", c.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({placeholders}) ON CONFLICT(id) DO UPDATE SET {assignments}",
            self.name,
            self.column_list(),
        )
    }

    /// Update every non-id column; the id is bound last.
    pub fn update_sql(&self) -> String {
        let assignments = self
            .columns
            .iter()
            .skip(1)
            .map(|c| format!("{} = ?", c.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!("UPDATE {} SET {assignments} WHERE id = ?", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_starts_with_required_id() {
        for table in TABLES {
            assert_eq!(table.columns[0], required("id", ColumnType::Text));
            assert!(table.column(table.name_column).is_some());
        }
    }

    #[test]
    fn test_server_columns_in_physical_order() {
        let names: Vec<_> = MCP_SERVERS.columns.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            [
                "id",
                "name",
                "transport",
                "command",
                "args",
                "url",
                "environment",
                "headers",
                "watched_paths",
                "working_directory_path",
                "auto_reload_enabled",
                "dxt_user_config",
                "mcp_metadata_url",
            ]
        );
    }

    #[test]
    fn test_generated_sql() {
        assert_eq!(
            MCP_ROOTS.select_sql("WHERE id = ?"),
            "SELECT id, name, uri FROM mcp_roots WHERE id = ?"
        );
        assert_eq!(MCP_ROOTS.select_sql(""), "SELECT id, name, uri FROM mcp_roots");
        assert_eq!(
            MCP_ROOTS.upsert_sql(),
            "INSERT INTO mcp_roots (id, name, uri) VALUES (?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, uri = excluded.uri"
        );
        assert_eq!(
            GLOBAL_ENVIRONMENT.update_sql(),
            "UPDATE global_environment SET key = ?, value = ? WHERE id = ?"
        );
    }
}
