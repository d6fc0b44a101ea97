//! Typed database access.
//!
//! [`TypedConnection`] wraps a live Postgres-protocol session and exposes the
//! handful of operations the extraction pipeline needs: projection of named
//! columns into typed rows, batched insert/update, counts and table
//! maintenance. Column types come from the live `information_schema`, not
//! from the row data, so a drifted schema fails loudly instead of binding
//! garbage.

mod batch;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::task::JoinHandle;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls, Statement};
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::error::{ExtractError, Result};
use crate::value::{ColumnType, Value};

pub use batch::BATCH_SIZE;
use batch::BatchBuffer;

/// A logical field bound to a physical column.
///
/// Keys are stable across engines; columns carry whatever case the target
/// engine stores its identifiers in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub key: &'static str,
    pub column: String,
}

impl FieldBinding {
    pub fn new(key: &'static str, column: impl Into<String>) -> Self {
        FieldBinding {
            key,
            column: column.into(),
        }
    }
}

/// One materialized row: logical key to typed value. NULL cells are absent,
/// never represented as a value.
pub type Row = BTreeMap<&'static str, Value>;

/// Read-side seam between the materializer and the database.
#[async_trait]
pub trait TableReader {
    /// Project the given fields from a table, one [`Row`] per source row.
    async fn project(&self, table: &str, fields: &[FieldBinding]) -> Result<Vec<Row>>;

    /// Total row count of a table.
    async fn count(&self, table: &str) -> Result<i64>;
}

/// How `batch_write` turns rows into statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// `INSERT` every row with all bound fields.
    Insert,
    /// `UPDATE ... WHERE key = $n`; the key must be one of the bound fields.
    Update { key: &'static str },
}

/// A live, typed connection to one database.
pub struct TypedConnection {
    config: DatabaseConfig,
    client: Option<Client>,
    driver: Option<JoinHandle<()>>,
}

impl TypedConnection {
    /// Create an unconnected handle; no IO happens until [`connect`].
    ///
    /// [`connect`]: TypedConnection::connect
    pub fn new(config: DatabaseConfig) -> Self {
        TypedConnection {
            config,
            client: None,
            driver: None,
        }
    }

    /// Open the session. Fails with [`ExtractError::AlreadyConnected`] if a
    /// session is already open.
    pub async fn connect(&mut self) -> Result<()> {
        if self.client.is_some() {
            return Err(ExtractError::AlreadyConnected);
        }
        let mut pg = tokio_postgres::Config::new();
        pg.host(&self.config.host)
            .port(self.config.port)
            .dbname(&self.config.database)
            .user(&self.config.user)
            .password(&self.config.password);
        let (client, connection) = pg.connect(NoTls).await?;
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("connection task ended with error: {}", e);
            }
        });
        debug!(
            host = %self.config.host,
            database = %self.config.database,
            "connected"
        );
        self.client = Some(client);
        self.driver = Some(driver);
        Ok(())
    }

    /// Close the session. Fails with [`ExtractError::NotConnected`] if no
    /// session is open.
    pub fn disconnect(&mut self) -> Result<()> {
        self.client.take().ok_or(ExtractError::NotConnected)?;
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or(ExtractError::NotConnected)
    }

    /// The live column-type map of a table, keyed by column name.
    ///
    /// Queried per call; nothing is cached. A native type outside the
    /// supported dictionary is fatal.
    pub async fn column_types(&self, table: &str) -> Result<BTreeMap<String, ColumnType>> {
        let client = self.client()?;
        let rows = client
            .query(
                "SELECT column_name, udt_name FROM information_schema.columns \
                 WHERE table_name = $1",
                &[&table],
            )
            .await?;
        let mut types = BTreeMap::new();
        for row in rows {
            let column: String = row.get(0);
            let native: String = row.get(1);
            match ColumnType::from_native(&native) {
                Some(ty) => {
                    types.insert(column, ty);
                }
                None => {
                    return Err(ExtractError::UnexpectedType {
                        table: table.to_string(),
                        column,
                        native,
                    })
                }
            }
        }
        Ok(types)
    }

    /// Project the given fields from a table into typed rows.
    ///
    /// Cell extraction is driven by the wire type of each result column;
    /// NULLs are dropped so the returned rows only hold present values.
    pub async fn project(&self, table: &str, fields: &[FieldBinding]) -> Result<Vec<Row>> {
        let client = self.client()?;
        let columns: Vec<&str> = fields.iter().map(|f| f.column.as_str()).collect();
        let sql = format!("SELECT {} FROM {}", columns.join(", "), table);
        let rows = client.query(&sql, &[]).await?;
        debug!(table, rows = rows.len(), "projected");
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut record = Row::new();
            for (i, field) in fields.iter().enumerate() {
                if let Some(value) = extract_cell(row, i, table, &field.column)? {
                    record.insert(field.key, value);
                }
            }
            out.push(record);
        }
        Ok(out)
    }

    pub async fn count(&self, table: &str) -> Result<i64> {
        let client = self.client()?;
        let row = client
            .query_one(&format!("SELECT count(*) FROM {}", table), &[])
            .await?;
        Ok(row.get(0))
    }

    /// The next free primary-key value: `max(pk) + 1`, or 1 for an empty
    /// table.
    pub async fn next_pk(&self, table: &str, pk_column: &str) -> Result<i64> {
        let client = self.client()?;
        let sql = format!(
            "SELECT cast(coalesce(max({}), 0) AS bigint) + 1 FROM {}",
            pk_column, table
        );
        let row = client.query_one(&sql, &[]).await?;
        Ok(row.get(0))
    }

    /// Empty a table, cascading to dependents.
    pub async fn truncate(&self, table: &str) -> Result<()> {
        let client = self.client()?;
        client
            .execute(&format!("TRUNCATE TABLE {} CASCADE", table), &[])
            .await?;
        Ok(())
    }

    /// Delete every row of a table, returning the number removed.
    pub async fn delete(&self, table: &str) -> Result<u64> {
        let client = self.client()?;
        Ok(client.execute(&format!("DELETE FROM {}", table), &[]).await?)
    }

    /// Write rows in batches of [`BATCH_SIZE`].
    ///
    /// The session is checked first, then every bound column is resolved
    /// against the live table; textual values are coerced to the column's
    /// declared type before binding. Update mode demands a key that is both
    /// bound and a real column, and fails before any row is written. Any
    /// failure aborts the whole call.
    pub async fn batch_write(
        &self,
        table: &str,
        fields: &[FieldBinding],
        rows: &[Row],
        mode: WriteMode,
    ) -> Result<u64> {
        let client = self.client()?;
        let types = self.column_types(table).await?;
        let ordered = bind_order(table, fields, &types, mode)?;
        let columns: Vec<&str> = ordered.iter().map(|(f, _)| f.column.as_str()).collect();
        let sql = match mode {
            WriteMode::Insert => insert_sql(table, &columns),
            WriteMode::Update { .. } => update_sql(
                table,
                &columns[..columns.len() - 1],
                columns[columns.len() - 1],
            ),
        };
        let stmt = client.prepare(&sql).await?;

        let mut buffer = BatchBuffer::new(BATCH_SIZE);
        let mut written = 0u64;
        for row in rows {
            let mut params: Vec<Option<Value>> = Vec::with_capacity(ordered.len());
            for (field, ty) in &ordered {
                let cell = match row.get(field.key) {
                    Some(v) => Some(v.clone().coerce(*ty, &field.column)?),
                    None => None,
                };
                params.push(cell);
            }
            if let Some(chunk) = buffer.push(params) {
                written += flush(client, &stmt, chunk).await?;
            }
        }
        if let Some(chunk) = buffer.finish() {
            written += flush(client, &stmt, chunk).await?;
        }
        debug!(table, written, "batch write complete");
        Ok(written)
    }
}

#[async_trait]
impl TableReader for TypedConnection {
    async fn project(&self, table: &str, fields: &[FieldBinding]) -> Result<Vec<Row>> {
        TypedConnection::project(self, table, fields).await
    }

    async fn count(&self, table: &str) -> Result<i64> {
        TypedConnection::count(self, table).await
    }
}

async fn flush(
    client: &Client,
    stmt: &Statement,
    chunk: Vec<Vec<Option<Value>>>,
) -> Result<u64> {
    let mut written = 0u64;
    for params in &chunk {
        let refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        written += client.execute(stmt, &refs).await?;
    }
    Ok(written)
}

fn extract_cell(
    row: &tokio_postgres::Row,
    idx: usize,
    table: &str,
    column: &str,
) -> Result<Option<Value>> {
    let ty: &Type = row.columns()[idx].type_();
    let value = match ty.name() {
        "varchar" | "text" => row.try_get::<_, Option<String>>(idx)?.map(Value::Text),
        "int4" => row
            .try_get::<_, Option<i32>>(idx)?
            .map(|n| Value::Integer(n as i64)),
        "int8" => row.try_get::<_, Option<i64>>(idx)?.map(Value::Integer),
        "bool" => row.try_get::<_, Option<bool>>(idx)?.map(Value::Boolean),
        "float8" => row.try_get::<_, Option<f64>>(idx)?.map(Value::Real),
        "timestamp" => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(Value::Timestamp),
        other => {
            return Err(ExtractError::UnexpectedType {
                table: table.to_string(),
                column: column.to_string(),
                native: other.to_string(),
            })
        }
    };
    Ok(value)
}

/// Resolve every binding against the live column types and fix the bind
/// order. An update key that is unbound, or bound to a column the table
/// does not have, is invalid; the key binds last so it lands in the WHERE
/// clause.
fn bind_order<'a>(
    table: &str,
    fields: &'a [FieldBinding],
    types: &BTreeMap<String, ColumnType>,
    mode: WriteMode,
) -> Result<Vec<(&'a FieldBinding, ColumnType)>> {
    if let WriteMode::Update { key } = mode {
        match fields.iter().find(|f| f.key == key) {
            Some(f) if types.contains_key(&f.column) => {}
            _ => return Err(ExtractError::InvalidKey(key.to_string())),
        }
    }
    let mut resolved: Vec<(&FieldBinding, ColumnType)> = Vec::with_capacity(fields.len());
    for field in fields {
        let ty = types.get(&field.column).copied().ok_or_else(|| {
            ExtractError::UnknownColumn {
                table: table.to_string(),
                column: field.column.clone(),
            }
        })?;
        resolved.push((field, ty));
    }
    Ok(match mode {
        WriteMode::Insert => resolved,
        WriteMode::Update { key } => {
            let mut set: Vec<_> = resolved
                .iter()
                .filter(|(f, _)| f.key != key)
                .copied()
                .collect();
            if let Some(k) = resolved.iter().find(|(f, _)| f.key == key) {
                set.push(*k);
            }
            set
        }
    })
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn update_sql(table: &str, set_columns: &[&str], key_column: &str) -> String {
    let assignments: Vec<String> = set_columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ${}", c, i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        table,
        assignments.join(", "),
        key_column,
        set_columns.len() + 1
    )
}
