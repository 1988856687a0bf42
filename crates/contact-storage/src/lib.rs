use contact_core::{ContactColumn, ContactRow, FieldValue, RowSource};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, Row};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub const CONTACTS_SCHEMA_VERSION: i64 = 1;

const SELECT_ROWS: &str = "
SELECT contact_id, display_name, photo_thumb_uri, data1, data2, data3, lookup, _id, sort_key
FROM contact_data
ORDER BY sort_key COLLATE NOCASE, _id
";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unsupported schema version {found}, max supported {supported}")]
    UnsupportedSchemaVersion { found: i64, supported: i64 },
}

/// SQLite-backed store of contact data rows, one row per contact data item.
pub struct ContactStore {
    conn: Connection,
}

impl ContactStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Opens a database that must already exist; never creates the file.
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn schema_version(&self) -> Result<i64, StorageError> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    pub fn migrate(&self) -> Result<(), StorageError> {
        let current = self.schema_version()?;
        if current > CONTACTS_SCHEMA_VERSION {
            return Err(StorageError::UnsupportedSchemaVersion {
                found: current,
                supported: CONTACTS_SCHEMA_VERSION,
            });
        }

        if current < 1 {
            let sql = include_str!("../migrations/0001_contact_schema.sql");
            self.conn.execute_batch(sql)?;
            self.conn
                .execute("PRAGMA user_version = 1", [])
                .map(|_| ())?;
        }

        Ok(())
    }

    /// Inserts one row. A zero `row_id` lets SQLite assign the `_id`.
    pub fn insert_row(&self, row: &ContactRow) -> Result<i64, StorageError> {
        insert_with(&self.conn, row)
    }

    pub fn insert_rows(&mut self, rows: &[ContactRow]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        for row in rows {
            insert_with(&tx, row)?;
        }
        tx.commit()?;
        debug!(rows = rows.len(), "inserted contact rows");
        Ok(rows.len())
    }

    /// Deletes every stored row and inserts `rows` in one transaction. On
    /// failure the previous rows are left in place.
    pub fn replace_rows(&mut self, rows: &[ContactRow]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM contact_data", [])?;
        for row in rows {
            insert_with(&tx, row)?;
        }
        tx.commit()?;
        debug!(removed, rows = rows.len(), "replaced contact rows");
        Ok(rows.len())
    }

    pub fn row_count(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM contact_data", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM contact_data", [])?;
        Ok(())
    }

    /// All stored rows ordered by sort key, duplicates included.
    pub fn rows(&self) -> Result<Vec<ContactRow>, StorageError> {
        self.query_rows(SELECT_ROWS)
    }

    /// Runs an arbitrary SELECT and maps each result row by column name.
    /// Columns the query does not return read as empty.
    pub fn query_rows(&self, sql: &str) -> Result<Vec<ContactRow>, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        let positions: HashMap<ContactColumn, usize> = stmt
            .column_names()
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| name.parse::<ContactColumn>().ok().map(|col| (col, idx)))
            .collect();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(ContactRow::from_fields(|column| {
                positions
                    .get(&column)
                    .and_then(|idx| read_field(row, *idx))
            }));
        }
        Ok(out)
    }
}

impl RowSource for ContactStore {
    type Error = StorageError;

    fn fetch_rows(&self) -> Result<Option<Vec<ContactRow>>, Self::Error> {
        self.rows().map(Some)
    }
}

fn insert_with(conn: &Connection, row: &ContactRow) -> Result<i64, StorageError> {
    let row_id = (row.row_id != 0).then_some(row.row_id);
    conn.execute(
        "
        INSERT INTO contact_data (
            _id,
            contact_id,
            display_name,
            photo_thumb_uri,
            data1,
            data2,
            data3,
            lookup,
            sort_key
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ",
        params![
            row_id,
            row.contact_id,
            row.display_name,
            row.photo_thumb_uri,
            row.data1,
            row.data2,
            row.data3,
            row.lookup,
            row.sort_key,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Reads a cell by its stored type. A cell that cannot be read is treated
/// as absent rather than failing the whole query.
fn read_field(row: &Row<'_>, idx: usize) -> Option<FieldValue> {
    let value = match row.get_ref(idx).ok()? {
        ValueRef::Null => FieldValue::Null,
        ValueRef::Integer(value) => FieldValue::Integer(value),
        ValueRef::Real(value) => FieldValue::Real(value),
        ValueRef::Text(bytes) => FieldValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => FieldValue::Blob(bytes.to_vec()),
    };
    Some(value)
}
