//! Named JSON documents: filter sets (`saved_filters`) and block templates
//! (`saved_blocks`). Saving an existing name replaces its document.

use gramlens_core::errors::StorageError;
use rusqlite::{params, Connection, OptionalExtension};

use crate::to_storage_err;

/// The two named-document tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Library {
    FilterSets,
    Blocks,
}

impl Library {
    fn table(self) -> &'static str {
        match self {
            Self::FilterSets => "saved_filters",
            Self::Blocks => "saved_blocks",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::FilterSets => "filters_json",
            Self::Blocks => "block_json",
        }
    }
}

pub fn save(conn: &Connection, library: Library, name: &str, json: &str) -> Result<(), StorageError> {
    let sql = format!(
        "INSERT INTO {table} (name, {col}, updated_at) VALUES (?1, ?2, unixepoch())
         ON CONFLICT (name) DO UPDATE SET {col} = excluded.{col}, updated_at = excluded.updated_at",
        table = library.table(),
        col = library.column(),
    );
    conn.execute(&sql, params![name, json])
        .map_err(to_storage_err)?;
    Ok(())
}

pub fn names(conn: &Connection, library: Library) -> Result<Vec<String>, StorageError> {
    let sql = format!("SELECT name FROM {} ORDER BY name", library.table());
    let mut stmt = conn.prepare_cached(&sql).map_err(to_storage_err)?;
    let rows = stmt.query_map([], |row| row.get(0)).map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

pub fn load(conn: &Connection, library: Library, name: &str) -> Result<Option<String>, StorageError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE name = ?1",
        library.column(),
        library.table()
    );
    conn.query_row(&sql, params![name], |row| row.get(0))
        .optional()
        .map_err(to_storage_err)
}

/// Returns whether a document was deleted.
pub fn delete(conn: &Connection, library: Library, name: &str) -> Result<bool, StorageError> {
    let sql = format!("DELETE FROM {} WHERE name = ?1", library.table());
    let n = conn.execute(&sql, params![name]).map_err(to_storage_err)?;
    Ok(n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;

    #[test]
    fn save_upserts_by_name() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        save(&conn, Library::FilterSets, "nouns", "{\"v\":1}").unwrap();
        save(&conn, Library::FilterSets, "nouns", "{\"v\":2}").unwrap();
        save(&conn, Library::FilterSets, "adjs", "{}").unwrap();
        assert_eq!(names(&conn, Library::FilterSets).unwrap(), vec!["adjs", "nouns"]);
        assert_eq!(
            load(&conn, Library::FilterSets, "nouns").unwrap().as_deref(),
            Some("{\"v\":2}")
        );
        assert!(names(&conn, Library::Blocks).unwrap().is_empty());
        assert!(delete(&conn, Library::FilterSets, "nouns").unwrap());
        assert!(!delete(&conn, Library::FilterSets, "nouns").unwrap());
    }
}
