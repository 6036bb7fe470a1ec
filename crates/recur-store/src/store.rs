use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{ffi, params, Connection, ErrorCode, OptionalExtension};
use tracing::debug;

use recur_core::{
    Algorithm, AlgorithmCatalog, Case, CatalogStats, RecurError, RecurResult, RecurrenceParams,
};

use crate::schema::init_db;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(path: &Path) -> RecurResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RecurError::Database(format!("cannot create db directory: {e}")))?;
        }
        let conn = Connection::open(path)
            .map_err(|e| RecurError::Database(format!("cannot open database: {e}")))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| RecurError::Database(e.to_string()))?;
        init_db(&conn)?;
        debug!("opened catalog at {}", path.display());
        Ok(Self { conn })
    }

    pub fn in_memory() -> RecurResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| RecurError::Database(format!("cannot open in-memory db: {e}")))?;
        init_db(&conn)?;
        Ok(Self { conn })
    }
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_algorithm(row: &rusqlite::Row) -> rusqlite::Result<Algorithm> {
    let params = RecurrenceParams::new(row.get(2)?, row.get(3)?, row.get(4)?)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Integer, Box::new(e)))?;

    let created_at_str: String = row.get(10)?;
    let updated_at_str: String = row.get(11)?;

    Ok(Algorithm {
        id: row.get(0)?,
        name: row.get(1)?,
        params,
        description: row.get(5)?,
        code: row.get(6)?,
        case: row.get(7)?,
        time_complexity: row.get(8)?,
        complexity_analysis: row.get(9)?,
        created_at: parse_time(&created_at_str),
        updated_at: parse_time(&updated_at_str),
    })
}

const SELECT_COLS: &str = "id, name, a, b, k, description, code, \
                           case_label, time_complexity, complexity_analysis, \
                           created_at, updated_at";

/// Map a write error, turning UNIQUE(name) hits into `Duplicate`.
fn write_err(e: rusqlite::Error, name: &str) -> RecurError {
    match e {
        rusqlite::Error::SqliteFailure(ref f, _)
            if f.code == ErrorCode::ConstraintViolation
                && f.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RecurError::Duplicate(name.to_string())
        }
        other => RecurError::Database(other.to_string()),
    }
}

impl SqliteStore {
    fn query_algorithms(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RecurResult<Vec<Algorithm>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| RecurError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params, row_to_algorithm)
            .map_err(|e| RecurError::Database(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| RecurError::Database(e.to_string()))?);
        }
        Ok(results)
    }

    fn query_one(&self, sql: &str, key: &str) -> RecurResult<Option<Algorithm>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| RecurError::Database(e.to_string()))?;

        stmt.query_row(params![key], row_to_algorithm)
            .optional()
            .map_err(|e| RecurError::Database(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// AlgorithmCatalog impl
// ---------------------------------------------------------------------------

impl AlgorithmCatalog for SqliteStore {
    fn add(&self, algorithm: Algorithm) -> RecurResult<String> {
        let p = algorithm.params;
        // Stored analysis always follows the parameters.
        let analysis = p.classify();
        self.conn
            .execute(
                "INSERT INTO algorithms (id, name, a, b, k, description, code,
                 case_label, case_number, time_complexity, complexity_analysis,
                 created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    algorithm.id,
                    algorithm.name,
                    p.a(),
                    p.b(),
                    p.k(),
                    algorithm.description,
                    algorithm.code,
                    analysis.case_label,
                    analysis.case.number(),
                    analysis.complexity,
                    algorithm.complexity_analysis,
                    algorithm.created_at.to_rfc3339(),
                    algorithm.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| write_err(e, &algorithm.name))?;

        debug!("catalog add: {} ({})", algorithm.name, p);
        Ok(algorithm.id)
    }

    fn get(&self, id: &str) -> RecurResult<Option<Algorithm>> {
        self.query_one(
            &format!("SELECT {SELECT_COLS} FROM algorithms WHERE id = ?1"),
            id,
        )
    }

    fn get_by_name(&self, name: &str) -> RecurResult<Option<Algorithm>> {
        self.query_one(
            &format!("SELECT {SELECT_COLS} FROM algorithms WHERE name = ?1 COLLATE NOCASE"),
            name,
        )
    }

    fn update(&self, algorithm: &Algorithm) -> RecurResult<()> {
        let p = algorithm.params;
        // Stored analysis always follows the parameters.
        let analysis = p.classify();
        let changed = self
            .conn
            .execute(
                "UPDATE algorithms SET
                 name = ?2, a = ?3, b = ?4, k = ?5, description = ?6, code = ?7,
                 case_label = ?8, case_number = ?9, time_complexity = ?10,
                 complexity_analysis = ?11, updated_at = ?12
                 WHERE id = ?1",
                params![
                    algorithm.id,
                    algorithm.name,
                    p.a(),
                    p.b(),
                    p.k(),
                    algorithm.description,
                    algorithm.code,
                    analysis.case_label,
                    analysis.case.number(),
                    analysis.complexity,
                    algorithm.complexity_analysis,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| write_err(e, &algorithm.name))?;

        if changed == 0 {
            return Err(RecurError::NotFound(algorithm.id.clone()));
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> RecurResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM algorithms WHERE id = ?1", params![id])
            .map_err(|e| RecurError::Database(e.to_string()))?;

        if changed == 0 {
            return Err(RecurError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn list(&self) -> RecurResult<Vec<Algorithm>> {
        self.query_algorithms(
            &format!("SELECT {SELECT_COLS} FROM algorithms ORDER BY rowid"),
            params![],
        )
    }

    fn list_by_case(&self, case: Case) -> RecurResult<Vec<Algorithm>> {
        self.query_algorithms(
            &format!("SELECT {SELECT_COLS} FROM algorithms WHERE case_number = ?1 ORDER BY rowid"),
            params![case.number()],
        )
    }

    fn count(&self) -> RecurResult<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM algorithms", [], |row| {
                row.get::<_, usize>(0)
            })
            .map_err(|e| RecurError::Database(e.to_string()))
    }

    fn stats(&self) -> RecurResult<CatalogStats> {
        let total = self.count()?;

        let mut by_case = Vec::new();
        for case in [Case::One, Case::Two, Case::Three] {
            let n: usize = self
                .conn
                .query_row(
                    "SELECT COUNT(*) FROM algorithms WHERE case_number = ?1",
                    params![case.number()],
                    |row| row.get(0),
                )
                .map_err(|e| RecurError::Database(e.to_string()))?;
            by_case.push((case, n));
        }

        let newest = self
            .conn
            .query_row("SELECT MAX(created_at) FROM algorithms", [], |row| {
                row.get::<_, Option<String>>(0)
            })
            .map_err(|e| RecurError::Database(e.to_string()))?
            .map(|s| parse_time(&s));

        Ok(CatalogStats {
            total,
            by_case,
            newest,
        })
    }
}
