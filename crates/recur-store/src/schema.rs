use rusqlite::Connection;

use recur_core::RecurError;

pub fn init_db(conn: &Connection) -> Result<(), RecurError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS algorithms (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            a INTEGER NOT NULL CHECK(a >= 1),
            b INTEGER NOT NULL CHECK(b >= 2),
            k INTEGER NOT NULL CHECK(k >= 0),
            description TEXT NOT NULL DEFAULT '',
            code TEXT NOT NULL DEFAULT '',
            case_label TEXT,
            time_complexity TEXT,
            complexity_analysis TEXT,
            case_number INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_algorithms_created ON algorithms(created_at);
        CREATE INDEX IF NOT EXISTS idx_algorithms_case ON algorithms(case_number);
        ",
    )
    .map_err(|e| RecurError::Database(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_db() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        // Second call should be idempotent
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_algorithms_table_columns() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();

        let columns: Vec<String> = {
            let mut stmt = conn
                .prepare("SELECT name FROM pragma_table_info('algorithms') ORDER BY cid")
                .unwrap();
            stmt.query_map([], |row| row.get(0))
                .unwrap()
                .map(|r| r.unwrap())
                .collect()
        };

        for col in ["id", "name", "a", "b", "k", "case_label", "case_number"] {
            assert!(columns.contains(&col.to_string()), "missing {col}");
        }
    }

    #[test]
    fn test_check_constraints_reject_bad_params() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        let res = conn.execute(
            "INSERT INTO algorithms (id, name, a, b, k, created_at, updated_at)
             VALUES ('x', 'bad', 2, 1, 0, 'now', 'now')",
            [],
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_name_unique_ignores_case() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        conn.execute(
            "INSERT INTO algorithms (id, name, a, b, k, created_at, updated_at)
             VALUES ('1', 'Merge Sort', 2, 2, 1, 'now', 'now')",
            [],
        )
        .unwrap();
        let res = conn.execute(
            "INSERT INTO algorithms (id, name, a, b, k, created_at, updated_at)
             VALUES ('2', 'merge sort', 2, 2, 1, 'now', 'now')",
            [],
        );
        assert!(res.is_err());
    }
}
