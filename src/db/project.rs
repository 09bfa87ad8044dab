/// Project-related database queries.
use rusqlite::Connection;

use crate::error::Result;

pub fn create_project(name: &str, conn: &Connection) -> Result<i64> {
    conn.execute("INSERT INTO projects (name) VALUES (?1)", [name])?;
    Ok(conn.last_insert_rowid())
}

/// All projects as `(id, name)` pairs.
pub fn query_projects(conn: &Connection) -> Result<Vec<(i64, String)>> {
    let mut stmt = conn.prepare("SELECT id, name FROM projects ORDER BY id")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
    let mut projects = Vec::new();
    for row in rows {
        projects.push(row?);
    }
    Ok(projects)
}

pub fn delete_all_projects(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM projects", [])?;
    Ok(())
}
